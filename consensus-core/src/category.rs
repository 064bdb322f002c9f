use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// An activity category a round can be scoped to.
///
/// The declaration order is load-bearing: it is the order the round
/// sequencer expands `ActivityCounts` in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Recreation,
    Nature,
    Arts,
    Social,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Recreation,
        Category::Nature,
        Category::Arts,
        Category::Social,
    ];

    /// The canonical wire name of the category
    pub fn name(&self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Recreation => "RECREATION",
            Category::Nature => "NATURE",
            Category::Arts => "ARTS",
            Category::Social => "SOCIAL",
        }
    }

    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or_default()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("{0} is not a known activity category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// How many rounds of each category a lobby wants.
///
/// Keyed by the closed [Category] set, so unknown categories cannot make it
/// past input validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    counts: [u32; 5],
}

impl ActivityCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, count: u32) {
        self.counts[category.index()] = count;
    }

    pub fn get(&self, category: Category) -> u32 {
        self.counts[category.index()]
    }

    /// The total requested activities, which is also the total round count
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Iterates the non-zero entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, count)| *count > 0)
    }
}

impl FromIterator<(Category, u32)> for ActivityCounts {
    fn from_iter<I: IntoIterator<Item = (Category, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();

        for (category, count) in iter {
            counts.set(category, count);
        }

        counts
    }
}
