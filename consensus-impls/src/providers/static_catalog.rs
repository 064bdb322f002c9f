use chrono::NaiveDate;
use log::debug;

use consensus_core::{
    day_of_week, Category, OpeningHours, OptionProvider, ProviderError, VenueOption,
};

/// An [OptionProvider] backed by a built-in venue catalog.
///
/// Stands in for a real venue source: the catalog carries enough variety in
/// operating hours (daytime, overnight, day-restricted, always-open) to
/// exercise every filtering path, and uses freely hosted images only.
pub struct StaticCatalog {
    venues: Vec<VenueOption>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

const EVERY_DAY: Option<Vec<u32>> = None;

fn hours(open: u32, close: u32, days: Option<Vec<u32>>) -> Option<OpeningHours> {
    Some(OpeningHours { open, close, days })
}

fn unsplash(id: &str) -> Option<String> {
    Some(format!(
        "https://images.unsplash.com/{id}?auto=format&fit=crop&w=1000&q=80"
    ))
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self {
            venues: build_catalog(),
        }
    }

    /// All venues of a category, unfiltered
    pub fn venues_in(&self, category: Category) -> impl Iterator<Item = &VenueOption> {
        self.venues.iter().filter(move |v| v.category == category)
    }
}

impl OptionProvider for StaticCatalog {
    fn options_for(
        &self,
        category: Category,
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<Vec<VenueOption>, ProviderError> {
        let day = day_of_week(date);

        let options: Vec<VenueOption> = self
            .venues_in(category)
            .filter(|v| v.is_open_during(day, start_hour, end_hour))
            .cloned()
            .collect();

        debug!(
            "{} of {} {category} venues open {start_hour}:00-{end_hour}:00 on {date}",
            options.len(),
            self.venues_in(category).count(),
        );

        Ok(options)
    }
}

fn venue(
    id: &str,
    name: &str,
    category: Category,
    location: (f64, f64),
    address: &str,
    hours: Option<OpeningHours>,
    image: Option<String>,
    duration: Option<u32>,
) -> VenueOption {
    VenueOption {
        id: id.to_string(),
        name: name.to_string(),
        category,
        location,
        address: address.to_string(),
        hours,
        image,
        duration,
    }
}

/// The built-in venue set, loosely based around San Francisco.
fn build_catalog() -> Vec<VenueOption> {
    let weekdays = Some(vec![1, 2, 3, 4, 5]);
    let weekend = Some(vec![0, 6]);

    vec![
        // FOOD
        venue(
            "food-1",
            "Ferry Building Marketplace",
            Category::Food,
            (37.7955, -122.3937),
            "1 Ferry Building",
            hours(8, 20, EVERY_DAY),
            unsplash("photo-1550966871-3ed3cdb5ed0c"),
            Some(1),
        ),
        venue(
            "food-2",
            "Mission Taqueria",
            Category::Food,
            (37.7599, -122.4148),
            "2889 Mission St",
            hours(10, 22, EVERY_DAY),
            unsplash("photo-1565299624946-b28f40a0ae38"),
            Some(1),
        ),
        venue(
            "food-3",
            "North Beach Trattoria",
            Category::Food,
            (37.8000, -122.4100),
            "519 Columbus Ave",
            hours(17, 23, EVERY_DAY),
            unsplash("photo-1555396273-367ea4eb4db5"),
            Some(2),
        ),
        venue(
            "food-4",
            "Dim Sum Palace",
            Category::Food,
            (37.7941, -122.4078),
            "717 Grant Ave",
            hours(9, 15, EVERY_DAY),
            unsplash("photo-1563245372-f21724e3856d"),
            Some(1),
        ),
        venue(
            "food-5",
            "Late Night Noodle Bar",
            Category::Food,
            (37.7850, -122.4060),
            "398 Geary St",
            // Overnight hours: open into the small hours
            hours(18, 2, EVERY_DAY),
            unsplash("photo-1552611052-33e04de081de"),
            Some(1),
        ),
        // RECREATION
        venue(
            "recreation-1",
            "Bowling on Brannan",
            Category::Recreation,
            (37.7785, -122.3950),
            "161 Brannan St",
            hours(11, 23, EVERY_DAY),
            unsplash("photo-1538511059256-4593c1696d64"),
            Some(2),
        ),
        venue(
            "recreation-2",
            "Mission Cliffs Climbing",
            Category::Recreation,
            (37.7650, -122.4093),
            "2295 Harrison St",
            hours(6, 22, weekdays),
            unsplash("photo-1522163182402-834f871fd851"),
            Some(2),
        ),
        venue(
            "recreation-3",
            "Pier Arcade",
            Category::Recreation,
            (37.8087, -122.4098),
            "Pier 39",
            hours(10, 21, EVERY_DAY),
            unsplash("photo-1511882150382-421056c89033"),
            Some(1),
        ),
        venue(
            "recreation-4",
            "Golden Gate Park Bike Rental",
            Category::Recreation,
            (37.7694, -122.4862),
            "50 Stow Lake Dr",
            hours(8, 18, EVERY_DAY),
            unsplash("photo-1485965120184-e220f721d03e"),
            Some(2),
        ),
        // NATURE
        venue(
            "nature-1",
            "Golden Gate Bridge Overlook",
            Category::Nature,
            (37.8199, -122.4783),
            "Golden Gate Bridge",
            None,
            unsplash("photo-1501594907352-04cda38ebc29"),
            Some(1),
        ),
        venue(
            "nature-2",
            "Lands End Trail",
            Category::Nature,
            (37.7827, -122.5064),
            "680 Point Lobos Ave",
            None,
            unsplash("photo-1447752875215-b2761acb3c5d"),
            Some(2),
        ),
        venue(
            "nature-3",
            "Japanese Tea Garden",
            Category::Nature,
            (37.7702, -122.4703),
            "75 Hagiwara Tea Garden Dr",
            hours(9, 17, EVERY_DAY),
            unsplash("photo-1578301978693-85fa9c0320b9"),
            Some(1),
        ),
        venue(
            "nature-4",
            "Twin Peaks Summit",
            Category::Nature,
            (37.7544, -122.4477),
            "501 Twin Peaks Blvd",
            None,
            unsplash("photo-1449034446853-66c86144b0ad"),
            Some(1),
        ),
        // ARTS
        venue(
            "arts-1",
            "Palace of Fine Arts",
            Category::Arts,
            (37.8029, -122.4484),
            "3601 Lyon St",
            hours(10, 17, EVERY_DAY),
            unsplash("photo-1521464302861-ce943915d1c3"),
            Some(1),
        ),
        venue(
            "arts-2",
            "SFMOMA",
            Category::Arts,
            (37.7857, -122.4011),
            "151 3rd St",
            hours(10, 17, Some(vec![0, 1, 4, 5, 6])),
            unsplash("photo-1554907984-15263bfd63bd"),
            Some(2),
        ),
        venue(
            "arts-3",
            "Mission Mural Walk",
            Category::Arts,
            (37.7520, -122.4153),
            "Balmy Alley",
            None,
            unsplash("photo-1499781350541-7783f6c6a0c8"),
            Some(1),
        ),
        venue(
            "arts-4",
            "Independent Cinema",
            Category::Arts,
            (37.7609, -122.4350),
            "429 Castro St",
            hours(12, 23, EVERY_DAY),
            unsplash("photo-1489599849927-2ee91cede3ba"),
            Some(3),
        ),
        // SOCIAL
        venue(
            "social-1",
            "Rooftop Lounge",
            Category::Social,
            (37.7880, -122.4075),
            "433 Powell St",
            // Overnight hours: bar open until 02:00
            hours(17, 2, EVERY_DAY),
            unsplash("photo-1514933651103-005eec06c04b"),
            Some(2),
        ),
        venue(
            "social-2",
            "Board Game Cafe",
            Category::Social,
            (37.7648, -122.4222),
            "708 14th St",
            hours(10, 22, EVERY_DAY),
            unsplash("photo-1610890716171-6b1bb98ffd09"),
            Some(2),
        ),
        venue(
            "social-3",
            "Karaoke Box",
            Category::Social,
            (37.7875, -122.4080),
            "601 Larkin St",
            hours(16, 2, EVERY_DAY),
            unsplash("photo-1516280440614-37939bbacd81"),
            Some(2),
        ),
        venue(
            "social-4",
            "Weekend Flea Market",
            Category::Social,
            (37.7125, -122.3890),
            "140 South Van Ness Ave",
            hours(8, 15, weekend),
            unsplash("photo-1555529669-e69e7aa0ba9a"),
            Some(1),
        ),
    ]
}
