use thiserror::Error;

use crate::config::Config;
use crate::options::{DayOfWeek, VenueOption};

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("the itinerary is not available until every round has completed")]
    NotReady,
    #[error("only the lobby owner can reorder the itinerary")]
    NotOwner,
    #[error("activity index {0} is out of bounds")]
    BadIndex(usize),
    #[error("{name} is not open at {time}")]
    Conflict { name: String, time: String },
    #[error("moving {name} would exceed the end of the planning window")]
    Overflow { name: String },
}

/// A winning option with its computed slot in the day plan
#[derive(Debug, Clone)]
pub struct ItineraryEntry {
    pub option: VenueOption,
    /// The round this option won
    pub round_number: u32,
    /// Scheduled start hour. `None` means the entry overflowed the window
    /// and is shown as "N/A" rather than dropped.
    pub start_hour: Option<u32>,
    /// Scheduled length in hours
    pub duration: u32,
}

impl ItineraryEntry {
    pub fn is_overflow(&self) -> bool {
        self.start_hour.is_none()
    }
}

/// The final time-ordered day plan of winning options.
///
/// Reordering returns a new validated itinerary, so a rejected move leaves
/// the original untouched by construction.
#[derive(Debug, Clone)]
pub struct Itinerary {
    entries: Vec<ItineraryEntry>,
}

pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

impl Itinerary {
    /// Schedules the winners in round order, walking forward from
    /// `start_hour` and accumulating durations. Entries that would start at
    /// or after `end_hour` are marked overflow.
    pub fn build(
        winners: Vec<(u32, VenueOption)>,
        config: &Config,
        start_hour: u32,
        end_hour: u32,
    ) -> Self {
        let entries = winners
            .into_iter()
            .map(|(round_number, option)| {
                let duration = option
                    .duration
                    .unwrap_or(config.default_duration_hours)
                    .clamp(1, config.max_duration_hours);

                ItineraryEntry {
                    option,
                    round_number,
                    start_hour: None,
                    duration,
                }
            })
            .collect();

        Self { entries }.scheduled(start_hour, end_hour)
    }

    pub fn entries(&self) -> &[ItineraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recomputes every slot from scratch, preserving entry order
    fn scheduled(mut self, start_hour: u32, end_hour: u32) -> Self {
        let mut current = start_hour;

        for entry in &mut self.entries {
            if current >= end_hour {
                entry.start_hour = None;
                continue;
            }

            entry.start_hour = Some(current);
            current = end_hour.min(current + entry.duration);
        }

        self
    }

    /// Returns a new itinerary with the entry at `from` moved to `to`.
    ///
    /// The move is rejected when the moved activity would land outside its
    /// operating hours, when it would exceed the window, or when the
    /// recomputed schedule breaks another activity's hours. Rejections do
    /// not mutate anything.
    pub fn moved(
        &self,
        from: usize,
        to: usize,
        day: DayOfWeek,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<Itinerary, ItineraryError> {
        if from >= self.entries.len() {
            return Err(ItineraryError::BadIndex(from));
        }

        if to >= self.entries.len() {
            return Err(ItineraryError::BadIndex(to));
        }

        if from == to {
            return Ok(self.clone());
        }

        let mut entries = self.entries.clone();
        let moved = entries.remove(from);
        entries.insert(to, moved);

        // Where would the moved activity start in the new order?
        let mut new_start = start_hour;
        for entry in entries.iter().take(to) {
            new_start = end_hour.min(new_start + entry.duration);
        }

        let moved = &entries[to];
        let new_end = new_start + moved.duration;

        if !moved.option.is_open_during(day, new_start, new_end) {
            return Err(ItineraryError::Conflict {
                name: moved.option.name.clone(),
                time: format_hour(new_start),
            });
        }

        if new_end > end_hour {
            return Err(ItineraryError::Overflow {
                name: moved.option.name.clone(),
            });
        }

        let reordered = Itinerary { entries }.scheduled(start_hour, end_hour);

        // The move may have shifted everyone else's slot as well
        for entry in reordered.entries().iter() {
            let Some(slot) = entry.start_hour else {
                continue;
            };

            if !entry.option.is_open_during(day, slot, slot + entry.duration) {
                return Err(ItineraryError::Conflict {
                    name: entry.option.name.clone(),
                    time: format_hour(slot),
                });
            }
        }

        Ok(reordered)
    }
}
