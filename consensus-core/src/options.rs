use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::category::Category;

/// Day of week as the wire uses it: 0 = Sunday through 6 = Saturday.
pub type DayOfWeek = u32;

pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
    date.weekday().num_days_from_sunday()
}

/// Operating hours of a venue.
///
/// `close < open` means the venue is open overnight, for example a bar open
/// 17:00 to 02:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    /// Opening hour, 0-23
    pub open: u32,
    /// Closing hour, 0-23
    pub close: u32,
    /// Days of week the venue operates on. `None` means every day.
    pub days: Option<Vec<DayOfWeek>>,
}

impl OpeningHours {
    /// Whether the venue is open at some point during `[start_hour, end_hour)`
    /// on the given day of week.
    pub fn is_open_during(&self, day: DayOfWeek, start_hour: u32, end_hour: u32) -> bool {
        if let Some(days) = &self.days {
            if !days.contains(&day) {
                return false;
            }
        }

        if self.close < self.open {
            // Overnight: open from `open` until midnight, then until `close`
            let overlaps_evening = start_hour >= self.open && start_hour < 24;
            let overlaps_morning = end_hour > 0 && end_hour <= self.close;
            let spans_midnight = start_hour < self.close || end_hour > self.open;

            overlaps_evening || overlaps_morning || spans_midnight
        } else {
            start_hour < self.close && end_hour > self.open
        }
    }
}

/// A candidate activity or venue presented for voting in a round.
///
/// Ephemeral: it only outlives its round if it wins and becomes an
/// itinerary entry.
#[derive(Debug, Clone)]
pub struct VenueOption {
    /// Provider-scoped identifier, opaque to the engine
    pub id: String,
    pub name: String,
    pub category: Category,
    /// (latitude, longitude)
    pub location: (f64, f64),
    pub address: String,
    /// `None` means always open (parks, outdoor spots)
    pub hours: Option<OpeningHours>,
    pub image: Option<String>,
    /// Suggested visit length in hours, if the provider knows one
    pub duration: Option<u32>,
}

impl VenueOption {
    /// Whether this option is a valid candidate for the given window.
    /// Options without hours are treated as always open.
    pub fn is_open_during(&self, day: DayOfWeek, start_hour: u32, end_hour: u32) -> bool {
        match &self.hours {
            Some(hours) => hours.is_open_during(day, start_hour, end_hour),
            None => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("option provider is unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the candidate set for a round.
///
/// Implementors must only return options that are open at some point within
/// `[start_hour, end_hour)` on the weekday derived from `date`, or whose
/// hours are unspecified.
pub trait OptionProvider: Send + Sync + 'static {
    fn options_for(
        &self,
        category: Category,
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<Vec<VenueOption>, ProviderError>;
}

#[cfg(test)]
mod test {
    use super::*;

    fn hours(open: u32, close: u32) -> OpeningHours {
        OpeningHours {
            open,
            close,
            days: None,
        }
    }

    #[test]
    fn test_normal_hours_overlap() {
        let museum = hours(9, 17);

        assert!(museum.is_open_during(1, 10, 14));
        assert!(museum.is_open_during(1, 16, 20), "partial overlap counts");
        assert!(!museum.is_open_during(1, 17, 20), "opens exactly at close");
        assert!(!museum.is_open_during(1, 6, 9), "ends exactly at open");
    }

    #[test]
    fn test_overnight_hours() {
        // A bar open 17:00 to 02:00
        let bar = hours(17, 2);

        assert!(bar.is_open_during(5, 18, 23), "evening window");
        assert!(bar.is_open_during(5, 0, 2), "early morning window");
        assert!(bar.is_open_during(5, 22, 3), "window across midnight");
        assert!(!bar.is_open_during(5, 9, 16), "mid-day is closed");
    }

    #[test]
    fn test_day_mask() {
        let weekend_market = OpeningHours {
            open: 8,
            close: 14,
            days: Some(vec![0, 6]),
        };

        assert!(weekend_market.is_open_during(0, 9, 12), "open on Sunday");
        assert!(!weekend_market.is_open_during(2, 9, 12), "closed on Tuesday");
    }

    #[test]
    fn test_always_open_options() {
        let park = VenueOption {
            id: "nature-1".to_string(),
            name: "Riverside Park".to_string(),
            category: Category::Nature,
            location: (37.76, -122.45),
            address: "1 Park Way".to_string(),
            hours: None,
            image: None,
            duration: None,
        };

        assert!(park.is_open_during(3, 0, 23));
    }

    #[test]
    fn test_day_of_week() {
        // 2026-08-30 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        assert_eq!(day_of_week(sunday), 0);
        assert_eq!(day_of_week(sunday.succ_opt().unwrap()), 1);
    }
}
