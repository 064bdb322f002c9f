/// The configuration of the consensus engine
#[derive(Debug, Clone)]
pub struct Config {
    /// How many characters a lobby join code has
    pub join_code_length: usize,
    /// The hard cap on members in a single lobby
    pub max_members: usize,
    /// The smallest allowed search radius, in miles
    pub min_radius: f64,
    /// The largest allowed search radius, in miles
    pub max_radius: f64,
    /// How far into the future a lobby date may be, in days
    pub max_days_ahead: i64,
    /// The largest allowed planning window, in hours
    pub max_window_hours: u32,
    /// The total number of requested activities across all categories
    pub max_total_activities: u32,
    /// How long an activity is scheduled for when it carries no duration
    pub default_duration_hours: u32,
    /// The longest a single activity may be scheduled for
    pub max_duration_hours: u32,
    /// How many times a round may re-run (tiebreak or empty pass) before
    /// it is force-resolved
    pub rerun_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Short enough to read out loud, long enough to avoid collisions
            join_code_length: 5,
            max_members: 25,
            min_radius: 0.5,
            max_radius: 10.0,
            // Planning further than a year out is almost certainly a typo
            max_days_ahead: 365,
            max_window_hours: 12,
            max_total_activities: 10,
            default_duration_hours: 1,
            max_duration_hours: 3,
            // Matches the observed client behavior of two retries
            rerun_limit: 2,
        }
    }
}
