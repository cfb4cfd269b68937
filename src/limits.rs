use std::time::Duration;

/// Teacher name shown when an assignment cannot be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// Course label for slots with no subject name.
pub const UNKNOWN_COURSE: &str = "Unknown course";

/// Duration substituted for slots whose end is not after their start.
pub const FLOOR_DURATION_MINUTES: i32 = 30;

pub const DEFAULT_MIN_BLOCK_HEIGHT_PX: f64 = 24.0;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on retries per assignment lookup, whatever the config says.
pub const MAX_LOOKUP_RETRIES: u32 = 3;

/// Max class IDs sent in a single timetable query.
pub const MAX_CLASS_IDS_PER_QUERY: usize = 100;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

pub const MAX_DAY_COLUMNS: u8 = 7;
