//! Time-of-day math shared by the resolver and the layout.
//!
//! Times are whole hours and minutes within one day; there is no date
//! component except in [`Week`], which anchors day indices to a calendar week.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: i32 = 60;

pub fn minute_of_day(hour: u8, minute: u8) -> i32 {
    hour as i32 * MINUTES_PER_HOUR + minute as i32
}

/// `9:30` → `9.5`.
pub fn decimal_hours(hour: u8, minute: u8) -> f64 {
    hour as f64 + minute as f64 / 60.0
}

/// Signed: negative or zero when the end is not after the start.
pub fn duration_minutes(start_hour: u8, start_minute: u8, end_hour: u8, end_minute: u8) -> i32 {
    minute_of_day(end_hour, end_minute) - minute_of_day(start_hour, start_minute)
}

/// Outcome of clamping one raw numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamped {
    Valid(u8),
    Missing,
    OutOfRange { raw: i32, clamped: u8 },
}

impl Clamped {
    pub fn value(self) -> u8 {
        match self {
            Clamped::Valid(v) => v,
            Clamped::Missing => 0,
            Clamped::OutOfRange { clamped, .. } => clamped,
        }
    }

    pub fn was_adjusted(self) -> bool {
        !matches!(self, Clamped::Valid(_))
    }
}

fn clamp_field(raw: Option<i32>, max: u8) -> Clamped {
    match raw {
        None => Clamped::Missing,
        Some(v) if (0..=max as i32).contains(&v) => Clamped::Valid(v as u8),
        Some(v) => Clamped::OutOfRange {
            raw: v,
            clamped: v.clamp(0, max as i32) as u8,
        },
    }
}

pub fn clamp_hour(raw: Option<i32>) -> Clamped {
    clamp_field(raw, 23)
}

pub fn clamp_minute(raw: Option<i32>) -> Clamped {
    clamp_field(raw, 59)
}

/// Zero-padded `HH:MM`.
pub fn format_hm(hour: u8, minute: u8) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Monday-anchored calendar week. Day index 0 is Monday, 6 is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    /// The week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            start: date - Duration::days(offset),
        }
    }

    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn date_of(&self, day: u8) -> NaiveDate {
        self.start + Duration::days(day as i64)
    }

    /// Day index of `date`, if it falls inside this week.
    pub fn day_index(&self, date: NaiveDate) -> Option<u8> {
        let diff = (date - self.start).num_days();
        (0..7).contains(&diff).then_some(diff as u8)
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Duration::days(7),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
        }
    }
}
