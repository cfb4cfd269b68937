use serde::{Deserialize, Serialize};

use crate::limits::{DEFAULT_MIN_BLOCK_HEIGHT_PX, MAX_DAY_COLUMNS};
use crate::time::format_hm;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid hours [{start}, {end}) are empty")]
    EmptyHourRange { start: u8, end: u8 },
    #[error("grid end hour {0} is past midnight")]
    EndHourOutOfRange(u8),
    #[error("pixels per hour must be positive, got {0}")]
    NonPositiveScale(f64),
    #[error("day column count must be 1..=7, got {0}")]
    DayColumns(u8),
    #[error("{0} must not be negative")]
    NegativeDimension(&'static str),
}

/// Fixed-hour week grid. The rendered area spans `[start_hour, end_hour)` below a header row,
/// with a time-label column on the left followed by one column per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub start_hour: u8,
    pub end_hour: u8,
    pub pixels_per_hour: f64,
    pub header_height_px: f64,
    pub day_column_count: u8,
    pub time_column_width_px: f64,
    pub minimum_block_height_px: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
            pixels_per_hour: 80.0,
            header_height_px: 60.0,
            day_column_count: MAX_DAY_COLUMNS,
            time_column_width_px: 80.0,
            minimum_block_height_px: DEFAULT_MIN_BLOCK_HEIGHT_PX,
        }
    }
}

/// A labelled horizontal rule in the time column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourLine {
    pub hour: u8,
    pub top: f64,
    pub label: String,
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.end_hour > 24 {
            return Err(GridError::EndHourOutOfRange(self.end_hour));
        }
        if self.start_hour >= self.end_hour {
            return Err(GridError::EmptyHourRange {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        if !(self.pixels_per_hour > 0.0) {
            return Err(GridError::NonPositiveScale(self.pixels_per_hour));
        }
        if self.day_column_count == 0 || self.day_column_count > MAX_DAY_COLUMNS {
            return Err(GridError::DayColumns(self.day_column_count));
        }
        for (name, value) in [
            ("header height", self.header_height_px),
            ("time column width", self.time_column_width_px),
            ("minimum block height", self.minimum_block_height_px),
        ] {
            if value < 0.0 {
                return Err(GridError::NegativeDimension(name));
            }
        }
        Ok(())
    }

    /// Vertical offset of a fractional hour. May fall outside the grid.
    pub fn y_at(&self, decimal_hour: f64) -> f64 {
        self.header_height_px + (decimal_hour - self.start_hour as f64) * self.pixels_per_hour
    }

    /// True for `[start_hour, end_hour)`.
    pub fn contains_hour(&self, decimal_hour: f64) -> bool {
        decimal_hour >= self.start_hour as f64 && decimal_hour < self.end_hour as f64
    }

    pub fn has_column(&self, day: i32) -> bool {
        day >= 0 && day < self.day_column_count as i32
    }

    /// Width of one day column for a viewport of `available_width_px`. Never negative.
    pub fn column_width(&self, available_width_px: f64) -> f64 {
        if self.day_column_count == 0 {
            return 0.0;
        }
        ((available_width_px - self.time_column_width_px) / self.day_column_count as f64).max(0.0)
    }

    pub fn total_height_px(&self) -> f64 {
        self.y_at(self.end_hour as f64)
    }

    pub fn hour_lines(&self) -> Vec<HourLine> {
        (self.start_hour..self.end_hour)
            .map(|hour| HourLine {
                hour,
                top: self.y_at(hour as f64),
                label: format_hm(hour, 0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_valid() {
        assert_eq!(GridConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_grids() {
        let base = GridConfig::default();
        let cases = [
            (GridConfig { start_hour: 18, end_hour: 8, ..base.clone() }, "empty"),
            (GridConfig { end_hour: 25, ..base.clone() }, "midnight"),
            (GridConfig { pixels_per_hour: 0.0, ..base.clone() }, "positive"),
            (GridConfig { pixels_per_hour: f64::NAN, ..base.clone() }, "positive"),
            (GridConfig { day_column_count: 0, ..base.clone() }, "day column"),
            (GridConfig { day_column_count: 8, ..base.clone() }, "day column"),
            (GridConfig { header_height_px: -1.0, ..base.clone() }, "header height"),
        ];
        for (grid, needle) in cases {
            let err = grid.validate().unwrap_err();
            assert!(err.to_string().contains(needle), "{err} should mention {needle}");
        }
    }

    #[test]
    fn column_width_splits_remaining_space() {
        let grid = GridConfig::default();
        assert_eq!(grid.column_width(780.0), 100.0);
        assert_eq!(grid.column_width(50.0), 0.0);
    }

    #[test]
    fn hour_lines_cover_grid_hours() {
        let grid = GridConfig::default();
        let lines = grid.hour_lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0].top, 60.0);
        assert_eq!(lines[0].label, "08:00");
        assert_eq!(lines[9].top, 60.0 + 9.0 * 80.0);
        assert_eq!(grid.total_height_px(), 60.0 + 10.0 * 80.0);
    }

    #[test]
    fn contains_hour_is_half_open() {
        let grid = GridConfig::default();
        assert!(grid.contains_hour(8.0));
        assert!(grid.contains_hour(17.99));
        assert!(!grid.contains_hour(18.0));
        assert!(!grid.contains_hour(7.5));
    }
}
