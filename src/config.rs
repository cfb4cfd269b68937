//! Startup settings read from `WEEKGRID_*` environment variables.
//!
//! Unset or unparsable values fall back to defaults; the resulting grid is
//! validated before use.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;

use crate::layout::{GridConfig, GridError};
use crate::limits::*;
use crate::model::{Labels, StudentId};
use crate::resolver::ResolverConfig;
use crate::time::Week;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("{var} must be a positive width, got {value}")]
    Width { var: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// JSON dataset for the preview binary.
    pub data_path: Option<PathBuf>,
    pub student: Option<StudentId>,
    pub week: Week,
    pub width_px: f64,
    pub filter: Option<String>,
    pub grid: GridConfig,
    pub resolver: ResolverConfig,
    pub tick_interval: Duration,
    /// Keep ticking the marker until shutdown instead of printing once.
    pub watch: bool,
    pub metrics_port: Option<u16>,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<T> {
    lookup(var).and_then(|s| s.trim().parse().ok())
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var).filter(|s| !s.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from any variable source (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = GridConfig::default();
        let grid = GridConfig {
            start_hour: parsed(&lookup, "WEEKGRID_START_HOUR").unwrap_or(defaults.start_hour),
            end_hour: parsed(&lookup, "WEEKGRID_END_HOUR").unwrap_or(defaults.end_hour),
            pixels_per_hour: parsed(&lookup, "WEEKGRID_PIXELS_PER_HOUR")
                .unwrap_or(defaults.pixels_per_hour),
            header_height_px: parsed(&lookup, "WEEKGRID_HEADER_HEIGHT")
                .unwrap_or(defaults.header_height_px),
            day_column_count: parsed(&lookup, "WEEKGRID_DAY_COLUMNS")
                .unwrap_or(defaults.day_column_count),
            time_column_width_px: parsed(&lookup, "WEEKGRID_TIME_COLUMN_WIDTH")
                .unwrap_or(defaults.time_column_width_px),
            minimum_block_height_px: parsed(&lookup, "WEEKGRID_MIN_BLOCK_HEIGHT")
                .unwrap_or(defaults.minimum_block_height_px),
        };
        grid.validate()?;

        let width_px: f64 = parsed(&lookup, "WEEKGRID_WIDTH").unwrap_or(1280.0);
        if !(width_px > 0.0) {
            return Err(ConfigError::Width {
                var: "WEEKGRID_WIDTH",
                value: width_px,
            });
        }

        let default_labels = Labels::default();
        let resolver = ResolverConfig {
            lookup_timeout: parsed(&lookup, "WEEKGRID_LOOKUP_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
            lookup_retries: parsed::<u32>(&lookup, "WEEKGRID_LOOKUP_RETRIES")
                .unwrap_or(0)
                .min(MAX_LOOKUP_RETRIES),
            labels: Labels {
                not_available: non_empty(&lookup, "WEEKGRID_LABEL_NA")
                    .unwrap_or(default_labels.not_available),
                unknown_course: non_empty(&lookup, "WEEKGRID_LABEL_UNKNOWN_COURSE")
                    .unwrap_or(default_labels.unknown_course),
            },
        };

        let week = parsed::<NaiveDate>(&lookup, "WEEKGRID_WEEK")
            .map(Week::containing)
            .unwrap_or_else(Week::current);

        Ok(Self {
            data_path: non_empty(&lookup, "WEEKGRID_DATA").map(PathBuf::from),
            student: non_empty(&lookup, "WEEKGRID_STUDENT").map(StudentId::from),
            week,
            width_px,
            filter: non_empty(&lookup, "WEEKGRID_FILTER"),
            grid,
            resolver,
            tick_interval: parsed(&lookup, "WEEKGRID_TICK_MS")
                .filter(|ms: &u64| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            watch: matches!(
                lookup("WEEKGRID_WATCH").as_deref().map(str::trim),
                Some("1" | "true" | "yes")
            ),
            metrics_port: parsed(&lookup, "WEEKGRID_METRICS_PORT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.grid, GridConfig::default());
        assert_eq!(s.resolver, ResolverConfig::default());
        assert_eq!(s.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(s.data_path, None);
        assert!(!s.watch);
        assert_eq!(s.metrics_port, None);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("WEEKGRID_START_HOUR", "7"),
            ("WEEKGRID_END_HOUR", "20"),
            ("WEEKGRID_DAY_COLUMNS", "5"),
            ("WEEKGRID_LOOKUP_TIMEOUT_MS", "250"),
            ("WEEKGRID_LOOKUP_RETRIES", "9"),
            ("WEEKGRID_LABEL_NA", "n/d"),
            ("WEEKGRID_STUDENT", "stu-7"),
            ("WEEKGRID_WEEK", "2026-10-14"),
            ("WEEKGRID_FILTER", "Maths"),
            ("WEEKGRID_WATCH", "true"),
            ("WEEKGRID_METRICS_PORT", "9100"),
        ])
        .unwrap();
        assert_eq!((s.grid.start_hour, s.grid.end_hour), (7, 20));
        assert_eq!(s.grid.day_column_count, 5);
        assert_eq!(s.resolver.lookup_timeout, Duration::from_millis(250));
        assert_eq!(s.resolver.lookup_retries, MAX_LOOKUP_RETRIES);
        assert_eq!(s.resolver.labels.not_available, "n/d");
        assert_eq!(s.resolver.labels.unknown_course, UNKNOWN_COURSE);
        assert_eq!(s.student, Some(StudentId::new("stu-7")));
        assert_eq!(s.week.start(), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert_eq!(s.filter.as_deref(), Some("Maths"));
        assert!(s.watch);
        assert_eq!(s.metrics_port, Some(9100));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let s = settings(&[("WEEKGRID_PIXELS_PER_HOUR", "lots"), ("WEEKGRID_TICK_MS", "0")]).unwrap();
        assert_eq!(s.grid.pixels_per_hour, GridConfig::default().pixels_per_hour);
        assert_eq!(s.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let err = settings(&[("WEEKGRID_START_HOUR", "19")]).unwrap_err();
        assert!(matches!(err, ConfigError::Grid(GridError::EmptyHourRange { .. })));
    }

    #[test]
    fn non_positive_width_is_rejected() {
        let err = settings(&[("WEEKGRID_WIDTH", "-10")]).unwrap_err();
        assert!(matches!(err, ConfigError::Width { .. }));
    }
}
