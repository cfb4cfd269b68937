use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::model::TimeMarker;
use crate::time::{decimal_hours, Week};

use super::GridConfig;

/// Top offset of the "now" line for a wall-clock time, or `None` outside grid hours.
pub fn marker_position(grid: &GridConfig, now: NaiveTime) -> Option<f64> {
    let hour = decimal_hours(now.hour() as u8, now.minute() as u8);
    grid.contains_hour(hour).then(|| grid.y_at(hour))
}

pub fn current_time_marker_position(grid: &GridConfig) -> Option<f64> {
    marker_position(grid, chrono::Local::now().time())
}

/// Marker for `now` on a grid showing `week`. `day` is set only when `now` falls in that
/// week and its column is on the grid.
pub fn time_marker(grid: &GridConfig, week: &Week, now: NaiveDateTime) -> Option<TimeMarker> {
    let top = marker_position(grid, now.time())?;
    let day = week
        .day_index(now.date())
        .filter(|d| grid.has_column(*d as i32));
    Some(TimeMarker { top, day })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn inside_grid_hours() {
        let grid = GridConfig::default();
        assert_eq!(marker_position(&grid, at(9, 30)), Some(180.0));
        assert_eq!(marker_position(&grid, at(8, 0)), Some(60.0));
    }

    #[test]
    fn outside_grid_hours() {
        let grid = GridConfig::default();
        assert_eq!(marker_position(&grid, at(7, 59)), None);
        assert_eq!(marker_position(&grid, at(18, 0)), None);
        assert_eq!(marker_position(&grid, at(23, 15)), None);
    }

    #[test]
    fn repeated_ticks_give_the_same_answer() {
        let grid = GridConfig::default();
        let t = at(13, 45);
        let first = marker_position(&grid, t);
        for _ in 0..100 {
            assert_eq!(marker_position(&grid, t), first);
        }
    }

    #[test]
    fn marks_todays_column_in_shown_week() {
        let grid = GridConfig::default();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let week = Week::containing(monday);
        let thursday_morning = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let marker = time_marker(&grid, &week, thursday_morning).unwrap();
        assert_eq!(marker.day, Some(3));
        assert_eq!(marker.top, 60.0 + 2.0 * 80.0);

        let marker = time_marker(&grid, &week.next(), thursday_morning).unwrap();
        assert_eq!(marker.day, None);
    }

    #[test]
    fn weekend_has_no_column_on_work_week_grid() {
        let grid = GridConfig {
            day_column_count: 5,
            ..GridConfig::default()
        };
        let week = Week::containing(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(time_marker(&grid, &week, saturday).unwrap().day, None);
    }
}
