use tracing::warn;

use crate::limits::FLOOR_DURATION_MINUTES;
use crate::model::{PositionedBlock, ScheduleEvent};
use crate::time::{decimal_hours, duration_minutes, MINUTES_PER_HOUR};

use super::GridConfig;

/// Lesson length in minutes, floored for events that end at or before their start.
pub fn effective_duration_minutes(event: &ScheduleEvent) -> i32 {
    let minutes = duration_minutes(
        event.start_time,
        event.start_minute,
        event.end_time,
        event.end_minute,
    );
    if minutes <= 0 {
        FLOOR_DURATION_MINUTES
    } else {
        minutes
    }
}

pub fn block_height(event: &ScheduleEvent, grid: &GridConfig) -> f64 {
    let hours = effective_duration_minutes(event) as f64 / MINUTES_PER_HOUR as f64;
    (hours * grid.pixels_per_hour).max(grid.minimum_block_height_px)
}

fn position(event: &ScheduleEvent, grid: &GridConfig, column_width: f64) -> Option<PositionedBlock> {
    if !grid.has_column(event.day) {
        warn!(
            event = %event.id,
            day = event.day,
            columns = grid.day_column_count,
            "event day outside grid columns, not rendered"
        );
        metrics::counter!(crate::observability::LAYOUT_EXCLUDED_EVENTS_TOTAL).increment(1);
        return None;
    }

    Some(PositionedBlock {
        top: grid.y_at(decimal_hours(event.start_time, event.start_minute)),
        height: block_height(event, grid),
        left: grid.time_column_width_px + event.day as f64 * column_width,
        width: column_width,
        event: event.clone(),
    })
}

/// Position `events` on the grid, keeping only `filter_course` when set.
///
/// Blocks come back ordered by day, then start time, then event id.
pub fn layout(
    events: &[ScheduleEvent],
    grid: &GridConfig,
    available_width_px: f64,
    filter_course: Option<&str>,
) -> Vec<PositionedBlock> {
    let column_width = grid.column_width(available_width_px);

    let mut blocks: Vec<PositionedBlock> = events
        .iter()
        .filter(|e| filter_course.is_none_or(|course| e.course == course))
        .filter_map(|e| position(e, grid, column_width))
        .collect();

    blocks.sort_by(|a, b| {
        a.event
            .day
            .cmp(&b.event.day)
            .then(a.event.start_minute_of_day().cmp(&b.event.start_minute_of_day()))
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, course: &str, day: i32, start: (u8, u8), end: (u8, u8)) -> ScheduleEvent {
        ScheduleEvent {
            id: id.into(),
            title: course.into(),
            course: course.into(),
            day,
            start_time: start.0,
            start_minute: start.1,
            end_time: end.0,
            end_minute: end.1,
            teacher: "N/A".into(),
            teacher_id: None,
            location: String::new(),
            color: "#000000".into(),
            class_id: None,
            subject_id: None,
        }
    }

    fn grid() -> GridConfig {
        GridConfig {
            start_hour: 8,
            end_hour: 18,
            pixels_per_hour: 80.0,
            header_height_px: 60.0,
            day_column_count: 7,
            time_column_width_px: 80.0,
            minimum_block_height_px: 24.0,
        }
    }

    #[test]
    fn wednesday_half_past_nine_for_an_hour() {
        let blocks = layout(&[event("e", "Maths", 2, (9, 30), (10, 30))], &grid(), 780.0, None);
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.top, 180.0);
        assert_eq!(b.height, 80.0);
        assert_eq!(b.left, 80.0 + 2.0 * 100.0);
        assert_eq!(b.width, 100.0);
    }

    #[test]
    fn reversed_times_use_floor_duration() {
        let e = event("e", "Maths", 1, (9, 30), (9, 15));
        assert_eq!(effective_duration_minutes(&e), FLOOR_DURATION_MINUTES);
        let blocks = layout(&[e], &grid(), 780.0, None);
        assert_eq!(blocks[0].height, 40.0);
        assert_eq!(blocks[0].top, 60.0 + 1.5 * 80.0);
    }

    #[test]
    fn zero_duration_uses_floor_duration() {
        let e = event("e", "Maths", 0, (11, 0), (11, 0));
        assert_eq!(block_height(&e, &grid()), 40.0);
    }

    #[test]
    fn short_lessons_get_minimum_height() {
        let e = event("e", "Maths", 0, (11, 0), (11, 5));
        assert_eq!(block_height(&e, &grid()), 24.0);

        let tall_minimum = GridConfig {
            minimum_block_height_px: 100.0,
            ..grid()
        };
        // The floor duration alone would give 40px.
        let reversed = event("r", "Maths", 0, (11, 0), (10, 0));
        assert_eq!(block_height(&reversed, &tall_minimum), 100.0);
    }

    #[test]
    fn no_block_is_shorter_than_minimum() {
        let g = grid();
        let mut events = Vec::new();
        for (i, (sh, sm, eh, em)) in [
            (8, 0, 8, 1),
            (9, 59, 10, 0),
            (12, 0, 11, 0),
            (0, 0, 23, 59),
            (17, 30, 17, 30),
        ]
        .into_iter()
        .enumerate()
        {
            events.push(event(&i.to_string(), "X", 3, (sh, sm), (eh, em)));
        }
        for b in layout(&events, &g, 1000.0, None) {
            assert!(b.height >= g.minimum_block_height_px);
        }
    }

    #[test]
    fn every_valid_event_gets_a_block() {
        let events: Vec<_> = (0..7)
            .map(|d| event(&format!("e{d}"), "Art", d, (8, 0), (9, 0)))
            .collect();
        let blocks = layout(&events, &grid(), 780.0, None);
        assert_eq!(blocks.len(), 7);
        for (d, b) in blocks.iter().enumerate() {
            assert_eq!(b.event.day, d as i32);
            assert_eq!(b.left, 80.0 + d as f64 * 100.0);
        }
    }

    #[test]
    fn out_of_range_days_are_excluded() {
        let events = vec![
            event("ok", "Art", 6, (8, 0), (9, 0)),
            event("neg", "Art", -1, (8, 0), (9, 0)),
            event("big", "Art", 7, (8, 0), (9, 0)),
        ];
        let blocks = layout(&events, &grid(), 780.0, None);
        let ids: Vec<&str> = blocks.iter().map(|b| b.event.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn work_week_grid_drops_weekend() {
        let g = GridConfig {
            day_column_count: 5,
            ..grid()
        };
        let events = vec![
            event("fri", "Art", 4, (8, 0), (9, 0)),
            event("sat", "Art", 5, (8, 0), (9, 0)),
        ];
        let blocks = layout(&events, &g, 580.0, None);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].width, 100.0);
    }

    #[test]
    fn filter_keeps_exact_course_only() {
        let events = vec![
            event("a", "Maths", 0, (8, 0), (9, 0)),
            event("b", "Maths II", 0, (9, 0), (10, 0)),
            event("c", "maths", 1, (8, 0), (9, 0)),
            event("d", "Maths", 2, (8, 0), (9, 0)),
        ];
        let blocks = layout(&events, &grid(), 780.0, Some("Maths"));
        let ids: Vec<&str> = blocks.iter().map(|b| b.event.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert!(blocks.iter().all(|b| b.event.course == "Maths"));

        assert!(layout(&events, &grid(), 780.0, Some("Physics")).is_empty());
    }

    #[test]
    fn overlapping_events_share_a_column() {
        let events = vec![
            event("a", "Maths", 1, (9, 0), (10, 0)),
            event("b", "Art", 1, (9, 30), (10, 30)),
        ];
        let blocks = layout(&events, &grid(), 780.0, None);
        assert_eq!(blocks[0].left, blocks[1].left);
        assert_eq!(blocks[0].width, blocks[1].width);
    }

    #[test]
    fn output_is_sorted_by_day_then_start() {
        let events = vec![
            event("late", "A", 1, (14, 0), (15, 0)),
            event("tue-b", "A", 1, (9, 0), (10, 0)),
            event("tue-a", "A", 1, (9, 0), (10, 0)),
            event("mon", "A", 0, (16, 0), (17, 0)),
        ];
        let blocks = layout(&events, &grid(), 780.0, None);
        let ids: Vec<&str> = blocks.iter().map(|b| b.event.id.as_str()).collect();
        assert_eq!(ids, vec!["mon", "tue-a", "tue-b", "late"]);
    }

    #[test]
    fn narrow_viewport_collapses_columns() {
        let blocks = layout(&[event("e", "A", 3, (8, 0), (9, 0))], &grid(), 40.0, None);
        assert_eq!(blocks[0].width, 0.0);
        assert_eq!(blocks[0].left, 80.0);
    }

    #[test]
    fn source_events_are_untouched() {
        let events = vec![event("e", "A", 3, (8, 0), (7, 0))];
        let before = events.clone();
        let blocks = layout(&events, &grid(), 780.0, None);
        assert_eq!(events, before);
        assert_eq!(blocks[0].event, before[0]);
    }
}
