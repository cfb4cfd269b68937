use std::collections::HashMap;

use tracing::warn;

use crate::model::*;
use crate::time::{clamp_hour, clamp_minute, Clamped};

/// Stable `#rrggbb` color for a course name.
pub fn course_color(course: &str) -> String {
    let hash = course.chars().fold(0i32, |h, c| {
        (c as i32).wrapping_add(h.wrapping_shl(5).wrapping_sub(h))
    });
    let channel = |shift: u32| (hash >> shift) & 0xff;
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(8), channel(16))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn checked(slot_id: &str, field: &'static str, value: Clamped) -> u8 {
    match value {
        Clamped::Valid(_) => {}
        Clamped::Missing => {
            warn!(slot = slot_id, field, "slot field missing, defaulting to 0");
        }
        Clamped::OutOfRange { raw, clamped } => {
            warn!(slot = slot_id, field, raw, clamped, "slot field out of range, clamped");
        }
    }
    if value.was_adjusted() {
        metrics::counter!(crate::observability::MALFORMED_SLOTS_TOTAL, "field" => field)
            .increment(1);
    }
    value.value()
}

/// Merge one raw slot with the pass's resolved teachers.
///
/// Returns `None` only when the slot has no day at all.
pub fn build_event(
    slot: &TimetableSlot,
    teachers: &HashMap<AssignmentKey, TeacherAssignment>,
    labels: &Labels,
) -> Option<ScheduleEvent> {
    let Some(day) = slot.day else {
        warn!(slot = %slot.id, "slot has no day, skipping");
        metrics::counter!(crate::observability::MALFORMED_SLOTS_TOTAL, "field" => "day")
            .increment(1);
        return None;
    };

    let start_time = checked(&slot.id, "start_hour", clamp_hour(slot.start_hour));
    let start_minute = checked(&slot.id, "start_minute", clamp_minute(slot.start_minute));
    let end_time = checked(&slot.id, "end_hour", clamp_hour(slot.end_hour));
    let end_minute = checked(&slot.id, "end_minute", clamp_minute(slot.end_minute));

    let course = non_blank(slot.subject_name.as_deref())
        .unwrap_or(labels.unknown_course.as_str())
        .to_string();
    let title = non_blank(slot.title.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| course.clone());

    let assignment = slot.assignment_key().and_then(|key| teachers.get(&key));
    let teacher = assignment
        .map(|a| a.teacher_name.clone())
        .unwrap_or_else(|| labels.not_available.clone());

    Some(ScheduleEvent {
        id: slot.id.clone(),
        title,
        color: course_color(&course),
        course,
        day,
        start_time,
        start_minute,
        end_time,
        end_minute,
        teacher,
        teacher_id: assignment.and_then(|a| a.teacher_id.clone()),
        location: slot.location.clone().unwrap_or_default(),
        class_id: slot.class_id.clone(),
        subject_id: slot.subject_id.clone(),
    })
}
