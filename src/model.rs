use std::fmt;

use serde::{Deserialize, Serialize};

use crate::limits::{NOT_AVAILABLE, UNKNOWN_COURSE};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// The person whose schedule is shown (a student, or a parent's selected child).
    StudentId
);
string_id!(ClassId);
string_id!(
    /// An academic subject taught to a class (maths, history, ...).
    SubjectId
);
string_id!(TeacherId);

// ── Upstream records ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: StudentId,
    pub class_id: ClassId,
}

/// One raw timetable row as stored upstream. Nothing here is validated by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    /// Subject display name, joined from the subjects table.
    #[serde(default)]
    pub subject_name: Option<String>,
    /// 0 = Monday.
    #[serde(default)]
    pub day: Option<i32>,
    #[serde(default)]
    pub start_hour: Option<i32>,
    #[serde(default)]
    pub start_minute: Option<i32>,
    #[serde(default)]
    pub end_hour: Option<i32>,
    #[serde(default)]
    pub end_minute: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
}

impl TimetableSlot {
    /// The assignment pair, if both halves are present.
    pub fn assignment_key(&self) -> Option<AssignmentKey> {
        match (&self.class_id, &self.subject_id) {
            (Some(class_id), Some(subject_id)) => Some(AssignmentKey {
                class_id: class_id.clone(),
                subject_id: subject_id.clone(),
            }),
            _ => None,
        }
    }
}

/// `(class, subject)`, the unit of teacher lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentKey {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.class_id, self.subject_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub teacher_name: String,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
}

// ── Derived records ──────────────────────────────────────────────

/// A display-ready weekly occurrence built from one slot plus its resolved teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: String,
    pub title: String,
    pub course: String,
    /// Kept as received so the layout can reject out-of-range columns.
    pub day: i32,
    pub start_time: u8,
    pub start_minute: u8,
    pub end_time: u8,
    pub end_minute: u8,
    pub teacher: String,
    pub teacher_id: Option<TeacherId>,
    pub location: String,
    pub color: String,
    pub class_id: Option<ClassId>,
    pub subject_id: Option<SubjectId>,
}

impl ScheduleEvent {
    pub fn start_minute_of_day(&self) -> i32 {
        crate::time::minute_of_day(self.start_time, self.start_minute)
    }

    pub fn end_minute_of_day(&self) -> i32 {
        crate::time::minute_of_day(self.end_time, self.end_minute)
    }

    /// `"09:30-10:15"`.
    pub fn time_label(&self) -> String {
        format!(
            "{}-{}",
            crate::time::format_hm(self.start_time, self.start_minute),
            crate::time::format_hm(self.end_time, self.end_minute)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBlock {
    pub event: ScheduleEvent,
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

/// The "now" line. `day` is today's column, if the shown week contains today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeMarker {
    pub top: f64,
    pub day: Option<u8>,
}

/// Caller-supplied strings for the sentinels that end up in events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labels {
    pub not_available: String,
    pub unknown_course: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            not_available: NOT_AVAILABLE.to_string(),
            unknown_course: UNKNOWN_COURSE.to_string(),
        }
    }
}
