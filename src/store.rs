use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::model::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
}

/// Read-only queries against the school's data store.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn enrolled_classes(&self, student: &StudentId) -> Result<Vec<Enrollment>, StoreError>;

    async fn timetable_slots(&self, class_ids: &[ClassId]) -> Result<Vec<TimetableSlot>, StoreError>;

    /// `Ok(None)` when no teacher is assigned to the pair.
    async fn teacher_assignment(
        &self,
        key: &AssignmentKey,
    ) -> Result<Option<TeacherAssignment>, StoreError>;
}

// ── Fixture format ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(flatten)]
    pub key: AssignmentKey,
    #[serde(flatten)]
    pub assignment: TeacherAssignment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub slots: Vec<TimetableSlot>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
}

// ── In-memory implementation ─────────────────────────────────────

pub struct InMemoryStore {
    enrollments: DashMap<StudentId, Vec<ClassId>>,
    slots: DashMap<String, TimetableSlot>,
    assignments: DashMap<AssignmentKey, TeacherAssignment>,
    lookup_counts: DashMap<AssignmentKey, usize>,
    lookups_total: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            enrollments: DashMap::new(),
            slots: DashMap::new(),
            assignments: DashMap::new(),
            lookup_counts: DashMap::new(),
            lookups_total: AtomicUsize::new(0),
        }
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let store = Self::new();
        for e in dataset.enrollments {
            store.enroll(e.student_id, e.class_id);
        }
        for slot in dataset.slots {
            store.insert_slot(slot);
        }
        for record in dataset.assignments {
            store.assign(record.key, record.assignment);
        }
        store
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_dataset(serde_json::from_str(json)?))
    }

    pub fn enroll(&self, student: StudentId, class_id: ClassId) {
        self.enrollments.entry(student).or_default().push(class_id);
    }

    pub fn insert_slot(&self, slot: TimetableSlot) {
        self.slots.insert(slot.id.clone(), slot);
    }

    pub fn remove_slot(&self, id: &str) -> Option<TimetableSlot> {
        self.slots.remove(id).map(|(_, slot)| slot)
    }

    pub fn assign(&self, key: AssignmentKey, assignment: TeacherAssignment) {
        self.assignments.insert(key, assignment);
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total teacher lookups served since creation.
    pub fn lookups_total(&self) -> usize {
        self.lookups_total.load(Ordering::Relaxed)
    }

    pub fn lookups_for(&self, key: &AssignmentKey) -> usize {
        self.lookup_counts.get(key).map(|c| *c.value()).unwrap_or(0)
    }

    pub fn reset_lookup_counts(&self) {
        self.lookup_counts.clear();
        self.lookups_total.store(0, Ordering::Relaxed);
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn enrolled_classes(&self, student: &StudentId) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .enrollments
            .get(student)
            .map(|classes| {
                classes
                    .iter()
                    .map(|class_id| Enrollment {
                        student_id: student.clone(),
                        class_id: class_id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn timetable_slots(&self, class_ids: &[ClassId]) -> Result<Vec<TimetableSlot>, StoreError> {
        Ok(self
            .slots
            .iter()
            .filter(|e| {
                e.value()
                    .class_id
                    .as_ref()
                    .is_some_and(|c| class_ids.contains(c))
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn teacher_assignment(
        &self,
        key: &AssignmentKey,
    ) -> Result<Option<TeacherAssignment>, StoreError> {
        self.lookups_total.fetch_add(1, Ordering::Relaxed);
        *self.lookup_counts.entry(key.clone()).or_default() += 1;
        Ok(self.assignments.get(key).map(|a| a.value().clone()))
    }
}
