mod assignments;
mod error;
mod format;

pub use assignments::{assignment_keys, resolve_assignments, AssignmentResolution, LookupOutcome};
pub use error::ResolveError;
pub use format::{build_event, course_color};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::store::ScheduleStore;
use crate::time::Week;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Per-attempt bound on a single teacher lookup.
    pub lookup_timeout: Duration,
    /// Extra attempts after a failed or timed-out lookup. Capped at `MAX_LOOKUP_RETRIES`.
    pub lookup_retries: u32,
    pub labels: Labels,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            lookup_retries: 0,
            labels: Labels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSchedule {
    pub student: StudentId,
    pub week: Week,
    /// Unordered; the layout positions by day and time.
    pub events: Vec<ScheduleEvent>,
}

impl ResolvedSchedule {
    fn empty(student: &StudentId, week: Week) -> Self {
        Self {
            student: student.clone(),
            week,
            events: Vec::new(),
        }
    }
}

/// Turns a student's enrollments into display-ready weekly events.
///
/// The caller must hold a student identity before calling [`resolve`](Self::resolve);
/// there is no "no student" input.
pub struct ScheduleResolver<S: ?Sized> {
    store: Arc<S>,
    config: ResolverConfig,
}

impl<S: ScheduleStore + ?Sized> ScheduleResolver<S> {
    pub fn new(store: Arc<S>, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn resolve(
        &self,
        student: &StudentId,
        week: Week,
    ) -> Result<ResolvedSchedule, ResolveError> {
        let pass_id = Ulid::new();
        let started = Instant::now();
        let result = self.resolve_pass(pass_id, student, week).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(crate::observability::RESOLVE_PASSES_TOTAL, "status" => status)
            .increment(1);
        metrics::histogram!(crate::observability::RESOLVE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            tracing::error!(pass = %pass_id, %student, "resolve failed: {e}");
        }
        result
    }

    async fn resolve_pass(
        &self,
        pass_id: Ulid,
        student: &StudentId,
        week: Week,
    ) -> Result<ResolvedSchedule, ResolveError> {
        let class_ids = self.enrolled_class_ids(student).await?;
        if class_ids.is_empty() {
            debug!(pass = %pass_id, %student, "not enrolled in any class");
            return Ok(ResolvedSchedule::empty(student, week));
        }

        let slots = self.fetch_slots(&class_ids).await?;
        if slots.is_empty() {
            debug!(pass = %pass_id, %student, classes = class_ids.len(), "no timetable slots");
            return Ok(ResolvedSchedule::empty(student, week));
        }

        let keys = assignment_keys(&slots);
        let key_count = keys.len();
        let resolution = resolve_assignments(self.store.as_ref(), keys, &self.config).await;

        // Only after every lookup has settled.
        let events: Vec<ScheduleEvent> = slots
            .iter()
            .filter_map(|slot| build_event(slot, &resolution.teachers, &self.config.labels))
            .collect();

        info!(
            pass = %pass_id,
            %student,
            classes = class_ids.len(),
            slots = slots.len(),
            lookups = key_count,
            fallbacks = resolution.fallbacks,
            events = events.len(),
            "schedule resolved"
        );

        Ok(ResolvedSchedule {
            student: student.clone(),
            week,
            events,
        })
    }

    /// Enrolled classes in first-seen order, duplicates removed.
    async fn enrolled_class_ids(&self, student: &StudentId) -> Result<Vec<ClassId>, ResolveError> {
        let enrollments = self
            .store
            .enrolled_classes(student)
            .await
            .map_err(ResolveError::EnrollmentFetch)?;
        let mut seen = HashSet::new();
        Ok(enrollments
            .into_iter()
            .map(|e| e.class_id)
            .filter(|c| seen.insert(c.clone()))
            .collect())
    }

    async fn fetch_slots(&self, class_ids: &[ClassId]) -> Result<Vec<TimetableSlot>, ResolveError> {
        let mut slots = Vec::new();
        for batch in class_ids.chunks(MAX_CLASS_IDS_PER_QUERY) {
            let rows = self
                .store
                .timetable_slots(batch)
                .await
                .map_err(ResolveError::TimetableFetch)?;
            slots.extend(rows);
        }
        Ok(slots)
    }
}
