use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::limits::MAX_LOOKUP_RETRIES;
use crate::model::*;
use crate::store::{ScheduleStore, StoreError};

use super::ResolverConfig;

/// Distinct assignment pairs referenced by `slots`. Slots missing either ID are skipped.
pub fn assignment_keys(slots: &[TimetableSlot]) -> BTreeSet<AssignmentKey> {
    slots.iter().filter_map(TimetableSlot::assignment_key).collect()
}

#[derive(Debug)]
pub enum LookupOutcome {
    Found(TeacherAssignment),
    NotFound,
    Failed(StoreError),
    TimedOut,
}

impl LookupOutcome {
    fn is_final(&self) -> bool {
        matches!(self, LookupOutcome::Found(_) | LookupOutcome::NotFound)
    }

    fn reason(&self) -> &'static str {
        match self {
            LookupOutcome::Found(_) => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::Failed(_) => "failed",
            LookupOutcome::TimedOut => "timed_out",
        }
    }
}

/// Teachers found in one pass. Keys absent here render as the sentinel.
#[derive(Debug, Default)]
pub struct AssignmentResolution {
    pub teachers: HashMap<AssignmentKey, TeacherAssignment>,
    pub fallbacks: usize,
}

async fn lookup_once<S: ScheduleStore + ?Sized>(
    store: &S,
    key: &AssignmentKey,
    timeout: Duration,
) -> LookupOutcome {
    metrics::counter!(crate::observability::ASSIGNMENT_LOOKUPS_TOTAL).increment(1);
    match tokio::time::timeout(timeout, store.teacher_assignment(key)).await {
        Ok(Ok(Some(assignment))) if !assignment.teacher_name.trim().is_empty() => {
            LookupOutcome::Found(assignment)
        }
        Ok(Ok(_)) => LookupOutcome::NotFound,
        Ok(Err(e)) => LookupOutcome::Failed(e),
        Err(_) => LookupOutcome::TimedOut,
    }
}

/// Single attempt plus up to `lookup_retries` more for failures and timeouts.
pub(super) async fn lookup_with_retry<S: ScheduleStore + ?Sized>(
    store: &S,
    key: &AssignmentKey,
    config: &ResolverConfig,
) -> LookupOutcome {
    let attempts = config.lookup_retries.min(MAX_LOOKUP_RETRIES) + 1;
    let mut attempt = 1;
    loop {
        let outcome = lookup_once(store, key, config.lookup_timeout).await;
        if outcome.is_final() || attempt >= attempts {
            return outcome;
        }
        debug!("lookup {key} attempt {attempt}/{attempts} {}, retrying", outcome.reason());
        attempt += 1;
    }
}

/// Look up every key concurrently and wait for all of them to settle.
pub async fn resolve_assignments<S: ScheduleStore + ?Sized>(
    store: &S,
    keys: BTreeSet<AssignmentKey>,
    config: &ResolverConfig,
) -> AssignmentResolution {
    let lookups = keys.into_iter().map(|key| async move {
        let outcome = lookup_with_retry(store, &key, config).await;
        (key, outcome)
    });
    let settled = join_all(lookups).await;

    let mut resolution = AssignmentResolution {
        teachers: HashMap::with_capacity(settled.len()),
        fallbacks: 0,
    };
    for (key, outcome) in settled {
        if !matches!(outcome, LookupOutcome::Found(_)) {
            resolution.fallbacks += 1;
            metrics::counter!(
                crate::observability::ASSIGNMENT_FALLBACKS_TOTAL,
                "reason" => outcome.reason()
            )
            .increment(1);
        }
        match outcome {
            LookupOutcome::Found(assignment) => {
                resolution.teachers.insert(key, assignment);
            }
            LookupOutcome::NotFound => debug!("no teacher assigned to {key}"),
            LookupOutcome::Failed(e) => warn!("assignment lookup {key} failed: {e}"),
            LookupOutcome::TimedOut => {
                warn!("assignment lookup {key} timed out after {:?}", config.lookup_timeout)
            }
        }
    }
    resolution
}
