use crate::store::StoreError;

/// A pass-level failure. Individual teacher lookups never produce one of these.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("enrollment fetch failed: {0}")]
    EnrollmentFetch(#[source] StoreError),
    #[error("timetable fetch failed: {0}")]
    TimetableFetch(#[source] StoreError),
}
