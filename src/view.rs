use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::layout::{GridConfig, layout, time_marker};
use crate::model::*;
use crate::resolver::ScheduleResolver;
use crate::store::ScheduleStore;
use crate::time::Week;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No student selected.
    Idle,
    Loading,
    Ready,
    /// The pass failed outright; the UI offers a retry.
    Failed(String),
}

/// Everything the renderer reads, replaced as a whole on every change.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub student: Option<StudentId>,
    /// Bumped on every selection change; results from older generations are dropped.
    pub generation: u64,
    pub week: Week,
    pub status: LoadStatus,
    pub events: Arc<[ScheduleEvent]>,
    /// Distinct courses for the filter selector, sorted.
    pub courses: Arc<[String]>,
    pub filter: Option<String>,
    pub width_px: f64,
    pub blocks: Arc<[PositionedBlock]>,
}

impl ViewSnapshot {
    fn relayout(&mut self, grid: &GridConfig) {
        self.blocks = layout(&self.events, grid, self.width_px, self.filter.as_deref()).into();
    }

    fn with_events(&self, events: Vec<ScheduleEvent>, grid: &GridConfig) -> Self {
        let courses: BTreeSet<String> = events.iter().map(|e| e.course.clone()).collect();
        let mut next = Self {
            events: events.into(),
            courses: courses.into_iter().collect::<Vec<_>>().into(),
            status: LoadStatus::Ready,
            ..self.clone()
        };
        next.relayout(grid);
        next
    }

    fn cleared(&self, student: Option<StudentId>, status: LoadStatus) -> Self {
        Self {
            student,
            generation: self.generation + 1,
            status,
            events: Arc::from([]),
            courses: Arc::from([]),
            blocks: Arc::from([]),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// The selection changed while resolving; nothing was written.
    Discarded,
    /// `reload` with no student selected.
    NothingSelected,
}

/// Owns the schedule state for one screen. Only this type replaces the snapshot.
pub struct ScheduleView<S: ?Sized> {
    resolver: ScheduleResolver<S>,
    grid: GridConfig,
    state: watch::Sender<Arc<ViewSnapshot>>,
    marker: watch::Sender<Option<TimeMarker>>,
}

impl<S: ScheduleStore + ?Sized> ScheduleView<S> {
    pub fn new(resolver: ScheduleResolver<S>, grid: GridConfig, week: Week, width_px: f64) -> Self {
        let initial = ViewSnapshot {
            student: None,
            generation: 0,
            week,
            status: LoadStatus::Idle,
            events: Arc::from([]),
            courses: Arc::from([]),
            filter: None,
            width_px,
            blocks: Arc::from([]),
        };
        Self {
            resolver,
            grid,
            state: watch::channel(Arc::new(initial)).0,
            marker: watch::channel(None).0,
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn resolver(&self) -> &ScheduleResolver<S> {
        &self.resolver
    }

    pub fn snapshot(&self) -> Arc<ViewSnapshot> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewSnapshot>> {
        self.state.subscribe()
    }

    pub fn marker(&self) -> Option<TimeMarker> {
        *self.marker.borrow()
    }

    pub fn subscribe_marker(&self) -> watch::Receiver<Option<TimeMarker>> {
        self.marker.subscribe()
    }

    /// Select `student` and resolve their week. If another selection happens before this
    /// pass finishes, the result is dropped.
    pub async fn load(&self, student: StudentId) -> LoadOutcome {
        self.load_week(student, self.snapshot().week).await
    }

    pub async fn load_week(&self, student: StudentId, week: Week) -> LoadOutcome {
        let mut generation = 0;
        self.state.send_modify(|current| {
            let mut next = current.cleared(Some(student.clone()), LoadStatus::Loading);
            next.week = week;
            generation = next.generation;
            *current = Arc::new(next);
        });
        self.resolve_into(student, week, generation).await
    }

    /// Resolve the current selection again, keeping it selected.
    pub async fn reload(&self) -> LoadOutcome {
        let snapshot = self.snapshot();
        match &snapshot.student {
            Some(student) => self.load_week(student.clone(), snapshot.week).await,
            None => LoadOutcome::NothingSelected,
        }
    }

    /// Deselect (e.g. a parent who has not picked a child). Any pass in flight is dropped.
    pub fn clear_selection(&self) {
        self.state.send_modify(|current| {
            *current = Arc::new(current.cleared(None, LoadStatus::Idle));
        });
    }

    async fn resolve_into(&self, student: StudentId, week: Week, generation: u64) -> LoadOutcome {
        let result = self.resolver.resolve(&student, week).await;

        let mut outcome = LoadOutcome::Discarded;
        self.state.send_if_modified(|current| {
            if current.generation != generation {
                return false;
            }
            let next = match &result {
                Ok(schedule) => {
                    outcome = LoadOutcome::Applied;
                    current.with_events(schedule.events.clone(), &self.grid)
                }
                Err(e) => {
                    outcome = LoadOutcome::Failed;
                    ViewSnapshot {
                        status: LoadStatus::Failed(e.to_string()),
                        ..(**current).clone()
                    }
                }
            };
            *current = Arc::new(next);
            true
        });

        match outcome {
            LoadOutcome::Discarded => {
                metrics::counter!(crate::observability::STALE_RESULTS_DISCARDED_TOTAL).increment(1);
                debug!(%student, generation, "selection changed during resolve, result dropped");
            }
            LoadOutcome::Applied => {
                info!(%student, generation, blocks = self.snapshot().blocks.len(), "schedule applied");
            }
            _ => {}
        }
        outcome
    }

    /// Change the course filter. Returns whether anything changed.
    pub fn set_filter(&self, filter: Option<String>) -> bool {
        self.state.send_if_modified(|current| {
            if current.filter == filter {
                return false;
            }
            let mut next = (**current).clone();
            next.filter = filter.clone();
            next.relayout(&self.grid);
            *current = Arc::new(next);
            true
        })
    }

    /// Viewport resize.
    pub fn set_width(&self, width_px: f64) -> bool {
        self.state.send_if_modified(|current| {
            if current.width_px == width_px {
                return false;
            }
            let mut next = (**current).clone();
            next.width_px = width_px;
            next.relayout(&self.grid);
            *current = Arc::new(next);
            true
        })
    }

    /// Recompute the marker from `now`. Leaves the snapshot alone.
    pub fn refresh_marker(&self, now: NaiveDateTime) -> Option<TimeMarker> {
        let week = self.snapshot().week;
        let marker = time_marker(&self.grid, &week, now);
        self.marker.send_if_modified(|current| {
            if *current == marker {
                return false;
            }
            *current = marker;
            true
        });
        marker
    }
}
