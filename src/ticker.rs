use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::store::ScheduleStore;
use crate::view::ScheduleView;

/// Background task that keeps the current-time marker in step with the wall clock.
/// Each tick reads the clock fresh; blocks are never recomputed here.
pub async fn run_marker_ticker<S: ScheduleStore + ?Sized>(view: Arc<ScheduleView<S>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let now = chrono::Local::now().naive_local();
        match view.refresh_marker(now) {
            Some(marker) => debug!(top = marker.top, day = ?marker.day, "marker tick"),
            None => debug!("marker tick: outside grid hours"),
        }
    }
}
