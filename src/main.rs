use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use weekgrid::config::Settings;
use weekgrid::resolver::ScheduleResolver;
use weekgrid::store::InMemoryStore;
use weekgrid::ticker::run_marker_ticker;
use weekgrid::view::{LoadStatus, ScheduleView};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    weekgrid::observability::init(settings.metrics_port)?;

    let data_path = settings
        .data_path
        .clone()
        .ok_or("WEEKGRID_DATA must point at a JSON dataset")?;
    // A parent with no child picked yet has nothing to resolve.
    let Some(student) = settings
        .student
        .clone()
        .or_else(|| std::env::args().nth(1).map(Into::into))
    else {
        info!("no student selected (set WEEKGRID_STUDENT or pass one as an argument)");
        return Ok(());
    };

    let store = Arc::new(InMemoryStore::from_json(&std::fs::read_to_string(&data_path)?)?);
    info!("weekgrid preview");
    info!("  data: {} ({} slots)", data_path.display(), store.slot_count());
    info!("  student: {student}");
    info!("  week of: {}", settings.week.start());
    info!(
        "  grid: {:02}:00-{:02}:00, {} columns, {}px/h",
        settings.grid.start_hour,
        settings.grid.end_hour,
        settings.grid.day_column_count,
        settings.grid.pixels_per_hour
    );

    let resolver = ScheduleResolver::new(store, settings.resolver.clone());
    let view = Arc::new(ScheduleView::new(
        resolver,
        settings.grid.clone(),
        settings.week,
        settings.width_px,
    ));
    view.set_filter(settings.filter.clone());
    view.load(student).await;

    let snapshot = view.snapshot();
    if let LoadStatus::Failed(reason) = &snapshot.status {
        return Err(format!("could not load schedule: {reason}").into());
    }
    println!("{}", serde_json::to_string_pretty(&*snapshot.blocks)?);
    view.refresh_marker(chrono::Local::now().naive_local());
    match view.marker() {
        Some(marker) => info!("now marker at {:.1}px (column {:?})", marker.top, marker.day),
        None => info!("now is outside grid hours"),
    }

    if !settings.watch {
        return Ok(());
    }

    let ticker = tokio::spawn(run_marker_ticker(view.clone(), settings.tick_interval));
    let mut markers = view.subscribe_marker();

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("SIGTERM handler unavailable: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = markers.changed() => {
                if changed.is_err() {
                    break;
                }
                let marker = *markers.borrow_and_update();
                match marker {
                    Some(m) => info!("now marker moved to {:.1}px", m.top),
                    None => info!("now marker hidden (outside grid hours)"),
                }
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    ticker.abort();
    info!("weekgrid stopped");
    Ok(())
}
