//! Week-grid geometry: where each event sits in pixels, and where "now" is.
//!
//! Everything here is a pure function of its inputs. Overlapping events on the
//! same day share one column and simply stack in paint order; there is no
//! sub-column packing.

mod blocks;
mod grid;
mod marker;

pub use blocks::{block_height, effective_duration_minutes, layout};
pub use grid::{GridConfig, GridError, HourLine};
pub use marker::{current_time_marker_position, marker_position, time_marker};
