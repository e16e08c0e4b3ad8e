mod error;
mod events;
mod sample;
mod tracker;

pub use error::TrackerError;
pub use events::{spawn_event_logger, StopReason, TrackerEvent};
pub use sample::{preview_pointing, PointingPreview, PointingSample};
pub use tracker::{Tracker, TrackerMode, TrackerStatus, DEFAULT_CADENCE};
