use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use super::sample::PointingSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    DeviceClosed,
}

/// Published by the tracker for whoever is listening (UI, logs).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    SessionStarted { norad_id: u32, name: String },
    SampleSent { norad_id: u32, sample: PointingSample },
    SampleFailed { norad_id: u32, reason: String },
    WriteFailed { norad_id: u32, reason: String },
    SessionStopped { norad_id: u32, reason: StopReason },
}

fn log_event(event: &TrackerEvent) {
    match event {
        TrackerEvent::SessionStarted { norad_id, name } => {
            log::info!("Session started: {} (NORAD {})", name, norad_id)
        }
        TrackerEvent::SampleSent { norad_id, sample } => log::debug!(
            "NORAD {}: az {:.2} el {:.2}",
            norad_id,
            sample.azimuth_deg,
            sample.elevation_deg
        ),
        TrackerEvent::SampleFailed { norad_id, reason } => {
            log::warn!("NORAD {}: no sample: {}", norad_id, reason)
        }
        TrackerEvent::WriteFailed { norad_id, reason } => {
            log::warn!("NORAD {}: write failed: {}", norad_id, reason)
        }
        TrackerEvent::SessionStopped { norad_id, reason } => {
            log::info!("Session stopped: NORAD {} ({:?})", norad_id, reason)
        }
    }
}

/// Forwards tracker events to the log until the channel closes.
pub fn spawn_event_logger(mut events: broadcast::Receiver<TrackerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Event logger fell behind, {} events skipped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
