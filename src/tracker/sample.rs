use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::TrackTarget;
use crate::mount::{mount_azimuth, MountCommand};
use crate::predict::{azimuth_elevation, Observer, PredictError, Propagator};
use crate::track::PathWindow;

/// Look angles at one instant. Azimuth is clockwise from north in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PointingSample {
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl PointingSample {
    pub fn mount_command(&self) -> MountCommand {
        MountCommand::point(mount_azimuth(self.azimuth_deg), self.elevation_deg)
    }
}

pub fn sample_pointing(
    propagator: &dyn Propagator,
    target: &TrackTarget,
    observer: &Observer,
    timestamp: DateTime<Utc>,
) -> Result<PointingSample, PredictError> {
    let ecef = propagator.position(target, timestamp)?;
    let (az, el) = azimuth_elevation(ecef, observer);
    Ok(PointingSample {
        timestamp,
        azimuth_deg: az.to_degrees().rem_euclid(360.0),
        elevation_deg: el.to_degrees(),
    })
}

/// Look angles over a whole window, without touching the mount.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PointingPreview {
    pub norad_id: u32,
    pub name: String,
    pub samples: Vec<PointingSample>,
}

/// Samples every instant of `window`. Unlike a live session, one failed
/// propagation fails the whole preview.
pub fn preview_pointing(
    propagator: &dyn Propagator,
    target: &TrackTarget,
    observer: &Observer,
    window: &PathWindow,
) -> Result<PointingPreview, PredictError> {
    let samples = window
        .instants()
        .map(|at| sample_pointing(propagator, target, observer, at))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PointingPreview {
        norad_id: target.norad_id,
        name: target.name.clone(),
        samples,
    })
}
