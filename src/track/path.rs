use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::PathError;
use super::filter::{FilterParams, PathPoint, Rejection, TrackFilter};
use crate::catalog::TrackTarget;
use crate::predict::{geodetic_of, Propagator};

/// Time span walked by the path generator, boundary included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathWindow {
    start: DateTime<Utc>,
    step_ms: i64,
    steps: i64,
}

impl PathWindow {
    pub fn new(start: DateTime<Utc>, duration_s: f64, step_s: f64) -> Result<Self, PathError> {
        if !duration_s.is_finite() || duration_s < 0.0 {
            return Err(PathError::InvalidWindow(format!(
                "duration must be non-negative, got {duration_s}s"
            )));
        }
        let step_ms = (step_s * 1000.0).round();
        if !step_ms.is_finite() || step_ms < 1.0 {
            return Err(PathError::InvalidWindow(format!(
                "step must be at least 1ms, got {step_s}s"
            )));
        }
        let steps = ((duration_s * 1000.0) / step_ms + 1e-9).floor() as i64;
        Ok(Self {
            start,
            step_ms: step_ms as i64,
            steps,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant visited, i.e. the boundary when the step divides the duration.
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.start + Duration::milliseconds(self.steps * self.step_ms)
    }

    pub fn instants(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..=self.steps).map(move |i| self.start + Duration::milliseconds(i * self.step_ms))
    }
}

/// An accepted sub-point together with the instant it was sampled at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSample {
    pub timestamp: DateTime<Utc>,
    pub point: PathPoint,
}

/// Filtered ground track with its start and stop markers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroundTrack {
    pub norad_id: u32,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub points: Vec<PathPoint>,
    pub start_marker: PathPoint,
    pub stop_marker: PathPoint,
}

/// Walks the window and returns the samples surviving the filters, in time order.
pub fn sample_ground_track(
    propagator: &dyn Propagator,
    target: &TrackTarget,
    window: &PathWindow,
    params: &FilterParams,
) -> Result<Vec<GroundSample>, PathError> {
    let mut filter = TrackFilter::new(*params);
    let mut samples = Vec::new();
    let (mut polar, mut jumps, mut duplicates) = (0usize, 0usize, 0usize);

    for timestamp in window.instants() {
        let ecef = propagator.position(target, timestamp)?;
        let (lat, lon) = geodetic_of(ecef);
        match filter.accept(lat.to_degrees(), lon.to_degrees()) {
            Ok(point) => samples.push(GroundSample { timestamp, point }),
            Err(Rejection::Polar) => polar += 1,
            Err(Rejection::Jump) => jumps += 1,
            Err(Rejection::Duplicate) => duplicates += 1,
        }
    }

    log::debug!(
        "{}: {} samples kept, dropped {} polar, {} jumps, {} duplicates",
        target.name,
        samples.len(),
        polar,
        jumps,
        duplicates
    );
    Ok(samples)
}

pub fn generate_path(
    propagator: &dyn Propagator,
    target: &TrackTarget,
    window: &PathWindow,
    params: &FilterParams,
) -> Result<GroundTrack, PathError> {
    let samples = sample_ground_track(propagator, target, window, params)?;
    let points: Vec<PathPoint> = samples.iter().map(|s| s.point).collect();

    let (Some(&start_marker), Some(&stop_marker)) = (points.first(), points.last()) else {
        return Err(PathError::EmptyPath(target.norad_id));
    };

    Ok(GroundTrack {
        norad_id: target.norad_id,
        name: target.name.clone(),
        start: window.start(),
        end: window.last_instant(),
        points,
        start_marker,
        stop_marker,
    })
}
