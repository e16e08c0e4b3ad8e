use chrono::{DateTime, Utc};

use super::error::PredictError;
use super::frames::geodetic_to_ecef;
use super::propagation::Propagator;
use crate::catalog::TrackTarget;

type Script = dyn Fn(&TrackTarget, DateTime<Utc>) -> Result<(f64, f64), PredictError> + Send + Sync;

/// Propagator whose sub-points (lat, lon in degrees) come from a closure.
pub struct ScriptedPropagator {
    script: Box<Script>,
    altitude_km: f64,
}

impl ScriptedPropagator {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&TrackTarget, DateTime<Utc>) -> Result<(f64, f64), PredictError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            altitude_km: 500.0,
        }
    }

    pub fn fixed(lat_deg: f64, lon_deg: f64) -> Self {
        Self::new(move |_, _| Ok((lat_deg, lon_deg)))
    }
}

impl Propagator for ScriptedPropagator {
    fn position(&self, target: &TrackTarget, at: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
        let (lat, lon) = (self.script)(target, at)?;
        Ok(geodetic_to_ecef(lat.to_radians(), lon.to_radians(), self.altitude_km))
    }
}
