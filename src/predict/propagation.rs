use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use super::error::PredictError;
use super::frames::teme_to_ecef_position;
use crate::catalog::TrackTarget;

/// Source of Earth-fixed positions for catalog targets.
pub trait Propagator: Send + Sync {
    /// Earth-fixed position (km) of `target` at `at`.
    fn position(&self, target: &TrackTarget, at: DateTime<Utc>) -> Result<[f64; 3], PredictError>;
}

struct PreparedOrbit {
    line1: String,
    line2: String,
    elements: Elements,
    constants: Constants,
}

/// SGP4 propagator; element sets are parsed once per target and reused.
#[derive(Default)]
pub struct Sgp4Propagator {
    orbits: StdMutex<HashMap<u32, Arc<PreparedOrbit>>>,
}

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&self, target: &TrackTarget) -> Result<Arc<PreparedOrbit>, PredictError> {
        let mut orbits = self.orbits.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(orbit) = orbits.get(&target.norad_id) {
            if orbit.line1 == target.line1 && orbit.line2 == target.line2 {
                return Ok(orbit.clone());
            }
        }

        let invalid = |message: String| PredictError::InvalidTle {
            norad_id: target.norad_id,
            message,
        };
        let elements = Elements::from_tle(
            Some(target.name.clone()),
            target.line1.as_bytes(),
            target.line2.as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let orbit = Arc::new(PreparedOrbit {
            line1: target.line1.clone(),
            line2: target.line2.clone(),
            elements,
            constants,
        });
        orbits.insert(target.norad_id, orbit.clone());
        Ok(orbit)
    }
}

impl Propagator for Sgp4Propagator {
    fn position(&self, target: &TrackTarget, at: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
        let orbit = self.prepare(target)?;
        let timestamp = at.naive_utc();

        let minutes = orbit
            .elements
            .datetime_to_minutes_since_epoch(&timestamp)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let prediction = orbit
            .constants
            .propagate(minutes)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp));
        Ok(teme_to_ecef_position(prediction.position, sidereal))
    }
}
