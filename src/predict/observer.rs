use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use utoipa::ToSchema;

use super::error::PredictError;
use super::frames::geodetic_to_ecef;

/// Geodetic position of the ground station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Result<Self, PredictError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "latitude {latitude_deg} out of range"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(PredictError::InvalidObserver(format!(
                "longitude {longitude_deg} out of range"
            )));
        }
        if !altitude_m.is_finite() {
            return Err(PredictError::InvalidObserver("altitude is not finite".into()));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        })
    }

    /// Parses a `"lat, lon"` pair.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Result<Self, PredictError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(PredictError::InvalidObserver(format!(
                "expected \"lat, lon\", got {coordinates:?}"
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| PredictError::InvalidObserver(format!("{s:?}: {e}")))
        };
        Self::new(parse(parts[0])?, parse(parts[1])?, altitude_m.unwrap_or(0.0))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        geodetic_to_ecef(self.lat_rad(), self.lon_rad(), self.altitude_m / 1000.0)
    }
}

/// Write-once holder for the observer location, shared between the
/// ranker, the path plotter and the tracker.
#[derive(Debug, Clone, Default)]
pub struct ObserverSlot(Arc<OnceLock<Observer>>);

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(observer: Observer) -> Self {
        let slot = Self::new();
        let _ = slot.0.set(observer);
        slot
    }

    pub fn get(&self) -> Option<Observer> {
        self.0.get().copied()
    }

    pub fn set(&self, observer: Observer) -> Result<(), PredictError> {
        self.0
            .set(observer)
            .map_err(|_| PredictError::ObserverAlreadySet)
    }
}
