use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Object that can be plotted, ranked or streamed to the mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrackTarget {
    pub norad_id: u32,
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// A catalog row: identity, derived orbital parameters and the raw element lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogRecord {
    pub name: String,
    pub norad_id: u32,
    pub international_designator: Option<String>,
    pub period_minutes: f64,
    pub inclination_deg: f64,
    pub apogee_height_km: f64,
    pub perigee_height_km: f64,
    pub eccentricity: f64,
    pub line1: String,
    pub line2: String,
}

impl CatalogRecord {
    pub fn target(&self) -> TrackTarget {
        TrackTarget {
            norad_id: self.norad_id,
            name: self.name.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
        }
    }
}
