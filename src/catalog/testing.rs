use chrono::{DateTime, Utc};

use super::types::{CatalogRecord, TrackTarget};

pub const ISS_LINE1: &str =
    "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
pub const ISS_LINE2: &str =
    "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

pub fn iss() -> TrackTarget {
    TrackTarget {
        norad_id: 25544,
        name: "ISS (ZARYA)".into(),
        line1: ISS_LINE1.into(),
        line2: ISS_LINE2.into(),
    }
}

pub fn iss_epoch() -> DateTime<Utc> {
    sgp4::Elements::from_tle(None, ISS_LINE1.as_bytes(), ISS_LINE2.as_bytes())
        .unwrap()
        .datetime
        .and_utc()
}

/// Target with placeholder element lines, for scripted propagators.
pub fn dummy(norad_id: u32, name: &str) -> TrackTarget {
    TrackTarget {
        norad_id,
        name: name.into(),
        line1: String::new(),
        line2: String::new(),
    }
}

/// Catalog row around [`dummy`], with LEO-ish derived parameters.
pub fn record(norad_id: u32, name: &str) -> CatalogRecord {
    let target = dummy(norad_id, name);
    CatalogRecord {
        name: target.name,
        norad_id,
        international_designator: None,
        period_minutes: 95.0,
        inclination_deg: 51.6,
        apogee_height_km: 420.0,
        perigee_height_km: 410.0,
        eccentricity: 0.0007,
        line1: target.line1,
        line2: target.line2,
    }
}
