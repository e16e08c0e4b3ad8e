use std::collections::HashSet;
use std::f64::consts::TAU;
use std::fs;
use std::path::Path;

use sgp4::Elements;

use super::error::CatalogError;
use super::types::{CatalogRecord, TrackTarget};

const MU_KM3_S2: f64 = 398600.4418;
const EARTH_RADIUS_KM: f64 = 6378.137;
const SECONDS_PER_DAY: f64 = 86400.0;

/// Ordered, read-only snapshot of the satellite catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    /// Load a TLE file (may contain multiple satellites)
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::parse(&content);
        log::info!(
            "Loaded {} satellites from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse TLE text. Malformed sets and repeated NORAD ids are skipped.
    pub fn parse(content: &str) -> Self {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (name, line1, line2) in parse_multi_tle(content) {
            match build_record(name, line1, line2) {
                Ok(record) => {
                    if seen.insert(record.norad_id) {
                        records.push(record);
                    } else {
                        log::warn!("Duplicate NORAD {} ignored", record.norad_id);
                    }
                }
                Err(e) => log::warn!("Skipping TLE set: {}", e),
            }
        }

        Self { records }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Targets in catalog order.
    pub fn targets(&self) -> Vec<TrackTarget> {
        self.records.iter().map(CatalogRecord::target).collect()
    }

    pub fn find(&self, norad_id: u32) -> Result<&CatalogRecord, CatalogError> {
        self.records
            .iter()
            .find(|r| r.norad_id == norad_id)
            .ok_or(CatalogError::UnknownTarget(norad_id))
    }

    pub fn target(&self, norad_id: u32) -> Result<TrackTarget, CatalogError> {
        self.find(norad_id).map(CatalogRecord::target)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn build_record(
    name: Option<String>,
    line1: String,
    line2: String,
) -> Result<CatalogRecord, CatalogError> {
    let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes()).map_err(
        |e| CatalogError::InvalidTle {
            name: name.clone().unwrap_or_else(|| line1.clone()),
            message: e.to_string(),
        },
    )?;
    if elements.mean_motion <= 0.0 {
        return Err(CatalogError::InvalidTle {
            name: name.unwrap_or(line1),
            message: "non-positive mean motion".into(),
        });
    }

    let norad_id = elements.norad_id as u32;
    let mean_motion_rad_s = elements.mean_motion * TAU / SECONDS_PER_DAY;
    let semi_major_axis_km = (MU_KM3_S2 / (mean_motion_rad_s * mean_motion_rad_s)).cbrt();

    Ok(CatalogRecord {
        name: name.unwrap_or_else(|| format!("NORAD {}", norad_id)),
        norad_id,
        international_designator: elements.international_designator.clone(),
        period_minutes: 1440.0 / elements.mean_motion,
        inclination_deg: elements.inclination,
        apogee_height_km: semi_major_axis_km * (1.0 + elements.eccentricity) - EARTH_RADIUS_KM,
        perigee_height_km: semi_major_axis_km * (1.0 - elements.eccentricity) - EARTH_RADIUS_KM,
        eccentricity: elements.eccentricity,
        line1,
        line2,
    })
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{ISS_LINE1, ISS_LINE2};

    #[test]
    fn parses_named_and_bare_sets_in_order() {
        let content = format!(
            "ISS (ZARYA)\n{ISS_LINE1}\n{ISS_LINE2}\n\n{ISS_LINE1}\n{ISS_LINE2}\n"
        );
        let catalog = Catalog::parse(&content);
        // second set repeats the NORAD id
        assert_eq!(catalog.len(), 1);

        let record = &catalog.records()[0];
        assert_eq!(record.name, "ISS (ZARYA)");
        assert_eq!(record.norad_id, 25544);
        assert!((record.inclination_deg - 51.6416).abs() < 1e-9);
        assert!((record.eccentricity - 0.0006703).abs() < 1e-12);
        assert!((record.period_minutes - 91.6).abs() < 0.1);
        assert!(record.perigee_height_km > 250.0 && record.apogee_height_km < 400.0);
        assert!(record.apogee_height_km >= record.perigee_height_km);
    }

    #[test]
    fn bare_set_gets_norad_name() {
        let catalog = Catalog::parse(&format!("{ISS_LINE1}\n{ISS_LINE2}\n"));
        assert_eq!(catalog.records()[0].name, "NORAD 25544");
    }

    #[test]
    fn malformed_set_is_skipped() {
        let content = format!("BROKEN\n1 00000U\n2 00000\nISS\n{ISS_LINE1}\n{ISS_LINE2}\n");
        let catalog = Catalog::parse(&content);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].name, "ISS");
    }

    #[test]
    fn unknown_target_is_reported() {
        let catalog = Catalog::parse(&format!("ISS\n{ISS_LINE1}\n{ISS_LINE2}\n"));
        assert_eq!(catalog.target(25544).unwrap().name, "ISS");
        assert!(matches!(
            catalog.target(1),
            Err(CatalogError::UnknownTarget(1))
        ));
    }
}
