use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::RankError;
use super::filter::{haversine_km, FilterParams, PathPoint};
use super::path::{sample_ground_track, PathWindow};
use crate::catalog::TrackTarget;
use crate::predict::{Observer, Propagator};

pub const RANK_HORIZON_S: f64 = 300.0;
pub const RANK_STEP_S: f64 = 1.0;

/// How far ahead targets are projected before measuring their distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    pub horizon_s: f64,
    pub step_s: f64,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            horizon_s: RANK_HORIZON_S,
            step_s: RANK_STEP_S,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankingEntry {
    pub target: TrackTarget,
    pub projected: PathPoint,
    pub distance_km: f64,
}

/// Orders targets by the ground distance between the observer and each
/// target's sub-point at the end of the horizon. Targets whose projected
/// sample is unavailable are left out; equal distances keep catalog order.
pub fn rank_targets(
    targets: &[TrackTarget],
    observer: Option<&Observer>,
    propagator: &dyn Propagator,
    start: DateTime<Utc>,
    params: &RankParams,
    filter: &FilterParams,
) -> Result<Vec<RankingEntry>, RankError> {
    let observer = observer.ok_or(RankError::ObserverUnavailable)?;
    let window = PathWindow::new(start, params.horizon_s, params.step_s)?;
    let horizon = window.last_instant();
    let station = PathPoint::new(observer.latitude_deg, observer.longitude_deg);

    let mut entries = Vec::with_capacity(targets.len());
    for target in targets {
        let samples = match sample_ground_track(propagator, target, &window, filter) {
            Ok(samples) => samples,
            Err(e) => {
                log::warn!("Skipping {} in ranking: {}", target.name, e);
                continue;
            }
        };

        let projected = match samples.last() {
            Some(sample) if sample.timestamp == horizon => sample.point,
            _ => {
                log::info!("No valid future position for {}", target.name);
                continue;
            }
        };

        let distance_km = haversine_km(projected, station);
        log::debug!(
            "{}: projected ({:.3}, {:.3}), {:.1} km",
            target.name,
            projected.latitude_deg,
            projected.longitude_deg,
            distance_km
        );
        entries.push(RankingEntry {
            target: target.clone(),
            projected,
            distance_km,
        });
    }

    entries.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(entries)
}
