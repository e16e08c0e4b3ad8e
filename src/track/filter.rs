use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const POLE_LIMIT_DEG: f64 = 85.0;
pub const MAX_JUMP_DEG: f64 = 30.0;
pub const DUPLICATE_EPSILON_DEG: f64 = 0.01;

const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;

/// Sub-satellite point. Longitude is unwrapped along a path and may leave
/// `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PathPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl PathPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub pole_limit_deg: f64,
    pub max_jump_deg: f64,
    pub duplicate_epsilon_deg: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            pole_limit_deg: POLE_LIMIT_DEG,
            max_jump_deg: MAX_JUMP_DEG,
            duplicate_epsilon_deg: DUPLICATE_EPSILON_DEG,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Polar,
    Jump,
    Duplicate,
}

/// Shifts `current` by whole turns so it lies within 180° of `previous`.
pub fn unwrap_longitude(previous: f64, current: f64) -> f64 {
    let delta = current - previous;
    if delta > 180.0 {
        current - 360.0 * ((delta - 180.0) / 360.0).ceil()
    } else if delta < -180.0 {
        current + 360.0 * ((-180.0 - delta) / 360.0).ceil()
    } else {
        current
    }
}

/// Great-circle distance in km. The longitude difference is wrapped first,
/// so unwrapped longitudes are fine.
pub fn haversine_km(a: PathPoint, b: PathPoint) -> f64 {
    let d_lat = (b.latitude_deg - a.latitude_deg).to_radians();
    let d_lon = (b.longitude_deg - a.longitude_deg + 180.0).rem_euclid(360.0) - 180.0;
    let d_lon = d_lon.to_radians();
    let lat1 = a.latitude_deg.to_radians();
    let lat2 = b.latitude_deg.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Applies pole exclusion, unwrap, jump rejection and duplicate suppression
/// to a time-ordered stream of raw sub-points.
#[derive(Debug, Clone)]
pub struct TrackFilter {
    params: FilterParams,
    last: Option<PathPoint>,
}

impl TrackFilter {
    pub fn new(params: FilterParams) -> Self {
        Self { params, last: None }
    }

    pub fn accept(&mut self, latitude_deg: f64, longitude_deg: f64) -> Result<PathPoint, Rejection> {
        if latitude_deg.abs() >= self.params.pole_limit_deg {
            return Err(Rejection::Polar);
        }

        let candidate = match self.last {
            None => PathPoint::new(latitude_deg, longitude_deg),
            Some(last) => {
                let point = PathPoint::new(
                    latitude_deg,
                    unwrap_longitude(last.longitude_deg, longitude_deg),
                );
                let d_lat = (point.latitude_deg - last.latitude_deg).abs();
                let d_lon = (point.longitude_deg - last.longitude_deg).abs();
                if d_lat > self.params.max_jump_deg || d_lon > self.params.max_jump_deg {
                    return Err(Rejection::Jump);
                }
                if d_lat < self.params.duplicate_epsilon_deg
                    && d_lon < self.params.duplicate_epsilon_deg
                {
                    return Err(Rejection::Duplicate);
                }
                point
            }
        };

        self.last = Some(candidate);
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_all(raw: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::with_capacity(raw.len());
        for &lon in raw {
            let next = match out.last() {
                Some(&prev) => unwrap_longitude(prev, lon),
                None => lon,
            };
            out.push(next);
        }
        out
    }

    #[test]
    fn unwrap_crosses_antimeridian() {
        assert_eq!(unwrap_longitude(179.0, -179.0), 181.0);
        assert_eq!(unwrap_longitude(-179.0, 179.0), -181.0);
        assert_eq!(unwrap_longitude(10.0, 20.0), 20.0);
        // accumulated offset after several crossings
        assert_eq!(unwrap_longitude(539.0, -179.0), 541.0);
    }

    #[test]
    fn unwrap_is_idempotent() {
        let raw = [170.0, 178.0, -176.0, -170.0, 175.0, -179.5, -150.0, 160.0];
        let once = unwrap_all(&raw);
        let twice = unwrap_all(&once);
        assert_eq!(once, twice);
        for pair in once.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 180.0);
        }
    }

    #[test]
    fn polar_samples_are_dropped() {
        let mut filter = TrackFilter::new(FilterParams::default());
        assert_eq!(filter.accept(85.0, 0.0), Err(Rejection::Polar));
        assert_eq!(filter.accept(-86.0, 0.0), Err(Rejection::Polar));
        assert!(filter.accept(84.9, 0.0).is_ok());
    }

    #[test]
    fn jumps_are_measured_from_last_accepted_point() {
        let mut filter = TrackFilter::new(FilterParams::default());
        filter.accept(0.0, 0.0).unwrap();
        assert_eq!(filter.accept(31.0, 0.0), Err(Rejection::Jump));
        assert_eq!(filter.accept(0.0, -40.0), Err(Rejection::Jump));
        // still compared against (0, 0), not the rejected sample
        let accepted = filter.accept(29.0, 29.0).unwrap();
        assert_eq!(accepted, PathPoint::new(29.0, 29.0));
    }

    #[test]
    fn antimeridian_crossing_is_not_a_jump() {
        let mut filter = TrackFilter::new(FilterParams::default());
        filter.accept(10.0, 175.0).unwrap();
        let point = filter.accept(11.0, -178.0).unwrap();
        assert_eq!(point.longitude_deg, 182.0);
    }

    #[test]
    fn near_duplicates_are_suppressed() {
        let mut filter = TrackFilter::new(FilterParams::default());
        filter.accept(45.0, 45.0).unwrap();
        assert_eq!(filter.accept(45.005, 45.009), Err(Rejection::Duplicate));
        assert!(filter.accept(45.005, 45.02).is_ok());
    }

    #[test]
    fn thresholds_are_tunable() {
        let mut filter = TrackFilter::new(FilterParams {
            pole_limit_deg: 60.0,
            max_jump_deg: 5.0,
            duplicate_epsilon_deg: 1.0,
        });
        assert_eq!(filter.accept(61.0, 0.0), Err(Rejection::Polar));
        filter.accept(0.0, 0.0).unwrap();
        assert_eq!(filter.accept(0.5, 0.5), Err(Rejection::Duplicate));
        assert_eq!(filter.accept(6.0, 0.0), Err(Rejection::Jump));
    }

    #[test]
    fn haversine_known_distances() {
        let one_degree = haversine_km(PathPoint::new(0.0, 0.0), PathPoint::new(0.0, 1.0));
        assert!((one_degree - 111.195).abs() < 0.01);

        let quarter = haversine_km(PathPoint::new(0.0, 0.0), PathPoint::new(90.0, 0.0));
        assert!((quarter - std::f64::consts::FRAC_PI_2 * 6371.0).abs() < 1e-6);

        assert_eq!(haversine_km(PathPoint::new(12.0, 34.0), PathPoint::new(12.0, 34.0)), 0.0);
    }

    #[test]
    fn haversine_wraps_longitude_delta() {
        let across = haversine_km(PathPoint::new(0.0, 179.5), PathPoint::new(0.0, -179.5));
        assert!((across - 111.195).abs() < 0.01);

        let unwrapped = haversine_km(PathPoint::new(0.0, 540.0), PathPoint::new(0.0, 181.0));
        assert!((unwrapped - 111.195).abs() < 0.01);
    }
}
