use std::f64::consts::TAU;

use super::observer::Observer;

// WGS-84
const EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const ECCENTRICITY_SQ: f64 = 0.00669437999014;

const GEODETIC_ITERATIONS: usize = 6;

pub fn geodetic_to_ecef(lat_rad: f64, lon_rad: f64, alt_km: f64) -> [f64; 3] {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let n = EQUATORIAL_RADIUS_KM / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
    [
        (n + alt_km) * cos_lat * lon_rad.cos(),
        (n + alt_km) * cos_lat * lon_rad.sin(),
        (n * (1.0 - ECCENTRICITY_SQ) + alt_km) * sin_lat,
    ]
}

/// Sub-point latitude and longitude (radians) of an Earth-fixed position.
pub fn geodetic_of(ecef: [f64; 3]) -> (f64, f64) {
    let [x, y, z] = ecef;
    let lon = y.atan2(x);
    let p = x.hypot(y);

    let mut lat = z.atan2(p * (1.0 - ECCENTRICITY_SQ));
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = lat.sin();
        let n = EQUATORIAL_RADIUS_KM / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        lat = (z + ECCENTRICITY_SQ * n * sin_lat).atan2(p);
    }
    (lat, lon)
}

/// Azimuth (clockwise from north, `[0, 2π)`) and elevation of an
/// Earth-fixed position seen from the observer.
pub fn azimuth_elevation(ecef: [f64; 3], observer: &Observer) -> (f64, f64) {
    let station = observer.position_ecef_km();
    let dr = [
        ecef[0] - station[0],
        ecef[1] - station[1],
        ecef[2] - station[2],
    ];
    let range = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth = east.atan2(north).rem_euclid(TAU);
    let elevation = if range > 0.0 {
        (up / range).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };
    (azimuth, elevation)
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
