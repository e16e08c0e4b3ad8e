use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Commands understood by the mount firmware.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MountCommand {
    Point { azimuth_deg: f64, elevation_deg: f64 },
    AzimuthOffset { degrees: f64 },
    ElevationOffset { degrees: f64 },
    Reset,
}

impl MountCommand {
    pub fn point(azimuth_deg: f64, elevation_deg: f64) -> Self {
        MountCommand::Point {
            azimuth_deg,
            elevation_deg,
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            MountCommand::Point {
                azimuth_deg,
                elevation_deg,
            } => azimuth_deg.is_finite() && elevation_deg.is_finite(),
            MountCommand::AzimuthOffset { degrees } | MountCommand::ElevationOffset { degrees } => {
                degrees.is_finite()
            }
            MountCommand::Reset => true,
        }
    }

    /// Wire text including the `\r\n` terminator.
    pub fn encode(&self) -> String {
        match *self {
            MountCommand::Point {
                azimuth_deg,
                elevation_deg,
            } => {
                let az = ((azimuth_deg % 360.0) + 360.0) % 360.0;
                // adding 0.0 turns -0.0 into 0.0
                let el = elevation_deg.clamp(0.0, 180.0) + 0.0;
                format!("i {} {} \r\n", az, el)
            }
            MountCommand::AzimuthOffset { degrees } => format!("ta {} \r\n", degrees),
            MountCommand::ElevationOffset { degrees } => format!("te {} \r\n", degrees),
            MountCommand::Reset => "tz \r\n".to_string(),
        }
    }
}

/// Converts a clockwise-from-north azimuth into the mount's
/// counter-clockwise convention.
pub fn mount_azimuth(azimuth_deg: f64) -> f64 {
    (360.0 - azimuth_deg).rem_euclid(360.0)
}
