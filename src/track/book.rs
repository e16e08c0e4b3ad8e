use serde::Serialize;
use utoipa::ToSchema;

use super::path::GroundTrack;

pub const PALETTE: [&str; 15] = [
    "#FF0000", "#0000FF", "#00FF00", "#00FFFF", "#FF00FF", "#FFFF00", "#FFA500", "#8A2BE2",
    "#00FA9A", "#B22222", "#40E0D0", "#FF1493", "#7CFC00", "#4169E1", "#FFD700",
];

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrackedPath {
    #[serde(flatten)]
    pub track: GroundTrack,
    pub color: String,
}

/// Paths currently plotted, in plot order, plus the palette cursor.
#[derive(Debug, Default)]
pub struct PathBook {
    paths: Vec<TrackedPath>,
    next_color: usize,
}

impl PathBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plots `track`, replacing any earlier path for the same target.
    /// A replaced path keeps its colour; a new target takes the next one.
    pub fn plot(&mut self, track: GroundTrack) -> TrackedPath {
        if let Some(existing) = self
            .paths
            .iter_mut()
            .find(|p| p.track.norad_id == track.norad_id)
        {
            existing.track = track;
            return existing.clone();
        }

        let color = PALETTE[self.next_color].to_string();
        self.next_color = (self.next_color + 1) % PALETTE.len();
        let path = TrackedPath { track, color };
        self.paths.push(path.clone());
        path
    }

    pub fn paths(&self) -> &[TrackedPath] {
        &self.paths
    }

    pub fn get(&self, norad_id: u32) -> Option<&TrackedPath> {
        self.paths.iter().find(|p| p.track.norad_id == norad_id)
    }

    /// Removes every path; returns how many were plotted.
    pub fn clear(&mut self) -> usize {
        let count = self.paths.len();
        self.paths.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::PathPoint;
    use chrono::{TimeZone, Utc};

    fn track(norad_id: u32, lon: f64) -> GroundTrack {
        let point = PathPoint::new(0.0, lon);
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        GroundTrack {
            norad_id,
            name: format!("SAT {norad_id}"),
            start,
            end: start,
            points: vec![point],
            start_marker: point,
            stop_marker: point,
        }
    }

    #[test]
    fn new_targets_cycle_through_palette() {
        let mut book = PathBook::new();
        let colors: Vec<String> = (0..PALETTE.len() as u32 + 1)
            .map(|id| book.plot(track(id, 0.0)).color)
            .collect();
        assert_eq!(colors[0], PALETTE[0]);
        assert_eq!(colors[1], PALETTE[1]);
        assert_eq!(colors[PALETTE.len()], PALETTE[0]);
    }

    #[test]
    fn replot_replaces_path_and_keeps_color() {
        let mut book = PathBook::new();
        book.plot(track(1, 0.0));
        let second = book.plot(track(2, 0.0));

        let replaced = book.plot(track(2, 42.0));
        assert_eq!(replaced.color, second.color);
        assert_eq!(book.paths().len(), 2);
        assert_eq!(book.get(2).unwrap().track.start_marker.longitude_deg, 42.0);
    }

    #[test]
    fn clear_removes_everything() {
        let mut book = PathBook::new();
        book.plot(track(1, 0.0));
        book.plot(track(2, 0.0));
        assert_eq!(book.clear(), 2);
        assert!(book.paths().is_empty());
        assert!(book.get(1).is_none());

        // palette cursor keeps moving after a clear
        assert_eq!(book.plot(track(3, 0.0)).color, PALETTE[2]);
    }
}
