//! # Track Segmenter
//!
//! Turns the track points of a GPS recorder into polylines ready to draw on a map.
//!
//! This library provides:
//! - Decoding of fixed-point track point rows in both recorder protocol versions
//! - Splitting into segments at session changes and pauses
//! - Bridging of bare pause markers back to the last known location
//! - Counters for received, invalid and paused points
//!
//! ## Features
//!
//! - **`serde`** - Derive `Serialize`/`Deserialize` on the data types
//! - **`json`** - JSON export of segmentation results
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_segmenter::{segment_track_points, RawRow};
//!
//! // Rows as read from the recorder (protocol version 2, point kind 3 = pause)
//! let rows = vec![
//!     RawRow::from_degrees(1, 7, 10.0, 20.0, Some(0)),
//!     RawRow::from_degrees(2, 7, 100.0, 0.0, Some(3)),
//!     RawRow::from_degrees(3, 7, 11.0, 21.0, Some(0)),
//! ];
//!
//! let result = segment_track_points(&rows, 2, 0).unwrap();
//!
//! // The pause splits the track; the first segment is closed with a bridge point
//! assert_eq!(result.segments().len(), 2);
//! assert_eq!(result.segments()[0].len(), 2);
//! assert_eq!(result.stats().paused, 1);
//!
//! // Resume the next read after the last row seen
//! assert_eq!(result.last_row_id(), 3);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod geo_utils;
pub mod point;
pub mod result;
pub mod row;
pub mod segmenter;

pub use diagnostics::{DiagnosticLog, SampleSink, SpeedElevationEntry, SpeedTimeEntry};
pub use error::{Result, SegmentError};
pub use point::TrackPoint;
pub use result::{Segment, SegmentStats, SegmentsResult};
pub use row::{RawRow, RowQuery, RowSchema, LAT_LON_FACTOR, PAUSE_KIND, PAUSE_LATITUDE, SUPPORTED_KINDS};
pub use segmenter::{read_segments, segment_track_points, Segmenter, SegmenterConfig, SegmenterState};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TrackSegmenterRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use track_segmenter::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of a segment or a whole read.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// A decoded point as handed to Kotlin/Swift.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiTrackPoint {
        pub row_id: u64,
        pub session_id: u64,
        pub location: Option<GpsPoint>,
        pub kind: Option<i32>,
        pub is_pause: bool,
        pub is_bridge: bool,
        pub speed: f64,
        pub elevation: f64,
        pub time_millis: i64,
    }

    impl From<&TrackPoint> for FfiTrackPoint {
        fn from(p: &TrackPoint) -> Self {
            Self {
                row_id: p.row_id,
                session_id: p.session_id,
                location: p.location,
                kind: p.kind,
                is_pause: p.is_pause(),
                is_bridge: p.is_bridge,
                speed: p.speed,
                elevation: p.elevation,
                time_millis: p.time_millis,
            }
        }
    }

    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiSegment {
        pub points: Vec<FfiTrackPoint>,
        /// GPS coordinates as flat array [lat1, lng1, lat2, lng2, ...]
        pub latlngs: Vec<f64>,
        pub bounds: Option<Bounds>,
    }

    /// Result of one read, including the diagnostic samples it produced.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiSegmentsResult {
        pub segments: Vec<FfiSegment>,
        pub stats: SegmentStats,
        pub last_row_id: u64,
        pub speed_time_entries: Vec<SpeedTimeEntry>,
        pub speed_elevation_entries: Vec<SpeedElevationEntry>,
    }

    /// Projection and selection for the recorder's content provider.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiRowQuery {
        pub projection: Vec<String>,
        pub selection: String,
        pub selection_args: Vec<String>,
    }

    #[derive(Debug, thiserror::Error, uniffi::Error)]
    #[uniffi(flat_error)]
    pub enum FfiSegmentError {
        #[error("{0}")]
        Segmentation(String),
    }

    impl From<SegmentError> for FfiSegmentError {
        fn from(e: SegmentError) -> Self {
            FfiSegmentError::Segmentation(e.to_string())
        }
    }

    /// Split rows read from the recorder into segments.
    #[uniffi::export]
    pub fn ffi_segment_track_points(
        rows: Vec<RawRow>,
        protocol_version: u32,
        resume_after_id: u64,
    ) -> std::result::Result<FfiSegmentsResult, FfiSegmentError> {
        init_logging();
        info!(
            "[TrackSegmenterRust] segment_track_points called with {} rows (protocol v{}, after {})",
            rows.len(),
            protocol_version,
            resume_after_id
        );

        let start = std::time::Instant::now();
        let mut log = DiagnosticLog::new();
        let mut segmenter = Segmenter::with_config(protocol_version, SegmenterConfig::default(), &mut log)?
            .resume_after(resume_after_id);
        for row in &rows {
            segmenter.push_row(row)?;
        }
        let result = segmenter.finish();
        let (speed_time_entries, speed_elevation_entries) = log.drain();

        info!(
            "[TrackSegmenterRust] {} segments in {:?}",
            result.segments().len(),
            start.elapsed()
        );

        let segments = result
            .segments()
            .iter()
            .map(|s| FfiSegment {
                points: s.points().iter().map(FfiTrackPoint::from).collect(),
                latlngs: s
                    .locations()
                    .iter()
                    .flat_map(|p| [p.latitude, p.longitude])
                    .collect(),
                bounds: s.bounds(),
            })
            .collect();

        Ok(FfiSegmentsResult {
            segments,
            stats: *result.stats(),
            last_row_id: result.last_row_id(),
            speed_time_entries,
            speed_elevation_entries,
        })
    }

    /// Query the caller must run against the recorder.
    #[uniffi::export]
    pub fn ffi_track_point_query(protocol_version: u32, resume_after_id: u64) -> FfiRowQuery {
        let query = RowQuery::new(protocol_version, resume_after_id);
        FfiRowQuery {
            projection: query.projection().iter().map(|c| c.to_string()).collect(),
            selection: query.selection(),
            selection_args: query.selection_args(),
        }
    }

    /// Get default decoding constants
    #[uniffi::export]
    pub fn default_segmenter_config() -> SegmenterConfig {
        SegmenterConfig::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(GpsPoint::new(-90.0, 180.0).is_valid());
        assert!(!GpsPoint::new(100.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 180.5).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        assert!(Bounds::from_points(&[]).is_none());
        let bounds = Bounds::from_points(&[GpsPoint::new(1.0, 2.0), GpsPoint::new(3.0, -2.0)]).unwrap();
        assert_eq!(bounds.min_lat, 1.0);
        assert_eq!(bounds.max_lat, 3.0);
        assert_eq!(bounds.min_lng, -2.0);
        assert_eq!(bounds.max_lng, 2.0);
        assert_eq!(bounds.center(), GpsPoint::new(2.0, 0.0));
    }

    #[test]
    fn test_bounds_union() {
        let a = Bounds { min_lat: 0.0, max_lat: 1.0, min_lng: 0.0, max_lng: 1.0 };
        let b = Bounds { min_lat: -1.0, max_lat: 0.5, min_lng: 0.5, max_lng: 2.0 };
        assert_eq!(
            a.union(&b),
            Bounds { min_lat: -1.0, max_lat: 1.0, min_lng: 0.0, max_lng: 2.0 }
        );
    }

    #[test]
    fn test_end_to_end_legacy_track() {
        let rows: Vec<RawRow> = (1..=6)
            .map(|i| {
                let lat = if i == 4 { 100.0 } else { 51.5 + i as f64 * 0.001 };
                RawRow::from_degrees(i, 1, lat, -0.12, None).with_motion(3.0, 20.0, i as i64 * 1_000)
            })
            .collect();
        let result = segment_track_points(&rows, 1, 0).unwrap();
        assert_eq!(result.stats().received, 6);
        assert_eq!(result.stats().paused, 1);
        assert_eq!(result.segments().len(), 2);
        assert_eq!(result.segments()[0].len(), 4);
        assert_eq!(result.segments()[1].len(), 2);
        assert!(result.segments()[0].length_meters() > 0.0);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_result_to_json() {
        let rows = vec![RawRow::from_degrees(1, 1, 10.0, 20.0, Some(0))];
        let json = segment_track_points(&rows, 2, 0).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stats"]["received"], 1);
        assert_eq!(value["last_row_id"], 1);
    }
}
