//! Segmentation output: segments plus counters.

use geo::LineString;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::point::TrackPoint;
use crate::{geo_utils, Bounds, GpsPoint};

/// A run of points drawn as one polyline.
///
/// Points share a session and are not separated by a pause. Segments in a
/// [`SegmentsResult`] always contain at least one point.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    points: Vec<TrackPoint>,
}

impl Segment {
    pub(crate) fn push(&mut self, point: TrackPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    /// Session of the segment's points, `None` for an empty segment.
    pub fn session_id(&self) -> Option<u64> {
        self.first().map(|p| p.session_id)
    }

    /// Locations in drawing order. Every retained point has one.
    pub fn locations(&self) -> Vec<GpsPoint> {
        self.points.iter().filter_map(|p| p.location).collect()
    }

    /// Length of the polyline in meters.
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.locations())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.locations())
    }

    /// The segment as a geo line string (x = longitude, y = latitude).
    pub fn to_line_string(&self) -> LineString<f64> {
        geo_utils::to_line_string(&self.locations())
    }
}

/// Counters describing how much of the input could be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentStats {
    /// Rows processed, pauses and invalid rows included
    pub received: u64,
    /// Non-pause rows without a valid location
    pub invalid: u64,
    /// Pause rows, with or without location
    pub paused: u64,
    /// Number of non-empty segments emitted
    pub segment_count: u64,
}

/// Segments of one read plus its counters.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentsResult {
    segments: Vec<Segment>,
    stats: SegmentStats,
    last_row_id: u64,
}

impl SegmentsResult {
    pub(crate) fn new(segments: Vec<Segment>, stats: SegmentStats, last_row_id: u64) -> Self {
        Self { segments, stats, last_row_id }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn stats(&self) -> &SegmentStats {
        &self.stats
    }

    /// Id of the last row processed, or the resume id if there were none.
    /// Pass it as the resume id of the next incremental read.
    pub fn last_row_id(&self) -> u64 {
        self.last_row_id
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Points across all segments, bridges included.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    pub fn bridge_count(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| s.points())
            .filter(|p| p.is_bridge)
            .count()
    }

    /// Box around every segment, for fitting the map view.
    pub fn bounds(&self) -> Option<Bounds> {
        self.segments
            .iter()
            .filter_map(Segment::bounds)
            .reduce(|a, b| a.union(&b))
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
