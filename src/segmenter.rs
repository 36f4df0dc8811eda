//! # Track Segmentation
//!
//! Splits a time-ordered stream of track point rows into polylines.
//!
//! ## Rules
//!
//! 1. A new segment opens at the start of the stream, whenever the session id
//!    changes, and for the first point after any pause.
//! 2. Points with a valid location are appended to the open segment.
//! 3. Non-pause points without a location are counted as invalid and dropped.
//! 4. A pause without a location closes the open segment with a bridge point
//!    repeating the segment's last location, so the line reaches the pause.
//! 5. Segments that never received a point are dropped.
//!
//! The segmenter is a two-state machine ([`SegmenterState`]). It pulls rows one
//! at a time and never fails on row content; it only stops early when the row
//! source fails or hands over a row that violates its protocol version.

use std::mem;

use log::{debug, info, trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::diagnostics::SampleSink;
use crate::error::{Result, SegmentError};
use crate::point::TrackPoint;
use crate::result::{Segment, SegmentStats, SegmentsResult};
use crate::row::{RawRow, RowSchema, LAT_LON_FACTOR, PAUSE_KIND, PAUSE_LATITUDE};

/// Decoding constants of the track recorder.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmenterConfig {
    /// Divisor turning the stored integer coordinates into degrees.
    /// Default: 1,000,000
    pub lat_lon_factor: f64,

    /// Latitude marking a pause when rows carry no point kind.
    /// Default: 100.0 (outside the valid range, so never drawn)
    pub pause_latitude: f64,

    /// Point kind code of a pause.
    /// Default: 3
    pub pause_kind: i32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            lat_lon_factor: LAT_LON_FACTOR,
            pause_latitude: PAUSE_LATITUDE,
            pause_kind: PAUSE_KIND,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.lat_lon_factor.is_finite() || self.lat_lon_factor <= 0.0 {
            return Err(SegmentError::InvalidConfig(format!(
                "lat_lon_factor must be a positive number, got {}",
                self.lat_lon_factor
            )));
        }
        Ok(())
    }
}

/// Where the segmenter stands between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Stream start or directly after a pause; the next point opens a segment.
    Detached,
    /// The last retained point belongs to `session_id`.
    Attached { session_id: u64 },
}

/// Incremental segmenter. Feed rows with [`Segmenter::push_row`] and collect
/// the segments with [`Segmenter::finish`].
#[derive(Debug)]
pub struct Segmenter<S = ()> {
    config: SegmenterConfig,
    schema: RowSchema,
    protocol_version: u32,
    sink: S,
    state: SegmenterState,
    current: Segment,
    segments: Vec<Segment>,
    stats: SegmentStats,
    last_row_id: u64,
}

impl Segmenter<()> {
    /// Segmenter with default constants that discards diagnostic samples.
    pub fn new(protocol_version: u32) -> Self {
        Self::build(protocol_version, SegmenterConfig::default(), ())
    }
}

impl<S: SampleSink> Segmenter<S> {
    pub fn with_config(protocol_version: u32, config: SegmenterConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(protocol_version, config, sink))
    }

    fn build(protocol_version: u32, config: SegmenterConfig, sink: S) -> Self {
        Self {
            config,
            schema: RowSchema::from_protocol_version(protocol_version),
            protocol_version,
            sink,
            state: SegmenterState::Detached,
            current: Segment::default(),
            segments: Vec::new(),
            stats: SegmentStats::default(),
            last_row_id: 0,
        }
    }

    /// Start counting from a previous read, so that [`SegmentsResult::last_row_id`]
    /// stays at `resume_after_id` when no new rows arrive.
    pub fn resume_after(mut self, resume_after_id: u64) -> Self {
        self.last_row_id = resume_after_id;
        self
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    pub fn stats(&self) -> &SegmentStats {
        &self.stats
    }

    /// Decode one row and apply it.
    pub fn push_row(&mut self, row: &RawRow) -> Result<()> {
        let point = TrackPoint::decode(row, self.schema, &self.config).map_err(|e| {
            warn!("[TrackSegmenter] Rejecting row under protocol v{}: {}", self.protocol_version, e);
            e
        })?;
        self.sink.record_sample(point.speed, point.elevation, point.time_millis);
        self.push_point(point);
        Ok(())
    }

    /// Apply one decoded point.
    pub fn push_point(&mut self, point: TrackPoint) {
        trace!("[TrackSegmenter] {}", point);
        self.stats.received += 1;
        self.last_row_id = point.row_id;

        let opens_segment = match self.state {
            SegmenterState::Detached => true,
            SegmenterState::Attached { session_id } => session_id != point.session_id,
        };
        if opens_segment {
            self.open_segment(point.session_id);
        }

        match (point.has_valid_location(), point.is_pause()) {
            (true, is_pause) => {
                self.state = if is_pause {
                    self.stats.paused += 1;
                    SegmenterState::Detached
                } else {
                    SegmenterState::Attached { session_id: point.session_id }
                };
                self.current.push(point);
            }
            (false, true) => {
                self.stats.paused += 1;
                if let Some(previous) = self.current.last().and_then(|p| p.location) {
                    debug!(
                        "[TrackSegmenter] Bridging pause at row {} to ({:.6}, {:.6})",
                        point.row_id, previous.latitude, previous.longitude
                    );
                    let bridge = TrackPoint::bridge(previous, &point, &self.config);
                    self.current.push(bridge);
                }
                self.state = SegmenterState::Detached;
            }
            (false, false) => {
                self.stats.invalid += 1;
            }
        }
    }

    fn open_segment(&mut self, session_id: u64) {
        let done = mem::take(&mut self.current);
        if !done.is_empty() {
            self.segments.push(done);
        }
        debug!(
            "[TrackSegmenter] Opening segment #{} for session {}",
            self.segments.len() + 1,
            session_id
        );
    }

    /// Close the open segment and return everything collected.
    pub fn finish(mut self) -> SegmentsResult {
        let done = mem::take(&mut self.current);
        if !done.is_empty() {
            self.segments.push(done);
        }
        self.stats.segment_count = self.segments.len() as u64;
        info!(
            "[TrackSegmenter] {} rows -> {} segments ({} invalid, {} paused)",
            self.stats.received, self.stats.segment_count, self.stats.invalid, self.stats.paused
        );
        SegmentsResult::new(self.segments, self.stats, self.last_row_id)
    }
}

/// Segment rows pulled from a fallible source.
///
/// The source must only yield rows with `id > resume_after_id` and, for
/// protocol version 2 and above, only the kinds in
/// [`SUPPORTED_KINDS`](crate::row::SUPPORTED_KINDS); see
/// [`RowQuery`](crate::row::RowQuery). Rows are not re-checked here.
///
/// The first source error aborts the read; nothing collected so far is
/// returned.
///
/// # Example
/// ```
/// use track_segmenter::{read_segments, DiagnosticLog, RawRow};
///
/// let rows = vec![
///     RawRow::from_degrees(1, 7, 10.0, 20.0, Some(0)),
///     RawRow::from_degrees(2, 7, 100.0, 0.0, Some(3)),
///     RawRow::from_degrees(3, 7, 11.0, 21.0, Some(0)),
/// ];
///
/// let mut log = DiagnosticLog::new();
/// let result = read_segments(
///     rows.into_iter().map(Ok::<_, std::io::Error>),
///     2,
///     0,
///     &mut log,
/// ).unwrap();
///
/// assert_eq!(result.segments().len(), 2);
/// assert_eq!(result.stats().paused, 1);
/// assert_eq!(log.speed_time_entries().len(), 3);
/// ```
pub fn read_segments<I, E, S>(
    rows: I,
    protocol_version: u32,
    resume_after_id: u64,
    sink: S,
) -> Result<SegmentsResult>
where
    I: IntoIterator<Item = std::result::Result<RawRow, E>>,
    E: std::error::Error + Send + Sync + 'static,
    S: SampleSink,
{
    let mut segmenter = Segmenter::with_config(protocol_version, SegmenterConfig::default(), sink)?
        .resume_after(resume_after_id);

    for row in rows {
        let row = row.map_err(|e| {
            warn!("[TrackSegmenter] Row source failed after {} rows: {}", segmenter.stats().received, e);
            SegmentError::Source(Box::new(e))
        })?;
        segmenter.push_row(&row)?;
    }

    Ok(segmenter.finish())
}

/// Segment rows already held in memory, discarding diagnostic samples.
pub fn segment_track_points(
    rows: &[RawRow],
    protocol_version: u32,
    resume_after_id: u64,
) -> Result<SegmentsResult> {
    let mut segmenter = Segmenter::new(protocol_version).resume_after(resume_after_id);
    for row in rows {
        segmenter.push_row(row)?;
    }
    Ok(segmenter.finish())
}
