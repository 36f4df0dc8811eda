//! Speed/time and speed/elevation samples collected while decoding.
//!
//! Every decoded row reports one sample to a [`SampleSink`] owned by the
//! caller. The samples feed charts outside this crate and never affect how a
//! track is segmented. Pass `()` to discard them.

use std::collections::VecDeque;

use chrono::{DateTime, SecondsFormat};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Receiver of per-row diagnostic samples.
pub trait SampleSink {
    fn record_sample(&mut self, speed: f64, elevation: f64, time_millis: i64);
}

impl SampleSink for () {
    fn record_sample(&mut self, _speed: f64, _elevation: f64, _time_millis: i64) {}
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    fn record_sample(&mut self, speed: f64, elevation: f64, time_millis: i64) {
        (**self).record_sample(speed, elevation, time_millis);
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedTimeEntry {
    pub speed: f64,
    /// RFC 3339 UTC time, or the raw milliseconds if out of range
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedElevationEntry {
    pub speed: f64,
    pub elevation: f64,
}

/// In-memory sample log.
///
/// Unbounded unless created with [`DiagnosticLog::with_limit`], in which case
/// only the most recent entries of each log are kept.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    speed_time: VecDeque<SpeedTimeEntry>,
    speed_elevation: VecDeque<SpeedElevationEntry>,
    limit: Option<usize>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` entries per log, dropping the oldest first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn speed_time_entries(&self) -> impl ExactSizeIterator<Item = &SpeedTimeEntry> {
        self.speed_time.iter()
    }

    pub fn speed_elevation_entries(&self) -> impl ExactSizeIterator<Item = &SpeedElevationEntry> {
        self.speed_elevation.iter()
    }

    pub fn clear_speed_time_entries(&mut self) {
        self.speed_time.clear();
    }

    pub fn clear_speed_elevation_entries(&mut self) {
        self.speed_elevation.clear();
    }

    pub fn clear(&mut self) {
        self.clear_speed_time_entries();
        self.clear_speed_elevation_entries();
    }

    pub fn is_empty(&self) -> bool {
        self.speed_time.is_empty() && self.speed_elevation.is_empty()
    }

    /// Move all entries out, leaving the log empty.
    pub fn drain(&mut self) -> (Vec<SpeedTimeEntry>, Vec<SpeedElevationEntry>) {
        (
            self.speed_time.drain(..).collect(),
            self.speed_elevation.drain(..).collect(),
        )
    }
}

impl SampleSink for DiagnosticLog {
    fn record_sample(&mut self, speed: f64, elevation: f64, time_millis: i64) {
        push_bounded(
            &mut self.speed_time,
            SpeedTimeEntry { speed, time: format_time(time_millis) },
            self.limit,
        );
        push_bounded(
            &mut self.speed_elevation,
            SpeedElevationEntry { speed, elevation },
            self.limit,
        );
    }
}

fn push_bounded<T>(entries: &mut VecDeque<T>, entry: T, limit: Option<usize>) {
    if limit == Some(0) {
        return;
    }
    if let Some(limit) = limit {
        while entries.len() >= limit {
            entries.pop_front();
        }
    }
    entries.push_back(entry);
}

fn format_time(time_millis: i64) -> String {
    DateTime::from_timestamp_millis(time_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| time_millis.to_string())
}
