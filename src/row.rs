//! Raw track point rows as delivered by the track recorder, and the two
//! column layouts (protocol versions) they can arrive in.
//!
//! The recorder stores coordinates as fixed-point integers scaled by
//! [`LAT_LON_FACTOR`]. Protocol version 1 has no `type` column; pauses are
//! then signalled by the sentinel latitude [`PAUSE_LATITUDE`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scale of the fixed-point latitude/longitude columns.
pub const LAT_LON_FACTOR: f64 = 1_000_000.0;

/// Sentinel latitude marking a pause in protocol version 1.
pub const PAUSE_LATITUDE: f64 = 100.0;

/// Point kind code of a pause marker.
pub const PAUSE_KIND: i32 = 3;

/// Point kinds requested from the recorder under protocol version 2.
pub const SUPPORTED_KINDS: [i32; 5] = [-2, -1, 0, 1, 3];

/// Column names of the track points table.
pub mod columns {
    pub const ID: &str = "_id";
    pub const TRACK_ID: &str = "trackid";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const TIME: &str = "time";
    pub const TYPE: &str = "type";
    pub const SPEED: &str = "speed";
    pub const ELEVATION: &str = "elevation";
}

const PROJECTION_V1: [&str; 7] = [
    columns::ID,
    columns::TRACK_ID,
    columns::LATITUDE,
    columns::LONGITUDE,
    columns::TIME,
    columns::SPEED,
    columns::ELEVATION,
];

const PROJECTION_V2: [&str; 8] = [
    columns::ID,
    columns::TRACK_ID,
    columns::LATITUDE,
    columns::LONGITUDE,
    columns::TIME,
    columns::TYPE,
    columns::SPEED,
    columns::ELEVATION,
];

/// One row of the track points table.
///
/// `point_kind` is only meaningful under protocol version 2; under version 1
/// the column does not exist and any value here is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawRow {
    /// Row id, strictly increasing
    pub id: u64,
    /// Recording session (track) the point belongs to
    pub session_id: u64,
    /// Latitude scaled by [`LAT_LON_FACTOR`]
    pub latitude_raw: i32,
    /// Longitude scaled by [`LAT_LON_FACTOR`]
    pub longitude_raw: i32,
    pub point_kind: Option<i32>,
    /// Speed in m/s
    pub speed: f64,
    /// Elevation in meters
    pub elevation: f64,
    /// Unix time in milliseconds
    pub timestamp_millis: i64,
}

impl RawRow {
    /// Create a row from decimal degrees, scaling them to fixed point.
    ///
    /// Convenient for tests and in-memory sources; real sources hand over the
    /// stored integers unchanged.
    pub fn from_degrees(
        id: u64,
        session_id: u64,
        latitude: f64,
        longitude: f64,
        point_kind: Option<i32>,
    ) -> Self {
        Self {
            id,
            session_id,
            latitude_raw: (latitude * LAT_LON_FACTOR).round() as i32,
            longitude_raw: (longitude * LAT_LON_FACTOR).round() as i32,
            point_kind,
            speed: 0.0,
            elevation: 0.0,
            timestamp_millis: 0,
        }
    }

    /// Set speed, elevation and time.
    pub fn with_motion(mut self, speed: f64, elevation: f64, timestamp_millis: i64) -> Self {
        self.speed = speed;
        self.elevation = elevation;
        self.timestamp_millis = timestamp_millis;
        self
    }
}

/// Column layout of the rows, selected once from the protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RowSchema {
    /// Legacy layout without a `type` column.
    V1,
    /// Layout with an explicit point kind.
    V2,
}

impl RowSchema {
    pub fn from_protocol_version(protocol_version: u32) -> Self {
        if protocol_version < 2 {
            RowSchema::V1
        } else {
            RowSchema::V2
        }
    }

    /// Whether rows carry a `type` column.
    pub fn has_kind(self) -> bool {
        matches!(self, RowSchema::V2)
    }

    /// Columns to request from the recorder, in order.
    pub fn projection(self) -> &'static [&'static str] {
        match self {
            RowSchema::V1 => &PROJECTION_V1,
            RowSchema::V2 => &PROJECTION_V2,
        }
    }
}

/// The query a row source must run so that its output satisfies the
/// segmenter's preconditions: rows after the resume id and, under protocol
/// version 2, only the supported point kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowQuery {
    pub schema: RowSchema,
    pub resume_after_id: u64,
}

impl RowQuery {
    pub fn new(protocol_version: u32, resume_after_id: u64) -> Self {
        Self {
            schema: RowSchema::from_protocol_version(protocol_version),
            resume_after_id,
        }
    }

    pub fn projection(&self) -> &'static [&'static str] {
        self.schema.projection()
    }

    /// SQL-style selection with one `?` placeholder for the resume id.
    pub fn selection(&self) -> String {
        let mut selection = format!("{} > ?", columns::ID);
        if self.schema.has_kind() {
            let kinds: Vec<String> = SUPPORTED_KINDS.iter().map(|k| k.to_string()).collect();
            selection.push_str(&format!(" AND {} IN ({})", columns::TYPE, kinds.join(", ")));
        }
        selection
    }

    pub fn selection_args(&self) -> Vec<String> {
        vec![self.resume_after_id.to_string()]
    }

    /// Apply the selection to a single row.
    ///
    /// A version 2 row without a kind does not match, as `NULL IN (...)` is
    /// false in the recorder's database.
    pub fn matches(&self, row: &RawRow) -> bool {
        if row.id <= self.resume_after_id {
            return false;
        }
        match self.schema {
            RowSchema::V1 => true,
            RowSchema::V2 => row
                .point_kind
                .is_some_and(|kind| SUPPORTED_KINDS.contains(&kind)),
        }
    }

    /// Lazily apply the selection to in-memory rows.
    pub fn filter<I>(&self, rows: I) -> impl Iterator<Item = RawRow>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let query = *self;
        rows.into_iter().filter(move |row| query.matches(row))
    }
}
