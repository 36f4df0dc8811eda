//! Decoded track points.
//!
//! A [`TrackPoint`] is the canonical form of a [`RawRow`] regardless of the
//! protocol version it arrived in. Whether it is a pause and whether it has a
//! drawable location are independent: recorders emit pauses both with and
//! without coordinates.

use std::fmt;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use crate::row::{columns, RawRow, RowSchema};
use crate::segmenter::SegmenterConfig;
use crate::GpsPoint;

/// One decoded sample of a recorded track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    /// Recording session (track) id
    pub session_id: u64,
    /// Id of the row this point was decoded from
    pub row_id: u64,
    /// Position, `None` if the decoded coordinates are not a valid location
    pub location: Option<GpsPoint>,
    /// Point kind, only present under protocol version 2
    pub kind: Option<i32>,
    /// Speed in m/s
    pub speed: f64,
    /// Elevation in meters
    pub elevation: f64,
    /// Unix time in milliseconds
    pub time_millis: i64,
    /// True for points synthesized to close a segment at a bare pause
    pub is_bridge: bool,
    is_pause: bool,
}

impl TrackPoint {
    /// Build a point from decimal degrees.
    ///
    /// The pause flag is fixed here: a present `kind` decides on its own,
    /// otherwise the sentinel latitude does, whatever the longitude.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: u64,
        row_id: u64,
        latitude: f64,
        longitude: f64,
        kind: Option<i32>,
        speed: f64,
        elevation: f64,
        time_millis: i64,
        config: &SegmenterConfig,
    ) -> Self {
        let candidate = GpsPoint::new(latitude, longitude);
        let location = (candidate.is_valid() && latitude != config.pause_latitude).then_some(candidate);
        let is_pause = match kind {
            Some(kind) => kind == config.pause_kind,
            None => latitude == config.pause_latitude,
        };

        Self {
            session_id,
            row_id,
            location,
            kind,
            speed,
            elevation,
            time_millis,
            is_bridge: false,
            is_pause,
        }
    }

    /// Decode a raw row laid out according to `schema`.
    ///
    /// Fails only if a version 2 row has no point kind, which the row source
    /// must always supply for that layout.
    pub fn decode(row: &RawRow, schema: RowSchema, config: &SegmenterConfig) -> Result<Self> {
        let kind = match schema {
            RowSchema::V1 => None,
            RowSchema::V2 => Some(row.point_kind.ok_or(SegmentError::MalformedRow {
                row_id: row.id,
                column: columns::TYPE,
                protocol_version: 2,
            })?),
        };

        Ok(Self::new(
            row.session_id,
            row.id,
            f64::from(row.latitude_raw) / config.lat_lon_factor,
            f64::from(row.longitude_raw) / config.lat_lon_factor,
            kind,
            row.speed,
            row.elevation,
            row.timestamp_millis,
            config,
        ))
    }

    /// Synthesize the point that closes a segment at a bare pause: the
    /// previous location with everything else taken from the pause.
    pub fn bridge(previous: GpsPoint, pause: &TrackPoint, config: &SegmenterConfig) -> Self {
        let mut point = Self::new(
            pause.session_id,
            pause.row_id,
            previous.latitude,
            previous.longitude,
            pause.kind,
            pause.speed,
            pause.elevation,
            pause.time_millis,
            config,
        );
        point.is_bridge = true;
        point
    }

    pub fn has_valid_location(&self) -> bool {
        self.location.is_some()
    }

    pub fn is_pause(&self) -> bool {
        self.is_pause
    }

    /// Recording time, `None` if out of chrono's range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_millis)
    }
}

impl fmt::Display for TrackPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackPoint{{row={}, session={}, location=", self.row_id, self.session_id)?;
        match self.location {
            Some(p) => write!(f, "({:.6}, {:.6})", p.latitude, p.longitude)?,
            None => f.write_str("none")?,
        }
        write!(f, ", pause={}, speed={}, time=", self.is_pause, self.speed)?;
        match self.time() {
            Some(time) => write!(f, "{}", time.to_rfc3339())?,
            None => write!(f, "{}ms", self.time_millis)?,
        }
        write!(f, ", elevation={}}}", self.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::PAUSE_KIND;

    fn decode(row: RawRow, protocol_version: u32) -> TrackPoint {
        TrackPoint::decode(
            &row,
            RowSchema::from_protocol_version(protocol_version),
            &SegmenterConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_fixed_point() {
        let row = RawRow {
            id: 5,
            session_id: 9,
            latitude_raw: 51_507_400,
            longitude_raw: -127_800,
            point_kind: Some(0),
            speed: 3.5,
            elevation: 12.0,
            timestamp_millis: 1_700_000_000_000,
        };
        let point = decode(row, 2);
        let location = point.location.unwrap();
        assert!((location.latitude - 51.5074).abs() < 1e-9);
        assert!((location.longitude + 0.1278).abs() < 1e-9);
        assert_eq!(point.row_id, 5);
        assert_eq!(point.session_id, 9);
        assert_eq!(point.kind, Some(0));
        assert_eq!(point.speed, 3.5);
        assert_eq!(point.elevation, 12.0);
        assert!(!point.is_pause());
        assert!(!point.is_bridge);
    }

    #[test]
    fn test_out_of_range_has_no_location() {
        assert!(decode(RawRow::from_degrees(1, 1, 91.0, 0.0, Some(0)), 2).location.is_none());
        assert!(decode(RawRow::from_degrees(1, 1, 0.0, -181.0, Some(0)), 2).location.is_none());
        assert!(decode(RawRow::from_degrees(1, 1, 90.0, 180.0, Some(0)), 2).location.is_some());
    }

    #[test]
    fn test_pause_from_kind() {
        let pause = decode(RawRow::from_degrees(1, 1, 10.0, 20.0, Some(PAUSE_KIND)), 2);
        assert!(pause.is_pause());
        // A pause may still carry a location
        assert!(pause.has_valid_location());

        let regular = decode(RawRow::from_degrees(2, 1, 100.0, 0.0, Some(0)), 2);
        assert!(!regular.is_pause());
        assert!(regular.location.is_none());
    }

    #[test]
    fn test_unexpected_kind_is_regular_point() {
        let point = decode(RawRow::from_degrees(1, 1, 10.0, 20.0, Some(7)), 2);
        assert!(!point.is_pause());
        assert!(point.has_valid_location());
    }

    #[test]
    fn test_legacy_pause_ignores_longitude() {
        for lon in [0.0, 20.0, -179.5, 500.0] {
            let point = decode(RawRow::from_degrees(1, 1, 100.0, lon, None), 1);
            assert!(point.is_pause(), "longitude {}", lon);
            assert!(point.location.is_none());
        }
    }

    #[test]
    fn test_legacy_ignores_supplied_kind() {
        let point = decode(RawRow::from_degrees(1, 1, 10.0, 20.0, Some(PAUSE_KIND)), 1);
        assert_eq!(point.kind, None);
        assert!(!point.is_pause());
    }

    #[test]
    fn test_v2_row_without_kind_is_malformed() {
        let row = RawRow::from_degrees(8, 1, 10.0, 20.0, None);
        let err = TrackPoint::decode(&row, RowSchema::V2, &SegmenterConfig::default()).unwrap_err();
        match err {
            SegmentError::MalformedRow { row_id, column, .. } => {
                assert_eq!(row_id, 8);
                assert_eq!(column, "type");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bridge_copies_location_only() {
        let config = SegmenterConfig::default();
        let pause = decode(
            RawRow::from_degrees(3, 7, 100.0, 0.0, Some(PAUSE_KIND)).with_motion(1.5, 250.0, 60_000),
            2,
        );
        let bridge = TrackPoint::bridge(GpsPoint::new(10.0, 20.0), &pause, &config);
        assert_eq!(bridge.location, Some(GpsPoint::new(10.0, 20.0)));
        assert_eq!(bridge.row_id, 3);
        assert_eq!(bridge.session_id, 7);
        assert_eq!(bridge.speed, 1.5);
        assert_eq!(bridge.elevation, 250.0);
        assert_eq!(bridge.time_millis, 60_000);
        assert!(bridge.is_bridge);
    }

    #[test]
    fn test_time_and_display() {
        let point = decode(
            RawRow::from_degrees(1, 2, 10.0, 20.0, Some(0)).with_motion(2.0, 5.0, 0),
            2,
        );
        assert_eq!(point.time().unwrap().timestamp(), 0);
        let text = point.to_string();
        assert!(text.contains("row=1"));
        assert!(text.contains("(10.000000, 20.000000)"));
        assert!(text.contains("1970-01-01T00:00:00"));
    }
}
