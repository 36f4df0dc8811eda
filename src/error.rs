//! Error type shared by the decoder and the segmenter.
//!
//! Individual points that cannot be placed on the map are never errors; they
//! are counted in [`SegmentStats`](crate::SegmentStats). Only contract
//! violations by the row source end a segmentation early.

use thiserror::Error;

/// Errors that abort a segmentation run.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// A row lacks a column its protocol version requires.
    #[error("row {row_id} is missing column `{column}` required by protocol version {protocol_version}")]
    MalformedRow {
        row_id: u64,
        column: &'static str,
        protocol_version: u32,
    },
    /// The row source failed mid-stream.
    #[error("track point source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid segmenter config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SegmentError>;
