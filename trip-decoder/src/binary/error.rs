//! Decoder error types.
//!
//! Two layers, per the error taxonomy of the format: `FormatError` for
//! malformed layout (always fatal, never retried), wrapped by
//! `DecodeError` alongside the recoverable conditions a caller can act on
//! (backend-reported failure statuses, session expiry, truncated buffer).

use super::status::BackendStatus;

/// Malformed response layout. Fatal: retrying the same bytes cannot help.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The version tag is not one this decoder knows.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u16),

    /// A table pointer was negative or the tables overlap.
    #[error("bad {table} table range: starts at {start:#x}, ends at {end:#x}")]
    BadTableRange {
        table: &'static str,
        start: usize,
        end: usize,
    },

    /// A 32-bit pointer field was negative.
    #[error("negative pointer: {0}")]
    NegativePointer(i32),

    /// A string pointer does not fall inside the string table.
    #[error("string pointer {pointer:#x} outside table of {len} bytes")]
    BadStringPointer { pointer: u16, len: usize },

    /// A station index does not fall inside the station table.
    #[error("station index {index} outside table of {len} bytes")]
    BadStationIndex { index: u16, len: usize },

    /// A comment pointer does not fall inside the comment table.
    #[error("comment pointer {pointer:#x} outside table of {len} bytes")]
    BadCommentPointer { pointer: u16, len: usize },

    /// A service-day offset does not fall inside the service-day table.
    #[error("service day offset {offset:#x} outside table of {len} bytes")]
    BadServiceDayOffset { offset: u16, len: usize },

    /// The discovered charset name is not a supported encoding.
    #[error("unknown character set: {0:?}")]
    UnknownCharset(String),

    /// The string table encoding was finalized a second time.
    #[error("string table encoding finalized twice")]
    EncodingAlreadyFinalized,

    /// The extension header declares fewer bytes than the decoder needs.
    #[error("extension header too short: {0:#x} bytes")]
    ExtensionHeaderTooShort(u32),

    /// Trips are present but the trip-details pointer is zero.
    #[error("missing trip details")]
    MissingTripDetails,

    /// The trip-details area declares a version this decoder does not know.
    #[error("unsupported trip details version: {0}")]
    UnsupportedDetailsVersion(u16),

    /// The trip-details area declares a leg record size other than 16.
    #[error("unsupported leg detail record size: {0}")]
    UnsupportedLegRecordSize(u16),

    /// The trip-details area declares a stop record size other than 26.
    #[error("unsupported stop record size: {0}")]
    UnsupportedStopRecordSize(u16),

    /// A location record carries a type code this decoder does not know.
    #[error("unknown location type: {0}")]
    UnknownLocationType(u16),

    /// A leg record carries a type code this decoder does not know.
    #[error("unknown leg type: {0}")]
    UnknownLegType(u16),

    /// An individual leg names a routing type this decoder does not know.
    #[error("unknown routing type: {0:?}")]
    UnknownRoutingType(String),

    /// The extension header carries an error code absent from the mapping
    /// table — a backend or protocol revision this decoder does not know.
    #[error("unknown backend error code: {0}")]
    UnknownErrorCode(u16),

    /// An individual leg is missing its departure or arrival time.
    #[error("individual leg is missing its {0} time")]
    MissingLegTime(&'static str),

    /// A trip declares zero legs.
    #[error("trip {0} has no legs")]
    EmptyTrip(u16),

    /// A disruption record chain loops instead of terminating.
    #[error("disruption chain does not terminate")]
    UnterminatedDisruptionChain,
}

/// Outcome of a failed decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The response bytes do not follow the format. Fatal.
    #[error("malformed response: {0}")]
    Format(#[from] FormatError),

    /// The backend understood the query and rejected it. Recoverable at
    /// the application level.
    #[error("backend rejected the query: {0}")]
    Backend(BackendStatus),

    /// The server-side session is gone; the continuation token is dead
    /// and the caller must restart the search.
    #[error("session expired; restart the search")]
    SessionExpired,

    /// A read ran past the end of the buffer. Typically the response was
    /// truncated; the caller should retry with a larger buffer sized from
    /// the previous page's `used_buffer_size`.
    #[error("read at offset {offset:#x} beyond the {len} buffered bytes")]
    BufferTooSmall { offset: usize, len: usize },
}
