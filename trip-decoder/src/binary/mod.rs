//! The binary response decoder.
//!
//! Layout of a response: a fixed header holding pointers into side tables
//! (strings, service calendars, stations, comments, an extension header),
//! then per-trip summary slots, leg records, and a trip-details area with
//! realtime data. All multi-byte integers are byte-order-reversed; pointer
//! jumps seek backward freely, so the whole response must be buffered
//! before decoding starts.
//!
//! Key characteristics of the format:
//! - The string table's encoding is itself a string in the table, so the
//!   table starts with a provisional 7-bit decoding and is finalized once
//!   the charset name has been read.
//! - A 16-bit all-ones value means "no time", distinct from midnight.
//! - Trips whose realtime status says "cancelled" are dropped entirely,
//!   and the endpoint stops the format duplicates into each leg's
//!   intermediate-stop list are trimmed back out.

mod attrs;
mod comments;
mod context;
mod cursor;
mod decode;
mod error;
mod service_days;
mod stations;
mod status;
mod strings;
mod trips;


pub use context::{InvalidToken, PagingContext};
pub use decode::{TripPage, decode_trips};
pub use error::{DecodeError, FormatError};
pub use status::BackendStatus;
