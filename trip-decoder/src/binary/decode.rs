//! The decode orchestrator.
//!
//! Validates the version tag, resolves the header's table pointers,
//! handles the extension header (backend error codes, session state,
//! charset discovery), then drives the per-trip decoding and assembles
//! the continuation token.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::time;
use crate::domain::{Location, LocationType, Point, Trip};
use crate::normalize::{LineResolver, NameSplitter};

use super::attrs::AttrArea;
use super::comments::CommentTable;
use super::context::PagingContext;
use super::cursor::{Buffer, Cursor, ptr};
use super::error::{DecodeError, FormatError};
use super::service_days::ServiceDayTable;
use super::stations::StationTable;
use super::status::error_for_code;
use super::strings::StringTable;
use super::trips::{DisruptionTable, TripDecoder, TripDetails};

/// Format versions this decoder understands.
const SUPPORTED_VERSIONS: [u16; 2] = [5, 6];

/// Extension headers shorter than this cannot hold the fields we need.
const MIN_EXTENSION_HEADER_LEN: usize = 0x30;

/// One decoded page of trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPage {
    /// The origin as the backend resolved it.
    pub origin: Location,
    /// The destination as the backend resolved it.
    pub destination: Location,
    /// Decoded trips in backend order. Empty is a valid result.
    pub trips: Vec<Trip>,
    /// Opaque pagination state for querying earlier/later trips.
    pub context: PagingContext,
}

/// Decode one complete binary trip response.
///
/// `data` must hold the entire response: the format's pointer jumps seek
/// backward past any forward-progress point, so there is no streaming
/// mode. `tz` is the backend's timezone; the normalization callbacks
/// carry the per-backend name-splitting and line-classification
/// heuristics.
///
/// # Errors
///
/// - [`DecodeError::Format`] for malformed layout — fatal.
/// - [`DecodeError::Backend`] when the backend rejected the query.
/// - [`DecodeError::SessionExpired`] when the server-side search is gone.
/// - [`DecodeError::BufferTooSmall`] when a read ran past the buffered
///   bytes, typically a truncated response; retry with a larger buffer.
pub fn decode_trips<Tz: TimeZone>(
    data: &[u8],
    tz: &Tz,
    splitter: &dyn NameSplitter,
    lines: &dyn LineResolver,
) -> Result<TripPage, DecodeError> {
    let buf = Buffer::new(data);
    let mut cur = buf.cursor();

    let version = cur.u16_reversed()?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(FormatError::UnsupportedVersion(version).into());
    }

    // Fixed-position header fields.
    cur.reset();
    cur.skip(0x1e)?;
    let num_trips = cur.u16_reversed()?;
    let service_days_ptr = ptr(cur.i32_reversed()?)?;
    let strings_ptr = ptr(cur.i32_reversed()?)?;
    let base_date_days = cur.u16_reversed()?;
    // A second base date 30 days on; transmitted but unused downstream.
    let _second_base_date = cur.u16_reversed()?;

    cur.reset();
    cur.skip(0x36)?;
    let stations_ptr = ptr(cur.i32_reversed()?)?;
    let comments_ptr = ptr(cur.i32_reversed()?)?;

    cur.reset();
    cur.skip(0x46)?;
    let ext_ptr = ptr(cur.i32_reversed()?)?;

    // The side tables sit back to back, so each table's end is the next
    // table's start.
    let strings_len = table_len("string", strings_ptr, service_days_ptr)?;
    let service_days_len = table_len("service day", service_days_ptr, stations_ptr)?;
    let stations_len = table_len("station", stations_ptr, comments_ptr)?;
    let comments_len = table_len("comment", comments_ptr, ext_ptr)?;
    debug!(
        version,
        num_trips, strings_ptr, service_days_ptr, stations_ptr, comments_ptr, ext_ptr,
        "resolved header pointers"
    );

    let mut strings = StringTable::new(&buf, strings_ptr, strings_len);

    // Extension header.
    let mut ext = buf.cursor_at(ext_ptr)?;
    let ext_len = ptr(ext.i32_reversed()?)?;
    if ext_len < MIN_EXTENSION_HEADER_LEN {
        return Err(FormatError::ExtensionHeaderTooShort(ext_len as u32).into());
    }
    let sequence = ext.u16_reversed()?;
    let request_id_ptr = ext.u16_reversed()?;
    let trip_details_ptr = ptr(ext.i32_reversed()?)?;
    let charset_ptr = ext.u16_reversed()?;
    let last_day_ptr = ext.u16_reversed()?;
    let error_code = ext.u16_reversed()?;
    ext.skip(2)?;
    let disruptions_ptr = ptr(ext.i32_reversed()?)?;
    let attrs_ptr = ptr(ext.i32_reversed()?)?;
    let trip_attrs_index_ptr = ptr(ext.i32_reversed()?)?;

    // A backend-reported error short-circuits everything else.
    if error_code != 0 {
        debug!(error_code, "backend reported an error code");
        return Err(error_for_code(error_code));
    }

    // Sequence number 0 means the server-side search is gone; the caller
    // must restart rather than page further.
    if sequence == 0 {
        return Err(DecodeError::SessionExpired);
    }

    // Mid-parse encoding discovery: the charset name is itself a table
    // string, readable with the provisional 7-bit decoding.
    if let Some(charset_name) = strings.read(charset_ptr)? {
        debug!(charset = %charset_name, "finalizing string table encoding");
        strings.finalize(&charset_name)?;
    }

    let request_id = strings.read(request_id_ptr)?.unwrap_or_default();
    let last_day = strings.read(last_day_ptr)?;

    // Resolved endpoints and the response-wide base date.
    cur.reset();
    cur.skip(0x02)?;
    let origin = read_header_location(&mut cur, &strings, splitter)?;
    let destination = read_header_location(&mut cur, &strings, splitter)?;
    let base_date = time::base_date(base_date_days);

    if num_trips == 0 {
        debug!("response carries no trips");
        let context = PagingContext::new(request_id, sequence, last_day, buf.used(), true);
        return Ok(TripPage {
            origin,
            destination,
            trips: Vec::new(),
            context,
        });
    }

    if trip_details_ptr == 0 {
        return Err(FormatError::MissingTripDetails.into());
    }
    let details = TripDetails::read(&buf, trip_details_ptr)?;

    let service_days = ServiceDayTable::new(&buf, service_days_ptr, service_days_len);
    let stations = StationTable::new(&buf, stations_ptr, stations_len);
    let comments = CommentTable::new(&buf, comments_ptr, comments_len);
    let attrs = (attrs_ptr != 0).then(|| AttrArea::new(&buf, attrs_ptr));
    let disruptions = (disruptions_ptr != 0).then(|| DisruptionTable::new(&buf, disruptions_ptr));

    let decoder = TripDecoder {
        buf: &buf,
        strings: &strings,
        stations: &stations,
        comments: &comments,
        service_days: &service_days,
        attrs,
        trip_attrs_index: trip_attrs_index_ptr,
        details,
        disruptions,
        base_date,
        tz,
        splitter,
        lines,
    };

    let mut trips = Vec::with_capacity(usize::from(num_trips));
    let mut cancelled = 0u16;
    for trip_idx in 0..num_trips {
        match decoder.decode_trip(trip_idx)? {
            Some(trip) => trips.push(trip),
            None => cancelled += 1,
        }
    }
    debug!(decoded = trips.len(), cancelled, "decoded trip list");

    // A lone unscheduled leg means the backend cannot page this search.
    let can_query_more =
        !(trips.len() == 1 && trips[0].legs.len() == 1 && trips[0].legs[0].is_individual());
    let context = PagingContext::new(request_id, sequence, last_day, buf.used(), can_query_more);

    Ok(TripPage {
        origin,
        destination,
        trips,
        context,
    })
}

fn table_len(table: &'static str, start: usize, end: usize) -> Result<usize, FormatError> {
    end.checked_sub(start)
        .ok_or(FormatError::BadTableRange { table, start, end })
}

/// Read one of the header's fixed 14-byte location records.
fn read_header_location(
    cur: &mut Cursor<'_>,
    strings: &StringTable<'_>,
    splitter: &dyn NameSplitter,
) -> Result<Location, DecodeError> {
    let name_ptr = cur.u16_reversed()?;
    let type_code = cur.u16_reversed()?;
    let lon = cur.i32_reversed()?;
    let lat = cur.i32_reversed()?;
    cur.skip(2)?;

    let loc_type = match type_code {
        // Unresolved slots come through zeroed.
        0 => LocationType::Coord,
        1 => LocationType::Station,
        2 => LocationType::Address,
        3 => LocationType::Poi,
        other => return Err(FormatError::UnknownLocationType(other).into()),
    };

    let mut location = Location::new(loc_type);
    if let Some(full) = strings.read(name_ptr)? {
        let (place, name) = splitter.split(&full);
        location.place = place;
        location.name = Some(name);
    }
    if lat != 0 || lon != 0 {
        location.coord = Some(Point::from_1e6(lat, lon));
    }
    Ok(location)
}
