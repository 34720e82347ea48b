//! Trip and leg decoding.
//!
//! Per trip: a fixed summary slot, a service-day record, a realtime
//! detail slot (whose status can cancel the whole trip), and `num_legs`
//! leg records, each cross-referencing the station, string, comment and
//! attribute tables. Leg records come in pairs: the planned 20-byte
//! record in the legs area and a 16-byte realtime record in the
//! trip-details area.

use chrono::{NaiveDate, TimeZone};
use tracing::{debug, warn};

use crate::domain::time;
use crate::domain::{IndividualKind, Leg, Line, Product, Stop, Trip};
use crate::normalize::{LineResolver, NameSplitter};

use super::attrs::AttrArea;
use super::comments::CommentTable;
use super::cursor::{Buffer, ptr};
use super::error::{DecodeError, FormatError};
use super::service_days::ServiceDayTable;
use super::stations::StationTable;
use super::strings::StringTable;

/// First trip summary slot; the fixed header ends here.
pub(crate) const TRIPS_BASE: usize = 0x4a;
/// Stride of the per-trip summary slots.
pub(crate) const TRIP_SUMMARY_SIZE: usize = 12;
/// Stride of the planned leg records.
pub(crate) const LEG_RECORD_SIZE: usize = 20;
/// Declared (and only supported) stride of realtime leg records.
pub(crate) const LEG_DETAIL_SIZE: u16 = 16;
/// Declared (and only supported) stride of intermediate-stop records.
pub(crate) const STOP_RECORD_SIZE: u16 = 26;

const DEPARTURE_CANCELLED: u16 = 0x0010;
const ARRIVAL_CANCELLED: u16 = 0x0020;

/// Realtime status marking the whole trip as cancelled.
const STATUS_TRIP_CANCELLED: u16 = 2;

/// Validated pointers into the trip-details area.
pub(crate) struct TripDetails {
    base: usize,
    index_offset: u16,
    leg_offset: u16,
    stops_offset: u16,
}

impl TripDetails {
    /// Read and validate the trip-details header at `base`.
    pub(crate) fn read(buf: &Buffer<'_>, base: usize) -> Result<Self, DecodeError> {
        let mut cur = buf.cursor_at(base)?;
        let version = cur.u16_reversed()?;
        if version != 1 {
            return Err(FormatError::UnsupportedDetailsVersion(version).into());
        }
        cur.skip(2)?;
        let index_offset = cur.u16_reversed()?;
        let leg_offset = cur.u16_reversed()?;
        let leg_size = cur.u16_reversed()?;
        if leg_size != LEG_DETAIL_SIZE {
            return Err(FormatError::UnsupportedLegRecordSize(leg_size).into());
        }
        let stop_size = cur.u16_reversed()?;
        if stop_size != STOP_RECORD_SIZE {
            return Err(FormatError::UnsupportedStopRecordSize(stop_size).into());
        }
        let stops_offset = cur.u16_reversed()?;
        Ok(Self {
            base,
            index_offset,
            leg_offset,
            stops_offset,
        })
    }
}

/// Free-text disruption lookup, keyed by trip index then leg index.
///
/// Per trip, a chain of records (leg index, title, short text, next);
/// the short text overrides the title when both are present.
pub(crate) struct DisruptionTable<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
}

impl<'a> DisruptionTable<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize) -> Self {
        Self { buf, base }
    }

    pub(crate) fn lookup(
        &self,
        trip_idx: u16,
        leg_idx: u16,
        strings: &StringTable<'_>,
    ) -> Result<Option<String>, DecodeError> {
        let mut cur = self.buf.cursor_at(self.base + 2 + usize::from(trip_idx) * 2)?;
        let mut offset = usize::from(cur.u16_reversed()?);

        // Cap the chain walk so cyclic next-pointers cannot hang us.
        let mut remaining = self.buf.len().saturating_sub(self.base) / 8 + 1;
        while offset != 0 {
            if remaining == 0 {
                return Err(FormatError::UnterminatedDisruptionChain.into());
            }
            remaining -= 1;

            let mut cur = self.buf.cursor_at(self.base + offset)?;
            let leg = cur.u16_reversed()?;
            let title_ptr = cur.u16_reversed()?;
            let short_ptr = cur.u16_reversed()?;
            let next = usize::from(cur.u16_reversed()?);

            if leg == leg_idx {
                let title = strings.read(title_ptr)?;
                let short = strings.read(short_ptr)?;
                return Ok(short.or(title));
            }
            offset = next;
        }
        Ok(None)
    }
}

/// Everything the per-trip decode needs: resolved tables, the response's
/// base date, and the caller's normalization hooks.
pub(crate) struct TripDecoder<'a, Tz: TimeZone> {
    pub(crate) buf: &'a Buffer<'a>,
    pub(crate) strings: &'a StringTable<'a>,
    pub(crate) stations: &'a StationTable<'a>,
    pub(crate) comments: &'a CommentTable<'a>,
    pub(crate) service_days: &'a ServiceDayTable<'a>,
    pub(crate) attrs: Option<AttrArea<'a>>,
    /// Absolute pointer to the per-trip attribute-list index (0 = none).
    pub(crate) trip_attrs_index: usize,
    pub(crate) details: TripDetails,
    pub(crate) disruptions: Option<DisruptionTable<'a>>,
    pub(crate) base_date: NaiveDate,
    pub(crate) tz: &'a Tz,
    pub(crate) splitter: &'a dyn NameSplitter,
    pub(crate) lines: &'a dyn LineResolver,
}

impl<Tz: TimeZone> TripDecoder<'_, Tz> {
    /// Decode trip `trip_idx`, or `None` when its realtime status says
    /// the whole trip is cancelled.
    pub(crate) fn decode_trip(&self, trip_idx: u16) -> Result<Option<Trip>, DecodeError> {
        let mut cur = self
            .buf
            .cursor_at(TRIPS_BASE + usize::from(trip_idx) * TRIP_SUMMARY_SIZE)?;
        let service_days_offset = cur.u16_reversed()?;
        let legs_offset = ptr(cur.i32_reversed()?)?;
        let num_legs = cur.u16_reversed()?;
        let num_changes = cur.u16_reversed()?;
        // Duration is transmitted here but recomputable from the legs.
        let _duration = cur.u16_reversed()?;

        let service = self.service_days.resolve(service_days_offset, self.strings)?;
        debug!(
            trip = trip_idx,
            legs = num_legs,
            day_offset = service.day_offset,
            "decoding trip"
        );

        let mut cur = self.buf.cursor_at(
            self.details.base + usize::from(self.details.index_offset) + usize::from(trip_idx) * 2,
        )?;
        let details_offset = usize::from(cur.u16_reversed()?);

        let mut cur = self.buf.cursor_at(self.details.base + details_offset)?;
        let realtime_status = cur.u16_reversed()?;
        if realtime_status == STATUS_TRIP_CANCELLED {
            warn!(trip = trip_idx, "dropping fully cancelled trip");
            return Ok(None);
        }

        let connection_id = self.trip_attribute(trip_idx, "ConnectionId")?;

        let mut legs: Vec<Leg> = Vec::with_capacity(usize::from(num_legs));
        for leg_idx in 0..num_legs {
            let leg = self.decode_leg(
                trip_idx,
                leg_idx,
                legs_offset,
                details_offset,
                service.day_offset,
            )?;
            push_merged(&mut legs, leg);
        }

        let origin = legs
            .first()
            .map(|leg| leg.departure_location().clone())
            .ok_or(FormatError::EmptyTrip(trip_idx))?;
        let destination = legs
            .last()
            .map(|leg| leg.arrival_location().clone())
            .ok_or(FormatError::EmptyTrip(trip_idx))?;

        Ok(Some(Trip {
            id: connection_id,
            origin,
            destination,
            legs,
            fares: Vec::new(),
            capacity: None,
            num_changes,
        }))
    }

    fn decode_leg(
        &self,
        trip_idx: u16,
        leg_idx: u16,
        legs_offset: usize,
        details_offset: usize,
        day_offset: u32,
    ) -> Result<Leg, DecodeError> {
        let mut cur = self
            .buf
            .cursor_at(TRIPS_BASE + legs_offset + usize::from(leg_idx) * LEG_RECORD_SIZE)?;
        let planned_departure_raw = cur.u16_reversed()?;
        let departure_station = cur.u16_reversed()?;
        let planned_arrival_raw = cur.u16_reversed()?;
        let arrival_station = cur.u16_reversed()?;
        let leg_type = cur.u16_reversed()?;
        let line_name_ptr = cur.u16_reversed()?;
        let planned_departure_platform = cur.u16_reversed()?;
        let planned_arrival_platform = cur.u16_reversed()?;
        let leg_attr_index = cur.u16_reversed()?;
        let comments_ptr = cur.u16_reversed()?;

        let departure_location = self
            .stations
            .read(departure_station, self.strings, self.splitter)?;
        let arrival_location = self
            .stations
            .read(arrival_station, self.strings, self.splitter)?;

        // The realtime half of the leg.
        let mut det = self.buf.cursor_at(
            self.details.base
                + details_offset
                + usize::from(self.details.leg_offset)
                + usize::from(leg_idx) * usize::from(LEG_DETAIL_SIZE),
        )?;
        let predicted_departure_raw = det.u16_reversed()?;
        let predicted_departure_platform = det.u16_reversed()?;
        let predicted_arrival_raw = det.u16_reversed()?;
        let predicted_arrival_platform = det.u16_reversed()?;
        let flags = det.u16_reversed()?;
        det.skip(2)?;
        let first_stop_index = det.u16_reversed()?;
        let num_stops = det.u16_reversed()?;

        match leg_type {
            2 => {
                let label = self.strings.read(line_name_ptr)?.unwrap_or_default();
                let mut line = self.lines.resolve(&label);
                apply_line_annotations(&mut line, &self.comments.read(comments_ptr, self.strings)?);

                let mut departure = Stop::new(departure_location);
                departure.planned_departure =
                    time::resolve(planned_departure_raw, self.base_date, day_offset, self.tz);
                departure.predicted_departure =
                    time::resolve(predicted_departure_raw, self.base_date, day_offset, self.tz);
                departure.planned_departure_platform =
                    self.strings.read(planned_departure_platform)?;
                departure.predicted_departure_platform =
                    self.strings.read(predicted_departure_platform)?;
                departure.departure_cancelled = flags & DEPARTURE_CANCELLED != 0;

                let mut arrival = Stop::new(arrival_location);
                arrival.planned_arrival =
                    time::resolve(planned_arrival_raw, self.base_date, day_offset, self.tz);
                arrival.predicted_arrival =
                    time::resolve(predicted_arrival_raw, self.base_date, day_offset, self.tz);
                arrival.planned_arrival_platform = self.strings.read(planned_arrival_platform)?;
                arrival.predicted_arrival_platform =
                    self.strings.read(predicted_arrival_platform)?;
                arrival.arrival_cancelled = flags & ARRIVAL_CANCELLED != 0;

                let mut stops = Vec::with_capacity(usize::from(num_stops));
                for k in 0..num_stops {
                    let index = usize::from(first_stop_index) + usize::from(k);
                    stops.push(self.read_stop(index, day_offset)?);
                }
                // The format counts both endpoints among the
                // "intermediate" stops; trim them back out.
                if stops
                    .first()
                    .is_some_and(|s| s.location.same_place(&departure.location))
                {
                    stops.remove(0);
                }
                if stops
                    .last()
                    .is_some_and(|s| s.location.same_place(&arrival.location))
                {
                    stops.pop();
                }

                let disruption = match &self.disruptions {
                    Some(table) => table.lookup(trip_idx, leg_idx, self.strings)?,
                    None => None,
                };

                Ok(Leg::Public {
                    line,
                    direction: None,
                    departure,
                    arrival,
                    intermediate_stops: stops,
                    path: Vec::new(),
                    disruption,
                })
            }
            1 | 3 | 4 => {
                let kind = self.individual_kind(leg_type, leg_attr_index)?;
                let departure_time =
                    time::resolve(planned_departure_raw, self.base_date, day_offset, self.tz)
                        .ok_or(FormatError::MissingLegTime("departure"))?;
                let arrival_time =
                    time::resolve(planned_arrival_raw, self.base_date, day_offset, self.tz)
                        .ok_or(FormatError::MissingLegTime("arrival"))?;

                Ok(Leg::Individual {
                    kind,
                    departure_location,
                    departure_time,
                    arrival_location,
                    arrival_time,
                    path: Vec::new(),
                    distance_m: 0,
                })
            }
            other => Err(FormatError::UnknownLegType(other).into()),
        }
    }

    fn read_stop(&self, index: usize, day_offset: u32) -> Result<Stop, DecodeError> {
        let mut cur = self.buf.cursor_at(
            self.details.base
                + usize::from(self.details.stops_offset)
                + index * usize::from(STOP_RECORD_SIZE),
        )?;
        let planned_departure_raw = cur.u16_reversed()?;
        let station = cur.u16_reversed()?;
        let planned_arrival_raw = cur.u16_reversed()?;
        let planned_departure_platform = cur.u16_reversed()?;
        let planned_arrival_platform = cur.u16_reversed()?;
        let predicted_departure_raw = cur.u16_reversed()?;
        let predicted_arrival_raw = cur.u16_reversed()?;
        let predicted_departure_platform = cur.u16_reversed()?;
        let predicted_arrival_platform = cur.u16_reversed()?;
        let flags = cur.u16_reversed()?;
        // 6 reserved bytes close out the 26-byte record.

        let location = self.stations.read(station, self.strings, self.splitter)?;
        let mut stop = Stop::new(location);
        stop.planned_departure =
            time::resolve(planned_departure_raw, self.base_date, day_offset, self.tz);
        stop.predicted_departure =
            time::resolve(predicted_departure_raw, self.base_date, day_offset, self.tz);
        stop.planned_arrival =
            time::resolve(planned_arrival_raw, self.base_date, day_offset, self.tz);
        stop.predicted_arrival =
            time::resolve(predicted_arrival_raw, self.base_date, day_offset, self.tz);
        stop.planned_departure_platform = self.strings.read(planned_departure_platform)?;
        stop.predicted_departure_platform = self.strings.read(predicted_departure_platform)?;
        stop.planned_arrival_platform = self.strings.read(planned_arrival_platform)?;
        stop.predicted_arrival_platform = self.strings.read(predicted_arrival_platform)?;
        stop.departure_cancelled = flags & DEPARTURE_CANCELLED != 0;
        stop.arrival_cancelled = flags & ARRIVAL_CANCELLED != 0;
        Ok(stop)
    }

    /// Kind of an individual leg: type 1 consults the optional routing
    /// type attribute, types 3 and 4 are always transfers.
    fn individual_kind(
        &self,
        leg_type: u16,
        attr_index: u16,
    ) -> Result<IndividualKind, DecodeError> {
        if leg_type != 1 {
            return Ok(IndividualKind::Transfer);
        }
        let routing = match &self.attrs {
            Some(area) => area
                .scan(attr_index, &["RoutingType"], self.strings)?
                .remove("RoutingType"),
            None => None,
        };
        match routing.as_deref() {
            None | Some("FOOT") => Ok(IndividualKind::Walk),
            Some("BIKE") => Ok(IndividualKind::Bike),
            Some("CAR") | Some("P+R") => Ok(IndividualKind::Car),
            Some(other) => Err(FormatError::UnknownRoutingType(other.to_owned()).into()),
        }
    }

    fn trip_attribute(
        &self,
        trip_idx: u16,
        key: &'static str,
    ) -> Result<Option<String>, DecodeError> {
        let Some(area) = &self.attrs else {
            return Ok(None);
        };
        if self.trip_attrs_index == 0 {
            return Ok(None);
        }
        let mut cur = self
            .buf
            .cursor_at(self.trip_attrs_index + usize::from(trip_idx) * 2)?;
        let index = cur.u16_reversed()?;
        Ok(area.scan(index, &[key], self.strings)?.remove(key))
    }
}

/// Classify prefixed line annotations into line attributes.
///
/// On-demand annotations carry the booking note as their payload and
/// reclassify the product.
fn apply_line_annotations(line: &mut Line, comments: &[String]) {
    for comment in comments {
        if comment.starts_with("bf ") {
            line.attrs.wheelchair_access = true;
        } else if comment.starts_with("FA ") || comment.starts_with("FB ") || comment.starts_with("FR ") {
            line.attrs.bicycle_carriage = true;
        } else if comment.starts_with("$R ") || comment.starts_with("ga ") {
            line.attrs.on_demand = true;
            line.product = Product::OnDemand;
            line.comment = Some(comment[3..].to_owned());
        }
    }
}

/// Append a leg, merging it into its predecessor when both are
/// individual legs of the same kind sharing an endpoint — the format
/// sometimes splits one walk into adjacent records.
fn push_merged(legs: &mut Vec<Leg>, leg: Leg) {
    let mergeable = matches!(
        (legs.last(), &leg),
        (
            Some(Leg::Individual { kind: prev_kind, arrival_location: prev_arrival, .. }),
            Leg::Individual { kind, departure_location, .. },
        ) if prev_kind == kind && prev_arrival.same_place(departure_location)
    );
    if !mergeable {
        legs.push(leg);
        return;
    }

    let Leg::Individual {
        arrival_location: new_arrival,
        arrival_time: new_arrival_time,
        path: new_path,
        distance_m: new_distance,
        ..
    } = leg
    else {
        return;
    };
    let Some(Leg::Individual {
        arrival_location,
        arrival_time,
        path,
        distance_m,
        ..
    }) = legs.last_mut()
    else {
        return;
    };

    *arrival_location = new_arrival;
    *arrival_time = new_arrival_time;
    path.extend(new_path);
    *distance_m = distance_m.saturating_add(new_distance);
    debug!("merged adjacent individual legs");
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone as _};

    use super::*;
    use crate::domain::{Location, LocationType};

    fn at(hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, hour, min, 0)
            .unwrap()
    }

    fn named(name: &str) -> Location {
        let mut loc = Location::new(LocationType::Station);
        loc.name = Some(name.into());
        loc
    }

    fn walk(from: &str, to: &str, dep: (u32, u32), arr: (u32, u32)) -> Leg {
        Leg::Individual {
            kind: IndividualKind::Walk,
            departure_location: named(from),
            departure_time: at(dep.0, dep.1),
            arrival_location: named(to),
            arrival_time: at(arr.0, arr.1),
            path: Vec::new(),
            distance_m: 100,
        }
    }

    #[test]
    fn adjacent_walks_sharing_an_endpoint_merge() {
        let mut legs = Vec::new();
        push_merged(&mut legs, walk("A", "B", (10, 0), (10, 5)));
        push_merged(&mut legs, walk("B", "C", (10, 5), (10, 12)));

        assert_eq!(legs.len(), 1);
        let Leg::Individual {
            departure_location,
            arrival_location,
            departure_time,
            arrival_time,
            distance_m,
            ..
        } = &legs[0]
        else {
            panic!("expected individual leg");
        };
        assert_eq!(departure_location.name.as_deref(), Some("A"));
        assert_eq!(arrival_location.name.as_deref(), Some("C"));
        assert_eq!(*departure_time, at(10, 0));
        assert_eq!(*arrival_time, at(10, 12));
        assert_eq!(*distance_m, 200);
    }

    #[test]
    fn walks_with_different_endpoints_do_not_merge() {
        let mut legs = Vec::new();
        push_merged(&mut legs, walk("A", "B", (10, 0), (10, 5)));
        push_merged(&mut legs, walk("X", "C", (10, 5), (10, 12)));

        assert_eq!(legs.len(), 2);
    }

    #[test]
    fn different_kinds_do_not_merge() {
        let mut legs = Vec::new();
        push_merged(&mut legs, walk("A", "B", (10, 0), (10, 5)));
        let transfer = Leg::Individual {
            kind: IndividualKind::Transfer,
            departure_location: named("B"),
            departure_time: at(10, 5),
            arrival_location: named("C"),
            arrival_time: at(10, 9),
            path: Vec::new(),
            distance_m: 0,
        };
        push_merged(&mut legs, transfer);

        assert_eq!(legs.len(), 2);
    }

    #[test]
    fn line_annotations_set_flags() {
        let mut line = Line::new(Product::Bus, "204");
        apply_line_annotations(
            &mut line,
            &[
                "bf rollstuhlgerecht".to_owned(),
                "FR Fahrradmitnahme reservierungspflichtig".to_owned(),
            ],
        );

        assert!(line.attrs.wheelchair_access);
        assert!(line.attrs.bicycle_carriage);
        assert!(!line.attrs.on_demand);
        assert_eq!(line.product, Product::Bus);
        assert_eq!(line.comment, None);
    }

    #[test]
    fn on_demand_annotation_reclassifies_and_keeps_note() {
        let mut line = Line::new(Product::Bus, "AST 7");
        apply_line_annotations(&mut line, &["ga Anmeldung bis 30 Min. vorher".to_owned()]);

        assert!(line.attrs.on_demand);
        assert_eq!(line.product, Product::OnDemand);
        assert_eq!(line.comment.as_deref(), Some("Anmeldung bis 30 Min. vorher"));
    }

    #[test]
    fn unrelated_annotations_are_ignored() {
        let mut line = Line::new(Product::Tram, "M10");
        apply_line_annotations(&mut line, &["XY something else".to_owned()]);
        assert!(!line.attrs.any());
    }

    /// String table at 0: 1 = "Signalstoerung", 16 = "Verspaetung erwartet".
    const DISRUPTION_STRINGS: &[u8] = b"\0Signalstoerung\0Verspaetung erwartet\0";

    /// Disruption table for two trips: trip 0 chains two records (legs 1
    /// and 0), trip 1 has none.
    fn disruption_fixture(next_of_first: u16) -> Vec<u8> {
        let mut data = DISRUPTION_STRINGS.to_vec();
        let words: &[u16] = &[
            1, // record count (unread)
            6, 0, // per-trip offsets
            1, 1, 16, next_of_first, // record at +6: leg 1
            0, 1, 0, 0, // record at +14: leg 0, no short text
        ];
        for w in words {
            data.extend_from_slice(&w.to_le_bytes());
        }
        data
    }

    #[test]
    fn disruption_lookup_matches_leg_and_prefers_short_text() {
        let data = disruption_fixture(14);
        let buf = Buffer::new(&data);
        let strings = StringTable::new(&buf, 0, DISRUPTION_STRINGS.len());
        let table = DisruptionTable::new(&buf, DISRUPTION_STRINGS.len());

        assert_eq!(
            table.lookup(0, 1, &strings).unwrap().as_deref(),
            Some("Verspaetung erwartet")
        );
        // Second record in the chain; short text absent, title wins.
        assert_eq!(
            table.lookup(0, 0, &strings).unwrap().as_deref(),
            Some("Signalstoerung")
        );
        // Chain exhausted without a match.
        assert_eq!(table.lookup(0, 5, &strings).unwrap(), None);
        // Trip without disruptions.
        assert_eq!(table.lookup(1, 0, &strings).unwrap(), None);
    }

    #[test]
    fn cyclic_disruption_chain_is_a_format_error() {
        // First record points back at itself and never matches.
        let data = disruption_fixture(6);
        let buf = Buffer::new(&data);
        let strings = StringTable::new(&buf, 0, DISRUPTION_STRINGS.len());
        let table = DisruptionTable::new(&buf, DISRUPTION_STRINGS.len());

        assert_eq!(
            table.lookup(0, 5, &strings),
            Err(FormatError::UnterminatedDisruptionChain.into())
        );
    }
}
