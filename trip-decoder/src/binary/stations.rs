//! The station table.
//!
//! A fixed-stride array of location records: u16 name pointer, i32 id
//! (0 = none), i32 lon, i32 lat, 14 bytes per record, addressed by index.

use crate::domain::{Location, LocationType, Point};
use crate::normalize::NameSplitter;

use super::cursor::Buffer;
use super::error::{DecodeError, FormatError};
use super::strings::StringTable;

pub(crate) const RECORD_SIZE: usize = 14;

pub(crate) struct StationTable<'a> {
    buf: &'a Buffer<'a>,
    base: usize,
    len: usize,
}

impl<'a> StationTable<'a> {
    pub(crate) fn new(buf: &'a Buffer<'a>, base: usize, len: usize) -> Self {
        Self { buf, base, len }
    }

    /// Read the location record at `index`.
    ///
    /// The index must address a record inside the table; the name is split
    /// into place and name by the caller-supplied heuristics.
    pub(crate) fn read(
        &self,
        index: u16,
        strings: &StringTable<'_>,
        splitter: &dyn NameSplitter,
    ) -> Result<Location, DecodeError> {
        let offset = usize::from(index) * RECORD_SIZE;
        if offset >= self.len {
            return Err(FormatError::BadStationIndex {
                index,
                len: self.len,
            }
            .into());
        }

        let mut cur = self.buf.cursor_at(self.base + offset)?;
        let name_ptr = cur.u16_reversed()?;
        let id = cur.i32_reversed()?;
        let lon = cur.i32_reversed()?;
        let lat = cur.i32_reversed()?;

        let (place, name) = match strings.read(name_ptr)? {
            Some(full) => {
                let (place, name) = splitter.split(&full);
                (place, Some(name))
            }
            None => (None, None),
        };
        let coord = (lat != 0 || lon != 0).then(|| Point::from_1e6(lat, lon));

        // Records with no id and no coordinates are bare named places.
        let loc_type = if id == 0 && coord.is_none() && name.is_none() {
            LocationType::Coord
        } else {
            LocationType::Station
        };
        let mut location = Location::new(loc_type);
        location.id = (id != 0).then(|| id.to_string());
        location.coord = coord;
        location.place = place;
        location.name = name;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{CommaSplit, NoSplit};

    /// A buffer holding a string table at 0 and a station table after it.
    fn fixture(strings_bytes: &[u8], records: &[(u16, i32, i32, i32)]) -> Vec<u8> {
        let mut data = strings_bytes.to_vec();
        for &(name_ptr, id, lon, lat) in records {
            data.extend_from_slice(&name_ptr.to_le_bytes());
            data.extend_from_slice(&id.to_le_bytes());
            data.extend_from_slice(&lon.to_le_bytes());
            data.extend_from_slice(&lat.to_le_bytes());
        }
        data
    }

    #[test]
    fn reads_station_record() {
        let strings = b"\0Berlin, Hbf\0";
        let data = fixture(strings, &[(1, 8_011_160, 13_369_548, 52_525_850)]);
        let buf = Buffer::new(&data);
        let string_table = StringTable::new(&buf, 0, strings.len());
        let stations = StationTable::new(&buf, strings.len(), RECORD_SIZE);

        let loc = stations.read(0, &string_table, &CommaSplit).unwrap();
        assert_eq!(loc.loc_type, LocationType::Station);
        assert_eq!(loc.id.as_deref(), Some("8011160"));
        assert_eq!(loc.place.as_deref(), Some("Berlin"));
        assert_eq!(loc.name.as_deref(), Some("Hbf"));
        let coord = loc.coord.unwrap();
        assert_eq!(coord.lat_1e6(), 52_525_850);
        assert_eq!(coord.lon_1e6(), 13_369_548);
    }

    #[test]
    fn id_zero_means_no_id() {
        let strings = b"\0Somewhere\0";
        let data = fixture(strings, &[(1, 0, 1_000_000, 2_000_000)]);
        let buf = Buffer::new(&data);
        let string_table = StringTable::new(&buf, 0, strings.len());
        let stations = StationTable::new(&buf, strings.len(), RECORD_SIZE);

        let loc = stations.read(0, &string_table, &NoSplit).unwrap();
        assert_eq!(loc.id, None);
        assert_eq!(loc.loc_type, LocationType::Station);
    }

    #[test]
    fn empty_record_is_a_bare_coordinate_slot() {
        let strings = b"\0";
        let data = fixture(strings, &[(0, 0, 0, 0)]);
        let buf = Buffer::new(&data);
        let string_table = StringTable::new(&buf, 0, strings.len());
        let stations = StationTable::new(&buf, strings.len(), RECORD_SIZE);

        let loc = stations.read(0, &string_table, &NoSplit).unwrap();
        assert_eq!(loc.loc_type, LocationType::Coord);
        assert_eq!(loc.name, None);
        assert_eq!(loc.coord, None);
    }

    #[test]
    fn out_of_table_index_is_a_format_error_not_a_wild_read() {
        let strings = b"\0A\0";
        let data = fixture(strings, &[(1, 7, 0, 0), (1, 8, 0, 0)]);
        let buf = Buffer::new(&data);
        let string_table = StringTable::new(&buf, 0, strings.len());
        // Table length covers exactly two records.
        let stations = StationTable::new(&buf, strings.len(), 2 * RECORD_SIZE);

        assert!(stations.read(1, &string_table, &NoSplit).is_ok());
        assert_eq!(
            stations.read(2, &string_table, &NoSplit),
            Err(FormatError::BadStationIndex { index: 2, len: 28 }.into())
        );
        assert!(stations.read(u16::MAX, &string_table, &NoSplit).is_err());
    }
}
