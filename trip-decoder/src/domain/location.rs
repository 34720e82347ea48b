//! Location types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of place a [`Location`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    /// A station or stop served by scheduled transport.
    Station,
    /// A street address.
    Address,
    /// A point of interest.
    Poi,
    /// A bare coordinate with no further identity.
    Coord,
}

/// A geographic point in fixed-point millionths of a degree.
///
/// The wire format transports coordinates as `degrees * 1e6` in a signed
/// 32-bit field, which covers the full ±180° range without loss. Keeping
/// the fixed-point representation makes equality exact; use [`Point::lat`]
/// and [`Point::lon`] for floating-point access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    lat_1e6: i32,
    lon_1e6: i32,
}

impl Point {
    /// Create a point from fixed-point millionths of a degree.
    pub fn from_1e6(lat_1e6: i32, lon_1e6: i32) -> Self {
        Self { lat_1e6, lon_1e6 }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        f64::from(self.lat_1e6) / 1e6
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        f64::from(self.lon_1e6) / 1e6
    }

    /// Latitude in millionths of a degree.
    pub fn lat_1e6(&self) -> i32 {
        self.lat_1e6
    }

    /// Longitude in millionths of a degree.
    pub fn lon_1e6(&self) -> i32 {
        self.lon_1e6
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat(), self.lon())
    }
}

/// A place a trip passes through, starts at, or ends at.
///
/// Every field except the type is optional because the backend frequently
/// omits them: station-table records may carry no id, resolved addresses
/// carry no station id, and pure coordinates carry no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// What kind of place this is.
    pub loc_type: LocationType,
    /// Backend-stable identifier, if the backend assigned one.
    pub id: Option<String>,
    /// Coordinates, if known.
    pub coord: Option<Point>,
    /// Locality ("place") part of the name, split off by the caller's
    /// normalization heuristics.
    pub place: Option<String>,
    /// Name within the locality.
    pub name: Option<String>,
}

impl Location {
    /// Create a location with all optional fields empty.
    pub fn new(loc_type: LocationType) -> Self {
        Self {
            loc_type,
            id: None,
            coord: None,
            place: None,
            name: None,
        }
    }

    /// Create a station location from its parts.
    pub fn station(id: Option<String>, coord: Option<Point>, place: Option<String>, name: Option<String>) -> Self {
        Self {
            loc_type: LocationType::Station,
            id,
            coord,
            place,
            name,
        }
    }

    /// True if the backend assigned this location a stable id.
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// "Place, Name" for display, falling back to whichever part exists.
    pub fn full_name(&self) -> Option<String> {
        match (&self.place, &self.name) {
            (Some(place), Some(name)) => Some(format!("{place}, {name}")),
            (None, Some(name)) => Some(name.clone()),
            (Some(place), None) => Some(place.clone()),
            (None, None) => None,
        }
    }

    /// Whether two locations refer to the same place.
    ///
    /// Ids win when both sides have one; otherwise fall back to name
    /// equality. Used when trimming duplicate endpoint stops and merging
    /// adjacent individual legs.
    pub fn same_place(&self, other: &Location) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name.is_some() && self.name == other.name && self.place == other.place,
        }
    }
}
