//! Leg types.
//!
//! A trip is an ordered sequence of legs: scheduled service on a [`Line`]
//! (`Public`) or unscheduled movement such as walking between stations
//! (`Individual`).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{Line, Location, Point, Stop};

/// Kind of unscheduled movement an [`Leg::Individual`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndividualKind {
    Walk,
    Transfer,
    Bike,
    Car,
}

/// One directed segment of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Leg {
    /// Travel on a scheduled service.
    Public {
        /// The line operating this leg.
        line: Line,
        /// Headsign destination, when the backend supplies one.
        direction: Option<Location>,
        /// Boarding stop (departure side populated).
        departure: Stop,
        /// Alighting stop (arrival side populated).
        arrival: Stop,
        /// Stops between boarding and alighting, endpoints excluded.
        intermediate_stops: Vec<Stop>,
        /// Geographic path, when the backend supplies one.
        path: Vec<Point>,
        /// Operator free text about disruptions on this leg.
        disruption: Option<String>,
    },
    /// Unscheduled movement between two locations.
    Individual {
        kind: IndividualKind,
        departure_location: Location,
        departure_time: DateTime<FixedOffset>,
        arrival_location: Location,
        arrival_time: DateTime<FixedOffset>,
        /// Geographic path, when the backend supplies one.
        path: Vec<Point>,
        /// Distance covered in meters (0 when unknown).
        distance_m: u32,
    },
}

impl Leg {
    /// Best known departure time of this leg.
    pub fn departure_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Leg::Public { departure, .. } => departure.expected_departure(),
            Leg::Individual { departure_time, .. } => Some(*departure_time),
        }
    }

    /// Best known arrival time of this leg.
    pub fn arrival_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Leg::Public { arrival, .. } => arrival.expected_arrival(),
            Leg::Individual { arrival_time, .. } => Some(*arrival_time),
        }
    }

    /// Location this leg departs from.
    pub fn departure_location(&self) -> &Location {
        match self {
            Leg::Public { departure, .. } => &departure.location,
            Leg::Individual { departure_location, .. } => departure_location,
        }
    }

    /// Location this leg arrives at.
    pub fn arrival_location(&self) -> &Location {
        match self {
            Leg::Public { arrival, .. } => &arrival.location,
            Leg::Individual { arrival_location, .. } => arrival_location,
        }
    }

    /// True for unscheduled (walk/transfer/bike/car) legs.
    pub fn is_individual(&self) -> bool {
        matches!(self, Leg::Individual { .. })
    }
}
