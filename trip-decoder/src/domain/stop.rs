//! Stop type.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Location;

/// A call at a location, with independent arrival and departure sides.
///
/// The backend reports planned (timetable) and predicted (realtime) times
/// and platforms separately for each side, and can cancel the arrival and
/// the departure independently (a train may terminate early at a stop, or
/// start late from it).
///
/// # Time semantics
///
/// - For a leg's departure endpoint only the departure side is populated.
/// - For a leg's arrival endpoint only the arrival side is populated.
/// - Intermediate stops may populate both sides.
/// - Predicted values override planned values when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    /// Where this call happens.
    pub location: Location,
    /// Timetabled arrival time.
    pub planned_arrival: Option<DateTime<FixedOffset>>,
    /// Realtime arrival estimate.
    pub predicted_arrival: Option<DateTime<FixedOffset>>,
    /// Timetabled arrival platform.
    pub planned_arrival_platform: Option<String>,
    /// Realtime arrival platform.
    pub predicted_arrival_platform: Option<String>,
    /// Arrival at this stop is cancelled.
    pub arrival_cancelled: bool,
    /// Timetabled departure time.
    pub planned_departure: Option<DateTime<FixedOffset>>,
    /// Realtime departure estimate.
    pub predicted_departure: Option<DateTime<FixedOffset>>,
    /// Timetabled departure platform.
    pub planned_departure_platform: Option<String>,
    /// Realtime departure platform.
    pub predicted_departure_platform: Option<String>,
    /// Departure from this stop is cancelled.
    pub departure_cancelled: bool,
}

impl Stop {
    /// Create a stop at a location with no times, platforms, or flags.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            planned_arrival: None,
            predicted_arrival: None,
            planned_arrival_platform: None,
            predicted_arrival_platform: None,
            arrival_cancelled: false,
            planned_departure: None,
            predicted_departure: None,
            planned_departure_platform: None,
            predicted_departure_platform: None,
            departure_cancelled: false,
        }
    }

    /// Best known arrival time (predicted over planned).
    pub fn expected_arrival(&self) -> Option<DateTime<FixedOffset>> {
        self.predicted_arrival.or(self.planned_arrival)
    }

    /// Best known departure time (predicted over planned).
    pub fn expected_departure(&self) -> Option<DateTime<FixedOffset>> {
        self.predicted_departure.or(self.planned_departure)
    }

    /// Best known arrival platform (predicted over planned).
    pub fn expected_arrival_platform(&self) -> Option<&str> {
        self.predicted_arrival_platform
            .as_deref()
            .or(self.planned_arrival_platform.as_deref())
    }

    /// Best known departure platform (predicted over planned).
    pub fn expected_departure_platform(&self) -> Option<&str> {
        self.predicted_departure_platform
            .as_deref()
            .or(self.planned_departure_platform.as_deref())
    }

    /// Arrival delay, when both planned and predicted times exist.
    pub fn arrival_delay(&self) -> Option<chrono::Duration> {
        Some(self.predicted_arrival? - self.planned_arrival?)
    }

    /// Departure delay, when both planned and predicted times exist.
    pub fn departure_delay(&self) -> Option<chrono::Duration> {
        Some(self.predicted_departure? - self.planned_departure?)
    }
}
