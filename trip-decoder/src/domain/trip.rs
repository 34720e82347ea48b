//! Trip type.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{Leg, Location};

/// A ticket price attached to a trip.
///
/// The binary responses decoded here never carry fares, but sibling
/// response formats of the same backends do, so the field stays typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fare {
    /// Fare product name ("single", "day ticket").
    pub name: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Price in minor currency units (cents).
    pub amount_minor: i64,
}

/// Remaining seat capacity, when the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// First-class seats.
    pub first: u32,
    /// Second-class seats.
    pub second: u32,
}

/// A complete itinerary from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Backend-stable trip id, when the backend assigned one.
    pub id: Option<String>,
    /// Where the trip starts.
    pub origin: Location,
    /// Where the trip ends.
    pub destination: Location,
    /// Ordered legs; never empty.
    pub legs: Vec<Leg>,
    /// Ticket prices (empty when not reported).
    pub fares: Vec<Fare>,
    /// Seat capacity (absent when not reported).
    pub capacity: Option<Capacity>,
    /// Number of changes between services, as declared by the backend.
    pub num_changes: u16,
}

impl Trip {
    /// Best known departure time (first leg).
    pub fn departure_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.legs.first()?.departure_time()
    }

    /// Best known arrival time (last leg).
    pub fn arrival_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.legs.last()?.arrival_time()
    }

    /// Total duration, when both end times are known.
    pub fn duration(&self) -> Option<Duration> {
        Some(self.arrival_time()? - self.departure_time()?)
    }

    /// Number of public (scheduled service) legs.
    pub fn num_public_legs(&self) -> usize {
        self.legs.iter().filter(|l| !l.is_individual()).count()
    }
}
