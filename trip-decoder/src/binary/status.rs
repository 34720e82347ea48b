//! Backend error-code mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{DecodeError, FormatError};

/// A recognized backend rejection, mapped from the numeric code in the
/// extension header.
///
/// Several distinct backend codes intentionally collapse into one status
/// here (the backends distinguish rejection reasons the application
/// cannot act on differently).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendStatus {
    /// The origin or destination input matched more than one place.
    Ambiguous,
    /// Origin and destination are too close together to route.
    TooClose,
    /// No trips exist for this query.
    NoTrips,
    /// The requested date is outside the timetable period.
    InvalidDate,
    /// The backend is unavailable or failed internally.
    ServiceDown,
    /// A nearby station for the given address could not be resolved.
    UnresolvableAddress,
    /// The origin is unknown to the backend.
    UnknownFrom,
    /// The via point is unknown to the backend.
    UnknownVia,
    /// The destination is unknown to the backend.
    UnknownTo,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BackendStatus::Ambiguous => "ambiguous location input",
            BackendStatus::TooClose => "origin and destination too close",
            BackendStatus::NoTrips => "no trips found",
            BackendStatus::InvalidDate => "date outside timetable period",
            BackendStatus::ServiceDown => "backend service unavailable",
            BackendStatus::UnresolvableAddress => "address could not be resolved",
            BackendStatus::UnknownFrom => "unknown origin",
            BackendStatus::UnknownVia => "unknown via point",
            BackendStatus::UnknownTo => "unknown destination",
        };
        f.write_str(msg)
    }
}

/// Map a non-zero extension-header error code to its outcome.
///
/// Code 0 means success and must not reach this function. Codes absent
/// from the table signal a protocol revision this decoder does not know
/// and are fatal.
pub(crate) fn error_for_code(code: u16) -> DecodeError {
    match code {
        1 | 2 => DecodeError::SessionExpired,
        8 => DecodeError::Backend(BackendStatus::Ambiguous),
        13 | 19 | 9240 => DecodeError::Backend(BackendStatus::ServiceDown),
        887 | 890 | 891 | 899 | 900 => DecodeError::Backend(BackendStatus::NoTrips),
        892 | 9380 => DecodeError::Backend(BackendStatus::TooClose),
        9220 => DecodeError::Backend(BackendStatus::UnresolvableAddress),
        9260 => DecodeError::Backend(BackendStatus::UnknownFrom),
        9280 => DecodeError::Backend(BackendStatus::UnknownVia),
        9300 => DecodeError::Backend(BackendStatus::UnknownTo),
        9320 | 9360 => DecodeError::Backend(BackendStatus::InvalidDate),
        _ => DecodeError::Format(FormatError::UnknownErrorCode(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_CODES: &[(u16, Option<BackendStatus>)] = &[
        (1, None),
        (2, None),
        (8, Some(BackendStatus::Ambiguous)),
        (13, Some(BackendStatus::ServiceDown)),
        (19, Some(BackendStatus::ServiceDown)),
        (9240, Some(BackendStatus::ServiceDown)),
        (887, Some(BackendStatus::NoTrips)),
        (890, Some(BackendStatus::NoTrips)),
        (891, Some(BackendStatus::NoTrips)),
        (899, Some(BackendStatus::NoTrips)),
        (900, Some(BackendStatus::NoTrips)),
        (892, Some(BackendStatus::TooClose)),
        (9380, Some(BackendStatus::TooClose)),
        (9220, Some(BackendStatus::UnresolvableAddress)),
        (9260, Some(BackendStatus::UnknownFrom)),
        (9280, Some(BackendStatus::UnknownVia)),
        (9300, Some(BackendStatus::UnknownTo)),
        (9320, Some(BackendStatus::InvalidDate)),
        (9360, Some(BackendStatus::InvalidDate)),
    ];

    #[test]
    fn every_known_code_maps_to_exactly_one_outcome() {
        for &(code, expected) in KNOWN_CODES {
            match (error_for_code(code), expected) {
                (DecodeError::SessionExpired, None) => {}
                (DecodeError::Backend(status), Some(want)) => assert_eq!(status, want, "code {code}"),
                (other, _) => panic!("code {code} mapped to {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_codes_are_fatal() {
        for code in [3, 100, 886, 9999, u16::MAX] {
            assert_eq!(
                error_for_code(code),
                DecodeError::Format(FormatError::UnknownErrorCode(code)),
            );
        }
    }

    #[test]
    fn status_display() {
        assert_eq!(BackendStatus::NoTrips.to_string(), "no trips found");
        assert_eq!(BackendStatus::UnknownVia.to_string(), "unknown via point");
    }
}
