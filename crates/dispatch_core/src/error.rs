use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::{DriverId, RideId};

/// Failure of a whole match call. There is no partial result.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid ride request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("driver snapshot unavailable: {0}")]
    Collaborator(#[from] SourceError),
}

/// Malformed ride request, rejected before any driver is evaluated.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("organization id is required")]
    MissingOrganization,

    #[error("ride must have at least one rider")]
    NoRiders,

    #[error("ride has {riders} riders, at most {max} fit one request")]
    TooManyRiders { riders: u32, max: u32 },

    #[error("time window ends ({end}) before it starts ({start})")]
    InvertedWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{which} location: {source}")]
    Location {
        which: &'static str,
        #[source]
        source: AreaError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AreaError {
    #[error("postal code `{code}` has fewer than {required} usable characters")]
    PostalTooShort { code: String, required: usize },

    #[error("{0:#x} is not a valid H3 cell index")]
    InvalidCell(u64),
}

/// A single candidate's data cannot be evaluated. The candidate is excluded; the batch
/// carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IncompleteData {
    #[error("malformed directory record: {0}")]
    Malformed(String),

    #[error("no vehicle list")]
    MissingVehicles,

    #[error("home location: {0}")]
    HomeLocation(AreaError),

    #[error("last drove at {last_drove}, after evaluation time {now}")]
    RotationFromFuture {
        last_drove: NaiveDateTime,
        now: NaiveDateTime,
    },
}

/// Errors from the directory / unavailability / ride-history collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("rotation for driver {driver} changed (expected version {expected}, found {actual})")]
    VersionConflict {
        driver: DriverId,
        expected: u64,
        actual: u64,
    },

    #[error("ride {ride} already recorded for driver {driver}")]
    DuplicateRide { driver: DriverId, ride: RideId },
}

#[derive(Debug, Error)]
#[error("audit sink rejected exclusion of driver {driver} on ride {ride}: {message}")]
pub struct AuditError {
    pub ride: RideId,
    pub driver: DriverId,
    pub message: String,
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
