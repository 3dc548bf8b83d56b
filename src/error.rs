use std::fmt;

use itertools::Itertools;
use thiserror::Error;

/// A single problem found while loading one table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("{table} row {row}: field {field:?} {reason}")]
    MalformedRow {
        table: &'static str,
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("{table} row {row}: duplicate key {key} (first seen at row {first_row})")]
    DuplicateKey {
        table: &'static str,
        key: String,
        first_row: usize,
        row: usize,
    },

    #[error("Stop {stop_id:?} references unknown parent station {parent_station:?}")]
    UnknownParentStation {
        stop_id: String,
        parent_station: String,
    },

    #[error("Stop {stop_id:?} has parent {parent_station:?} which is not a station")]
    ParentNotStation {
        stop_id: String,
        parent_station: String,
    },

    #[error("Stop {stop_id:?} is part of a parent_station cycle")]
    ParentStationCycle { stop_id: String },

    #[error("Trip {trip_id:?} departs sequence {stop_sequence} after arriving at sequence {next_stop_sequence}")]
    ScheduleRegression {
        trip_id: String,
        stop_sequence: u32,
        next_stop_sequence: u32,
    },
}

/// Which foreign key of a StopTime failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReference {
    Stop(String),
    Trip(String),
}

impl fmt::Display for MissingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReference::Stop(id) => write!(f, "stop_id {id:?}"),
            MissingReference::Trip(id) => write!(f, "trip_id {id:?}"),
        }
    }
}

/// A StopTime with at least one dangling foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub trip_id: String,
    pub stop_sequence: u32,
    pub missing: Vec<MissingReference>,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StopTime ({:?}, {}) has unresolved {}",
            self.trip_id,
            self.stop_sequence,
            self.missing.iter().join(" and ")
        )
    }
}

#[derive(Error, Debug, Clone)]
pub enum FeedError {
    #[error("Failed to load {table}: {}", errors.iter().join("; "))]
    Load {
        table: &'static str,
        errors: Vec<RowError>,
    },

    #[error("Referential integrity violated: {}", violations.iter().join("; "))]
    ReferentialIntegrity { violations: Vec<DanglingReference> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Coordinate ({lat}, {lon}) is out of range")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Why one field of a row could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
