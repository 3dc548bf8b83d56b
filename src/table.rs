use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
    sync::Arc,
};

use itertools::Itertools;
use log::{info, warn};

use crate::{
    data::{LocationType, Stop, StopTime, Time, Trip, ID},
    error::{FeedError, FieldError, RowError},
    gtfs::{StopRow, StopTimeRow, TripRow},
};

pub trait Record: Sized {
    const TABLE: &'static str;

    type Row;
    type Key: Eq + Hash + Clone + Debug;

    fn from_row(row: Self::Row) -> Result<Self, FieldError>;

    fn key(&self) -> Self::Key;

    /// Checks spanning several records, run once every row has parsed.
    fn validate(_table: &Table<Self>) -> Vec<RowError> {
        Vec::new()
    }
}

#[derive(Debug)]
pub struct Table<R: Record> {
    records: HashMap<R::Key, Arc<R>>,
}

impl<R: Record> Table<R> {
    /// Rows are numbered from 1 in error reports.
    pub fn load<I>(rows: I) -> Result<Self, FeedError>
    where
        I: IntoIterator<Item = R::Row>,
    {
        let mut records = HashMap::new();
        let mut first_rows: HashMap<R::Key, usize> = HashMap::new();
        let mut errors = Vec::new();

        for (row_number, row) in (1..).zip(rows) {
            let record = match R::from_row(row) {
                Ok(record) => record,
                Err(FieldError { field, reason }) => {
                    errors.push(RowError::MalformedRow {
                        table: R::TABLE,
                        row: row_number,
                        field,
                        reason,
                    });
                    continue;
                }
            };

            let key = record.key();
            match first_rows.entry(key.clone()) {
                Entry::Occupied(first) => errors.push(RowError::DuplicateKey {
                    table: R::TABLE,
                    key: format!("{:?}", first.key()),
                    first_row: *first.get(),
                    row: row_number,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(row_number);
                    records.insert(key, Arc::new(record));
                }
            }
        }

        let table = Self { records };
        errors.extend(R::validate(&table));

        if errors.is_empty() {
            info!("Loaded {} {}", table.len(), R::TABLE);
            Ok(table)
        } else {
            warn!("Rejected {}: {} problem(s)", R::TABLE, errors.len());
            Err(FeedError::Load {
                table: R::TABLE,
                errors,
            })
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Arc<R>>
    where
        R::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        R::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<R>> {
        self.records.values()
    }

    pub fn records(&self) -> &HashMap<R::Key, Arc<R>> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Record for Stop {
    const TABLE: &'static str = "stops";

    type Row = StopRow;
    type Key = ID;

    fn from_row(row: StopRow) -> Result<Self, FieldError> {
        Stop::try_from(row)
    }

    fn key(&self) -> ID {
        self.id.clone()
    }

    fn validate(table: &Table<Self>) -> Vec<RowError> {
        let mut errors = Vec::new();

        for stop in table.iter().sorted_by(|a, b| a.id.cmp(&b.id)) {
            let Some(parent_id) = &stop.parent_station else {
                continue;
            };

            match table.get(parent_id.as_str()) {
                None => errors.push(RowError::UnknownParentStation {
                    stop_id: stop.id.clone(),
                    parent_station: parent_id.clone(),
                }),
                Some(parent) if parent.location_type != LocationType::Station => {
                    errors.push(RowError::ParentNotStation {
                        stop_id: stop.id.clone(),
                        parent_station: parent_id.clone(),
                    })
                }
                Some(_) => {}
            }

            if in_parent_cycle(table, stop) {
                errors.push(RowError::ParentStationCycle {
                    stop_id: stop.id.clone(),
                });
            }
        }

        errors
    }
}

/// Walks the parent chain from `stop`, returning whether it leads back to it.
fn in_parent_cycle(table: &Table<Stop>, stop: &Stop) -> bool {
    let mut visited: HashSet<&str> = HashSet::from([stop.id.as_str()]);
    let mut current = stop.parent_station.as_deref();

    while let Some(id) = current {
        if id == stop.id {
            return true;
        }
        if !visited.insert(id) {
            // a cycle further up that does not include `stop`
            return false;
        }
        current = table
            .get(id)
            .and_then(|parent| parent.parent_station.as_deref());
    }

    false
}

impl Record for Trip {
    const TABLE: &'static str = "trips";

    type Row = TripRow;
    type Key = ID;

    fn from_row(row: TripRow) -> Result<Self, FieldError> {
        Trip::try_from(row)
    }

    fn key(&self) -> ID {
        self.id.clone()
    }
}

impl Record for StopTime {
    const TABLE: &'static str = "stop_times";

    type Row = StopTimeRow;
    type Key = (ID, u32);

    fn from_row(row: StopTimeRow) -> Result<Self, FieldError> {
        StopTime::try_from(row)
    }

    fn key(&self) -> (ID, u32) {
        (self.trip_id.clone(), self.stop_sequence)
    }

    fn validate(table: &Table<Self>) -> Vec<RowError> {
        table
            .iter()
            .map(|stop_time| (stop_time.trip_id.as_str(), stop_time))
            .into_group_map()
            .into_iter()
            .sorted_by_key(|(trip_id, _)| *trip_id)
            .flat_map(|(trip_id, stop_times)| schedule_regressions(trip_id, stop_times))
            .collect()
    }
}

/// Untimed stops are skipped: each timed arrival is compared against the
/// latest timed departure before it.
fn schedule_regressions(trip_id: &str, stop_times: Vec<&Arc<StopTime>>) -> Vec<RowError> {
    let mut errors = Vec::new();
    let mut last_departure: Option<(u32, Time)> = None;

    for stop_time in stop_times
        .into_iter()
        .sorted_by_key(|stop_time| stop_time.stop_sequence)
    {
        if let (Some((sequence, departure)), Some(arrival)) =
            (last_departure, stop_time.arrival_time)
        {
            if departure > arrival {
                errors.push(RowError::ScheduleRegression {
                    trip_id: trip_id.to_owned(),
                    stop_sequence: sequence,
                    next_stop_sequence: stop_time.stop_sequence,
                });
            }
        }

        if let Some(time) = stop_time.departure_time.or(stop_time.arrival_time) {
            last_departure = Some((stop_time.stop_sequence, time));
        }
    }

    errors
}
