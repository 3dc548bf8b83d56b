use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use log::{info, warn};

use crate::{
    data::{Stop, StopTime, Trip, ID},
    error::{DanglingReference, FeedError, MissingReference},
    table::Table,
};

/// Cross-table lookups derived once from the loaded tables.
#[derive(Debug, Default)]
pub struct FeedIndex {
    stop_trips: HashMap<ID, HashSet<ID>>,
    trip_headsigns: HashMap<ID, String>,
    stop_headsigns: HashMap<ID, BTreeSet<String>>,
    trip_stops: HashMap<ID, Vec<ID>>,
    route_headsigns: HashMap<ID, BTreeSet<String>>,
}

impl FeedIndex {
    /// Fails if any StopTime references a stop or trip that does not exist,
    /// listing every such StopTime.
    pub fn build(
        stops: &Table<Stop>,
        trips: &Table<Trip>,
        stop_times: &Table<StopTime>,
    ) -> Result<Self, FeedError> {
        let mut violations = Vec::new();
        let mut stop_trips: HashMap<ID, HashSet<ID>> = HashMap::new();
        let mut trip_sequences: HashMap<ID, Vec<(u32, ID)>> = HashMap::new();

        for stop_time in stop_times.iter() {
            let mut missing = Vec::new();
            if !stops.contains_key(stop_time.stop_id.as_str()) {
                missing.push(MissingReference::Stop(stop_time.stop_id.clone()));
            }
            if !trips.contains_key(stop_time.trip_id.as_str()) {
                missing.push(MissingReference::Trip(stop_time.trip_id.clone()));
            }

            if !missing.is_empty() {
                violations.push(DanglingReference {
                    trip_id: stop_time.trip_id.clone(),
                    stop_sequence: stop_time.stop_sequence,
                    missing,
                });
                continue;
            }

            stop_trips
                .entry(stop_time.stop_id.clone())
                .or_default()
                .insert(stop_time.trip_id.clone());
            trip_sequences
                .entry(stop_time.trip_id.clone())
                .or_default()
                .push((stop_time.stop_sequence, stop_time.stop_id.clone()));
        }

        if !violations.is_empty() {
            violations.sort_by(|a, b| {
                (&a.trip_id, a.stop_sequence).cmp(&(&b.trip_id, b.stop_sequence))
            });
            warn!("{} stop_times with dangling references", violations.len());
            return Err(FeedError::ReferentialIntegrity { violations });
        }

        let trip_headsigns: HashMap<ID, String> = trips
            .iter()
            .filter_map(|trip| Some((trip.id.clone(), trip.headsign.clone()?)))
            .collect();

        let stop_headsigns = stop_trips
            .iter()
            .map(|(stop_id, trip_ids)| {
                let headsigns = trip_ids
                    .iter()
                    .filter_map(|trip_id| trip_headsigns.get(trip_id).cloned())
                    .collect::<BTreeSet<_>>();
                (stop_id.clone(), headsigns)
            })
            .collect();

        let trip_stops = trip_sequences
            .into_iter()
            .map(|(trip_id, sequence)| {
                let stop_ids = sequence
                    .into_iter()
                    .sorted_by_key(|(stop_sequence, _)| *stop_sequence)
                    .map(|(_, stop_id)| stop_id)
                    .collect();
                (trip_id, stop_ids)
            })
            .collect();

        let route_headsigns = trips
            .iter()
            .filter_map(|trip| Some((trip.route_id.clone(), trip.headsign.clone()?)))
            .into_grouping_map()
            .collect::<BTreeSet<_>>();

        info!(
            "Indexed {} stop_times across {} stops and {} trips",
            stop_times.len(),
            stop_trips.len(),
            trips.len()
        );

        Ok(Self {
            stop_trips,
            trip_headsigns,
            stop_headsigns,
            trip_stops,
            route_headsigns,
        })
    }

    pub fn trip_ids_for_stop(&self, stop_id: &str) -> Option<&HashSet<ID>> {
        self.stop_trips.get(stop_id)
    }

    pub fn headsign_for_trip(&self, trip_id: &str) -> Option<&str> {
        self.trip_headsigns.get(trip_id).map(String::as_str)
    }

    /// Distinct headsigns of all trips calling at `stop_id`, in order.
    pub fn headsigns_for_stop(&self, stop_id: &str) -> Option<&BTreeSet<String>> {
        self.stop_headsigns.get(stop_id)
    }

    /// Stops of a trip ordered by `stop_sequence`.
    pub fn stops_for_trip(&self, trip_id: &str) -> Option<&[ID]> {
        self.trip_stops.get(trip_id).map(Vec::as_slice)
    }

    pub fn headsigns_for_route(&self, route_id: &str) -> Option<&BTreeSet<String>> {
        self.route_headsigns.get(route_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::{StopRow, StopTimeRow, TripRow};

    fn stops(ids: &[&str]) -> Table<Stop> {
        Table::load(ids.iter().map(|id| StopRow {
            stop_id: id.to_string(),
            stop_lat: "0".to_owned(),
            stop_lon: "0".to_owned(),
            ..Default::default()
        }))
        .unwrap()
    }

    fn trips(trips: &[(&str, &str, &str)]) -> Table<Trip> {
        Table::load(trips.iter().map(|(id, route, headsign)| TripRow {
            trip_id: id.to_string(),
            route_id: route.to_string(),
            service_id: "WK".to_owned(),
            trip_headsign: headsign.to_string(),
            ..Default::default()
        }))
        .unwrap()
    }

    fn stop_times(stop_times: &[(&str, &str, u32)]) -> Table<StopTime> {
        Table::load(stop_times.iter().map(|(trip, stop, sequence)| StopTimeRow {
            trip_id: trip.to_string(),
            stop_id: stop.to_string(),
            stop_sequence: sequence.to_string(),
            ..Default::default()
        }))
        .unwrap()
    }

    #[test]
    fn joins_stops_to_headsigns() {
        let index = FeedIndex::build(
            &stops(&["S1", "S2", "S3"]),
            &trips(&[
                ("T1", "R1", "Downtown"),
                ("T2", "R1", "Airport"),
                ("T3", "R2", "Downtown"),
            ]),
            &stop_times(&[
                ("T1", "S1", 0),
                ("T1", "S2", 1),
                ("T2", "S1", 0),
                ("T3", "S1", 5),
            ]),
        )
        .unwrap();

        assert_eq!(
            index.trip_ids_for_stop("S1"),
            Some(&HashSet::from(["T1".to_owned(), "T2".to_owned(), "T3".to_owned()]))
        );
        assert_eq!(index.headsign_for_trip("T2"), Some("Airport"));
        assert_eq!(
            index.headsigns_for_stop("S1").unwrap().iter().collect_vec(),
            ["Airport", "Downtown"]
        );
        assert_eq!(
            index.headsigns_for_stop("S2").unwrap().iter().collect_vec(),
            ["Downtown"]
        );
        assert_eq!(index.headsigns_for_stop("S3"), None);
        assert_eq!(
            index.headsigns_for_route("R1").unwrap().iter().collect_vec(),
            ["Airport", "Downtown"]
        );
    }

    #[test]
    fn trip_stops_follow_sequence_order() {
        let index = FeedIndex::build(
            &stops(&["A", "B", "C"]),
            &trips(&[("T1", "R1", "")]),
            &stop_times(&[("T1", "C", 30), ("T1", "A", 2), ("T1", "B", 10)]),
        )
        .unwrap();

        assert_eq!(
            index.stops_for_trip("T1").unwrap(),
            ["A".to_owned(), "B".to_owned(), "C".to_owned()]
        );
        assert_eq!(index.headsign_for_trip("T1"), None);
        assert!(index.headsigns_for_stop("A").unwrap().is_empty());
    }

    #[test]
    fn reports_every_dangling_reference() {
        let result = FeedIndex::build(
            &stops(&["S1"]),
            &trips(&[("T1", "R1", "Downtown")]),
            &stop_times(&[
                ("T1", "S1", 0),
                ("T1", "S404", 1),
                ("T9", "S404", 0),
            ]),
        );

        let Err(FeedError::ReferentialIntegrity { violations }) = result else {
            panic!("expected a referential integrity error");
        };
        assert_eq!(
            violations,
            vec![
                DanglingReference {
                    trip_id: "T1".to_owned(),
                    stop_sequence: 1,
                    missing: vec![MissingReference::Stop("S404".to_owned())],
                },
                DanglingReference {
                    trip_id: "T9".to_owned(),
                    stop_sequence: 0,
                    missing: vec![
                        MissingReference::Stop("S404".to_owned()),
                        MissingReference::Trip("T9".to_owned()),
                    ],
                },
            ]
        );
    }
}
