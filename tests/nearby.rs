use approx::assert_relative_eq;

use gtfs_nearby::{
    error::{DanglingReference, MissingReference},
    gtfs::{StopRow, StopTimeRow, Timetable, TripRow},
    Feed, FeedError, NearbyOptions, Point, QueryError, RowError,
};

fn stop(id: &str, lat: &str, lon: &str) -> StopRow {
    StopRow {
        stop_id: id.to_owned(),
        stop_lat: lat.to_owned(),
        stop_lon: lon.to_owned(),
        ..Default::default()
    }
}

fn trip(id: &str, headsign: &str) -> TripRow {
    TripRow {
        trip_id: id.to_owned(),
        route_id: "R1".to_owned(),
        service_id: "WK".to_owned(),
        trip_headsign: headsign.to_owned(),
        ..Default::default()
    }
}

fn stop_time(trip_id: &str, stop_id: &str, sequence: &str) -> StopTimeRow {
    StopTimeRow {
        trip_id: trip_id.to_owned(),
        stop_id: stop_id.to_owned(),
        stop_sequence: sequence.to_owned(),
        ..Default::default()
    }
}

fn two_stop_timetable() -> Timetable {
    Timetable {
        stops: vec![stop("S1", "0", "0"), stop("S2", "0", "1")],
        trips: vec![trip("T1", "Downtown")],
        stop_times: vec![stop_time("T1", "S1", "0")],
    }
}

#[test]
fn nearest_stops_with_routes_serviced() {
    let feed = Feed::try_from(two_stop_timetable()).unwrap();

    let nearby = feed
        .find_nearby(Point::new(0.0, 0.0), &NearbyOptions::default())
        .unwrap();

    assert_eq!(nearby.len(), 2);

    assert_eq!(nearby[0].stop.id, "S1");
    assert_relative_eq!(nearby[0].distance_km, 0.0, epsilon = 1e-9);
    assert_eq!(nearby[0].routes_serviced, ["Downtown"]);

    assert_eq!(nearby[1].stop.id, "S2");
    assert_relative_eq!(nearby[1].distance_km, 111.19, epsilon = 0.01);
    assert!(nearby[1].routes_serviced.is_empty());
}

#[test]
fn dangling_stop_reference_fails_the_build() {
    let mut timetable = two_stop_timetable();
    timetable.stop_times.push(stop_time("T1", "S404", "1"));

    let violations = match Feed::try_from(timetable) {
        Err(FeedError::ReferentialIntegrity { violations }) => violations,
        other => panic!("expected a referential integrity error, got {other:?}"),
    };
    assert_eq!(
        violations,
        vec![DanglingReference {
            trip_id: "T1".to_owned(),
            stop_sequence: 1,
            missing: vec![MissingReference::Stop("S404".to_owned())],
        }]
    );
}

#[test]
fn zero_max_results_is_rejected() {
    let feed = Feed::try_from(two_stop_timetable()).unwrap();

    let result = feed.find_nearby(
        Point::new(0.0, 0.0),
        &NearbyOptions {
            max_results: Some(0),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(QueryError::InvalidConfiguration(_))));
}

#[test]
fn duplicate_stop_fails_the_load() {
    let mut timetable = two_stop_timetable();
    timetable.stops.push(stop("S1", "1", "1"));

    let err = Feed::try_from(timetable).unwrap_err();

    assert!(matches!(
        err,
        FeedError::Load { table: "stops", ref errors }
            if matches!(errors[..], [RowError::DuplicateKey { row: 3, .. }])
    ));
}

#[test]
fn empty_required_field_fails_the_load() {
    let mut timetable = two_stop_timetable();
    timetable.trips.push(TripRow {
        route_id: String::new(),
        ..trip("T2", "Airport")
    });

    let err = Feed::try_from(timetable).unwrap_err();

    assert!(matches!(
        err,
        FeedError::Load { table: "trips", ref errors }
            if matches!(errors[..], [RowError::MalformedRow { field: "route_id", .. }])
    ));
}

#[test]
fn bus_stop_serializes_flat() {
    let feed = Feed::try_from(two_stop_timetable()).unwrap();
    let nearby = feed
        .find_nearby(
            Point::new(0.0, 0.0),
            &NearbyOptions {
                max_results: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

    let json = serde_json::to_value(&nearby).unwrap();

    assert_eq!(json[0]["stop_id"], "S1");
    assert_eq!(json[0]["routes_serviced"][0], "Downtown");
    assert_eq!(json[0]["location"]["lat"], 0.0);
}
