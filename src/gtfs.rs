use serde::Deserialize;

/// A row of `stops.txt`, untyped. Missing columns read as empty strings.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StopRow {
    pub stop_id: String,
    pub stop_code: String,
    pub stop_name: String,
    pub stop_desc: String,
    pub stop_lat: String,
    pub stop_lon: String,
    pub zone_id: String,
    pub stop_url: String,
    pub location_type: String,
    pub parent_station: String,
    pub wheelchair_boarding: String,
}

/// A row of `trips.txt`, untyped.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct TripRow {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: String,
    pub trip_short_name: String,
    pub direction_id: String,
    pub block_id: String,
    pub shape_id: String,
    pub wheelchair_accessible: String,
    pub bikes_allowed: String,
}

/// A row of `stop_times.txt`, untyped.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: String,
    pub stop_headsign: String,
    pub pickup_type: String,
    pub drop_off_type: String,
    pub shape_dist_traveled: String,
    pub timepoint: String,
}

#[derive(Debug, Default)]
pub struct Timetable {
    pub stops: Vec<StopRow>,
    pub trips: Vec<TripRow>,
    pub stop_times: Vec<StopTimeRow>,
}
