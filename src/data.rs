use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::{
    error::FieldError,
    geo::Point,
    gtfs::{StopRow, StopTimeRow, TripRow},
};

pub type ID = String;

/// Seconds since the start of the service day. May exceed 24h for trips
/// running past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u32);

impl FromStr for Time {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("{s:?} is not a valid time; H:MM:SS is expected");

        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if h.is_empty()
            || m.len() != 2
            || sec.len() != 2
            || !s.bytes().all(|b| b.is_ascii_digit() || b == b':')
        {
            return Err(invalid());
        }

        let hours: u32 = h.parse().map_err(|_| invalid())?;
        let minutes: u32 = m.parse().map_err(|_| invalid())?;
        let seconds: u32 = sec.parse().map_err(|_| invalid())?;

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(Time)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            self.0 % 3600 / 60,
            self.0 % 60
        )
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LocationType {
    #[default]
    Stop,
    Station,
    Entrance,
    GenericNode,
    BoardingArea,
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "0" => Ok(LocationType::Stop),
            "1" => Ok(LocationType::Station),
            "2" => Ok(LocationType::Entrance),
            "3" => Ok(LocationType::GenericNode),
            "4" => Ok(LocationType::BoardingArea),
            other => Err(format!("{other:?} is not a location type (0-4)")),
        }
    }
}

/// Shared encoding of `wheelchair_boarding`, `wheelchair_accessible` and
/// `bikes_allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Availability {
    #[default]
    Unknown,
    Available,
    NotAvailable,
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "0" => Ok(Availability::Unknown),
            "1" => Ok(Availability::Available),
            "2" => Ok(Availability::NotAvailable),
            other => Err(format!("{other:?} is not an availability (0-2)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DirectionId {
    Outbound,
    Inbound,
}

impl FromStr for DirectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(DirectionId::Outbound),
            "1" => Ok(DirectionId::Inbound),
            other => Err(format!("{other:?} is not a direction (0 or 1)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PickupDropOffType {
    #[default]
    Regular,
    NotAvailable,
    PhoneAgency,
    CoordinateWithDriver,
}

impl FromStr for PickupDropOffType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "0" => Ok(PickupDropOffType::Regular),
            "1" => Ok(PickupDropOffType::NotAvailable),
            "2" => Ok(PickupDropOffType::PhoneAgency),
            "3" => Ok(PickupDropOffType::CoordinateWithDriver),
            other => Err(format!("{other:?} is not a pickup/drop-off type (0-3)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Timepoint {
    Approximate,
    #[default]
    Exact,
}

impl FromStr for Timepoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Timepoint::Approximate),
            "" | "1" => Ok(Timepoint::Exact),
            other => Err(format!("{other:?} is not a timepoint (0 or 1)")),
        }
    }
}

fn required(field: &'static str, value: String) -> Result<String, FieldError> {
    if value.is_empty() {
        Err(FieldError::new(field, "is required"))
    } else {
        Ok(value)
    }
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn parse<T>(field: &'static str, value: &str) -> Result<T, FieldError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|err| FieldError::new(field, format!("could not be parsed: {err}")))
}

fn parse_optional<T>(field: &'static str, value: &str) -> Result<Option<T>, FieldError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if value.is_empty() {
        Ok(None)
    } else {
        parse(field, value).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    #[serde(rename = "stop_id")]
    pub id: ID,
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Point,
    pub zone_id: Option<String>,
    pub url: Option<String>,
    pub location_type: LocationType,
    pub parent_station: Option<ID>,
    pub wheelchair_boarding: Availability,
}

impl TryFrom<StopRow> for Stop {
    type Error = FieldError;

    fn try_from(row: StopRow) -> Result<Self, Self::Error> {
        let id = required("stop_id", row.stop_id)?;
        let lat: f64 = parse("stop_lat", &required("stop_lat", row.stop_lat)?)?;
        let lon: f64 = parse("stop_lon", &required("stop_lon", row.stop_lon)?)?;

        let location = Point::new(lat, lon);
        if !location.is_valid() {
            return Err(FieldError::new(
                "stop_lat/stop_lon",
                format!("({lat}, {lon}) is out of range"),
            ));
        }

        Ok(Self {
            id,
            code: optional(row.stop_code),
            name: optional(row.stop_name),
            description: optional(row.stop_desc),
            location,
            zone_id: optional(row.zone_id),
            url: optional(row.stop_url),
            location_type: parse("location_type", &row.location_type)?,
            parent_station: optional(row.parent_station),
            wheelchair_boarding: parse("wheelchair_boarding", &row.wheelchair_boarding)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    #[serde(rename = "trip_id")]
    pub id: ID,
    pub route_id: ID,
    pub service_id: ID,
    pub headsign: Option<String>,
    pub short_name: Option<String>,
    pub direction_id: Option<DirectionId>,
    pub block_id: Option<ID>,
    pub shape_id: Option<ID>,
    pub wheelchair_accessible: Availability,
    pub bikes_allowed: Availability,
}

impl TryFrom<TripRow> for Trip {
    type Error = FieldError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required("trip_id", row.trip_id)?,
            route_id: required("route_id", row.route_id)?,
            service_id: required("service_id", row.service_id)?,
            headsign: optional(row.trip_headsign),
            short_name: optional(row.trip_short_name),
            direction_id: parse_optional("direction_id", &row.direction_id)?,
            block_id: optional(row.block_id),
            shape_id: optional(row.shape_id),
            wheelchair_accessible: parse("wheelchair_accessible", &row.wheelchair_accessible)?,
            bikes_allowed: parse("bikes_allowed", &row.bikes_allowed)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTime {
    pub trip_id: ID,
    pub stop_id: ID,
    pub stop_sequence: u32,
    pub arrival_time: Option<Time>,
    pub departure_time: Option<Time>,
    pub stop_headsign: Option<String>,
    pub pickup_type: PickupDropOffType,
    pub drop_off_type: PickupDropOffType,
    pub shape_dist_traveled: Option<f64>,
    pub timepoint: Timepoint,
}

impl TryFrom<StopTimeRow> for StopTime {
    type Error = FieldError;

    fn try_from(row: StopTimeRow) -> Result<Self, Self::Error> {
        let trip_id = required("trip_id", row.trip_id)?;
        let stop_id = required("stop_id", row.stop_id)?;
        let stop_sequence = parse("stop_sequence", &required("stop_sequence", row.stop_sequence)?)?;

        let arrival_time: Option<Time> = parse_optional("arrival_time", &row.arrival_time)?;
        let departure_time: Option<Time> = parse_optional("departure_time", &row.departure_time)?;
        if let (Some(arrival), Some(departure)) = (arrival_time, departure_time) {
            if departure < arrival {
                return Err(FieldError::new(
                    "departure_time",
                    format!("{departure} is before arrival_time {arrival}"),
                ));
            }
        }

        let shape_dist_traveled: Option<f64> =
            parse_optional("shape_dist_traveled", &row.shape_dist_traveled)?;
        if shape_dist_traveled.is_some_and(|dist| dist.is_nan() || dist < 0.0) {
            return Err(FieldError::new("shape_dist_traveled", "must be non-negative"));
        }

        Ok(Self {
            trip_id,
            stop_id,
            stop_sequence,
            arrival_time,
            departure_time,
            stop_headsign: optional(row.stop_headsign),
            pickup_type: parse("pickup_type", &row.pickup_type)?,
            drop_off_type: parse("drop_off_type", &row.drop_off_type)?,
            shape_dist_traveled,
            timepoint: parse("timepoint", &row.timepoint)?,
        })
    }
}
