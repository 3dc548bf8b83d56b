use crate::{
    data::{Stop, StopTime, Trip},
    error::{FeedError, QueryError},
    geo::Point,
    gtfs,
    index::FeedIndex,
    resolver::{self, BusStop, NearbyOptions},
    table::Table,
};

/// A validated, indexed static feed. Immutable once built.
#[derive(Debug)]
pub struct Feed {
    pub stops: Table<Stop>,
    pub trips: Table<Trip>,
    pub stop_times: Table<StopTime>,
    pub index: FeedIndex,
}

impl TryFrom<gtfs::Timetable> for Feed {
    type Error = FeedError;

    fn try_from(timetable: gtfs::Timetable) -> Result<Self, Self::Error> {
        let stops = Table::load(timetable.stops)?;
        let trips = Table::load(timetable.trips)?;
        let stop_times = Table::load(timetable.stop_times)?;
        let index = FeedIndex::build(&stops, &trips, &stop_times)?;

        Ok(Self {
            stops,
            trips,
            stop_times,
            index,
        })
    }
}

impl Feed {
    pub fn find_nearby(
        &self,
        reference: Point,
        options: &NearbyOptions,
    ) -> Result<Vec<BusStop>, QueryError> {
        resolver::find_nearby(reference, &self.stops, &self.index, options)
    }
}
