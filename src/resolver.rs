use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    data::Stop,
    error::QueryError,
    geo::{distance_km, Point},
    index::FeedIndex,
    table::Table,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusStop {
    #[serde(flatten)]
    pub stop: Arc<Stop>,
    pub distance_km: f64,
    pub routes_serviced: Vec<String>,
}

/// Both limits are optional; the default returns every stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NearbyOptions {
    pub max_distance_km: Option<f64>,
    pub max_results: Option<usize>,
}

impl NearbyOptions {
    pub fn validate(&self) -> Result<(), QueryError> {
        if let Some(max_distance) = self.max_distance_km {
            if max_distance.is_nan() || max_distance < 0.0 {
                return Err(QueryError::InvalidConfiguration(format!(
                    "max_distance_km must be non-negative, got {max_distance}"
                )));
            }
        }

        if self.max_results == Some(0) {
            return Err(QueryError::InvalidConfiguration(
                "max_results must be positive".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Stops ordered by ascending distance from `reference`, ties broken by stop id.
///
/// `max_distance_km` filters before sorting, `max_results` truncates after.
pub fn find_nearby(
    reference: Point,
    stops: &Table<Stop>,
    index: &FeedIndex,
    options: &NearbyOptions,
) -> Result<Vec<BusStop>, QueryError> {
    options.validate()?;
    let reference = reference.validate()?;

    let distances = stops
        .records()
        .par_iter()
        .map(|(_, stop)| -> Result<_, QueryError> {
            Ok((distance_km(reference, stop.location)?, stop))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut nearby = distances
        .into_iter()
        .filter(|(distance, _)| {
            options
                .max_distance_km
                .map_or(true, |max_distance| *distance <= max_distance)
        })
        .collect_vec();

    nearby.sort_by(|(distance_a, a), (distance_b, b)| {
        distance_a.total_cmp(distance_b).then_with(|| a.id.cmp(&b.id))
    });

    if let Some(max_results) = options.max_results {
        nearby.truncate(max_results);
    }

    debug!(
        "{} stops near ({}, {}) with {:?}",
        nearby.len(),
        reference.lat,
        reference.lon,
        options
    );

    Ok(nearby
        .into_iter()
        .map(|(distance, stop)| BusStop {
            stop: Arc::clone(stop),
            distance_km: distance,
            routes_serviced: index
                .headsigns_for_stop(&stop.id)
                .map(|headsigns| headsigns.iter().cloned().collect())
                .unwrap_or_default(),
        })
        .collect())
}
