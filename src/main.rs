use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;

use gtfs_nearby::{gtfs, Feed, NearbyOptions, Point};

/// List the stops of a GTFS feed nearest to a point, with the headsigns
/// serving each one.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing stops.txt, trips.txt and stop_times.txt
    feed_dir: PathBuf,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    #[arg(long)]
    max_distance_km: Option<f64>,

    #[arg(long)]
    max_results: Option<usize>,
}

fn deserialize_into<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("impossible to open {}", path.display()))?
        .deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("impossible to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Processing stops");
    let stops = deserialize_into(&args.feed_dir.join("stops.txt"))?;

    info!("Processing trips");
    let trips = deserialize_into(&args.feed_dir.join("trips.txt"))?;

    info!("Processing stop_times");
    let stop_times = deserialize_into(&args.feed_dir.join("stop_times.txt"))?;

    let feed = Feed::try_from(gtfs::Timetable {
        stops,
        trips,
        stop_times,
    })?;

    let options = NearbyOptions {
        max_distance_km: args.max_distance_km,
        max_results: args.max_results,
    };
    let nearby = feed.find_nearby(Point::new(args.lat, args.lon), &options)?;

    println!("{}", serde_json::to_string_pretty(&nearby)?);

    Ok(())
}
