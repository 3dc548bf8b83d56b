pub mod data;
pub mod error;
pub mod feed;
pub mod geo;
pub mod gtfs;
pub mod index;
pub mod resolver;
pub mod table;

pub use error::{FeedError, QueryError, RowError};
pub use feed::Feed;
pub use geo::{distance_km, Point};
pub use index::FeedIndex;
pub use resolver::{find_nearby, BusStop, NearbyOptions};
pub use table::{Record, Table};
