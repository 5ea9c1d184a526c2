pub mod dataset_cache;
pub mod geo_client;
pub mod providers;
pub mod soft;

pub use dataset_cache::DatasetCache;
pub use geo_client::{DatasetFetcher, FetchError, GeoClient};
