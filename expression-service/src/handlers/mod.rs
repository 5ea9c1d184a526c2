pub mod analysis;
pub mod app;
pub mod datasets;
pub mod metrics;
pub mod visualization;
