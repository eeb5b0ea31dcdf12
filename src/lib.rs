//! CovidLens: a CLI explorer for COVID-19 case distribution across Lebanese towns
//!
//! This library loads a fixed-schema health dataset, derives a composite
//! chronic-disease score per town, and renders three filterable chart views
//! (tree map, line chart, bubble chart).

pub mod cli;
pub mod data;
pub mod filter;
pub mod viz;

// Re-export public items for easier access
pub use cli::{Args, View};
pub use data::{load_health_data, Dataset, HealthContext, Record, HEALTH_DATA_URL};
pub use filter::{CaseRange, FilterSpec, DEFAULT_CASE_RANGE};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
