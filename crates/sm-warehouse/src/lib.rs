//! sm-warehouse - Star-schema loading for SalesMart
//!
//! Loads scrubbed record sets into the warehouse, dimensions first, and
//! drives the read, scrub and load sequence for a whole run.

pub mod error;
pub mod loader;
pub mod pipeline;

pub use error::{LoadError, LoadResult};
pub use loader::{EntityLoad, LoadSummary, WarehouseLoader};
pub use pipeline::{
    load_outcomes, read_inputs, run_pipeline, scrub_all, write_prepared, EntityReport,
    PipelineInputs, PipelineOptions, PipelineReport,
};
