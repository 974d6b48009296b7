//! sm-db - Warehouse store for SalesMart
//!
//! This crate provides the `Database` trait the loader writes through and
//! its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
