//! A vectorized, pull-based SQL execution core.
//!
//! Three layers: a columnar vector runtime (`types`), an expression and
//! aggregate evaluation layer (`expression`), and a physical operator runtime
//! that pulls chunks through a plan tree (`planner`, `execution`). Parsing,
//! planning, storage, and transactions are out of scope - `catalog` exposes
//! only the table-reader boundary a plan is built against.

pub mod catalog;
pub mod common;
pub mod config;
pub mod execution;
pub mod expression;
pub mod planner;
pub mod types;

pub use common::error::{PrismDBError, PrismDBResult};
pub use config::Config;
pub use types::{DataChunk, LogicalType, PhysicalType, SelectionVector, Value, Vector};
