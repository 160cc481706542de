//! Generation planning for dataseed.
//!
//! Turns configured seed tables into a foreign-key-safe insertion order and
//! estimates how many rows each table can hold before its keys run out of
//! distinct values.

pub mod cap;
pub mod errors;
pub mod seeds;
pub mod topology;

pub use cap::{CapLimit, MIN_ROW_CAP, RowCap, estimate_cardinality, estimate_row_cap, normalize_row_cap};
pub use errors::{PlanError, Result};
pub use seeds::parse_seed_tables;
pub use topology::{TopologyPlan, dependency_closure, order_tables, resolve_topology};
