//! Synthetic row generation for dataseed.
//!
//! Columns are dispatched to generators through a priority-ordered matcher
//! chain; a table strategy turns a table and its row cap into rows, sampling
//! foreign keys from parents generated earlier; the orchestrator runs the
//! strategy over the planned table order.

pub mod errors;
pub mod foreign;
pub mod generators;
pub mod matchers;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod strategy;

pub use errors::GenerationError;
pub use generators::{Generator, GeneratorContext, GeneratorRegistry, GeneratorRegistryBuilder};
pub use matchers::{DEFAULT_GENERATOR_KEY, Matcher, MatcherChain};
pub use model::{
    GenerateOptions, GeneratedCell, GeneratedRow, GeneratedTable, GeneratedValue,
    GenerationOutcome, GenerationReport, TableReport,
};
pub use orchestrator::Orchestrator;
pub use strategy::{SyntheticTableStrategy, TableDataStrategy};
