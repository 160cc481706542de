use thiserror::Error;

use dataseed_plan::PlanError;

/// Errors emitted by the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Schema(#[from] dataseed_core::Error),
    #[error("generator registry has no default generator")]
    MissingDefaultGenerator,
    #[error("generator '{0}' registered more than once")]
    DuplicateGenerator(String),
    #[error("table strategy failed: {0}")]
    Strategy(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
