use thiserror::Error;

/// Errors raised while turning configuration into a generation plan.
///
/// Every variant is a configuration error: callers are expected to stop the
/// run before any data is generated.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid seed table '{entry}': {reason}")]
    InvalidSeed { entry: String, reason: String },
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
