use thiserror::Error;

pub type Result<T> = std::result::Result<T, FornoError>;

#[derive(Debug, Error)]
pub enum FornoError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Scope mismatch: {message}")]
    ScopeMismatch { message: String },

    #[error(
        "Conflicting bindings for contract '{contract}': already bound to {existing}, also claimed by {candidate}"
    )]
    ConflictingBinding {
        contract: String,
        existing: String,
        candidate: String,
    },

    #[error("{implementation} is bound under '{contract}' but cannot be cast to it; derive the contract with #[contract]")]
    UncastableContract {
        contract: String,
        implementation: String,
    },

    #[error("Route collision on '{route}' between modules {first} and {second}")]
    RouteCollision {
        route: String,
        first: String,
        second: String,
    },

    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("Invalid lifetime '{value}' (expected transient, scoped or singleton)")]
    InvalidLifetime { value: String },

    #[error("Invalid contract resolution policy '{value}' (expected top-level or full-closure)")]
    InvalidPolicy { value: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FornoError {
    /// Configuration errors are raised while composing the application and
    /// must abort startup. Everything else surfaces at the point of use.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FornoError::ConflictingBinding { .. }
                | FornoError::UncastableContract { .. }
                | FornoError::RouteCollision { .. }
                | FornoError::InvalidRoute { .. }
                | FornoError::InvalidLifetime { .. }
                | FornoError::InvalidPolicy { .. }
        )
    }
}

impl axum::response::IntoResponse for FornoError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self, "request failed inside the composition engine");
        crate::exception::ProblemDetails::internal().into_response()
    }
}
