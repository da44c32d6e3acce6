use axum::response::{IntoResponse, Response};
use forno::ProblemDetails;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("{entity} with ID '{id}' not found.")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let problem = match &self {
            DomainError::Validation(errors) => {
                ProblemDetails::validation("One or more validation errors occurred.")
                    .with_extension("errors", errors.clone())
            }
            DomainError::NotFound { .. } => ProblemDetails::not_found(self.to_string()),
            DomainError::InvalidCredentials => ProblemDetails::unauthorized(self.to_string()),
            DomainError::Token(cause) => {
                tracing::error!(%cause, "token handling failed");
                ProblemDetails::internal()
            }
        };
        problem.into_response()
    }
}

/// Collects rule violations and turns them into one error.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub(crate) fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.0.push(message.to_string());
        }
    }

    pub(crate) fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}
