use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Remote store failure: {0}")]
    Remote(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
