use thiserror::Error;

/// Errors returned by server-side use cases
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("upstream model error: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),
}
