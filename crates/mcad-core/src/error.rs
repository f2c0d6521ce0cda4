use thiserror::Error;

#[derive(Debug, Error)]
pub enum McadError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("No intersection: {0}")]
    NoIntersection(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, McadError>;
