use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tile ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Invalid placement: {reason}")]
    InvalidPlacement { reason: String },

    #[error("Location not found: {id}")]
    LocationNotFound { id: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event journal error: {0}")]
    EventJournal(String),

    #[error("Snapshot store error: {0}")]
    SnapshotStore(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
