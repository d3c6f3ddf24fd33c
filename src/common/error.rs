use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Avatar not found: {id}")]
    AvatarNotFound { id: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
