use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Quota or rate limit hit on a generation model. Recoverable by
    /// switching to a fallback model.
    #[error("Resource exhausted on model '{model}': {message}")]
    ResourceExhausted { model: String, message: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Error::ResourceExhausted { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
