use thiserror::Error;

pub type PulseResult<T> = Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Source fetch error ({collection}): {message}")]
    Source {
        collection: &'static str,
        message: String,
    },

    #[error("Malformed source payload ({collection}): {message}")]
    Payload {
        collection: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PulseError {
    pub fn fetch(collection: &'static str, message: impl Into<String>) -> Self {
        Self::Source {
            collection,
            message: message.into(),
        }
    }

    pub fn payload(collection: &'static str, message: impl Into<String>) -> Self {
        Self::Payload {
            collection,
            message: message.into(),
        }
    }
}
