use std::time::Duration;

pub type Result<T> = std::result::Result<T, GameError>;

/// Failure reported by a detector capability for one camera query.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("detector request failed: {0}")]
    Request(String),
    #[error("detector answered with status {0}")]
    Status(u16),
    #[error("could not decode detections: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Missing, empty or wrongly typed attribute. Fatal at configuration time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A named capability was not among the resolved dependencies.
    #[error("detector '{name}' not found in dependencies, available resources: {available:?}")]
    Dependency { name: String, available: Vec<String> },

    /// Recovered inside the loop; the tick is skipped.
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error("detector did not answer within {0:?}")]
    DetectionTimeout(Duration),

    #[error("`{0}` is not implemented")]
    NotImplemented(&'static str),
}

impl GameError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
