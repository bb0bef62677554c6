use thiserror::Error;

/// Errors surfaced by the scratch card engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScratchError {
    #[error("\"{0}\", this type of coating is not supported")]
    UnsupportedCoating(String),

    #[error("The image {url} can not be loaded: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to parse options: {0}")]
    OptionsParse(String),
}

pub type ScratchResult<T> = Result<T, ScratchError>;
