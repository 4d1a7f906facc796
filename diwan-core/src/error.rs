use thiserror::Error;

/// Errors surfaced by the verse and card pipeline.
///
/// Only caller mistakes and I/O end up here. A model that fails halfway
/// through generation or a missing font degrades the output instead.
#[derive(Error, Debug)]
pub enum DiwanError {
    #[error("temperature must be finite and greater than zero, got {0}")]
    InvalidTemperature(f32),

    #[error("max_len must be at least 1, got {0}")]
    InvalidContextWindow(usize),

    #[error("invalid vocabulary: {0}")]
    Vocabulary(String),

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("invalid model table: {0}")]
    Model(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DiwanError>;
