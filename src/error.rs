//! Error types for the model preview pipeline.

use thiserror::Error;

/// Result type alias using PreviewError.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Main error type for preview operations.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or decode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to walk the resource pack directory.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),

    /// Invalid resource pack structure.
    #[error("Invalid resource pack: {0}")]
    InvalidResourcePack(String),

    /// The entity declares no resolvable geometry.
    #[error("Entity {0} has no resolvable geometry")]
    MissingGeometry(String),

    /// A geometry file did not contain a usable definition.
    #[error("Invalid geometry file {0}")]
    InvalidGeometry(String),

    /// A git command failed.
    #[error("git error: {0}")]
    Git(String),

    /// Rendering a project failed or timed out.
    #[error("Render failed: {0}")]
    RenderFailed(String),

    /// The GitHub API returned an unexpected response.
    #[error("GitHub API error: {0}")]
    GitHub(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ureq::Error> for PreviewError {
    fn from(err: ureq::Error) -> Self {
        PreviewError::Http(Box::new(err))
    }
}
