//! Error types shared across clipframe crates.

use std::path::PathBuf;

/// Top-level error type for clipframe operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipframeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Emoji error: {message}")]
    Emoji { message: String },

    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Batch error: {message}")]
    Batch { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipframeError.
pub type ClipframeResult<T> = Result<T, ClipframeError>;

impl ClipframeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font {
            message: msg.into(),
        }
    }

    pub fn emoji(msg: impl Into<String>) -> Self {
        Self::Emoji {
            message: msg.into(),
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch {
            message: msg.into(),
        }
    }

    /// Build a `FileNotFound` error if `path` does not exist.
    pub fn require_file(path: &std::path::Path) -> ClipframeResult<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(Self::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}
