use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Download failed: {0}")]
    Download(String),

    #[error(
        "Expected this to be a playlist but there is no 'entries' key in the response: {0}"
    )]
    MalformedPlaylist(String),

    #[error("Malformed extraction result: {0}")]
    MalformedResult(String),

    #[error("Could not find file in input_dir {} with basename: {basename}", .dir.display())]
    FileNotFound { dir: PathBuf, basename: String },

    #[error("Sample rate mismatch in playlist items: {expected} != {found}")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("Channel count mismatch in playlist items: {expected} != {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;
