//! Fetch a video URL's audio with yt-dlp and hand it to a node graph as a
//! batched waveform.

pub mod audio;
pub mod download;
pub mod error;
pub mod node;
pub mod resolve;

pub use audio::{AudioBatch, Waveform};
pub use download::{DownloadOptions, DownloadRequest, Downloader, ExtractionResult, YtDlp};
pub use error::{FetchError, FetchResult};
pub use node::{
    AudioFetchNode, ExecutionContext, FixedInputDirectory, InputDirectory, Node, NodeInputs,
    NodeRegistry, NodeValue,
};
