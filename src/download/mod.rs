pub mod cli_args;
pub mod options;
pub mod result;
pub mod ytdlp;

pub use options::{DownloadOptions, DownloadRequest};
pub use result::ExtractionResult;
pub use ytdlp::YtDlp;

use crate::error::FetchResult;

/// Resolves a URL, downloads its media and reports what was fetched.
pub trait Downloader {
    /// Download `url` with `options`, blocking until the files are on disk.
    fn extract_info(&self, url: &str, options: &DownloadOptions) -> FetchResult<ExtractionResult>;
}
