use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{DownloadOptions, Downloader, ExtractionResult};
use crate::error::{FetchError, FetchResult};

pub const DEFAULT_BINARY: &str = "yt-dlp";

/// Runs the `yt-dlp` executable as a child process.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for a download that also prints the result document to stdout.
    pub fn command_args(url: &str, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-simulate".into(),
            "--no-progress".into(),
        ];
        args.extend(options.to_args());
        args.push("--".into());
        args.push(url.to_string());
        args
    }
}

impl Downloader for YtDlp {
    fn extract_info(&self, url: &str, options: &DownloadOptions) -> FetchResult<ExtractionResult> {
        let args = Self::command_args(url, options);
        log::debug!("Running {} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                FetchError::Download(format!(
                    "failed to spawn {}: {}. Is yt-dlp installed?",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Download(format!(
                "{} exited with {}:\n{}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        ExtractionResult::from_json(&output.stdout)
    }
}
