use serde_json::{Map, Value};
use std::path::Path;

use super::cli_args::{self, ArgKind, ApiOverrides};
use crate::error::{FetchError, FetchResult};

/// Upper bound accepted for playlist indices.
pub const PLAYLIST_INDEX_MAX: u32 = 4096;
/// Upper bound accepted for the audio quality hint.
pub const AUDIO_QUALITY_MAX: f64 = 10.0;

/// One node invocation's worth of download parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub playlist_start: u32,
    /// 0 means no upper bound.
    pub playlist_end: u32,
    pub audio_quality: Option<f64>,
    pub shuffle: bool,
    pub delete_after: bool,
    pub extra_args: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            playlist_start: 0,
            playlist_end: 0,
            audio_quality: None,
            shuffle: false,
            delete_after: false,
            extra_args: None,
        }
    }

    pub fn validate(&self) -> FetchResult<()> {
        if self.url.trim().is_empty() {
            return Err(FetchError::InvalidInput("youtube_link is empty".into()));
        }
        for (name, value) in [
            ("playlist_start", self.playlist_start),
            ("playlist_end", self.playlist_end),
        ] {
            if value > PLAYLIST_INDEX_MAX {
                return Err(FetchError::InvalidInput(format!(
                    "{} must be within 0..={}, got {}",
                    name, PLAYLIST_INDEX_MAX, value
                )));
            }
        }
        if self.playlist_end != 0 && self.playlist_end < self.playlist_start {
            return Err(FetchError::InvalidInput(format!(
                "playlist_end ({}) is before playlist_start ({})",
                self.playlist_end, self.playlist_start
            )));
        }
        if let Some(q) = self.audio_quality {
            if !(0.0..=AUDIO_QUALITY_MAX).contains(&q) {
                return Err(FetchError::InvalidInput(format!(
                    "audio_quality must be within 0..={}, got {}",
                    AUDIO_QUALITY_MAX, q
                )));
            }
        }
        Ok(())
    }
}

/// Downloader configuration keyed by the downloader's API option names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadOptions {
    values: Map<String, Value>,
    passthrough: Vec<String>,
}

impl DownloadOptions {
    /// Build the configuration for `request`, writing into `input_dir`.
    ///
    /// Raw extra arguments are translated last so their keys override the
    /// defaults set here.
    pub fn build(
        request: &DownloadRequest,
        input_dir: &Path,
        restrict_filenames: bool,
    ) -> FetchResult<Self> {
        let mut opts = Self::default();
        opts.insert("format", "best");
        opts.insert("playliststart", request.playlist_start);
        opts.insert("playlistend", request.playlist_end);
        opts.insert(
            "outtmpl",
            format!("{}/%(title)s.%(ext)s", input_dir.display()),
        );

        // A quality of exactly 0 counts as unset. Halves round to even.
        if let Some(q) = request.audio_quality.filter(|q| *q != 0.0) {
            opts.insert("audioquality", q.round_ties_even() as i64);
        }
        if request.shuffle {
            opts.insert("playlist_random", true);
        }
        if restrict_filenames {
            opts.insert("windowsfilenames", true);
        }

        if let Some(raw) = request.extra_args.as_deref().filter(|s| !s.trim().is_empty()) {
            let overrides = cli_args::cli_to_api(raw)?;
            opts.merge(overrides);
        }

        Ok(opts)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    pub fn merge(&mut self, overrides: ApiOverrides) {
        for (key, value) in overrides.values {
            self.values.insert(key, value);
        }
        if !overrides.passthrough.is_empty() {
            log::warn!(
                "Passing unrecognised downloader arguments through verbatim: {:?}",
                overrides.passthrough
            );
        }
        self.passthrough.extend(overrides.passthrough);
    }

    /// Render the configuration as downloader command-line flags.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (key, value) in &self.values {
            match key.as_str() {
                // 0 leaves the bound at the downloader's default
                "playliststart" | "playlistend" if value.as_u64() == Some(0) => continue,
                _ => {}
            }

            let Some(spec) = cli_args::flag_for_key(key, value) else {
                log::warn!("No command-line flag for option '{}', skipping", key);
                continue;
            };
            let flag = spec.flags[0].to_string();
            match spec.kind {
                ArgKind::Switch | ArgKind::SwitchOff => args.push(flag),
                ArgKind::Text | ArgKind::Number => {
                    args.push(flag);
                    args.push(value_to_arg(value));
                }
            }
        }
        args.extend(self.passthrough.iter().cloned());
        args
    }
}

fn value_to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> DownloadRequest {
        DownloadRequest::new("https://example.com/watch?v=abc")
    }

    #[test]
    fn test_defaults() {
        let opts = DownloadOptions::build(&request(), &PathBuf::from("/data/input"), false).unwrap();
        assert_eq!(opts.get("format"), Some(&Value::from("best")));
        assert_eq!(opts.get("playliststart"), Some(&Value::from(0)));
        assert_eq!(opts.get("playlistend"), Some(&Value::from(0)));
        assert_eq!(
            opts.get("outtmpl"),
            Some(&Value::from("/data/input/%(title)s.%(ext)s"))
        );
        assert!(opts.get("audioquality").is_none());
        assert!(opts.get("playlist_random").is_none());
        assert!(opts.get("windowsfilenames").is_none());
    }

    #[test]
    fn test_quality_shuffle_and_windows() {
        let mut req = request();
        req.audio_quality = Some(6.6);
        req.shuffle = true;
        let opts = DownloadOptions::build(&req, &PathBuf::from("in"), true).unwrap();
        assert_eq!(opts.get("audioquality"), Some(&Value::from(7)));
        assert_eq!(opts.get("playlist_random"), Some(&Value::from(true)));
        assert_eq!(opts.get("windowsfilenames"), Some(&Value::from(true)));

        for (quality, expected) in [(0.5, 0), (2.5, 2), (3.5, 4), (4.5, 4)] {
            req.audio_quality = Some(quality);
            let opts = DownloadOptions::build(&req, &PathBuf::from("in"), false).unwrap();
            assert_eq!(
                opts.get("audioquality").and_then(Value::as_i64),
                Some(expected),
                "quality {}",
                quality
            );
        }
    }

    #[test]
    fn test_zero_quality_is_unset() {
        let mut req = request();
        req.audio_quality = Some(0.0);
        let opts = DownloadOptions::build(&req, &PathBuf::from("in"), false).unwrap();
        assert!(opts.get("audioquality").is_none());
    }

    #[test]
    fn test_extra_args_override_defaults() {
        let mut req = request();
        req.extra_args = Some("-f bestaudio\n--playlist-end 3 --embed-thumbnail".into());
        let opts = DownloadOptions::build(&req, &PathBuf::from("in"), false).unwrap();
        assert_eq!(opts.get("format"), Some(&Value::from("bestaudio")));
        assert_eq!(opts.get("playlistend"), Some(&Value::from(3)));
        assert_eq!(opts.passthrough(), &["--embed-thumbnail".to_string()]);
    }

    #[test]
    fn test_to_args() {
        let mut req = request();
        req.playlist_start = 2;
        req.audio_quality = Some(5.0);
        req.shuffle = true;
        let opts = DownloadOptions::build(&req, &PathBuf::from("in"), false).unwrap();
        let args = opts.to_args();
        assert_eq!(
            args,
            vec![
                "--format",
                "best",
                "--playlist-start",
                "2",
                "--output",
                "in/%(title)s.%(ext)s",
                "--audio-quality",
                "5",
                "--playlist-random",
            ]
        );
    }

    #[test]
    fn test_validate_bounds() {
        let mut req = request();
        req.playlist_start = 5000;
        assert!(matches!(req.validate(), Err(FetchError::InvalidInput(_))));

        let mut req = request();
        req.playlist_start = 4;
        req.playlist_end = 2;
        assert!(matches!(req.validate(), Err(FetchError::InvalidInput(_))));

        let mut req = request();
        req.audio_quality = Some(11.0);
        assert!(matches!(req.validate(), Err(FetchError::InvalidInput(_))));

        let mut req = request();
        req.playlist_start = 1;
        req.playlist_end = 0;
        assert!(req.validate().is_ok());
    }
}
