use std::path::Path;

use super::{ExecutionContext, InputSchema, InputSpec, Node, NodeInputs, NodeValue, OutputSpec};
use crate::audio::{decode_waveform, AudioBatch, BatchBuilder};
use crate::download::options::{AUDIO_QUALITY_MAX, PLAYLIST_INDEX_MAX};
use crate::download::{DownloadOptions, DownloadRequest, Downloader};
use crate::error::{FetchError, FetchResult};
use crate::resolve::{resolve_path, ResolvedFile};

pub const NODE_NAME: &str = "YoutubeDLNode";
pub const DEFAULT_LINK: &str = "https://www.youtube.com/watch?v=6bALJxjL8jw";

/// Downloads a URL's media and returns its audio as one batch.
pub struct AudioFetchNode {
    downloader: Box<dyn Downloader>,
}

impl AudioFetchNode {
    pub fn new(downloader: Box<dyn Downloader>) -> Self {
        Self { downloader }
    }

    /// Download, resolve, decode, batch and optionally clean up.
    pub fn run(&self, ctx: &ExecutionContext, request: &DownloadRequest) -> FetchResult<AudioBatch> {
        request.validate()?;
        let input_dir = ctx.input_dir.input_directory();
        let options = DownloadOptions::build(request, &input_dir, ctx.restrict_filenames)?;

        log::info!("Downloading {} into {}", request.url, input_dir.display());
        let result = self.downloader.extract_info(&request.url, &options)?;

        let titles = result.titles()?;
        if result.is_playlist() {
            log::info!("Playlist with {} entries", titles.len());
        } else {
            log::info!("Single item: {}", titles.first().copied().unwrap_or_default());
        }

        let mut builder = BatchBuilder::default();
        let mut resolved: Vec<ResolvedFile> = Vec::with_capacity(titles.len());
        for title in titles {
            let file = resolve_path(&input_dir, title, ctx.restrict_filenames)?;
            let waveform = decode_waveform(&file.absolute_path)?;
            resolved.push(file);
            builder.push(waveform)?;
        }

        log::debug!("Decoded {} item(s)", builder.len());
        let batch = builder.finish()?;
        log::info!(
            "Batched audio: {:?} @ {}Hz",
            batch.shape(),
            batch.sample_rate
        );

        if request.delete_after {
            delete_files(&resolved)?;
        }

        Ok(batch)
    }

    fn request_from_inputs(&self, inputs: &NodeInputs) -> FetchResult<DownloadRequest> {
        let schema = self.describe_inputs();

        let url = inputs
            .string(&schema, "youtube_link")?
            .ok_or_else(|| FetchError::InvalidInput("youtube_link is required".into()))?;

        let mut request = DownloadRequest::new(url);
        request.playlist_start = playlist_index(inputs.int(&schema, "playlist_start")?, "playlist_start")?;
        request.playlist_end = playlist_index(inputs.int(&schema, "playlist_end")?, "playlist_end")?;
        request.audio_quality = inputs.float(&schema, "audio_quality")?;
        request.delete_after = inputs.boolean(&schema, "delete_after")?.unwrap_or(false);
        request.shuffle = inputs.boolean(&schema, "random_from_playlist")?.unwrap_or(false);
        request.extra_args = inputs
            .string(&schema, "yt_dlp_cli_args")?
            .filter(|s| !s.trim().is_empty());
        Ok(request)
    }
}

fn playlist_index(value: Option<i64>, name: &str) -> FetchResult<u32> {
    let value = value.unwrap_or(0);
    u32::try_from(value)
        .map_err(|_| FetchError::InvalidInput(format!("{} must not be negative, got {}", name, value)))
}

fn delete_files(files: &[ResolvedFile]) -> FetchResult<()> {
    for file in files {
        remove(&file.absolute_path)?;
    }
    Ok(())
}

fn remove(path: &Path) -> FetchResult<()> {
    std::fs::remove_file(path)?;
    log::info!("Deleted {}", path.display());
    Ok(())
}

impl Node for AudioFetchNode {
    fn describe_inputs(&self) -> InputSchema {
        let max_index = PLAYLIST_INDEX_MAX as i64;
        InputSchema {
            required: vec![
                InputSpec::string("youtube_link", DEFAULT_LINK),
                InputSpec::int("playlist_start", 0, 0, max_index),
                InputSpec::int("playlist_end", 0, 0, max_index),
            ],
            optional: vec![
                InputSpec::float("audio_quality", 5.0, 0.0, AUDIO_QUALITY_MAX, 1.0),
                InputSpec::boolean("delete_after", false)
                    .toggles("Delete file after extraction", "Save file permanently"),
                InputSpec::boolean("random_from_playlist", false)
                    .toggles("Shuffle Playlist", "Do not shuffle Playlist"),
                InputSpec::string("yt_dlp_cli_args", "").multiline(),
            ],
        }
    }

    fn describe_outputs(&self) -> Vec<OutputSpec> {
        vec![OutputSpec {
            name: "audio",
            kind: "AUDIO",
        }]
    }

    fn category(&self) -> &'static str {
        "audio"
    }

    fn is_output_node(&self) -> bool {
        true
    }

    fn execute(&self, ctx: &ExecutionContext, inputs: &NodeInputs) -> FetchResult<Vec<NodeValue>> {
        let request = self.request_from_inputs(inputs)?;
        let batch = self.run(ctx, &request)?;
        Ok(vec![NodeValue::Audio(batch)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::ExtractionResult;

    struct NeverCalled;

    impl Downloader for NeverCalled {
        fn extract_info(&self, _: &str, _: &DownloadOptions) -> FetchResult<ExtractionResult> {
            panic!("downloader should not run");
        }
    }

    fn node() -> AudioFetchNode {
        AudioFetchNode::new(Box::new(NeverCalled))
    }

    #[test]
    fn test_request_defaults() {
        let request = node().request_from_inputs(&NodeInputs::new()).unwrap();
        assert_eq!(request.url, DEFAULT_LINK);
        assert_eq!(request.playlist_start, 0);
        assert_eq!(request.playlist_end, 0);
        assert_eq!(request.audio_quality, Some(5.0));
        assert!(!request.delete_after);
        assert!(!request.shuffle);
        assert_eq!(request.extra_args, None);
    }

    #[test]
    fn test_request_from_inputs() {
        let inputs = NodeInputs::new()
            .set("youtube_link", "https://example.com/list")
            .set("playlist_start", 2)
            .set("playlist_end", 5)
            .set("audio_quality", 3.5)
            .set("delete_after", true)
            .set("random_from_playlist", true)
            .set("yt_dlp_cli_args", "--no-playlist");
        let request = node().request_from_inputs(&inputs).unwrap();
        assert_eq!(request.url, "https://example.com/list");
        assert_eq!(request.playlist_start, 2);
        assert_eq!(request.playlist_end, 5);
        assert_eq!(request.audio_quality, Some(3.5));
        assert!(request.delete_after);
        assert!(request.shuffle);
        assert_eq!(request.extra_args.as_deref(), Some("--no-playlist"));
    }

    #[test]
    fn test_negative_index_rejected() {
        let inputs = NodeInputs::new().set("playlist_start", -1);
        assert!(matches!(
            node().request_from_inputs(&inputs),
            Err(FetchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_request_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = crate::node::FixedInputDirectory::new(dir.path());
        let ctx = ExecutionContext::new(&input_dir);
        let inputs = NodeInputs::new().set("audio_quality", 42.0);
        assert!(matches!(
            node().execute(&ctx, &inputs),
            Err(FetchError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_declares_audio_output_node() {
        let n = node();
        assert!(n.is_output_node());
        assert_eq!(n.category(), "audio");
        assert_eq!(n.describe_outputs()[0].kind, "AUDIO");
        let schema = n.describe_inputs();
        assert_eq!(schema.required.len(), 3);
        assert!(schema.find("yt_dlp_cli_args").unwrap().multiline);
    }
}
