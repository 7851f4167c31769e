mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use cli::Cli;
use ytaudio::node::audio_fetch::NODE_NAME;
use ytaudio::{ExecutionContext, FixedInputDirectory, NodeInputs, NodeRegistry, NodeValue, YtDlp};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Config values apply only where the CLI was left at its default
    let config_path = cli.config.clone().or_else(config::find_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            if cli.input_dir.is_none() { cli.input_dir = cfg.input_dir; }
            if cli.yt_dlp.is_none() { cli.yt_dlp = cfg.yt_dlp; }
            if cli.audio_quality.is_none() { cli.audio_quality = cfg.defaults.audio_quality; }
            if !cli.delete_after { cli.delete_after = cfg.defaults.delete_after; }
            if !cli.shuffle { cli.shuffle = cfg.defaults.shuffle; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let ytdlp = cli.yt_dlp.clone().map(YtDlp::new).unwrap_or_default();
    log::debug!("Downloader binary: {}", ytdlp.binary().display());
    let registry = NodeRegistry::with_defaults(ytdlp);

    if cli.describe {
        let schemas = registry.describe()?;
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    let url = cli.url.clone().context("A video or playlist URL is required")?;
    let input_dir = cli.input_dir.clone().unwrap_or_else(config::default_input_dir);
    std::fs::create_dir_all(&input_dir)
        .with_context(|| format!("Failed to create input directory: {}", input_dir.display()))?;
    let input_dir = FixedInputDirectory::new(input_dir.canonicalize()?);
    log::info!("Input directory: {}", input_dir.path().display());

    let mut inputs = NodeInputs::new()
        .set("youtube_link", url)
        .set("playlist_start", cli.playlist_start)
        .set("playlist_end", cli.playlist_end)
        .set("delete_after", cli.delete_after)
        .set("random_from_playlist", cli.shuffle);
    if let Some(q) = cli.audio_quality {
        inputs = inputs.set("audio_quality", q);
    }
    if let Some(ref args) = cli.yt_dlp_args {
        inputs = inputs.set("yt_dlp_cli_args", args.as_str());
    }

    let node = registry.create(NODE_NAME)?;
    let ctx = ExecutionContext::new(&input_dir);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Running {}", NODE_NAME));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outputs = node.execute(&ctx, &inputs);
    spinner.finish_and_clear();
    let outputs = outputs.with_context(|| format!("{} failed", NODE_NAME))?;

    for value in outputs {
        match value {
            NodeValue::Audio(batch) => {
                let [items, channels, frames] = batch.shape();
                log::info!(
                    "Audio batch: {} item(s), {} channel(s), {} frames @ {}Hz ({:.1}s)",
                    items,
                    channels,
                    frames,
                    batch.sample_rate,
                    frames as f32 / batch.sample_rate as f32
                );

                if let Some(ref path) = cli.output {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    serde_json::to_writer(std::io::BufWriter::new(file), &batch)
                        .context("Failed to write audio batch")?;
                    log::info!("Wrote {}", path.display());
                }
            }
        }
    }

    Ok(())
}
