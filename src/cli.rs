use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ytaudio", about = "Download a video's audio and batch it for a node graph")]
pub struct Cli {
    /// Video or playlist URL
    pub url: Option<String>,

    /// First playlist item to fetch (0 = downloader default)
    #[arg(long, default_value_t = 0)]
    pub playlist_start: u32,

    /// Last playlist item to fetch (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub playlist_end: u32,

    /// Audio quality hint (0-10)
    #[arg(long)]
    pub audio_quality: Option<f64>,

    /// Delete the downloaded files once decoded
    #[arg(long)]
    pub delete_after: bool,

    /// Shuffle playlist order
    #[arg(long)]
    pub shuffle: bool,

    /// Extra yt-dlp flags, e.g. "--no-playlist -f bestaudio"
    #[arg(long, allow_hyphen_values = true)]
    pub yt_dlp_args: Option<String>,

    /// Directory downloads are written to and resolved from
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    pub yt_dlp: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the batched audio as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the registered node schemas as JSON and exit
    #[arg(long)]
    pub describe: bool,
}
