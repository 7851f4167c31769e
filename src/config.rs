use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    #[serde(default)]
    pub yt_dlp: Option<PathBuf>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub audio_quality: Option<f64>,
    #[serde(default)]
    pub delete_after: bool,
    #[serde(default)]
    pub shuffle: bool,
}

pub fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}

/// `./ytaudio.toml`, then the per-user config locations.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("ytaudio.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("ytaudio").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("ytaudio").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ytaudio.toml");
        std::fs::write(
            &path,
            "input_dir = \"/srv/input\"\n\n[defaults]\naudio_quality = 3\ndelete_after = true\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.input_dir, Some(PathBuf::from("/srv/input")));
        assert!(cfg.yt_dlp.is_none());
        assert_eq!(cfg.defaults.audio_quality, Some(3.0));
        assert!(cfg.defaults.delete_after);
        assert!(!cfg.defaults.shuffle);
    }

    #[test]
    fn test_bad_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "input_dir = [").unwrap();
        assert!(load_config(&path).is_none());
        assert!(load_config(&dir.path().join("missing.toml")).is_none());
    }
}
