// Configuration management for TuneDeck
// Handles loading/saving settings, with sensible defaults when config is missing

use crate::audio::default_extensions;
use crate::playback::{PlayMode, Volume};
use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub media_directories: Vec<PathBuf>,
    pub log_directory: PathBuf,
    pub playback: PlaybackConfig,
    pub video: VideoConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub initial_volume: u8,
    pub seek_step_secs: u32,
    pub initial_mode: PlayMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Tried in order when a graphical session is available
    pub desktop_players: Vec<PlayerCommand>,
    pub headless_player: PlayerCommand,
    /// DISPLAY handed to the headless player
    pub headless_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
}

impl PlayerCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let log_directory = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunedeck")
            .join("logs");

        Self {
            media_directories: vec![
                dirs::audio_dir().unwrap_or_else(|| home.join("Music")),
                dirs::video_dir().unwrap_or_else(|| home.join("Videos")),
            ],
            log_directory,
            playback: PlaybackConfig::default(),
            video: VideoConfig::default(),
            scan: ScanConfig {
                extensions: default_extensions(),
            },
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: 100,
            seek_step_secs: 10,
            initial_mode: PlayMode::LoopAll,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            desktop_players: vec![
                PlayerCommand::new("vlc", &["--play-and-exit"]),
                PlayerCommand::new("ffplay", &["-autoexit"]),
            ],
            headless_player: PlayerCommand::new("mpv", &[]),
            headless_display: ":0".to_string(),
        }
    }
}

impl Config {
    /// Load from the given path, or the per-user location when `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            config
        };

        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tunedeck");

        Ok(config_dir.join("config.toml"))
    }

    // Hand-edited values are pulled back onto the grids the player works on
    fn normalize(&mut self) {
        self.playback.initial_volume = Volume::new(self.playback.initial_volume).percent();
        if self.scan.extensions.is_empty() {
            self.scan.extensions = default_extensions();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.playback, PlaybackConfig::default());

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_normalizes_volume_and_reads_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.playback.initial_volume = 73;
        config.playback.initial_mode = PlayMode::Random;
        config.scan.extensions.clear();
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.playback.initial_volume, 70);
        assert_eq!(loaded.playback.initial_mode, PlayMode::Random);
        assert_eq!(loaded.scan.extensions, default_extensions());
    }

    #[test]
    fn test_player_args_are_optional() {
        let toml = r#"
            program = "mpv"
        "#;
        let command: PlayerCommand = toml::from_str(toml).unwrap();
        assert_eq!(command, PlayerCommand::new("mpv", &[]));
    }
}
