pub mod backend;
pub mod media;
pub mod player;
pub mod scanner;
pub mod video;

pub use backend::{BackendEvent, MediaBackend, PlaybackTicket, PlayerBackend};
pub use media::{MediaItem, MediaMetadata};
pub use player::AudioPlayer;
pub use scanner::MediaScanner;
pub use video::VideoLauncher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Mp3,
    Flac,
    Ogg,
    M4a,
    Wav,
    Mp4,
    Mkv,
    Avi,
    Mov,
    Webm,
    Unknown,
}

impl MediaFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => MediaFormat::Mp3,
            "flac" => MediaFormat::Flac,
            "ogg" | "oga" => MediaFormat::Ogg,
            "m4a" | "aac" => MediaFormat::M4a,
            "wav" => MediaFormat::Wav,
            "mp4" => MediaFormat::Mp4,
            "mkv" => MediaFormat::Mkv,
            "avi" => MediaFormat::Avi,
            "mov" => MediaFormat::Mov,
            "webm" => MediaFormat::Webm,
            _ => MediaFormat::Unknown,
        }
    }

    /// Video containers are handed to an external player instead of the decoder
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            MediaFormat::Mp4 | MediaFormat::Mkv | MediaFormat::Avi | MediaFormat::Mov | MediaFormat::Webm
        )
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaFormat::Unknown)
    }
}

/// Extensions picked up by a scan when the config does not override them
pub fn default_extensions() -> Vec<String> {
    [
        "mp3", "flac", "ogg", "oga", "m4a", "aac", "wav", "mp4", "mkv", "avi", "mov", "webm",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}
