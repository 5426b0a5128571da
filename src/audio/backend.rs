use super::{AudioPlayer, MediaItem, VideoLauncher};
use crate::config::Config;
use crate::error::BackendResult;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

/// Identifies one backend handle. Every start gets a fresh ticket so completion
/// reports from a handle that was already replaced can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlaybackTicket(u64);

impl PlaybackTicket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Reports a backend sends back to the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// The handle started with this ticket ran to its end (process exit or drained sink)
    Finished(PlaybackTicket),
    /// The handle died instead of finishing (player crashed, exited non-zero, lost track of it)
    Failed(PlaybackTicket, String),
}

/// The external side of playback: decoders and player processes.
///
/// `start` only launches playback and returns the duration in whole seconds
/// (0 when unknown); it never waits for playback to finish. `stop` must leave
/// no handle running when it returns and is a no-op when nothing is active.
/// The remaining controls are best-effort.
#[async_trait(?Send)]
pub trait PlayerBackend {
    async fn start(&mut self, item: &MediaItem, ticket: PlaybackTicket) -> BackendResult<u32>;
    async fn stop(&mut self) -> BackendResult<()>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn set_volume(&mut self, percent: u8);
    fn seek(&mut self, position_secs: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveKind {
    Audio,
    Video,
}

/// Routes audio files to the in-process decoder and video files to an external player
pub struct MediaBackend {
    audio: AudioPlayer,
    video: VideoLauncher,
    active: Option<ActiveKind>,
}

impl MediaBackend {
    pub fn new(config: &Config, events: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self {
            audio: AudioPlayer::new(config.playback.initial_volume, events.clone()),
            video: VideoLauncher::new(config.video.clone(), events),
            active: None,
        }
    }
}

#[async_trait(?Send)]
impl PlayerBackend for MediaBackend {
    async fn start(&mut self, item: &MediaItem, ticket: PlaybackTicket) -> BackendResult<u32> {
        // The previous handle is gone before the next one is launched
        self.stop().await?;

        let duration = if item.is_video() {
            self.video.start(item, ticket).await?
        } else {
            self.audio.start(item, ticket).await?
        };

        self.active = Some(if item.is_video() {
            ActiveKind::Video
        } else {
            ActiveKind::Audio
        });
        Ok(duration)
    }

    async fn stop(&mut self) -> BackendResult<()> {
        self.active = None;
        // Stop both sides so a failure in one never leaves the other running
        let audio = self.audio.stop().await;
        let video = self.video.stop().await;
        if let Err(e) = &audio {
            warn!("Audio stop reported: {}", e);
        }
        if let Err(e) = &video {
            warn!("Video stop reported: {}", e);
        }
        audio.and(video)
    }

    fn pause(&mut self) {
        match self.active {
            Some(ActiveKind::Audio) => self.audio.pause(),
            Some(ActiveKind::Video) => self.video.pause(),
            None => {}
        }
    }

    fn resume(&mut self) {
        match self.active {
            Some(ActiveKind::Audio) => self.audio.resume(),
            Some(ActiveKind::Video) => self.video.resume(),
            None => {}
        }
    }

    fn set_volume(&mut self, percent: u8) {
        // The audio side remembers the level for the next sink even when idle
        self.audio.set_volume(percent);
        self.video.set_volume(percent);
    }

    fn seek(&mut self, position_secs: u32) {
        match self.active {
            Some(ActiveKind::Audio) => self.audio.seek(position_secs),
            Some(ActiveKind::Video) => self.video.seek(position_secs),
            None => {}
        }
    }
}
