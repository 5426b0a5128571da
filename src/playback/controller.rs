use super::{Catalog, PlayMode, ProgressClock, SelectionCursor, TickOutcome, Volume};
use crate::audio::{BackendEvent, MediaItem, PlaybackTicket, PlayerBackend};
use crate::error::CatalogError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn label(self) -> &'static str {
        match self {
            TransportState::Stopped => "Stopped",
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
        }
    }
}

/// Owns the transport state machine and the one backend handle.
///
/// Every transition runs to completion before the next event is handled.
/// Backend failures are logged and kept as a notice for the status line;
/// they never escape as errors and always leave the transport Stopped.
pub struct TransportController<B> {
    backend: B,
    catalog: Catalog,
    cursor: SelectionCursor,
    playing: Option<usize>,
    state: TransportState,
    mode: PlayMode,
    clock: ProgressClock,
    volume: Volume,
    seek_step: u32,
    ticket: PlaybackTicket,
    rng: StdRng,
    notice: Option<String>,
}

impl<B: PlayerBackend> TransportController<B> {
    pub fn new(backend: B, catalog: Catalog) -> Self {
        let cursor = SelectionCursor::new(catalog.len());
        Self {
            backend,
            catalog,
            cursor,
            playing: None,
            state: TransportState::Stopped,
            mode: PlayMode::default(),
            clock: ProgressClock::new(),
            volume: Volume::default(),
            seek_step: 10,
            ticket: PlaybackTicket::default(),
            rng: StdRng::from_entropy(),
            notice: None,
        }
    }

    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self.backend.set_volume(volume.percent());
        self
    }

    pub fn with_seek_step(mut self, seconds: u32) -> Self {
        self.seek_step = seconds;
        self
    }

    /// Fixed seed for the Random play mode
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn playing_index(&self) -> Option<usize> {
        self.playing
    }

    pub fn playing_item(&self) -> Option<&MediaItem> {
        self.playing.and_then(|i| self.catalog.get(i))
    }

    pub fn cursor(&self) -> &SelectionCursor {
        &self.cursor
    }

    pub fn clock(&self) -> &ProgressClock {
        &self.clock
    }

    pub fn position(&self) -> u32 {
        self.clock.position()
    }

    pub fn duration(&self) -> u32 {
        self.clock.duration()
    }

    pub fn volume(&self) -> u8 {
        self.volume.percent()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Changes whenever a backend handle is started or stopped
    pub fn ticket(&self) -> PlaybackTicket {
        self.ticket
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Stop whatever plays, bind `index` for playback and start it.
    /// Returns whether the transport ended up Playing.
    pub async fn select(&mut self, index: usize) -> bool {
        let Some(item) = self.catalog.get(index).cloned() else {
            warn!("Ignoring select of index {} (catalog has {})", index, self.catalog.len());
            return false;
        };

        self.halt_backend().await;
        self.ticket = self.ticket.next();
        self.playing = Some(index);
        self.cursor.set(index);
        self.clock.restart(0);
        self.state = TransportState::Stopped;

        match self.backend.start(&item, self.ticket).await {
            Ok(duration) => {
                self.clock.restart(duration);
                self.backend.set_volume(self.volume.percent());
                self.state = TransportState::Playing;
                self.notice = None;
                info!("Playing [{}] {} ({}s)", index + 1, item.path.display(), duration);
                true
            }
            Err(e) => {
                warn!("Could not start {}: {}", item.path.display(), e);
                self.notice = Some(format!("Cannot play {}: {}", item.file_name(), e));
                false
            }
        }
    }

    /// Play whatever the cursor points at
    pub async fn play_selected(&mut self) -> bool {
        self.select(self.cursor.index()).await
    }

    pub fn pause(&mut self) -> bool {
        if self.state != TransportState::Playing {
            return false;
        }
        self.backend.pause();
        self.state = TransportState::Paused;
        debug!("Paused at {}s", self.clock.position());
        true
    }

    /// Clock-only when the backend cannot suspend; the handle is never restarted
    pub fn resume(&mut self) -> bool {
        if self.state != TransportState::Paused {
            return false;
        }
        self.backend.resume();
        self.state = TransportState::Playing;
        debug!("Resumed at {}s", self.clock.position());
        true
    }

    /// Pause/resume; from Stopped, restart the bound item if there is one
    pub async fn toggle_pause(&mut self) {
        match self.state {
            TransportState::Playing => {
                self.pause();
            }
            TransportState::Paused => {
                self.resume();
            }
            TransportState::Stopped => {
                if let Some(index) = self.playing {
                    self.select(index).await;
                }
            }
        }
    }

    pub async fn stop(&mut self) -> bool {
        if self.state == TransportState::Stopped {
            return false;
        }
        self.halt_backend().await;
        // Late completion reports from the old handle must not restart anything
        self.ticket = self.ticket.next();
        self.clock.reset();
        self.state = TransportState::Stopped;
        debug!("Stopped");
        true
    }

    /// Relative seek in seconds; needs a bound item
    pub fn seek(&mut self, delta: i64) -> bool {
        if self.playing.is_none() {
            return false;
        }
        let position = self.clock.seek_by(delta);
        self.backend.seek(position);
        true
    }

    pub fn seek_forward(&mut self) -> bool {
        self.seek(i64::from(self.seek_step))
    }

    pub fn seek_backward(&mut self) -> bool {
        self.seek(-i64::from(self.seek_step))
    }

    /// One second of wall clock while Playing
    pub async fn tick(&mut self) {
        if self.state != TransportState::Playing {
            return;
        }
        if self.clock.advance() == TickOutcome::Ended {
            self.end_of_track().await;
        }
    }

    pub async fn end_of_track(&mut self) {
        let Some(current) = self.playing else {
            return;
        };
        let len = self.catalog.len();
        debug!("End of track {} under {}", current, self.mode);

        match self.mode {
            PlayMode::LoopAll => {
                self.select((current + 1) % len).await;
            }
            PlayMode::LoopOne => {
                self.select(current).await;
            }
            PlayMode::NoLoop => {
                if current + 1 >= len {
                    self.stop().await;
                } else {
                    self.select(current + 1).await;
                }
            }
            PlayMode::Random => {
                let next = self.random_index(current);
                self.select(next).await;
            }
        }
    }

    /// Uniform over every other index; a single-item catalog replays itself
    fn random_index(&mut self, current: usize) -> usize {
        let len = self.catalog.len();
        if len <= 1 {
            return 0;
        }
        let pick = self.rng.gen_range(0..len - 1);
        if pick >= current {
            pick + 1
        } else {
            pick
        }
    }

    pub async fn on_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Finished(ticket) => {
                if ticket != self.ticket || self.state == TransportState::Stopped {
                    debug!("Ignoring completion of a replaced handle");
                    return;
                }
                self.end_of_track().await;
            }
            BackendEvent::Failed(ticket, reason) => {
                if ticket != self.ticket || self.state == TransportState::Stopped {
                    debug!("Ignoring failure of a replaced handle: {}", reason);
                    return;
                }
                self.abandon_playback(reason).await;
            }
        }
    }

    /// The running handle died: same outcome as a failed start, and the
    /// play mode is not consulted so a broken item is never retried on its own
    async fn abandon_playback(&mut self, reason: String) {
        let name = self.playing_item().map(MediaItem::file_name).unwrap_or_default();
        warn!("Playback of {} failed: {}", name, reason);

        self.halt_backend().await;
        self.ticket = self.ticket.next();
        self.clock.reset();
        self.state = TransportState::Stopped;
        self.notice = Some(format!("Cannot play {}: {}", name, reason));
    }

    pub fn volume_up(&mut self) -> u8 {
        let level = self.volume.up();
        self.backend.set_volume(level);
        level
    }

    pub fn volume_down(&mut self) -> u8 {
        let level = self.volume.down();
        self.backend.set_volume(level);
        level
    }

    pub fn toggle_play_mode(&mut self) -> PlayMode {
        self.mode = self.mode.next();
        info!("Play mode: {}", self.mode);
        self.mode
    }

    pub fn cursor_up(&mut self) -> bool {
        self.cursor.move_up()
    }

    pub fn cursor_down(&mut self) -> bool {
        self.cursor.move_down()
    }

    /// Step the cursor back one row and play it; nothing happens at the top
    pub async fn previous(&mut self) -> bool {
        if self.cursor.move_up() {
            self.play_selected().await
        } else {
            false
        }
    }

    pub async fn next(&mut self) -> bool {
        if self.cursor.move_down() {
            self.play_selected().await
        } else {
            false
        }
    }

    pub fn set_viewport_height(&mut self, height: u16) {
        self.cursor.set_viewport_height(height);
    }

    /// Swap in a rescanned catalog. The playing item is located again by path;
    /// when it is gone playback stops and the cursor returns to the top.
    pub async fn replace_catalog(&mut self, catalog: Catalog) {
        let playing_path = self.playing_item().map(|item| item.path.clone());
        self.catalog = catalog;
        self.cursor.resize(self.catalog.len());

        match playing_path.and_then(|path| self.catalog.position_of(&path)) {
            Some(index) => {
                self.playing = Some(index);
                self.cursor.set(index);
            }
            None => {
                self.stop().await;
                self.playing = None;
                self.cursor.set(0);
            }
        }
        info!("Catalog replaced: {} items", self.catalog.len());
    }

    /// Apply the outcome of a rescan. A failed scan keeps the current catalog
    /// and playback untouched and only leaves a notice.
    pub async fn apply_rescan(&mut self, rescan: Result<Catalog, CatalogError>) {
        match rescan {
            Ok(catalog) => self.replace_catalog(catalog).await,
            Err(e) => {
                warn!("Refresh failed, keeping the current catalog: {}", e);
                self.notice = Some(format!("Refresh failed: {}", e));
            }
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Terminate any backend handle before the process exits
    pub async fn shutdown(&mut self) {
        self.halt_backend().await;
        self.state = TransportState::Stopped;
    }

    async fn halt_backend(&mut self) {
        if let Err(e) = self.backend.stop().await {
            warn!("Backend stop failed: {}", e);
        }
    }
}
