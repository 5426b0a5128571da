use super::display::playlist_height_for;
use super::{AppEvent, DisplaySink, DisplayState, EventHandler, TerminalDisplay};
use crate::audio::{BackendEvent, MediaBackend, MediaScanner};
use crate::config::Config;
use crate::playback::{Catalog, TransportController, TransportState, Volume};
use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct App {
    controller: TransportController<MediaBackend>,
    display: TerminalDisplay,
    event_handler: EventHandler,
    scanner: MediaScanner,
    roots: Vec<PathBuf>,
    should_quit: bool,
}

impl App {
    /// Takes over the terminal. `roots` are kept for Refresh.
    pub fn new(config: &Config, catalog: Catalog, roots: Vec<PathBuf>, scanner: MediaScanner) -> Result<Self> {
        let (backend_tx, backend_rx) = mpsc::unbounded_channel::<BackendEvent>();
        let backend = MediaBackend::new(config, backend_tx);

        let mut controller = TransportController::new(backend, catalog)
            .with_mode(config.playback.initial_mode)
            .with_volume(Volume::new(config.playback.initial_volume))
            .with_seek_step(config.playback.seek_step_secs);

        let display = TerminalDisplay::new()?;
        controller.set_viewport_height(display.playlist_height()?);

        Ok(Self {
            controller,
            display,
            event_handler: EventHandler::new(backend_rx),
            scanner,
            roots,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.present()?;

        while !self.should_quit {
            let event = match self.event_handler.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    info!("Terminal input closed");
                    break;
                }
                Err(e) => {
                    warn!("Terminal input failed: {}", e);
                    break;
                }
            };

            self.handle_event(event).await;
            self.present()?;
        }

        self.controller.shutdown().await;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let state = DisplayState::capture(&self.controller);
        self.display.present(&state)
    }

    async fn handle_event(&mut self, event: AppEvent) {
        let ticket = self.controller.ticket();

        match event {
            AppEvent::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
            AppEvent::Refresh => self.refresh().await,
            AppEvent::PauseResume => self.controller.toggle_pause().await,
            AppEvent::SeekForward => {
                self.controller.seek_forward();
            }
            AppEvent::SeekBackward => {
                self.controller.seek_backward();
            }
            AppEvent::Stop => {
                self.controller.stop().await;
            }
            AppEvent::Select => {
                self.controller.play_selected().await;
            }
            AppEvent::Previous => {
                self.controller.previous().await;
            }
            AppEvent::Next => {
                self.controller.next().await;
            }
            AppEvent::TogglePlayMode => {
                self.controller.toggle_play_mode();
            }
            AppEvent::CursorUp => {
                self.controller.cursor_up();
            }
            AppEvent::CursorDown => {
                self.controller.cursor_down();
            }
            AppEvent::VolumeUp => {
                self.controller.volume_up();
            }
            AppEvent::VolumeDown => {
                self.controller.volume_down();
            }
            AppEvent::Resize(width, height) => {
                debug!("Resized to {}x{}", width, height);
                self.controller.set_viewport_height(playlist_height_for(height));
            }
            AppEvent::Tick => self.controller.tick().await,
            AppEvent::Backend(report) => self.controller.on_backend_event(report).await,
        }

        // A fresh start counts its first second from now, not from the last tick
        if self.controller.ticket() != ticket && self.controller.state() == TransportState::Playing {
            self.event_handler.restart_clock();
        }
    }

    async fn refresh(&mut self) {
        let scanner = self.scanner.clone();
        let roots = self.roots.clone();
        let rescan = tokio::task::spawn_blocking(move || scanner.build_catalog(&roots)).await;

        match rescan {
            Ok(result) => self.controller.apply_rescan(result).await,
            Err(e) => {
                warn!("Refresh task failed: {}", e);
                self.controller.set_notice("Refresh failed");
            }
        }
    }
}
