use crate::audio::BackendEvent;
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const TICK_RATE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // Session
    Quit,
    Refresh,

    // Transport
    PauseResume,
    SeekForward,
    SeekBackward,
    Stop,
    Select,
    Previous,
    Next,
    TogglePlayMode,

    // Navigation
    CursorUp,
    CursorDown,

    // Volume
    VolumeUp,
    VolumeDown,

    // Sources other than the keyboard
    Resize(u16, u16),
    Tick,
    Backend(BackendEvent),
}

/// Merges keyboard input, the 1-second tick and backend reports into one
/// serial stream. Only one event is handed out at a time, so the consumer
/// finishes each transition before the next one is produced.
pub struct EventHandler {
    input: EventStream,
    ticker: Interval,
    backend_events: mpsc::UnboundedReceiver<BackendEvent>,
}

impl EventHandler {
    pub fn new(backend_events: mpsc::UnboundedReceiver<BackendEvent>) -> Self {
        Self {
            input: EventStream::new(),
            ticker: new_ticker(),
            backend_events,
        }
    }

    /// Next event for the loop; `None` once the terminal input is closed
    pub async fn next_event(&mut self) -> Result<Option<AppEvent>> {
        loop {
            tokio::select! {
                _ = self.ticker.tick() => return Ok(Some(AppEvent::Tick)),
                Some(report) = self.backend_events.recv() => {
                    return Ok(Some(AppEvent::Backend(report)));
                }
                input = self.input.next() => {
                    match input {
                        Some(Ok(event)) => {
                            if let Some(app_event) = terminal_to_app_event(event) {
                                return Ok(Some(app_event));
                            }
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    /// Line the next tick up one full period from now, used when a new item starts
    pub fn restart_clock(&mut self) {
        self.ticker.reset();
    }
}

fn new_ticker() -> Interval {
    let mut ticker = time::interval_at(Instant::now() + TICK_RATE, TICK_RATE);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn terminal_to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_app_event(key),
        Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
        _ => None,
    }
}

pub fn key_to_app_event(key: KeyEvent) -> Option<AppEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(AppEvent::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(AppEvent::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(AppEvent::Refresh),

        // Transport
        KeyCode::Char(' ') => Some(AppEvent::PauseResume),
        KeyCode::Right => Some(AppEvent::SeekForward),
        KeyCode::Left => Some(AppEvent::SeekBackward),
        KeyCode::Esc => Some(AppEvent::Stop),
        KeyCode::Enter => Some(AppEvent::Select),
        KeyCode::Char('<') | KeyCode::Char(',') => Some(AppEvent::Previous),
        KeyCode::Char('>') | KeyCode::Char('.') => Some(AppEvent::Next),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(AppEvent::TogglePlayMode),

        // Navigation
        KeyCode::Up => Some(AppEvent::CursorUp),
        KeyCode::Down => Some(AppEvent::CursorDown),

        // Volume
        KeyCode::Char('=') | KeyCode::Char('+') => Some(AppEvent::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(AppEvent::VolumeDown),

        _ => None,
    }
}
