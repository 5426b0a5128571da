//! External video playback.
//!
//! Video is never decoded in-process: the file is handed to a player program
//! picked from the session type. The child runs under a watcher task that
//! reports its exit and owns the kill path, so the event loop only ever holds
//! a cancellation handle.

use super::{BackendEvent, MediaItem, PlaybackTicket, PlayerBackend};
use crate::config::{PlayerCommand, VideoConfig};
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct RunningPlayer {
    program: String,
    cancel: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

pub struct VideoLauncher {
    config: VideoConfig,
    running: Option<RunningPlayer>,
    event_sender: mpsc::UnboundedSender<BackendEvent>,
}

impl VideoLauncher {
    pub fn new(config: VideoConfig, event_sender: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self {
            config,
            running: None,
            event_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn launch(&self, path: &Path) -> BackendResult<(Child, String)> {
        if has_desktop_environment() {
            let mut tried = Vec::new();
            for candidate in &self.config.desktop_players {
                match spawn_player(candidate, path, None) {
                    Ok(child) => return Ok((child, candidate.program.clone())),
                    Err(e) => {
                        debug!("{} unavailable: {}", candidate.program, e);
                        tried.push(candidate.program.clone());
                    }
                }
            }
            Err(BackendError::NoPlayer {
                path: path.to_path_buf(),
                tried: tried.join(", "),
            })
        } else {
            // Console session: point the player at the configured X display
            let player = &self.config.headless_player;
            let child = spawn_player(player, path, Some(&self.config.headless_display)).map_err(|source| {
                BackendError::Spawn {
                    program: player.program.clone(),
                    source,
                }
            })?;
            Ok((child, player.program.clone()))
        }
    }
}

#[async_trait(?Send)]
impl PlayerBackend for VideoLauncher {
    async fn start(&mut self, item: &MediaItem, ticket: PlaybackTicket) -> BackendResult<u32> {
        self.stop().await?;

        let (child, program) = self.launch(&item.path)?;
        info!("Launched {} for {}", program, item.path.display());

        let (cancel, cancel_rx) = oneshot::channel();
        let watcher = tokio::spawn(watch_player(
            child,
            cancel_rx,
            ticket,
            self.event_sender.clone(),
            program.clone(),
        ));

        self.running = Some(RunningPlayer {
            program,
            cancel,
            watcher,
        });

        // The external player owns the timeline
        Ok(0)
    }

    async fn stop(&mut self) -> BackendResult<()> {
        if let Some(running) = self.running.take() {
            let _ = running.cancel.send(());
            // The watcher kills and reaps the child before it finishes
            if let Err(e) = running.watcher.await {
                warn!("Watcher for {} ended abnormally: {}", running.program, e);
            }
            debug!("Stopped {}", running.program);
        }
        Ok(())
    }

    // External players expose no control channel: pause/resume stay logical
    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn set_volume(&mut self, _percent: u8) {}

    fn seek(&mut self, _position_secs: u32) {}
}

async fn watch_player(
    mut child: Child,
    cancel: oneshot::Receiver<()>,
    ticket: PlaybackTicket,
    events: mpsc::UnboundedSender<BackendEvent>,
    program: String,
) {
    tokio::select! {
        status = child.wait() => {
            let report = match status {
                Ok(status) if status.success() => {
                    debug!("{} exited", program);
                    BackendEvent::Finished(ticket)
                }
                Ok(status) => {
                    warn!("{} exited with {}", program, status);
                    BackendEvent::Failed(ticket, format!("{} exited with {}", program, status))
                }
                Err(e) => {
                    warn!("Lost track of {}: {}", program, e);
                    BackendEvent::Failed(ticket, format!("lost track of {}: {}", program, e))
                }
            };
            let _ = events.send(report);
        }
        _ = cancel => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill {}: {}", program, e);
            }
        }
    }
}

fn spawn_player(command: &PlayerCommand, path: &Path, display: Option<&str>) -> std::io::Result<Child> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    if let Some(display) = display {
        cmd.env("DISPLAY", display);
    }

    cmd.spawn()
}

/// Windows and macOS always have a desktop; elsewhere look for an X11 or Wayland session
pub fn has_desktop_environment() -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return true;
    }
    session_has_display(|key| std::env::var(key).ok())
}

fn session_has_display<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|key| lookup(key).map_or(false, |value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn command(program: &str, args: &[&str]) -> PlayerCommand {
        PlayerCommand {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn launcher_with(player: PlayerCommand) -> (VideoLauncher, mpsc::UnboundedReceiver<BackendEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = VideoConfig {
            desktop_players: vec![command("tunedeck-no-such-player", &[]), player.clone()],
            headless_player: player,
            headless_display: ":0".to_string(),
        };
        (VideoLauncher::new(config, tx), rx)
    }

    #[test]
    fn test_session_detection() {
        assert!(session_has_display(|k| (k == "DISPLAY").then(|| ":1".to_string())));
        assert!(session_has_display(|k| (k == "WAYLAND_DISPLAY").then(|| "wayland-0".to_string())));
        assert!(!session_has_display(|k| (k == "DISPLAY").then(String::new)));
        assert!(!session_has_display(|_| None));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_is_reported_with_ticket() {
        // `sh -c "exit 0" <path>` ignores the path and exits immediately
        let (mut launcher, mut rx) = launcher_with(command("sh", &["-c", "exit 0"]));
        let ticket = PlaybackTicket::default().next();
        let item = MediaItem::new("/tmp/clip.mkv".into());

        let duration = launcher.start(&item, ticket).await.unwrap();
        assert_eq!(duration, 0);

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(event, Some(BackendEvent::Finished(ticket)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_reported_as_failure() {
        let (mut launcher, mut rx) = launcher_with(command("sh", &["-c", "exit 1"]));
        let ticket = PlaybackTicket::default().next().next();
        let item = MediaItem::new("/tmp/broken.mkv".into());

        launcher.start(&item, ticket).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        match event {
            Some(BackendEvent::Failed(reported, reason)) => {
                assert_eq!(reported, ticket);
                assert!(reason.starts_with("sh exited with"), "{}", reason);
            }
            other => panic!("expected a failure report, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_kills_without_reporting_finish() {
        let (mut launcher, mut rx) = launcher_with(command("sh", &["-c", "sleep 30"]));
        let item = MediaItem::new("/tmp/clip.mkv".into());

        launcher.start(&item, PlaybackTicket::default()).await.unwrap();
        assert!(launcher.is_running());

        launcher.stop().await.unwrap();
        assert!(!launcher.is_running());
        assert!(rx.try_recv().is_err());

        // idempotent
        launcher.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_players_are_an_error() {
        let (mut launcher, _rx) = launcher_with(command("tunedeck-also-missing", &[]));
        let item = MediaItem::new("/tmp/clip.mkv".into());

        let result = launcher.start(&item, PlaybackTicket::default()).await;
        assert!(result.is_err());
        assert!(!launcher.is_running());
    }
}
