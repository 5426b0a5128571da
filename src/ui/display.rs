use super::TerminalManager;
use crate::audio::{MediaItem, PlayerBackend};
use crate::playback::{PlayMode, TransportController, TransportState};
use anyhow::Result;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRow {
    pub label: String,
    pub selected: bool,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressView {
    Stopped,
    Running { percent: u16, label: String },
}

/// Everything the screen shows, copied out of the controller after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub info: Vec<InfoLine>,
    pub playlist: Vec<PlaylistRow>,
    /// Rows of `playlist` on the current page
    pub window: Range<usize>,
    pub progress: ProgressView,
    pub volume: u8,
    pub status: TransportState,
    pub mode: PlayMode,
    pub notice: Option<String>,
}

impl DisplayState {
    pub fn capture<B: PlayerBackend>(controller: &TransportController<B>) -> Self {
        let cursor = controller.cursor();
        let playing = controller.playing_index();

        let playlist = controller
            .catalog()
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| PlaylistRow {
                label: name.clone(),
                selected: i == cursor.index(),
                playing: playing == Some(i),
            })
            .collect();

        // Describe what plays; fall back to what is highlighted
        let subject = controller
            .playing_item()
            .or_else(|| controller.catalog().get(cursor.index()));

        let progress = match controller.state() {
            TransportState::Stopped => ProgressView::Stopped,
            TransportState::Playing | TransportState::Paused => ProgressView::Running {
                percent: controller.clock().percent(),
                label: controller.clock().label(),
            },
        };

        Self {
            info: subject.map(info_lines).unwrap_or_default(),
            playlist,
            window: cursor.visible_range(),
            progress,
            volume: controller.volume(),
            status: controller.state(),
            mode: controller.mode(),
            notice: controller.notice().map(str::to_string),
        }
    }

    pub fn status_label(&self) -> String {
        match &self.notice {
            Some(notice) => format!("{} - {}", self.status.label(), notice),
            None => self.status.label().to_string(),
        }
    }
}

fn info_lines(item: &MediaItem) -> Vec<InfoLine> {
    let Some(metadata) = &item.metadata else {
        return vec![InfoLine {
            label: "File",
            value: item.file_name(),
        }];
    };

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let number = |value: Option<String>| value.unwrap_or_default();

    let mut lines = vec![
        InfoLine { label: "Artist", value: text(&metadata.artist) },
        InfoLine { label: "Title", value: text(&metadata.title) },
        InfoLine { label: "Album", value: text(&metadata.album) },
        InfoLine { label: "Track", value: number(metadata.track.map(|t| t.to_string())) },
        InfoLine { label: "Genre", value: text(&metadata.genre) },
        InfoLine { label: "Year", value: number(metadata.year.map(|y| y.to_string())) },
    ];
    if let Some(lyrics) = &metadata.lyrics {
        lines.push(InfoLine {
            label: "Lyrics",
            value: lyrics.clone(),
        });
    }
    lines
}

/// Where display snapshots go
pub trait DisplaySink {
    fn present(&mut self, state: &DisplayState) -> Result<()>;
}

pub struct TerminalDisplay {
    terminal: TerminalManager,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: TerminalManager::new()?,
        })
    }

    /// Outer height of the playlist panel for the current terminal size
    pub fn playlist_height(&self) -> Result<u16> {
        Ok(playlist_height_for(self.terminal.size()?.height))
    }
}

impl DisplaySink for TerminalDisplay {
    fn present(&mut self, state: &DisplayState) -> Result<()> {
        self.terminal.draw(|f| render(f, state))
    }
}

/// The two legend lines sit under the panels
pub fn playlist_height_for(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(2)
}

pub fn render(f: &mut Frame, state: &DisplayState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Legend
            Constraint::Length(1), // Legend
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_left_column(f, columns[0], state);
    render_playlist(f, columns[1], state);
    render_legend(f, rows[1], rows[2], state.mode);
}

fn render_left_column(f: &mut Frame, area: Rect, state: &DisplayState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Info
            Constraint::Length(3), // Progress
            Constraint::Length(3), // Volume
        ])
        .split(area);

    let info: Vec<Line> = state
        .info
        .iter()
        .map(|line| {
            Line::from(vec![
                Span::styled(format!("{}: ", line.label), Style::default().fg(Color::Cyan)),
                Span::raw(line.value.clone()),
            ])
        })
        .collect();
    let info_widget = Paragraph::new(info)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Info"));
    f.render_widget(info_widget, chunks[0]);

    let (percent, label) = match &state.progress {
        ProgressView::Stopped => (0, "Stopped".to_string()),
        ProgressView::Running { percent, label } => (*percent, label.clone()),
    };
    let progress_widget = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(state.status_label()))
        .gauge_style(Style::default().fg(Color::Yellow))
        .percent(percent.min(100))
        .label(label);
    f.render_widget(progress_widget, chunks[1]);

    let volume_widget = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Volume"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(u16::from(state.volume));
    f.render_widget(volume_widget, chunks[2]);
}

fn render_playlist(f: &mut Frame, area: Rect, state: &DisplayState) {
    let items: Vec<ListItem> = state.playlist[state.window.clone()]
        .iter()
        .map(|row| {
            let mut style = Style::default();
            if row.playing {
                style = style.add_modifier(Modifier::BOLD);
            }
            if row.selected {
                style = style.fg(Color::Black).bg(Color::Green);
            }
            ListItem::new(row.label.clone()).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Playlist"));
    f.render_widget(list, area);
}

fn render_legend(f: &mut Frame, first: Rect, second: Rect, mode: PlayMode) {
    let key = Style::default().fg(Color::Yellow);
    let top = Line::from(vec![
        Span::styled("[Space]", key),
        Span::raw(" Pause/Resume  "),
        Span::styled("[Esc]", key),
        Span::raw(" Stop  "),
        Span::styled("[←/→]", key),
        Span::raw(" Seek  "),
        Span::styled("[m]", key),
        Span::raw(format!(" Mode: {}", mode.name())),
    ]);
    let bottom = Line::from(vec![
        Span::styled("[↑/↓]", key),
        Span::raw(" Move  "),
        Span::styled("[Enter]", key),
        Span::raw(" Play  "),
        Span::styled("[</>]", key),
        Span::raw(" Prev/Next  "),
        Span::styled("[+/-]", key),
        Span::raw(" Volume  "),
        Span::styled("[r]", key),
        Span::raw(" Refresh  "),
        Span::styled("[q]", key),
        Span::raw(" Quit"),
    ]);

    f.render_widget(Paragraph::new(top), first);
    f.render_widget(Paragraph::new(bottom), second);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MediaMetadata, PlaybackTicket};
    use crate::error::BackendResult;
    use crate::playback::Catalog;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    struct SilentBackend;

    #[async_trait(?Send)]
    impl PlayerBackend for SilentBackend {
        async fn start(&mut self, _item: &MediaItem, _ticket: PlaybackTicket) -> BackendResult<u32> {
            Ok(200)
        }

        async fn stop(&mut self) -> BackendResult<()> {
            Ok(())
        }

        fn pause(&mut self) {}

        fn resume(&mut self) {}

        fn set_volume(&mut self, _percent: u8) {}

        fn seek(&mut self, _position_secs: u32) {}
    }

    fn controller() -> TransportController<SilentBackend> {
        let tagged = MediaItem::new(PathBuf::from("/m/a.mp3")).with_metadata(MediaMetadata {
            artist: Some("Low".into()),
            title: Some("Words".into()),
            year: Some(1994),
            ..Default::default()
        });
        let untagged = MediaItem::new(PathBuf::from("/m/clips/b.mkv"));
        let catalog = Catalog::new(vec![tagged, untagged], &[PathBuf::from("/m")]).unwrap();
        TransportController::new(SilentBackend, catalog)
    }

    fn screen_text(state: &DisplayState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_exactly_one_row_is_selected() {
        let mut c = controller();
        let state = DisplayState::capture(&c);
        assert_eq!(state.playlist.iter().filter(|r| r.selected).count(), 1);
        assert!(state.playlist.iter().all(|r| !r.playing));

        c.select(1).await;
        c.cursor_up();
        let state = DisplayState::capture(&c);
        assert_eq!(state.playlist.iter().filter(|r| r.selected).count(), 1);
        assert!(state.playlist[0].selected);
        assert!(state.playlist[1].playing);
    }

    #[tokio::test]
    async fn test_info_follows_playing_item_with_fallback() {
        let mut c = controller();
        let state = DisplayState::capture(&c);
        assert_eq!(state.info[0], InfoLine { label: "Artist", value: "Low".into() });
        let album = state.info.iter().find(|l| l.label == "Album").unwrap();
        assert!(album.value.is_empty());
        assert!(state.info.iter().all(|l| l.label != "Lyrics"));

        c.select(1).await;
        c.cursor_up();
        let state = DisplayState::capture(&c);
        assert_eq!(state.info, vec![InfoLine { label: "File", value: "b.mkv".into() }]);
    }

    #[tokio::test]
    async fn test_progress_reflects_transport() {
        let mut c = controller();
        assert_eq!(DisplayState::capture(&c).progress, ProgressView::Stopped);

        c.select(0).await;
        c.tick().await;
        c.tick().await;
        let state = DisplayState::capture(&c);
        assert_eq!(
            state.progress,
            ProgressView::Running {
                percent: 1,
                label: "00:02 / 03:20".into()
            }
        );
        assert_eq!(state.status_label(), "Playing");
    }

    #[tokio::test]
    async fn test_render_shows_mode_and_names() {
        let mut c = controller();
        c.toggle_play_mode();
        let text = screen_text(&DisplayState::capture(&c));
        assert!(text.contains("Mode: Loop One"));
        assert!(text.contains("[1] Low - Words"));
        assert!(text.contains("[2] clips/b.mkv"));
        assert!(text.contains("Stopped"));
    }

    #[test]
    fn test_playlist_height_leaves_room_for_legend() {
        assert_eq!(playlist_height_for(24), 22);
        assert_eq!(playlist_height_for(1), 0);
    }
}
