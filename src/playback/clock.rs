/// Local estimate of the playback position, advanced by the 1-second tick.
///
/// It never talks to the backend, so drift against the real stream is
/// expected. A duration of 0 means the length is unknown; the clock still
/// counts but never reports the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressClock {
    position: u32,
    duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Ended,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over for a freshly started item
    pub fn restart(&mut self, duration: u32) {
        self.position = 0;
        self.duration = duration;
    }

    /// Back to zero, keeping the known duration
    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn has_duration(&self) -> bool {
        self.duration > 0
    }

    pub fn advance(&mut self) -> TickOutcome {
        self.position = self.position.saturating_add(1);
        if self.has_duration() && self.position >= self.duration {
            TickOutcome::Ended
        } else {
            TickOutcome::Running
        }
    }

    /// Move by `delta` seconds, clamped to 0 and to the duration when known.
    /// Returns the new absolute position.
    pub fn seek_by(&mut self, delta: i64) -> u32 {
        let upper = if self.has_duration() {
            i64::from(self.duration)
        } else {
            i64::from(u32::MAX)
        };
        let target = (i64::from(self.position) + delta).clamp(0, upper);
        self.position = target as u32;
        self.position
    }

    /// Position as shown on screen; never past the end of a known duration
    pub fn displayed_position(&self) -> u32 {
        if self.has_duration() {
            self.position.min(self.duration)
        } else {
            self.position
        }
    }

    pub fn percent(&self) -> u16 {
        if !self.has_duration() {
            return 0;
        }
        (u64::from(self.displayed_position()) * 100 / u64::from(self.duration)) as u16
    }

    /// "MM:SS / MM:SS", with "--:--" for an unknown duration
    pub fn label(&self) -> String {
        let total = if self.has_duration() {
            format_time(self.duration)
        } else {
            "--:--".to_string()
        };
        format!("{} / {}", format_time(self.displayed_position()), total)
    }
}

pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
