pub const VOLUME_STEP: u8 = 5;
pub const MAX_VOLUME: u8 = 100;

/// Output level in percent, always on the 5-step grid within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume(u8);

impl Volume {
    /// Clamp to 100 and round down onto the step grid
    pub fn new(percent: u8) -> Self {
        let clamped = percent.min(MAX_VOLUME);
        Self(clamped - clamped % VOLUME_STEP)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn up(&mut self) -> u8 {
        self.0 = (self.0 + VOLUME_STEP).min(MAX_VOLUME);
        self.0
    }

    pub fn down(&mut self) -> u8 {
        self.0 = self.0.saturating_sub(VOLUME_STEP);
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(MAX_VOLUME)
    }
}
