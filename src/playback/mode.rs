use serde::{Deserialize, Serialize};
use std::fmt;

/// What the transport does when a track runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    #[default]
    LoopAll,
    LoopOne,
    NoLoop,
    Random,
}

impl PlayMode {
    /// Fixed cycle order
    pub fn next(self) -> Self {
        match self {
            PlayMode::LoopAll => PlayMode::LoopOne,
            PlayMode::LoopOne => PlayMode::NoLoop,
            PlayMode::NoLoop => PlayMode::Random,
            PlayMode::Random => PlayMode::LoopAll,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayMode::LoopAll => "Loop All",
            PlayMode::LoopOne => "Loop One",
            PlayMode::NoLoop => "No Loop",
            PlayMode::Random => "Random",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
