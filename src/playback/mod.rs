// Playback core - the single source of truth for what plays, where, how loud
// and what happens when a track ends. Everything here runs on the event loop thread.

pub mod catalog;    // ordered, immutable list of media for the session
pub mod clock;      // 1 Hz position estimate
pub mod controller; // transport state machine
pub mod cursor;     // browse pointer + page window
pub mod mode;       // repeat policies
pub mod volume;     // 0..=100 in steps of 5

pub use catalog::Catalog;
pub use clock::{format_time, ProgressClock, TickOutcome};
pub use controller::{TransportController, TransportState};
pub use cursor::SelectionCursor;
pub use mode::PlayMode;
pub use volume::Volume;
