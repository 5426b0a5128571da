// TuneDeck Library - core modules for the terminal media player
// The transport controller is the only stateful piece; everything around it is thin I/O

pub mod audio;    // media model, directory scanning, player backends
pub mod config;   // settings and defaults
pub mod error;    // typed errors for scan/catalog/backend failures
pub mod playback; // transport state machine, cursor, clock, volume
pub mod ui;       // terminal interface

// Export the stuff other modules actually use
pub use audio::{BackendEvent, MediaBackend, MediaItem, MediaMetadata, MediaScanner, PlayerBackend};
pub use config::Config;
pub use playback::{Catalog, PlayMode, TransportController, TransportState};
