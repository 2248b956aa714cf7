//! Subcue Core Engine
//!
//! Caption playback engine module. Handles the cue timeline model,
//! active-cue selection, styling, reactive settings, and the playback
//! state machine.

pub mod captions;
pub mod playback;
pub mod settings;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

// Model types are part of every caller's vocabulary; surface them here.
pub use captions::{CaptionTrack, Cue, Speaker, TimingAnchor};
