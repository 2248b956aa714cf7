//! Caption System Module
//!
//! Provides the caption data model and the pure pieces of the playback
//! engine:
//! - Cue/track data structures (`Cue`, `Speaker`, `CaptionTrack`)
//! - Active-cue selection over a track timeline
//! - The styling pipeline turning a cue into marked-up render text
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       Caption System                           │
//! ├────────────────────────────────────────────────────────────────┤
//! │  models.rs   - Data structures (Cue, Speaker, CaptionTrack)    │
//! │  select.rs   - Active-cue selection at an elapsed time         │
//! │  style.rs    - Cue -> marked-up text styling pipeline          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in this module is side-effect free; state lives in the
//! playback controller.

mod models;
mod select;
pub mod style;

// Re-export models
pub use models::{CaptionTrack, Cue, Speaker, TimingAnchor, LINE_DELIMITER};
