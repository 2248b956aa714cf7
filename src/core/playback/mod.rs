//! Caption Playback Module
//!
//! The stateful half of the engine:
//! - [`PlaybackController`] — the priority-preempting state machine driven
//!   by host frame ticks
//! - [`CaptionService`] — a façade over one lazily-built controller plus
//!   the pending-cue countdown queue
//!
//! # Architecture
//!
//! ```text
//! host render loop ──tick(dt)──▶ CaptionService ──▶ PlaybackController
//!                                                      │        │
//!                                  SettingsStore ◀─subscribe    │select/style
//!                                                               ▼
//!                                                       CaptionSurfaces
//! ```
//!
//! Single-threaded and cooperative: no internal threads, async, or locking.
//! Every operation is expected on the same logical thread as the tick loop.

mod controller;
mod service;

pub use controller::{
    BufferedSurfaces, CaptionSurfaces, PlayOutcome, PlaybackController, PlaybackState,
    SurfaceState,
};
pub use service::CaptionService;
