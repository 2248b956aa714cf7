//! Subcue — Accessibility Caption Playback Engine
//!
//! Renders subtitle / closed-caption text synchronized to a playing media
//! clip, with priority-based interruption and speaker-aware styling. The
//! engine owns the cue timeline model, active-cue selection, the
//! priority-preemption state machine, and the styling pipeline; the host
//! owns the clock (frame deltas), audio playback, and glyph rendering.
//!
//! # Quick start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use subcue::core::playback::{BufferedSurfaces, CaptionService};
//! use subcue::core::settings::SettingsStore;
//! use subcue::core::{CaptionTrack, Color, Cue, Speaker};
//!
//! let settings = Rc::new(SettingsStore::new());
//! let surfaces = Rc::new(RefCell::new(BufferedSurfaces::default()));
//! let mut service = CaptionService::new(Rc::clone(&settings), Box::new(Rc::clone(&surfaces)));
//!
//! let mut track = CaptionTrack::create();
//! track.add_cue(
//!     Cue::create(0.0, 2.0, "Hi|there").with_speaker(Speaker::new("Alice", Color::rgb(255, 0, 0))),
//! );
//!
//! service.play(Some(track), 0);
//! service.tick(1.0); // once per host frame
//! assert!(surfaces.borrow().content.visible);
//! ```
//!
//! # Threading
//!
//! The engine is single-threaded and cooperative: drive every call from
//! the same logical thread as the tick loop. Settings change notifications
//! are dispatched synchronously and may re-enter the store.

pub mod core;
