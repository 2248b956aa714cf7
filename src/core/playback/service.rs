//! Caption Playback Service
//!
//! Thin façade over a single lazily-constructed [`PlaybackController`].
//! Hosts that don't want to manage the controller lifecycle hold one
//! `CaptionService` and forward their media events to it.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::captions::{CaptionTrack, Cue};
use crate::core::settings::SettingsStore;
use crate::core::TimeSec;

use super::controller::{BufferedSurfaces, CaptionSurfaces, PlayOutcome, PlaybackController};

/// Process-wide caption playback façade.
///
/// The controller is built on the first play request; queries before that
/// answer as idle without building anything. The service also owns a
/// pending-cue FIFO that external callers may fill to drive a "time
/// remaining" countdown display — nothing in the playback flow itself
/// populates or drains it.
pub struct CaptionService {
    settings: Rc<SettingsStore>,
    surfaces: Option<Box<dyn CaptionSurfaces>>,
    controller: Option<PlaybackController>,
    pending: VecDeque<Cue>,
}

impl CaptionService {
    /// Creates a service that will wire its controller to the given
    /// settings store and render surfaces on first use
    pub fn new(settings: Rc<SettingsStore>, surfaces: Box<dyn CaptionSurfaces>) -> Self {
        Self {
            settings,
            surfaces: Some(surfaces),
            controller: None,
            pending: VecDeque::new(),
        }
    }

    fn controller(&mut self) -> &mut PlaybackController {
        let settings = &self.settings;
        let surfaces = &mut self.surfaces;
        self.controller.get_or_insert_with(|| {
            let surfaces = surfaces
                .take()
                .unwrap_or_else(|| Box::new(BufferedSurfaces::default()));
            PlaybackController::new(Rc::clone(settings), surfaces)
        })
    }

    /// Requests playback of a track at the given priority
    pub fn play(&mut self, track: Option<CaptionTrack>, priority: i32) -> PlayOutcome {
        self.controller().play(track, priority)
    }

    /// Pauses time advancement of the current track, if any
    pub fn pause(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.pause();
        }
    }

    /// Resumes time advancement of the current track, if any
    pub fn unpause(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.unpause();
        }
    }

    /// Stops the current track unconditionally
    pub fn stop(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.stop();
        }
    }

    /// Advances playback by one host frame
    pub fn tick(&mut self, delta_sec: TimeSec) {
        if let Some(controller) = self.controller.as_mut() {
            controller.tick(delta_sec);
        }
    }

    /// Returns true iff a track is currently playing (paused or not)
    pub fn is_playing(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(PlaybackController::is_playing)
    }

    /// Pushes a cue onto the pending countdown queue
    pub fn enqueue_pending(&mut self, cue: Cue) {
        self.pending.push_back(cue);
    }

    /// Empties the pending countdown queue
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Returns the total duration in seconds until everything in the
    /// pending queue would have been shown, independent of the active track
    pub fn remaining_duration(&self) -> TimeSec {
        self.pending.iter().map(|cue| cue.duration_sec).sum()
    }
}

// =============================================================================
// Tests
// =============================================================================
