//! Active-Cue Selection
//!
//! Answers "which cue is showing at time `t`" for a track. Kept separate
//! from the data model because this is the one query the playback engine
//! runs every frame.

use crate::core::TimeSec;

use super::models::{CaptionTrack, Cue};

impl CaptionTrack {
    /// Returns the index of the cue active at the given time, or `None`
    /// when no cue interval contains it.
    ///
    /// Among overlapping candidates the cue with the greatest start time
    /// wins; an equal-start candidate does NOT replace an already-selected
    /// one, so exact ties keep the first cue in iteration order.
    ///
    /// This is a full scan on every call. Cue order is not assumed: an
    /// earlier-starting but longer cue can outlast a later-starting shorter
    /// one, which makes position-based or binary-search shortcuts unsafe.
    /// Callers that guarantee sorted, non-overlapping cues may layer a
    /// binary search on top as an optimization; the engine does not.
    pub fn active_cue_index_at(&self, time_sec: TimeSec) -> Option<usize> {
        let mut selected: Option<usize> = None;

        for (index, cue) in self.cues.iter().enumerate() {
            if !cue.contains(time_sec) {
                continue;
            }
            let replaces = match selected {
                Some(best) => cue.start_sec > self.cues[best].start_sec,
                None => true,
            };
            if replaces {
                selected = Some(index);
            }
        }

        selected
    }

    /// Returns the cue active at the given time, or `None`
    pub fn active_cue_at(&self, time_sec: TimeSec) -> Option<&Cue> {
        self.active_cue_index_at(time_sec).map(|i| &self.cues[i])
    }
}

// =============================================================================
// Tests
// =============================================================================
