//! Caption Data Models
//!
//! Defines data structures for timed caption lines and the tracks that
//! bundle them.
//!
//! # Overview
//!
//! A [`CaptionTrack`] is the unit handed to the playback engine: an ordered
//! collection of [`Cue`] entries, each a timed line (or line pair) of text
//! with an optional [`Speaker`]. Cues are mutable while a track is being
//! authored and treated as immutable once playback starts.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{AssetId, Color, CueId, TimeSec, TrackId};

/// Reserved character separating the display lines encoded in cue content.
///
/// A cue may carry up to two display lines; segments past the second are
/// never rendered.
pub const LINE_DELIMITER: char = '|';

// =============================================================================
// Speaker
// =============================================================================

/// A speaking character associated with dialogue cues.
///
/// Cues without a speaker are non-dialogue ("closed caption") lines such as
/// ambient sound descriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    /// Display name
    pub name: String,
    /// Whether the name may be shown in front of the cue text
    #[serde(default = "default_true")]
    pub show_name: bool,
    /// Name color used when speaker colorization is enabled
    #[serde(default)]
    pub color: Color,
}

fn default_true() -> bool {
    true
}

impl Speaker {
    /// Creates a named speaker with the given color
    pub fn new(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            show_name: true,
            color,
        }
    }

    /// Hides the speaker's name during rendering
    pub fn with_hidden_name(mut self) -> Self {
        self.show_name = false;
        self
    }
}

// =============================================================================
// Cue
// =============================================================================

/// A single timed caption line with text and timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    /// Unique identifier
    pub id: CueId,
    /// Start time in seconds
    pub start_sec: TimeSec,
    /// Display duration in seconds
    pub duration_sec: TimeSec,
    /// Speaking character; `None` marks a non-dialogue line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Speaker>,
    /// Caption text; may encode two display lines separated by [`LINE_DELIMITER`]
    pub content: String,
}

impl Cue {
    /// Creates a new cue with the given timing and text.
    ///
    /// Negative or non-finite times are clamped to 0 so a malformed cue
    /// degrades instead of poisoning timeline queries.
    pub fn new(id: &str, start_sec: TimeSec, duration_sec: TimeSec, content: &str) -> Self {
        Self {
            id: id.to_string(),
            start_sec: sanitize_time(start_sec, "cue start"),
            duration_sec: sanitize_time(duration_sec, "cue duration"),
            speaker: None,
            content: content.to_string(),
        }
    }

    /// Creates a cue with auto-generated ID
    pub fn create(start_sec: TimeSec, duration_sec: TimeSec, content: &str) -> Self {
        Self::new(&ulid::Ulid::new().to_string(), start_sec, duration_sec, content)
    }

    /// Sets the speaker for this cue
    pub fn with_speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Returns the end time (start + duration) in seconds
    pub fn end_sec(&self) -> TimeSec {
        self.start_sec + self.duration_sec
    }

    /// Returns true if the cue's interval contains the given time.
    ///
    /// Both endpoints are inclusive: a cue is still active at the exact
    /// instant it ends.
    pub fn contains(&self, time_sec: TimeSec) -> bool {
        time_sec >= self.start_sec && time_sec <= self.end_sec()
    }

    /// Splits the content into its encoded display lines
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.content.split(LINE_DELIMITER)
    }
}

fn sanitize_time(value: TimeSec, what: &str) -> TimeSec {
    if !value.is_finite() || value < 0.0 {
        warn!("{} {} is invalid, clamping to 0", what, value);
        return 0.0;
    }
    value
}

// =============================================================================
// Timing Anchor
// =============================================================================

/// Reference to the media clip a track was authored against.
///
/// Used only to know the track's natural duration for authoring-time bounds;
/// playback elapsed time is driven by the host, never read from the anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingAnchor {
    /// Identifier of the associated media asset
    pub asset_id: AssetId,
    /// Natural duration of that asset in seconds
    pub duration_sec: TimeSec,
}

// =============================================================================
// Caption Track
// =============================================================================

/// An ordered collection of cues belonging to one caption-able media item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// Unique identifier
    pub id: TrackId,
    /// Timing anchor for authoring-time bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<TimingAnchor>,
    /// Cues in authoring order; call [`CaptionTrack::sort_cues`] before
    /// relying on start-time ordering
    pub cues: Vec<Cue>,
}

impl CaptionTrack {
    /// Creates an empty caption track
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            anchor: None,
            cues: vec![],
        }
    }

    /// Creates a track with auto-generated ID
    pub fn create() -> Self {
        Self::new(&ulid::Ulid::new().to_string())
    }

    /// Builds a track from sparse authoring slots, dropping absent entries.
    ///
    /// Authoring tools produce placeholder slots; filtering them here means
    /// the selector and renderer only ever see present cues.
    pub fn from_slots(slots: impl IntoIterator<Item = Option<Cue>>) -> Self {
        let mut track = Self::create();
        let mut dropped = 0usize;
        for slot in slots {
            match slot {
                Some(cue) => track.cues.push(cue),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(
                track_id = %track.id,
                dropped, "dropped empty placeholder cue slots while loading track"
            );
        }
        track
    }

    /// Sets the timing anchor
    pub fn with_anchor(mut self, anchor: TimingAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Appends a cue without re-sorting
    pub fn add_cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Sorts cues by start time (stable, ascending)
    pub fn sort_cues(&mut self) {
        self.cues.sort_by(|a, b| {
            a.start_sec
                .partial_cmp(&b.start_sec)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Returns the latest cue end time, 0 for an empty track.
    ///
    /// A max scan rather than a last-element read: cue order is only
    /// guaranteed after an explicit sort, and an early cue may outlast
    /// later ones.
    pub fn track_end(&self) -> TimeSec {
        self.cues
            .iter()
            .map(Cue::end_sec)
            .fold(0.0, TimeSec::max)
    }

    /// Returns the authoring-time bound: the anchor's natural duration when
    /// present, otherwise the computed track end
    pub fn authoring_bound(&self) -> TimeSec {
        self.anchor
            .as_ref()
            .map(|a| a.duration_sec)
            .unwrap_or_else(|| self.track_end())
    }

    /// Returns the number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns true if the track has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
