//! Caption Styling Pipeline
//!
//! Pure functions turning a cue plus presentation switches into two
//! renderable strings: the plain marked-up content and a background-plate
//! variant for a second text surface layered behind it.
//!
//! The markup dialect is the renderer's inline rich-text tag format:
//! `<color=#RRGGBB>…</color>` for text tinting and
//! `<mark=#RRGGBBAA …>…</mark>` for the highlight plate. The text widget
//! collaborator owns actual glyph rendering.

use crate::core::Color;

use super::models::{Cue, Speaker};

/// Text color for non-dialogue ("closed caption") lines.
///
/// Fixed and intentionally distinct from any speaker color; the speaker
/// colorization toggle has no effect on it.
pub const NON_DIALOGUE_COLOR: Color = Color::gray();

/// Background-plate color behind caption text
pub const HIGHLIGHT_COLOR: Color = Color::black();

/// Fixed padding metadata carried by the background-plate markup
const MARK_PADDING: &str = "50, 50, 20, 20";

// =============================================================================
// Markup helpers
// =============================================================================

/// Wraps text in a color tag; empty input stays empty
pub fn wrap_in_color(text: &str, color: Color) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("<color=#{}>{}</color>", color.to_hex_rgb(), text)
}

/// Wraps text in a highlight tag with the color at the given 0..1 alpha;
/// empty input stays empty
pub fn wrap_in_mark(text: &str, color: Color, alpha: f64, padding: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let hex = color.with_alpha(alpha).to_hex_rgba();
    let padding = if padding {
        format!(" padding=\"{MARK_PADDING}\"")
    } else {
        String::new()
    };
    format!("<mark=#{hex}{padding}>{text}</mark>")
}

fn wrap_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    format!("{name}:")
}

// =============================================================================
// Cue styling
// =============================================================================

/// Builds the speaker label shown in front of a cue's first line.
///
/// Empty when the cue has no speaker, the speaker hides its name, or the
/// host has speaker names switched off. Otherwise `"Name:"`, wrapped in the
/// speaker's color iff `colorize`, with a trailing space.
pub fn speaker_label(speaker: Option<&Speaker>, show_names: bool, colorize: bool) -> String {
    let Some(speaker) = speaker else {
        return String::new();
    };
    if !show_names || !speaker.show_name {
        return String::new();
    }

    let mut label = wrap_name(&speaker.name);
    if colorize {
        label = wrap_in_color(&label, speaker.color);
    }
    if !label.is_empty() {
        label.push(' ');
    }
    label
}

/// Wraps one display line for rendering.
///
/// Dialogue lines pass through unchanged. Non-dialogue lines are bracketed
/// and tinted with [`NON_DIALOGUE_COLOR`] so audio descriptions read
/// differently from speech.
pub fn wrap_content(text: &str, speaker: Option<&Speaker>) -> String {
    match speaker {
        Some(_) => text.to_string(),
        None => wrap_in_color(&format!("[{text}]"), NON_DIALOGUE_COLOR),
    }
}

/// Renders a cue into its final marked-up form.
///
/// The speaker label precedes the first display line; a second line, when
/// encoded, follows on its own row without repeating the label. Any lines
/// past the second are dropped.
pub fn styled_content(cue: &Cue, show_speaker: bool, colorize_speaker: bool) -> String {
    let label = speaker_label(cue.speaker.as_ref(), show_speaker, colorize_speaker);

    let mut lines = cue.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };

    let mut styled = label;
    styled.push_str(&wrap_content(first, cue.speaker.as_ref()));
    if let Some(second) = lines.next() {
        styled.push('\n');
        styled.push_str(&wrap_content(second, cue.speaker.as_ref()));
    }
    styled
}

/// Authoring-preview variant: label always shown and colorized, content
/// rendered as a single run without line splitting.
pub fn styled_content_inline(cue: &Cue) -> String {
    let speaker = cue.speaker.as_ref();
    let name = match speaker {
        Some(s) if s.show_name => s.name.as_str(),
        _ => "",
    };
    let color = speaker.map(|s| s.color).unwrap_or(NON_DIALOGUE_COLOR);

    let mut label = wrap_in_color(&wrap_name(name), color);
    if !label.is_empty() {
        label.push(' ');
    }
    label + &wrap_content(&cue.content, speaker)
}

/// Wraps already-styled text in the background-plate markup using the fixed
/// highlight color at the given 0..1 alpha; empty input stays empty
pub fn with_background_highlight(styled: &str, alpha: f64) -> String {
    wrap_in_mark(styled, HIGHLIGHT_COLOR, alpha, true)
}

// =============================================================================
// Tests
// =============================================================================
