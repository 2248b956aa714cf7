//! Subcue Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Cue unique identifier (ULID)
pub type CueId = String;

/// Caption track unique identifier (ULID)
pub type TrackId = String;

/// External media asset identifier
pub type AssetId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

// =============================================================================
// Color
// =============================================================================

/// RGBA color value (0-255 for each component)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a new color from RGBA components
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from RGB components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// White color
    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Black color
    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Mid gray, used for non-dialogue caption text
    pub const fn gray() -> Self {
        Self::rgb(128, 128, 128)
    }

    /// Converts to hex string without alpha (e.g., "FFFFFF")
    pub fn to_hex_rgb(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Converts to hex string with alpha (e.g., "FFFFFF80")
    pub fn to_hex_rgba(&self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Returns a copy with the alpha channel set from a 0..1 fraction.
    ///
    /// Non-finite fractions collapse to 0 (fully transparent), out-of-range
    /// values are clamped.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            a: (alpha * 255.0).round() as u8,
            ..self
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_creation() {
        let color = Color::rgba(255, 128, 64, 200);
        assert_eq!(color.r, 255);
        assert_eq!(color.g, 128);
        assert_eq!(color.b, 64);
        assert_eq!(color.a, 200);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::white().to_hex_rgb(), "FFFFFF");
        assert_eq!(Color::rgba(255, 0, 0, 128).to_hex_rgba(), "FF000080");
        // RGB conversion ignores alpha entirely
        assert_eq!(Color::rgba(255, 0, 0, 128).to_hex_rgb(), "FF0000");
    }

    #[test]
    fn test_with_alpha() {
        let half = Color::black().with_alpha(0.5);
        assert_eq!(half.a, 128);
        assert_eq!(half.to_hex_rgba(), "00000080");

        assert_eq!(Color::white().with_alpha(0.0).a, 0);
        assert_eq!(Color::white().with_alpha(1.0).a, 255);
    }

    #[test]
    fn test_with_alpha_clamps_invalid() {
        assert_eq!(Color::white().with_alpha(2.0).a, 255);
        assert_eq!(Color::white().with_alpha(-1.0).a, 0);
        assert_eq!(Color::white().with_alpha(f64::NAN).a, 0);
        assert_eq!(Color::white().with_alpha(f64::INFINITY).a, 0);
    }

    #[test]
    fn test_color_serialization() {
        let color = Color::rgb(10, 20, 30);
        let json = serde_json::to_string(&color).unwrap();
        let parsed: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, color);
    }
}
