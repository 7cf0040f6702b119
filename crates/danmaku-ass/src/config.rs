//! Run configuration.
//!
//! [`CanvasConfig`] is the user-facing, serde-friendly form. It is validated
//! once into a [`Canvas`], which stays read-only for the whole run.

use serde::{Deserialize, Serialize};

use crate::comment::DisplayMode;
use crate::error::{DanmakuError, Result};
use crate::format::{ZoomFactor, color_to_hex, color_to_hex_legacy, fit_canvas};

/// Bilibili player size (2021 flex layout) that positioned comments are
/// authored against.
pub const BILIBILI_PLAYER_SIZE: (u32, u32) = (891, 589);

/// Font size comments are authored against; a comment of size 25 renders at
/// the configured font size.
pub const REFERENCE_FONT_SIZE: f64 = 25.0;

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_font_face() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f64 {
    REFERENCE_FONT_SIZE
}

fn default_alpha() -> f64 {
    1.0
}

fn default_duration() -> f64 {
    5.0
}

/// Configuration for a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Stage width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Stage height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Blank margin kept free at the bottom of the stage
    #[serde(default)]
    pub reserve_blank: u32,

    /// Font face written into the style line
    #[serde(default = "default_font_face")]
    pub font_face: String,

    /// Font size of a normal-sized comment
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Text opacity, 1.0 is fully opaque
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Seconds a scrolling comment takes to cross the stage
    #[serde(default = "default_duration")]
    pub duration_marquee: f64,

    /// Seconds a top/bottom comment stays on screen
    #[serde(default = "default_duration")]
    pub duration_still: f64,

    /// Drop comments instead of overlapping them when the stage is full
    #[serde(default)]
    pub reduced: bool,

    /// Render the style in bold
    #[serde(default)]
    pub bold: bool,

    /// Apply the historical color correction matrix on large canvases
    #[serde(default)]
    pub legacy_color_matrix: bool,

    /// Regular expression; comments whose text matches are rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_filter: Option<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            reserve_blank: 0,
            font_face: default_font_face(),
            font_size: default_font_size(),
            alpha: default_alpha(),
            duration_marquee: default_duration(),
            duration_still: default_duration(),
            reduced: false,
            bold: false,
            legacy_color_matrix: false,
            comment_filter: None,
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the configuration and freeze it into a [`Canvas`].
    pub fn build(&self) -> Result<Canvas> {
        if self.width == 0 || self.height == 0 {
            return Err(DanmakuError::invalid_canvas(format!(
                "stage size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.reserve_blank >= self.height {
            return Err(DanmakuError::invalid_canvas(format!(
                "reserved blank {} leaves no room on a stage {} high",
                self.reserve_blank, self.height
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(DanmakuError::invalid_canvas(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(DanmakuError::invalid_canvas(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        for (name, value) in [
            ("duration_marquee", self.duration_marquee),
            ("duration_still", self.duration_still),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DanmakuError::invalid_canvas(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        Ok(Canvas {
            width: self.width,
            height: self.height,
            reserve_blank: self.reserve_blank,
            font_face: self.font_face.clone(),
            font_size: self.font_size,
            alpha: self.alpha,
            duration_marquee: self.duration_marquee,
            duration_still: self.duration_still,
            reduced: self.reduced,
            bold: self.bold,
            legacy_color_matrix: self.legacy_color_matrix,
            zoom: fit_canvas(BILIBILI_PLAYER_SIZE, (self.width, self.height)),
        })
    }
}

/// Axis selector for [`Canvas::project_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Validated, immutable canvas for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    reserve_blank: u32,
    font_face: String,
    font_size: f64,
    alpha: f64,
    duration_marquee: f64,
    duration_still: f64,
    reduced: bool,
    bold: bool,
    legacy_color_matrix: bool,
    zoom: ZoomFactor,
}

impl Canvas {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn reserve_blank(&self) -> u32 {
        self.reserve_blank
    }

    /// Rows available to comments: stage height minus the reserved margin.
    pub fn usable_height(&self) -> u32 {
        self.height - self.reserve_blank
    }

    pub fn font_face(&self) -> &str {
        &self.font_face
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn duration_marquee(&self) -> f64 {
        self.duration_marquee
    }

    pub fn duration_still(&self) -> f64 {
        self.duration_still
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Zoom that fits the Bilibili player into this canvas.
    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    /// Display duration used when the source gives none.
    pub fn default_duration(&self, mode: DisplayMode) -> f64 {
        if mode.is_scrolling() {
            self.duration_marquee
        } else {
            self.duration_still
        }
    }

    /// Convert a color for this canvas, honoring the legacy matrix setting.
    pub fn color_hex(&self, rgb: u32) -> String {
        if self.legacy_color_matrix {
            color_to_hex_legacy(rgb, self.width, self.height)
        } else {
            color_to_hex(rgb)
        }
    }

    /// Map a player-space coordinate to canvas pixels.
    ///
    /// Values above 1 are player pixels; values in `[0, 1]` are fractions of
    /// the player size along `axis`.
    pub fn project_position(&self, value: f64, axis: Axis) -> f64 {
        let (player_extent, offset) = match axis {
            Axis::Horizontal => (BILIBILI_PLAYER_SIZE.0, self.zoom.offset_x),
            Axis::Vertical => (BILIBILI_PLAYER_SIZE.1, self.zoom.offset_y),
        };
        if value > 1.0 {
            self.zoom.scale * value + offset
        } else {
            f64::from(player_extent) * self.zoom.scale * value + offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let canvas = CanvasConfig::default().build().unwrap();
        assert_eq!(canvas.width(), 1920);
        assert_eq!(canvas.height(), 1080);
        assert_eq!(canvas.usable_height(), 1080);
        assert_eq!(canvas.font_size(), 25.0);
        assert!(!canvas.is_reduced());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            CanvasConfig::from_json(r#"{"width": 1280, "height": 720, "reduced": true}"#).unwrap();
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert!(config.reduced);
        assert_eq!(config.font_face, "sans-serif");
        assert_eq!(config.duration_marquee, 5.0);
        assert!(config.comment_filter.is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = CanvasConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DanmakuError::Config(_)));
    }

    #[test]
    fn test_build_rejects_degenerate_canvas() {
        let zero = CanvasConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.build(),
            Err(DanmakuError::InvalidCanvas { .. })
        ));

        let all_reserved = CanvasConfig {
            height: 100,
            reserve_blank: 100,
            ..Default::default()
        };
        assert!(all_reserved.build().is_err());

        let bad_duration = CanvasConfig {
            duration_still: 0.0,
            ..Default::default()
        };
        assert!(bad_duration.build().is_err());

        let bad_alpha = CanvasConfig {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(bad_alpha.build().is_err());
    }

    #[test]
    fn test_usable_height_excludes_reserve() {
        let canvas = CanvasConfig {
            height: 720,
            reserve_blank: 120,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(canvas.usable_height(), 600);
    }

    #[test]
    fn test_default_duration_by_mode() {
        let canvas = CanvasConfig {
            duration_marquee: 8.0,
            duration_still: 4.0,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(canvas.default_duration(DisplayMode::ScrollRightToLeft), 8.0);
        assert_eq!(canvas.default_duration(DisplayMode::ScrollLeftToRight), 8.0);
        assert_eq!(canvas.default_duration(DisplayMode::Top), 4.0);
        assert_eq!(canvas.default_duration(DisplayMode::Bottom), 4.0);
    }

    #[test]
    fn test_project_position() {
        // Player 891x589 into an identically sized canvas is the identity.
        let canvas = CanvasConfig {
            width: 891,
            height: 589,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(canvas.project_position(100.0, Axis::Horizontal), 100.0);
        assert_eq!(canvas.project_position(0.5, Axis::Horizontal), 445.5);
        assert_eq!(canvas.project_position(1.0, Axis::Vertical), 589.0);
    }

    #[test]
    fn test_color_hex_legacy_switch() {
        let plain = CanvasConfig::default().build().unwrap();
        assert_eq!(plain.color_hex(0xFF0000), "0000FF");

        let legacy = CanvasConfig {
            legacy_color_matrix: true,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(legacy.color_hex(0xFF0000), "0200E9");
    }
}
