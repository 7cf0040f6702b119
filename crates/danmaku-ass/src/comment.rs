//! Comment model.
//!
//! A [`Comment`] carries the authored timing, text and style of one danmaku
//! plus the geometry derived from them against a [`Canvas`].

use serde::{Deserialize, Serialize};

use crate::config::{Canvas, REFERENCE_FONT_SIZE};
use crate::format::visible_length;

/// How a comment moves across the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Enters at the right edge, leaves at the left
    ScrollRightToLeft,
    /// Enters at the left edge, leaves at the right
    ScrollLeftToRight,
    /// Pinned to the top, horizontally centered
    Top,
    /// Pinned to the bottom, horizontally centered
    Bottom,
    /// Explicitly positioned; accepted but not laid out by the lane engine
    AbsolutePosition,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::ScrollRightToLeft
    }
}

impl DisplayMode {
    /// Modes that take part in lane allocation.
    pub const LANE_MODES: [DisplayMode; 4] = [
        DisplayMode::ScrollRightToLeft,
        DisplayMode::ScrollLeftToRight,
        DisplayMode::Top,
        DisplayMode::Bottom,
    ];

    /// Map a Bilibili `mode` code.
    ///
    /// Scripted comments (8) and unknown codes have no mapping.
    pub fn from_bilibili(code: u32) -> Option<Self> {
        match code {
            1..=3 => Some(Self::ScrollRightToLeft),
            4 => Some(Self::Bottom),
            5 => Some(Self::Top),
            6 => Some(Self::ScrollLeftToRight),
            7 => Some(Self::AbsolutePosition),
            _ => None,
        }
    }

    #[inline]
    pub fn is_scrolling(self) -> bool {
        matches!(self, Self::ScrollRightToLeft | Self::ScrollLeftToRight)
    }

    #[inline]
    pub fn is_static(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// A single danmaku comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub(crate) progress: f64,
    pub(crate) duration: f64,
    pub(crate) creation_order: i64,
    pub(crate) text: String,
    pub(crate) font_size: f64,
    pub(crate) mode: DisplayMode,
    pub(crate) color: u32,
    pub(crate) pool: i32,
    pub(crate) line_count: usize,
    pub(crate) block_height: f64,
    pub(crate) max_glyph_width: f64,
    pub(crate) leading_trim: f64,
}

impl Comment {
    /// Build a comment and derive its geometry.
    ///
    /// `size_factor` is the authored size where 25 means "normal"; the
    /// effective font size is `trunc(size_factor) * canvas.font_size / 25`.
    /// Positioned comments keep `size_factor` as-is and have no block extent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        canvas: &Canvas,
        progress: f64,
        duration: f64,
        creation_order: i64,
        text: impl Into<String>,
        size_factor: f64,
        mode: DisplayMode,
        color: u32,
        pool: i32,
    ) -> Self {
        let text = text.into();
        let mut comment = Self {
            progress,
            duration,
            creation_order,
            text,
            font_size: size_factor,
            mode,
            color: color & 0xFF_FFFF,
            pool,
            line_count: 0,
            block_height: 0.0,
            max_glyph_width: 0.0,
            leading_trim: 0.0,
        };

        if mode != DisplayMode::AbsolutePosition {
            comment.font_size = size_factor.trunc() * canvas.font_size() / REFERENCE_FONT_SIZE;
            comment.line_count = comment.text.split('\n').count();
            let widest = comment
                .text
                .split('\n')
                .map(visible_length)
                .max()
                .unwrap_or(0);
            comment.block_height = comment.line_count as f64 * comment.font_size;
            comment.max_glyph_width = widest as f64 * comment.font_size;
        }

        comment
    }

    /// Second at which the comment becomes visible.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Seconds the comment stays visible.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Second at which the comment disappears.
    pub fn end(&self) -> f64 {
        self.progress + self.duration
    }

    pub fn creation_order(&self) -> i64 {
        self.creation_order
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rendered glyph height in pixels.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn pool(&self) -> i32 {
        self.pool
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Vertical extent: line count times font size.
    pub fn block_height(&self) -> f64 {
        self.block_height
    }

    /// Horizontal extent: widest line's glyph count times font size.
    pub fn max_glyph_width(&self) -> f64 {
        self.max_glyph_width
    }

    /// Distance trimmed off the start of a scrolling path by retiming.
    pub fn leading_trim(&self) -> f64 {
        self.leading_trim
    }

    /// Scale every size-derived field by `factor`.
    pub(crate) fn scale(&mut self, factor: f64) {
        self.font_size *= factor;
        self.block_height *= factor;
        self.max_glyph_width *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_canvas;

    #[test]
    fn test_from_bilibili_codes() {
        assert_eq!(
            DisplayMode::from_bilibili(1),
            Some(DisplayMode::ScrollRightToLeft)
        );
        assert_eq!(DisplayMode::from_bilibili(4), Some(DisplayMode::Bottom));
        assert_eq!(DisplayMode::from_bilibili(5), Some(DisplayMode::Top));
        assert_eq!(
            DisplayMode::from_bilibili(6),
            Some(DisplayMode::ScrollLeftToRight)
        );
        assert_eq!(
            DisplayMode::from_bilibili(7),
            Some(DisplayMode::AbsolutePosition)
        );
        assert_eq!(DisplayMode::from_bilibili(8), None);
        assert_eq!(DisplayMode::from_bilibili(0), None);
    }

    #[test]
    fn test_geometry_single_line() {
        let canvas = test_canvas(1920, 1080);
        let c = Comment::new(
            &canvas,
            1.0,
            5.0,
            0,
            "hello",
            25.0,
            DisplayMode::ScrollRightToLeft,
            0xFFFFFF,
            0,
        );
        assert_eq!(c.font_size(), 25.0);
        assert_eq!(c.line_count(), 1);
        assert_eq!(c.block_height(), 25.0);
        assert_eq!(c.max_glyph_width(), 125.0);
        assert_eq!(c.end(), 6.0);
    }

    #[test]
    fn test_geometry_multi_line_uses_widest_line() {
        let canvas = test_canvas(1920, 1080);
        let c = Comment::new(
            &canvas,
            0.0,
            5.0,
            0,
            "ab\n弾幕弾幕弾幕\nc",
            25.0,
            DisplayMode::Top,
            0xFFFFFF,
            0,
        );
        assert_eq!(c.line_count(), 3);
        assert_eq!(c.block_height(), 75.0);
        assert_eq!(c.max_glyph_width(), 150.0);
    }

    #[test]
    fn test_size_factor_scales_with_canvas_font() {
        let canvas = crate::CanvasConfig {
            font_size: 50.0,
            ..Default::default()
        }
        .build()
        .unwrap();
        let c = Comment::new(
            &canvas,
            0.0,
            5.0,
            0,
            "x",
            36.7,
            DisplayMode::Top,
            0xFFFFFF,
            0,
        );
        // trunc(36.7) * 50 / 25
        assert_eq!(c.font_size(), 72.0);
    }

    #[test]
    fn test_positioned_comment_has_no_extent() {
        let canvas = test_canvas(1920, 1080);
        let c = Comment::new(
            &canvas,
            0.0,
            5.0,
            0,
            "[0,0,\"1-1\",4.5,\"text\"]",
            25.0,
            DisplayMode::AbsolutePosition,
            0xFFFFFF,
            0,
        );
        assert_eq!(c.block_height(), 0.0);
        assert_eq!(c.max_glyph_width(), 0.0);
        assert_eq!(c.font_size(), 25.0);
    }

    #[test]
    fn test_scale() {
        let canvas = test_canvas(1920, 1080);
        let mut c = Comment::new(
            &canvas,
            0.0,
            5.0,
            0,
            "abcd\nef",
            25.0,
            DisplayMode::Top,
            0xFFFFFF,
            0,
        );
        c.scale(0.5);
        assert_eq!(c.font_size(), 12.5);
        assert_eq!(c.block_height(), 25.0);
        assert_eq!(c.max_glyph_width(), 50.0);
    }
}
