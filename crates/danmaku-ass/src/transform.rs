//! Per-comment corrections for comment art authored on the Niconico player.
//!
//! Niconico comments are authored against a fixed stage (4:3, or 16:9 for
//! "wide" videos) and a fixed scroll speed. Before lane allocation two
//! corrections run, in order:
//!
//! 1. [`resize_comment_art`] shrinks blocks that would swamp the stage.
//! 2. [`retime_scrolling`] converts the authored duration into one that keeps
//!    the authored speed on the actual canvas width.

use tracing::debug;

use crate::comment::Comment;
use crate::config::Canvas;

/// Seconds a Niconico comment is on screen before its authored time.
const LEAD_IN_SECS: f64 = 1.0;

/// Stage a Niconico comment was authored against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NicoStage {
    /// 16:9 stage instead of 4:3
    pub wide: bool,
    /// Comment is an "ender" (shown at the end of the video, never shrunk)
    pub ender: bool,
}

impl NicoStage {
    pub fn new(wide: bool, ender: bool) -> Self {
        Self { wide, ender }
    }

    /// Notional stage width for a stage `height` pixels tall.
    pub fn width(&self, height: f64) -> f64 {
        if self.wide {
            height * 16.0 / 9.0
        } else {
            height * 4.0 / 3.0
        }
    }
}

/// Shrink a comment-art block that is taller than a third of the stage.
///
/// A tall block is halved. A scrolling block whose halved width would still
/// overflow the stage is instead scaled so its width matches the stage. Enders
/// and blocks that fit are left alone. Returns the factor applied, if any.
pub fn resize_comment_art(comment: &mut Comment, canvas: &Canvas, stage: NicoStage) -> Option<f64> {
    if stage.ender {
        return None;
    }

    let stage_height = f64::from(canvas.height());
    if comment.block_height <= stage_height / 3.0 {
        return None;
    }

    let stage_width = stage.width(stage_height);
    let factor = if comment.mode.is_scrolling() && comment.max_glyph_width * 0.5 > stage_width {
        stage_width / comment.max_glyph_width
    } else {
        0.5
    };

    debug!(
        order = comment.creation_order,
        factor, "Shrinking oversized comment art"
    );
    comment.scale(factor);
    Some(factor)
}

/// Re-time a scrolling comment authored for a 4:3 stage.
///
/// The authored duration plus the one second lead-in defines a speed over the
/// 4:3 stage width. The comment keeps that speed across the real canvas, so it
/// starts earlier by the extra travel time and still leaves at its authored
/// end. When that would start before zero, the start clamps to zero and the
/// missing travel is recorded as [`Comment::leading_trim`].
///
/// Static comments are left untouched.
pub fn retime_scrolling(comment: &mut Comment, canvas: &Canvas) {
    if !comment.mode.is_scrolling() {
        return;
    }

    let height = f64::from(canvas.height());
    let width = f64::from(canvas.width());
    let classic_width = height * 4.0 / 3.0;
    let block_width = comment.max_glyph_width;

    let speed = (classic_width + block_width) / (comment.duration + LEAD_IN_SECS);
    if !(speed.is_finite() && speed > 0.0) {
        return;
    }

    let duration = (width + block_width) / speed;
    let dt = (width - classic_width) / speed + LEAD_IN_SECS;

    if comment.progress >= dt {
        comment.progress -= dt;
        comment.duration = duration;
    } else {
        let shortfall = dt - comment.progress;
        debug!(
            order = comment.creation_order,
            shortfall, "Comment starts before zero, trimming its path"
        );
        comment.progress = 0.0;
        comment.duration = duration - shortfall;
        comment.leading_trim = shortfall * speed;
    }
}
