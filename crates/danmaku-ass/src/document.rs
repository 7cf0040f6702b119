//! Comment ingestion and script materialization.
//!
//! [`AssDocument`] is the ingest phase: comments are appended in any order
//! and admitted or refused one at a time. [`AssDocument::layout`] freezes the
//! current set into an immutable [`Layout`]; materializing always starts from
//! a fresh layout, so adding comments and materializing again recomputes the
//! whole script.

use std::fmt;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::comment::{Comment, DisplayMode};
use crate::config::{Canvas, CanvasConfig};
use crate::emitter::{self, PositionedEmitter};
use crate::error::Result;
use crate::filter::{AcceptAll, CommentFilter, RegexFilter};
use crate::layout::Layout;
use crate::statistics::LayoutStatistics;
use crate::transform::{NicoStage, resize_comment_art, retime_scrolling};

/// Comment buffer for one output script.
pub struct AssDocument {
    canvas: Canvas,
    comments: Vec<Comment>,
    filter: Box<dyn CommentFilter>,
    positioned: Option<Box<dyn PositionedEmitter>>,
}

impl fmt::Debug for AssDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssDocument")
            .field("canvas", &self.canvas)
            .field("comments", &self.comments.len())
            .field("positioned", &self.positioned.is_some())
            .finish()
    }
}

impl AssDocument {
    /// Empty document admitting every comment.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            comments: Vec::new(),
            filter: Box::new(AcceptAll),
            positioned: None,
        }
    }

    /// Validate `config` and create a document, installing its comment
    /// filter if one is set.
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        let document = Self::new(config.build()?);
        Ok(match config.comment_filter.as_deref() {
            Some(pattern) => document.with_filter(RegexFilter::new(pattern)?),
            None => document,
        })
    }

    /// Replace the admission filter.
    pub fn with_filter(mut self, filter: impl CommentFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Render absolute-position comments with `emitter`.
    pub fn with_positioned_emitter(mut self, emitter: impl PositionedEmitter + 'static) -> Self {
        self.positioned = Some(Box::new(emitter));
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Admitted comments in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    fn admits_text(&self, text: &str, creation_order: i64) -> bool {
        if self.filter.rejects(text) {
            debug!(order = creation_order, "Comment rejected by filter");
            return false;
        }
        true
    }

    fn admits_progress(progress: f64, creation_order: i64) -> bool {
        if !(progress.is_finite() && progress >= 0.0) {
            debug!(order = creation_order, progress, "Comment has invalid start time");
            return false;
        }
        true
    }

    fn push(&mut self, comment: Comment) -> bool {
        if !(comment.duration.is_finite() && comment.duration > 0.0) {
            debug!(
                order = comment.creation_order,
                duration = comment.duration,
                "Comment has no visible duration"
            );
            return false;
        }
        if !(comment.font_size.is_finite() && comment.font_size > 0.0) {
            debug!(
                order = comment.creation_order,
                font_size = comment.font_size,
                "Comment has no visible size"
            );
            return false;
        }
        self.comments.push(comment);
        true
    }

    /// Admit a comment shown for the canvas' default duration for `mode`.
    ///
    /// Returns whether the comment was admitted.
    #[allow(clippy::too_many_arguments)]
    pub fn add_comment(
        &mut self,
        progress: f64,
        creation_order: i64,
        text: &str,
        size_factor: f64,
        mode: DisplayMode,
        color: u32,
        pool: i32,
    ) -> bool {
        if !self.admits_text(text, creation_order) || !Self::admits_progress(progress, creation_order)
        {
            return false;
        }
        let duration = self.canvas.default_duration(mode);
        let comment = Comment::new(
            &self.canvas,
            progress,
            duration,
            creation_order,
            text,
            size_factor,
            mode,
            color,
            pool,
        );
        self.push(comment)
    }

    /// Admit a Niconico comment authored for `stage`.
    ///
    /// Comment art is resized and scrolling comments are re-timed before
    /// admission. Comments left without a positive duration are refused.
    #[allow(clippy::too_many_arguments)]
    pub fn add_nico_comment(
        &mut self,
        progress: f64,
        duration: f64,
        creation_order: i64,
        text: &str,
        size_factor: f64,
        mode: DisplayMode,
        color: u32,
        pool: i32,
        stage: NicoStage,
    ) -> bool {
        if !self.admits_text(text, creation_order) || !Self::admits_progress(progress, creation_order)
        {
            return false;
        }
        let mut comment = Comment::new(
            &self.canvas,
            progress,
            duration,
            creation_order,
            text,
            size_factor,
            mode,
            color,
            pool,
        );
        resize_comment_art(&mut comment, &self.canvas, stage);
        retime_scrolling(&mut comment, &self.canvas);
        self.push(comment)
    }

    /// Freeze the current comment set and allocate lanes.
    pub fn layout(&self) -> Layout<'_> {
        Layout::new(&self.canvas, &self.comments)
    }

    /// Placement counters for the current comment set.
    pub fn statistics(&self) -> LayoutStatistics {
        self.layout().statistics()
    }

    fn log_summary(&self, layout: &Layout<'_>) {
        let stats = layout.statistics();
        if stats.deferred_count > 0 && self.positioned.is_none() {
            warn!(
                count = stats.deferred_count,
                "Absolute-position comments have no emitter and are omitted"
            );
        }
        info!(
            total = stats.total_count,
            placed = stats.placed_count,
            forced = stats.forced_count,
            dropped = stats.dropped_count,
            oversized = stats.oversized_count,
            deferred = stats.deferred_count,
            "Danmaku layout complete"
        );
    }

    /// Lay out every comment and return the full script.
    pub fn materialize(&self) -> String {
        let layout = self.layout();
        self.log_summary(&layout);
        emitter::script_lines(&layout, self.positioned.as_deref()).collect()
    }

    /// Like [`materialize`](Self::materialize), but streams the script into
    /// `sink` line by line.
    pub fn write_to_stream<W: Write>(&self, sink: W) -> Result<()> {
        let layout = self.layout();
        self.log_summary(&layout);
        emitter::write_script(&layout, self.positioned.as_deref(), sink)
    }
}
