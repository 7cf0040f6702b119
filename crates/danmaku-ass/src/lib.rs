//! Danmaku-ASS: lane allocation and subtitle emission for danmaku comments.
//!
//! This crate turns timestamped, free-floating comments (Bilibili- and
//! Niconico-style danmaku) into an ASS subtitle script in which every comment
//! owns a screen lane for as long as it is visible.
//!
//! ## Core Types
//!
//! - [`CanvasConfig`] / [`Canvas`] - Run configuration and its validated form
//! - [`Comment`] - A single comment with its derived geometry
//! - [`DisplayMode`] - Scrolling, static and positioned display modes
//! - [`AssDocument`] - Ingest comments, then materialize the script
//!
//! ## Layout
//!
//! - [`Layout`] - Immutable result of a lane allocation pass
//! - [`PlacementState`] - Terminal state of each comment after allocation
//! - [`LayoutStatistics`] - Placement counters for a pass
//!
//! ## Corrections
//!
//! - [`transform::resize_comment_art`] - Shrink oversized comment art
//! - [`transform::retime_scrolling`] - Re-time comments authored for a 4:3 stage
//! - [`MailStyle`] - Niconico mail command parsing
//!
//! ## Output
//!
//! - [`emitter::script_header`] - Script preamble and style line
//! - [`emitter::dialogue_line`] - One `Dialogue:` line per placed comment
//! - [`PositionedEmitter`] - Hook for absolute-position comments

pub mod comment;
pub mod config;
pub mod document;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod format;
pub mod layout;
pub mod nico;
pub mod statistics;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_utils;

pub use comment::{Comment, DisplayMode};
pub use config::{Axis, Canvas, CanvasConfig};
pub use document::AssDocument;
pub use emitter::PositionedEmitter;
pub use error::{DanmakuError, Result};
pub use filter::{AcceptAll, CommentFilter, RegexFilter};
pub use format::{
    ZoomFactor, color_to_hex, color_to_hex_legacy, escape_text, fit_canvas, format_timestamp,
    visible_length,
};
pub use layout::{Layout, Placement, PlacementState};
pub use nico::MailStyle;
pub use statistics::{LaneUsage, LayoutStatistics};
