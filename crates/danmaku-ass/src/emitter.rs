//! ASS script emission.
//!
//! Turns a [`Layout`] into script text: a fixed header with one style line,
//! then one `Dialogue:` line per visible comment in processing order.

use std::io::Write;

use crate::comment::{Comment, DisplayMode};
use crate::config::Canvas;
use crate::error::Result;
use crate::format::{escape_text, format_timestamp, push_fmt};
use crate::layout::{Layout, Placement};

/// Style name shared by the style line and every dialogue line.
pub const STYLE_NAME: &str = "Danmaku";

/// Layer every dialogue line is written on.
const DIALOGUE_LAYER: u8 = 2;

/// Renders comments the lane engine does not lay out
/// ([`DisplayMode::AbsolutePosition`]).
pub trait PositionedEmitter: Send + Sync {
    /// Full `Dialogue:` line (without trailing newline) for `comment`, or
    /// `None` to omit it.
    fn dialogue(&self, comment: &Comment, canvas: &Canvas) -> Option<String>;
}

/// Script preamble, style definition and events header.
pub fn script_header(canvas: &Canvas) -> String {
    let alpha = ((1.0 - canvas.alpha()) * 255.0).round().clamp(0.0, 255.0) as u8;
    let bold = if canvas.is_bold() { -1 } else { 0 };
    let outline = (canvas.font_size() / 25.0).max(1.0);
    format!(
        "[Script Info]\n\
         ; Script generated by danmaku-ass\n\
         ScriptType: v4.00+\n\
         PlayResX: {width}\n\
         PlayResY: {height}\n\
         Aspect Ratio: {width}:{height}\n\
         Collisions: Normal\n\
         WrapStyle: 2\n\
         ScaledBorderAndShadow: yes\n\
         YCbCr Matrix: TV.601\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: {STYLE_NAME}, {font_face}, {font_size:.0}, &H{alpha:02X}FFFFFF, &H{alpha:02X}FFFFFF, &H{alpha:02X}000000, &H{alpha:02X}000000, {bold}, 0, 0, 0, 100, 100, 0.00, 0.00, 1, {outline:.0}, 0, 7, 0, 0, 0, 0\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        width = canvas.width(),
        height = canvas.height(),
        font_face = canvas.font_face(),
        font_size = canvas.font_size(),
    )
}

/// Position or movement override for a comment on `lane`.
fn placement_tags(comment: &Comment, placement: Placement, lane: u32, canvas: &Canvas) -> String {
    let width = canvas.width();
    let block_width = comment.max_glyph_width();
    let lane = i64::from(lane);
    let mut tags = String::new();

    match comment.mode() {
        DisplayMode::Top | DisplayMode::Bottom => {
            let (y, single, multi) = if comment.mode() == DisplayMode::Top {
                (lane, 8, 7)
            } else {
                (i64::from(canvas.usable_height()) - lane, 2, 1)
            };
            if comment.line_count() > 1 {
                // Left-align the lines, centering the whole block.
                let x = ((f64::from(width) - block_width) / 2.0).round() as i64;
                push_fmt(&mut tags, format_args!("\\an{multi}\\pos({x}, {y})"));
            } else {
                push_fmt(
                    &mut tags,
                    format_args!("\\an{single}\\pos({}, {y})", width / 2),
                );
            }
        }
        DisplayMode::ScrollRightToLeft | DisplayMode::ScrollLeftToRight => {
            if placement.centered {
                tags.push_str("\\an4");
            }
            let offstage = -(block_width.ceil() as i64);
            let trim = comment.leading_trim();
            let (x1, x2) = if comment.mode() == DisplayMode::ScrollRightToLeft {
                ((f64::from(width) - trim).round() as i64, offstage)
            } else {
                ((offstage as f64 + trim).round() as i64, i64::from(width))
            };
            push_fmt(
                &mut tags,
                format_args!("\\move({x1}, {lane}, {x2}, {lane})"),
            );
        }
        DisplayMode::AbsolutePosition => {}
    }

    tags
}

/// One `Dialogue:` line (without trailing newline) for a laid-out comment.
///
/// Returns `None` for comments without a lane (dropped, deferred).
pub fn dialogue_line(comment: &Comment, placement: Placement, canvas: &Canvas) -> Option<String> {
    if !placement.state.is_visible() {
        return None;
    }
    let lane = placement.lane?;

    let mut overrides = placement_tags(comment, placement, lane, canvas);
    if (comment.font_size() - canvas.font_size()).abs() >= 1.0 {
        push_fmt(&mut overrides, format_args!("\\fs{:.0}", comment.font_size()));
    }
    if comment.color() != 0xFFFFFF {
        push_fmt(
            &mut overrides,
            format_args!("\\c&H{}&", canvas.color_hex(comment.color())),
        );
        if comment.color() == 0x000000 {
            overrides.push_str("\\3c&HFFFFFF&");
        }
    }

    Some(format!(
        "Dialogue: {DIALOGUE_LAYER},{},{},{STYLE_NAME},,0000,0000,0000,,{{{overrides}}}{}",
        format_timestamp(comment.progress()),
        format_timestamp(comment.end()),
        escape_text(comment.text()),
    ))
}

/// Every script line in output order, each ending in a newline: the header
/// first, then the dialogue lines.
pub fn script_lines<'l>(
    layout: &'l Layout<'l>,
    positioned: Option<&'l dyn PositionedEmitter>,
) -> impl Iterator<Item = String> + 'l {
    let canvas = layout.canvas();
    let dialogues = layout.iter().filter_map(move |(comment, placement)| {
        let line = if comment.mode() == DisplayMode::AbsolutePosition {
            positioned?.dialogue(comment, canvas)
        } else {
            dialogue_line(comment, placement, canvas)
        };
        line.map(|mut line| {
            line.push('\n');
            line
        })
    });
    std::iter::once(script_header(canvas)).chain(dialogues)
}

/// Stream the script for `layout` into `sink`, one line at a time.
pub fn write_script<W: Write>(
    layout: &Layout<'_>,
    positioned: Option<&dyn PositionedEmitter>,
    mut sink: W,
) -> Result<()> {
    for line in script_lines(layout, positioned) {
        sink.write_all(line.as_bytes())?;
    }
    sink.flush()?;
    Ok(())
}
