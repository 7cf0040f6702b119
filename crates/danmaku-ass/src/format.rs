//! Geometry and text formatting helpers shared by layout and emission.
//!
//! Everything here is pure: no canvas state, no logging.

use std::fmt::Write as _;

/// Zero-width space used to keep renderers from trimming significant spaces.
const ZERO_WIDTH_GUARD: char = '\u{200B}';

/// Number of visible glyphs in a line.
///
/// Counts Unicode scalar values, not encoded bytes: a line of CJK text is as
/// wide as its character count.
#[inline]
pub fn visible_length(text: &str) -> usize {
    text.chars().count()
}

/// Convert a 24-bit RGB color into the BGR hex form used by ASS color tags.
pub fn color_to_hex(rgb: u32) -> String {
    match rgb & 0xFF_FFFF {
        0x000000 => "000000".to_string(),
        0xFFFFFF => "FFFFFF".to_string(),
        rgb => {
            let (r, g, b) = split_rgb(rgb);
            format!("{b:02X}{g:02X}{r:02X}")
        }
    }
}

/// Historical color conversion.
///
/// Canvases of at least 1280x576 get a fixed luma/chroma correction matrix
/// (BT.601 to BT.709 style), each output channel clamped to `[0, 255]`.
/// Smaller canvases fall back to [`color_to_hex`].
pub fn color_to_hex_legacy(rgb: u32, width: u32, height: u32) -> String {
    let rgb = rgb & 0xFF_FFFF;
    if rgb == 0x000000 || rgb == 0xFFFFFF || (width < 1280 && height < 576) {
        return color_to_hex(rgb);
    }

    let (r, g, b) = split_rgb(rgb);
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    format!(
        "{:02X}{:02X}{:02X}",
        clip_byte(r * 0.00956384088080656 + g * 0.03217254540203729 + b * 0.95826361371715607),
        clip_byte(r * -0.10493933142075390 + g * 1.17231478191855154 + b * -0.06737545049779757),
        clip_byte(r * 0.91348912373987645 + g * 0.07858536372532510 + b * 0.00792551253479842),
    )
}

#[inline]
fn split_rgb(rgb: u32) -> (u8, u8, u8) {
    (
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
    )
}

#[inline]
fn clip_byte(x: f64) -> u8 {
    x.round().clamp(0.0, 255.0) as u8
}

/// Format seconds as an ASS timestamp `H:MM:SS.CC`.
///
/// The centisecond count is `seconds * 100` rounded half away from zero, so
/// `65.005` becomes `0:01:05.01`. Hours are unbounded; negative input clamps
/// to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total = (seconds * 100.0).round().max(0.0) as u64;
    let hours = total / 360_000;
    let minutes = (total % 360_000) / 6_000;
    let secs = (total % 6_000) / 100;
    let centis = total % 100;
    format!("{hours}:{minutes:02}:{secs:02}.{centis:02}")
}

/// Uniform scale and offsets that fit one box into another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFactor {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ZoomFactor {
    pub const IDENTITY: ZoomFactor = ZoomFactor {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Letterbox/pillarbox `source` into `target`, preserving aspect ratio.
///
/// Sizes are `(width, height)`. Any zero dimension yields the identity zoom.
pub fn fit_canvas(source: (u32, u32), target: (u32, u32)) -> ZoomFactor {
    let (sw, sh) = (f64::from(source.0), f64::from(source.1));
    let (tw, th) = (f64::from(target.0), f64::from(target.1));
    if sw == 0.0 || sh == 0.0 || tw == 0.0 || th == 0.0 {
        return ZoomFactor::IDENTITY;
    }

    let source_aspect = sw / sh;
    let target_aspect = tw / th;
    if target_aspect < source_aspect {
        // narrower: bars above and below
        ZoomFactor {
            scale: tw / sw,
            offset_x: 0.0,
            offset_y: (th - tw / source_aspect) / 2.0,
        }
    } else if target_aspect > source_aspect {
        // wider: bars left and right
        ZoomFactor {
            scale: th / sh,
            offset_x: (tw - th * source_aspect) / 2.0,
            offset_y: 0.0,
        }
    } else {
        ZoomFactor {
            scale: tw / sw,
            ..ZoomFactor::IDENTITY
        }
    }
}

/// Escape comment text for an ASS dialogue line.
///
/// Backslashes and braces are escaped so they cannot open override blocks.
/// Line breaks become `\N`, and every break plus both ends of the text are
/// guarded by zero-width spaces so leading and trailing whitespace survive.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    out.push(ZERO_WIDTH_GUARD);
    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            out.push(ZERO_WIDTH_GUARD);
            out.push_str("\\N");
            out.push(ZERO_WIDTH_GUARD);
        }
        for ch in line.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '{' => out.push_str("\\{"),
                '}' => out.push_str("\\}"),
                _ => out.push(ch),
            }
        }
    }
    out.push(ZERO_WIDTH_GUARD);
    out
}

/// Append a formatted value without allocating a temporary string.
#[inline]
pub(crate) fn push_fmt(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = out.write_fmt(args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello", 5)]
    #[case("", 0)]
    #[case("弾幕テスト", 5)]
    #[case("ｗｗｗ草", 4)]
    #[case("emoji 🎉", 7)]
    fn test_visible_length(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(visible_length(text), expected);
    }

    #[rstest]
    #[case(0x000000, "000000")]
    #[case(0xFFFFFF, "FFFFFF")]
    #[case(0xFF0000, "0000FF")]
    #[case(0x00FF00, "00FF00")]
    #[case(0x123456, "563412")]
    fn test_color_to_hex(#[case] rgb: u32, #[case] expected: &str) {
        assert_eq!(color_to_hex(rgb), expected);
    }

    #[test]
    fn test_color_to_hex_legacy_small_canvas_matches_plain() {
        assert_eq!(color_to_hex_legacy(0xFF0000, 640, 360), "0000FF");
        assert_eq!(color_to_hex_legacy(0x000000, 1920, 1080), "000000");
        assert_eq!(color_to_hex_legacy(0xFFFFFF, 1920, 1080), "FFFFFF");
    }

    #[test]
    fn test_color_to_hex_legacy_applies_matrix() {
        // Pure red: B' = 255*0.0096, G' = clamp(-26.8) = 0, R' = 255*0.9135
        assert_eq!(color_to_hex_legacy(0xFF0000, 1920, 1080), "0200E9");
    }

    #[rstest]
    #[case(0.0, "0:00:00.00")]
    #[case(1.5, "0:00:01.50")]
    #[case(65.005, "0:01:05.01")]
    #[case(59.999, "0:01:00.00")]
    #[case(3723.456, "1:02:03.46")]
    #[case(36000.0, "10:00:00.00")]
    #[case(-3.0, "0:00:00.00")]
    fn test_format_timestamp(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_timestamp(seconds), expected);
    }

    #[test]
    fn test_fit_canvas_same_aspect() {
        assert_eq!(fit_canvas((4, 3), (4, 3)), ZoomFactor::IDENTITY);
        let zoom = fit_canvas((4, 3), (8, 6));
        assert_eq!(zoom.scale, 2.0);
        assert_eq!(zoom.offset_x, 0.0);
        assert_eq!(zoom.offset_y, 0.0);
    }

    #[test]
    fn test_fit_canvas_pillarbox() {
        // 4:3 into 16:9 -> bars left and right
        let zoom = fit_canvas((640, 480), (1920, 1080));
        assert_eq!(zoom.scale, 2.25);
        assert!((zoom.offset_x - 240.0).abs() < 1e-9);
        assert_eq!(zoom.offset_y, 0.0);
    }

    #[test]
    fn test_fit_canvas_letterbox() {
        // 16:9 into 4:3 -> bars above and below
        let zoom = fit_canvas((1920, 1080), (640, 480));
        assert!((zoom.scale - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(zoom.offset_x, 0.0);
        assert!((zoom.offset_y - 60.0).abs() < 1e-9);
    }

    #[rstest]
    #[case((0, 3), (4, 3))]
    #[case((4, 0), (4, 3))]
    #[case((4, 3), (0, 3))]
    #[case((4, 3), (4, 0))]
    #[case((0, 0), (0, 0))]
    fn test_fit_canvas_degenerate_is_identity(#[case] source: (u32, u32), #[case] target: (u32, u32)) {
        assert_eq!(fit_canvas(source, target), ZoomFactor::IDENTITY);
    }

    #[test]
    fn test_escape_text_markup() {
        assert_eq!(
            escape_text(r"a\b{c}"),
            "\u{200B}a\\\\b\\{c\\}\u{200B}"
        );
    }

    #[test]
    fn test_escape_text_line_breaks_keep_spaces() {
        assert_eq!(
            escape_text("  top\nbottom  "),
            "\u{200B}  top\u{200B}\\N\u{200B}bottom  \u{200B}"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Timestamps never lose or invent time beyond half a centisecond.
        #[test]
        fn prop_format_timestamp_round_trips(centis in 0u64..100_000_000) {
            let formatted = format_timestamp(centis as f64 / 100.0);
            let (h, rest) = formatted.split_once(':').unwrap();
            let (m, rest) = rest.split_once(':').unwrap();
            let (s, cs) = rest.split_once('.').unwrap();
            prop_assert_eq!(m.len(), 2);
            prop_assert_eq!(s.len(), 2);
            prop_assert_eq!(cs.len(), 2);
            let parsed = h.parse::<u64>().unwrap() * 360_000
                + m.parse::<u64>().unwrap() * 6_000
                + s.parse::<u64>().unwrap() * 100
                + cs.parse::<u64>().unwrap();
            prop_assert_eq!(parsed, centis);
        }
    }
}
