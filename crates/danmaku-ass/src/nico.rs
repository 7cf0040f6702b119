//! Niconico mail style commands.
//!
//! A Niconico comment carries its position, size and color as a
//! space-separated command list (the `mail` field), e.g. `"ue big red"`.

use crate::comment::DisplayMode;
use crate::config::REFERENCE_FONT_SIZE;

/// Style parsed from a Niconico `mail` field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MailStyle {
    pub mode: DisplayMode,
    pub color: u32,
    /// Authored size on the 25-is-normal scale
    pub size_factor: f64,
    /// `patissier` comments ask for fixed-speed comment art; recorded only
    pub patissier: bool,
}

impl Default for MailStyle {
    fn default() -> Self {
        Self {
            mode: DisplayMode::ScrollRightToLeft,
            color: 0xFFFFFF,
            size_factor: REFERENCE_FONT_SIZE,
            patissier: false,
        }
    }
}

impl MailStyle {
    /// Parse a mail command list. Unknown commands are ignored and later
    /// commands override earlier ones.
    pub fn parse(mail: &str) -> Self {
        let mut style = Self::default();
        for command in mail.split_whitespace() {
            match command {
                "ue" => style.mode = DisplayMode::Top,
                "shita" => style.mode = DisplayMode::Bottom,
                "naka" => style.mode = DisplayMode::ScrollRightToLeft,
                "big" => style.size_factor = REFERENCE_FONT_SIZE * 1.44,
                "small" => style.size_factor = REFERENCE_FONT_SIZE * 0.64,
                "medium" => style.size_factor = REFERENCE_FONT_SIZE,
                "patissier" => style.patissier = true,
                other => {
                    if let Some(color) = named_color(other).or_else(|| hex_color(other)) {
                        style.color = color;
                    }
                }
            }
        }
        style
    }
}

/// Palette names; the second group is premium-only.
fn named_color(name: &str) -> Option<u32> {
    let color = match name {
        "white" => 0xffffff,
        "red" => 0xff0000,
        "pink" => 0xff8080,
        "orange" => 0xffcc00,
        "yellow" => 0xffff00,
        "green" => 0x00ff00,
        "cyan" => 0x00ffff,
        "blue" => 0x0000ff,
        "purple" => 0xc000ff,
        "black" => 0x000000,

        "niconicowhite" | "white2" => 0xcccc99,
        "truered" | "red2" => 0xcc0033,
        "passionorange" | "orange2" => 0xff6600,
        "madyellow" | "yellow2" => 0x999900,
        "elementalgreen" | "green2" => 0x00cc66,
        "marineblue" | "blue2" => 0x33ffcc,
        "nobleviolet" | "purple2" => 0x6633cc,
        _ => return None,
    };
    Some(color)
}

/// `#RRGGBB`
fn hex_color(command: &str) -> Option<u32> {
    let digits = command.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
