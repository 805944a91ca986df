//! Ayu color theme and styling functions for takeoff CLI output.
//!
//! Only things that need attention get color: warnings, fallbacks to zero,
//! negative amounts, and the grand total. Everything else is plain text so
//! tables stay readable when piped.

use owo_colors::OwoColorize;

use crate::terminal::supports_color;

// ---------------------------------------------------------------------------
// Ayu Dark color palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub const ICON_PASS: &str = "\u{2713}";
pub const ICON_WARN: &str = "\u{26A0}";
pub const ICON_FAIL: &str = "\u{2716}";

const SEPARATOR_CHAR: char = '\u{2500}';

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn paint(s: &str, rgb: (u8, u8, u8), bold: bool, enabled: bool) -> String {
    match (enabled, bold) {
        (false, _) => s.to_string(),
        (true, false) => s.truecolor(rgb.0, rgb.1, rgb.2).to_string(),
        (true, true) => s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string(),
    }
}

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    paint(s, rgb, false, supports_color())
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    paint(s, rgb, true, supports_color())
}

// ---------------------------------------------------------------------------
// Core semantic render helpers
// ---------------------------------------------------------------------------

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders a category header in uppercase with accent color and bold.
pub fn render_category(s: &str) -> String {
    color_bold_str(&s.to_uppercase(), ACCENT)
}

/// A muted horizontal rule `width` columns wide.
pub fn render_separator(width: usize) -> String {
    render_muted(&separator(width))
}

fn separator(width: usize) -> String {
    std::iter::repeat_n(SEPARATOR_CHAR, width).collect()
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Renders an already formatted amount: negative in red, zero muted.
pub fn render_amount(text: &str, value: f64) -> String {
    if value < 0.0 {
        color_str(text, FAIL)
    } else if value == 0.0 {
        color_str(text, MUTED)
    } else {
        text.to_string()
    }
}

/// Renders a grand total line.
pub fn render_total(text: &str) -> String {
    color_bold_str(text, PASS)
}

// ---------------------------------------------------------------------------
// Icon renderers
// ---------------------------------------------------------------------------

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_warn_icon() -> String {
    color_str(ICON_WARN, WARN)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}
