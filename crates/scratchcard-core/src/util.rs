//! Stateless helpers: pixel-unit normalisation, string classification,
//! device detection and hit testing.

use crate::types::PagePos;
use glam::Vec2;
use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^(https?://)?",
            r"((([a-z\d]([a-z\d-]*[a-z\d])*)\.)+[a-z]{2,}|",
            r"((\d{1,3}\.){3}\d{1,3}))",
            r"(:\d+)?(/[-a-z\d%_.~+]*)*",
            r"(\?[;&a-z\d%_.~+=-]*)?",
            r"(#[-a-z\d_]*)?$",
        ))
        .expect("url pattern is valid")
    })
}

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^#([0-9a-f]{3}|[0-9a-f]{6})$").expect("hex pattern is valid"))
}

fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|Opera Mini").expect("ua pattern is valid")
    })
}

/// True for strings that should be fetched as images: anything matching the
/// URL grammar, plus any string containing a path separator.
pub fn is_url(value: &str) -> bool {
    url_pattern().is_match(value) || value.contains('/')
}

/// True for `#rgb` and `#rrggbb` hex colours.
pub fn is_css_color(value: &str) -> bool {
    hex_color_pattern().is_match(value)
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    mobile_pattern().is_match(user_agent)
}

/// Normalise a numeric CSS length to a string with a unit.
///
/// Numbers and numeric strings gain `px`; strings already ending in
/// `px`/`em`/`rem` are kept; otherwise the first run of non-numeric
/// characters is dropped and `px` appended.
pub fn number_to_pixel(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
        return format!("{trimmed}px");
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.ends_with("px") || lower.ends_with("em") {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len() + 2);
    let mut chars = trimmed.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    while chars.peek().is_some_and(|c| !(c.is_ascii_digit() || *c == '.')) {
        chars.next();
    }
    out.extend(chars);
    out.push_str("px");
    out
}

/// Inclusive bounding-box test of a page-space point.
pub fn point_in_box(origin: PagePos, size: Vec2, page: Vec2) -> bool {
    let max_x = origin.left + size.x;
    let max_y = origin.top + size.y;
    origin.left <= page.x && page.x <= max_x && origin.top <= page.y && page.y <= max_y
}

/// DOM event names used for a scratch session on a given device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEventNames {
    pub down: &'static str,
    pub moved: &'static str,
    pub up: &'static str,
}

impl InputEventNames {
    pub fn for_device(mobile: bool) -> Self {
        if mobile {
            Self {
                down: "touchstart",
                moved: "touchmove",
                up: "touchend",
            }
        } else {
            Self {
                down: "mousedown",
                moved: "mousemove",
                up: "mouseup",
            }
        }
    }
}
