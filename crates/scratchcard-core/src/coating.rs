//! Coating values and their resolution into something paintable.

use crate::bitmap::Bitmap;
use crate::error::{ScratchError, ScratchResult};
use crate::surface::Surface;
use crate::util::is_url;
use glam::Vec2;
use serde::Deserialize;
use std::rc::Rc;
use tiny_skia::Color;

/// One colour stop of a gradient coating.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient line, 0.0–1.0.
    pub offset: f32,
    /// Any CSS colour.
    pub color: String,
}

/// Linear gradient in canvas pixel coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Gradient {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub stops: Vec<ColorStop>,
}

/// What the opaque layer is painted with.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "CoatingRepr")]
pub enum Coating {
    /// CSS colour string.
    Color(String),
    /// Image fetched through the host's image loader.
    Url(String),
    /// Already decoded image.
    Image(Rc<Bitmap>),
    Gradient(Gradient),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoatingRepr {
    Text(String),
    Gradient(Gradient),
}

impl From<CoatingRepr> for Coating {
    fn from(repr: CoatingRepr) -> Self {
        match repr {
            CoatingRepr::Text(text) => Coating::from(text),
            CoatingRepr::Gradient(gradient) => Coating::Gradient(gradient),
        }
    }
}

impl From<String> for Coating {
    /// URL-looking strings become image coatings, everything else a colour.
    fn from(text: String) -> Self {
        if is_url(&text) {
            Coating::Url(text)
        } else {
            Coating::Color(text)
        }
    }
}

impl From<&str> for Coating {
    fn from(text: &str) -> Self {
        Coating::from(text.to_string())
    }
}

impl From<Bitmap> for Coating {
    fn from(bitmap: Bitmap) -> Self {
        Coating::Image(Rc::new(bitmap))
    }
}

/// Parse a CSS colour string into a tiny_skia::Color.
pub fn parse_color(text: &str) -> ScratchResult<Color> {
    let parsed =
        csscolorparser::parse(text).map_err(|_| ScratchError::UnsupportedCoating(text.to_string()))?;
    let [r, g, b, a] = parsed.to_array();
    Color::from_rgba(r, g, b, a).ok_or_else(|| ScratchError::UnsupportedCoating(text.to_string()))
}

/// A coating ready to draw, or one that must be fetched first.
pub(crate) enum Resolved {
    Local(LocalPaint),
    Remote(String),
}

pub(crate) enum LocalPaint {
    Solid(Color),
    Linear {
        start: Vec2,
        end: Vec2,
        stops: Vec<(f32, Color)>,
    },
    Image(Rc<Bitmap>),
}

impl Coating {
    pub(crate) fn resolve(&self) -> ScratchResult<Resolved> {
        let paint = match self {
            Coating::Color(text) => LocalPaint::Solid(parse_color(text)?),
            Coating::Url(url) => return Ok(Resolved::Remote(url.clone())),
            Coating::Image(bitmap) => LocalPaint::Image(bitmap.clone()),
            Coating::Gradient(gradient) => {
                if gradient.stops.is_empty() {
                    return Err(ScratchError::UnsupportedCoating(format!("{gradient:?}")));
                }
                let stops = gradient
                    .stops
                    .iter()
                    .map(|stop| Ok((stop.offset.clamp(0.0, 1.0), parse_color(&stop.color)?)))
                    .collect::<ScratchResult<Vec<_>>>()?;
                LocalPaint::Linear {
                    start: Vec2::from(gradient.start),
                    end: Vec2::from(gradient.end),
                    stops,
                }
            }
        };
        Ok(Resolved::Local(paint))
    }
}

impl LocalPaint {
    /// Cover the whole surface.
    pub(crate) fn paint(&self, surface: &mut Surface) -> ScratchResult<()> {
        match self {
            LocalPaint::Solid(color) => surface.fill_color(*color),
            LocalPaint::Linear { start, end, stops } => {
                if !surface.fill_linear_gradient(*start, *end, stops) {
                    return Err(ScratchError::UnsupportedCoating(format!(
                        "gradient {start} -> {end} with {} stops",
                        stops.len()
                    )));
                }
            }
            LocalPaint::Image(bitmap) => surface.draw_bitmap_cover(bitmap),
        }
        Ok(())
    }
}
