use crate::coating::Coating;
use crate::constants::*;
use crate::error::{ScratchError, ScratchResult};
use crate::types::NodeId;
use crate::util::{is_url, number_to_pixel};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::rc::Rc;

/// Fixed canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// What sits beneath the coating.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum Content {
    Text(String),
    /// Image source, loaded before insertion.
    Image(String),
    /// Host element moved under the canvas.
    Element(NodeId),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        if is_url(&text) {
            Content::Image(text)
        } else {
            Content::Text(text)
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::from(text.to_string())
    }
}

/// Zero-argument notification hook. The default does nothing.
#[derive(Clone, Default)]
pub struct Callback(Option<Rc<dyn Fn()>>);

impl Callback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Some(Rc::new(f)))
    }

    pub fn call(&self) {
        if let Some(f) = &self.0 {
            f();
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "Callback(set)" } else { "Callback(none)" })
    }
}

/// Widget configuration. Omitted fields take their defaults, so parsing a
/// partial document is the same as merging it over `Options::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub size: Size,
    /// Follow the container's box instead of `size`.
    pub size_adaption: bool,
    pub content: Content,
    pub coating: Coating,
    pub font_family: String,
    #[serde(deserialize_with = "deserialize_font_size")]
    pub font_size: String,
    /// Scratched fraction strictly above which the card is finished.
    pub finished_threshold: f32,
    /// Rescan the canvas while scratching rather than only on release.
    pub auto_refresh_scratched_percent: bool,
    pub brush_radius: f32,
    /// Popup parent; the document body when unset.
    #[serde(skip)]
    pub menu_container: Option<NodeId>,
    /// Fired on a primary release once the threshold is crossed.
    #[serde(skip)]
    pub callback: Callback,
    #[serde(skip)]
    pub on_start: Callback,
    /// Fired at the end of every scratch session.
    #[serde(skip)]
    pub on_scratching: Callback,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            size: Size::default(),
            size_adaption: true,
            content: Content::default(),
            coating: Coating::from(DEFAULT_COATING),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            finished_threshold: DEFAULT_FINISHED_THRESHOLD,
            auto_refresh_scratched_percent: true,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            menu_container: None,
            callback: Callback::default(),
            on_start: Callback::default(),
            on_scratching: Callback::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FontSizeRepr {
    Number(f64),
    Text(String),
}

fn deserialize_font_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = match FontSizeRepr::deserialize(deserializer)? {
        FontSizeRepr::Number(n) => n.to_string(),
        FontSizeRepr::Text(text) => text,
    };
    Ok(normalize_font_size(&raw))
}

fn normalize_font_size(raw: &str) -> String {
    if raw.trim().is_empty() {
        return DEFAULT_FONT_SIZE.to_string();
    }
    number_to_pixel(raw)
}

impl Options {
    /// Parse JSON (camelCase keys) and validate.
    pub fn from_json(json: &str) -> ScratchResult<Self> {
        let options: Options =
            serde_json::from_str(json).map_err(|e| ScratchError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse RON (camelCase keys) and validate.
    pub fn from_ron(ron_str: &str) -> ScratchResult<Self> {
        let options: Options = ron::Options::default()
            .from_str(ron_str)
            .map_err(|e| ScratchError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ScratchResult<()> {
        if !(0.0..=1.0).contains(&self.finished_threshold) {
            return Err(ScratchError::InvalidOptions(format!(
                "finishedThreshold must lie in [0, 1], got {}",
                self.finished_threshold
            )));
        }
        if !self.brush_radius.is_finite() || self.brush_radius <= 0.0 {
            return Err(ScratchError::InvalidOptions(format!(
                "brushRadius must be positive, got {}",
                self.brush_radius
            )));
        }
        if !self.size_adaption && (self.size.width == 0 || self.size.height == 0) {
            return Err(ScratchError::InvalidOptions(format!(
                "fixed size must be non-zero, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        Ok(())
    }

    /// Set the font size from any CSS-ish length, normalising units.
    pub fn with_font_size(mut self, size: &str) -> Self {
        self.font_size = normalize_font_size(size);
        self
    }

    pub fn with_callback(mut self, f: impl Fn() + 'static) -> Self {
        self.callback = Callback::new(f);
        self
    }

    pub fn with_on_start(mut self, f: impl Fn() + 'static) -> Self {
        self.on_start = Callback::new(f);
        self
    }

    pub fn with_on_scratching(mut self, f: impl Fn() + 'static) -> Self {
        self.on_scratching = Callback::new(f);
        self
    }
}
