//! Single source of truth for widget defaults and DOM marker names.

/// Default canvas width when sizing is fixed.
pub const DEFAULT_WIDTH: u32 = 300;

/// Default canvas height when sizing is fixed.
pub const DEFAULT_HEIGHT: u32 = 150;

/// Fraction of transparent pixels above which the card counts as finished.
pub const DEFAULT_FINISHED_THRESHOLD: f32 = 0.5;

pub const DEFAULT_FONT_FAMILY: &str = "serif";

pub const DEFAULT_FONT_SIZE: &str = "14px";

/// Light grey coating used when none is configured.
pub const DEFAULT_COATING: &str = "#c5c5c5";

/// Radius of one erasure stamp in canvas pixels.
pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;

/// Minimum spacing between two scratched-fraction scans, and between two
/// canvas relocations on scroll/resize (~one frame at 60 Hz).
pub const THROTTLE_INTERVAL_MS: f64 = 16.0;

/// Class marking every background node inserted under the canvas.
pub const CONTENT_CLASS: &str = "scratchcard-content";

/// Class of the span wrapping text content.
pub const CONTENT_TEXT_CLASS: &str = "scratchcard-content-text";

pub const MENU_ROOT_CLASS: &str = "scratchcard-menu-root";
pub const MENU_ITEM_CLASS: &str = "scratchcard-menu-item";
pub const MENU_WRAPPER_CLASS: &str = "scratchcard-menu-wrapper";
pub const MENU_HIDDEN_CLASS: &str = "scratchcard-menu-hidden";

/// Extra class carried by disabled menu entries.
pub const MENU_DISABLED_CLASS: &str = "disabled";
