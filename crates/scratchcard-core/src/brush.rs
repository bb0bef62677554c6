use crate::constants::DEFAULT_BRUSH_RADIUS;
use crate::surface::Surface;
use crate::types::PixelRect;
use glam::Vec2;

/// Eraser stamp: a position in canvas-local pixels and a fixed radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    position: Vec2,
    radius: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_RADIUS)
    }
}

impl Brush {
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            radius,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Move the stamp. No clamping: off-canvas positions are clipped on draw.
    pub fn move_brush_pos(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Pixels a stamp at the current position can touch on a
    /// `width`x`height` surface, with a pixel of slack for anti-aliasing.
    pub fn footprint(&self, width: u32, height: u32) -> Option<PixelRect> {
        let reach = Vec2::splat(self.radius + 1.0);
        PixelRect::covering(self.position - reach, self.position + reach, width, height)
    }

    /// Stamp a filled disc at the current position using the surface's
    /// active composite mode.
    pub fn brush(&self, surface: &mut Surface) {
        surface.fill_circle(self.position, self.radius);
    }
}
