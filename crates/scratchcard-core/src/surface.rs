//! Software drawing surface backing the scratch canvas.
//!
//! Pixels are RGBA8 premultiplied, so a fully erased pixel is exactly
//! `[0, 0, 0, 0]`. A zero-area surface holds no buffer at all.

use crate::bitmap::Bitmap;
use crate::types::PixelRect;
use glam::Vec2;
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder,
    Pixmap, PixmapPaint, Point, Rect, Shader, SpreadMode, Transform,
};

/// How newly drawn shapes combine with existing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint on top.
    #[default]
    SourceOver,
    /// Remove existing opacity wherever the shape is drawn.
    DestinationOut,
}

impl Composite {
    fn blend_mode(self) -> BlendMode {
        match self {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        }
    }
}

pub struct Surface {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
    composite: Composite,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
            composite: Composite::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn composite(&self) -> Composite {
        self.composite
    }

    /// Reallocate the buffer. Like a canvas backing store, this clears it.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("surface resize {}x{} -> {}x{}", self.width, self.height, width, height);
        self.width = width;
        self.height = height;
        self.pixmap = Pixmap::new(width, height);
    }

    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Run `draw` with `composite` active, restoring the previous mode after.
    pub fn with_composite<R>(&mut self, composite: Composite, draw: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.composite;
        self.composite = composite;
        let out = draw(self);
        self.composite = saved;
        out
    }

    fn paint(&self, shader: Shader<'static>) -> Paint<'static> {
        Paint {
            shader,
            blend_mode: self.composite.blend_mode(),
            anti_alias: true,
            ..Default::default()
        }
    }

    fn full_rect(&self) -> Option<Rect> {
        Rect::from_xywh(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// Cover the whole surface with a solid colour.
    pub fn fill_color(&mut self, color: Color) {
        let paint = self.paint(Shader::SolidColor(color));
        self.fill_full(&paint);
    }

    /// Cover the whole surface with a linear gradient. Returns false when
    /// the stops cannot form a gradient.
    pub fn fill_linear_gradient(&mut self, start: Vec2, end: Vec2, stops: &[(f32, Color)]) -> bool {
        let shader = match stops {
            [] => return false,
            [(_, color)] => Shader::SolidColor(*color),
            _ => {
                let stops = stops
                    .iter()
                    .map(|(offset, color)| GradientStop::new(*offset, *color))
                    .collect();
                match LinearGradient::new(
                    Point::from_xy(start.x, start.y),
                    Point::from_xy(end.x, end.y),
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ) {
                    Some(shader) => shader,
                    None => return false,
                }
            }
        };
        let paint = self.paint(shader);
        self.fill_full(&paint);
        true
    }

    fn fill_full(&mut self, paint: &Paint<'_>) {
        let Some(rect) = self.full_rect() else {
            return;
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_rect(rect, paint, Transform::identity(), None);
        }
    }

    /// Draw a bitmap stretched over the whole surface.
    pub fn draw_bitmap_cover(&mut self, bitmap: &Bitmap) {
        let sx = self.width as f32 / bitmap.width() as f32;
        let sy = self.height as f32 / bitmap.height() as f32;
        let quality = if sx == 1.0 && sy == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: self.composite.blend_mode(),
            quality,
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.draw_pixmap(0, 0, bitmap.as_pixmap(), &paint, Transform::from_scale(sx, sy), None);
        }
    }

    /// Fill a circle with opaque black using the active composite mode.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32) {
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        let paint = self.paint(Shader::SolidColor(Color::BLACK));
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of pixels whose four channels are all zero.
    pub fn transparent_count(&self) -> usize {
        self.pixmap.as_ref().map_or(0, |pixmap| {
            pixmap
                .data()
                .chunks_exact(4)
                .filter(|px| px.iter().all(|&c| c == 0))
                .count()
        })
    }

    /// Fraction of fully transparent pixels; 0 for an empty surface.
    pub fn transparent_fraction(&self) -> f32 {
        let total = self.pixel_count();
        if total == 0 {
            return 0.0;
        }
        (self.transparent_count() as f64 / total as f64) as f32
    }

    pub fn is_fully_opaque(&self) -> bool {
        self.pixmap
            .as_ref()
            .is_some_and(|pixmap| pixmap.pixels().iter().all(|px| px.alpha() == 255))
    }

    /// The whole surface as a rect, or `None` when it has no area.
    pub fn bounds(&self) -> Option<PixelRect> {
        PixelRect::covering(Vec2::ZERO, Vec2::new(self.width as f32, self.height as f32), self.width, self.height)
    }

    /// Straight-alpha RGBA8 copy of the buffer, ready for an `ImageData`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.bounds().map_or_else(Vec::new, |rect| self.region_rgba8(rect))
    }

    /// Straight-alpha RGBA8 copy of `rect`, row by row. The rect must lie
    /// within the surface.
    pub fn region_rgba8(&self, rect: PixelRect) -> Vec<u8> {
        let Some(pixmap) = self.pixmap.as_ref() else {
            return Vec::new();
        };
        let pixels = pixmap.pixels();
        let stride = self.width as usize;
        let mut out = Vec::with_capacity(rect.area() * 4);
        for row in rect.y as usize..(rect.y + rect.height) as usize {
            let start = row * stride + rect.x as usize;
            for px in &pixels[start..start + rect.width as usize] {
                let c = px.demultiply();
                out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }
        out
    }
}
