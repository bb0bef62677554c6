use glam::Vec2;

/// Opaque handle to a DOM node owned by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Page-space offset of an element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePos {
    pub top: f32,
    pub left: f32,
}

impl PagePos {
    pub fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    /// Map a page-space point into coordinates local to this offset.
    pub fn to_local(self, page: Vec2) -> Vec2 {
        Vec2::new(page.x - self.left, page.y - self.top)
    }
}

/// Axis-aligned block of whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Smallest block covering `min..max`, clipped to `width`x`height`.
    /// `None` when nothing of it lies on the surface.
    pub fn covering(min: Vec2, max: Vec2, width: u32, height: u32) -> Option<Self> {
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(width as f32);
        let y1 = max.y.ceil().min(height as f32);
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Mutable state of the scratch card.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScratchState {
    /// Fraction of fully transparent canvas pixels, in [0, 1].
    pub scratched_percent: f32,
    /// Canvas offset in page coordinates.
    pub canvas_pos: PagePos,
    /// Last brush position in canvas-local coordinates.
    pub brush_pos: Vec2,
}
