use crate::error::{ScratchError, ScratchResult};
use std::fmt;
use tiny_skia::{ColorU8, Pixmap, PixmapRef};

/// A decoded raster image, stored premultiplied for drawing.
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    /// Build a bitmap from straight-alpha RGBA8 rows.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> ScratchResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ScratchError::ImageDecode(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ScratchError::ImageDecode(format!("empty image {width}x{height}")))?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// A bitmap filled with one straight-alpha colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ScratchResult<Self> {
        let data: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba(width, height, &data)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn as_pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
