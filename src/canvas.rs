//! Canvas capability: the compositor only ever asks for dimensions and sets
//! single pixels fully opaque, which keeps image encoding behind this seam.

use image::{Rgba, RgbaImage};
use std::path::Path;

/// Ink for set bits: fully opaque white on a transparent background.
const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub trait Canvas {
    fn dimensions(&self) -> (u32, u32);
    /// Marks one pixel fully opaque. Callers guarantee in-bounds coordinates.
    fn set_opaque(&mut self, x: u32, y: u32);
}

/// RGBA raster backed by the `image` crate; starts fully transparent.
pub struct RgbaCanvas {
    img: RgbaImage,
}

impl RgbaCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbaImage::new(width, height),
        }
    }

    /// Encodes to `path`; the format is picked from the file extension.
    pub fn save(&self, path: &Path) -> image::ImageResult<()> {
        self.img.save(path)
    }
}

impl Canvas for RgbaCanvas {
    #[inline(always)]
    fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    #[inline(always)]
    fn set_opaque(&mut self, x: u32, y: u32) {
        self.img.put_pixel(x, y, INK);
    }
}

#[cfg(test)]
mod tests {
    use super::{Canvas, RgbaCanvas};

    #[test]
    fn starts_transparent_and_paints_opaque_white() {
        let mut canvas = RgbaCanvas::new(4, 3);
        assert_eq!(canvas.dimensions(), (4, 3));
        assert!(
            canvas.img.pixels().all(|px| px.0 == [0, 0, 0, 0]),
            "fresh canvas must be fully transparent"
        );

        canvas.set_opaque(2, 1);
        assert_eq!(canvas.img.get_pixel(2, 1).0, [255, 255, 255, 255]);
        assert_eq!(
            canvas.img.pixels().filter(|px| px.0[3] != 0).count(),
            1,
            "only the painted pixel may be opaque"
        );
    }
}
