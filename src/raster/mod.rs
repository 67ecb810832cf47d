//! Rasterization of strokes, shapes and text into canvas bitmaps.
//!
//! Vector work goes through `tiny-skia`; the canvas itself stays an `image::RgbaImage`
//! with straight (non-premultiplied) alpha.

pub mod brush;
pub mod shapes;
pub mod text;

pub use brush::{EraserMode, StampShape};
pub use shapes::draw_shape;
pub use text::{FontBook, TextLayout};

use egui::Color32;
use image::RgbaImage;
use tiny_skia::{ColorU8, Paint, Pixmap};

use crate::geometry::PixelRect;

/// Bitmap holding an image plus every committed edit
pub type Canvas = RgbaImage;

/// Run `f` on a premultiplied copy of `canvas` and write the result back.
pub fn with_pixmap(canvas: &mut Canvas, f: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = Pixmap::new(canvas.width(), canvas.height()) else {
        log::warn!(
            "Skipping rasterization on an empty canvas ({}x{})",
            canvas.width(),
            canvas.height()
        );
        return;
    };

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(canvas.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    f(&mut pixmap);

    for (dst, src) in canvas.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
}

/// Anti-aliased paint in `color`
pub fn paint_for(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Copy the `rect` region out of `canvas`
pub fn crop(canvas: &Canvas, rect: PixelRect) -> Canvas {
    image::imageops::crop_imm(canvas, rect.x, rect.y, rect.width, rect.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_with_pixmap_roundtrips_opaque_pixels() {
        let mut canvas = RgbaImage::from_pixel(4, 3, Rgba([10, 200, 30, 255]));
        let before = canvas.clone();
        with_pixmap(&mut canvas, |_| {});
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_crop_dimensions() {
        let canvas = RgbaImage::new(1000, 800);
        let cropped = crop(&canvas, PixelRect { x: 100, y: 100, width: 400, height: 300 });
        assert_eq!(cropped.dimensions(), (400, 300));
    }
}
