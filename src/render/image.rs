//! Conversions between `image` RGBA buffers and tiny-skia pixmaps
//!
//! `RgbaImage` stores straight alpha while tiny-skia works on premultiplied
//! pixels, so every crossing converts explicitly.

use anyhow::Context;
use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap, PixmapRef};

/// Build a premultiplied pixmap from a straight-alpha image
pub fn pixmap_from_rgba(img: &RgbaImage) -> anyhow::Result<Pixmap> {
    let (w, h) = img.dimensions();
    let mut pixmap =
        Pixmap::new(w, h).with_context(|| format!("cannot allocate {w}x{h} pixmap"))?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Copy a premultiplied pixmap back into a straight-alpha image
pub fn rgba_from_pixmap(pixmap: PixmapRef<'_>) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    img
}
