//! Shared drawing constants
//!
//! Values here are used both when drawing frames for the screen and when
//! flattening the highlight layer into an exported artifact.

use tiny_skia::{FilterQuality, PixmapPaint};

/// Alpha applied to the highlight layer when it is composited (128/255)
pub const HIGHLIGHT_ALPHA: u8 = 128;

/// Alpha of the brush preview circle drawn under the pointer
pub const BRUSH_PREVIEW_ALPHA: u8 = 96;

/// Highlight alpha as a paint opacity
#[inline]
pub fn highlight_opacity() -> f32 {
    f32::from(HIGHLIGHT_ALPHA) / 255.0
}

/// Paint for blending the highlight layer over a document
pub fn highlight_paint() -> PixmapPaint {
    PixmapPaint {
        opacity: highlight_opacity(),
        quality: FilterQuality::Bilinear,
        ..Default::default()
    }
}

/// Paint for drawing the document itself, fully opaque
pub fn document_paint() -> PixmapPaint {
    PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    }
}
