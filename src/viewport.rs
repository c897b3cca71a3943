//! Viewport transform: pan and zoom between screen and image space
//!
//! Screen coordinates are canvas-local pixels. Image coordinates are pixels of
//! the displayed document raster. The mapping is `screen = image * zoom + offset`.

use serde::{Deserialize, Serialize};
use tiny_skia::Transform;

use crate::domain::{CanvasBounds, Point};

/// Smallest allowed zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom factor
pub const MAX_ZOOM: f32 = 10.0;
/// Fraction of the canvas a fitted image occupies
pub const FIT_MARGIN: f32 = 0.95;
/// Relative zoom change per wheel notch
pub const ZOOM_STEP: f32 = 0.05;

/// How a freshly loaded document is placed on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMode {
    /// Scale the image to fit inside the canvas with a small margin
    #[default]
    FitToCanvas,
    /// Show the image at 1:1, centered
    NativeScale,
}

/// Affine pan/zoom state mapping image pixels to screen pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub offset_x: f32,
    pub offset_y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Clamp a zoom factor into the supported range
pub fn clamp_zoom(zoom: f32) -> f32 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl Viewport {
    /// Reset to the placement `mode` prescribes for an image on a canvas
    pub fn fit_to_image(
        &mut self,
        image_width: u32,
        image_height: u32,
        canvas: CanvasBounds,
        mode: FitMode,
    ) {
        if image_width == 0 || image_height == 0 {
            return;
        }
        let (iw, ih) = (image_width as f32, image_height as f32);
        let (cw, ch) = (canvas.width as f32, canvas.height as f32);

        self.zoom = match mode {
            FitMode::FitToCanvas if !canvas.is_empty() => {
                clamp_zoom((cw / iw).min(ch / ih) * FIT_MARGIN)
            }
            _ => 1.0,
        };
        self.offset_x = (cw - iw * self.zoom) / 2.0;
        self.offset_y = (ch - ih * self.zoom) / 2.0;

        log::debug!(
            "Viewport fitted {}x{} image into {}x{} canvas ({:?}): zoom {:.3}, offset ({:.1}, {:.1})",
            image_width,
            image_height,
            canvas.width,
            canvas.height,
            mode,
            self.zoom,
            self.offset_x,
            self.offset_y
        );
    }

    /// Map a canvas-local point into image pixel space
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.zoom,
            (screen.y - self.offset_y) / self.zoom,
        )
    }

    /// Map an image pixel position onto the canvas
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.offset_x,
            image.y * self.zoom + self.offset_y,
        )
    }

    /// Shift the image by a screen-space delta
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom so that the image point under `pivot` stays under `pivot`
    ///
    /// Returns false when the clamped zoom equals the current one and nothing changed.
    pub fn zoom_at(&mut self, pivot: Point, new_zoom: f32) -> bool {
        if !new_zoom.is_finite() {
            return false;
        }
        let new_zoom = clamp_zoom(new_zoom);
        if new_zoom == self.zoom {
            return false;
        }

        let ratio = new_zoom / self.zoom;
        self.offset_x = pivot.x - (pivot.x - self.offset_x) * ratio;
        self.offset_y = pivot.y - (pivot.y - self.offset_y) * ratio;
        self.zoom = new_zoom;
        true
    }

    /// Image-to-screen transform for drawing
    pub fn transform(&self) -> Transform {
        Transform::from_row(self.zoom, 0.0, 0.0, self.zoom, self.offset_x, self.offset_y)
    }
}
