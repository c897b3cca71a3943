//! Highlight layer: a raster registered to the document's pixel grid
//!
//! Strokes are painted at full opacity; translucency is applied only when the
//! layer is drawn on screen or flattened, so overlapping strokes never darken.

use anyhow::Context;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapRef, Stroke, Transform};

use crate::domain::StrokeSegment;

/// Raster buffer accumulating user-painted highlight strokes
#[derive(Clone, Debug)]
pub struct HighlightLayer {
    pixmap: Pixmap,
}

impl HighlightLayer {
    /// Allocate a transparent layer of the given pixel size
    pub fn new(width: u32, height: u32) -> anyhow::Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate {width}x{height} highlight layer"))?;
        Ok(Self { pixmap })
    }

    /// Drop all strokes and resize to the given dimensions
    pub fn reset(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        if self.dimensions() == (width, height) {
            self.clear();
        } else {
            *self = Self::new(width, height)?;
        }
        log::debug!("Highlight layer reset to {width}x{height}");
        Ok(())
    }

    /// Erase every stroke, keeping the allocation
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Premultiplied pixels for drawing
    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }

    /// True when nothing has been painted
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Paint one round-capped segment in image pixel coordinates
    pub fn paint_segment(&mut self, segment: &StrokeSegment) {
        if !(segment.width.is_finite() && segment.width > 0.0) {
            return;
        }

        let mut paint = Paint::default();
        paint.set_color(segment.color.opaque().into());
        paint.anti_alias = true;

        if segment.is_dot() {
            // A zero-length line has no direction for its caps, so stamp the cap
            if let Some(path) =
                PathBuilder::from_circle(segment.from.x, segment.from.y, segment.width / 2.0)
            {
                self.pixmap.fill_path(
                    &path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.x, segment.from.y);
        pb.line_to(segment.to.x, segment.to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width: segment.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HighlightColor, Point};

    fn segment(from: (f32, f32), to: (f32, f32), width: f32) -> StrokeSegment {
        StrokeSegment {
            from: from.into(),
            to: to.into(),
            color: HighlightColor::rgba(255, 255, 0, 40),
            width,
        }
    }

    fn pixel(layer: &HighlightLayer, x: u32, y: u32) -> tiny_skia::PremultipliedColorU8 {
        layer.pixmap().pixel(x, y).unwrap()
    }

    #[test]
    fn test_new_layer_is_blank() {
        let layer = HighlightLayer::new(20, 10).unwrap();
        assert_eq!(layer.dimensions(), (20, 10));
        assert!(layer.is_blank());
        assert!(HighlightLayer::new(0, 10).is_err());
    }

    #[test]
    fn test_segment_painted_opaque_with_round_caps() {
        let mut layer = HighlightLayer::new(100, 100).unwrap();
        layer.paint_segment(&segment((20.0, 50.0), (80.0, 50.0), 10.0));

        let mid = pixel(&layer, 50, 50);
        assert_eq!(mid.alpha(), 255);
        assert_eq!((mid.red(), mid.green(), mid.blue()), (255, 255, 0));

        // Round cap extends past the endpoint by half the width
        assert!(pixel(&layer, 17, 50).alpha() > 200);
        assert_eq!(pixel(&layer, 10, 50).alpha(), 0);
        assert_eq!(pixel(&layer, 50, 60).alpha(), 0);
    }

    #[test]
    fn test_overlapping_strokes_do_not_accumulate() {
        let mut layer = HighlightLayer::new(50, 50).unwrap();
        layer.paint_segment(&segment((5.0, 25.0), (45.0, 25.0), 8.0));
        let once = pixel(&layer, 25, 25);
        layer.paint_segment(&segment((25.0, 5.0), (25.0, 45.0), 8.0));
        assert_eq!(pixel(&layer, 25, 25), once);
    }

    #[test]
    fn test_dot_segment_paints_disc() {
        let mut layer = HighlightLayer::new(40, 40).unwrap();
        layer.paint_segment(&segment((20.0, 20.0), (20.0, 20.0), 10.0));
        assert_eq!(pixel(&layer, 20, 20).alpha(), 255);
        assert_eq!(pixel(&layer, 20, 30).alpha(), 0);
    }

    #[test]
    fn test_invalid_width_is_ignored() {
        let mut layer = HighlightLayer::new(10, 10).unwrap();
        layer.paint_segment(&segment((0.0, 0.0), (9.0, 9.0), 0.0));
        layer.paint_segment(&segment((0.0, 0.0), (9.0, 9.0), f32::INFINITY));
        assert!(layer.is_blank());
    }

    #[test]
    fn test_reset_clears_and_resizes() {
        let mut layer = HighlightLayer::new(30, 30).unwrap();
        layer.paint_segment(&segment((0.0, 15.0), (30.0, 15.0), 6.0));
        assert!(!layer.is_blank());

        layer.reset(30, 30).unwrap();
        assert!(layer.is_blank());

        layer.paint_segment(&segment((0.0, 15.0), (30.0, 15.0), 6.0));
        layer.reset(64, 48).unwrap();
        assert_eq!(layer.dimensions(), (64, 48));
        assert!(layer.is_blank());
    }

    #[test]
    fn test_strokes_outside_layer_are_clipped() {
        let mut layer = HighlightLayer::new(10, 10).unwrap();
        let seg = StrokeSegment {
            from: Point::new(-50.0, -50.0),
            to: Point::new(-20.0, -20.0),
            color: HighlightColor::default(),
            width: 4.0,
        };
        layer.paint_segment(&seg);
        assert!(layer.is_blank());
    }
}
