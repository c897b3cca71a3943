//! Per-frame drawing of the canvas onto the host surface
//!
//! Draw order: background, document through the viewport transform, tinted
//! highlight layer through the same transform, then the brush preview in
//! untransformed screen space.

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use super::geometry::{BRUSH_PREVIEW_ALPHA, document_paint, highlight_paint};
use crate::domain::{HighlightColor, Point};
use crate::highlight::HighlightLayer;
use crate::loader::DocumentImage;
use crate::viewport::Viewport;

/// Pointer cursor the host should show over the canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorIcon {
    Default,
    /// Hidden because the brush preview replaces it
    Hidden,
}

/// Brush outline drawn under the pointer while highlighting
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushPreview {
    /// Canvas-local pointer position
    pub center: Point,
    /// Brush diameter in screen pixels
    pub diameter: f32,
    pub color: HighlightColor,
}

/// Everything one frame needs to be drawn
pub struct Scene<'a> {
    pub background: HighlightColor,
    pub viewport: Viewport,
    pub document: Option<&'a DocumentImage>,
    pub layer: Option<&'a HighlightLayer>,
    pub highlighting: bool,
    pub brush: Option<BrushPreview>,
}

/// Draw `scene` onto `surface`, returning the cursor to show
pub fn draw_frame(surface: &mut Pixmap, scene: &Scene<'_>) -> CursorIcon {
    surface.fill(scene.background.opaque().into());

    let transform = scene.viewport.transform();
    if let Some(document) = scene.document {
        surface.draw_pixmap(
            0,
            0,
            document.pixmap(),
            &document_paint(),
            transform,
            None,
        );
    }
    if let Some(layer) = scene.layer {
        surface.draw_pixmap(0, 0, layer.pixmap(), &highlight_paint(), transform, None);
    }

    if !scene.highlighting {
        return CursorIcon::Default;
    }
    if let Some(brush) = scene.brush {
        draw_brush_preview(surface, &brush);
    }
    CursorIcon::Hidden
}

/// Translucent disc, sized in screen pixels regardless of zoom
fn draw_brush_preview(surface: &mut Pixmap, brush: &BrushPreview) {
    let radius = brush.diameter / 2.0;
    if !(radius.is_finite() && radius > 0.0) {
        return;
    }
    let Some(path) = PathBuilder::from_circle(brush.center.x, brush.center.y, radius) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(brush.color.with_alpha(BRUSH_PREVIEW_ALPHA).into());
    paint.anti_alias = true;
    surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StrokeSegment;
    use image::RgbaImage;

    fn document(w: u32, h: u32, rgba: [u8; 4]) -> DocumentImage {
        DocumentImage::from_rgba(&RgbaImage::from_pixel(w, h, image::Rgba(rgba)), "test").unwrap()
    }

    fn rgb(surface: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let p = surface.pixel(x, y).unwrap();
        (p.red(), p.green(), p.blue())
    }

    fn scene<'a>(
        viewport: Viewport,
        document: Option<&'a DocumentImage>,
        layer: Option<&'a HighlightLayer>,
    ) -> Scene<'a> {
        Scene {
            background: HighlightColor::rgb(10, 20, 30),
            viewport,
            document,
            layer,
            highlighting: false,
            brush: None,
        }
    }

    #[test]
    fn test_background_only() {
        let mut surface = Pixmap::new(8, 8).unwrap();
        let cursor = draw_frame(&mut surface, &scene(Viewport::default(), None, None));
        assert_eq!(cursor, CursorIcon::Default);
        assert_eq!(rgb(&surface, 4, 4), (10, 20, 30));
    }

    #[test]
    fn test_document_drawn_through_viewport() {
        let doc = document(10, 10, [255, 255, 255, 255]);
        let viewport = Viewport {
            offset_x: 20.0,
            offset_y: 20.0,
            zoom: 2.0,
        };
        let mut surface = Pixmap::new(64, 64).unwrap();
        draw_frame(&mut surface, &scene(viewport, Some(&doc), None));

        // Image covers screen 20..40 on both axes
        assert_eq!(rgb(&surface, 30, 30), (255, 255, 255));
        assert_eq!(rgb(&surface, 10, 10), (10, 20, 30));
        assert_eq!(rgb(&surface, 45, 30), (10, 20, 30));
    }

    #[test]
    fn test_highlight_layer_is_tinted() {
        let doc = document(20, 20, [255, 255, 255, 255]);
        let mut layer = HighlightLayer::new(20, 20).unwrap();
        layer.paint_segment(&StrokeSegment {
            from: Point::new(0.0, 10.0),
            to: Point::new(20.0, 10.0),
            color: HighlightColor::rgb(0, 0, 255),
            width: 8.0,
        });

        let mut surface = Pixmap::new(20, 20).unwrap();
        draw_frame(&mut surface, &scene(Viewport::default(), Some(&doc), Some(&layer)));

        let (r, g, b) = rgb(&surface, 10, 10);
        assert_eq!(b, 255);
        assert!((120..=135).contains(&r), "red {r}");
        assert!((120..=135).contains(&g), "green {g}");
        assert_eq!(rgb(&surface, 10, 1), (255, 255, 255));
    }

    #[test]
    fn test_brush_preview_ignores_zoom() {
        let viewport = Viewport {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 4.0,
        };
        let mut surface = Pixmap::new(100, 100).unwrap();
        let mut s = scene(viewport, None, None);
        s.highlighting = true;
        s.brush = Some(BrushPreview {
            center: Point::new(50.0, 50.0),
            diameter: 20.0,
            color: HighlightColor::rgb(255, 0, 0),
        });

        let cursor = draw_frame(&mut surface, &s);
        assert_eq!(cursor, CursorIcon::Hidden);
        assert_ne!(rgb(&surface, 50, 50), (10, 20, 30));
        assert_ne!(rgb(&surface, 58, 50), (10, 20, 30));
        assert_eq!(rgb(&surface, 62, 50), (10, 20, 30));
    }

    #[test]
    fn test_highlighting_without_pointer_hides_cursor() {
        let mut surface = Pixmap::new(4, 4).unwrap();
        let mut s = scene(Viewport::default(), None, None);
        s.highlighting = true;
        assert_eq!(draw_frame(&mut surface, &s), CursorIcon::Hidden);
        assert_eq!(rgb(&surface, 2, 2), (10, 20, 30));
    }
}
