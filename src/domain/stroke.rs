//! Stroke segments painted into the highlight layer

use super::{HighlightColor, Point};

/// One pointer-move sample of a highlight stroke, in image pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
    pub color: HighlightColor,
    /// Stroke width in image pixels
    pub width: f32,
}

impl StrokeSegment {
    /// Build a segment whose width keeps `brush_size` screen pixels of apparent
    /// size at the given zoom.
    pub fn screen_sized(
        from: Point,
        to: Point,
        color: HighlightColor,
        brush_size: f32,
        zoom: f32,
    ) -> Self {
        Self {
            from,
            to,
            color,
            width: brush_size / zoom,
        }
    }

    /// Both endpoints fall on the same spot
    pub fn is_dot(&self) -> bool {
        self.from.distance(self.to) < f32::EPSILON
    }
}
