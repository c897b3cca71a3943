//! Pointer and wheel input dispatch
//!
//! Depending on the caller's mode flag, input either pans/zooms the viewport
//! or paints into the highlight layer. All positions are canvas-local.

use crate::domain::{CanvasBounds, HighlightColor, Point, StrokeSegment};
use crate::highlight::HighlightLayer;
use crate::viewport::{Viewport, ZOOM_STEP};

/// Brush size change per wheel notch
pub const BRUSH_STEP: f32 = 5.0;

/// Pointer events delivered by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed
    Down(Point),
    Moved(Point),
    /// Primary button released, anywhere
    Up(Point),
    /// Pointer left the canvas
    Left,
}

/// A wheel notch at a canvas-local position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    pub position: Point,
    /// Positive scrolls down
    pub delta_y: f32,
}

/// Whether the host should suppress its default handling of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Captured,
    Ignored,
}

/// Interaction state held between events
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InputState {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    /// `last` is `None` while the pointer is outside the canvas mid-stroke
    Highlighting {
        last: Option<Point>,
    },
}

/// Result of a wheel event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelAction {
    Ignored,
    /// Captured without a visible change (limit reached)
    Unchanged,
    Zoomed,
    BrushResized(f32),
}

/// What the dispatcher may touch while handling one event
pub struct InputContext<'a> {
    pub bounds: CanvasBounds,
    pub highlighting: bool,
    pub brush_size: f32,
    pub brush_range: (f32, f32),
    pub color: HighlightColor,
    pub viewport: &'a mut Viewport,
    pub layer: Option<&'a mut HighlightLayer>,
}

/// Interprets pointer and wheel events into viewport or layer changes
#[derive(Clone, Debug, Default)]
pub struct InputDispatcher {
    state: InputState,
    hover: Option<Point>,
}

impl InputDispatcher {
    pub fn state(&self) -> InputState {
        self.state
    }

    /// Last pointer position seen inside the canvas
    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    /// Abandon any drag in progress
    pub fn cancel(&mut self) {
        self.state = InputState::Idle;
    }

    /// Carry a held drag over into the new mode
    pub fn mode_changed(&mut self, highlighting: bool) {
        if self.state == InputState::Idle {
            return;
        }
        self.state = match (highlighting, self.hover) {
            (true, _) => InputState::Highlighting { last: None },
            (false, Some(last)) => InputState::Panning { last },
            (false, None) => InputState::Idle,
        };
    }

    pub fn pointer(&mut self, event: PointerEvent, cx: InputContext<'_>) -> EventStatus {
        match event {
            PointerEvent::Up(_) => {
                self.state = InputState::Idle;
                EventStatus::Ignored
            }
            PointerEvent::Left => {
                self.state = InputState::Idle;
                self.hover = None;
                EventStatus::Ignored
            }
            PointerEvent::Down(pos) => {
                if !cx.bounds.contains(pos) {
                    return EventStatus::Ignored;
                }
                self.hover = Some(pos);
                self.state = if cx.highlighting {
                    InputState::Highlighting { last: Some(pos) }
                } else {
                    InputState::Panning { last: pos }
                };
                EventStatus::Captured
            }
            PointerEvent::Moved(pos) => self.pointer_moved(pos, cx),
        }
    }

    fn pointer_moved(&mut self, pos: Point, cx: InputContext<'_>) -> EventStatus {
        if !cx.bounds.contains(pos) {
            self.hover = None;
            if let InputState::Highlighting { last } = &mut self.state {
                *last = None;
            }
            return EventStatus::Ignored;
        }
        self.hover = Some(pos);

        match self.state {
            InputState::Idle => EventStatus::Ignored,
            InputState::Panning { last } => {
                if cx.highlighting {
                    return EventStatus::Ignored;
                }
                let (dx, dy) = pos.delta_from(last);
                cx.viewport.pan(dx, dy);
                self.state = InputState::Panning { last: pos };
                EventStatus::Captured
            }
            InputState::Highlighting { last } => {
                if !cx.highlighting {
                    return EventStatus::Ignored;
                }
                self.state = InputState::Highlighting { last: Some(pos) };
                let (Some(last), Some(layer)) = (last, cx.layer) else {
                    return EventStatus::Captured;
                };
                let segment = StrokeSegment::screen_sized(
                    cx.viewport.screen_to_image(last),
                    cx.viewport.screen_to_image(pos),
                    cx.color,
                    cx.brush_size,
                    cx.viewport.zoom,
                );
                layer.paint_segment(&segment);
                EventStatus::Captured
            }
        }
    }

    pub fn wheel(&mut self, event: WheelEvent, cx: InputContext<'_>) -> WheelAction {
        if !cx.bounds.contains(event.position) {
            return WheelAction::Ignored;
        }
        if event.delta_y == 0.0 || !event.delta_y.is_finite() {
            return WheelAction::Unchanged;
        }
        let down = event.delta_y > 0.0;

        if cx.highlighting {
            let (min, max) = cx.brush_range;
            let step = if down { -BRUSH_STEP } else { BRUSH_STEP };
            let size = (cx.brush_size + step).clamp(min, max);
            return if size == cx.brush_size {
                WheelAction::Unchanged
            } else {
                WheelAction::BrushResized(size)
            };
        }

        let factor = if down { 1.0 - ZOOM_STEP } else { 1.0 + ZOOM_STEP };
        let zoom = cx.viewport.zoom * factor;
        if cx.viewport.zoom_at(event.position, zoom) {
            WheelAction::Zoomed
        } else {
            WheelAction::Unchanged
        }
    }
}
