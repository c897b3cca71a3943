//! The highlight canvas: one state struct owning viewport, layer, input and
//! the in-flight loads
//!
//! The host drives it from a single event loop:
//! - [`HighlightCanvas::update`] once per frame with the caller's props
//! - [`HighlightCanvas::handle_pointer`] / [`HighlightCanvas::handle_wheel`] for input
//! - [`HighlightCanvas::next_message`] + [`HighlightCanvas::handle_message`] to
//!   continue finished loads on the same loop
//! - [`HighlightCanvas::render`] to draw a frame
//!
//! Outputs leave through the [`CanvasEvent`] channel.

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tiny_skia::Pixmap;
use tokio::sync::mpsc::UnboundedSender;

use crate::compositor::{self, CompositeArtifact};
use crate::config::CanvasConfig;
use crate::domain::{CanvasBounds, HighlightColor};
use crate::edge::EdgeDetector;
use crate::highlight::HighlightLayer;
use crate::input::{
    EventStatus, InputContext, InputDispatcher, InputState, PointerEvent, WheelAction, WheelEvent,
};
use crate::loader::{DocumentImage, ImageLoader};
use crate::render::frame::{self, BrushPreview, CursorIcon, Scene};
use crate::viewport::Viewport;

/// Per-frame inputs supplied by the caller
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasProps {
    /// Display raster source; `None` means no document
    pub document_source: Option<String>,
    /// Higher-fidelity raster of the same document, used only when compositing
    pub full_resolution_source: Option<String>,
    pub highlighting: bool,
    /// Brush diameter in screen pixels
    pub brush_size: f32,
    /// CSS-style color spec
    pub highlight_color: String,
    /// Composite request; acted on when it turns true
    pub generate_trigger: bool,
}

impl CanvasProps {
    /// Props seeded from configuration defaults, with no document
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            document_source: None,
            full_resolution_source: None,
            highlighting: false,
            brush_size: config.brush_size,
            highlight_color: config.highlight_color.clone(),
            generate_trigger: false,
        }
    }
}

/// Outputs delivered to the caller
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    /// Fired once per successful composite, before the trigger is consumed
    CompositeImageReady(CompositeArtifact),
    /// Fired exactly once per trigger edge, success or failure
    GenerationTriggerConsumed,
    /// Wheel adjusted the brush while highlighting
    BrushSizeChanged(f32),
}

/// Completed asynchronous work, fed back through [`HighlightCanvas::handle_message`]
#[derive(Debug)]
pub enum CanvasMessage {
    DocumentLoaded {
        generation: u64,
        result: anyhow::Result<Arc<DocumentImage>>,
    },
    FullResolutionLoaded {
        ticket: u64,
        result: anyhow::Result<Arc<DocumentImage>>,
    },
}

/// A drawn frame ready for presentation
pub struct Frame<'a> {
    pub pixels: &'a Pixmap,
    pub cursor: CursorIcon,
}

#[derive(Clone, Copy, Debug)]
struct PendingComposite {
    ticket: u64,
}

/// Interactive pan/zoom/highlight canvas over one document image
pub struct HighlightCanvas {
    config: CanvasConfig,
    loader: Arc<dyn ImageLoader>,
    events: UnboundedSender<CanvasEvent>,
    tasks: FuturesUnordered<BoxFuture<'static, CanvasMessage>>,
    edges: EdgeDetector,
    props: CanvasProps,
    color: HighlightColor,
    background: HighlightColor,
    bounds: CanvasBounds,
    surface: Option<Pixmap>,
    viewport: Viewport,
    input: InputDispatcher,
    document: Option<Arc<DocumentImage>>,
    layer: Option<HighlightLayer>,
    document_generation: u64,
    composite: Option<PendingComposite>,
    next_ticket: u64,
}

impl HighlightCanvas {
    pub fn new(
        config: CanvasConfig,
        loader: Arc<dyn ImageLoader>,
        events: UnboundedSender<CanvasEvent>,
        bounds: CanvasBounds,
    ) -> Self {
        let props = CanvasProps::from_config(&config);
        let mut canvas = Self {
            color: config.highlight_color(),
            background: config.background_color(),
            config,
            loader,
            events,
            tasks: FuturesUnordered::new(),
            edges: EdgeDetector::default(),
            props,
            bounds: CanvasBounds::default(),
            surface: None,
            viewport: Viewport::default(),
            input: InputDispatcher::default(),
            document: None,
            layer: None,
            document_generation: 0,
            composite: None,
            next_ticket: 0,
        };
        canvas.resize(bounds.width, bounds.height);
        canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn document(&self) -> Option<&DocumentImage> {
        self.document.as_deref()
    }

    pub fn layer(&self) -> Option<&HighlightLayer> {
        self.layer.as_ref()
    }

    pub fn input_state(&self) -> InputState {
        self.input.state()
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    /// Brush size currently in effect, including wheel adjustments
    pub fn brush_size(&self) -> f32 {
        self.props.brush_size
    }

    pub fn highlight_color(&self) -> HighlightColor {
        self.color
    }

    /// Whether a composite is waiting on its full-resolution raster
    pub fn composite_pending(&self) -> bool {
        self.composite.is_some()
    }

    /// Whether any load is still in flight
    pub fn has_pending_work(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Apply the caller's props for this frame
    pub fn update(&mut self, props: &CanvasProps) {
        let edges = self.edges.observe(
            &props.document_source,
            props.highlighting,
            &props.highlight_color,
            props.generate_trigger,
        );
        self.props = props.clone();

        if edges.color_changed {
            match HighlightColor::parse(&props.highlight_color) {
                Ok(color) => self.color = color,
                Err(err) => log::warn!("Keeping highlight color {}: {:?}", self.color, err),
            }
        }
        if edges.highlighting_changed {
            self.input.mode_changed(props.highlighting);
        }
        if edges.document_changed {
            self.replace_document(props.document_source.clone());
        }
        if edges.trigger_rising {
            self.begin_composite();
        }
    }

    /// Host surface resized; the viewport is kept as is
    pub fn resize(&mut self, width: u32, height: u32) {
        self.bounds = CanvasBounds::new(width, height);
        self.surface = Pixmap::new(width, height);
        if self.surface.is_none() {
            log::debug!("Canvas resized to empty surface {width}x{height}");
        }
    }

    /// Re-place the loaded document for the current bounds and fit mode
    pub fn fit_document(&mut self) {
        if let Some(document) = &self.document {
            self.viewport.fit_to_image(
                document.width(),
                document.height(),
                self.bounds,
                self.config.fit_mode,
            );
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventStatus {
        let cx = InputContext {
            bounds: self.bounds,
            highlighting: self.props.highlighting,
            brush_size: self.props.brush_size,
            brush_range: self.config.brush_range(),
            color: self.color,
            viewport: &mut self.viewport,
            layer: self.layer.as_mut(),
        };
        self.input.pointer(event, cx)
    }

    pub fn handle_wheel(&mut self, event: WheelEvent) -> EventStatus {
        let cx = InputContext {
            bounds: self.bounds,
            highlighting: self.props.highlighting,
            brush_size: self.props.brush_size,
            brush_range: self.config.brush_range(),
            color: self.color,
            viewport: &mut self.viewport,
            layer: self.layer.as_mut(),
        };
        match self.input.wheel(event, cx) {
            WheelAction::Ignored => EventStatus::Ignored,
            WheelAction::Unchanged | WheelAction::Zoomed => EventStatus::Captured,
            WheelAction::BrushResized(size) => {
                self.props.brush_size = size;
                self.emit(CanvasEvent::BrushSizeChanged(size));
                EventStatus::Captured
            }
        }
    }

    /// Draw one frame onto the host surface
    pub fn render(&mut self) -> Option<Frame<'_>> {
        let surface = self.surface.as_mut()?;
        let brush = self.input.hover().map(|center| BrushPreview {
            center,
            diameter: self.props.brush_size,
            color: self.color,
        });
        let scene = Scene {
            background: self.background,
            viewport: self.viewport,
            document: self.document.as_deref(),
            layer: self.layer.as_ref(),
            highlighting: self.props.highlighting,
            brush,
        };
        let cursor = frame::draw_frame(surface, &scene);
        Some(Frame {
            pixels: surface,
            cursor,
        })
    }

    /// Wait for the next finished load; `None` when nothing is in flight
    pub async fn next_message(&mut self) -> Option<CanvasMessage> {
        self.tasks.next().await
    }

    /// Drive every in-flight load to completion
    pub async fn settle(&mut self) {
        while let Some(message) = self.next_message().await {
            self.handle_message(message);
        }
    }

    /// Continue a finished load on the canvas's update path
    pub fn handle_message(&mut self, message: CanvasMessage) {
        match message {
            CanvasMessage::DocumentLoaded { generation, result } => {
                if generation != self.document_generation {
                    log::debug!("Dropping stale document load (generation {generation})");
                    return;
                }
                match result {
                    Ok(image) => self.install_document(image),
                    Err(err) => {
                        log::warn!("Document load failed: {:?}", err);
                        self.clear_document();
                    }
                }
            }
            CanvasMessage::FullResolutionLoaded { ticket, result } => {
                let Some(pending) = self.composite.take_if(|p| p.ticket == ticket) else {
                    log::debug!("Dropping cancelled composite (ticket {ticket})");
                    return;
                };
                self.finish_composite(pending, result);
            }
        }
    }

    fn emit(&self, event: CanvasEvent) {
        if self.events.send(event).is_err() {
            log::warn!("Canvas event receiver dropped");
        }
    }

    fn clear_document(&mut self) {
        self.document = None;
        self.layer = None;
        self.input.cancel();
    }

    fn replace_document(&mut self, source: Option<String>) {
        if let Some(pending) = self.composite.take() {
            log::info!(
                "Document replaced, cancelling composite (ticket {})",
                pending.ticket
            );
            self.emit(CanvasEvent::GenerationTriggerConsumed);
        }

        self.document_generation += 1;
        self.clear_document();

        let Some(source) = source else {
            log::debug!("Document cleared");
            return;
        };
        log::debug!("Loading document {source:?}");
        let generation = self.document_generation;
        let load = self.loader.load(&source);
        self.tasks.push(
            load.map(move |result| CanvasMessage::DocumentLoaded {
                generation,
                result: result.map(Arc::new),
            })
            .boxed(),
        );
    }

    fn install_document(&mut self, image: Arc<DocumentImage>) {
        let (w, h) = (image.width(), image.height());
        let layer = match self.layer.take() {
            Some(mut layer) => layer.reset(w, h).map(|()| layer),
            None => HighlightLayer::new(w, h),
        };
        match layer {
            Ok(layer) => self.layer = Some(layer),
            Err(err) => {
                log::warn!("Document loaded without a highlight layer: {:?}", err);
            }
        }

        self.viewport
            .fit_to_image(w, h, self.bounds, self.config.fit_mode);
        self.input.cancel();
        self.document = Some(image);
    }

    fn begin_composite(&mut self) {
        if let Some(pending) = &self.composite {
            log::warn!(
                "Composite trigger rejected, ticket {} still pending",
                pending.ticket
            );
            self.emit(CanvasEvent::GenerationTriggerConsumed);
            return;
        }
        let Some(document) = self.document.clone() else {
            log::warn!("Composite triggered with no document loaded");
            self.emit(CanvasEvent::GenerationTriggerConsumed);
            return;
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.composite = Some(PendingComposite { ticket });

        let full_source = self
            .props
            .full_resolution_source
            .as_deref()
            .filter(|source| *source != document.source());
        let load: BoxFuture<'static, anyhow::Result<Arc<DocumentImage>>> = match full_source {
            Some(source) => {
                log::debug!("Loading full-resolution raster {source:?} (ticket {ticket})");
                self.loader.load(source).map(|r| r.map(Arc::new)).boxed()
            }
            None => future::ready(Ok(document)).boxed(),
        };
        self.tasks.push(
            load.map(move |result| CanvasMessage::FullResolutionLoaded { ticket, result })
                .boxed(),
        );
    }

    fn finish_composite(
        &mut self,
        pending: PendingComposite,
        result: anyhow::Result<Arc<DocumentImage>>,
    ) {
        match (result, self.layer.as_ref()) {
            (Ok(full), Some(layer)) => match compositor::composite(&full, layer) {
                Ok(artifact) => {
                    log::info!(
                        "Composite ready: {}x{} (ticket {})",
                        artifact.width,
                        artifact.height,
                        pending.ticket
                    );
                    self.emit(CanvasEvent::CompositeImageReady(artifact));
                }
                Err(err) => log::error!("Composite failed: {:?}", err),
            },
            (Ok(_), None) => log::warn!("Composite finished with no highlight layer"),
            (Err(err), _) => log::warn!("Full-resolution load failed: {:?}", err),
        }
        self.emit(CanvasEvent::GenerationTriggerConsumed);
    }
}
