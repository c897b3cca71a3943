//! Interactive document highlighting core
//!
//! This crate provides:
//! - A pan/zoom viewport over a document raster
//! - A highlight layer painted with freehand strokes
//! - Pointer and wheel dispatch between the two
//! - Per-frame rendering onto a host surface
//! - Flattening document + highlights into a base64 PNG for hand-off

pub mod canvas;
pub mod compositor;
pub mod config;
pub mod domain;
pub mod edge;
pub mod highlight;
pub mod input;
pub mod loader;
pub mod render;
pub mod viewport;

pub use canvas::{CanvasEvent, CanvasMessage, CanvasProps, Frame, HighlightCanvas};
pub use compositor::CompositeArtifact;
pub use config::CanvasConfig;
pub use domain::{CanvasBounds, HighlightColor, Point};
pub use input::{EventStatus, PointerEvent, WheelEvent};
pub use loader::{DocumentImage, FsImageLoader, ImageLoader, MemoryImageLoader};
pub use render::frame::CursorIcon;
pub use viewport::{FitMode, Viewport};
