//! Rendering for the highlight canvas
//!
//! This module contains:
//! - Drawing constants shared between on-screen frames and flattened exports
//! - Raster conversions between `image` buffers and tiny-skia pixmaps
//! - The per-frame renderer used by the host's animation loop

pub mod frame;
pub mod geometry;
pub mod image;
