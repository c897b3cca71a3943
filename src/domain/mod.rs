//! Pure domain types with minimal dependencies
//!
//! Types here know nothing about loading, rendering or the canvas state
//! machine, so every other module can depend on them.

pub mod color;
pub mod geometry;
pub mod stroke;

pub use color::*;
pub use geometry::*;
pub use stroke::*;
