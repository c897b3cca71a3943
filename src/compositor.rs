//! Flattening the document and its highlight layer into one exportable PNG
//!
//! The layer is scaled to exactly cover the full-resolution raster, so a layer
//! painted over a downscaled display image lands on the same document regions.

use std::io;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};
use image::RgbaImage;
use tiny_skia::{Pixmap, Transform};

use crate::highlight::HighlightLayer;
use crate::loader::DocumentImage;
use crate::render::geometry::{document_paint, highlight_paint};
use crate::render::image::rgba_from_pixmap;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A flattened document encoded as base64 PNG, owned by the caller once emitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeArtifact {
    pub width: u32,
    pub height: u32,
    payload: String,
}

impl CompositeArtifact {
    /// Base64 PNG payload without any data-URI prefix
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn into_payload(self) -> String {
        self.payload
    }

    /// Payload wrapped as a `data:` URI
    pub fn data_uri(&self) -> String {
        format!("{DATA_URI_PREFIX}{}", self.payload)
    }

    /// Raw PNG bytes
    pub fn png_bytes(&self) -> anyhow::Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(&self.payload)
            .context("artifact payload is not valid base64")
    }
}

/// Keep only the base64 payload of a `data:...;base64,` URI
pub fn strip_data_uri_prefix(uri: &str) -> &str {
    match uri.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((_, payload)) => payload,
        None => uri,
    }
}

/// Draw the full-resolution document with the highlight layer blended on top
pub fn flatten(full: &DocumentImage, layer: &HighlightLayer) -> anyhow::Result<RgbaImage> {
    let (w, h) = (full.width(), full.height());
    let mut buffer =
        Pixmap::new(w, h).with_context(|| format!("cannot allocate {w}x{h} flatten buffer"))?;

    buffer.draw_pixmap(
        0,
        0,
        full.pixmap(),
        &document_paint(),
        Transform::identity(),
        None,
    );

    let scale_x = w as f32 / layer.width() as f32;
    let scale_y = h as f32 / layer.height() as f32;
    buffer.draw_pixmap(
        0,
        0,
        layer.pixmap(),
        &highlight_paint(),
        Transform::from_scale(scale_x, scale_y),
        None,
    );

    Ok(rgba_from_pixmap(buffer.as_ref()))
}

/// Flatten and encode, producing the artifact handed to the caller
pub fn composite(full: &DocumentImage, layer: &HighlightLayer) -> anyhow::Result<CompositeArtifact> {
    let flattened = flatten(full, layer)?;
    let mut png = Vec::new();
    write_png(&mut png, &flattened).context("encoding composite as PNG")?;

    Ok(CompositeArtifact {
        width: flattened.width(),
        height: flattened.height(),
        payload: general_purpose::STANDARD.encode(png),
    })
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}
