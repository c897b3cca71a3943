//! Image loading adapters
//!
//! Loads are the only asynchronous operations of the canvas. A loader turns a
//! source string into a decoded [`DocumentImage`] on a future that the canvas
//! awaits on its own single-threaded update path.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose};
use futures::FutureExt;
use futures::future::BoxFuture;
use image::RgbaImage;
use tiny_skia::{Pixmap, PixmapRef};

use crate::render::image::pixmap_from_rgba;

/// A decoded document raster, immutable once built
#[derive(Debug)]
pub struct DocumentImage {
    pixmap: Pixmap,
    source: String,
}

impl DocumentImage {
    /// Premultiply a decoded image, rejecting zero-sized rasters
    pub fn from_rgba(rgba: &RgbaImage, source: impl Into<String>) -> anyhow::Result<Self> {
        let source = source.into();
        if rgba.width() == 0 || rgba.height() == 0 {
            bail!("image {source:?} has no pixels");
        }
        let pixmap = pixmap_from_rgba(rgba).with_context(|| format!("converting {source:?}"))?;
        log::debug!(
            "DocumentImage decoded: {}x{} pixels from {:?}",
            rgba.width(),
            rgba.height(),
            source
        );
        Ok(Self { pixmap, source })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Source handle this raster was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Premultiplied pixels for drawing
    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Asynchronously resolves a source handle into a decoded raster
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &str) -> BoxFuture<'static, anyhow::Result<DocumentImage>>;
}

/// Loads filesystem paths, `file://` URLs and base64 `data:` URIs
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &str) -> BoxFuture<'static, anyhow::Result<DocumentImage>> {
        let source = source.to_string();
        async move {
            let decode_source = source.clone();
            let rgba = tokio::task::spawn_blocking(move || decode_source_blocking(&decode_source))
                .await
                .context("image decode task failed")??;
            DocumentImage::from_rgba(&rgba, source)
        }
        .boxed()
    }
}

fn decode_source_blocking(source: &str) -> anyhow::Result<RgbaImage> {
    let bytes = match SourceKind::classify(source) {
        SourceKind::DataUri(payload) => general_purpose::STANDARD
            .decode(payload.trim())
            .context("invalid base64 in data URI")?,
        SourceKind::Path(path) => {
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
        }
    };
    let img = image::load_from_memory(&bytes).with_context(|| format!("decoding {source:?}"))?;
    Ok(img.to_rgba8())
}

#[derive(Debug, PartialEq)]
enum SourceKind<'a> {
    DataUri(&'a str),
    Path(PathBuf),
}

impl<'a> SourceKind<'a> {
    fn classify(source: &'a str) -> Self {
        if let Some(rest) = source.strip_prefix("data:")
            && let Some((meta, payload)) = rest.split_once(',')
            && meta.ends_with(";base64")
        {
            return SourceKind::DataUri(payload);
        }
        let path = source.strip_prefix("file://").unwrap_or(source);
        SourceKind::Path(PathBuf::from(path))
    }
}

/// Serves pre-decoded images registered under source names
#[derive(Clone, Debug, Default)]
pub struct MemoryImageLoader {
    images: Arc<RwLock<HashMap<String, Arc<RgbaImage>>>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the image served for `source`
    pub fn insert(&self, source: impl Into<String>, image: RgbaImage) {
        if let Ok(mut images) = self.images.write() {
            images.insert(source.into(), Arc::new(image));
        }
    }

    /// Forget the image for `source`; later loads of it fail
    pub fn remove(&self, source: &str) {
        if let Ok(mut images) = self.images.write() {
            images.remove(source);
        }
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, source: &str) -> BoxFuture<'static, anyhow::Result<DocumentImage>> {
        let found = self
            .images
            .read()
            .ok()
            .and_then(|images| images.get(source).cloned());
        let source = source.to_string();
        async move {
            let rgba = found.with_context(|| format!("no image registered for {source:?}"))?;
            DocumentImage::from_rgba(&rgba, source)
        }
        .boxed()
    }
}
