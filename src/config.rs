//! Configuration persistence for docmark settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::HighlightColor;
use crate::viewport::FitMode;

/// Canvas configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Placement of newly loaded documents
    pub fit_mode: FitMode,
    /// Color behind the document (CSS-style)
    pub background: String,
    /// Brush diameter in screen pixels used until the caller overrides it
    pub brush_size: f32,
    /// Lower bound for wheel brush adjustments
    pub min_brush_size: f32,
    /// Upper bound for wheel brush adjustments
    pub max_brush_size: f32,
    /// Highlight color used until the caller overrides it (CSS-style)
    pub highlight_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::FitToCanvas,
            background: "#2b2b2b".to_string(),
            brush_size: 40.0,
            min_brush_size: 5.0,
            max_brush_size: 200.0,
            highlight_color: "#FFFF00".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "docmark";

    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Read configuration from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Write configuration to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    /// Parsed background color, falling back to the default
    pub fn background_color(&self) -> HighlightColor {
        HighlightColor::parse(&self.background).unwrap_or_else(|err| {
            log::warn!("Invalid background color, using default: {:?}", err);
            HighlightColor::rgb(0x2b, 0x2b, 0x2b)
        })
    }

    /// Parsed default highlight color, falling back to yellow
    pub fn highlight_color(&self) -> HighlightColor {
        HighlightColor::parse(&self.highlight_color).unwrap_or_else(|err| {
            log::warn!("Invalid highlight color, using default: {:?}", err);
            HighlightColor::default()
        })
    }

    /// Brush limits as an ordered, positive range
    pub fn brush_range(&self) -> (f32, f32) {
        (self.min_brush_size, self.max_brush_size)
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_brush_size.is_finite() && self.min_brush_size > 0.0) {
            self.min_brush_size = defaults.min_brush_size;
        }
        if !(self.max_brush_size.is_finite() && self.max_brush_size >= self.min_brush_size) {
            self.max_brush_size = self.min_brush_size.max(defaults.max_brush_size);
        }
        if !self.brush_size.is_finite() {
            self.brush_size = defaults.brush_size;
        }
        self.brush_size = self
            .brush_size
            .clamp(self.min_brush_size, self.max_brush_size);
        self
    }
}
