//! Highlight colors parsed from CSS-style color strings

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, bail};

/// An 8-bit RGBA color, straight (non-premultiplied) alpha
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for HighlightColor {
    fn default() -> Self {
        // Classic highlighter yellow
        Self::rgb(255, 255, 0)
    }
}

impl HighlightColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a replaced alpha channel
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color at full opacity
    pub fn opaque(self) -> Self {
        self.with_alpha(255)
    }

    /// Parse a CSS-style color: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)` or a basic named color.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let spec = input.trim().to_ascii_lowercase();
        if let Some(hex) = spec.strip_prefix('#') {
            return parse_hex(hex).with_context(|| format!("invalid hex color {input:?}"));
        }
        if let Some(args) = spec
            .strip_prefix("rgba(")
            .or_else(|| spec.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(args)
                .with_context(|| format!("invalid functional color {input:?}"));
        }
        named(&spec).with_context(|| format!("unknown color name {input:?}"))
    }
}

impl FromStr for HighlightColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl From<HighlightColor> for tiny_skia::Color {
    fn from(c: HighlightColor) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

fn parse_hex(hex: &str) -> anyhow::Result<HighlightColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("non-hex digits");
    }
    let nibble = |i: usize| -> anyhow::Result<u8> {
        let v = u8::from_str_radix(&hex[i..i + 1], 16)?;
        Ok(v * 17)
    };
    let byte = |i: usize| -> anyhow::Result<u8> { Ok(u8::from_str_radix(&hex[i..i + 2], 16)?) };

    match hex.len() {
        3 => Ok(HighlightColor::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Ok(HighlightColor::rgba(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            nibble(3)?,
        )),
        6 => Ok(HighlightColor::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Ok(HighlightColor::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        n => bail!("expected 3, 4, 6 or 8 hex digits, got {n}"),
    }
}

fn parse_functional(args: &str) -> anyhow::Result<HighlightColor> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| -> anyhow::Result<u8> {
        let v: f32 = s.parse().with_context(|| format!("bad channel {s:?}"))?;
        Ok(v.clamp(0.0, 255.0).round() as u8)
    };

    match parts[..] {
        [r, g, b] => Ok(HighlightColor::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f32 = a.parse().with_context(|| format!("bad alpha {a:?}"))?;
            Ok(HighlightColor::rgba(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ))
        }
        _ => bail!("expected 3 or 4 components, got {}", parts.len()),
    }
}

fn named(name: &str) -> Option<HighlightColor> {
    let color = match name {
        "yellow" => HighlightColor::rgb(255, 255, 0),
        "red" => HighlightColor::rgb(255, 0, 0),
        "green" => HighlightColor::rgb(0, 128, 0),
        "lime" => HighlightColor::rgb(0, 255, 0),
        "blue" => HighlightColor::rgb(0, 0, 255),
        "cyan" | "aqua" => HighlightColor::rgb(0, 255, 255),
        "magenta" | "fuchsia" => HighlightColor::rgb(255, 0, 255),
        "orange" => HighlightColor::rgb(255, 165, 0),
        "pink" => HighlightColor::rgb(255, 192, 203),
        "purple" => HighlightColor::rgb(128, 0, 128),
        "black" => HighlightColor::rgb(0, 0, 0),
        "white" => HighlightColor::rgb(255, 255, 255),
        "transparent" => HighlightColor::rgba(0, 0, 0, 0),
        _ => return None,
    };
    Some(color)
}
