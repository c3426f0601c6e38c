//! Colour type and parsing.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{LitError, Result};

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Default light colour (a cyan-green tint).
    pub const LIGHT: Self = Self::rgb(0, 255, 179);

    /// Default preview background.
    pub const BACKGROUND: Self = Self::rgb(51, 51, 77);

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (3 digits, expanded to 6)
    /// - `#RRGGBB` (6 digits)
    /// - `#RRGGBBAA` (8 digits)
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || LitError::Parse {
            message: format!("Invalid hex colour: {}", s),
            help: Some("Use #RGB, #RRGGBB, or #RRGGBBAA format".to_string()),
        };
        // Byte slicing below needs single-byte characters.
        if !hex.is_ascii() {
            return Err(invalid());
        }

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let d = parse_hex_digit(c)?;
                    *slot = d << 4 | d;
                }
                Ok(Self::rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                Ok(Self::rgb(r, g, b))
            }
            8 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                let a = parse_hex_byte(&hex[6..8])?;
                Ok(Self::new(r, g, b, a))
            }
            _ => Err(invalid()),
        }
    }

    /// Convert to RGBA array.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// RGB components scaled to `0.0..=1.0`.
    pub fn to_vec3(self) -> Vec3 {
        let rgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        Vec3::new(rgb.red, rgb.green, rgb.blue)
    }

    /// Opaque colour from `0.0..=1.0` components (clamped).
    pub fn from_vec3(v: Vec3) -> Self {
        let rgb: Srgb<u8> = Srgb::new(v.x, v.y, v.z).into_format();
        Self::rgb(rgb.red, rgb.green, rgb.blue)
    }
}

impl FromStr for Colour {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// Persisted as `{r, g, b}` integer components.
impl Serialize for Colour {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RgbRecord { r: self.r, g: self.g, b: self.b }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rec = RgbRecord::deserialize(deserializer)?;
        Ok(Colour::rgb(rec.r, rec.g, rec.b))
    }
}

#[derive(Serialize, Deserialize)]
struct RgbRecord {
    r: u8,
    g: u8,
    b: u8,
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| LitError::Parse {
            message: format!("Invalid hex digit: {}", c),
            help: None,
        })
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| LitError::Parse {
        message: format!("Invalid hex byte: {}", s),
        help: None,
    })
}
