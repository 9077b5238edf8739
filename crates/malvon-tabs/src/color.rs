//! Tab group colors, persisted as `RRGGBBAA` hex strings

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0x00, 0x00, 0x00, 0xFF);
    /// Default for newly created groups
    pub const GROUP_DEFAULT: Color = Color::rgba(0xFF, 0xFF, 0xFF, 0xCC);
    /// Used when a persisted group carries no color
    pub const MINT: Color = Color::rgba(0x00, 0xC7, 0xBE, 0xCC);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    /// Anything else is opaque black.
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Self::BLACK;
        }
        let Ok(value) = u32::from_str_radix(hex, 16) else {
            return Self::BLACK;
        };

        match hex.len() {
            6 => Self::rgba((value >> 16) as u8, (value >> 8) as u8, value as u8, 0xFF),
            8 => Self::rgba(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ),
            _ => Self::BLACK,
        }
    }

    pub fn to_hex(&self) -> String {
        format!(
            "{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::GROUP_DEFAULT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl From<String> for Color {
    fn from(hex: String) -> Self {
        Self::from_hex(&hex)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::from_hex("#FF8000"), Color::rgba(0xFF, 0x80, 0x00, 0xFF));
        assert_eq!(Color::from_hex("ff800080"), Color::rgba(0xFF, 0x80, 0x00, 0x80));
        assert_eq!(Color::from_hex("  00C7BECC\n"), Color::MINT);
    }

    #[test]
    fn test_invalid_hex_is_black() {
        assert_eq!(Color::from_hex(""), Color::BLACK);
        assert_eq!(Color::from_hex("#FFF"), Color::BLACK);
        assert_eq!(Color::from_hex("not-a-color"), Color::BLACK);
        assert_eq!(Color::from_hex("+FFFFF"), Color::BLACK);
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::MINT).unwrap();
        assert_eq!(json, "\"00C7BECC\"");

        let parsed: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Color::MINT);
    }
}
