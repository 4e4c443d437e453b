//! Content-driven cell styling: kind detection, alignment and level colors.

use crate::error::{ForecastReportError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ForecastReportError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ForecastReportError::InvalidColor(hex.to_string()))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ForecastReportError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Level(ConfidenceLevel),
    /// Starts with `SKU`, any case.
    Identifier,
    Numeric,
    Date,
    Text,
}

impl CellKind {
    pub fn detect(text: &str) -> Self {
        if let Some(level) = ConfidenceLevel::parse(text) {
            return Self::Level(level);
        }
        if text
            .get(..3)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("sku"))
        {
            return Self::Identifier;
        }
        if is_numeric(text) {
            return Self::Numeric;
        }
        if ISO_DATE.is_match(text) {
            return Self::Date;
        }
        Self::Text
    }

    pub fn alignment(&self) -> TextAlign {
        match self {
            Self::Level(_) => TextAlign::Center,
            Self::Numeric | Self::Date => TextAlign::Right,
            Self::Identifier | Self::Text => TextAlign::Left,
        }
    }

    pub fn level(&self) -> Option<ConfidenceLevel> {
        match self {
            Self::Level(level) => Some(*level),
            _ => None,
        }
    }
}

fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::from_hex("#0066cc").unwrap();
        assert_eq!(color, Color::rgb(0x00, 0x66, 0xCC));
        assert_eq!(color.to_hex(), "#0066CC");
        assert_eq!(Color::from_hex("003366").unwrap(), Color::rgb(0x00, 0x33, 0x66));
    }

    #[test]
    fn test_invalid_colors_are_rejected() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
        assert!(Color::from_hex("#+F+F+F").is_err());
        assert!(Color::from_hex("+0+0+0").is_err());
    }

    #[test]
    fn test_color_deserializes_from_hex_string() {
        let color: Color = serde_json::from_str("\"#996600\"").unwrap();
        assert_eq!(color, Color::rgb(0x99, 0x66, 0x00));
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }

    #[test]
    fn test_level_words_are_centered_in_any_case() {
        for word in ["high", "HIGH", "Medium", "low"] {
            let kind = CellKind::detect(word);
            assert!(kind.level().is_some(), "{word}");
            assert_eq!(kind.alignment(), TextAlign::Center);
        }
        assert_eq!(
            CellKind::detect("High"),
            CellKind::Level(ConfidenceLevel::High)
        );
    }

    #[test]
    fn test_numbers_and_dates_are_right_aligned() {
        assert_eq!(CellKind::detect("120"), CellKind::Numeric);
        assert_eq!(CellKind::detect("-4.25"), CellKind::Numeric);
        assert_eq!(CellKind::detect("2023-08-01"), CellKind::Date);
        assert_eq!(CellKind::detect("2023-08-01").alignment(), TextAlign::Right);
    }

    #[test]
    fn test_non_ascii_digits_are_text() {
        assert_eq!(CellKind::detect("٢٠٢٣-٠٨-٠١"), CellKind::Text);
        assert_eq!(CellKind::detect("١٢٠"), CellKind::Text);
    }

    #[test]
    fn test_identifiers_and_text_are_left_aligned() {
        assert_eq!(CellKind::detect("SKU001"), CellKind::Identifier);
        assert_eq!(CellKind::detect("sku-77"), CellKind::Identifier);
        assert_eq!(CellKind::detect("Widget"), CellKind::Text);
        assert_eq!(CellKind::detect(""), CellKind::Text);
        assert_eq!(CellKind::detect("NaN"), CellKind::Text);
        assert_eq!(CellKind::detect("Widget").alignment(), TextAlign::Left);
    }
}
