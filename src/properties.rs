//! Rendering properties – the typed values a layout node carries, plus the
//! small value parsers (lengths, colours) shared by the later stages.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Horizontal text alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "C")]
    Center,
    #[serde(rename = "J")]
    Justify,
}

// ---------------------------------------------------------------------------
// Border sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Side::Left),
            "top" => Some(Side::Top),
            "right" => Some(Side::Right),
            "bottom" => Some(Side::Bottom),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Side::Left => 'L',
            Side::Top => 'T',
            Side::Right => 'R',
            Side::Bottom => 'B',
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Top => 2,
            Side::Right => 4,
            Side::Bottom => 8,
        }
    }
}

/// Set of sides that get a border stroke.
///
/// Displays as the side letters in `LTRB` order, or `0` when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSides(u8);

impl BorderSides {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub fn insert(&mut self, side: Side) {
        self.0 |= side.bit();
    }

    pub fn remove(&mut self, side: Side) {
        self.0 &= !side.bit();
    }

    pub fn contains(&self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn sides(&self) -> impl Iterator<Item = Side> + '_ {
        Side::ALL.into_iter().filter(|s| self.contains(*s))
    }

    /// Parse `LTRB`-style letters; `0` or an empty string is no border.
    pub fn parse(s: &str) -> Option<Self> {
        let mut sides = Self::NONE;
        for c in s.trim().chars() {
            match c.to_ascii_uppercase() {
                'L' => sides.insert(Side::Left),
                'T' => sides.insert(Side::Top),
                'R' => sides.insert(Side::Right),
                'B' => sides.insert(Side::Bottom),
                '0' => {}
                _ => return None,
            }
        }
        Some(sides)
    }
}

impl fmt::Display for BorderSides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        for side in self.sides() {
            write!(f, "{}", side.letter())?;
        }
        Ok(())
    }
}

impl Serialize for BorderSides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BorderSides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BorderSides::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid border sides {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Bold/italic flags. Displays as `B`, `I`, `BI` or the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontFlags {
    pub bold: bool,
    pub italic: bool,
}

impl fmt::Display for FontFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold {
            f.write_str("B")?;
        }
        if self.italic {
            f.write_str("I")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontRecord {
    pub family: String,
    pub style: FontFlags,
    pub size: f32,
}

impl Default for FontRecord {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            style: FontFlags::default(),
            size: 12.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// A node's own x or y contribution.
#[derive(Debug, Clone, PartialEq)]
pub enum Offset {
    /// Literal coordinate of an absolutely positioned node.
    Absolute(f32),
    /// Per-ancestor contributions of a relative node, summed at layout time.
    Deferred(Vec<f32>),
}

impl Offset {
    /// Collapse to a single coordinate. Deferred entries `<= 1` are fractions
    /// of `content_width`; larger entries are literal units.
    pub fn resolve(&self, content_width: f32) -> f32 {
        match self {
            Offset::Absolute(v) => *v,
            Offset::Deferred(entries) => entries
                .iter()
                .fold(0.0, |acc, v| {
                    acc + if *v <= 1.0 { v * content_width } else { *v }
                }),
        }
    }
}

// ---------------------------------------------------------------------------
// Property set
// ---------------------------------------------------------------------------

/// One rendering property produced by a style handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Align(Align),
    Border(BorderSides),
    DrawColor(String),
    FillColor(String),
    TextColor(String),
    Font(FontRecord),
    Width(f32),
    Height(f32),
    X(Offset),
    Y(Offset),
    LineBreak(bool),
}

/// All rendering properties of one layout node. `None` means "not produced".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub align: Option<Align>,
    pub border: Option<BorderSides>,
    pub draw_color: Option<String>,
    pub fill_color: Option<String>,
    pub text_color: Option<String>,
    pub font: Option<FontRecord>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub x: Option<Offset>,
    pub y: Option<Offset>,
    pub line_break: Option<bool>,
}

impl Properties {
    pub fn set(&mut self, property: Property) {
        match property {
            Property::Align(v) => self.align = Some(v),
            Property::Border(v) => self.border = Some(v),
            Property::DrawColor(v) => self.draw_color = Some(v),
            Property::FillColor(v) => self.fill_color = Some(v),
            Property::TextColor(v) => self.text_color = Some(v),
            Property::Font(v) => self.font = Some(v),
            Property::Width(v) => self.width = Some(v),
            Property::Height(v) => self.height = Some(v),
            Property::X(v) => self.x = Some(v),
            Property::Y(v) => self.y = Some(v),
            Property::LineBreak(v) => self.line_break = Some(v),
        }
    }

    /// The current font, or the canonical empty record.
    pub fn font_or_default(&self) -> FontRecord {
        self.font.clone().unwrap_or_default()
    }

    /// The current border sides, or no border.
    pub fn border_or_default(&self) -> BorderSides {
        self.border.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// A unit-stripped numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub percent: bool,
}

impl Length {
    /// Strip a trailing unit (`pt`, `px`, `mm`, …) or `%` and parse the number.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (s, percent) = match s.strip_suffix('%') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let number = s.trim_end_matches(|c: char| c.is_ascii_alphabetic()).trim();
        let value = number.parse::<f32>().ok()?;
        value.is_finite().then_some(Self { value, percent })
    }

    /// Value with `%` turned into a fraction (`50%` → `0.5`).
    pub fn fraction(&self) -> f32 {
        if self.percent {
            self.value / 100.0
        } else {
            self.value
        }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Decode the last six characters of `s` as `RRGGBB`.
    ///
    /// Returns `None` for shorter strings or non-hex digits, which callers
    /// treat as "no colour set".
    pub fn from_hex(s: &str) -> Option<Self> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() < 6 {
            return None;
        }
        let tail = &chars[chars.len() - 6..];
        if !tail.iter().all(char::is_ascii_hexdigit) {
            return None;
        }
        let hex: String = tail.iter().collect();
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Channels scaled to `0.0 ..= 1.0`.
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decodes_last_six_characters() {
        assert_eq!(
            Rgb::from_hex("#A1B2C3"),
            Some(Rgb {
                r: 161,
                g: 178,
                b: 195
            })
        );
        assert_eq!(Rgb::from_hex("0x00ff00"), Some(Rgb { r: 0, g: 255, b: 0 }));
    }

    #[test]
    fn short_or_invalid_hex_is_none() {
        assert_eq!(Rgb::from_hex("F00"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
        assert_eq!(Rgb::from_hex("#ffé0000"), None);
    }

    #[test]
    fn border_sides_are_a_set() {
        let mut a = BorderSides::ALL;
        a.remove(Side::Right);
        a.insert(Side::Top);
        let mut b = BorderSides::ALL;
        b.insert(Side::Top);
        b.remove(Side::Right);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "LTB");

        let mut c = BorderSides::NONE;
        c.insert(Side::Bottom);
        c.insert(Side::Bottom);
        assert_eq!(c.to_string(), "B");
        assert_eq!(BorderSides::NONE.to_string(), "0");
    }

    #[test]
    fn border_sides_parse() {
        assert_eq!(BorderSides::parse("LTRB"), Some(BorderSides::ALL));
        assert_eq!(BorderSides::parse("0"), Some(BorderSides::NONE));
        assert_eq!(BorderSides::parse("tb").map(|s| s.to_string()).as_deref(), Some("TB"));
        assert_eq!(BorderSides::parse("X"), None);
    }

    #[test]
    fn font_flags_display() {
        let mut flags = FontFlags::default();
        assert_eq!(flags.to_string(), "");
        flags.italic = true;
        assert_eq!(flags.to_string(), "I");
        flags.bold = true;
        assert_eq!(flags.to_string(), "BI");
    }

    #[test]
    fn length_parsing() {
        assert_eq!(Length::parse("12pt").map(|l| l.value), Some(12.0));
        assert_eq!(Length::parse(" 3.5 px").map(|l| l.value), Some(3.5));
        assert_eq!(Length::parse("50%").map(|l| l.fraction()), Some(0.5));
        assert_eq!(Length::parse("-4mm").map(|l| l.value), Some(-4.0));
        assert_eq!(Length::parse("auto"), None);
        assert_eq!(Length::parse(""), None);
    }

    #[test]
    fn deferred_offsets_scale_fractions() {
        let offset = Offset::Deferred(vec![0.25, 30.0]);
        assert_eq!(offset.resolve(200.0), 80.0);
        assert_eq!(Offset::Absolute(0.5).resolve(200.0), 0.5);
    }

    #[test]
    fn empty_deferred_sequence_is_positive_zero() {
        let resolved = Offset::Deferred(Vec::new()).resolve(200.0);
        assert_eq!(resolved, 0.0);
        assert!(resolved.is_sign_positive());
        assert_eq!(format!("{resolved}"), "0");
    }

    #[test]
    fn properties_track_emptiness() {
        let mut props = Properties::default();
        assert!(props.is_empty());
        props.set(Property::LineBreak(false));
        assert!(!props.is_empty());
        assert_eq!(props.font_or_default().size, 12.0);
        assert!(props.border_or_default().is_empty());
    }
}
