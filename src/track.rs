use std::fmt;

use serde::Deserialize;

use crate::effect::Effect;
use crate::error::CaptionError;

/// An ASS colour, stored as its alpha/blue/green/red components.
///
/// Alpha follows ASS semantics: `0x00` is opaque, `0xFF` fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Colour {
    pub alpha: u8,
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Colour {
    pub const fn new(alpha: u8, blue: u8, green: u8, red: u8) -> Self {
        Self {
            alpha,
            blue,
            green,
            red,
        }
    }

    /// Colour as used inside override blocks, e.g. `&H00FFFF&`.
    pub fn override_code(&self) -> String {
        format!("&H{:02X}{:02X}{:02X}&", self.blue, self.green, self.red)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "&H{:02X}{:02X}{:02X}{:02X}",
            self.alpha, self.blue, self.green, self.red
        )
    }
}

impl TryFrom<String> for Colour {
    type Error = CaptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        crate::parser::parse_colour(&value)
    }
}

/// A single `Style:` line of the `[V4+ Styles]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Style {
    pub name: String,
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: Colour,
    pub secondary_colour: Colour,
    pub outline_colour: Colour,
    pub back_colour: Colour,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub scale_x: u32,
    pub scale_y: u32,
    pub spacing: f64,
    pub angle: f64,
    pub border_style: u8,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    pub encoding: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: "Dynamic".to_string(),
            font_name: "Mono".to_string(),
            font_size: 65,
            primary_colour: Colour::new(0x00, 0xFF, 0xFF, 0xFF),
            secondary_colour: Colour::new(0x00, 0x00, 0x00, 0x00),
            outline_colour: Colour::new(0x00, 0x00, 0x00, 0x00),
            back_colour: Colour::new(0x64, 0x00, 0x00, 0x00),
            bold: true,
            italic: false,
            underline: false,
            strike_out: false,
            scale_x: 100,
            scale_y: 100,
            spacing: -0.2,
            angle: 0.0,
            border_style: 1,
            outline: 2.0,
            shadow: 1.0,
            alignment: 5,
            margin_l: 80,
            margin_r: 80,
            margin_v: 40,
            encoding: 1,
        }
    }
}

/// Script info and style definitions written before the events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Header {
    pub play_res_x: u32,
    pub play_res_y: u32,
    pub styles: Vec<Style>,
}

impl Header {
    /// Name of the style events reference. Falls back to the ASS default.
    pub fn primary_style(&self) -> &str {
        self.styles
            .first()
            .map(|s| s.name.as_str())
            .unwrap_or("Default")
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            play_res_x: 1920,
            play_res_y: 1080,
            styles: vec![Style::default()],
        }
    }
}

/// Text of one event: the visual lines plus an optional animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub effect: Option<Effect>,
    pub lines: Vec<String>,
}

impl Payload {
    pub fn new(lines: Vec<String>, effect: Option<Effect>) -> Self {
        Self { effect, lines }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub layer: u32,
    pub start: f64,
    pub end: f64,
    pub style: String,
    pub text: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub header: Header,
    pub events: Vec<Event>,
    /// Display end of the whole track, already clamped to the max duration.
    pub end_time: f64,
}
