//! Colours and named palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RoadmapError;

/// An opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `#RGB` or one of a handful of CSS colour names.
    pub fn parse(value: &str) -> Result<Self, RoadmapError> {
        let trimmed = value.trim();
        let named = match trimmed.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "red" => Some(Self::rgb(255, 0, 0)),
            "green" => Some(Self::rgb(0, 128, 0)),
            "blue" => Some(Self::rgb(0, 0, 255)),
            "grey" | "gray" => Some(Self::rgb(128, 128, 128)),
            "lightgrey" | "lightgray" => Some(Self::rgb(211, 211, 211)),
            "darkgrey" | "darkgray" => Some(Self::rgb(169, 169, 169)),
            _ => None,
        };
        if let Some(colour) = named {
            return Ok(colour);
        }

        let invalid = || RoadmapError::InvalidColour(value.to_string());
        let hex = trimmed
            .strip_prefix('#')
            .filter(|h| h.is_ascii())
            .ok_or_else(invalid)?;
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self::rgb(
                    expand(&hex[0..1])?,
                    expand(&hex[1..2])?,
                    expand(&hex[2..3])?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Perceptual luminance in `0.0..=1.0` using the 0.299/0.587/0.114 weights.
    pub fn luminance(&self) -> f32 {
        let [r, g, b] = self.unit();
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// White or black, whichever reads better on top of this colour.
    pub fn contrasting_text(&self) -> Colour {
        if self.luminance() < 0.6 {
            Colour::WHITE
        } else {
            Colour::BLACK
        }
    }

    /// Channels scaled to `0.0..=1.0`, as PDF colour operators expect.
    pub fn unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Colour {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Colour {
    type Error = RoadmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_hex()
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Fill and font colours for every roadmap component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Colour,
    pub title_font: Colour,
    pub subtitle_font: Colour,
    pub timeline_fill: Colour,
    pub timeline_font: Colour,
    pub group_fill: Colour,
    pub group_font: Colour,
    pub task_fill: Colour,
    pub task_font: Colour,
    pub milestone_fill: Colour,
    pub milestone_font: Colour,
    pub marker_line: Colour,
    pub marker_font: Colour,
    pub footer_font: Colour,
}

impl Default for Palette {
    fn default() -> Self {
        let accent_timeline = Colour::rgb(0x2E, 0x33, 0x4E);
        let accent_task = Colour::rgb(0x24, 0x78, 0x7A);
        let accent_milestone = Colour::rgb(0x39, 0xA5, 0xA7);
        Self {
            background: Colour::WHITE,
            title_font: Colour::BLACK,
            subtitle_font: Colour::rgb(0x55, 0x55, 0x55),
            timeline_fill: accent_timeline,
            timeline_font: Colour::WHITE,
            group_fill: accent_timeline,
            group_font: Colour::WHITE,
            task_fill: accent_task,
            task_font: Colour::WHITE,
            milestone_fill: accent_milestone,
            milestone_font: accent_timeline,
            marker_line: accent_milestone,
            marker_font: accent_milestone,
            footer_font: Colour::BLACK,
        }
    }
}

impl Palette {
    /// Look up one of the named colour themes (case-insensitive).
    pub fn theme(name: &str) -> Result<Self, RoadmapError> {
        let hex = |s: &str| Colour::parse(s).unwrap_or(Colour::BLACK);
        let base = Self::default();
        let palette = match name.trim().to_ascii_uppercase().as_str() {
            "" | "DEFAULT" => base,
            "GREYWOOF" => Self {
                subtitle_font: hex("#5A5A5A"),
                timeline_fill: hex("#3C3C3C"),
                group_fill: hex("#5A5A5A"),
                task_fill: hex("#8C8C8C"),
                milestone_fill: hex("#2B2B2B"),
                milestone_font: hex("#2B2B2B"),
                marker_line: hex("#B22222"),
                marker_font: hex("#B22222"),
                ..base
            },
            "BLUEMOUNTAIN" => Self {
                subtitle_font: hex("#1F3A5F"),
                timeline_fill: hex("#1F3A5F"),
                group_fill: hex("#2E5A88"),
                task_fill: hex("#4A90C2"),
                milestone_fill: hex("#0B2545"),
                milestone_font: hex("#0B2545"),
                marker_line: hex("#E07A1F"),
                marker_font: hex("#E07A1F"),
                ..base
            },
            "ORANGEPEEL" => Self {
                subtitle_font: hex("#7A3E00"),
                timeline_fill: hex("#B85C00"),
                group_fill: hex("#D9730D"),
                task_fill: hex("#F2A541"),
                task_font: Colour::BLACK,
                milestone_fill: hex("#7A3E00"),
                milestone_font: hex("#7A3E00"),
                marker_line: hex("#1F6F8B"),
                marker_font: hex("#1F6F8B"),
                ..base
            },
            "GREENTURTLE" => Self {
                subtitle_font: hex("#1E5631"),
                timeline_fill: hex("#1E5631"),
                group_fill: hex("#4C9A2A"),
                task_fill: hex("#76BA1B"),
                task_font: Colour::BLACK,
                milestone_fill: hex("#0F3D1E"),
                milestone_font: hex("#0F3D1E"),
                marker_line: hex("#C0392B"),
                marker_font: hex("#C0392B"),
                ..base
            },
            _ => return Err(RoadmapError::UnknownTheme(name.to_string())),
        };
        Ok(palette)
    }
}
