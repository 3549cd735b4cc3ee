//! Named color palette.
//!
//! Components refer to colors by name only. The palette maps each name to a
//! host color value and is turned into a stylesheet of
//! `.literal-fg-<name>` / `.literal-bg-<name>` rules that the surface
//! installs. One palette store exists per mounted root.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::color::{bg_class, fg_class};
use crate::error::{Error, Result};

/// Slot holding the default foreground color.
pub const DEFAULT_FG: &str = "defaultFG";

/// Slot holding the default background color.
pub const DEFAULT_BG: &str = "defaultBG";

/// Ordered mapping of color names to host color values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: IndexMap<String, String>,
}

impl Palette {
    /// A palette holding only the two default slots.
    pub fn new(default_fg: impl Into<String>, default_bg: impl Into<String>) -> Self {
        let mut colors = IndexMap::new();
        colors.insert(DEFAULT_FG.to_string(), default_fg.into());
        colors.insert(DEFAULT_BG.to_string(), default_bg.into());
        Self { colors }
    }

    /// Parse a JSON object of `name: value` pairs.
    pub fn from_json(document: &str) -> Result<Self> {
        let palette: Palette = serde_json::from_str(document)?;
        palette.validate()?;
        Ok(palette)
    }

    /// Add or replace a named color.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a named color in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.colors.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    pub fn default_fg(&self) -> Option<&str> {
        self.get(DEFAULT_FG)
    }

    pub fn default_bg(&self) -> Option<&str> {
        self.get(DEFAULT_BG)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check that both default slots are present.
    pub fn validate(&self) -> Result<()> {
        for slot in [DEFAULT_FG, DEFAULT_BG] {
            if !self.colors.contains_key(slot) {
                return Err(Error::MissingPaletteSlot(slot));
            }
        }
        Ok(())
    }

    /// CSS rules for every named color, in palette order.
    pub fn stylesheet(&self) -> String {
        self.colors
            .iter()
            .flat_map(|(name, value)| {
                [
                    format!(".{} {{ color: {value}; }}", fg_class(name)),
                    format!(".{} {{ background-color: {value}; }}", bg_class(name)),
                ]
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new("white", "black")
            .with("gray", "#3D3C3A")
            .with("red", "#B22222")
            .with("green", "#347C2C")
            .with("blue", "#4863A0")
            .with("cyan", "#57FEFF")
            .with("magenta", "#F6358A")
            .with("yellow", "#E2F516")
            .with("orange", "#EE9A4D")
            .with("white", "white")
            .with("black", "black")
    }
}
