//! Core data model shared by catalogs, engines and galleries

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// One independent content domain, each with its own catalog and gallery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Color,
    Animal,
    Cartoon,
    Movie,
    Sequel,
    Gem,
    Food,
    Magic,
    /// Recombines saved entries from every gallery.
    Creation,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Color,
        Category::Animal,
        Category::Cartoon,
        Category::Movie,
        Category::Sequel,
        Category::Gem,
        Category::Food,
        Category::Magic,
        Category::Creation,
    ];

    /// Lowercase key used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Category::Color => "color",
            Category::Animal => "animal",
            Category::Cartoon => "cartoon",
            Category::Movie => "movie",
            Category::Sequel => "sequel",
            Category::Gem => "gem",
            Category::Food => "food",
            Category::Magic => "magic",
            Category::Creation => "creation",
        }
    }

    /// Human-readable mixer title.
    pub fn title(self) -> &'static str {
        match self {
            Category::Color => "Color Mixer",
            Category::Animal => "Animal Mixer",
            Category::Cartoon => "Cartoon Mixer",
            Category::Movie => "Movie Mixer",
            Category::Sequel => "Sequel Maker",
            Category::Gem => "Gem Mixer",
            Category::Food => "Food Mixer",
            Category::Magic => "Magic Item Mixer",
            Category::Creation => "Creation Mixer",
        }
    }

    /// Durable storage key holding this category's gallery.
    pub fn storage_key(self) -> &'static str {
        match self {
            Category::Color => "savedColors",
            Category::Animal => "savedAnimals",
            Category::Cartoon => "savedCartoons",
            Category::Movie => "savedMovies",
            Category::Sequel => "savedSequels",
            Category::Gem => "savedGems",
            Category::Food => "savedFoods",
            Category::Magic => "savedMagicItems",
            Category::Creation => "savedCreations",
        }
    }

    /// Glyph shown for a saved entry whose artifact is missing.
    pub fn fallback_glyph(self) -> &'static str {
        match self {
            Category::Color => "🎨",
            Category::Animal => "🐾",
            Category::Cartoon => "✏️",
            Category::Movie | Category::Sequel => "🎬",
            Category::Gem => "💎",
            Category::Food => "🍽️",
            Category::Magic => "✨",
            Category::Creation => "🌀",
        }
    }

    pub fn is_composite(self) -> bool {
        self == Category::Creation
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Stable identity of a saved entry within one gallery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(EntryId)
    }
}

/// Something small that can stand for an item on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DisplayAsset {
    Emoji(String),
    /// A color string in any format `parse_color` accepts.
    Color(String),
    /// Reference (usually a URL) to an externally generated image.
    Image(String),
    Placeholder(String),
}

impl fmt::Display for DisplayAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayAsset::Emoji(s)
            | DisplayAsset::Color(s)
            | DisplayAsset::Image(s)
            | DisplayAsset::Placeholder(s) => f.write_str(s),
        }
    }
}

/// An immutable entry in a category's palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Identity used by selections.
    pub id: String,
    pub label: String,
    pub asset: DisplayAsset,
    /// Descriptive text substituted into generation prompts.
    pub phrase: String,
}

impl CatalogItem {
    /// Item whose label and phrase are its id.
    pub fn new(id: impl Into<String>, asset: DisplayAsset) -> Self {
        let id = id.into();
        Self { label: id.clone(), phrase: id.clone(), id, asset }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = phrase.into();
        self
    }
}

/// The single combined result of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Artifact {
    /// Blended locally.
    Color { value: Rgb },
    /// Produced by an external generator.
    Image { url: String },
    /// A single item kept as its glyph, from galleries saved before mixes
    /// were generated.
    Emoji { value: String },
}

impl Artifact {
    pub fn color(value: Rgb) -> Self {
        Artifact::Color { value }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Artifact::Image { url: url.into() }
    }

    pub fn emoji(value: impl Into<String>) -> Self {
        Artifact::Emoji { value: value.into() }
    }

    /// `rgb(...)` for colors, the URL for images, the glyph for emoji.
    pub fn reference(&self) -> String {
        match self {
            Artifact::Color { value } => value.to_string(),
            Artifact::Image { url } => url.clone(),
            Artifact::Emoji { value } => value.clone(),
        }
    }

    pub fn display_asset(&self) -> DisplayAsset {
        match self {
            Artifact::Color { value } => DisplayAsset::Color(value.to_string()),
            Artifact::Image { url } => DisplayAsset::Image(url.clone()),
            Artifact::Emoji { value } => DisplayAsset::Emoji(value.clone()),
        }
    }
}

/// A named, persisted artifact plus the ids that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    #[serde(default)]
    pub id: EntryId,
    pub name: String,
    /// `None` only for legacy entries saved before artifacts were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(default)]
    pub source_ids: Vec<String>,
}

impl SavedEntry {
    pub fn display_asset(&self, category: Category) -> DisplayAsset {
        match &self.artifact {
            Some(artifact) => artifact.display_asset(),
            None => DisplayAsset::Placeholder(category.fallback_glyph().to_string()),
        }
    }
}
