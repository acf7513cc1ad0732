//! Item catalogs: the fixed palettes each mixer picks from.
//!
//! Built-in catalogs are plain tables of `(name, emoji)` pairs. The color
//! palette is generated from a fixed hue wheel so it is the same on every run.
//! The creation catalog is not built here; see [`crate::composite`].

use crate::models::{CatalogItem, Category, DisplayAsset};

/// Read-only id → item lookup for one category.
pub trait ItemCatalog: Send + Sync {
    /// All items in palette order.
    fn items(&self) -> &[CatalogItem];

    fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items().iter().find(|item| item.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// A catalog backed by an owned list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    /// Build a catalog, dropping later items that repeat an earlier id.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut unique: Vec<CatalogItem> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|u| u.id == item.id) {
                unique.push(item);
            }
        }
        Self { items: unique }
    }

    fn from_emoji(table: &[(&str, &str)]) -> Self {
        Self::new(
            table
                .iter()
                .map(|(name, glyph)| CatalogItem::new(*name, DisplayAsset::Emoji(glyph.to_string())))
                .collect(),
        )
    }
}

impl ItemCatalog for StaticCatalog {
    fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

/// Built-in catalog for a category.
///
/// `extra_colors` are appended to the color palette and ignored elsewhere.
/// The creation category starts empty; its items are projected from saved
/// galleries at runtime.
pub fn builtin(category: Category, extra_colors: &[String]) -> StaticCatalog {
    match category {
        Category::Color => color_palette(extra_colors),
        Category::Animal => StaticCatalog::from_emoji(ANIMALS),
        Category::Cartoon => StaticCatalog::from_emoji(CARTOONS),
        Category::Movie => StaticCatalog::from_emoji(MOVIES),
        Category::Sequel => StaticCatalog::from_emoji(SEQUELS),
        Category::Gem => StaticCatalog::from_emoji(GEMS),
        Category::Food => StaticCatalog::from_emoji(FOODS),
        Category::Magic => StaticCatalog::from_emoji(MAGIC_ITEMS),
        Category::Creation => StaticCatalog::default(),
    }
}

/// Hue steps on the color wheel, in degrees.
const HUE_STEP: u32 = 30;
/// Lightness levels (percent) per hue, darkest first.
const LIGHTNESS_LEVELS: [u32; 3] = [30, 50, 70];

/// The color palette: twelve hues at three lightness levels, fully
/// saturated, followed by any configured extra colors.
///
/// Ids are the `hsl(...)` strings themselves so a selection can be blended
/// without another lookup.
pub fn color_palette(extra_colors: &[String]) -> StaticCatalog {
    let mut items = Vec::new();
    for lightness in LIGHTNESS_LEVELS {
        for hue in (0..360).step_by(HUE_STEP as usize) {
            let hsl = format!("hsl({}, 100%, {}%)", hue, lightness);
            items.push(CatalogItem::new(hsl.clone(), DisplayAsset::Color(hsl)));
        }
    }
    items.extend(
        extra_colors
            .iter()
            .map(|c| CatalogItem::new(c.trim(), DisplayAsset::Color(c.trim().to_string()))),
    );
    StaticCatalog::new(items)
}

const ANIMALS: &[(&str, &str)] = &[
    ("Dog", "🐕"),
    ("Cat", "🐈"),
    ("Bird", "🐦"),
    ("Fish", "🐠"),
    ("Rabbit", "🐇"),
    ("Hamster", "🐹"),
    ("Snake", "🐍"),
    ("Lizard", "🦎"),
    ("Turtle", "🐢"),
    ("Horse", "🐎"),
    ("Cow", "🐄"),
    ("Pig", "🐖"),
    ("Chicken", "🐓"),
    ("Duck", "🦆"),
    ("Sheep", "🐑"),
    ("Goat", "🐐"),
    ("Llama", "🦙"),
    ("Fox", "🦊"),
    ("Wolf", "🐺"),
    ("Bear", "🐻"),
    ("Lion", "🦁"),
    ("Tiger", "🐯"),
    ("Elephant", "🐘"),
    ("Giraffe", "🦒"),
    ("Zebra", "🦓"),
    ("Monkey", "🐒"),
    ("Gorilla", "🦍"),
    ("Panda", "🐼"),
    ("Koala", "🐨"),
    ("Kangaroo", "🦘"),
    ("Penguin", "🐧"),
    ("Owl", "🦉"),
    ("Eagle", "🦅"),
    ("Parrot", "🦜"),
    ("Frog", "🐸"),
    ("Dolphin", "🐬"),
    ("Whale", "🐋"),
    ("Octopus", "🐙"),
    ("Butterfly", "🦋"),
];

const CARTOONS: &[(&str, &str)] = &[
    ("Robot", "🤖"),
    ("Alien", "👽"),
    ("Ghost", "👻"),
    ("Clown", "🤡"),
    ("Ninja", "🥷"),
    ("Superhero", "🦸"),
    ("Villain", "🦹"),
    ("Wizard", "🧙"),
    ("Fairy", "🧚"),
    ("Vampire", "🧛"),
    ("Mermaid", "🧜"),
    ("Elf", "🧝"),
    ("Genie", "🧞"),
    ("Zombie", "🧟"),
    ("Pirate", "🏴‍☠️"),
    ("Astronaut", "🧑‍🚀"),
    ("Detective", "🕵️"),
    ("Cowboy", "🤠"),
    ("Princess", "👸"),
    ("Knight", "🛡️"),
];

const MOVIES: &[(&str, &str)] = &[
    ("Space Opera", "🚀"),
    ("Western", "🌵"),
    ("Horror", "🧟"),
    ("Romance", "💘"),
    ("Heist", "💰"),
    ("Kaiju", "🦖"),
    ("Noir Detective", "🕵️"),
    ("Pirate Adventure", "🏴‍☠️"),
    ("Superhero", "🦸"),
    ("Musical", "🎤"),
    ("Sports Underdog", "🏆"),
    ("Time Travel", "⏳"),
    ("Disaster", "🌋"),
    ("Spy Thriller", "🕶️"),
    ("Fairy Tale", "🏰"),
    ("Road Trip", "🚗"),
];

const SEQUELS: &[(&str, &str)] = &[
    ("The Return", "🔁"),
    ("Revenge", "⚔️"),
    ("Origins", "🌱"),
    ("Reloaded", "🔄"),
    ("The Final Chapter", "🏁"),
    ("In Space", "🪐"),
    ("Underwater", "🌊"),
    ("Holiday Special", "🎄"),
    ("The Musical", "🎶"),
    ("Part Two", "2️⃣"),
    ("Rise of the Machines", "🤖"),
    ("Into the Multiverse", "🌌"),
];

const GEMS: &[(&str, &str)] = &[
    ("Diamond", "💎"),
    ("Ruby", "🔴"),
    ("Sapphire", "🔵"),
    ("Emerald", "🟢"),
    ("Amethyst", "🟣"),
    ("Topaz", "🟡"),
    ("Opal", "⚪"),
    ("Onyx", "⚫"),
    ("Pearl", "🦪"),
    ("Amber", "🟠"),
    ("Jade", "🍏"),
    ("Moonstone", "🌙"),
    ("Sunstone", "☀️"),
    ("Crystal", "🔮"),
];

const FOODS: &[(&str, &str)] = &[
    ("Pizza", "🍕"),
    ("Burger", "🍔"),
    ("Taco", "🌮"),
    ("Sushi", "🍣"),
    ("Ramen", "🍜"),
    ("Pancakes", "🥞"),
    ("Ice Cream", "🍦"),
    ("Donut", "🍩"),
    ("Cake", "🍰"),
    ("Hot Dog", "🌭"),
    ("Fries", "🍟"),
    ("Popcorn", "🍿"),
    ("Burrito", "🌯"),
    ("Salad", "🥗"),
    ("Spaghetti", "🍝"),
    ("Croissant", "🥐"),
    ("Cheese", "🧀"),
    ("Chocolate", "🍫"),
    ("Watermelon", "🍉"),
    ("Avocado", "🥑"),
];

const MAGIC_ITEMS: &[(&str, &str)] = &[
    ("Wand", "🪄"),
    ("Crystal Ball", "🔮"),
    ("Potion", "🧪"),
    ("Spellbook", "📖"),
    ("Enchanted Sword", "🗡️"),
    ("Magic Ring", "💍"),
    ("Amulet", "🧿"),
    ("Flying Carpet", "🧞"),
    ("Cauldron", "🫕"),
    ("Broomstick", "🧹"),
    ("Crown", "👑"),
    ("Magic Lamp", "🪔"),
    ("Shield", "🛡️"),
    ("Key", "🗝️"),
    ("Hourglass", "⌛"),
    ("Feather Quill", "🪶"),
];
