//! The creation catalog: saved entries from every gallery as ingredients
//!
//! Nothing here is stored. The catalog is projected from the galleries each
//! time it is needed, so it can never lag behind a save or a delete.

use crate::catalog::StaticCatalog;
use crate::gallery::GalleryStore;
use crate::models::{Artifact, CatalogItem, Category, EntryId, SavedEntry};

/// Catalog id of a saved entry: `"<category>:<entry id>"`.
///
/// Ids rather than names, because two entries may share a name.
pub fn composite_id(category: Category, id: EntryId) -> String {
    format!("{}:{}", category.key(), id)
}

/// Inverse of [`composite_id`].
pub fn parse_composite_id(s: &str) -> Option<(Category, EntryId)> {
    let (category, id) = s.split_once(':')?;
    Some((category.parse().ok()?, id.parse().ok()?))
}

/// How a saved entry is described inside a creation prompt.
pub fn composite_phrase(category: Category, entry: &SavedEntry) -> String {
    let name = entry.name.as_str();
    match category {
        Category::Color => match &entry.artifact {
            Some(Artifact::Color { value }) => format!("the color {} ({})", name, value),
            _ => format!("the color {}", name),
        },
        Category::Animal => format!("a {} creature", name),
        Category::Cartoon => format!("the cartoon character {}", name),
        Category::Movie => format!("the movie {}", name),
        Category::Sequel => format!("the sequel {}", name),
        Category::Gem => format!("the {} gemstone", name),
        Category::Food => format!("the dish {}", name),
        Category::Magic => format!("the magical {}", name),
        Category::Creation => format!("the creation {}", name),
    }
}

/// Build the creation catalog from `(category, gallery)` pairs, in the
/// order given and then in save order.
pub fn project_catalog<'a, I>(galleries: I) -> StaticCatalog
where
    I: IntoIterator<Item = (Category, &'a GalleryStore)>,
{
    let items = galleries
        .into_iter()
        .flat_map(|(category, gallery)| {
            gallery.list().iter().map(move |entry| {
                CatalogItem::new(composite_id(category, entry.id), entry.display_asset(category))
                    .with_label(entry.name.clone())
                    .with_phrase(composite_phrase(category, entry))
            })
        })
        .collect();
    StaticCatalog::new(items)
}
