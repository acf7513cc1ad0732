//! Gallery rendering to image buffers

use crate::models::{Artifact, SavedEntry};
use image::{Rgba, RgbaImage};

/// Neutral grey for entries that carry no color
const NEUTRAL: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Largest cell side accepted; keeps a long gallery from allocating
/// absurd buffers.
pub const MAX_CELL: u32 = 512;

/// Render saved entries as a horizontal strip of `cell × cell` squares.
///
/// Color artifacts are drawn in their color. Image artifacts and legacy
/// entries without an artifact are drawn in neutral grey, so the strip
/// always has one cell per entry in gallery order.
///
/// `cell` is clamped to `1..=MAX_CELL`. An empty slice gives a 0×0 image.
///
/// # Examples
///
/// ```
/// use swatchmix::color::Rgb;
/// use swatchmix::models::{Artifact, EntryId, SavedEntry};
/// use swatchmix::renderer::render_swatches;
///
/// let entry = SavedEntry {
///     id: EntryId(1),
///     name: "Violet".to_string(),
///     artifact: Some(Artifact::color(Rgb::new(128, 0, 128))),
///     source_ids: vec![],
/// };
///
/// let image = render_swatches(&[entry], 4);
/// assert_eq!(image.dimensions(), (4, 4));
/// assert_eq!(image.get_pixel(0, 0).0, [128, 0, 128, 255]);
/// ```
pub fn render_swatches(entries: &[SavedEntry], cell: u32) -> RgbaImage {
    let cell = cell.clamp(1, MAX_CELL);
    if entries.is_empty() {
        return RgbaImage::new(0, 0);
    }

    let width = cell.saturating_mul(entries.len() as u32);
    let mut image = RgbaImage::new(width, cell);

    for (i, entry) in entries.iter().enumerate() {
        let fill = swatch_fill(entry);
        let x0 = i as u32 * cell;
        for y in 0..cell {
            for x in x0..x0 + cell {
                image.put_pixel(x, y, fill);
            }
        }
    }

    image
}

fn swatch_fill(entry: &SavedEntry) -> Rgba<u8> {
    match &entry.artifact {
        Some(Artifact::Color { value }) => value.to_rgba(),
        _ => NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::models::EntryId;

    fn entry(id: u64, artifact: Option<Artifact>) -> SavedEntry {
        SavedEntry { id: EntryId(id), name: format!("e{}", id), artifact, source_ids: Vec::new() }
    }

    #[test]
    fn test_render_strip() {
        let entries = vec![
            entry(1, Some(Artifact::color(Rgb::new(255, 0, 0)))),
            entry(2, Some(Artifact::image("https://img/x.png"))),
            entry(3, None),
            entry(4, Some(Artifact::color(Rgb::new(0, 0, 255)))),
        ];

        let image = render_swatches(&entries, 3);
        assert_eq!(image.dimensions(), (12, 3));

        assert_eq!(*image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(2, 2), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(3, 0), NEUTRAL);
        assert_eq!(*image.get_pixel(8, 1), NEUTRAL);
        assert_eq!(*image.get_pixel(9, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*image.get_pixel(11, 2), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_swatches(&[], 8).dimensions(), (0, 0));
    }

    #[test]
    fn test_cell_is_clamped() {
        let one = [entry(1, None)];
        assert_eq!(render_swatches(&one, 0).dimensions(), (1, 1));
        assert_eq!(render_swatches(&one, 10_000).dimensions(), (MAX_CELL, MAX_CELL));
    }
}
