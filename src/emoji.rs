//! Emoji stand-ins for terminal listings
//!
//! Colors are mapped to the nearest colored square so a gallery can be
//! previewed in a terminal that cannot show the real swatch.

use crate::color::Rgb;

const BLACK: &str = "⬛";
const WHITE: &str = "⬜";
const RED: &str = "🟥";
const ORANGE: &str = "🟧";
const YELLOW: &str = "🟨";
const GREEN: &str = "🟩";
const BLUE: &str = "🟦";
const PURPLE: &str = "🟪";
const BROWN: &str = "🟫";

/// Pick the colored square closest to `color`.
///
/// Lightness below 15% is black and above 85% is white; desaturated colors
/// fall to whichever of the two is nearer. Dark, muted oranges read as brown.
/// Remaining hues are bucketed: red `[345, 15)`, orange `[15, 45)`,
/// yellow `[45, 75)`, green `[75, 165)`, blue `[165, 255)`, purple `[255, 345)`.
///
/// ```
/// use swatchmix::color::Rgb;
/// use swatchmix::emoji::color_to_emoji;
///
/// assert_eq!(color_to_emoji(Rgb::new(255, 0, 0)), "🟥");
/// assert_eq!(color_to_emoji(Rgb::new(128, 0, 128)), "🟪");
/// ```
pub fn color_to_emoji(color: Rgb) -> &'static str {
    let (h, s, l) = rgb_to_hsl(color);

    if l < 0.15 {
        return BLACK;
    }
    if l > 0.85 {
        return WHITE;
    }
    if s < 0.15 {
        return if l < 0.5 { BLACK } else { WHITE };
    }
    if (0.2..0.5).contains(&l) && (15.0..50.0).contains(&h) && s < 0.7 {
        return BROWN;
    }

    match h {
        h if !(15.0..345.0).contains(&h) => RED,
        h if h < 45.0 => ORANGE,
        h if h < 75.0 => YELLOW,
        h if h < 165.0 => GREEN,
        h if h < 255.0 => BLUE,
        _ => PURPLE,
    }
}

/// Hue in degrees, saturation and lightness as fractions.
fn rgb_to_hsl(color: Rgb) -> (f32, f32, f32) {
    let r = color.r as f32 / 255.0;
    let g = color.g as f32 / 255.0;
    let b = color.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta < f32::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (h, s, l)
}
