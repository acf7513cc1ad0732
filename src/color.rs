//! Color parsing and blending
//!
//! Supports the following input formats:
//! - Hex: `#RGB`, `#RRGGBB`
//! - Functional: `hsl()`, `hsla()`, `rgb()`, `rgba()`
//! - Anything else the CSS parser understands (named colors, `hwb()`, `oklch()`)
//!
//! Alpha is accepted but discarded: mixed colors are always opaque.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid hex length (must be 3 or 6 hex chars after #)
    #[error("invalid hex color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// A functional component could not be read as a number
    #[error("invalid color component '{0}'")]
    InvalidComponent(String),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque `image` pixel for rendering.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

/// Formats as `rgb(r, g, b)`, the form stored in galleries.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_color(&s).map_err(serde::de::Error::custom)
    }
}

/// Round half up, so 127.5 becomes 128.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

fn to_channel(v: f64) -> u8 {
    round_half_up(v).clamp(0.0, 255.0) as u8
}

/// Convert an HSL color to RGB.
///
/// `h` is in degrees and is wrapped into `[0, 360)`; `s` and `l` are
/// fractions in `[0, 1]` and are clamped. Sextant boundaries are half-open,
/// so `h = 60` falls in the `[60, 120)` sextant.
///
/// # Examples
///
/// ```
/// use swatchmix::color::{hsl_to_rgb, Rgb};
///
/// assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
/// assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
/// ```
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgb {
        r: to_channel((r + m) * 255.0),
        g: to_channel((g + m) * 255.0),
        b: to_channel((b + m) * 255.0),
    }
}

/// Per-channel arithmetic mean, each channel rounded half up.
///
/// Returns `None` for an empty slice.
pub fn average_rgb(colors: &[Rgb]) -> Option<Rgb> {
    if colors.is_empty() {
        return None;
    }

    let n = colors.len() as f64;
    let (r, g, b) = colors.iter().fold((0u32, 0u32, 0u32), |(r, g, b), c| {
        (r + c.r as u32, g + c.g as u32, b + c.b as u32)
    });

    Some(Rgb {
        r: to_channel(r as f64 / n),
        g: to_channel(g as f64 / n),
        b: to_channel(b as f64 / n),
    })
}

/// Blend a list of color strings into one color.
///
/// Every input is normalised to RGB and the results are averaged with
/// [`average_rgb`]. Inputs that cannot be parsed count as black rather than
/// aborting the blend: one bad swatch darkens the result instead of losing it.
/// An empty list blends to black.
///
/// ```
/// use swatchmix::color::{blend_colors, Rgb};
///
/// assert_eq!(blend_colors(&["#fff", "#000"]), Rgb::new(128, 128, 128));
/// assert_eq!(blend_colors(&["#fff", "not-a-color"]), Rgb::new(128, 128, 128));
/// ```
pub fn blend_colors<S: AsRef<str>>(colors: &[S]) -> Rgb {
    let resolved: Vec<Rgb> = colors
        .iter()
        .map(|c| {
            let c = c.as_ref();
            parse_color(c).unwrap_or_else(|e| {
                warn!(color = c, error = %e, "unparseable color treated as black");
                Rgb::BLACK
            })
        })
        .collect();

    average_rgb(&resolved).unwrap_or(Rgb::BLACK)
}

/// Parse a color string into an opaque RGB color.
///
/// # Examples
///
/// ```
/// use swatchmix::color::{parse_color, Rgb};
///
/// assert_eq!(parse_color("#F00").unwrap(), Rgb::new(255, 0, 0));
/// assert_eq!(parse_color("hsl(120, 100%, 50%)").unwrap(), Rgb::new(0, 255, 0));
/// assert_eq!(parse_color("rgb(1, 2, 3)").unwrap(), Rgb::new(1, 2, 3));
/// assert_eq!(parse_color("blue").unwrap(), Rgb::new(0, 0, 255));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty or unparseable.
pub fn parse_color(s: &str) -> Result<Rgb, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(caps) = hsl_pattern().captures(&lower) {
        let h = parse_component(&caps[1])?;
        let sat = parse_component(&caps[2])? / 100.0;
        let light = parse_component(&caps[3])? / 100.0;
        return Ok(hsl_to_rgb(h, sat, light));
    }

    if let Some(caps) = rgb_pattern().captures(&lower) {
        return Ok(Rgb {
            r: to_channel(parse_component(&caps[1])?),
            g: to_channel(parse_component(&caps[2])?),
            b: to_channel(parse_component(&caps[3])?),
        });
    }

    parse_css_color(s)
}

fn hsl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^hsla?\(\s*(-?[\d.]+)(?:deg)?\s*(?:,\s*|\s+)([\d.]+)%?\s*(?:,\s*|\s+)([\d.]+)%?\s*(?:[,/]\s*[\d.]+%?\s*)?\)$",
        )
        .expect("hsl pattern is valid")
    })
}

fn rgb_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^rgba?\(\s*([\d.]+)\s*(?:,\s*|\s+)([\d.]+)\s*(?:,\s*|\s+)([\d.]+)\s*(?:[,/]\s*[\d.]+%?\s*)?\)$",
        )
        .expect("rgb pattern is valid")
    })
}

fn parse_component(s: &str) -> Result<f64, ColorError> {
    s.parse::<f64>().map_err(|_| ColorError::InvalidComponent(s.to_string()))
}

/// Parse the digits of a hex color (`RGB` or `RRGGBB`, no leading `#`).
fn parse_hex_color(hex: &str) -> Result<Rgb, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<u8> = hex.bytes().map(hex_value).collect();
    match digits.as_slice() {
        // #RGB -> #RRGGBB, each digit doubled
        [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgb::new(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => Err(ColorError::InvalidLength(hex.len())),
    }
}

/// Value of an ASCII hex digit. Callers have already checked the byte.
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

/// Parse any other CSS color via lightningcss (named colors, hwb, oklch, ...)
fn parse_css_color(s: &str) -> Result<Rgb, ColorError> {
    use lightningcss::values::color::FloatColor;

    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb_color = css_color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(Rgb::new(rgba.red, rgba.green, rgba.blue)),
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => Ok(Rgb {
                r: to_channel(rgb.r as f64 * 255.0),
                g: to_channel(rgb.g as f64 * 255.0),
                b: to_channel(rgb.b as f64 * 255.0),
            }),
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}
