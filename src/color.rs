use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Named colours used by the paper figures (matplotlib "tab10" + black)
// ---------------------------------------------------------------------------

pub const BLACK: &str = "#000000";
pub const GREEN: &str = "#2ca02c";
pub const BLUE: &str = "#1f77b4";
pub const RED: &str = "#d62728";
pub const ORANGE: &str = "#ff7f0e";
pub const PURPLE: &str = "#9467bd";
pub const TURQUOISE: &str = "#17becf";

/// An 8-bit sRGB colour shared by both renderers.
pub type Rgb8 = Srgb<u8>;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb`, `#rgb`, a matplotlib single-letter colour (`k`, `r`, ...)
/// or one of the `tab:` names used by the paper.
pub fn parse_color(s: &str) -> Option<Rgb8> {
    let s = s.trim();
    let named = match s {
        "tab:blue" => Some(BLUE),
        "tab:orange" => Some(ORANGE),
        "tab:green" => Some(GREEN),
        "tab:red" => Some(RED),
        "tab:purple" => Some(PURPLE),
        "tab:cyan" => Some(TURQUOISE),
        "k" => Some(BLACK),
        "w" => Some("#ffffff"),
        "r" => Some("#ff0000"),
        "g" => Some("#008000"),
        "b" => Some("#0000ff"),
        "c" => Some("#00bfbf"),
        "m" => Some("#bf00bf"),
        "y" => Some("#bfbf00"),
        _ => None,
    };
    Rgb8::from_str(named.unwrap_or(s)).ok()
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Conversions into each backend
// ---------------------------------------------------------------------------

pub fn to_egui(c: Rgb8) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

pub fn to_plotters(c: Rgb8) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_constants() {
        let red = parse_color(RED).unwrap();
        assert_eq!((red.red, red.green, red.blue), (0xd6, 0x27, 0x28));
        let blue = parse_color("1f77b4").unwrap();
        assert_eq!((blue.red, blue.green, blue.blue), (0x1f, 0x77, 0xb4));
    }

    #[test]
    fn parses_matplotlib_letters() {
        let black = parse_color("k").unwrap();
        assert_eq!((black.red, black.green, black.blue), (0, 0, 0));
        assert_eq!(parse_color("tab:cyan"), parse_color(TURQUOISE));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_color("not-a-colour").is_none());
    }

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn backend_conversions_agree() {
        let c = parse_color(GREEN).unwrap();
        assert_eq!(to_egui(c), Color32::from_rgb(0x2c, 0xa0, 0x2c));
        assert_eq!(to_plotters(c), RGBColor(0x2c, 0xa0, 0x2c));
    }
}
