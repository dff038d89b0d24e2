//! Color lookup for color scales.

use crate::render::Color;

/// Categorical palette used when an ordinal color scale has no colors.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const SEQUENTIAL: [&str; 2] = ["#f7fbff", "#08306b"];
const DIVERGENT: [&str; 3] = ["#d7191c", "#ffffbf", "#2c7bb6"];

/// Parse a `#rrggbb` or `#rrggbbaa` hex color.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    let channel = |index: usize| -> Option<f32> {
        let byte = u8::from_str_radix(digits.get(index..index + 2)?, 16).ok()?;
        Some(byte as f32 / 255.0)
    };
    match digits.len() {
        6 => Some(Color::new(channel(0)?, channel(2)?, channel(4)?, 1.0)),
        8 => Some(Color::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

/// Resolve configured color stops, falling back to a default gradient.
pub(crate) fn gradient_stops(colors: &[String], divergent: bool) -> Vec<Color> {
    let parsed: Vec<Color> = colors.iter().filter_map(|hex| parse_hex(hex)).collect();
    if parsed.len() >= 2 {
        return parsed;
    }
    let defaults: &[&str] = if divergent { &DIVERGENT } else { &SEQUENTIAL };
    defaults.iter().filter_map(|hex| parse_hex(hex)).collect()
}

/// Resolve configured palette colors, falling back to `CATEGORY10`.
pub(crate) fn palette(colors: &[String]) -> Vec<Color> {
    let parsed: Vec<Color> = colors.iter().filter_map(|hex| parse_hex(hex)).collect();
    if !parsed.is_empty() {
        return parsed;
    }
    CATEGORY10.iter().filter_map(|hex| parse_hex(hex)).collect()
}

/// Interpolate across evenly spaced stops at `t` in `[0, 1]`.
pub(crate) fn interpolate(stops: &[Color], t: f64) -> Option<Color> {
    let (first, last) = (stops.first()?, stops.last()?);
    if stops.len() == 1 || t <= 0.0 {
        return Some(*first);
    }
    if t >= 1.0 {
        return Some(*last);
    }
    let scaled = t * (stops.len() - 1) as f64;
    let index = scaled.floor() as usize;
    let frac = (scaled - index as f64) as f32;
    let a = stops[index];
    let b = stops[(index + 1).min(stops.len() - 1)];
    Some(Color::new(
        a.r + (b.r - a.r) * frac,
        a.g + (b.g - a.g) * frac,
        a.b + (b.b - a.b) * frac,
        a.a + (b.a - a.a) * frac,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_colors() {
        assert_eq!(parse_hex("#ff0000"), Some(Color::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(parse_hex("#00000000").map(|c| c.a), Some(0.0));
        assert!(parse_hex("red").is_none());
    }

    #[test]
    fn interpolate_midpoint() {
        let stops = [Color::BLACK, Color::WHITE];
        let mid = interpolate(&stops, 0.5).unwrap();
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(interpolate(&stops, 2.0), Some(Color::WHITE));
    }
}
