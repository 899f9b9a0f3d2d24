use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let c: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Continuous scale
// ---------------------------------------------------------------------------

/// Anchor colours of the Viridis ramp, dark to light.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Colour for `t` in `0..=1` along a Viridis-like ramp, interpolated in
/// linear RGB.
pub fn viridis(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - idx as f32;

    let anchor = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = anchor(VIRIDIS[idx]).mix(anchor(VIRIDIS[idx + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Position of `value` within `lo..=hi`, 0.5 when the range is empty.
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (value - lo) / (hi - lo)
    } else {
        0.5
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of one column to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the column's distinct labels.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let labels: Vec<String> = labels.into_iter().map(|s| s.to_string()).collect();
        let palette = generate_palette(labels.len());
        ColorMap {
            mapping: labels.into_iter().zip(palette).collect(),
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}
