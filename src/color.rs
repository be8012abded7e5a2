use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use solar_dashboard::Country;

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Country → Color32
// ---------------------------------------------------------------------------

/// One stable colour per loaded country, shared by every chart so a country
/// keeps its colour when the selection changes.
#[derive(Debug, Clone, Default)]
pub struct CountryColors {
    mapping: BTreeMap<Country, Color32>,
}

impl CountryColors {
    pub fn new(countries: &[Country]) -> Self {
        let mapping = countries
            .iter()
            .cloned()
            .zip(generate_palette(countries.len()))
            .collect();
        CountryColors { mapping }
    }

    pub fn color_for(&self, country: &Country) -> Color32 {
        self.mapping.get(country).copied().unwrap_or(Color32::GRAY)
    }
}

/// Fixed colours for the two cleaning states in the bar chart.
pub fn cleaning_color(occurred: bool) -> Color32 {
    if occurred {
        Color32::from_rgb(0x4c, 0xaf, 0x50)
    } else {
        Color32::from_rgb(0x9e, 0x9e, 0x9e)
    }
}
