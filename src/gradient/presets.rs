//! Stable named gradient presets, used both as defaults and as test fixtures.
//!
//! `rainbow`, `fire`, `ice`, and `grayscale` are ported directly from the
//! source project's fixed palette stop tables (`ClassicPalette`,
//! `FirePalette`, `IcePalette`, `GrayscalePalette`); `electric`, `psychedelic`,
//! `sunset`, and `ocean` are new fixed stop lists in the same style.

use super::{rgb_stop, ColorSpace, Gradient, Interpolation};
use crate::color::hsv_to_rgb;

pub fn preset_by_name(name: &str) -> Option<Gradient> {
    Some(match name {
        "rainbow" => rainbow(),
        "fire" => fire(),
        "ice" => ice(),
        "electric" => electric(),
        "grayscale" => grayscale(),
        "psychedelic" => psychedelic(),
        "sunset" => sunset(),
        "ocean" => ocean(),
        _ => return None,
    })
}

fn evenly_spaced(colors: &[(f32, f32, f32)]) -> Vec<super::GradientStop> {
    let last = (colors.len() - 1).max(1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(i, &(r, g, b))| rgb_stop(i as f32 / last, r, g, b))
        .collect()
}

pub fn rainbow() -> Gradient {
    let stops = evenly_spaced(&[
        (0.0, 0.0, 0.0),
        (0.0, 0.0, 0.5),
        (0.0, 0.0, 1.0),
        (0.0, 1.0, 1.0),
        (0.0, 1.0, 0.0),
        (1.0, 1.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 1.0),
    ]);
    Gradient::new(stops, ColorSpace::Rgb, Interpolation::Linear)
}

pub fn fire() -> Gradient {
    let stops = evenly_spaced(&[
        (0.0, 0.0, 0.0),
        (0.5, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 0.5, 0.0),
        (1.0, 1.0, 0.0),
        (1.0, 1.0, 1.0),
    ]);
    Gradient::new(stops, ColorSpace::Rgb, Interpolation::Linear)
}

pub fn ice() -> Gradient {
    let stops = evenly_spaced(&[
        (0.0, 0.0, 0.0),
        (0.0, 0.0, 0.5),
        (0.0, 0.0, 1.0),
        (0.0, 0.5, 1.0),
        (0.5, 1.0, 1.0),
        (1.0, 1.0, 1.0),
    ]);
    Gradient::new(stops, ColorSpace::Rgb, Interpolation::Linear)
}

pub fn electric() -> Gradient {
    let stops = evenly_spaced(&[
        (0.0, 0.0, 0.1),
        (0.05, 0.0, 0.4),
        (0.2, 0.0, 0.9),
        (0.6, 0.2, 1.0),
        (0.9, 0.7, 1.0),
        (1.0, 1.0, 1.0),
    ]);
    Gradient::new(stops, ColorSpace::Hsl, Interpolation::Linear)
}

pub fn grayscale() -> Gradient {
    Gradient::new(
        vec![rgb_stop(0.0, 0.0, 0.0, 0.0), rgb_stop(1.0, 1.0, 1.0, 1.0)],
        ColorSpace::Rgb,
        Interpolation::Linear,
    )
}

pub fn psychedelic() -> Gradient {
    let n = 12;
    let stops = (0..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let c = hsv_to_rgb(t, 1.0, 0.5);
            rgb_stop(t, c.r, c.g, c.b)
        })
        .collect();
    Gradient::new(stops, ColorSpace::Hsl, Interpolation::Linear)
}

pub fn sunset() -> Gradient {
    let stops = evenly_spaced(&[
        (0.05, 0.05, 0.2),
        (0.4, 0.1, 0.35),
        (0.8, 0.25, 0.3),
        (0.95, 0.5, 0.25),
        (1.0, 0.8, 0.4),
        (1.0, 0.95, 0.7),
    ]);
    Gradient::new(stops, ColorSpace::OkLab, Interpolation::Linear)
}

pub fn ocean() -> Gradient {
    let stops = evenly_spaced(&[
        (0.0, 0.05, 0.1),
        (0.0, 0.15, 0.3),
        (0.0, 0.35, 0.5),
        (0.0, 0.55, 0.6),
        (0.2, 0.75, 0.7),
        (0.7, 0.95, 0.9),
    ]);
    Gradient::new(stops, ColorSpace::OkLab, Interpolation::Linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_resolve() {
        for name in [
            "rainbow",
            "fire",
            "ice",
            "electric",
            "grayscale",
            "psychedelic",
            "sunset",
            "ocean",
        ] {
            assert!(preset_by_name(name).is_some(), "missing preset {name}");
        }
        assert!(preset_by_name("nonexistent").is_none());
    }

    #[test]
    fn grayscale_endpoints() {
        let g = grayscale();
        assert_eq!(g.sample(0.0).to_u8(), [0, 0, 0]);
        assert_eq!(g.sample(1.0).to_u8(), [255, 255, 255]);
    }
}
