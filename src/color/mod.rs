//! Color primitives: clamping/lerp helpers, color-space conversions, and blend modes.
//!
//! Grounded on the source project's `palette` module (simple channel lerp over a
//! fixed stop table) and generalized to the full RGB/HSL/HSV/OKLab/sRGB contract
//! the coloring engine needs.

mod blend;
mod oklab;

pub use blend::BlendMode;
pub use oklab::{oklab_to_rgb, rgb_to_oklab};

use serde::{Deserialize, Serialize};

/// Canonical in-memory color: three channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const BLACK: ColorRgb = ColorRgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: ColorRgb = ColorRgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn clamped(self) -> Self {
        Self {
            r: clamp01(self.r),
            g: clamp01(self.g),
            b: clamp01(self.b),
        }
    }

    pub fn lerp(self, other: ColorRgb, t: f32) -> ColorRgb {
        ColorRgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }

    /// Convert to 8-bit channels, rounding and clamping to `[0, 255]`.
    pub fn to_u8(self) -> [u8; 3] {
        let c = self.clamped();
        [to_u8_channel(c.r), to_u8_channel(c.g), to_u8_channel(c.b)]
    }
}

fn to_u8_channel(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// IEC 61966-2-1 sRGB electro-optical transfer function, applied per channel.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// RGB (`[0,1]^3`) to HSL (`h` in `[0,1)` turns, `s`, `l` in `[0,1]`).
pub fn rgb_to_hsl(c: ColorRgb) -> (f32, f32, f32) {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta.abs() < 1e-7 {
        return (0.0, 0.0, l);
    }

    let s = if l < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let mut h = if (max - c.r).abs() < 1e-7 {
        (c.g - c.b) / delta + if c.g < c.b { 6.0 } else { 0.0 }
    } else if (max - c.g).abs() < 1e-7 {
        (c.b - c.r) / delta + 2.0
    } else {
        (c.r - c.g) / delta + 4.0
    };
    h /= 6.0;

    (h.rem_euclid(1.0), s, l)
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> ColorRgb {
    if s.abs() < 1e-7 {
        return ColorRgb::new(l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h.rem_euclid(1.0);

    ColorRgb::new(
        hue_to_rgb_channel(p, q, h + 1.0 / 3.0),
        hue_to_rgb_channel(p, q, h),
        hue_to_rgb_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// RGB (`[0,1]^3`) to HSV (`h` in `[0,1)` turns, `s`, `v` in `[0,1]`).
pub fn rgb_to_hsv(c: ColorRgb) -> (f32, f32, f32) {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let delta = max - min;

    let v = max;
    let s = if max.abs() < 1e-7 { 0.0 } else { delta / max };

    if delta.abs() < 1e-7 {
        return (0.0, s, v);
    }

    let mut h = if (max - c.r).abs() < 1e-7 {
        (c.g - c.b) / delta + if c.g < c.b { 6.0 } else { 0.0 }
    } else if (max - c.g).abs() < 1e-7 {
        (c.b - c.r) / delta + 2.0
    } else {
        (c.r - c.g) / delta + 4.0
    };
    h /= 6.0;

    (h.rem_euclid(1.0), s, v)
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> ColorRgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    ColorRgb::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_linear_roundtrip() {
        for i in 0..=255 {
            let c = i as f32 / 255.0;
            let back = linear_to_srgb(srgb_to_linear(c));
            assert!((back - c).abs() < 1e-4, "{c} -> {back}");
        }
    }

    #[test]
    fn rgb_hsl_roundtrip() {
        let cases = [
            ColorRgb::new(1.0, 0.0, 0.0),
            ColorRgb::new(0.0, 1.0, 0.0),
            ColorRgb::new(0.0, 0.0, 1.0),
            ColorRgb::new(0.3, 0.6, 0.9),
            ColorRgb::new(0.5, 0.5, 0.5),
        ];
        for c in cases {
            let (h, s, l) = rgb_to_hsl(c);
            let back = hsl_to_rgb(h, s, l);
            assert!((back.r - c.r).abs() < 1e-4);
            assert!((back.g - c.g).abs() < 1e-4);
            assert!((back.b - c.b).abs() < 1e-4);
        }
    }

    #[test]
    fn rgb_hsv_roundtrip() {
        let c = ColorRgb::new(0.8, 0.2, 0.4);
        let (h, s, v) = rgb_to_hsv(c);
        let back = hsv_to_rgb(h, s, v);
        assert!((back.r - c.r).abs() < 1e-4);
        assert!((back.g - c.g).abs() < 1e-4);
        assert!((back.b - c.b).abs() < 1e-4);
    }

    #[test]
    fn clamp_and_lerp() {
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(2.0), 1.0);
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }
}
