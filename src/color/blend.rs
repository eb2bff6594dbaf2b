//! Blend-mode functions: per-channel `(base, blend) -> result` over `[0,1]^2`.

use super::{clamp01, lerp, rgb_to_hsl, hsl_to_rgb, ColorRgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    Normal,
    Add,
    Subtract,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    Difference,
    Exclusion,
    Lighten,
    Darken,
    LinearLight,
    PinLight,
    VividLight,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub fn id(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "soft-light",
            BlendMode::HardLight => "hard-light",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Lighten => "lighten",
            BlendMode::Darken => "darken",
            BlendMode::LinearLight => "linear-light",
            BlendMode::PinLight => "pin-light",
            BlendMode::VividLight => "vivid-light",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Some(match id {
            "normal" => BlendMode::Normal,
            "add" => BlendMode::Add,
            "subtract" => BlendMode::Subtract,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "soft-light" => BlendMode::SoftLight,
            "hard-light" => BlendMode::HardLight,
            "color-dodge" => BlendMode::ColorDodge,
            "color-burn" => BlendMode::ColorBurn,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            "lighten" => BlendMode::Lighten,
            "darken" => BlendMode::Darken,
            "linear-light" => BlendMode::LinearLight,
            "pin-light" => BlendMode::PinLight,
            "vivid-light" => BlendMode::VividLight,
            "hue" => BlendMode::Hue,
            "saturation" => BlendMode::Saturation,
            "color" => BlendMode::Color,
            "luminosity" => BlendMode::Luminosity,
            _ => return None,
        })
    }

    fn is_whole_pixel(&self) -> bool {
        matches!(
            self,
            BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity
        )
    }

    /// Per-channel blend function for the channel-wise modes.
    fn channel_blend(&self, base: f32, top: f32) -> f32 {
        match self {
            BlendMode::Normal => top,
            BlendMode::Add => (base + top).min(1.0),
            BlendMode::Subtract => (base - top).max(0.0),
            BlendMode::Multiply => base * top,
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - top),
            BlendMode::Overlay => {
                if base < 0.5 {
                    2.0 * base * top
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - top)
                }
            }
            BlendMode::SoftLight => soft_light(base, top),
            BlendMode::HardLight => {
                if top < 0.5 {
                    2.0 * base * top
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - top)
                }
            }
            BlendMode::ColorDodge => {
                if top >= 1.0 {
                    1.0
                } else {
                    (base / (1.0 - top)).min(1.0)
                }
            }
            BlendMode::ColorBurn => {
                if top <= 0.0 {
                    0.0
                } else {
                    (1.0 - (1.0 - base) / top).max(0.0)
                }
            }
            BlendMode::Difference => (base - top).abs(),
            BlendMode::Exclusion => base + top - 2.0 * base * top,
            BlendMode::Lighten => base.max(top),
            BlendMode::Darken => base.min(top),
            BlendMode::LinearLight => clamp01(base + 2.0 * top - 1.0),
            BlendMode::PinLight => {
                if top < 0.5 {
                    base.min(2.0 * top)
                } else {
                    base.max(2.0 * top - 1.0)
                }
            }
            BlendMode::VividLight => {
                if top < 0.5 {
                    color_burn(base, 2.0 * top)
                } else {
                    color_dodge(base, 2.0 * (top - 0.5))
                }
            }
            BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => {
                top // unreachable: handled in `blend_pixel`
            }
        }
    }

    /// Blend an entire pixel (base over top), used for both channel-wise and
    /// whole-pixel (HSL-component) modes.
    pub fn blend_pixel(&self, base: ColorRgb, top: ColorRgb) -> ColorRgb {
        if self.is_whole_pixel() {
            let (bh, bs, bl) = rgb_to_hsl(base);
            let (th, ts, tl) = rgb_to_hsl(top);
            let (h, s, l) = match self {
                BlendMode::Hue => (th, bs, bl),
                BlendMode::Saturation => (bh, ts, bl),
                BlendMode::Color => (th, ts, bl),
                BlendMode::Luminosity => (bh, bs, tl),
                _ => unreachable!(),
            };
            hsl_to_rgb(h, s, l)
        } else {
            ColorRgb::new(
                self.channel_blend(base.r, top.r),
                self.channel_blend(base.g, top.g),
                self.channel_blend(base.b, top.b),
            )
        }
    }

    /// Final per-channel compositing: `out = lerp(base, blend(base, top), opacity)`.
    pub fn composite(&self, base: ColorRgb, top: ColorRgb, opacity: f32) -> ColorRgb {
        let blended = self.blend_pixel(base, top).clamped();
        ColorRgb::new(
            lerp(base.r, blended.r, opacity),
            lerp(base.g, blended.g, opacity),
            lerp(base.b, blended.b, opacity),
        )
        .clamped()
    }
}

fn color_dodge(base: f32, top: f32) -> f32 {
    if top >= 1.0 {
        1.0
    } else {
        (base / (1.0 - top)).min(1.0)
    }
}

fn color_burn(base: f32, top: f32) -> f32 {
    if top <= 0.0 {
        0.0
    } else {
        (1.0 - (1.0 - base) / top).max(0.0)
    }
}

fn soft_light(b: f32, s: f32) -> f32 {
    if s < 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b < 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_is_passthrough() {
        let base = ColorRgb::new(0.2, 0.3, 0.4);
        let top = ColorRgb::new(0.9, 0.1, 0.5);
        let out = BlendMode::Normal.blend_pixel(base, top);
        assert_eq!(out.r, top.r);
        assert_eq!(out.g, top.g);
        assert_eq!(out.b, top.b);
    }

    #[test]
    fn screen_never_darkens() {
        let base = ColorRgb::new(0.4, 0.5, 0.6);
        let top = ColorRgb::new(0.2, 0.1, 0.9);
        let out = BlendMode::Screen.blend_pixel(base, top);
        assert!(out.r >= base.r - 1e-6);
        assert!(out.g >= base.g - 1e-6);
        assert!(out.b >= base.b - 1e-6);
    }

    #[test]
    fn multiply_never_brightens() {
        let base = ColorRgb::new(0.4, 0.5, 0.6);
        let top = ColorRgb::new(0.2, 0.9, 0.3);
        let out = BlendMode::Multiply.blend_pixel(base, top);
        assert!(out.r <= base.r + 1e-6);
        assert!(out.g <= base.g + 1e-6);
        assert!(out.b <= base.b + 1e-6);
    }

    #[test]
    fn opacity_zero_is_identity() {
        let base = ColorRgb::new(0.3, 0.3, 0.3);
        let top = ColorRgb::new(0.9, 0.1, 0.0);
        let out = BlendMode::Multiply.composite(base, top, 0.0);
        assert!((out.r - base.r).abs() < 1e-6);
        assert!((out.g - base.g).abs() < 1e-6);
        assert!((out.b - base.b).abs() < 1e-6);
    }

    #[test]
    fn id_roundtrip() {
        for m in [
            BlendMode::Normal,
            BlendMode::SoftLight,
            BlendMode::VividLight,
            BlendMode::Luminosity,
        ] {
            assert_eq!(BlendMode::from_id(m.id()), Some(m));
        }
    }
}
