//! The coloring engine (C7): orchestrates the layer stack, the interior
//! policy, post-processing, LUT export, configuration I/O, and statistics.
//!
//! Grounded on the source project's top-level render loop (`render_high_res`,
//! the `into_par_iter().flat_map(...)` scanline fan-out) generalized from "one
//! palette, one algorithm" to an ordered stack of independently-parametrized
//! layers composited through 20+ blend modes.

use crate::algorithms::{AlgorithmEntry, AlgorithmRegistry, ParamMap};
use crate::color::{hsl_to_rgb, lerp, ColorRgb};
use crate::config::ConfigValue;
use crate::error::ColoringError;
use crate::gradient::Gradient;
use crate::histogram::{precompute, HistogramContext, HistogramOptions};
use crate::layer::CoLoringLayer;
use crate::pixel::{PixelContext, PixelField, RenderConfig};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteriorMode {
    Black,
    Gradient,
    Orbit,
    Distance,
}

/// Final color grading applied to every pixel (interior or escaped) in order:
/// brightness, contrast, saturation, gamma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcess {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub gamma: f32,
}

impl Default for PostProcess {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            gamma: 1.0,
        }
    }
}

fn apply_post_process(pp: &PostProcess, c: ColorRgb) -> ColorRgb {
    let mut r = c.r + pp.brightness;
    let mut g = c.g + pp.brightness;
    let mut b = c.b + pp.brightness;

    r = (r - 0.5) * pp.contrast + 0.5;
    g = (g - 0.5) * pp.contrast + 0.5;
    b = (b - 0.5) * pp.contrast + 0.5;

    let gray = 0.299 * r + 0.587 * g + 0.114 * b;
    r = lerp(gray, r, pp.saturation);
    g = lerp(gray, g, pp.saturation);
    b = lerp(gray, b, pp.saturation);

    r = r.max(0.0).powf(pp.gamma);
    g = g.max(0.0).powf(pp.gamma);
    b = b.max(0.0).powf(pp.gamma);

    ColorRgb::new(r, g, b).clamped()
}

/// Cumulative, monotonically-increasing counters; never reset by `apply`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    pub pixels_colored: u64,
    pub coloring_time_ns: u64,
    pub skipped_layers: u64,
}

pub struct CoLoringEngine {
    pub(crate) layers: Vec<CoLoringLayer>,
    pub(crate) interior_mode: InteriorMode,
    pub(crate) interior_color: ColorRgb,
    pub background_color: ColorRgb,
    pub(crate) post_process: PostProcess,
    registry: Option<AlgorithmRegistry>,
    stats: EngineStats,
}

impl CoLoringEngine {
    pub fn new(registry: AlgorithmRegistry) -> Self {
        Self {
            layers: Vec::new(),
            interior_mode: InteriorMode::Black,
            interior_color: ColorRgb::BLACK,
            background_color: ColorRgb::BLACK,
            post_process: PostProcess::default(),
            registry: Some(registry),
            stats: EngineStats::default(),
        }
    }

    pub fn without_registry() -> Self {
        Self {
            registry: None,
            ..Self::new(AlgorithmRegistry::empty())
        }
    }

    pub fn set_registry(&mut self, registry: AlgorithmRegistry) {
        self.registry = Some(registry);
    }

    pub fn register_algorithm(&mut self, entry: AlgorithmEntry) {
        if let Some(registry) = self.registry.as_mut() {
            registry.register(entry);
        }
    }

    pub fn set_interior_mode(&mut self, mode: InteriorMode) {
        self.interior_mode = mode;
    }

    pub fn set_interior_color(&mut self, color: ColorRgb) {
        self.interior_color = color;
    }

    pub fn set_post_process(&mut self, post_process: PostProcess) {
        self.post_process = post_process;
    }

    pub fn layers(&self) -> &[CoLoringLayer] {
        &self.layers
    }

    pub fn add_layer(&mut self, layer: CoLoringLayer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn remove_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.layers.remove(index);
        }
    }

    pub fn move_layer(&mut self, from: usize, to: usize) {
        if from < self.layers.len() && to < self.layers.len() && from != to {
            let layer = self.layers.remove(from);
            self.layers.insert(to, layer);
        }
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Color a full pixel field into `out`, an RGBA byte buffer of exactly
    /// `width*height*4` bytes. See §4.7/§4.7.1/§4.7.2 for the exact
    /// per-pixel, interior, and post-process contracts.
    pub fn apply(&mut self, pixels: &PixelField, config: &RenderConfig, out: &mut [u8]) -> Result<(), ColoringError> {
        pixels.validate(config)?;
        let expected = config.pixel_count() * 4;
        if out.len() != expected {
            return Err(ColoringError::BufferShapeMismatch {
                expected,
                actual: out.len(),
            });
        }
        let registry = self.registry.as_ref().ok_or(ColoringError::NoRegistry)?;

        let needs_histogram = self.layers.iter().any(|l| {
            l.enabled
                && registry
                    .get(&l.algorithm_id)
                    .map(|e| e.requires_precompute)
                    .unwrap_or(false)
        });
        let histogram = if needs_histogram {
            Some(precompute(
                &pixels.iterations,
                &pixels.escaped,
                HistogramOptions { bins: 256, compute_log: true },
            ))
        } else {
            None
        };

        let (resolved, skipped) = resolve_layers(&self.layers, registry, pixels.has_orbit_history(), histogram.is_some());

        let interior_mode = self.interior_mode;
        let interior_color_fallback = self.interior_color;
        let first_gradient = self.layers.first().map(|l| l.gradient.clone());
        let background = self.background_color;
        let post_process = self.post_process;
        let pixel_count = config.pixel_count();

        let start = std::time::Instant::now();
        out.par_chunks_mut(4)
            .zip((0..pixel_count).into_par_iter())
            .for_each(|(chunk, i)| {
                let ctx = pixels.context_at(i, config);
                let color = if ctx.escaped {
                    composite_escaped(&resolved, &ctx, histogram.as_ref(), background)
                } else {
                    interior_pixel_color(interior_mode, interior_color_fallback, first_gradient.as_ref(), &ctx)
                };
                let color = apply_post_process(&post_process, color);
                let [r, g, b] = color.to_u8();
                chunk[0] = r;
                chunk[1] = g;
                chunk[2] = b;
                chunk[3] = 255;
            });
        let elapsed = start.elapsed();

        if skipped > 0 {
            log::warn!("apply: {skipped} layer(s) skipped for missing orbit history or histogram pre-pass");
        }
        log::debug!("apply: colored {pixel_count} pixels in {elapsed:?}");

        self.stats.pixels_colored += pixel_count as u64;
        self.stats.coloring_time_ns += elapsed.as_nanos() as u64;
        self.stats.skipped_layers += skipped;

        Ok(())
    }

    /// Sample the full composite at `n` evenly-spaced points along a
    /// synthetic escape-time parameter, for downstream table lookup.
    pub fn generate_lut(&self, size: usize) -> Vec<u8> {
        let mut out = vec![0u8; 4 * size];
        let Some(registry) = self.registry.as_ref() else {
            return out;
        };

        let config = RenderConfig::new(1, 1, 1000);
        let (resolved, _) = resolve_layers(&self.layers, registry, false, false);
        let interior_mode = self.interior_mode;
        let interior_color_fallback = self.interior_color;
        let first_gradient = self.layers.first().map(|l| l.gradient.clone());

        for i in 0..size {
            let t = if size <= 1 { 0.0 } else { i as f32 / (size - 1) as f32 };
            let two_pi_t = 2.0 * std::f32::consts::PI * t;
            let field = PixelField::new(vec![t * 1000.0], vec![1], vec![two_pi_t.cos()], vec![two_pi_t.sin()])
                .with_distance(vec![t])
                .with_angle(vec![two_pi_t]);
            let ctx = field.context_at(0, &config);
            let color = if ctx.escaped {
                composite_escaped(&resolved, &ctx, None, self.background_color)
            } else {
                interior_pixel_color(interior_mode, interior_color_fallback, first_gradient.as_ref(), &ctx)
            };
            let color = apply_post_process(&self.post_process, color);
            let [r, g, b] = color.to_u8();
            out[4 * i] = r;
            out[4 * i + 1] = g;
            out[4 * i + 2] = b;
            out[4 * i + 3] = 255;
        }
        out
    }

    pub fn export_config(&self) -> ConfigValue {
        crate::config::EngineConfigDto::from_engine(self).to_value()
    }

    pub fn import_config(&mut self, value: ConfigValue) -> Result<(), ColoringError> {
        let dto = crate::config::EngineConfigDto::from_value(value)?;
        let registry = self.registry.as_ref().ok_or(ColoringError::NoRegistry)?;
        let (layers, interior_mode, interior_color, post_process) = dto.into_engine_parts(registry)?;
        self.layers = layers;
        self.interior_mode = interior_mode;
        self.interior_color = interior_color;
        self.post_process = post_process;
        Ok(())
    }
}

struct ResolvedLayer<'a> {
    layer: &'a CoLoringLayer,
    entry: &'a AlgorithmEntry,
    mask_entry: Option<&'a AlgorithmEntry>,
}

fn resolve_layers<'a>(
    layers: &'a [CoLoringLayer],
    registry: &'a AlgorithmRegistry,
    has_history: bool,
    has_histogram: bool,
) -> (Vec<ResolvedLayer<'a>>, u64) {
    let mut resolved = Vec::new();
    let mut skipped = 0u64;
    for layer in layers {
        if !layer.enabled {
            continue;
        }
        let Some(entry) = registry.get(&layer.algorithm_id) else {
            log::warn!("skipping layer '{}': unknown algorithm '{}'", layer.name, layer.algorithm_id);
            skipped += 1;
            continue;
        };
        if entry.requires_orbit_history && !has_history {
            skipped += 1;
            continue;
        }
        if entry.requires_precompute && !has_histogram {
            skipped += 1;
            continue;
        }
        let mask_entry = layer.mask_algorithm_id.as_ref().and_then(|id| registry.get(id));
        resolved.push(ResolvedLayer { layer, entry, mask_entry });
    }
    (resolved, skipped)
}

/// Composite an escaped pixel's layer stack bottom-up starting from
/// `background`, falling back to the default HSL wheel when no layer
/// resolved (§4.7: "the layer stack with zero layers").
fn composite_escaped(
    resolved: &[ResolvedLayer],
    ctx: &PixelContext,
    hist: Option<&HistogramContext>,
    background: ColorRgb,
) -> ColorRgb {
    if resolved.is_empty() {
        let hue = (ctx.iterations * 3.5).rem_euclid(360.0) / 360.0;
        return hsl_to_rgb(hue, 0.8, 0.5);
    }

    let mut accum = background;
    for r in resolved {
        let raw = (r.entry.value_fn)(ctx, &r.layer.params, hist);
        let shaped = r.layer.transform.apply(raw);
        let mut color = r.layer.gradient.sample(shaped);
        if !(color.r.is_finite() && color.g.is_finite() && color.b.is_finite()) {
            color = background;
        }

        let mut opacity = r.layer.opacity;
        if let Some(mask_entry) = r.mask_entry {
            let mask_params = ParamMap::new();
            let mut mask_value = (mask_entry.value_fn)(ctx, &mask_params, hist);
            if !mask_value.is_finite() {
                mask_value = 0.0;
            }
            mask_value = mask_value.clamp(0.0, 1.0);
            if r.layer.mask_invert {
                mask_value = 1.0 - mask_value;
            }
            opacity *= mask_value;
        }

        accum = r.layer.blend_mode.composite(accum, color, opacity.clamp(0.0, 1.0));
    }
    accum
}

fn interior_pixel_color(
    mode: InteriorMode,
    fallback: ColorRgb,
    first_gradient: Option<&Gradient>,
    ctx: &PixelContext,
) -> ColorRgb {
    if mode == InteriorMode::Black {
        return ColorRgb::BLACK;
    }
    let Some(gradient) = first_gradient else {
        return fallback;
    };
    let t = match mode {
        InteriorMode::Black => unreachable!(),
        InteriorMode::Gradient => 1.0 - (-ctx.orbit_norm()).exp(),
        InteriorMode::Orbit => ctx.orbit_y.atan2(ctx.orbit_x) / (2.0 * std::f32::consts::PI) + 0.5,
        InteriorMode::Distance => {
            let d = ctx.distance.unwrap_or(0.0).max(0.0);
            (d + 1.0).ln() / 10.0
        }
    };
    gradient.sample(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BlendMode;
    use crate::gradient::preset_by_name;

    fn grayscale() -> Gradient {
        preset_by_name("grayscale").unwrap()
    }

    fn engine() -> CoLoringEngine {
        CoLoringEngine::new(AlgorithmRegistry::default())
    }

    #[test]
    fn black_interior_is_always_black() {
        let engine = engine();
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![100.0], vec![0], vec![3.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let c = interior_pixel_color(InteriorMode::Black, ColorRgb::WHITE, None, &ctx);
        assert_eq!(c, ColorRgb::BLACK);
    }

    #[test]
    fn zero_layers_interior_black_escaped_hsl_wheel() {
        // S2: pixel 0 interior, pixel 1 escaped with iter=100, orbit=(3,0).
        let mut engine = engine();
        engine.interior_mode = InteriorMode::Black;
        let config = RenderConfig::new(2, 1, 200);
        let field = PixelField::new(vec![200.0, 100.0], vec![0, 1], vec![0.0, 3.0], vec![0.0, 0.0]);
        let mut out = vec![0u8; 2 * 4];
        engine.apply(&field, &config, &mut out).unwrap();
        assert_eq!(&out[0..4], &[0, 0, 0, 255]);
        // HSL wheel: hue=(100*3.5) mod 360 = 350 -> strongly red-dominant.
        assert!(out[4] > out[5]);
        assert!(out[4] > out[6]);
        assert_eq!(out[7], 255);
    }

    #[test]
    fn apply_rejects_undersized_buffer() {
        let mut engine = engine();
        let config = RenderConfig::new(2, 2, 100);
        let field = PixelField::new(vec![0.0; 4], vec![1; 4], vec![0.0; 4], vec![0.0; 4]);
        let mut out = vec![0u8; 4 * 4 - 1];
        assert!(engine.apply(&field, &config, &mut out).is_err());
    }

    #[test]
    fn apply_without_registry_errors() {
        let mut engine = CoLoringEngine::without_registry();
        let config = RenderConfig::new(1, 1, 10);
        let field = PixelField::new(vec![0.0], vec![1], vec![0.0], vec![0.0]);
        let mut out = vec![0u8; 4];
        assert!(matches!(engine.apply(&field, &config, &mut out), Err(ColoringError::NoRegistry)));
    }

    #[test]
    fn stats_are_monotonic_across_calls() {
        let mut engine = engine();
        let config = RenderConfig::new(2, 2, 100);
        let field = PixelField::new(vec![10.0; 4], vec![1; 4], vec![0.5; 4], vec![0.0; 4]);
        let mut out = vec![0u8; 16];
        engine.apply(&field, &config, &mut out).unwrap();
        let first = engine.stats();
        engine.apply(&field, &config, &mut out).unwrap();
        let second = engine.stats();
        assert!(second.pixels_colored > first.pixels_colored);
        assert!(second.coloring_time_ns >= first.coloring_time_ns);
    }

    #[test]
    fn generate_lut_has_expected_length_and_alpha() {
        let engine = engine();
        let lut = engine.generate_lut(32);
        assert_eq!(lut.len(), 32 * 4);
        for i in 0..32 {
            assert_eq!(lut[4 * i + 3], 255);
        }
    }

    #[test]
    fn smooth_iteration_cycle_params_give_monotonic_grayscale_ramp() {
        // S1: 4x1, all escaped, orbit constant, smooth-iteration{power:2,
        // cycleScale:0.1, cycleOffset:0} through a grayscale RGB gradient.
        let mut engine = engine();
        let mut layer = CoLoringLayer::new("smooth", "smooth-iteration", grayscale());
        layer.params.set("power", crate::algorithms::ParamValue::Number(2.0));
        layer.params.set("cycleScale", crate::algorithms::ParamValue::Number(0.1));
        layer.params.set("cycleOffset", crate::algorithms::ParamValue::Number(0.0));
        engine.add_layer(layer);

        let config = RenderConfig::new(4, 1, 100);
        let field = PixelField::new(
            vec![10.0, 20.0, 30.0, 40.0],
            vec![1, 1, 1, 1],
            vec![2.0, 2.0, 2.0, 2.0],
            vec![0.0, 0.0, 0.0, 0.0],
        );
        let mut out = vec![0u8; 4 * 4];
        engine.apply(&field, &config, &mut out).unwrap();

        for i in 0..3 {
            let a = out[4 * i];
            let b = out[4 * (i + 1)];
            assert_eq!(out[4 * i], out[4 * i + 1]);
            assert_eq!(out[4 * i], out[4 * i + 2]);
            assert!(b > a, "pixel {i} -> {}: {a} then {b}", i + 1);
        }
    }

    #[test]
    fn histogram_equalization_ramp_spans_most_of_the_range() {
        // S3: 256x1, iterations 0..255 all escaped, orbit constant,
        // histogram-equalization through a grayscale RGB gradient.
        let mut engine = engine();
        engine.add_layer(CoLoringLayer::new("eq", "histogram-equalization", grayscale()));

        let n = 256;
        let config = RenderConfig::new(n as u32, 1, 300);
        let field = PixelField::new(
            (0..n).map(|i| i as f32).collect(),
            vec![1; n],
            vec![2.0; n],
            vec![0.0; n],
        );
        let mut out = vec![0u8; n * 4];
        engine.apply(&field, &config, &mut out).unwrap();

        let mut prev = out[0];
        for i in 1..n {
            assert!(out[4 * i] >= prev, "pixel {i} dipped: {} < {prev}", out[4 * i]);
            prev = out[4 * i];
        }
        assert!(out[4 * (n - 1)] as i32 - out[0] as i32 >= 240);
    }

    #[test]
    fn screen_blend_layer_never_darkens_single_layer_output() {
        // S5-style check: a screen-blended glow layer over a base layer
        // should never reduce any channel relative to the base alone.
        let mut base_only = engine();
        base_only.add_layer(CoLoringLayer::new("base", "smooth-iteration", grayscale()));

        let mut with_glow = engine();
        with_glow.add_layer(CoLoringLayer::new("base", "smooth-iteration", grayscale()));
        let mut glow = CoLoringLayer::new("glow", "boundary-glow", grayscale());
        glow.opacity = 0.5;
        glow.blend_mode = BlendMode::Screen;
        with_glow.add_layer(glow);

        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![50.0], vec![1], vec![0.5], vec![0.5]).with_distance(vec![0.05]);

        let mut out_base = vec![0u8; 4];
        base_only.apply(&field, &config, &mut out_base).unwrap();
        let mut out_glow = vec![0u8; 4];
        with_glow.apply(&field, &config, &mut out_glow).unwrap();

        assert!(out_glow[0] >= out_base[0]);
        assert!(out_glow[1] >= out_base[1]);
        assert!(out_glow[2] >= out_base[2]);
    }
}
