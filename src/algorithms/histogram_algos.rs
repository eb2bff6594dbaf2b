//! HISTOGRAM family: functions of the engine-maintained [`HistogramContext`].
//! Every entry declares `requires_precompute = true`; the engine skips a
//! layer using one of these if no histogram was computed for the buffer.

use super::{clamp01, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn histogram_equalization(ctx: &PixelContext, _params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    h.map(|hist| hist.cdf_at(ctx.iterations)).unwrap_or(0.0)
}

fn log_histogram(ctx: &PixelContext, _params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    h.map(|hist| hist.log_cdf_at(ctx.iterations)).unwrap_or(0.0)
}

/// Finds the bins where the CDF first reaches the low/high percentile and
/// linearly stretches this pixel's bin index across that range, clamping
/// pixels outside it to black/white.
fn percentile_stretch(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let low_percentile = params.number("lowPercentile", 0.01).clamp(0.0, 1.0) as f32;
    let high_percentile = params.number("highPercentile", 0.99).clamp(0.0, 1.0) as f32;
    match h {
        Some(hist) if !hist.bins.is_empty() => {
            let n = hist.bins.len();
            let low_bin = hist.cdf.iter().position(|&c| c >= low_percentile).unwrap_or(0);
            let high_bin = hist
                .cdf
                .iter()
                .position(|&c| c >= high_percentile)
                .unwrap_or(n - 1);
            let span = (high_bin as isize - low_bin as isize).max(1) as f32;
            let idx = hist.bin_index(ctx.iterations) as f32;
            clamp01((idx - low_bin as f32) / span)
        }
        _ => 0.0,
    }
}

fn adaptive_equalization(ctx: &PixelContext, _params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    match h {
        Some(hist) if hist.escaped_count > 0 => {
            let idx = hist.bin_index(ctx.iterations);
            hist.bins[idx] as f32 / hist.escaped_count as f32
        }
        _ => 0.0,
    }
}

fn gamma_equalization(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let gamma = params.number("gamma", 0.5).max(1e-3) as f32;
    h.map(|hist| hist.cdf_at(ctx.iterations).max(0.0).powf(gamma)).unwrap_or(0.0)
}

/// Applies the cumulative distribution twice: once over the raw iteration
/// count, once over the result.
fn multi_pass_equalization(ctx: &PixelContext, _params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    h.map(|hist| {
        let first = hist.cdf_at(ctx.iterations);
        let second_bin_index = (first * (hist.bins.len().max(1) - 1) as f32).round();
        hist.cdf_at(second_bin_index)
    })
    .unwrap_or(0.0)
}

/// Boosts histogram-equalized pixels near the boundary (small distance
/// estimate) so fine boundary detail survives the equalization.
fn weighted_equalization(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let weight = params.number("weight", 0.5).clamp(0.0, 1.0) as f32;
    let equalized = h.map(|hist| hist.cdf_at(ctx.iterations)).unwrap_or(0.0);
    let distance = ctx.distance_or_estimate().abs();
    let boost = 1.0 + weight * (-10.0 * distance).exp();
    clamp01(equalized * boost)
}

fn sigmoid_equalization(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let steepness = params.number("steepness", 10.0) as f32;
    let c = h.map(|hist| hist.cdf_at(ctx.iterations)).unwrap_or(0.0);
    clamp01(1.0 / (1.0 + (-steepness * (c - 0.5)).exp()))
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    let entries: &[(&'static str, &'static str, &'static str, super::ValueFn, Vec<(String, ParamKind)>)] = &[
        ("histogram-equalization", "Histogram Equalization", "Cumulative distribution of the iteration count over the whole image.", histogram_equalization, vec![]),
        ("log-histogram", "Log Histogram", "Histogram equalization over the ln(iter+1) domain.", log_histogram, vec![]),
        ("percentile-stretch", "Percentile Stretch", "Linear stretch of the iteration histogram between a low and high percentile.", percentile_stretch, vec![
            ("lowPercentile".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.001, default: 0.01 }),
            ("highPercentile".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.001, default: 0.99 }),
        ]),
        ("adaptive-equalization", "Adaptive Equalization", "Local density (bin count / escaped count) at this pixel's bin.", adaptive_equalization, vec![]),
        ("gamma-equalization", "Gamma Equalization", "Cumulative distribution raised to an adjustable gamma.", gamma_equalization, vec![("gamma".to_string(), ParamKind::Number { min: 0.01, max: 8.0, step: 0.01, default: 0.5 })]),
        ("multi-pass-equalization", "Multi-Pass Equalization", "Cumulative distribution applied twice in succession.", multi_pass_equalization, vec![]),
        ("weighted-equalization", "Weighted Equalization", "Histogram equalization boosted near the boundary by the distance estimate.", weighted_equalization, vec![("weight".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 })]),
        ("sigmoid-equalization", "Sigmoid Equalization", "Cumulative distribution passed through a logistic curve centred at its midpoint.", sigmoid_equalization, vec![("steepness".to_string(), ParamKind::Number { min: 0.1, max: 100.0, step: 0.1, default: 10.0 })]),
    ];

    for (id, display_name, description, value_fn, schema) in entries.iter() {
        registry.register(AlgorithmEntry {
            id,
            display_name,
            category: AlgorithmCategory::Histogram,
            description,
            value_fn: *value_fn,
            param_schema: schema.clone(),
            compatibility: vec!["all"],
            requires_orbit_history: false,
            requires_precompute: true,
            tags: vec!["histogram"],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{precompute, HistogramOptions};
    use crate::pixel::{PixelField, RenderConfig};

    #[test]
    fn equalization_without_histogram_is_zero() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![0.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert_eq!(histogram_equalization(&ctx, &params, None), 0.0);
    }

    #[test]
    fn equalization_matches_histogram_cdf() {
        let iterations: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let escaped = vec![1u8; 64];
        let hist = precompute(&iterations, &escaped, HistogramOptions { bins: 16, compute_log: false });
        let config = RenderConfig::new(8, 8, 100);
        let field = PixelField::new(iterations.clone(), escaped, vec![0.0; 64], vec![0.0; 64]);
        let ctx = field.context_at(63, &config);
        let params = ParamMap::new();
        let v = histogram_equalization(&ctx, &params, Some(&hist));
        assert!((v - 1.0).abs() < 1e-5);
    }

    #[test]
    fn percentile_stretch_clamps_outside_the_percentile_range() {
        let iterations: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let escaped = vec![1u8; 100];
        let hist = precompute(&iterations, &escaped, HistogramOptions { bins: 100, compute_log: false });
        let config = RenderConfig::new(10, 10, 200);
        let field = PixelField::new(iterations.clone(), escaped, vec![0.0; 100], vec![0.0; 100]);
        let mut params = ParamMap::new();
        params.set("lowPercentile", crate::algorithms::ParamValue::Number(0.1));
        params.set("highPercentile", crate::algorithms::ParamValue::Number(0.9));

        let low = percentile_stretch(&field.context_at(0, &config), &params, Some(&hist));
        let high = percentile_stretch(&field.context_at(99, &config), &params, Some(&hist));
        let mid = percentile_stretch(&field.context_at(50, &config), &params, Some(&hist));
        assert_eq!(low, 0.0);
        assert_eq!(high, 1.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn weighted_equalization_boosts_near_boundary_pixels() {
        let iterations: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let escaped = vec![1u8; 64];
        let hist = precompute(&iterations, &escaped, HistogramOptions { bins: 16, compute_log: false });
        let config = RenderConfig::new(8, 8, 100);
        let field_near = PixelField::new(iterations.clone(), escaped.clone(), vec![0.0; 64], vec![0.0; 64])
            .with_distance(vec![0.001; 64]);
        let field_far = PixelField::new(iterations, escaped, vec![0.0; 64], vec![0.0; 64]).with_distance(vec![5.0; 64]);
        let params = ParamMap::new();

        let near = weighted_equalization(&field_near.context_at(32, &config), &params, Some(&hist));
        let far = weighted_equalization(&field_far.context_at(32, &config), &params, Some(&hist));
        assert!(near >= far, "boundary-boosted value {near} should be >= unboosted {far}");
    }

    #[test]
    fn sigmoid_equalization_is_bounded() {
        let iterations: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let escaped = vec![1u8; 64];
        let hist = precompute(&iterations, &escaped, HistogramOptions { bins: 16, compute_log: false });
        let config = RenderConfig::new(8, 8, 100);
        let field = PixelField::new(iterations.clone(), escaped, vec![0.0; 64], vec![0.0; 64]);
        let ctx = field.context_at(32, &config);
        let params = ParamMap::new();
        let v = sigmoid_equalization(&ctx, &params, Some(&hist));
        assert!((0.0..=1.0).contains(&v));
    }
}
