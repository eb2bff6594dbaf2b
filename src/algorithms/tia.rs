//! TRIANGLE_INEQUALITY (TIA) family: for consecutive orbit points
//! `z_{n-1}, z_n` and the fixed point `c`, the triangle inequality bounds
//! `|z_n| = |z_{n-1}^2 + c|` between `lower = ||z_{n-1}|^2 - |c||` and
//! `upper = |z_{n-1}|^2 + |c|`; `t_n` is where `|z_n|` falls in that range.
//! Requires the full recorded orbit; with only the final point available
//! there is nothing to compare against, so these report a neutral value.

use super::{clamp01, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

/// `c` is recoverable from the orbit itself: `z_0 = 0`, so `z_1 = c`.
fn c_magnitude(history: &[(f32, f32)]) -> f32 {
    let (cx, cy) = history[1];
    (cx * cx + cy * cy).sqrt()
}

/// Per-step triangle-inequality ratios `t_n`, each already clamped to `0..1`.
fn tia_ratios(ctx: &PixelContext) -> Vec<f32> {
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 2 => h,
        _ => return Vec::new(),
    };
    let c_mag = c_magnitude(history);
    history
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            let prev_sq = x0 * x0 + y0 * y0;
            let n1 = (x1 * x1 + y1 * y1).sqrt();
            let lower = (prev_sq - c_mag).abs();
            let upper = prev_sq + c_mag;
            let denom = (upper - lower).max(1e-12);
            clamp01((n1 - lower) / denom)
        })
        .collect()
}

fn triangle_inequality_average(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let ratios = tia_ratios(ctx);
    if ratios.is_empty() {
        return 0.5;
    }
    let mean = ratios.iter().sum::<f32>() / ratios.len() as f32;
    clamp01(mean)
}

/// Exponentially recency-weighted ratio average; later steps dominate.
fn weighted_tia(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let decay = params.number("decay", 0.9) as f32;
    let ratios = tia_ratios(ctx);
    if ratios.is_empty() {
        return 0.5;
    }
    let mut weight = 1.0_f32;
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for r in ratios.iter().rev() {
        weighted_sum += r * weight;
        total_weight += weight;
        weight *= decay;
    }
    clamp01(weighted_sum / total_weight.max(1e-12))
}

/// Ratio average with each step weighted by the cosine of its orbit phase.
fn phase_tia(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 2 => h,
        _ => return 0.5,
    };
    let c_mag = c_magnitude(history);
    let mut weighted_sum = 0.0_f32;
    let mut total_weight = 0.0_f32;
    for w in history.windows(2) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        let prev_sq = x0 * x0 + y0 * y0;
        let n1 = (x1 * x1 + y1 * y1).sqrt();
        let lower = (prev_sq - c_mag).abs();
        let upper = prev_sq + c_mag;
        let denom = (upper - lower).max(1e-12);
        let ratio = clamp01((n1 - lower) / denom);
        let theta = y1.atan2(x1);
        let weight = (theta.cos() * 0.5 + 0.5).max(1e-6);
        weighted_sum += ratio * weight;
        total_weight += weight;
    }
    clamp01(weighted_sum / total_weight.max(1e-12))
}

fn minimum_tia(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let ratios = tia_ratios(ctx);
    if ratios.is_empty() {
        return 0.5;
    }
    let min = ratios.iter().cloned().fold(f32::INFINITY, f32::min);
    clamp01(min)
}

fn maximum_tia(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let ratios = tia_ratios(ctx);
    if ratios.is_empty() {
        return 0.5;
    }
    let max = ratios.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    clamp01(max)
}

fn variance_tia(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 4.0) as f32;
    let ratios = tia_ratios(ctx);
    if ratios.len() < 2 {
        return 0.0;
    }
    let mean = ratios.iter().sum::<f32>() / ratios.len() as f32;
    let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / ratios.len() as f32;
    clamp01(variance * scale)
}

/// Blend of the mean ratio and the extreme (min/max spread) ratio.
fn hybrid_tia(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let weight = params.number("weight", 0.5).clamp(0.0, 1.0) as f32;
    let ratios = tia_ratios(ctx);
    if ratios.is_empty() {
        return 0.5;
    }
    let mean = ratios.iter().sum::<f32>() / ratios.len() as f32;
    let extreme = ratios.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    clamp01(mean) * weight + clamp01(extreme) * (1.0 - weight)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    let entries: &[(&'static str, &'static str, &'static str, super::ValueFn, Vec<(String, ParamKind)>)] = &[
        ("triangle-inequality-average", "Triangle Inequality Average", "Mean step-to-step orbit magnitude ratio.", triangle_inequality_average, vec![]),
        ("weighted-tia", "Weighted TIA", "Orbit magnitude ratio average with exponential recency weighting.", weighted_tia, vec![("decay".to_string(), ParamKind::Number { min: 0.0, max: 0.999, step: 0.001, default: 0.9 })]),
        ("phase-tia", "Phase TIA", "Orbit magnitude ratio average weighted by orbit phase.", phase_tia, vec![]),
        ("minimum-tia", "Minimum TIA", "Minimum step-to-step orbit magnitude ratio.", minimum_tia, vec![]),
        ("maximum-tia", "Maximum TIA", "Maximum step-to-step orbit magnitude ratio.", maximum_tia, vec![]),
        ("variance-tia", "Variance TIA", "Variance of the step-to-step orbit magnitude ratio.", variance_tia, vec![("scale".to_string(), ParamKind::Number { min: 0.01, max: 64.0, step: 0.01, default: 4.0 })]),
        ("hybrid-tia", "Hybrid TIA", "Weighted blend of the mean and the extreme ratio across the orbit.", hybrid_tia, vec![("weight".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 })]),
    ];

    for (id, display_name, description, value_fn, schema) in entries.iter() {
        registry.register(AlgorithmEntry {
            id,
            display_name,
            category: AlgorithmCategory::TriangleInequality,
            description,
            value_fn: *value_fn,
            param_schema: schema.clone(),
            compatibility: vec!["all"],
            requires_orbit_history: true,
            requires_precompute: false,
            tags: vec!["tia"],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelField, RenderConfig};

    #[test]
    fn triangle_inequality_average_without_history_is_neutral() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![1.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert_eq!(triangle_inequality_average(&ctx, &params, None), 0.5);
    }

    #[test]
    fn triangle_inequality_average_with_growing_orbit_exceeds_neutral() {
        let config = RenderConfig::new(1, 1, 100);
        let history = vec![vec![(0.1, 0.0), (0.5, 0.0), (1.0, 0.0), (2.0, 0.0)]];
        let field = PixelField::new(vec![4.0], vec![1], vec![2.0], vec![0.0]).with_orbit_history(history);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert!(triangle_inequality_average(&ctx, &params, None) > 0.5);
    }
}
