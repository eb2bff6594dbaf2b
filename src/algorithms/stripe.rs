//! STRIPE family: average a periodic function of the orbit's angle (or
//! radius) over the recorded history, producing the banded "stripe average"
//! look. Falls back to a single-sample average over the final point alone
//! when no history was recorded.

use super::{clamp01, orbit_points};
use super::{AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn orbit_average(ctx: &PixelContext, f: impl Fn(f32, f32) -> f32) -> f32 {
    let mut sum = 0.0;
    let mut count = 0.0;
    for (x, y) in orbit_points(ctx) {
        sum += f(x, y);
        count += 1.0;
    }
    if count > 0.0 {
        sum / count
    } else {
        0.5
    }
}

fn stripe_average(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 5.0) as f32;
    clamp01(orbit_average(ctx, |x, y| (y.atan2(x) * freq).sin() * 0.5 + 0.5))
}

fn cosine_stripe(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 5.0) as f32;
    clamp01(orbit_average(ctx, |x, y| (y.atan2(x) * freq).cos() * 0.5 + 0.5))
}

fn weighted_stripe(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 5.0) as f32;
    let history = match ctx.orbit_history {
        Some(h) if !h.is_empty() => h,
        _ => return stripe_average(ctx, params, None),
    };
    let n = history.len() as f32;
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (i, &(x, y)) in history.iter().enumerate() {
        let w = (i as f32 + 1.0) / n;
        weighted += w * ((y.atan2(x) * freq).sin() * 0.5 + 0.5);
        total_weight += w;
    }
    clamp01(weighted / total_weight.max(1e-12))
}

fn multi_frequency_stripe(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq_a = params.number("frequency_a", 3.0) as f32;
    let freq_b = params.number("frequency_b", 7.0) as f32;
    clamp01(orbit_average(ctx, |x, y| {
        let theta = y.atan2(x);
        0.5 * ((theta * freq_a).sin() * 0.5 + 0.5) + 0.5 * ((theta * freq_b).sin() * 0.5 + 0.5)
    }))
}

/// Mean absolute step-to-step change in the stripe value: a magnitude, not a
/// level, of the orbit's angular oscillation.
fn magnitude_stripe(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 5.0) as f32;
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 2 => h,
        _ => return 0.5,
    };
    let values: Vec<f32> = history.iter().map(|&(x, y)| (y.atan2(x) * freq).sin() * 0.5 + 0.5).collect();
    let diffs: f32 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    clamp01(diffs / (values.len() as f32 - 1.0))
}

fn radial_stripe(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 10.0) as f32;
    clamp01(orbit_average(ctx, |x, y| {
        let r = (x * x + y * y).sqrt();
        (r * freq).sin() * 0.5 + 0.5
    }))
}

fn combined_stripe(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let angular = stripe_average(ctx, params, h);
    let radial = radial_stripe(ctx, params, h);
    clamp01(0.5 * angular + 0.5 * radial)
}

fn smooth_stripe_bands(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 5.0) as f32;
    let base = orbit_average(ctx, |x, y| (y.atan2(x) * freq).sin() * 0.5 + 0.5);
    let nu = clamp01(ctx.iterations / ctx.max_iterations.max(1) as f32);
    clamp01(base * 0.7 + nu * 0.3)
}

fn iteration_stripe_hybrid(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let weight = params.number("weight", 0.5).clamp(0.0, 1.0) as f32;
    let stripe_term = stripe_average(ctx, params, h);
    let iter_term = clamp01(ctx.iterations / ctx.max_iterations.max(1) as f32);
    stripe_term * weight + iter_term * (1.0 - weight)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    fn freq_schema(default: f64) -> Vec<(String, ParamKind)> {
        vec![("frequency".to_string(), ParamKind::Number { min: 0.1, max: 64.0, step: 0.1, default })]
    }

    let entries: &[(&'static str, &'static str, &'static str, super::ValueFn, Vec<(String, ParamKind)>)] = &[
        ("stripe-average", "Stripe Average", "Average of a sinusoidal function of orbit angle.", stripe_average, freq_schema(5.0)),
        ("cosine-stripe", "Cosine Stripe", "Average of a cosine function of orbit angle.", cosine_stripe, freq_schema(5.0)),
        ("weighted-stripe", "Weighted Stripe", "Stripe average weighted toward later iterations.", weighted_stripe, freq_schema(5.0)),
        ("multi-frequency-stripe", "Multi-Frequency Stripe", "Average of two superimposed stripe frequencies.", multi_frequency_stripe, vec![
            ("frequency_a".to_string(), ParamKind::Number { min: 0.1, max: 64.0, step: 0.1, default: 3.0 }),
            ("frequency_b".to_string(), ParamKind::Number { min: 0.1, max: 64.0, step: 0.1, default: 7.0 }),
        ]),
        ("magnitude-stripe", "Magnitude Stripe", "Mean absolute step-to-step change in the stripe function.", magnitude_stripe, freq_schema(5.0)),
        ("radial-stripe", "Radial Stripe", "Stripe average using orbit radius instead of angle.", radial_stripe, freq_schema(10.0)),
        ("combined-stripe", "Combined Stripe", "Blend of angular and radial stripe averages.", combined_stripe, freq_schema(5.0)),
        ("smooth-stripe-bands", "Smooth Stripe Bands", "Stripe average blended with the normalized iteration count.", smooth_stripe_bands, freq_schema(5.0)),
        ("iteration-stripe-hybrid", "Iteration/Stripe Hybrid", "Weighted blend of stripe average and linear iteration ratio.", iteration_stripe_hybrid, vec![
            ("frequency".to_string(), ParamKind::Number { min: 0.1, max: 64.0, step: 0.1, default: 5.0 }),
            ("weight".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 }),
        ]),
    ];

    for (id, display_name, description, value_fn, schema) in entries.iter() {
        registry.register(AlgorithmEntry {
            id,
            display_name,
            category: AlgorithmCategory::Stripe,
            description,
            value_fn: *value_fn,
            param_schema: schema.clone(),
            compatibility: vec!["all"],
            requires_orbit_history: true,
            requires_precompute: false,
            tags: vec!["stripe"],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelField, RenderConfig};

    #[test]
    fn stripe_average_without_history_is_neutral() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![1.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert_eq!(stripe_average(&ctx, &params, None), 0.5);
    }

    #[test]
    fn combined_stripe_is_bounded() {
        let config = RenderConfig::new(1, 1, 100);
        let history = vec![vec![(0.1, 0.0), (0.5, 0.2), (1.0, 0.4), (2.0, 0.8)]];
        let field = PixelField::new(vec![4.0], vec![1], vec![2.0], vec![0.8]).with_orbit_history(history);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        let v = combined_stripe(&ctx, &params, None);
        assert!((0.0..=1.0).contains(&v));
    }
}
