//! DISTANCE family: functions of the distance estimate (producer-supplied or
//! derived via [`PixelContext::distance_or_estimate`]).

use super::{clamp01, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn sharpness_schema(default: f64) -> Vec<(String, ParamKind)> {
    vec![(
        "sharpness".to_string(),
        ParamKind::Number { min: 0.01, max: 1000.0, step: 0.01, default },
    )]
}

fn distance_estimation(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let k = params.number("sharpness", 8.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    clamp01((1.0 - (-d * k).exp()) as f32)
}

fn normalized_distance(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    clamp01(ctx.distance_or_estimate().abs() / ctx.max_iterations.max(1) as f32)
}

/// Truncated power-law ramp: `intensity * (1 - d/threshold)^falloff` inside
/// the threshold radius, zero beyond it.
fn boundary_glow(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let threshold = params.number("threshold", 0.1).max(1e-12);
    let falloff = params.number("falloff", 2.0);
    let intensity = params.number("intensity", 1.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    if d >= threshold {
        return 0.0;
    }
    clamp01((intensity * (1.0 - d / threshold).powf(falloff)) as f32)
}

/// Logistic edge detector centred on `threshold`, steepened by `sharpness`.
fn outline_detection(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let threshold = params.number("threshold", 0.01);
    let sharpness = params.number("sharpness", 200.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    clamp01((1.0 / (1.0 + (-sharpness * (threshold - d)).exp())) as f32)
}

fn level_sets(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 20.0) as f32;
    (ctx.distance_or_estimate().abs() * freq).rem_euclid(1.0)
}

fn interior_distance(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let k = params.number("sharpness", 8.0) as f32;
    let d = ctx.distance_or_estimate().abs();
    clamp01(1.0 / (1.0 + d * k))
}

/// 4-neighbour central-difference gradient magnitude of the distance field.
/// Falls back to the current pixel's own distance at buffer edges and where
/// no distance buffer is present, via [`PixelContext::distance_at`].
fn gradient_magnitude(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 1.0) as f32;
    let here = ctx.distance_or_estimate();
    let east = ctx.distance_at(1, 0).unwrap_or(here);
    let west = ctx.distance_at(-1, 0).unwrap_or(here);
    let north = ctx.distance_at(0, 1).unwrap_or(here);
    let south = ctx.distance_at(0, -1).unwrap_or(here);
    let gx = east - west;
    let gy = north - south;
    let magnitude = (gx * gx + gy * gy).sqrt();
    clamp01(magnitude * scale)
}

/// Signed distance mapped through `tanh` so interior (negative) and exterior
/// (positive) distance saturate symmetrically to 0 and 1.
fn combined_distance(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 8.0) as f64;
    let d = ctx.distance_or_estimate() as f64;
    clamp01((0.5 + 0.5 * (d * scale).tanh()) as f32)
}

/// Plain exponential falloff, distinct from `boundary-glow`'s Gaussian curve.
fn exponential_glow(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let k = params.number("sharpness", 8.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    clamp01((-d * k).exp() as f32)
}

fn power_law_distance(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 1.0) as f32;
    let power = params.number("power", 2.0) as f32;
    let normalized = ctx.distance_or_estimate().abs() / scale.max(1e-12);
    clamp01(normalized.powf(power))
}

fn distance_bands(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let steps = params.number("steps", 8.0).max(1.0);
    let scale = params.number("scale", 1.0) as f32;
    let normalized = clamp01(ctx.distance_or_estimate().abs() / scale.max(1e-12)) as f64;
    ((normalized * steps).floor() / steps) as f32
}

fn distance_iteration_hybrid(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let weight = params.number("weight", 0.5).clamp(0.0, 1.0) as f32;
    let k = params.number("sharpness", 8.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    let distance_term = clamp01((1.0 - (-d * k).exp()) as f32);
    let iter_term = clamp01(ctx.iterations / ctx.max_iterations.max(1) as f32);
    distance_term * weight + iter_term * (1.0 - weight)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    registry.register(AlgorithmEntry {
        id: "distance-estimation",
        display_name: "Distance Estimation",
        category: AlgorithmCategory::Distance,
        description: "Exponential saturation of the distance estimate.",
        value_fn: distance_estimation,
        param_schema: sharpness_schema(8.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance"],
    });
    registry.register(AlgorithmEntry {
        id: "normalized-distance",
        display_name: "Normalized Distance",
        category: AlgorithmCategory::Distance,
        description: "Distance estimate normalized by the maximum iteration count.",
        value_fn: normalized_distance,
        param_schema: vec![],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance"],
    });
    registry.register(AlgorithmEntry {
        id: "boundary-glow",
        display_name: "Boundary Glow",
        category: AlgorithmCategory::Distance,
        description: "Truncated power-law glow ramp centred on the boundary.",
        value_fn: boundary_glow,
        param_schema: vec![
            ("threshold".to_string(), ParamKind::Number { min: 1e-6, max: 10.0, step: 0.001, default: 0.1 }),
            ("falloff".to_string(), ParamKind::Number { min: 0.1, max: 16.0, step: 0.1, default: 2.0 }),
            ("intensity".to_string(), ParamKind::Number { min: 0.0, max: 10.0, step: 0.01, default: 1.0 }),
        ],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "glow"],
    });
    registry.register(AlgorithmEntry {
        id: "outline-detection",
        display_name: "Outline Detection",
        category: AlgorithmCategory::Distance,
        description: "Logistic edge detector centred on the distance threshold.",
        value_fn: outline_detection,
        param_schema: vec![
            ("threshold".to_string(), ParamKind::Number { min: 0.0, max: 10.0, step: 0.0001, default: 0.01 }),
            ("sharpness".to_string(), ParamKind::Number { min: 0.01, max: 10000.0, step: 0.01, default: 200.0 }),
        ],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "binary"],
    });
    registry.register(AlgorithmEntry {
        id: "level-sets",
        display_name: "Level Sets",
        category: AlgorithmCategory::Distance,
        description: "Repeating contour bands at a fixed distance frequency.",
        value_fn: level_sets,
        param_schema: vec![("frequency".to_string(), ParamKind::Number { min: 0.01, max: 1000.0, step: 0.01, default: 20.0 })],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "contour"],
    });
    registry.register(AlgorithmEntry {
        id: "interior-distance",
        display_name: "Interior Distance",
        category: AlgorithmCategory::Distance,
        description: "Inverse falloff of the distance estimate.",
        value_fn: interior_distance,
        param_schema: sharpness_schema(8.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance"],
    });
    registry.register(AlgorithmEntry {
        id: "gradient-magnitude",
        display_name: "Gradient Magnitude",
        category: AlgorithmCategory::Distance,
        description: "Finite-difference gradient magnitude of the neighbouring distance field.",
        value_fn: gradient_magnitude,
        param_schema: vec![("scale".to_string(), ParamKind::Number { min: 1e-6, max: 100.0, step: 0.001, default: 1.0 })],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "gradient"],
    });
    registry.register(AlgorithmEntry {
        id: "combined-distance",
        display_name: "Combined Distance",
        category: AlgorithmCategory::Distance,
        description: "Signed distance mapped through tanh to a bounded 0..1 range.",
        value_fn: combined_distance,
        param_schema: vec![("scale".to_string(), ParamKind::Number { min: 1e-6, max: 1000.0, step: 0.01, default: 8.0 })],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "signed"],
    });
    registry.register(AlgorithmEntry {
        id: "exponential-glow",
        display_name: "Exponential Glow",
        category: AlgorithmCategory::Distance,
        description: "Plain exponential falloff of the distance estimate.",
        value_fn: exponential_glow,
        param_schema: sharpness_schema(8.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "glow"],
    });
    registry.register(AlgorithmEntry {
        id: "power-law-distance",
        display_name: "Power-Law Distance",
        category: AlgorithmCategory::Distance,
        description: "Distance estimate raised to an adjustable power.",
        value_fn: power_law_distance,
        param_schema: vec![
            ("scale".to_string(), ParamKind::Number { min: 1e-6, max: 100.0, step: 0.001, default: 1.0 }),
            ("power".to_string(), ParamKind::Number { min: 0.1, max: 16.0, step: 0.1, default: 2.0 }),
        ],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance"],
    });
    registry.register(AlgorithmEntry {
        id: "distance-bands",
        display_name: "Distance Bands",
        category: AlgorithmCategory::Distance,
        description: "Distance estimate quantized into a fixed number of steps.",
        value_fn: distance_bands,
        param_schema: vec![
            ("steps".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 8.0 }),
            ("scale".to_string(), ParamKind::Number { min: 1e-6, max: 100.0, step: 0.001, default: 1.0 }),
        ],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance"],
    });
    registry.register(AlgorithmEntry {
        id: "distance-iteration-hybrid",
        display_name: "Distance/Iteration Hybrid",
        category: AlgorithmCategory::Distance,
        description: "Weighted blend of the distance estimate and linear iteration ratio.",
        value_fn: distance_iteration_hybrid,
        param_schema: vec![
            ("weight".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 }),
            ("sharpness".to_string(), ParamKind::Number { min: 0.01, max: 1000.0, step: 0.01, default: 8.0 }),
        ],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["distance", "hybrid"],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{PixelField, RenderConfig};

    #[test]
    fn outline_detection_saturates_well_inside_threshold() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![0.1], vec![0.0]).with_distance(vec![0.001]);
        let ctx = field.context_at(0, &config);
        let mut params = ParamMap::new();
        params.set("sharpness", crate::algorithms::ParamValue::Number(5000.0));
        let v = outline_detection(&ctx, &params, None);
        assert!(v > 0.99, "expected near-saturated edge response, got {v}");
    }

    #[test]
    fn outline_detection_fades_well_outside_threshold() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![0.1], vec![0.0]).with_distance(vec![1.0]);
        let ctx = field.context_at(0, &config);
        let mut params = ParamMap::new();
        params.set("sharpness", crate::algorithms::ParamValue::Number(5000.0));
        let v = outline_detection(&ctx, &params, None);
        assert!(v < 0.01, "expected near-zero edge response, got {v}");
    }

    #[test]
    fn power_law_distance_squared_matches_manual() {
        let config = RenderConfig::new(1, 1, 100);
        let field = PixelField::new(vec![10.0], vec![1], vec![0.1], vec![0.0]).with_distance(vec![0.5]);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert!((power_law_distance(&ctx, &params, None) - 0.25).abs() < 1e-5);
    }
}
