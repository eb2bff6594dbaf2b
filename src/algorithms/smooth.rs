//! SMOOTH family: continuous functions of the iteration count and/or the
//! final orbit point, tuned for gradient sampling without banding.

use super::{cycle_reduce, safe_ln, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn smooth_nu(ctx: &PixelContext) -> f64 {
    if !ctx.escaped {
        return ctx.iterations as f64;
    }
    let log_zn = (ctx.orbit_norm().max(1e-12) as f64).ln();
    let nu = (log_zn / (ctx.escape_radius as f64).ln()).ln() / std::f64::consts::LN_2;
    ctx.iterations as f64 + 1.0 - nu
}

fn scale_offset_schema() -> Vec<(String, ParamKind)> {
    vec![
        (
            "cycleScale".to_string(),
            ParamKind::Number { min: 0.01, max: 100.0, step: 0.01, default: 1.0 },
        ),
        (
            "cycleOffset".to_string(),
            ParamKind::Number { min: -256.0, max: 256.0, step: 1.0, default: 0.0 },
        ),
    ]
}

fn smooth_iteration(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("cycleScale", 1.0);
    let offset = params.number("cycleOffset", 0.0);
    let power = params.number("power", 1.0);
    let nu = smooth_nu(ctx);
    let shaped = nu.abs().powf(power) * nu.signum();
    cycle_reduce(shaped as f32, scale, offset)
}

fn continuous_potential(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("cycleScale", 1.0);
    let offset = params.number("cycleOffset", 0.0);
    let potential = ctx.potential.map(|p| p as f64).unwrap_or_else(|| {
        let zn = ctx.orbit_norm().max(1e-12) as f64;
        zn.ln() / 2f64.powf(ctx.iterations as f64).max(1.0)
    });
    cycle_reduce(potential as f32 * ctx.max_iterations as f32, scale, offset)
}

fn fractional_escape(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("cycleScale", 1.0);
    let offset = params.number("cycleOffset", 0.0);
    let bailout = ctx.escape_radius as f64;
    let frac = ((bailout - ctx.orbit_norm() as f64).abs() / bailout.max(1e-12)).clamp(0.0, 1.0);
    let value = ctx.iterations as f64 + frac;
    cycle_reduce(value as f32, scale, offset)
}

fn binary_decomposition(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let axis = params.select("axis", "imaginary");
    let v = if axis == "real" { ctx.orbit_x } else { ctx.orbit_y };
    if v >= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn exponential_smooth(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let rate = params.number("rate", 1.0);
    let nu = smooth_nu(ctx) / ctx.max_iterations.max(1) as f64;
    super::clamp01((1.0 - (-nu * rate).exp()) as f32)
}

fn renormalized(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let exponent = params.number("exponent", 1.0);
    let ratio = (ctx.iterations as f64 / ctx.max_iterations.max(1) as f64).clamp(0.0, 1.0);
    super::clamp01(ratio.powf(exponent) as f32)
}

fn derivative_smooth(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let sharpness = params.number("sharpness", 4.0);
    let d = ctx.distance_or_estimate().abs() as f64;
    super::clamp01((1.0 - (-d * sharpness).exp()) as f32)
}

fn parabolic_smooth(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 0.1);
    let nu = smooth_nu(ctx);
    ((nu * freq).sin() * 0.5 + 0.5) as f32
}

fn sinusoidal_smooth(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 0.15);
    let nu = smooth_nu(ctx);
    ((nu * freq * std::f64::consts::TAU).sin() * 0.5 + 0.5) as f32
}

fn tangent_smooth(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 0.05);
    let nu = smooth_nu(ctx);
    let t = (nu * freq).tan();
    (t.rem_euclid(1.0)) as f32
}

fn log_bands(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 1.0);
    let num = safe_ln(ctx.iterations + 1.0) as f64 * scale;
    let den = safe_ln(ctx.max_iterations.max(1) as f32 + 1.0) as f64;
    super::clamp01((num / den.max(1e-12)) as f32)
}

fn biomorph(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let limit = params.number("limit", 10.0) as f32;
    if ctx.orbit_x.abs() > limit || ctx.orbit_y.abs() > limit {
        1.0
    } else {
        super::clamp01(ctx.iterations / ctx.max_iterations.max(1) as f32)
    }
}

fn smooth_distance_hybrid(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let mix = params.number("mix", 0.5) as f32;
    let a = smooth_iteration(ctx, params, h);
    let b = super::clamp01(ctx.distance_or_estimate().abs());
    super::clamp01(a * (1.0 - mix) + b * mix)
}

fn smooth_angle_hybrid(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let mix = params.number("mix", 0.5) as f32;
    let a = smooth_iteration(ctx, params, h);
    let angle = ctx.angle.unwrap_or_else(|| ctx.orbit_y.atan2(ctx.orbit_x));
    let b = (angle / std::f32::consts::TAU).rem_euclid(1.0);
    super::clamp01(a * (1.0 - mix) + b * mix)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    let mut power_schema = scale_offset_schema();
    power_schema.push((
        "power".to_string(),
        ParamKind::Number { min: 0.1, max: 8.0, step: 0.1, default: 1.0 },
    ));

    registry.register(AlgorithmEntry {
        id: "smooth-iteration",
        display_name: "Smooth Iteration",
        category: AlgorithmCategory::Smooth,
        description: "Classic continuous (de-banded) normalized iteration count.",
        value_fn: smooth_iteration,
        param_schema: power_schema,
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "classic"],
    });

    registry.register(AlgorithmEntry {
        id: "continuous-potential",
        display_name: "Continuous Potential",
        category: AlgorithmCategory::Smooth,
        description: "Electric-potential style continuous escape function.",
        value_fn: continuous_potential,
        param_schema: scale_offset_schema(),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "potential"],
    });

    registry.register(AlgorithmEntry {
        id: "fractional-escape",
        display_name: "Fractional Escape",
        category: AlgorithmCategory::Smooth,
        description: "Iteration count refined by the fractional distance past the escape radius.",
        value_fn: fractional_escape,
        param_schema: scale_offset_schema(),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "binary-decomposition",
        display_name: "Binary Decomposition",
        category: AlgorithmCategory::Smooth,
        description: "Two-tone coloring from the sign of the final orbit component.",
        value_fn: binary_decomposition,
        param_schema: vec![(
            "axis".to_string(),
            ParamKind::Select {
                options: vec!["real".to_string(), "imaginary".to_string()],
                default: "imaginary".to_string(),
            },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "binary"],
    });

    registry.register(AlgorithmEntry {
        id: "exponential-smooth",
        display_name: "Exponential Smooth",
        category: AlgorithmCategory::Smooth,
        description: "Exponential saturation of the normalized smooth iteration count.",
        value_fn: exponential_smooth,
        param_schema: vec![(
            "rate".to_string(),
            ParamKind::Number { min: 0.01, max: 20.0, step: 0.01, default: 1.0 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "renormalized",
        display_name: "Renormalized Iteration",
        category: AlgorithmCategory::Smooth,
        description: "Raw iteration count normalized to [0,1] with an adjustable exponent.",
        value_fn: renormalized,
        param_schema: vec![(
            "exponent".to_string(),
            ParamKind::Number { min: 0.1, max: 8.0, step: 0.1, default: 1.0 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "derivative-smooth",
        display_name: "Derivative Smooth",
        category: AlgorithmCategory::Smooth,
        description: "Smooth function of the distance estimate's local derivative magnitude.",
        value_fn: derivative_smooth,
        param_schema: vec![(
            "sharpness".to_string(),
            ParamKind::Number { min: 0.01, max: 64.0, step: 0.01, default: 4.0 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "distance"],
    });

    registry.register(AlgorithmEntry {
        id: "parabolic-smooth",
        display_name: "Parabolic Smooth",
        category: AlgorithmCategory::Smooth,
        description: "Sinusoidal reshaping of the smooth iteration count at low frequency.",
        value_fn: parabolic_smooth,
        param_schema: vec![(
            "frequency".to_string(),
            ParamKind::Number { min: 0.001, max: 5.0, step: 0.001, default: 0.1 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "sinusoidal-smooth",
        display_name: "Sinusoidal Smooth",
        category: AlgorithmCategory::Smooth,
        description: "Sine-wave banding of the smooth iteration count.",
        value_fn: sinusoidal_smooth,
        param_schema: vec![(
            "frequency".to_string(),
            ParamKind::Number { min: 0.001, max: 5.0, step: 0.001, default: 0.15 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "tangent-smooth",
        display_name: "Tangent Smooth",
        category: AlgorithmCategory::Smooth,
        description: "Tangent-wave reshaping of the smooth iteration count, folded into [0,1).",
        value_fn: tangent_smooth,
        param_schema: vec![(
            "frequency".to_string(),
            ParamKind::Number { min: 0.001, max: 5.0, step: 0.001, default: 0.05 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth"],
    });

    registry.register(AlgorithmEntry {
        id: "log-bands",
        display_name: "Logarithmic Bands",
        category: AlgorithmCategory::Smooth,
        description: "Iteration count compressed into logarithmic bands.",
        value_fn: log_bands,
        param_schema: vec![(
            "scale".to_string(),
            ParamKind::Number { min: 0.01, max: 100.0, step: 0.01, default: 1.0 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "log"],
    });

    registry.register(AlgorithmEntry {
        id: "biomorph",
        display_name: "Biomorph",
        category: AlgorithmCategory::Smooth,
        description: "Pickover biomorph-style two-region test against orbit component magnitude.",
        value_fn: biomorph,
        param_schema: vec![(
            "limit".to_string(),
            ParamKind::Number { min: 0.1, max: 1000.0, step: 0.1, default: 10.0 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "biomorph"],
    });

    registry.register(AlgorithmEntry {
        id: "smooth-distance-hybrid",
        display_name: "Smooth / Distance Hybrid",
        category: AlgorithmCategory::Smooth,
        description: "Blend of smooth iteration count and distance estimate.",
        value_fn: smooth_distance_hybrid,
        param_schema: vec![(
            "mix".to_string(),
            ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "hybrid"],
    });

    registry.register(AlgorithmEntry {
        id: "smooth-angle-hybrid",
        display_name: "Smooth / Angle Hybrid",
        category: AlgorithmCategory::Smooth,
        description: "Blend of smooth iteration count and final orbit angle.",
        value_fn: smooth_angle_hybrid,
        param_schema: vec![(
            "mix".to_string(),
            ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 },
        )],
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["smooth", "hybrid", "angle"],
    });
}
