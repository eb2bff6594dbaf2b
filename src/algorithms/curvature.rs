//! CURVATURE family: finite-difference curvature of the iteration field, and
//! turning/acceleration/torsion measures of the recorded orbit.

use super::{clamp01, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn laplacian(ctx: &PixelContext) -> f32 {
    let center = ctx.iterations;
    ctx.neighbour_iterations(1, 0) + ctx.neighbour_iterations(-1, 0) + ctx.neighbour_iterations(0, 1)
        + ctx.neighbour_iterations(0, -1)
        - 4.0 * center
}

fn second_derivative_x(ctx: &PixelContext) -> f32 {
    ctx.neighbour_iterations(1, 0) - 2.0 * ctx.iterations + ctx.neighbour_iterations(-1, 0)
}

fn second_derivative_y(ctx: &PixelContext) -> f32 {
    ctx.neighbour_iterations(0, 1) - 2.0 * ctx.iterations + ctx.neighbour_iterations(0, -1)
}

fn mixed_derivative(ctx: &PixelContext) -> f32 {
    (ctx.neighbour_iterations(1, 1) - ctx.neighbour_iterations(1, -1) - ctx.neighbour_iterations(-1, 1)
        + ctx.neighbour_iterations(-1, -1))
        / 4.0
}

fn edge_magnitude(ctx: &PixelContext) -> f32 {
    let gx = -ctx.neighbour_iterations(-1, -1) - 2.0 * ctx.neighbour_iterations(-1, 0) - ctx.neighbour_iterations(-1, 1)
        + ctx.neighbour_iterations(1, -1)
        + 2.0 * ctx.neighbour_iterations(1, 0)
        + ctx.neighbour_iterations(1, 1);
    let gy = -ctx.neighbour_iterations(-1, -1) - 2.0 * ctx.neighbour_iterations(0, -1) - ctx.neighbour_iterations(1, -1)
        + ctx.neighbour_iterations(-1, 1)
        + 2.0 * ctx.neighbour_iterations(0, 1)
        + ctx.neighbour_iterations(1, 1);
    (gx * gx + gy * gy).sqrt()
}

/// Discrete Laplacian of the iteration field, normalized by `max_iterations`.
fn curvature_estimate(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let normalization = params.number("normalization", 100.0) as f32;
    clamp01(laplacian(ctx).abs() * normalization / ctx.max_iterations.max(1) as f32 / normalization.max(1.0))
}

fn mean_curvature(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let normalization = params.number("normalization", 100.0) as f32;
    let mean = 0.5 * (second_derivative_x(ctx) + second_derivative_y(ctx));
    clamp01(mean.abs() / normalization.max(1.0))
}

fn gaussian_curvature(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let normalization = params.number("normalization", 100.0) as f32;
    let ixx = second_derivative_x(ctx);
    let iyy = second_derivative_y(ctx);
    let ixy = mixed_derivative(ctx);
    let gaussian = ixx * iyy - ixy * ixy;
    clamp01(gaussian.abs().sqrt() / normalization.max(1.0))
}

fn angular_velocity(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 3 => h,
        _ => return 0.0,
    };
    let mut total = 0.0;
    let mut count = 0.0;
    for w in history.windows(3) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        let (x2, y2) = w[2];
        let v1 = (x1 - x0, y1 - y0);
        let v2 = (x2 - x1, y2 - y1);
        let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
        if n1 > 1e-12 && n2 > 1e-12 {
            let cos_theta = ((v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2)).clamp(-1.0, 1.0);
            total += cos_theta.acos();
            count += 1.0;
        }
    }
    if count > 0.0 {
        clamp01(total / count / std::f32::consts::PI)
    } else {
        0.0
    }
}

fn orbit_acceleration(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 1.0) as f32;
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 3 => h,
        _ => return 0.0,
    };
    let radii: Vec<f32> = history.iter().map(|&(x, y)| (x * x + y * y).sqrt()).collect();
    let second_diffs: f32 = radii.windows(3).map(|w| (w[2] - 2.0 * w[1] + w[0]).abs()).sum();
    clamp01(second_diffs * scale / (radii.len() as f32 - 2.0).max(1.0))
}

/// Proxy for discrete torsion: dispersion of the signed turning direction
/// across consecutive orbit triples.
fn torsion_estimate(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let torsion = params.number("torsion", 10.0) as f32;
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 4 => h,
        _ => return 0.0,
    };
    let mut signed_turns = Vec::with_capacity(history.len());
    for w in history.windows(3) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        let (x2, y2) = w[2];
        let v1 = (x1 - x0, y1 - y0);
        let v2 = (x2 - x1, y2 - y1);
        let cross = v1.0 * v2.1 - v1.1 * v2.0;
        let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
        if n1 > 1e-12 && n2 > 1e-12 {
            signed_turns.push(cross / (n1 * n2));
        }
    }
    if signed_turns.len() < 2 {
        return 0.0;
    }
    let mean: f32 = signed_turns.iter().sum::<f32>() / signed_turns.len() as f32;
    let variance: f32 = signed_turns.iter().map(|t| (t - mean) * (t - mean)).sum::<f32>() / signed_turns.len() as f32;
    clamp01(variance.sqrt() * torsion)
}

fn combined_curvature(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let a = mean_curvature(ctx, params, h);
    let normalization = params.number("normalization", 100.0) as f32;
    let b = clamp01(edge_magnitude(ctx) / (8.0 * normalization.max(1.0)));
    (a + b) * 0.5
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    fn normalization_schema(default: f64) -> Vec<(String, ParamKind)> {
        vec![("normalization".to_string(), ParamKind::Number { min: 0.001, max: 10000.0, step: 0.1, default })]
    }

    registry.register(AlgorithmEntry {
        id: "curvature-estimate",
        display_name: "Curvature Estimate",
        category: AlgorithmCategory::Curvature,
        description: "Discrete Laplacian of the neighbouring iteration field.",
        value_fn: curvature_estimate,
        param_schema: normalization_schema(100.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["curvature"],
    });
    registry.register(AlgorithmEntry {
        id: "mean-curvature",
        display_name: "Mean Curvature",
        category: AlgorithmCategory::Curvature,
        description: "Mean of the second derivatives of the iteration field.",
        value_fn: mean_curvature,
        param_schema: normalization_schema(100.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["curvature"],
    });
    registry.register(AlgorithmEntry {
        id: "gaussian-curvature",
        display_name: "Gaussian Curvature",
        category: AlgorithmCategory::Curvature,
        description: "Discrete Gaussian curvature approximation of the iteration field.",
        value_fn: gaussian_curvature,
        param_schema: normalization_schema(100.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["curvature"],
    });
    registry.register(AlgorithmEntry {
        id: "angular-velocity",
        display_name: "Angular Velocity",
        category: AlgorithmCategory::Curvature,
        description: "Average turning angle between consecutive orbit segments.",
        value_fn: angular_velocity,
        param_schema: vec![],
        compatibility: vec!["all"],
        requires_orbit_history: true,
        requires_precompute: false,
        tags: vec!["curvature", "orbit"],
    });
    registry.register(AlgorithmEntry {
        id: "orbit-acceleration",
        display_name: "Orbit Acceleration",
        category: AlgorithmCategory::Curvature,
        description: "Mean absolute second difference of the orbit's radius.",
        value_fn: orbit_acceleration,
        param_schema: vec![("scale".to_string(), ParamKind::Number { min: 0.001, max: 1000.0, step: 0.001, default: 1.0 })],
        compatibility: vec!["all"],
        requires_orbit_history: true,
        requires_precompute: false,
        tags: vec!["curvature", "orbit"],
    });
    registry.register(AlgorithmEntry {
        id: "torsion-estimate",
        display_name: "Torsion Estimate",
        category: AlgorithmCategory::Curvature,
        description: "Dispersion of the orbit's signed turning direction across consecutive triples.",
        value_fn: torsion_estimate,
        param_schema: vec![("torsion".to_string(), ParamKind::Number { min: 0.01, max: 1000.0, step: 0.01, default: 10.0 })],
        compatibility: vec!["all"],
        requires_orbit_history: true,
        requires_precompute: false,
        tags: vec!["curvature", "orbit"],
    });
    registry.register(AlgorithmEntry {
        id: "combined-curvature",
        display_name: "Combined Curvature",
        category: AlgorithmCategory::Curvature,
        description: "Blend of mean curvature and Sobel-style edge magnitude.",
        value_fn: combined_curvature,
        param_schema: normalization_schema(100.0),
        compatibility: vec!["all"],
        requires_orbit_history: false,
        requires_precompute: false,
        tags: vec!["curvature", "edge"],
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_field_has_zero_curvature() {
        let config = crate::pixel::RenderConfig::new(3, 3, 50);
        let iterations = vec![10.0; 9];
        let field = crate::pixel::PixelField::new(iterations, vec![0; 9], vec![0.0; 9], vec![0.0; 9]);
        let ctx = field.context_at(4, &config);
        let params = ParamMap::new();
        assert_eq!(curvature_estimate(&ctx, &params, None), 0.0);
        assert_eq!(mean_curvature(&ctx, &params, None), 0.0);
    }

    #[test]
    fn torsion_needs_history() {
        let config = crate::pixel::RenderConfig::new(1, 1, 50);
        let field = crate::pixel::PixelField::new(vec![5.0], vec![0], vec![0.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let params = ParamMap::new();
        assert_eq!(torsion_estimate(&ctx, &params, None), 0.0);
    }
}
