//! ANGLE family: functions of the final orbit angle (decomposition-style
//! colorings), plus accumulated-phase and winding measures over the
//! recorded orbit.
//!
//! `binary-decomposition` (sign of the final imaginary part) is registered
//! under the SMOOTH family instead of here, since the source catalog lists
//! it once and a registry id can only resolve to a single entry.

use super::{clamp01, orbit_points, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;
use std::f32::consts::TAU;

fn final_angle(ctx: &PixelContext) -> f32 {
    ctx.angle.unwrap_or_else(|| ctx.orbit_y.atan2(ctx.orbit_x))
}

fn normalized_angle(ctx: &PixelContext) -> f32 {
    (final_angle(ctx) / TAU).rem_euclid(1.0)
}

fn continuous_angle(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    normalized_angle(ctx)
}

fn angular_decomposition(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let n = params.number("sectors", 8.0).max(1.0);
    let normalized = normalized_angle(ctx) as f64;
    ((normalized * n).floor() / n) as f32
}

fn radial_waves(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let freq = params.number("frequency", 10.0) as f32;
    let r = ctx.orbit_norm();
    (r * freq).sin() * 0.5 + 0.5
}

fn angular_stripes(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let k = params.number("multiplier", 2.0) as f32;
    (final_angle(ctx) * k).sin() * 0.5 + 0.5
}

fn spiral_pattern(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let k = params.number("twist", 0.3);
    let r = ctx.orbit_norm().max(1e-12) as f64;
    let theta = final_angle(ctx) as f64;
    ((theta + k * r.ln()) / std::f64::consts::TAU).rem_euclid(1.0) as f32
}

fn iteration_angle_hybrid(ctx: &PixelContext, params: &ParamMap, h: Option<&HistogramContext>) -> f32 {
    let weight = params.number("weight", 0.5).clamp(0.0, 1.0) as f32;
    let angle_term = continuous_angle(ctx, params, h);
    let iter_term = ctx.iterations / ctx.max_iterations.max(1) as f32;
    angle_term * weight + iter_term * (1.0 - weight)
}

/// Naive cumulative phase: sum of consecutive argument differences without
/// wrap-around correction, normalized by the step count.
fn phase_accumulation(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let mut prev: Option<f64> = None;
    let mut sum = 0.0_f64;
    let mut steps = 0.0_f64;
    for (x, y) in orbit_points(ctx) {
        let theta = (y as f64).atan2(x as f64);
        if let Some(p) = prev {
            sum += theta - p;
            steps += 1.0;
        }
        prev = Some(theta);
    }
    if steps == 0.0 {
        return 0.0;
    }
    ((sum / (steps * std::f64::consts::TAU)).rem_euclid(1.0)) as f32
}

/// Turning number: signed winds around the origin, each step's delta
/// unwrapped to `(-pi, pi]` before accumulation.
fn winding_number(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let max_winds = params.number("max_winds", 5.0).max(1e-6);
    let history = match ctx.orbit_history {
        Some(h) if h.len() >= 2 => h,
        _ => return 0.5,
    };
    let mut total = 0.0_f64;
    let mut prev_theta = (history[0].1 as f64).atan2(history[0].0 as f64);
    for &(x, y) in &history[1..] {
        let theta = (y as f64).atan2(x as f64);
        let mut delta = theta - prev_theta;
        if delta > std::f64::consts::PI {
            delta -= std::f64::consts::TAU;
        } else if delta < -std::f64::consts::PI {
            delta += std::f64::consts::TAU;
        }
        total += delta;
        prev_theta = theta;
    }
    let winds = total / std::f64::consts::TAU;
    clamp01((0.5 + (winds / (2.0 * max_winds))) as f32)
}

/// Sum of the orbit's raw (un-differenced) arguments, wrapped to `[0,1)`.
fn argument_sum(ctx: &PixelContext, _params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let mut sum = 0.0_f64;
    let mut count = 0.0_f64;
    for (x, y) in orbit_points(ctx) {
        let theta = (y as f64).atan2(x as f64).rem_euclid(std::f64::consts::TAU);
        sum += theta;
        count += 1.0;
    }
    if count == 0.0 {
        return 0.0;
    }
    ((sum / std::f64::consts::TAU).rem_euclid(1.0)) as f32
}

fn polar_decomposition(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let sectors = params.number("sectors", 8.0).max(1.0);
    let bands = params.number("bands", 4.0).max(1.0);
    let angle_component = (normalized_angle(ctx) as f64 * sectors).floor() / sectors;
    let r = ctx.orbit_norm() as f64;
    let radial_component = (r * bands).rem_euclid(1.0) / bands;
    ((angle_component + radial_component) / 2.0) as f32
}

fn checkerboard_decomposition(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let n = params.number("angular_n", 6.0) as f32;
    let m = params.number("radial_n", 6.0) as f32;
    let theta = final_angle(ctx);
    let r = ctx.orbit_norm();
    let angular_sign = (theta * n).sin().signum();
    let radial_sign = (r * m).sin().signum();
    if angular_sign * radial_sign >= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn angle_dispersion(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let scale = params.number("scale", 1.0);
    let mut sin_sum = 0.0_f64;
    let mut cos_sum = 0.0_f64;
    let mut count = 0.0_f64;
    for (x, y) in orbit_points(ctx) {
        let theta = (y as f64).atan2(x as f64);
        sin_sum += theta.sin();
        cos_sum += theta.cos();
        count += 1.0;
    }
    if count == 0.0 {
        return 0.0;
    }
    let r = ((sin_sum * sin_sum + cos_sum * cos_sum).sqrt()) / count;
    let circular_variance = (1.0 - r).clamp(0.0, 1.0);
    clamp01((circular_variance * scale) as f32)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    let entries: &[(&'static str, &'static str, &'static str, super::ValueFn, Vec<(String, ParamKind)>, bool)] = &[
        ("continuous-angle", "Continuous Angle", "Normalized final orbit angle.", continuous_angle, vec![], false),
        ("angular-decomposition", "Angular Decomposition", "Final orbit angle quantized into discrete sectors.", angular_decomposition, vec![("sectors".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 8.0 })], false),
        ("radial-waves", "Radial Waves", "Concentric wave pattern from the final orbit radius.", radial_waves, vec![("frequency".to_string(), ParamKind::Number { min: 0.1, max: 200.0, step: 0.1, default: 10.0 })], false),
        ("angular-stripes", "Angular Stripes", "Sine of the final orbit angle at an adjustable multiplier.", angular_stripes, vec![("multiplier".to_string(), ParamKind::Number { min: 0.1, max: 32.0, step: 0.1, default: 2.0 })], false),
        ("spiral-pattern", "Spiral Pattern", "Angle twisted by the logarithm of the orbit radius.", spiral_pattern, vec![("twist".to_string(), ParamKind::Number { min: -4.0, max: 4.0, step: 0.01, default: 0.3 })], false),
        ("iteration-angle-hybrid", "Iteration/Angle Hybrid", "Weighted blend of continuous angle and linear iteration ratio.", iteration_angle_hybrid, vec![("weight".to_string(), ParamKind::Number { min: 0.0, max: 1.0, step: 0.01, default: 0.5 })], false),
        ("phase-accumulation", "Phase Accumulation", "Naive cumulative phase across the recorded orbit.", phase_accumulation, vec![], true),
        ("winding-number", "Winding Number", "Signed turning number of the recorded orbit around the origin.", winding_number, vec![("max_winds".to_string(), ParamKind::Number { min: 0.1, max: 50.0, step: 0.1, default: 5.0 })], true),
        ("argument-sum", "Argument Sum", "Sum of the orbit's raw angular arguments, wrapped to one turn.", argument_sum, vec![], true),
        ("polar-decomposition", "Polar Decomposition", "Combined angular sector and radial band decomposition.", polar_decomposition, vec![
            ("sectors".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 8.0 }),
            ("bands".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 4.0 }),
        ], false),
        ("checkerboard-decomposition", "Checkerboard Decomposition", "Binary pattern from combined angular and radial parity.", checkerboard_decomposition, vec![
            ("angular_n".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 6.0 }),
            ("radial_n".to_string(), ParamKind::Number { min: 1.0, max: 64.0, step: 1.0, default: 6.0 }),
        ], false),
        ("angle-dispersion", "Angle Dispersion", "Circular variance of the recorded orbit's angle.", angle_dispersion, vec![("scale".to_string(), ParamKind::Number { min: 0.01, max: 16.0, step: 0.01, default: 1.0 })], true),
    ];

    for (id, display_name, description, value_fn, schema, requires_history) in entries.iter() {
        registry.register(AlgorithmEntry {
            id,
            display_name,
            category: AlgorithmCategory::Angle,
            description,
            value_fn: *value_fn,
            param_schema: schema.clone(),
            compatibility: vec!["all"],
            requires_orbit_history: *requires_history,
            requires_precompute: false,
            tags: vec!["angle"],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_field(x: f32, y: f32) -> (crate::pixel::RenderConfig, crate::pixel::PixelField) {
        let config = crate::pixel::RenderConfig::new(1, 1, 50);
        let field = crate::pixel::PixelField::new(vec![10.0], vec![0], vec![x], vec![y]);
        (config, field)
    }

    #[test]
    fn continuous_angle_in_unit_range() {
        let (config, field) = ctx_field(1.0, 1.0);
        let ctx = field.context_at(0, &config);
        let v = continuous_angle(&ctx, &ParamMap::new(), None);
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn winding_number_defaults_to_midpoint_without_history() {
        let (config, field) = ctx_field(1.0, 0.0);
        let ctx = field.context_at(0, &config);
        assert_eq!(winding_number(&ctx, &ParamMap::new(), None), 0.5);
    }
}
