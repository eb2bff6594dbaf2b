//! ORBIT_TRAP family: color by how close the orbit came to a fixed shape.
//!
//! Grounded on the source project's `OrbitData` (final orbit point, tracked
//! alongside iteration count) generalized to the full recorded orbit via
//! [`super::orbit_points`]: the minimum distance is taken over the whole
//! orbit when history was recorded, and over the final point alone when it
//! was not (the open question on this behaviour is recorded in `DESIGN.md`).

use super::{clamp01, orbit_points, AlgorithmCategory, AlgorithmEntry, ParamKind, ParamMap};
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

fn min_trap_distance(ctx: &PixelContext, dist_fn: impl Fn(f64, f64) -> f64) -> f64 {
    let mut best = f64::INFINITY;
    for (x, y) in orbit_points(ctx) {
        let d = dist_fn(x as f64, y as f64);
        if d < best {
            best = d;
        }
    }
    if best.is_finite() {
        best
    } else {
        0.0
    }
}

fn trap_value(best: f64, params: &ParamMap) -> f32 {
    let sharpness = params.number("sharpness", 2.0);
    clamp01((-best * sharpness).exp() as f32)
}

fn sharpness_schema() -> Vec<(String, ParamKind)> {
    vec![(
        "sharpness".to_string(),
        ParamKind::Number { min: 0.01, max: 64.0, step: 0.01, default: 2.0 },
    )]
}

fn with_radius_schema(default_radius: f64) -> Vec<(String, ParamKind)> {
    let mut schema = sharpness_schema();
    schema.push((
        "radius".to_string(),
        ParamKind::Number { min: 0.0, max: 16.0, step: 0.01, default: default_radius },
    ));
    schema
}

fn with_n_schema(default_n: f64) -> Vec<(String, ParamKind)> {
    let mut schema = sharpness_schema();
    schema.push(("n".to_string(), ParamKind::Number { min: 2.0, max: 24.0, step: 1.0, default: default_n }));
    schema
}

fn sample_curve_min_dist(x: f64, y: f64, curve: impl Fn(f64) -> (f64, f64), samples: u32) -> f64 {
    let mut best = f64::INFINITY;
    for i in 0..samples {
        let t = std::f64::consts::TAU * i as f64 / samples as f64;
        let (cx, cy) = curve(t);
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        if d < best {
            best = d;
        }
    }
    best
}

fn dist_point(x: f64, y: f64, px: f64, py: f64) -> f64 {
    ((x - px).powi(2) + (y - py).powi(2)).sqrt()
}

fn dist_line_angle(x: f64, y: f64, angle: f64) -> f64 {
    (x * angle.sin() - y * angle.cos()).abs()
}

fn dist_cross(x: f64, y: f64) -> f64 {
    x.abs().min(y.abs())
}

fn dist_x_cross(x: f64, y: f64) -> f64 {
    ((x - y).abs()).min((x + y).abs()) / std::f64::consts::SQRT_2
}

fn dist_square(x: f64, y: f64, radius: f64) -> f64 {
    (x.abs().max(y.abs()) - radius).abs()
}

fn dist_circle(x: f64, y: f64, radius: f64) -> f64 {
    ((x * x + y * y).sqrt() - radius).abs()
}

fn dist_concentric(x: f64, y: f64, spacing: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let k = (r / spacing).round();
    (r - k * spacing).abs()
}

fn dist_polygon(x: f64, y: f64, n: f64, radius: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x);
    let sector = std::f64::consts::TAU / n;
    let local = theta.rem_euclid(sector) - sector / 2.0;
    let edge_r = radius / local.cos().max(1e-6);
    (r - edge_r).abs()
}

fn dist_star(x: f64, y: f64, n: f64, radius: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x);
    let modulated = radius * (0.5 + 0.5 * (theta * n).cos());
    (r - modulated).abs()
}

fn dist_spiral_archimedean(x: f64, y: f64, pitch: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x).rem_euclid(std::f64::consts::TAU);
    let mut best = f64::INFINITY;
    for k in -2..=4 {
        let expected = pitch * (theta + std::f64::consts::TAU * k as f64);
        best = best.min((r - expected).abs());
    }
    best
}

fn dist_spiral_log(x: f64, y: f64, growth: f64) -> f64 {
    let r = (x * x + y * y).max(1e-12).sqrt();
    let theta = y.atan2(x).rem_euclid(std::f64::consts::TAU);
    let mut best = f64::INFINITY;
    for k in -2..=4 {
        let expected = (growth * (theta + std::f64::consts::TAU * k as f64)).exp();
        best = best.min((r.ln() - expected.ln()).abs());
    }
    best
}

fn dist_spiral_fermat(x: f64, y: f64, a: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x).rem_euclid(std::f64::consts::TAU);
    let mut best = f64::INFINITY;
    for k in 0..6 {
        let expected = a * (theta + std::f64::consts::TAU * k as f64).sqrt();
        best = best.min((r - expected).abs());
    }
    best
}

fn dist_spiral_golden(x: f64, y: f64, scale: f64) -> f64 {
    const PHI: f64 = 1.618_033_988_749_895;
    let r = (x * x + y * y).max(1e-12).sqrt();
    let theta = y.atan2(x).rem_euclid(std::f64::consts::TAU);
    let b = PHI.ln() / (std::f64::consts::PI / 2.0);
    let mut best = f64::INFINITY;
    for k in -2..=4 {
        let expected = scale * (b * (theta + std::f64::consts::TAU * k as f64)).exp();
        best = best.min((r - expected).abs());
    }
    best
}

fn dist_grid(x: f64, y: f64, spacing: f64) -> f64 {
    let dx = (x.rem_euclid(spacing) - spacing / 2.0).abs();
    let dy = (y.rem_euclid(spacing) - spacing / 2.0).abs();
    dx.min(dy)
}

fn dist_radial_grid(x: f64, y: f64, spacing: f64) -> f64 {
    let dc = dist_concentric(x, y, spacing);
    let theta = y.atan2(x);
    let spokes = 12.0;
    let sector = std::f64::consts::TAU / spokes;
    let da = (theta.rem_euclid(sector) - sector / 2.0).abs() * (x * x + y * y).sqrt();
    dc.min(da)
}

fn dist_hex_grid(x: f64, y: f64, spacing: f64) -> f64 {
    let q = (x * 2.0 / 3.0) / spacing;
    let r = (-x / 3.0 + (3f64).sqrt() / 3.0 * y) / spacing;
    let rq = q.round();
    let rr = r.round();
    let px = spacing * 1.5 * rq;
    let py = spacing * (3f64).sqrt() * (rr + rq / 2.0);
    dist_point(x, y, px, py)
}

fn dist_flower(x: f64, y: f64, n: f64, radius: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x);
    let petal = radius * (n * theta).cos().abs();
    (r - petal).abs()
}

fn dist_rose(x: f64, y: f64, k: f64, radius: f64) -> f64 {
    let r = (x * x + y * y).sqrt();
    let theta = y.atan2(x);
    let expected = radius * (k * theta).cos();
    (r - expected.abs()).abs()
}

fn dist_gaussian(x: f64, y: f64) -> f64 {
    dist_point(x, y, x.round(), y.round())
}

fn dist_eisenstein(x: f64, y: f64) -> f64 {
    let sqrt3 = (3f64).sqrt();
    let a = x - y / sqrt3;
    let b = 2.0 * y / sqrt3;
    let ra = a.round();
    let rb = b.round();
    let px = ra + rb / 2.0;
    let py = rb * sqrt3 / 2.0;
    dist_point(x, y, px, py)
}

macro_rules! simple_trap {
    ($name:ident, $dist:expr) => {
        fn $name(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
            let best = min_trap_distance(ctx, |x, y| $dist(x, y, params));
            trap_value(best, params)
        }
    };
}

simple_trap!(trap_point, |x, y, params: &ParamMap| dist_point(
    x,
    y,
    params.number("x", 0.0),
    params.number("y", 0.0)
));
simple_trap!(trap_origin, |x, y, _p: &ParamMap| dist_point(x, y, 0.0, 0.0));
simple_trap!(trap_line, |x, y, _p: &ParamMap| dist_line_angle(x, y, 0.0));
simple_trap!(trap_axis_angle_line, |x, y, params: &ParamMap| dist_line_angle(
    x,
    y,
    params.number("angle_degrees", 45.0).to_radians()
));
simple_trap!(trap_cross, |x, y, _p: &ParamMap| dist_cross(x, y));
simple_trap!(trap_x_cross, |x, y, _p: &ParamMap| dist_x_cross(x, y));
simple_trap!(trap_star_cross, |x, y, _p: &ParamMap| dist_cross(x, y).min(dist_x_cross(x, y)));
simple_trap!(trap_square, |x, y, params: &ParamMap| dist_square(x, y, params.number("radius", 1.0)));
simple_trap!(trap_circle, |x, y, params: &ParamMap| dist_circle(x, y, params.number("radius", 1.0)));
simple_trap!(trap_concentric, |x, y, params: &ParamMap| dist_concentric(
    x,
    y,
    params.number("spacing", 0.5)
));
simple_trap!(trap_polygon, |x, y, params: &ParamMap| dist_polygon(
    x,
    y,
    params.number("n", 5.0),
    params.number("radius", 1.0)
));
simple_trap!(trap_star, |x, y, params: &ParamMap| dist_star(
    x,
    y,
    params.number("n", 5.0),
    params.number("radius", 1.0)
));
simple_trap!(trap_spiral, |x, y, params: &ParamMap| dist_spiral_archimedean(
    x,
    y,
    params.number("pitch", 0.2)
));
simple_trap!(trap_log_spiral, |x, y, params: &ParamMap| dist_spiral_log(
    x,
    y,
    params.number("growth", 0.2)
));
simple_trap!(trap_fermat_spiral, |x, y, params: &ParamMap| dist_spiral_fermat(
    x,
    y,
    params.number("a", 0.3)
));
simple_trap!(trap_golden_spiral, |x, y, params: &ParamMap| dist_spiral_golden(
    x,
    y,
    params.number("scale", 0.1)
));
simple_trap!(trap_grid, |x, y, params: &ParamMap| dist_grid(x, y, params.number("spacing", 0.5)));
simple_trap!(trap_radial_grid, |x, y, params: &ParamMap| dist_radial_grid(
    x,
    y,
    params.number("spacing", 0.5)
));
simple_trap!(trap_hex_grid, |x, y, params: &ParamMap| dist_hex_grid(x, y, params.number("spacing", 0.5)));
simple_trap!(trap_flower, |x, y, params: &ParamMap| dist_flower(
    x,
    y,
    params.number("n", 5.0),
    params.number("radius", 1.0)
));
simple_trap!(trap_rose, |x, y, params: &ParamMap| dist_rose(
    x,
    y,
    params.number("k", 3.0),
    params.number("radius", 1.0)
));
simple_trap!(trap_gaussian, |x, y, _p: &ParamMap| dist_gaussian(x, y));
simple_trap!(trap_eisenstein, |x, y, _p: &ParamMap| dist_eisenstein(x, y));

fn trap_lissajous(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let a = params.number("a", 3.0);
    let b = params.number("b", 2.0);
    let delta = params.number("delta", std::f64::consts::FRAC_PI_2);
    let scale = params.number("scale", 1.0);
    let best = min_trap_distance(ctx, |x, y| {
        sample_curve_min_dist(x, y, |t| (scale * (a * t).sin(), scale * (b * t + delta).sin()), 128)
    });
    trap_value(best, params)
}

fn trap_epitrochoid(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let r = params.number("r", 0.3);
    let rr = params.number("inner_r", 0.1);
    let d = params.number("d", 0.2);
    let best = min_trap_distance(ctx, |x, y| {
        sample_curve_min_dist(
            x,
            y,
            |t| {
                let k = (r + rr) / rr;
                (
                    (r + rr) * t.cos() - d * (k * t).cos(),
                    (r + rr) * t.sin() - d * (k * t).sin(),
                )
            },
            128,
        )
    });
    trap_value(best, params)
}

fn trap_hypotrochoid(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let r = params.number("r", 0.3);
    let rr = params.number("inner_r", 0.1);
    let d = params.number("d", 0.2);
    let best = min_trap_distance(ctx, |x, y| {
        sample_curve_min_dist(
            x,
            y,
            |t| {
                let k = (r - rr) / rr;
                (
                    (r - rr) * t.cos() + d * (k * t).cos(),
                    (r - rr) * t.sin() - d * (k * t).sin(),
                )
            },
            128,
        )
    });
    trap_value(best, params)
}

fn trap_pickover_stalks(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let mut best = f64::INFINITY;
    for (x, y) in orbit_points(ctx) {
        let d = (y as f64).abs().min((x as f64).abs());
        if d < best {
            best = d;
        }
    }
    if !best.is_finite() {
        best = 0.0;
    }
    trap_value(best, params)
}

fn multi_trap(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let radius = params.number("radius", 1.0);
    let best = min_trap_distance(ctx, |x, y| dist_point(x, y, 0.0, 0.0).min(dist_circle(x, y, radius)));
    trap_value(best, params)
}

fn phase_trap(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let mut closest = (f64::INFINITY, 0.0_f64);
    for (x, y) in orbit_points(ctx) {
        let d = dist_point(x as f64, y as f64, 0.0, 0.0);
        if d < closest.0 {
            closest = (d, (y as f64).atan2(x as f64));
        }
    }
    let _ = params;
    ((closest.1 / std::f64::consts::TAU).rem_euclid(1.0)) as f32
}

fn animated_trap(ctx: &PixelContext, params: &ParamMap, _h: Option<&HistogramContext>) -> f32 {
    let phase = params.number("phase", 0.0);
    let radius = params.number("radius", 0.5);
    let px = radius * phase.cos();
    let py = radius * phase.sin();
    let best = min_trap_distance(ctx, |x, y| dist_point(x, y, px, py));
    trap_value(best, params)
}

pub(super) fn register(registry: &mut super::AlgorithmRegistry) {
    let entries: &[(&'static str, &'static str, &'static str, super::ValueFn, Vec<(String, ParamKind)>, &'static [&'static str])] = &[
        ("trap-point", "Trap: Point", "Distance to a fixed point.", trap_point, {
            let mut s = sharpness_schema();
            s.push(("x".to_string(), ParamKind::Number { min: -8.0, max: 8.0, step: 0.01, default: 0.0 }));
            s.push(("y".to_string(), ParamKind::Number { min: -8.0, max: 8.0, step: 0.01, default: 0.0 }));
            s
        }, &["point"]),
        ("trap-origin", "Trap: Origin", "Distance to the origin.", trap_origin, sharpness_schema(), &["point"]),
        ("trap-line", "Trap: Line", "Distance to the real axis.", trap_line, sharpness_schema(), &["line"]),
        ("trap-axis-angle-line", "Trap: Angled Line", "Distance to a line through the origin at a configurable angle.", trap_axis_angle_line, {
            let mut s = sharpness_schema();
            s.push(("angle_degrees".to_string(), ParamKind::Number { min: 0.0, max: 360.0, step: 1.0, default: 45.0 }));
            s
        }, &["line"]),
        ("trap-cross", "Trap: Cross", "Distance to the axis-aligned cross.", trap_cross, sharpness_schema(), &["cross"]),
        ("trap-x-cross", "Trap: Diagonal Cross", "Distance to the 45-degree diagonal cross.", trap_x_cross, sharpness_schema(), &["cross"]),
        ("trap-star-cross", "Trap: Star Cross", "Distance to the combined axis and diagonal cross.", trap_star_cross, sharpness_schema(), &["cross"]),
        ("trap-square", "Trap: Square", "Distance to a square frame.", trap_square, with_radius_schema(1.0), &["square"]),
        ("trap-circle", "Trap: Circle", "Distance to a circle.", trap_circle, with_radius_schema(1.0), &["circle"]),
        ("trap-concentric", "Trap: Concentric Circles", "Distance to the nearest of a family of concentric circles.", trap_concentric, {
            let mut s = sharpness_schema();
            s.push(("spacing".to_string(), ParamKind::Number { min: 0.01, max: 4.0, step: 0.01, default: 0.5 }));
            s
        }, &["circle"]),
        ("trap-polygon", "Trap: Polygon", "Distance to a regular polygon.", trap_polygon, with_n_schema(5.0), &["polygon"]),
        ("trap-star", "Trap: Star", "Distance to a radially modulated star shape.", trap_star, with_n_schema(5.0), &["star"]),
        ("trap-spiral", "Trap: Archimedean Spiral", "Distance to an Archimedean spiral.", trap_spiral, {
            let mut s = sharpness_schema();
            s.push(("pitch".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.2 }));
            s
        }, &["spiral"]),
        ("trap-log-spiral", "Trap: Logarithmic Spiral", "Distance to a logarithmic spiral.", trap_log_spiral, {
            let mut s = sharpness_schema();
            s.push(("growth".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.2 }));
            s
        }, &["spiral"]),
        ("trap-fermat-spiral", "Trap: Fermat Spiral", "Distance to a Fermat spiral.", trap_fermat_spiral, {
            let mut s = sharpness_schema();
            s.push(("a".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.3 }));
            s
        }, &["spiral"]),
        ("trap-golden-spiral", "Trap: Golden Spiral", "Distance to a golden-ratio logarithmic spiral.", trap_golden_spiral, {
            let mut s = sharpness_schema();
            s.push(("scale".to_string(), ParamKind::Number { min: 0.001, max: 2.0, step: 0.001, default: 0.1 }));
            s
        }, &["spiral"]),
        ("trap-grid", "Trap: Grid", "Distance to an orthogonal grid of lines.", trap_grid, {
            let mut s = sharpness_schema();
            s.push(("spacing".to_string(), ParamKind::Number { min: 0.01, max: 4.0, step: 0.01, default: 0.5 }));
            s
        }, &["grid"]),
        ("trap-radial-grid", "Trap: Radial Grid", "Distance to a combined ring-and-spoke radial grid.", trap_radial_grid, {
            let mut s = sharpness_schema();
            s.push(("spacing".to_string(), ParamKind::Number { min: 0.01, max: 4.0, step: 0.01, default: 0.5 }));
            s
        }, &["grid"]),
        ("trap-hex-grid", "Trap: Hex Grid", "Distance to the nearest hexagonal lattice point.", trap_hex_grid, {
            let mut s = sharpness_schema();
            s.push(("spacing".to_string(), ParamKind::Number { min: 0.01, max: 4.0, step: 0.01, default: 0.5 }));
            s
        }, &["grid"]),
        ("trap-flower", "Trap: Flower", "Distance to a cosine-petaled flower curve.", trap_flower, with_n_schema(5.0), &["flower"]),
        ("trap-rose", "Trap: Rose", "Distance to a polar rose curve.", trap_rose, {
            let mut s = sharpness_schema();
            s.push(("k".to_string(), ParamKind::Number { min: 1.0, max: 12.0, step: 1.0, default: 3.0 }));
            s.push(("radius".to_string(), ParamKind::Number { min: 0.0, max: 8.0, step: 0.01, default: 1.0 }));
            s
        }, &["rose"]),
        ("trap-lissajous", "Trap: Lissajous", "Distance to a sampled Lissajous curve.", trap_lissajous, {
            let mut s = sharpness_schema();
            s.push(("a".to_string(), ParamKind::Number { min: 1.0, max: 12.0, step: 1.0, default: 3.0 }));
            s.push(("b".to_string(), ParamKind::Number { min: 1.0, max: 12.0, step: 1.0, default: 2.0 }));
            s.push(("delta".to_string(), ParamKind::Number { min: 0.0, max: 6.3, step: 0.01, default: std::f64::consts::FRAC_PI_2 }));
            s.push(("scale".to_string(), ParamKind::Number { min: 0.01, max: 4.0, step: 0.01, default: 1.0 }));
            s
        }, &["curve"]),
        ("trap-epitrochoid", "Trap: Epitrochoid", "Distance to a sampled epitrochoid curve.", trap_epitrochoid, {
            let mut s = sharpness_schema();
            s.push(("r".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.3 }));
            s.push(("inner_r".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.1 }));
            s.push(("d".to_string(), ParamKind::Number { min: 0.0, max: 2.0, step: 0.01, default: 0.2 }));
            s
        }, &["curve"]),
        ("trap-hypotrochoid", "Trap: Hypotrochoid", "Distance to a sampled hypotrochoid curve.", trap_hypotrochoid, {
            let mut s = sharpness_schema();
            s.push(("r".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.3 }));
            s.push(("inner_r".to_string(), ParamKind::Number { min: 0.01, max: 2.0, step: 0.01, default: 0.1 }));
            s.push(("d".to_string(), ParamKind::Number { min: 0.0, max: 2.0, step: 0.01, default: 0.2 }));
            s
        }, &["curve"]),
        ("trap-pickover-stalks", "Trap: Pickover Stalks", "Distance to zero of the orbit's smaller component.", trap_pickover_stalks, sharpness_schema(), &["stalks"]),
        ("trap-gaussian", "Trap: Gaussian Integers", "Distance to the nearest Gaussian integer.", trap_gaussian, sharpness_schema(), &["lattice"]),
        ("trap-eisenstein", "Trap: Eisenstein Integers", "Distance to the nearest Eisenstein integer.", trap_eisenstein, sharpness_schema(), &["lattice"]),
        ("multi-trap", "Multi Trap", "Distance to the nearer of a point and a circle trap.", multi_trap, with_radius_schema(1.0), &["composite"]),
        ("phase-trap", "Phase Trap", "Angle of the orbit point closest to the origin.", phase_trap, sharpness_schema(), &["phase"]),
        ("animated-trap", "Animated Trap", "Point trap whose position is offset by a phase parameter.", animated_trap, {
            let mut s = sharpness_schema();
            s.push(("phase".to_string(), ParamKind::Number { min: 0.0, max: 6.3, step: 0.01, default: 0.0 }));
            s.push(("radius".to_string(), ParamKind::Number { min: 0.0, max: 4.0, step: 0.01, default: 0.5 }));
            s
        }, &["point"]),
    ];

    for (id, display_name, description, value_fn, schema, tags) in entries.iter() {
        registry.register(AlgorithmEntry {
            id,
            display_name,
            category: AlgorithmCategory::OrbitTrap,
            description,
            value_fn: *value_fn,
            param_schema: schema.clone(),
            compatibility: vec!["all"],
            requires_orbit_history: true,
            requires_precompute: false,
            tags: tags.to_vec(),
        });
    }
}
