//! End-to-end demo: a small in-process Mandelbrot escape-time loop (grounded
//! in the source project's `Mandelbrot::compute`) fills a `PixelField`, a
//! `CoLoringEngine` with a couple of layers colors it, and the result is
//! written out as a PNG with the `image` crate, the same crate and code
//! shape the source project uses in `save_image`.
//!
//! This is demonstration plumbing for the library's public surface, not a
//! renderer, tile manager, or UI.

use fractal_colorist::gradient::preset_by_name;
use fractal_colorist::{
    AlgorithmRegistry, BlendMode, CoLoringEngine, CoLoringLayer, InteriorMode, PixelField, RenderConfig,
};
use image::{ImageBuffer, Rgba};
use num_complex::Complex64;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MAX_ITERATIONS: u32 = 256;

/// Escape-time iteration for `z <- z^2 + c`, returning the raw iteration
/// count, whether it escaped, the final orbit point, and the full orbit
/// history (used by the orbit-trap/TIA/stripe/curvature/angle families).
fn compute_pixel(cx: f64, cy: f64, max_iter: u32) -> (u32, bool, Complex64, Vec<(f32, f32)>) {
    let c = Complex64::new(cx, cy);
    let mut z = Complex64::new(0.0, 0.0);
    let mut history = Vec::with_capacity(max_iter as usize / 4);

    for i in 0..max_iter {
        history.push((z.re as f32, z.im as f32));
        if z.norm_sqr() > 4.0 {
            return (i, true, z, history);
        }
        z = z * z + c;
    }
    (max_iter, false, z, history)
}

fn build_pixel_field(width: u32, height: u32, max_iter: u32) -> PixelField {
    let pixel_count = (width * height) as usize;
    let mut iterations = Vec::with_capacity(pixel_count);
    let mut escaped = Vec::with_capacity(pixel_count);
    let mut orbit_x = Vec::with_capacity(pixel_count);
    let mut orbit_y = Vec::with_capacity(pixel_count);
    let mut distance = Vec::with_capacity(pixel_count);
    let mut orbit_history = Vec::with_capacity(pixel_count);

    let aspect = width as f64 / height as f64;
    for y in 0..height {
        for x in 0..width {
            let cx = -2.0 * aspect + (x as f64 / width as f64) * 3.0 * aspect;
            let cy = -1.5 + (y as f64 / height as f64) * 3.0;
            let (iter, did_escape, z, history) = compute_pixel(cx, cy, max_iter);

            let smoothed = if did_escape {
                let z_norm = z.norm().max(1e-12);
                iter as f32 + 1.0 - (z_norm.ln() / std::f64::consts::LN_2).ln() as f32
            } else {
                iter as f32
            };
            let z_norm = z.norm().max(1e-12);
            let de = (z_norm * z_norm.ln() / (iter as f64 + 1.0)) as f32;

            iterations.push(smoothed);
            escaped.push(if did_escape { 1 } else { 0 });
            orbit_x.push(z.re as f32);
            orbit_y.push(z.im as f32);
            distance.push(de.max(0.0));
            orbit_history.push(history);
        }
    }

    PixelField::new(iterations, escaped, orbit_x, orbit_y)
        .with_distance(distance)
        .with_orbit_history(orbit_history)
}

fn main() {
    env_logger::init();

    let config = RenderConfig::new(WIDTH, HEIGHT, MAX_ITERATIONS);
    let field = build_pixel_field(WIDTH, HEIGHT, MAX_ITERATIONS);

    let mut engine = CoLoringEngine::new(AlgorithmRegistry::default());
    engine.set_interior_mode(InteriorMode::Black);

    let base = CoLoringLayer::new("smooth", "smooth-iteration", preset_by_name("fire").unwrap());
    engine.add_layer(base);

    let mut glow = CoLoringLayer::new("glow", "boundary-glow", preset_by_name("electric").unwrap());
    glow.opacity = 0.4;
    glow.blend_mode = BlendMode::Screen;
    engine.add_layer(glow);

    let mut out = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
    engine.apply(&field, &config, &mut out).expect("coloring should not fail on a validated buffer");

    let image: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(WIDTH, HEIGHT, out).expect("buffer length matches width*height*4");
    image.save("mandelbrot.png").expect("failed to write mandelbrot.png");

    let stats = engine.stats();
    log::info!(
        "colored {} pixels in {} ns ({} layers skipped)",
        stats.pixels_colored,
        stats.coloring_time_ns,
        stats.skipped_layers
    );
}
