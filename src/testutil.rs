//! Shared test helpers, colocated with the code instead of a `tests/` crate
//! since the engine's tests live in `#[cfg(test)]` modules throughout.
//!
//! `approx_eq` is lifted from the source project's own `renderer::tests`.

#![cfg(test)]

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

pub fn approx_eq_f32(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}
