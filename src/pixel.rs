//! Producer-owned pixel buffers and the per-pixel view assembled from them.
//!
//! `PixelField` mirrors the source project's `FractalResult`/`OrbitData` pair
//! (iteration count, escape flag, final orbit point, orbit extrema) but
//! generalizes from "one struct per pixel, computed on demand" to
//! structure-of-arrays buffers the engine can scan and bin in bulk.

use crate::error::ColoringError;

/// Render-call-wide configuration, immutable for the duration of `apply`.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub escape_radius: f32,
}

impl RenderConfig {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        Self {
            width,
            height,
            max_iterations,
            escape_radius: 2.0,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Producer-owned, read-only buffers. All required arrays have length `W*H`.
#[derive(Debug, Clone)]
pub struct PixelField {
    pub iterations: Vec<f32>,
    pub escaped: Vec<u8>,
    pub orbit_x: Vec<f32>,
    pub orbit_y: Vec<f32>,
    pub distance: Option<Vec<f32>>,
    pub potential: Option<Vec<f32>>,
    pub angle: Option<Vec<f32>>,
    pub orbit_history: Option<Vec<Vec<(f32, f32)>>>,
}

impl PixelField {
    pub fn new(iterations: Vec<f32>, escaped: Vec<u8>, orbit_x: Vec<f32>, orbit_y: Vec<f32>) -> Self {
        Self {
            iterations,
            escaped,
            orbit_x,
            orbit_y,
            distance: None,
            potential: None,
            angle: None,
            orbit_history: None,
        }
    }

    pub fn with_distance(mut self, distance: Vec<f32>) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_potential(mut self, potential: Vec<f32>) -> Self {
        self.potential = Some(potential);
        self
    }

    pub fn with_angle(mut self, angle: Vec<f32>) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_orbit_history(mut self, history: Vec<Vec<(f32, f32)>>) -> Self {
        self.orbit_history = Some(history);
        self
    }

    pub fn has_orbit_history(&self) -> bool {
        self.orbit_history.is_some()
    }

    pub fn has_distance(&self) -> bool {
        self.distance.is_some()
    }

    /// Validate buffer lengths against the given render configuration.
    pub fn validate(&self, config: &RenderConfig) -> Result<(), ColoringError> {
        let expected = config.pixel_count();
        let check = |name: &'static str, len: usize| -> Result<(), ColoringError> {
            if len != expected {
                Err(ColoringError::PixelFieldLengthMismatch {
                    field: name,
                    expected,
                    actual: len,
                })
            } else {
                Ok(())
            }
        };
        check("iterations", self.iterations.len())?;
        check("escaped", self.escaped.len())?;
        check("orbit_x", self.orbit_x.len())?;
        check("orbit_y", self.orbit_y.len())?;
        if let Some(d) = &self.distance {
            check("distance", d.len())?;
        }
        if let Some(p) = &self.potential {
            check("potential", p.len())?;
        }
        if let Some(a) = &self.angle {
            check("angle", a.len())?;
        }
        if let Some(h) = &self.orbit_history {
            check("orbit_history", h.len())?;
        }
        Ok(())
    }

    pub fn context_at(&self, i: usize, config: &RenderConfig) -> PixelContext<'_> {
        let width = config.width as usize;
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        PixelContext {
            index: i,
            x,
            y,
            width: config.width,
            height: config.height,
            max_iterations: config.max_iterations,
            escape_radius: config.escape_radius,
            iterations: self.iterations[i],
            escaped: self.escaped[i] != 0,
            orbit_x: self.orbit_x[i],
            orbit_y: self.orbit_y[i],
            distance: self.distance.as_ref().map(|d| d[i]),
            potential: self.potential.as_ref().map(|p| p[i]),
            angle: self.angle.as_ref().map(|a| a[i]),
            orbit_history: self.orbit_history.as_ref().map(|h| h[i].as_slice()),
            field: self,
        }
    }
}

/// Per-pixel view handed to an algorithm's value function. Borrowed from a
/// `PixelField` for the duration of one algorithm call.
#[derive(Clone, Copy)]
pub struct PixelContext<'a> {
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub escape_radius: f32,
    pub iterations: f32,
    pub escaped: bool,
    pub orbit_x: f32,
    pub orbit_y: f32,
    pub distance: Option<f32>,
    pub potential: Option<f32>,
    pub angle: Option<f32>,
    pub orbit_history: Option<&'a [(f32, f32)]>,
    field: &'a PixelField,
}

impl<'a> PixelContext<'a> {
    pub fn orbit_norm(&self) -> f32 {
        (self.orbit_x * self.orbit_x + self.orbit_y * self.orbit_y).sqrt()
    }

    pub fn distance_or_estimate(&self) -> f32 {
        match self.distance {
            Some(d) if d > 0.0 => d,
            _ => {
                let z = self.orbit_norm().max(1e-12);
                z * z.ln() / (self.iterations as f32 + 1.0)
            }
        }
    }

    /// `iterations[i]` at a neighbouring pixel, or this pixel's value if the
    /// neighbour is out of bounds (clamped edge).
    pub fn neighbour_iterations(&self, dx: i32, dy: i32) -> f32 {
        let nx = self.x as i32 + dx;
        let ny = self.y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
            return self.iterations;
        }
        let idx = ny as usize * self.width as usize + nx as usize;
        self.field.iterations[idx]
    }

    pub fn distance_at(&self, dx: i32, dy: i32) -> Option<f32> {
        let nx = self.x as i32 + dx;
        let ny = self.y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
            return self.distance;
        }
        let idx = ny as usize * self.width as usize + nx as usize;
        self.field.distance.as_ref().map(|d| d[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_catches_length_mismatch() {
        let config = RenderConfig::new(2, 2, 100);
        let field = PixelField::new(vec![1.0; 3], vec![1; 4], vec![0.0; 4], vec![0.0; 4]);
        assert!(field.validate(&config).is_err());
    }

    #[test]
    fn validate_accepts_matching_lengths() {
        let config = RenderConfig::new(2, 2, 100);
        let field = PixelField::new(vec![1.0; 4], vec![1; 4], vec![0.0; 4], vec![0.0; 4]);
        assert!(field.validate(&config).is_ok());
    }

    #[test]
    fn context_at_computes_xy() {
        let config = RenderConfig::new(3, 2, 100);
        let field = PixelField::new(vec![0.0; 6], vec![1; 6], vec![0.0; 6], vec![0.0; 6]);
        let ctx = field.context_at(4, &config);
        assert_eq!(ctx.x, 1);
        assert_eq!(ctx.y, 1);
    }
}
