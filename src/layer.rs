//! A single coloring layer: one algorithm's raw value, reshaped by a
//! transform, sampled through a gradient, optionally masked, then composited
//! onto the layers below it with a blend mode and opacity.

use crate::algorithms::{AlgorithmRegistry, ParamMap};
use crate::color::{BlendMode, ColorRgb};
use crate::error::ColoringError;
use crate::gradient::Gradient;
use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;

/// Reshapes a raw algorithm value before it is handed to the gradient.
/// Applied in order: `v*scale+offset`, then `sign(v)*|v|^intensity`, then
/// `sign(v)*|v|^gamma`, then an optional sign flip (`invert`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub scale: f64,
    pub offset: f64,
    pub intensity: f64,
    pub gamma: f64,
    pub invert: bool,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            intensity: 1.0,
            gamma: 1.0,
            invert: false,
        }
    }
}

impl LayerTransform {
    pub fn apply(&self, value: f32) -> f32 {
        let mut v = value as f64 * self.scale + self.offset;
        v = v.signum() * v.abs().powf(self.intensity);
        v = v.signum() * v.abs().powf(self.gamma);
        if self.invert {
            v = 1.0 - v;
        }
        v.clamp(0.0, 1.0) as f32
    }
}

/// A single layer in the compositor's layer stack.
#[derive(Clone)]
pub struct CoLoringLayer {
    pub name: String,
    pub algorithm_id: String,
    pub enabled: bool,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub params: ParamMap,
    pub transform: LayerTransform,
    pub gradient: Gradient,
    pub mask_algorithm_id: Option<String>,
    pub mask_invert: bool,
}

impl CoLoringLayer {
    pub fn new(name: impl Into<String>, algorithm_id: impl Into<String>, gradient: Gradient) -> Self {
        Self {
            name: name.into(),
            algorithm_id: algorithm_id.into(),
            enabled: true,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            params: ParamMap::new(),
            transform: LayerTransform::default(),
            gradient,
            mask_algorithm_id: None,
            mask_invert: false,
        }
    }

    pub fn with_mask(mut self, algorithm_id: impl Into<String>, invert: bool) -> Self {
        self.mask_algorithm_id = Some(algorithm_id.into());
        self.mask_invert = invert;
        self
    }

    /// Evaluate this layer at one pixel: returns the gradient-sampled color
    /// and the effective opacity after mask attenuation.
    pub fn evaluate(
        &self,
        ctx: &PixelContext,
        registry: &AlgorithmRegistry,
        hist: Option<&HistogramContext>,
    ) -> Result<(ColorRgb, f32), ColoringError> {
        let entry = registry
            .get(&self.algorithm_id)
            .ok_or_else(|| ColoringError::UnknownAlgorithm(self.algorithm_id.clone()))?;
        let raw = (entry.value_fn)(ctx, &self.params, hist);
        let shaped = self.transform.apply(raw);
        let color = self.gradient.sample(shaped);

        let mut opacity = self.opacity;
        if let Some(mask_id) = &self.mask_algorithm_id {
            let mask_entry = registry
                .get(mask_id)
                .ok_or_else(|| ColoringError::UnknownAlgorithm(mask_id.clone()))?;
            let mask_params = ParamMap::new();
            let mut mask_value = (mask_entry.value_fn)(ctx, &mask_params, hist).clamp(0.0, 1.0);
            if self.mask_invert {
                mask_value = 1.0 - mask_value;
            }
            opacity *= mask_value;
        }

        Ok((color, opacity.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::preset_by_name;

    fn grayscale() -> crate::gradient::Gradient {
        preset_by_name("grayscale").unwrap()
    }

    #[test]
    fn transform_identity_is_passthrough() {
        let t = LayerTransform::default();
        assert!((t.apply(0.37) - 0.37).abs() < 1e-6);
    }

    #[test]
    fn transform_invert_flips() {
        let t = LayerTransform { invert: true, ..Default::default() };
        assert!((t.apply(0.2) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn evaluate_unknown_algorithm_errors() {
        let registry = AlgorithmRegistry::default();
        let layer = CoLoringLayer::new("l", "does-not-exist", grayscale());
        let config = crate::pixel::RenderConfig::new(1, 1, 10);
        let field = crate::pixel::PixelField::new(vec![1.0], vec![1], vec![0.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        assert!(layer.evaluate(&ctx, &registry, None).is_err());
    }

    #[test]
    fn evaluate_known_algorithm_samples_gradient() {
        let registry = AlgorithmRegistry::default();
        let layer = CoLoringLayer::new("l", "renormalized", grayscale());
        let config = crate::pixel::RenderConfig::new(1, 1, 10);
        let field = crate::pixel::PixelField::new(vec![10.0], vec![0], vec![0.0], vec![0.0]);
        let ctx = field.context_at(0, &config);
        let (color, opacity) = layer.evaluate(&ctx, &registry, None).unwrap();
        assert_eq!(opacity, 1.0);
        assert_eq!(color.to_u8(), [255, 255, 255]);
    }
}
