//! JSON configuration import/export (§6 schema), mirrored field-for-field as
//! `#[derive(Serialize, Deserialize)]` DTOs around `serde_json::Value`, the
//! same way the source project's `AppConfig` is a plain serde struct
//! serialized with `serde_json::to_string_pretty`.
//!
//! Unlike `AppConfig` the engine never touches the filesystem itself; loading
//! and saving `ConfigValue` to disk is left to the caller.

use crate::algorithms::{AlgorithmRegistry, ParamMap, ParamValue};
use crate::color::{BlendMode, ColorRgb};
use crate::engine::{CoLoringEngine, InteriorMode, PostProcess};
use crate::error::ColoringError;
use crate::gradient::{ColorSpace, Gradient, GradientStop, Interpolation};
use crate::layer::{CoLoringLayer, LayerTransform};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The in-memory carrier for a configuration: a plain JSON value, the same
/// type the source project already depends on `serde_json` for.
pub type ConfigValue = serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorDto {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<ColorRgb> for ColorDto {
    fn from(c: ColorRgb) -> Self {
        Self { r: c.r, g: c.g, b: c.b }
    }
}

impl From<ColorDto> for ColorRgb {
    fn from(d: ColorDto) -> Self {
        ColorRgb::new(d.r, d.g, d.b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopConfigDto {
    pub position: f32,
    pub color: ColorDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientConfigDto {
    pub stops: Vec<StopConfigDto>,
    #[serde(rename = "colorSpace")]
    pub color_space: String,
    pub interpolation: String,
}

impl From<&Gradient> for GradientConfigDto {
    fn from(g: &Gradient) -> Self {
        let color_space = match g.color_space {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsl => "hsl",
            ColorSpace::OkLab => "oklab",
        };
        let interpolation = match g.interpolation {
            Interpolation::Linear => "linear",
            Interpolation::Smoothstep => "smooth",
            Interpolation::Step => "step",
        };
        Self {
            stops: g
                .stops()
                .iter()
                .map(|s| StopConfigDto { position: s.position, color: s.color.into() })
                .collect(),
            color_space: color_space.to_string(),
            interpolation: interpolation.to_string(),
        }
    }
}

impl GradientConfigDto {
    fn into_gradient(self) -> Result<Gradient, ColoringError> {
        let color_space = match self.color_space.as_str() {
            "rgb" => ColorSpace::Rgb,
            "hsl" => ColorSpace::Hsl,
            "oklab" => ColorSpace::OkLab,
            other => return Err(ColoringError::UnknownColorSpace(other.to_string())),
        };
        let interpolation = match self.interpolation.as_str() {
            "linear" => Interpolation::Linear,
            "smooth" => Interpolation::Smoothstep,
            "step" => Interpolation::Step,
            other => return Err(ColoringError::UnknownInterpolation(other.to_string())),
        };
        let stops = self
            .stops
            .into_iter()
            .map(|s| GradientStop { position: s.position, color: s.color.into() })
            .collect();
        Ok(Gradient::new(stops, color_space, interpolation))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfigDto {
    pub intensity: f64,
    pub offset: f64,
    pub scale: f64,
    pub invert: bool,
    pub gamma: f64,
}

impl From<LayerTransform> for TransformConfigDto {
    fn from(t: LayerTransform) -> Self {
        Self { intensity: t.intensity, offset: t.offset, scale: t.scale, invert: t.invert, gamma: t.gamma }
    }
}

impl From<TransformConfigDto> for LayerTransform {
    fn from(d: TransformConfigDto) -> Self {
        Self { scale: d.scale, offset: d.offset, intensity: d.intensity, gamma: d.gamma, invert: d.invert }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfigDto {
    pub name: String,
    pub algorithm: String,
    pub enabled: bool,
    pub opacity: f32,
    #[serde(rename = "blendMode")]
    pub blend_mode: String,
    pub params: HashMap<String, serde_json::Value>,
    pub transform: TransformConfigDto,
    pub gradient: GradientConfigDto,
}

fn param_value_to_json(v: &ParamValue) -> serde_json::Value {
    match v {
        ParamValue::Number(n) => serde_json::json!(n),
        ParamValue::Bool(b) => serde_json::json!(b),
        ParamValue::Select(s) => serde_json::json!(s),
        ParamValue::Array(a) => serde_json::json!(a),
    }
}

fn json_to_param_value(v: &serde_json::Value) -> Option<ParamValue> {
    match v {
        serde_json::Value::Number(n) => n.as_f64().map(ParamValue::Number),
        serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
        serde_json::Value::String(s) => Some(ParamValue::Select(s.clone())),
        serde_json::Value::Array(items) => {
            let nums: Option<Vec<f64>> = items.iter().map(|x| x.as_f64()).collect();
            nums.map(ParamValue::Array)
        }
        _ => None,
    }
}

impl LayerConfigDto {
    fn from_layer(layer: &CoLoringLayer) -> Self {
        let params = layer
            .params
            .iter()
            .map(|(k, v)| (k.clone(), param_value_to_json(v)))
            .collect();
        Self {
            name: layer.name.clone(),
            algorithm: layer.algorithm_id.clone(),
            enabled: layer.enabled,
            opacity: layer.opacity,
            blend_mode: layer.blend_mode.id().to_string(),
            params,
            transform: layer.transform.into(),
            gradient: (&layer.gradient).into(),
        }
    }

    fn into_layer(self) -> Result<CoLoringLayer, ColoringError> {
        let blend_mode = BlendMode::from_id(&self.blend_mode)
            .ok_or_else(|| ColoringError::UnknownBlendMode(self.blend_mode.clone()))?;
        let gradient = self.gradient.into_gradient()?;
        let mut params = ParamMap::new();
        for (k, v) in self.params.iter() {
            if let Some(pv) = json_to_param_value(v) {
                params.set(k.clone(), pv);
            }
        }
        let mut layer = CoLoringLayer::new(self.name, self.algorithm, gradient);
        layer.enabled = self.enabled;
        layer.opacity = self.opacity;
        layer.blend_mode = blend_mode;
        layer.params = params;
        layer.transform = self.transform.into();
        Ok(layer)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostProcessConfigDto {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub gamma: f32,
}

impl From<PostProcess> for PostProcessConfigDto {
    fn from(p: PostProcess) -> Self {
        Self { brightness: p.brightness, contrast: p.contrast, saturation: p.saturation, gamma: p.gamma }
    }
}

impl From<PostProcessConfigDto> for PostProcess {
    fn from(d: PostProcessConfigDto) -> Self {
        Self { brightness: d.brightness, contrast: d.contrast, saturation: d.saturation, gamma: d.gamma }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfigDto {
    pub layers: Vec<LayerConfigDto>,
    #[serde(rename = "interiorMode")]
    pub interior_mode: String,
    #[serde(rename = "interiorColor")]
    pub interior_color: ColorDto,
    #[serde(rename = "postProcess")]
    pub post_process: PostProcessConfigDto,
}

impl EngineConfigDto {
    pub fn from_engine(engine: &CoLoringEngine) -> Self {
        let interior_mode = match engine.interior_mode {
            InteriorMode::Black => "black",
            InteriorMode::Gradient => "gradient",
            InteriorMode::Orbit => "orbit",
            InteriorMode::Distance => "distance",
        };
        Self {
            layers: engine.layers.iter().map(LayerConfigDto::from_layer).collect(),
            interior_mode: interior_mode.to_string(),
            interior_color: engine.interior_color.into(),
            post_process: engine.post_process.into(),
        }
    }

    pub fn to_value(&self) -> ConfigValue {
        serde_json::to_value(self).expect("EngineConfigDto is always representable as JSON")
    }

    pub fn from_value(value: ConfigValue) -> Result<Self, ColoringError> {
        serde_json::from_value(value)
            .map_err(|e| ColoringError::InvalidConfiguration(vec![e.to_string()]))
    }

    /// Validate and materialize layers/interior mode, collecting every
    /// problem rather than stopping at the first.
    pub fn into_engine_parts(
        self,
        registry: &AlgorithmRegistry,
    ) -> Result<(Vec<CoLoringLayer>, InteriorMode, ColorRgb, PostProcess), ColoringError> {
        let mut errors = Vec::new();
        let mut layers = Vec::new();

        for layer_dto in self.layers {
            let algorithm_id = layer_dto.algorithm.clone();
            match layer_dto.into_layer() {
                Ok(layer) => {
                    if !registry.has(&layer.algorithm_id) {
                        errors.push(format!("unknown algorithm id: {}", layer.algorithm_id));
                        continue;
                    }
                    let validation = registry.validate_params(&layer.algorithm_id, &layer.params);
                    if !validation.ok {
                        errors.extend(validation.errors);
                        continue;
                    }
                    layers.push(layer);
                }
                Err(e) => errors.push(format!("{algorithm_id}: {e}")),
            }
        }

        let interior_mode = match self.interior_mode.as_str() {
            "black" => InteriorMode::Black,
            "gradient" => InteriorMode::Gradient,
            "orbit" => InteriorMode::Orbit,
            "distance" => InteriorMode::Distance,
            other => {
                errors.push(format!("unknown interior mode: {other}"));
                InteriorMode::Black
            }
        };

        if !errors.is_empty() {
            return Err(ColoringError::InvalidConfiguration(errors));
        }

        Ok((layers, interior_mode, self.interior_color.into(), self.post_process.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::preset_by_name;

    #[test]
    fn layer_roundtrips_through_dto() {
        let mut layer = CoLoringLayer::new("glow", "renormalized", preset_by_name("grayscale").unwrap());
        layer.params.set("foo", ParamValue::Number(1.5));
        let dto = LayerConfigDto::from_layer(&layer);
        let back = dto.into_layer().unwrap();
        assert_eq!(back.name, "glow");
        assert_eq!(back.algorithm_id, "renormalized");
        assert_eq!(back.params.number("foo", 0.0), 1.5);
    }

    #[test]
    fn unknown_blend_mode_is_rejected() {
        let mut layer = CoLoringLayer::new("l", "renormalized", preset_by_name("grayscale").unwrap());
        layer.blend_mode = BlendMode::Normal;
        let mut dto = LayerConfigDto::from_layer(&layer);
        dto.blend_mode = "not-a-blend-mode".to_string();
        assert!(dto.into_layer().is_err());
    }

    #[test]
    fn engine_config_roundtrips_field_for_field() {
        let engine = CoLoringEngine::new(AlgorithmRegistry::default());
        let exported = EngineConfigDto::from_engine(&engine).to_value();
        let reimported = EngineConfigDto::from_value(exported.clone()).unwrap().to_value();
        assert_eq!(exported, reimported);
    }
}
