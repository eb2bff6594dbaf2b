//! `fractal-colorist`: a per-pixel coloring engine for fractal escape-time
//! renderers.
//!
//! Takes the raw per-pixel output of a renderer (iteration counts, final
//! orbit components, optional distance/potential/angle/orbit-history) and
//! turns it into an RGBA image through a registry of coloring algorithms, a
//! layered compositor with gradients and blend modes, and an optional
//! histogram equalization pre-pass. The renderer itself, GPU shaders, tile
//! scheduling, and UI are out of scope; see `demos/mandelbrot_png.rs` for an
//! end-to-end example of driving the engine from a toy renderer.

pub mod algorithms;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod gradient;
pub mod histogram;
pub mod layer;
pub mod pixel;

#[cfg(test)]
mod testutil;

pub use algorithms::{AlgorithmCategory, AlgorithmEntry, AlgorithmRegistry, ParamKind, ParamMap, ParamValue};
pub use color::{BlendMode, ColorRgb};
pub use config::ConfigValue;
pub use engine::{CoLoringEngine, EngineStats, InteriorMode, PostProcess};
pub use error::ColoringError;
pub use gradient::{ColorSpace, Gradient, GradientStop, Interpolation};
pub use histogram::{HistogramContext, HistogramOptions};
pub use layer::{CoLoringLayer, LayerTransform};
pub use pixel::{PixelContext, PixelField, RenderConfig};
