//! Algorithm registry (C3) and the ~70-algorithm value-function library (C4).
//!
//! Grounded on the source project's `FractalRegistry`: a string/enum key maps
//! to a boxed factory plus metadata (`FractalMetadata`: id, display name,
//! description, category). Generalized here to a string-keyed map (the id
//! space is open, ~70 entries, and searchable) where the "factory" is a
//! monomorphic `fn` pointer resolved once per layer per `apply`, not a
//! dynamic-dispatch lookup inside the hot per-pixel loop.

mod angle;
mod curvature;
mod distance;
mod histogram_algos;
mod orbit_trap;
mod smooth;
mod stripe;
mod tia;

use crate::histogram::HistogramContext;
use crate::pixel::PixelContext;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmCategory {
    Smooth,
    OrbitTrap,
    Distance,
    Histogram,
    TriangleInequality,
    Stripe,
    Curvature,
    Angle,
    Hybrid,
}

impl AlgorithmCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmCategory::Smooth => "SMOOTH",
            AlgorithmCategory::OrbitTrap => "ORBIT_TRAP",
            AlgorithmCategory::Distance => "DISTANCE",
            AlgorithmCategory::Histogram => "HISTOGRAM",
            AlgorithmCategory::TriangleInequality => "TRIANGLE_INEQUALITY",
            AlgorithmCategory::Stripe => "STRIPE",
            AlgorithmCategory::Curvature => "CURVATURE",
            AlgorithmCategory::Angle => "ANGLE",
            AlgorithmCategory::Hybrid => "HYBRID",
        }
    }
}

/// A parameter value as carried in a layer's parameter bag.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Bool(bool),
    Select(String),
    Array(Vec<f64>),
}

/// A parameter's declared schema entry.
#[derive(Debug, Clone)]
pub enum ParamKind {
    Number { min: f64, max: f64, step: f64, default: f64 },
    Bool { default: bool },
    Select { options: Vec<String>, default: String },
    Array { default: Vec<f64> },
}

/// Ordered parameter schema: `(name, kind)` pairs, order preserved for
/// deterministic export/documentation.
pub type ParamSchema = Vec<(String, ParamKind)>;

/// A layer's concrete parameter bag.
#[derive(Debug, Clone, Default)]
pub struct ParamMap(HashMap<String, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn number(&self, name: &str, default: f64) -> f64 {
        match self.0.get(name) {
            Some(ParamValue::Number(n)) => *n,
            _ => default,
        }
    }

    pub fn boolean(&self, name: &str, default: bool) -> bool {
        match self.0.get(name) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }

    pub fn select<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.0.get(name) {
            Some(ParamValue::Select(s)) => s.as_str(),
            _ => default,
        }
    }

    pub fn array(&self, name: &str) -> Option<&[f64]> {
        match self.0.get(name) {
            Some(ParamValue::Array(a)) => Some(a.as_slice()),
            _ => None,
        }
    }

    pub fn from_schema_defaults(schema: &ParamSchema) -> Self {
        let mut map = ParamMap::new();
        for (name, kind) in schema {
            let value = match kind {
                ParamKind::Number { default, .. } => ParamValue::Number(*default),
                ParamKind::Bool { default } => ParamValue::Bool(*default),
                ParamKind::Select { default, .. } => ParamValue::Select(default.clone()),
                ParamKind::Array { default } => ParamValue::Array(default.clone()),
            };
            map.set(name.clone(), value);
        }
        map
    }
}

/// The uniform per-pixel value function signature every algorithm implements.
pub type ValueFn = fn(&PixelContext, &ParamMap, Option<&HistogramContext>) -> f32;

/// Immutable once registered.
#[derive(Clone)]
pub struct AlgorithmEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: AlgorithmCategory,
    pub description: &'static str,
    pub value_fn: ValueFn,
    pub param_schema: ParamSchema,
    pub compatibility: Vec<&'static str>,
    pub requires_orbit_history: bool,
    pub requires_precompute: bool,
    pub tags: Vec<&'static str>,
}

impl AlgorithmEntry {
    pub fn default_params(&self) -> ParamMap {
        ParamMap::from_schema_defaults(&self.param_schema)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<String>,
}

/// Registry of algorithm entries, keyed by stable string id. Insertion order
/// is preserved for deterministic iteration.
pub struct AlgorithmRegistry {
    entries: HashMap<String, AlgorithmEntry>,
    order: Vec<String>,
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
            order: Vec::new(),
        };
        register_builtin_algorithms(&mut registry);
        registry
    }
}

impl AlgorithmRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, entry: AlgorithmEntry) {
        if !self.entries.contains_key(entry.id) {
            self.order.push(entry.id.to_string());
        }
        self.entries.insert(entry.id.to_string(), entry);
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.order.retain(|k| k != id);
        self.entries.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&AlgorithmEntry> {
        self.entries.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn all(&self) -> Vec<&AlgorithmEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id)).collect()
    }

    pub fn by_category(&self, category: AlgorithmCategory) -> Vec<&AlgorithmEntry> {
        self.all().into_iter().filter(|e| e.category == category).collect()
    }

    pub fn compatible_with(&self, tag: &str) -> Vec<&AlgorithmEntry> {
        self.all()
            .into_iter()
            .filter(|e| e.compatibility.contains(&"all") || e.compatibility.contains(&tag))
            .collect()
    }

    pub fn requires_history(&self) -> Vec<&AlgorithmEntry> {
        self.all().into_iter().filter(|e| e.requires_orbit_history).collect()
    }

    pub fn requires_precompute(&self) -> Vec<&AlgorithmEntry> {
        self.all().into_iter().filter(|e| e.requires_precompute).collect()
    }

    pub fn search(&self, query: &str) -> Vec<&AlgorithmEntry> {
        let q = query.to_lowercase();
        self.all()
            .into_iter()
            .filter(|e| {
                e.id.to_lowercase().contains(&q)
                    || e.display_name.to_lowercase().contains(&q)
                    || e.description.to_lowercase().contains(&q)
                    || e.tags.iter().any(|t| t.to_lowercase().contains(&q))
            })
            .collect()
    }

    pub fn default_params(&self, id: &str) -> Option<ParamMap> {
        self.get(id).map(|e| e.default_params())
    }

    pub fn validate_params(&self, id: &str, params: &ParamMap) -> ValidationResult {
        let Some(entry) = self.get(id) else {
            return ValidationResult {
                ok: false,
                errors: vec![format!("unknown algorithm id: {id}")],
            };
        };

        let mut errors = Vec::new();
        for (name, kind) in &entry.param_schema {
            let Some(value) = params.get(name) else {
                continue; // missing known parameter falls back to its default
            };
            match (kind, value) {
                (ParamKind::Number { min, max, .. }, ParamValue::Number(n)) => {
                    if n < min {
                        errors.push(format!("{name}: must be \u{2265} {min}"));
                    } else if n > max {
                        errors.push(format!("{name}: must be \u{2264} {max}"));
                    }
                }
                (ParamKind::Number { .. }, _) => {
                    errors.push(format!("{name}: must be a number"));
                }
                (ParamKind::Bool { .. }, ParamValue::Bool(_)) => {}
                (ParamKind::Bool { .. }, _) => {
                    errors.push(format!("{name}: must be a boolean"));
                }
                (ParamKind::Select { options, .. }, ParamValue::Select(s)) => {
                    if !options.contains(s) {
                        errors.push(format!("{name}: must be one of {options:?}"));
                    }
                }
                (ParamKind::Select { options, .. }, _) => {
                    errors.push(format!("{name}: must be one of {options:?}"));
                }
                (ParamKind::Array { .. }, ParamValue::Array(_)) => {}
                (ParamKind::Array { .. }, _) => {
                    errors.push(format!("{name}: must be an array"));
                }
            }
        }

        ValidationResult {
            ok: errors.is_empty(),
            errors,
        }
    }
}

fn register_builtin_algorithms(registry: &mut AlgorithmRegistry) {
    smooth::register(registry);
    orbit_trap::register(registry);
    distance::register(registry);
    histogram_algos::register(registry);
    tia::register(registry);
    stripe::register(registry);
    curvature::register(registry);
    angle::register(registry);
}

/// Shared helper: iterate the final orbit point if no history was recorded,
/// or every recorded point if it was. Per the canonical behaviour fixed by
/// the spec's open question: "over the whole orbit when history is present,
/// final point otherwise".
pub(crate) enum OrbitIter<'a> {
    History(std::slice::Iter<'a, (f32, f32)>),
    Single(Option<(f32, f32)>),
}

impl<'a> Iterator for OrbitIter<'a> {
    type Item = (f32, f32);

    fn next(&mut self) -> Option<(f32, f32)> {
        match self {
            OrbitIter::History(it) => it.next().copied(),
            OrbitIter::Single(opt) => opt.take(),
        }
    }
}

pub(crate) fn orbit_points<'a>(ctx: &PixelContext<'a>) -> OrbitIter<'a> {
    match ctx.orbit_history {
        Some(h) => OrbitIter::History(h.iter()),
        None => OrbitIter::Single(Some((ctx.orbit_x, ctx.orbit_y))),
    }
}

/// Reduce a raw coloring value into `[0,1)` the way the smooth-iteration
/// family does: scale, offset, modulo 256/256, with a negative-wrap fix.
pub(crate) fn cycle_reduce(value: f32, scale: f64, offset: f64) -> f32 {
    let scaled = value as f64 * scale + offset;
    let wrapped = scaled.rem_euclid(256.0) / 256.0;
    wrapped as f32
}

pub(crate) fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

pub(crate) fn safe_ln(x: f32) -> f32 {
    if x.is_finite() && x > 0.0 {
        x.ln()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_default_has_roughly_seventy_algorithms() {
        let registry = AlgorithmRegistry::default();
        assert!(registry.all().len() >= 70, "got {}", registry.all().len());
    }

    #[test]
    fn every_default_params_validates() {
        let registry = AlgorithmRegistry::default();
        for entry in registry.all() {
            let params = entry.default_params();
            let result = registry.validate_params(entry.id, &params);
            assert!(result.ok, "{}: {:?}", entry.id, result.errors);
        }
    }

    #[test]
    fn category_minimums_are_met() {
        let registry = AlgorithmRegistry::default();
        assert!(registry.by_category(AlgorithmCategory::Smooth).len() >= 14);
        assert!(registry.by_category(AlgorithmCategory::OrbitTrap).len() >= 25);
        assert!(registry.by_category(AlgorithmCategory::Distance).len() >= 12);
        assert!(registry.by_category(AlgorithmCategory::Histogram).len() >= 8);
        assert!(registry.by_category(AlgorithmCategory::TriangleInequality).len() >= 7);
        assert!(registry.by_category(AlgorithmCategory::Stripe).len() >= 9);
        assert!(registry.by_category(AlgorithmCategory::Curvature).len() >= 7);
        assert!(registry.by_category(AlgorithmCategory::Angle).len() >= 12);
    }

    #[test]
    fn orbit_trap_and_histogram_requirements_are_flagged() {
        let registry = AlgorithmRegistry::default();
        for e in registry.by_category(AlgorithmCategory::OrbitTrap) {
            assert!(e.requires_orbit_history, "{}", e.id);
        }
        for e in registry.by_category(AlgorithmCategory::Histogram) {
            assert!(e.requires_precompute, "{}", e.id);
        }
    }

    #[test]
    fn validate_params_reports_out_of_range_number() {
        let registry = AlgorithmRegistry::default();
        let mut params = registry.default_params("smooth-iteration").unwrap();
        params.set("power", ParamValue::Number(-5.0));
        let result = registry.validate_params("smooth-iteration", &params);
        assert!(!result.ok);
        assert!(result.errors.iter().any(|e| e.contains("power")));
    }

    #[test]
    fn validate_params_ignores_unknown_parameter() {
        let registry = AlgorithmRegistry::default();
        let mut params = registry.default_params("smooth-iteration").unwrap();
        params.set("totally_unknown_param", ParamValue::Number(1.0));
        let result = registry.validate_params("smooth-iteration", &params);
        assert!(result.ok);
    }

    #[test]
    fn search_matches_id_and_description() {
        let registry = AlgorithmRegistry::default();
        let results = registry.search("orbit");
        assert!(!results.is_empty());
    }
}
