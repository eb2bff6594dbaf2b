//! Histogram pre-pass: bin escaped iteration counts, integrate to a CDF, and
//! optionally repeat on `ln(iter+1)` for the log-histogram variant.
//!
//! Consumed read-only by the HISTOGRAM algorithm family (C4) and cached by
//! the engine for the lifetime of one `apply` call (§4.5).

#[derive(Debug, Clone, Copy)]
pub struct HistogramOptions {
    pub bins: u32,
    pub compute_log: bool,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            bins: 256,
            compute_log: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistogramContext {
    pub bins: Vec<u32>,
    pub min_iter: f32,
    pub max_iter: f32,
    pub range: f32,
    pub escaped_count: u64,
    pub cdf: Vec<f32>,
    pub log_histogram: Option<Box<HistogramContext>>,
}

impl HistogramContext {
    fn zeroed(bins: u32) -> Self {
        Self {
            bins: vec![0; bins.max(1) as usize],
            min_iter: 0.0,
            max_iter: 0.0,
            range: 1.0,
            escaped_count: 0,
            cdf: vec![0.0; bins.max(1) as usize],
            log_histogram: None,
        }
    }

    /// `bin_index(iter)` clamped into `[0, bins-1]`.
    pub fn bin_index(&self, iter: f32) -> usize {
        let n = self.bins.len();
        if n == 0 {
            return 0;
        }
        let normalized = if self.range.abs() < 1e-12 {
            0.0
        } else {
            (iter - self.min_iter) / self.range
        };
        let idx = (normalized * n as f32).floor();
        (idx.max(0.0) as usize).min(n - 1)
    }

    pub fn cdf_at(&self, iter: f32) -> f32 {
        if self.cdf.is_empty() {
            return 0.0;
        }
        self.cdf[self.bin_index(iter)]
    }

    pub fn log_cdf_at(&self, iter: f32) -> f32 {
        match &self.log_histogram {
            Some(log_ctx) => log_ctx.cdf_at((iter + 1.0).ln()),
            None => self.cdf_at(iter),
        }
    }
}

fn build_single(iterations: impl Iterator<Item = f32> + Clone, escaped: &[u8], bins: u32) -> HistogramContext {
    let bins = bins.max(1);

    let mut min_iter = f32::INFINITY;
    let mut max_iter = f32::NEG_INFINITY;
    let mut escaped_count: u64 = 0;
    for (v, &esc) in iterations.clone().zip(escaped.iter()) {
        if esc != 0 {
            min_iter = min_iter.min(v);
            max_iter = max_iter.max(v);
            escaped_count += 1;
        }
    }

    if escaped_count == 0 || (max_iter - min_iter).abs() < 1e-12 {
        let mut ctx = HistogramContext::zeroed(bins);
        ctx.escaped_count = escaped_count;
        ctx.min_iter = if min_iter.is_finite() { min_iter } else { 0.0 };
        ctx.max_iter = if max_iter.is_finite() { max_iter } else { 0.0 };
        return ctx;
    }

    let range = max_iter - min_iter;
    let mut histogram = vec![0u32; bins as usize];
    for (v, &esc) in iterations.zip(escaped.iter()) {
        if esc == 0 {
            continue;
        }
        let normalized = (v - min_iter) / range;
        let idx = ((normalized * bins as f32).floor().max(0.0) as usize).min(bins as usize - 1);
        histogram[idx] += 1;
    }

    let mut cdf = vec![0.0f32; bins as usize];
    let mut running: u64 = 0;
    for i in 0..bins as usize {
        running += histogram[i] as u64;
        cdf[i] = running as f32 / escaped_count as f32;
    }
    if let Some(last) = cdf.last_mut() {
        *last = 1.0;
    }

    HistogramContext {
        bins: histogram,
        min_iter,
        max_iter,
        range,
        escaped_count,
        cdf,
        log_histogram: None,
    }
}

/// Run the three-pass histogram pre-computation over a pixel field's
/// iteration buffer, producing the base histogram and, if requested, the
/// `ln(iter+1)` log variant.
pub fn precompute(iterations: &[f32], escaped: &[u8], options: HistogramOptions) -> HistogramContext {
    let mut ctx = build_single(iterations.iter().copied(), escaped, options.bins);
    log::trace!(
        "histogram pre-pass: {} bins, {} escaped of {} pixels, range [{}, {}]",
        options.bins,
        ctx.escaped_count,
        iterations.len(),
        ctx.min_iter,
        ctx.max_iter,
    );
    if options.compute_log {
        let log_iter: Vec<f32> = iterations.iter().map(|v| (v + 1.0).ln()).collect();
        let log_ctx = build_single(log_iter.into_iter(), escaped, options.bins);
        log::trace!(
            "log-histogram pre-pass: range [{}, {}]",
            log_ctx.min_iter,
            log_ctx.max_iter
        );
        ctx.log_histogram = Some(Box::new(log_ctx));
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_escape_gives_zeroed_context() {
        let iterations = vec![10.0; 16];
        let escaped = vec![0u8; 16];
        let ctx = precompute(&iterations, &escaped, HistogramOptions::default());
        assert_eq!(ctx.escaped_count, 0);
        assert_eq!(ctx.range, 1.0);
        assert_eq!(ctx.cdf_at(5.0), 0.0);
    }

    #[test]
    fn cdf_is_monotonic_and_ends_at_one() {
        let iterations: Vec<f32> = (0..256).map(|i| i as f32).collect();
        let escaped = vec![1u8; 256];
        let ctx = precompute(&iterations, &escaped, HistogramOptions { bins: 64, compute_log: false });
        assert_eq!(ctx.escaped_count, 256);
        let mut prev = 0.0;
        for &c in &ctx.cdf {
            assert!(c >= prev - 1e-6);
            prev = c;
        }
        assert!((ctx.cdf.last().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn min_equals_max_gives_zeroed_context() {
        let iterations = vec![42.0; 10];
        let escaped = vec![1u8; 10];
        let ctx = precompute(&iterations, &escaped, HistogramOptions::default());
        assert_eq!(ctx.range, 1.0);
        assert_eq!(ctx.cdf_at(42.0), 0.0);
    }

    #[test]
    fn log_histogram_tracks_ln_domain() {
        let iterations: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let escaped = vec![1u8; 100];
        let ctx = precompute(&iterations, &escaped, HistogramOptions { bins: 32, compute_log: true });
        assert!(ctx.log_histogram.is_some());
        assert!((ctx.log_cdf_at(99.0) - 1.0).abs() < 1e-5);
    }
}
