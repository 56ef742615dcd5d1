//! Distance metrics
//!
//! A metric is a pure, read-only function of two equal-length frames, which
//! is what makes the per-reference distance computation embarrassingly
//! parallel: no two row slots share any mutable state.
//!
//! The default is Euclidean (L2) distance. The scalar kernels are written as
//! simple fold loops that LLVM auto-vectorizes with `-C target-cpu=native`.

/// A pointwise distance function. Lower is always closer.
///
/// Implementations must be pure: the engine calls `distance` concurrently
/// from many workers against shared read-only frame data.
pub trait Metric: Send + Sync {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Euclidean (L2) distance: `sqrt(Σ (a[x] − b[x])²)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        l2_distance(a, b)
    }
}

/// Squared L2 distance between two frames (no square root).
#[inline(always)]
pub fn l2_distance_squared(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Frame length mismatch");
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// L2 (Euclidean) distance between two frames: `||a - b||`.
#[inline(always)]
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    l2_distance_squared(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_distance() {
        let a = [0.0, 0.0, 0.0];
        let b = [3.0, 4.0, 0.0];

        // 3-4-5 triangle
        assert!((l2_distance(&a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_distance_same_point() {
        let a = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(l2_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_l2_distance_squared_symmetry() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert!((l2_distance_squared(&a, &b) - l2_distance_squared(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_l2_distance_large_dimension() {
        let a: Vec<f64> = (0..1536).map(|i| i as f64 / 1536.0).collect();
        let b: Vec<f64> = (0..1536).map(|i| (1536 - i) as f64 / 1536.0).collect();

        let result = l2_distance_squared(&a, &b);

        // Verify against a naive accumulation
        let mut expected = 0.0;
        for i in 0..1536 {
            let d = a[i] - b[i];
            expected += d * d;
        }
        assert!((result - expected).abs() < 1e-9);
    }

    #[test]
    fn test_metric_trait_dispatch() {
        let metric = Euclidean;
        assert!((metric.distance(&[0.0, 0.0], &[1.0, 1.0]) - 2f64.sqrt()).abs() < 1e-12);
    }
}
