//! Numeric backends for batch evaluation.

use rayon::prelude::*;

pub use roiforge_config::NumericBackend;

/// Evaluate `f(0..iterations)` and collect the results in index order.
///
/// Both backends return the same vector for a pure `f`.
pub fn evaluate<T, F>(backend: NumericBackend, iterations: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    match backend {
        NumericBackend::Sequential => (0..iterations).map(f).collect(),
        NumericBackend::Parallel => (0..iterations).into_par_iter().map(f).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_preserve_order() {
        let square = |i: usize| (i * i) as u64;
        let seq = evaluate(NumericBackend::Sequential, 1_000, square);
        let par = evaluate(NumericBackend::Parallel, 1_000, square);
        assert_eq!(seq, par);
        assert_eq!(seq[31], 961);
    }

    #[test]
    fn zero_iterations_is_empty() {
        let out: Vec<u8> = evaluate(NumericBackend::Parallel, 0, |_| 1);
        assert!(out.is_empty());
    }
}
