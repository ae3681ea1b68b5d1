//! Asymptotic complexity fitting.
//!
//! Given results tagged with a problem size `n`, fit `t = c * f(n)` for a
//! set of candidate functions and rank them by normalized root mean square
//! error. The best fit is a hint, not a proof: it only compares the
//! candidates listed in [`CANDIDATES`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::result::BenchResult;

/// A candidate complexity class.
type Mapping = fn(f64) -> f64;

/// Candidate complexity functions, in display order.
pub const CANDIDATES: [(&str, Mapping); 6] = [
    ("O(1)", |_| 1.0),
    ("O(n)", |n| n),
    ("O(log n)", |n| n.ln()),
    ("O(n log n)", |n| n * n.ln()),
    ("O(n^2)", |n| n * n),
    ("O(n^3)", |n| n * n * n),
];

/// Least-squares fit of one complexity class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigO {
    name: String,
    constant: f64,
    normalized_rms: f64,
}

impl BigO {
    /// Fit `t = c * f(n)` to `(n, t)` points.
    ///
    /// Returns `None` when there are no points or `f` vanishes on all of them.
    pub fn fit(name: &str, points: &[(f64, f64)], f: impl Fn(f64) -> f64) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut sum_ft = 0.0;
        let mut sum_ff = 0.0;
        for &(n, t) in points {
            let fx = f(n);
            sum_ft += fx * t;
            sum_ff += fx * fx;
        }
        if sum_ff == 0.0 || !sum_ff.is_finite() {
            return None;
        }
        let constant = sum_ft / sum_ff;

        let mut err_sq = 0.0;
        let mut sum_t = 0.0;
        for &(n, t) in points {
            let diff = constant * f(n) - t;
            err_sq += diff * diff;
            sum_t += t;
        }
        let count = points.len() as f64;
        let mean = sum_t / count;
        let rms = (err_sq / count).sqrt();
        let normalized_rms = if mean == 0.0 { f64::INFINITY } else { rms / mean };

        Some(Self {
            name: name.to_string(),
            constant,
            normalized_rms,
        })
    }

    /// Complexity class, e.g. `"O(n log n)"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fitted constant `c` in seconds per `f(n)`.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Root mean square error of the fit divided by the mean observed time.
    pub fn normalized_rms(&self) -> f64 {
        self.normalized_rms
    }
}

impl fmt::Display for BigO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:>14.6e} s  err {:>6.1}%",
            self.name,
            self.constant,
            self.normalized_rms * 100.0
        )
    }
}

/// Fit all candidates to the results that carry a complexity `n`.
///
/// Empty results are skipped. Returns fits sorted by error, best first, or
/// an empty vector when fewer than two distinct sizes are available.
pub fn big_o(results: &[BenchResult]) -> Vec<BigO> {
    let points: Vec<(f64, f64)> = results
        .iter()
        .filter(|r| !r.is_empty())
        .filter_map(|r| r.complexity_n().map(|n| (n as f64, r.median())))
        .collect();

    let mut sizes: Vec<u64> = points.iter().map(|&(n, _)| n as u64).collect();
    sizes.sort_unstable();
    sizes.dedup();
    if sizes.len() < 2 {
        return Vec::new();
    }

    let mut fits: Vec<BigO> = CANDIDATES
        .iter()
        .filter_map(|(name, f)| BigO::fit(name, &points, f))
        .collect();
    fits.sort_by(|a, b| a.normalized_rms.total_cmp(&b.normalized_rms));
    fits
}
