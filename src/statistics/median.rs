//! Median and median absolute percentage error.
//!
//! Both operate on slices already sorted ascending; callers sort once with
//! `f64::total_cmp` and reuse the order for median, minimum and maximum.

use crate::error::{Error, Result};

/// Classic median of sorted data.
///
/// Middle element for odd lengths, mean of the two central elements for
/// even lengths.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute median of empty slice");

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Median absolute percentage error (MdAPE) of sorted data around `median`.
///
/// Each sample contributes `|sample - median| / sample`. The error is
/// normalized by the sample, not by the median; this matches the numbers
/// reported by earlier releases and must not be "corrected" without
/// invalidating stored baselines.
///
/// # Errors
///
/// Returns [`Error::ZeroElapsed`] if any sample is zero.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median_absolute_percentage_error(sorted: &[f64], median_value: f64) -> Result<f64> {
    assert!(!sorted.is_empty(), "Cannot compute MdAPE of empty slice");

    let mut errors = Vec::with_capacity(sorted.len());
    for &sample in sorted {
        if sample == 0.0 {
            return Err(Error::ZeroElapsed);
        }
        errors.push((sample - median_value).abs() / sample);
    }
    sort_values(&mut errors);

    Ok(median(&errors))
}

/// Sort floating point values ascending.
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}
