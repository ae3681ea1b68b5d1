//! Statistical reduction of benchmark epochs.
//!
//! - Median and median absolute percentage error over sorted per-unit times
//! - Least-squares complexity fitting over results tagged with a problem size

pub mod complexity;
mod median;

pub use complexity::{big_o, BigO};
pub use median::{median, median_absolute_percentage_error, sort_values};
