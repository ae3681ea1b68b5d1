//! Monotonic clock and empirical resolution discovery.
//!
//! Timing uses `std::time::Instant`, which is monotonic on every supported
//! platform. Each read is wrapped in compiler fences so the sample cannot be
//! reordered into or out of the timed loop.

use std::sync::atomic::{compiler_fence, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Number of trials used for the process-wide resolution estimate.
pub const RESOLUTION_EVALUATIONS: usize = 20;

static CLOCK_RESOLUTION: OnceLock<Duration> = OnceLock::new();

/// Read the clock.
#[inline(always)]
pub fn now() -> Instant {
    compiler_fence(Ordering::SeqCst);
    let t = Instant::now();
    compiler_fence(Ordering::SeqCst);
    t
}

/// Measure the clock's tick granularity.
///
/// Each trial spins until the clock advances and records the gap. The
/// minimum over all trials is returned: scheduling noise can only make a
/// gap longer, never shorter than one tick.
pub fn calc_clock_resolution(evaluations: usize) -> Duration {
    let mut best = Duration::MAX;
    for _ in 0..evaluations.max(1) {
        let begin = now();
        let mut end = now();
        while end == begin {
            end = now();
        }
        best = best.min(end.duration_since(begin));
    }
    best
}

/// Whole nanoseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Clock resolution for this process, measured once and then cached.
pub fn clock_resolution() -> Duration {
    *CLOCK_RESOLUTION.get_or_init(|| {
        let resolution = calc_clock_resolution(RESOLUTION_EVALUATIONS);
        tracing::debug!(resolution_ns = saturating_nanos(resolution), "measured clock resolution");
        resolution
    })
}
