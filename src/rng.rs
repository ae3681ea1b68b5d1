//! Small, fast counting random number generator.
//!
//! [`Rng`] is a 4-word counting generator (three mixing words plus a 64-bit
//! counter). It is used internally to jitter calibration, and is cheap enough
//! to generate synthetic inputs inside measured closures.
//!
//! The generator is deliberately not `Clone`: two handles silently sharing a
//! stream produce correlated inputs. Use [`Rng::duplicate`] or [`Rng::assign`]
//! when a copy of the state is really wanted.

use rand::RngCore;

/// Seed used by [`Rng::new`] and [`Rng::default`].
pub const DEFAULT_SEED: u64 = 0xd3b4_5fd7_80a1_b6a3;

/// Number of outputs discarded after seeding.
const SEED_ROUNDS: usize = 12;

/// Deterministic counting generator producing `u64` values.
///
/// # Example
///
/// ```ignore
/// use epochbench::Rng;
///
/// let mut rng = Rng::with_seed(123);
/// let x = rng.next_u64();
/// let d = rng.uniform01();
/// assert!((0.0..1.0).contains(&d));
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Rng {
    a: u64,
    b: u64,
    c: u64,
    counter: u64,
}

impl Rng {
    /// Create a generator seeded with [`DEFAULT_SEED`].
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a generator from a 64-bit seed.
    ///
    /// The seed is loaded into all three mixing words and the first outputs
    /// are discarded, so nearby seeds do not start with correlated low bits.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Self {
            a: seed,
            b: seed,
            c: seed,
            counter: 1,
        };
        for _ in 0..SEED_ROUNDS {
            rng.next();
        }
        rng
    }

    /// Restore a generator from a snapshot taken with [`Rng::state`].
    ///
    /// No mixing is applied; the restored generator continues exactly where
    /// the snapshot was taken.
    pub fn from_state(state: [u64; 4]) -> Self {
        let [a, b, c, counter] = state;
        Self { a, b, c, counter }
    }

    /// Snapshot of the internal state as `[a, b, c, counter]`.
    pub fn state(&self) -> [u64; 4] {
        [self.a, self.b, self.c, self.counter]
    }

    /// Explicit copy of this generator's current state.
    ///
    /// The copy produces the same sequence as `self` from this point on.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self::from_state(self.state())
    }

    /// Overwrite this generator's state with `other`'s.
    pub fn assign(&mut self, other: &Rng) {
        *self = other.duplicate();
    }

    /// Advance the generator and return the next value.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let tmp = self.a.wrapping_add(self.b).wrapping_add(self.counter);
        self.counter = self.counter.wrapping_add(1);
        self.a = self.b ^ (self.b >> 11);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(24).wrapping_add(tmp);
        tmp
    }

    /// Uniform double in `[0, 1)` from a single draw.
    ///
    /// The top 52 bits of the draw become the mantissa of a double in
    /// `[1, 2)`, from which 1.0 is subtracted. No division, no branch.
    #[inline]
    pub fn uniform01(&mut self) -> f64 {
        let bits = (0x3ff_u64 << 52) | (self.next() >> 12);
        f64::from_bits(bits) - 1.0
    }

    /// Uniform integer in `[0, range)`.
    ///
    /// Uses the multiply-shift reduction on the low 32 bits of a draw, which
    /// has a tiny bias for ranges that are not powers of two. `range == 0`
    /// always yields 0.
    #[inline]
    pub fn bounded(&mut self, range: u32) -> u32 {
        let r32 = u64::from(self.next() as u32);
        ((r32 * u64::from(range)) >> 32) as u32
    }

    /// Shuffle a slice in place (Fisher-Yates, back to front).
    ///
    /// # Panics
    ///
    /// Panics if the slice is longer than `u32::MAX` elements.
    pub fn shuffle<T>(&mut self, data: &mut [T]) {
        assert!(
            data.len() <= u32::MAX as usize,
            "shuffle supports at most u32::MAX elements"
        );
        for i in (1..data.len()).rev() {
            let j = self.bounded((i + 1) as u32) as usize;
            data.swap(i, j);
        }
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for Rng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dst)
    }
}
