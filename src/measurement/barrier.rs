//! Optimization barriers for measured code.
//!
//! A benchmark whose result is never used can be deleted by the optimizer,
//! and a value that is provably constant can be hoisted out of the loop.
//! The functions here hand the *address* of a value to an opaque block the
//! compiler cannot see through, which works the same for a `u64` and for a
//! large struct or slice.
//!
//! - x86_64 / aarch64: an empty `asm!` block taking the address, without
//!   `nomem`, so the compiler must assume memory behind it is accessed.
//! - Other targets: `std::hint::black_box` on the reference. This is best
//!   effort; the standard library only documents it as a hint.

/// Wrapper around `std::hint::black_box` for passing values through by move.
///
/// Use this when the measured expression is already a value you want back.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std::hint::black_box(x)
}

/// Force the compiler to treat `value` as read.
///
/// The computation that produced `value` cannot be eliminated, and since the
/// barrier may read any memory, stores before it cannot be sunk past it.
///
/// ```ignore
/// let mut x = 1.0_f64;
/// epochbench::run("sqrt", || {
///     x = x.sqrt() + 1.0;
///     do_not_optimize_away(&x);
/// })?;
/// ```
#[inline(always)]
pub fn do_not_optimize_away<T: ?Sized>(value: &T) {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        let ptr = value as *const T as *const u8;
        // SAFETY: the template is a comment; no instruction is emitted and
        // the pointer is only handed over, never dereferenced.
        unsafe {
            std::arch::asm!(
                "/* {0} */",
                in(reg) ptr,
                options(nostack, preserves_flags, readonly),
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        std::hint::black_box(value);
    }
}

/// Force the compiler to treat `value` as read and possibly modified.
///
/// After the barrier the compiler must reload `value` from memory, so it
/// cannot carry a cached copy across iterations of the measured loop.
#[inline(always)]
pub fn do_not_optimize_away_mut<T: ?Sized>(value: &mut T) {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        let ptr = value as *mut T as *mut u8;
        // SAFETY: as above; the block emits nothing, so the value is left
        // untouched even though the compiler must assume it was written.
        unsafe {
            std::arch::asm!(
                "/* {0} */",
                in(reg) ptr,
                options(nostack, preserves_flags),
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        std::hint::black_box(&mut *value);
    }
}
