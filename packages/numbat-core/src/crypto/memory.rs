//! # Secure Memory Utilities
//!
//! Best-effort hygiene for buffers that hold passphrases, derived keys and
//! decrypted key material.
//!
//! ## Limits
//!
//! Zeroing is done with volatile writes (via `zeroize`) so the compiler
//! cannot elide it, but nothing here stops the allocator from having copied
//! the bytes earlier (a `Vec` reallocation) or the OS from swapping the page
//! out. Memory locking is not attempted.

use zeroize::Zeroize;

/// Overwrite every byte of `buffer` with zero.
///
/// The slice keeps its length, so callers (and tests) can confirm the
/// contents are gone.
pub fn zero(buffer: &mut [u8]) {
    buffer.zeroize();
}

/// Compare two byte strings for equality.
///
/// Returns early when the lengths differ (lengths are not secret here); for
/// equal lengths every byte is examined regardless of where the first
/// difference is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    constant_time_eq::constant_time_eq(a, b)
}

// ============================================================================
// TESTS
// ============================================================================
