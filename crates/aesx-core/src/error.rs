//! Error type shared by the key schedule, the chaining modes and the self-test.

use thiserror::Error;

/// Errors reported by `aesx-core`.
///
/// Every variant is recoverable; the library never logs or retries on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The key was not 16, 24 or 32 bytes long.
    #[error("invalid AES key length: {len} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength {
        /// Length of the rejected key in bytes.
        len: usize,
    },
    /// A buffer length did not satisfy the mode's requirements.
    #[error("invalid input length: {len} bytes ({expected})")]
    InvalidInputLength {
        /// Length of the rejected buffer in bytes.
        len: usize,
        /// What the mode required.
        expected: &'static str,
    },
    /// The CFB128 stream offset was outside `0..16`.
    #[error("invalid CFB128 stream offset: {offset} (expected 0..16)")]
    InvalidStreamOffset {
        /// The rejected offset.
        offset: usize,
    },
    /// At least one known-answer vector did not reproduce.
    #[error("AES self-test failed: {failed} of {total} vectors mismatched")]
    SelfTestFailed {
        /// Number of failing vectors.
        failed: usize,
        /// Number of vectors run.
        total: usize,
    },
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
