//! Book error types.
//!
//! Only two classes of failure exist: construction-time configuration
//! errors and event-decoding errors. Operational preconditions (duplicate
//! ids, unknown ids, zero quantities, non-top executes) are programmer
//! errors checked by debug assertions, not runtime errors.

use thiserror::Error;

/// Errors that can occur constructing a book or decoding events.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookError {
    /// Hot/cold strategy configured with a window size outside the
    /// allowed range.
    #[error(
        "hot_levels_count={requested} (rounded to {rounded}) is outside the allowed range [8, 4096]"
    )]
    HotLevelsCountOutOfRange {
        /// The requested window size.
        requested: usize,
        /// The size after power-of-two round-up.
        rounded: usize,
    },

    /// An events buffer whose length is not a multiple of the 32-byte
    /// record size.
    #[error("bad events buffer length {len}: must be a multiple of 32")]
    BadEventsLength {
        /// The offending buffer length.
        len: usize,
    },

    /// An event record carrying an op code outside `0..=4`.
    #[error("unknown event op code {code}")]
    UnknownOpCode {
        /// The offending op code.
        code: u8,
    },
}
