//! Error types for GloBiMap operations.
//!
//! All fallible operations in this crate return [`Result<T>`] with
//! [`GlobimapError`] as the error type. Configuration errors are fatal and
//! surface at construction time, before any layer storage is allocated;
//! serialization errors are recoverable; capacity exhaustion is only an
//! error under [`ExhaustionPolicy::FailFast`](crate::core::ExhaustionPolicy::FailFast).
//!
//! # Error Propagation
//!
//! ```
//! use globimap::{FilterConfig, Globimap, LayerConfig, Result};
//!
//! fn build(k: u64) -> Result<Globimap> {
//!     let config = FilterConfig::new(k, vec![LayerConfig::new(8, 16)])?;
//!     Ok(Globimap::new(config))
//! }
//! # assert!(build(4).is_ok());
//! # assert!(build(0).is_err());
//! ```

use std::fmt;

/// Result type alias for GloBiMap operations.
pub type Result<T> = std::result::Result<T, GlobimapError>;

/// Errors that can occur during filter construction, insertion and
/// serialization.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - Every variant carries enough context to diagnose the failure without
///   a debugger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobimapError {
    /// A layer was configured with a bit width outside {1, 8, 16, 32, 64}.
    InvalidBitWidth {
        /// The rejected bit width.
        bits: u32,
    },

    /// A layer's log2 size does not fit a 64-bit address space.
    ///
    /// `log2_size` must be below 64 so that `capacity = 2^log2_size` and
    /// `mask = capacity - 1` are representable as `u64`.
    InvalidLogSize {
        /// The rejected log2 size.
        log2_size: u32,
    },

    /// The hash count `k` was zero.
    ///
    /// A filter with no probes can neither insert nor answer queries.
    InvalidHashCount {
        /// The rejected hash count.
        count: u64,
    },

    /// The configuration contains no layers.
    EmptyLayerStack,

    /// An insert found every configured layer saturated along a probe's
    /// cascade path.
    ///
    /// Only surfaced under the fail-fast exhaustion policy; the lenient
    /// policy absorbs the drop and counts it instead.
    CapacityExhausted {
        /// Probe number (in `0..k`) whose cascade found no free counter.
        probe: u64,
    },

    /// A decoded byte buffer does not match the configured first layer.
    SerializationError {
        /// Byte length the first layer's configuration requires.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// A cooperative cancellation token was triggered mid-operation.
    ///
    /// The operation leaves no partial state behind: audits commit their
    /// results only on completion and rasterization emits pixels strictly
    /// before the scanline on which it stopped.
    Cancelled,
}

impl fmt::Display for GlobimapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBitWidth { bits } => {
                write!(
                    f,
                    "Invalid layer bit width: {}. Must be one of 1, 8, 16, 32, 64.",
                    bits
                )
            }
            Self::InvalidLogSize { log2_size } => {
                write!(
                    f,
                    "Invalid layer log2 size: {}. Must be below 64.",
                    log2_size
                )
            }
            Self::InvalidHashCount { count } => {
                write!(f, "Invalid hash count: {}. Must be at least 1.", count)
            }
            Self::EmptyLayerStack => {
                write!(f, "Filter configuration contains no layers.")
            }
            Self::CapacityExhausted { probe } => {
                write!(
                    f,
                    "All layers saturated along the cascade path of probe {}.",
                    probe
                )
            }
            Self::SerializationError { expected, actual } => {
                write!(
                    f,
                    "Buffer length {} does not match the first layer's expected {} bytes.",
                    actual, expected
                )
            }
            Self::Cancelled => write!(f, "Operation cancelled."),
        }
    }
}

impl std::error::Error for GlobimapError {}

impl GlobimapError {
    /// Create an `InvalidBitWidth` error.
    #[must_use]
    pub fn invalid_bit_width(bits: u32) -> Self {
        Self::InvalidBitWidth { bits }
    }

    /// Create an `InvalidLogSize` error.
    #[must_use]
    pub fn invalid_log_size(log2_size: u32) -> Self {
        Self::InvalidLogSize { log2_size }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: u64) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Create a `CapacityExhausted` error for the given probe number.
    #[must_use]
    pub fn capacity_exhausted(probe: u64) -> Self {
        Self::CapacityExhausted { probe }
    }

    /// Create a `SerializationError` from expected/actual byte lengths.
    #[must_use]
    pub fn serialization_error(expected: usize, actual: usize) -> Self {
        Self::SerializationError { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_bit_width() {
        let err = GlobimapError::invalid_bit_width(12);
        let display = format!("{err}");
        assert!(display.contains("12"));
        assert!(display.contains("1, 8, 16, 32, 64"));
    }

    #[test]
    fn display_invalid_log_size() {
        let err = GlobimapError::invalid_log_size(64);
        let display = format!("{err}");
        assert!(display.contains("64"));
        assert!(display.contains("below 64"));
    }

    #[test]
    fn display_invalid_hash_count() {
        let err = GlobimapError::invalid_hash_count(0);
        let display = format!("{err}");
        assert!(display.contains("0"));
        assert!(display.contains("at least 1"));
    }

    #[test]
    fn display_capacity_exhausted() {
        let err = GlobimapError::capacity_exhausted(3);
        assert!(format!("{err}").contains("probe 3"));
    }

    #[test]
    fn display_serialization_error() {
        let err = GlobimapError::serialization_error(128, 64);
        let display = format!("{err}");
        assert!(display.contains("128"));
        assert!(display.contains("64"));
    }

    #[test]
    fn implements_std_error() {
        let _err: Box<dyn std::error::Error> =
            Box::new(GlobimapError::EmptyLayerStack);
    }

    #[test]
    fn error_clone_and_eq() {
        let err1 = GlobimapError::invalid_bit_width(7);
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(GlobimapError::EmptyLayerStack)
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
