//! Core error types for DDM operations.
//!
//! This module defines the error hierarchy used throughout the merge engine.
//! All fallible operations return `Result<T>` where the error type is
//! `DdmError`.

use thiserror::Error;

/// The primary error type for all DDM operations.
///
/// The engine is pure and holds no external resources, so the error surface
/// is small: a reorder directive can name an anchor that does not exist, and
/// adversarial input can drive recursion past a configured bound.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DdmError {
    /// A reorder directive named an anchor that was not present in the
    /// collection being reordered, and `Options::strict_anchor` is set.
    #[error("anchor not found: '{anchor}'{}", key.as_ref().map(|k| format!(" (subject key: '{k}')")).unwrap_or_default())]
    AnchorMissing {
        /// The anchor name or identity that could not be located.
        anchor: String,
        /// For object-key reorders, the key of the subject that named the
        /// anchor. Absent for array-item reorders.
        key: Option<String>,
    },

    /// Recursion depth exceeded the configured bound while merging nested
    /// structures. Guards against pathological or adversarial input.
    #[error("merge recursion depth exceeded bound of {limit}")]
    DepthExceeded {
        /// The configured depth bound that was exceeded.
        limit: usize,
    },
}

/// Convenience type alias for Result with DdmError.
///
/// This allows writing `Result<T>` instead of `std::result::Result<T,
/// DdmError>`.
pub type Result<T> = std::result::Result<T, DdmError>;
