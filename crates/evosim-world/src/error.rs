//! Error types for the `evosim-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use evosim_types::AttributeKind;

/// Errors that can occur while building or stepping environment processes.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Distribution or attribute parameters failed validation.
    #[error("invalid distribution parameters: {reason}")]
    InvalidParameters {
        /// Description of the rejected parameter.
        reason: String,
    },

    /// The underlying normal distribution could not be constructed.
    #[error("distribution error: {reason}")]
    Distribution {
        /// Message from the distribution library.
        reason: String,
    },

    /// An attribute was stepped to an index outside its generated sequence.
    #[error("{attribute} step {index} is out of range (sequence length {len})")]
    StepOutOfRange {
        /// The attribute being stepped.
        attribute: AttributeKind,
        /// The requested index.
        index: usize,
        /// Length of the generated sequence.
        len: usize,
    },
}
