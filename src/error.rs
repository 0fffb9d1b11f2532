//! Error kinds raised by the alignment engine.

use std::fmt;

/// Errors raised synchronously by aligner construction and alignment.
///
/// Saturation risk in end-to-end mode is deliberately not an error: it is a
/// one-shot `log::warn!` diagnostic and alignment continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Invalid scoring parameters or read/lane configuration. No partial
    /// results are produced.
    Config(String),

    /// A predecessor's seed was missing during merge: the node stream was
    /// not topologically ordered (or a pinch marker discarded a seed that
    /// was still needed). Alignment is aborted.
    Topology(String),
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::Config(msg) => write!(f, "configuration error: {}", msg),
            AlignError::Topology(msg) => write!(f, "topology error: {}", msg),
        }
    }
}

impl std::error::Error for AlignError {}
