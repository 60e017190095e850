//! Typed failures for domain resolution and densification.

use gdxtab_model::SymbolKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GdxError {
    /// Symbol absent from the catalog/source.
    #[error("symbol `{0}` not found")]
    NotFound(String),

    /// Symbol kind outside {set, parameter, variable, equation}.
    ///
    /// The original tooling terminated the process here; surfaced as a
    /// recoverable failure carrying the offending kind instead.
    #[error("symbol `{symbol}` has unsupported kind `{kind}`")]
    UnsupportedKind { symbol: String, kind: SymbolKind },

    /// Requested facet not one of L, M, LO, UP, SCALE.
    #[error("facet `{0}` not recognized (expected L, M, LO, UP or SCALE)")]
    InvalidFacet(String),

    /// Concrete member enumeration was required against a universal or
    /// otherwise non-enumerable axis.
    #[error("domain `{0}` cannot be enumerated")]
    UnresolvedDomain(String),

    /// The domain-entry graph is malformed (set-over-set cycle, or a domain
    /// reference that is not a one-dimensional set).
    #[error("corrupt domain graph: {0}")]
    CorruptDomain(String),

    /// External dump tool invoked on a host it does not support.
    #[error("external dump tool unsupported on platform `{0}`")]
    PlatformUnsupported(String),

    /// External dump tool failed: non-zero exit, error output, timeout, or
    /// unparseable text.
    #[error("external dump tool failed: {0}")]
    ExternalToolFailure(String),

    #[error("i/o failure")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GdxError>;
