use thiserror::Error;

use crate::mesh::{AnnexKey, GrobKind};

/// All errors reported by this crate.
///
/// Core functions never silently recover; they hand the error back to the
/// caller. Annex update callbacks are the one exception: they cannot fail and
/// unconditionally resize to the correct length.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Reserved for file-format collaborators built on top of the core.
    #[error("file i/o: {0}")]
    FileIo(String),

    #[error("bad tuple size: expected {expected}, got {got}")]
    BadTupleSize { expected: usize, got: usize },

    #[error("bad index count for {kind:?}: expected {expected}, got {got}")]
    BadIndexCount {
        kind: GrobKind,
        expected: usize,
        got: usize,
    },

    #[error("no annex found for key '{0}'")]
    AnnexMissing(AnnexKey),

    #[error("annex for key '{key}' is not of type {requested}")]
    AnnexType {
        key: AnnexKey,
        requested: &'static str,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("value error: {0}")]
    ValueError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MeshError>;
