//! `MeshPlexError`: unified error type for mesh-plex public APIs.
//!
//! Every fallible operation in this crate reports through this enum. All
//! failures are synchronous and construction- or fill-time: when a `try_*`
//! call returns an error, no partially-built array or mesh is observable.

use crate::buffer::scalar::{ScalarFamily, ScalarKind};
use thiserror::Error;

/// Unified error type for mesh-plex operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshPlexError {
    /// A data-type name outside the eleven-member scalar kind set.
    #[error("unsupported data type `{0}`")]
    UnsupportedDataType(String),
    /// A fill value whose family (boolean/integer/floating) is incompatible
    /// with the array's scalar kind. No implicit coercion across families.
    #[error("type mismatch: array of kind `{expected}` cannot take a {found} fill value")]
    TypeMismatch {
        /// Scalar kind of the array under construction.
        expected: ScalarKind,
        /// Family of the offending fill value.
        found: ScalarFamily,
    },
    /// A buffer whose byte size does not match what (shape, kind) requires.
    #[error("shape mismatch: shape and kind require {expected} bytes, buffer holds {found}")]
    ShapeMismatch {
        /// Byte size required by the declared shape and kind.
        expected: usize,
        /// Byte size of the supplied buffer.
        found: usize,
    },
    /// A disallowed extent: rank-0 shape, negative extent from the signed
    /// conversion path, or an extent product overflowing `usize`.
    #[error("invalid size: {0}")]
    InvalidSize(&'static str),
    /// An adopted or viewed buffer whose start address is not aligned for the
    /// requested scalar kind.
    #[error("misaligned buffer: address {addr:#x} is not aligned for kind `{kind}`")]
    MisalignedBuffer {
        /// Scalar kind the buffer was to be viewed as.
        kind: ScalarKind,
        /// Start address of the buffer.
        addr: usize,
    },
    /// An adopted or viewed buffer holding a byte that is not a valid
    /// encoding for the requested scalar kind. Only `bool` has invalid
    /// encodings (anything other than 0 or 1).
    #[error("invalid bit pattern: byte {byte:#04x} at offset {offset} is not a `{kind}` encoding")]
    InvalidBitPattern {
        /// Scalar kind the buffer was to be viewed as.
        kind: ScalarKind,
        /// Byte offset of the first offending byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },
    /// A safe mutable-access request through a handle whose buffer other
    /// handles still hold.
    #[error("shared buffer: {holders} handles hold the buffer, safe mutation needs exactly one")]
    SharedBuffer {
        /// Live holders of the buffer, including the requester.
        holders: usize,
    },
}
