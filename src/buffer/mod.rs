//! Buffer module: raw byte spans, typed views, and the runtime-typed plex.
#![warn(missing_docs)]

pub mod buffer;
pub mod plex;
pub mod scalar;
pub mod shape;
pub mod typed;

pub use buffer::{Buffer, BufferRemover};
pub use plex::ArrayPlex;
pub use scalar::{PlexScalar, ScalarFamily, ScalarKind, ScalarValue};
pub use shape::Shape;
pub use typed::TypedArray;
