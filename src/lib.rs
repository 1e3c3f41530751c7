//! # mesh-plex
//!
//! mesh-plex supplies the two foundational containers a finite-volume code
//! builds on: a runtime-typed dense array ([`buffer::ArrayPlex`]) that
//! type-erases over a closed set of eleven scalar kinds, and a fixed-capacity
//! unstructured mesh ([`mesh::UnstructuredMesh`]) holding thirteen parallel
//! geometry/connectivity arrays over shared, reference-counted buffers.
//!
//! ## Ownership
//! Buffers are reference-counted. An array can own its allocation or adopt
//! memory owned by an external party, in which case a caller-supplied
//! finalizer runs exactly once when the last holder releases. Cloning arrays
//! and meshes is shallow: clones alias the same element storage.
//!
//! ## Concurrency
//! The data structures take no locks. Reference counts are atomic (`Arc`),
//! so handles may cross threads. Safe mutation of element storage requires
//! the mutating handle to be the buffer's only holder; aliased writers use
//! the unsafe shared path ([`buffer::TypedArray::as_mut_slice_shared`]) and
//! carry its exclusivity contract. All operations are synchronous and either
//! fully succeed or fail before any caller-visible object exists.
//!
//! ## Extension point
//! The scalar kind set is closed. Adding a kind means one new
//! [`buffer::ScalarKind`] variant, one `impl_plex_scalar!` line, and one arm
//! in each exhaustive match in [`buffer::plex`]; the compiler walks you to
//! every site.

pub mod buffer;
pub mod mesh;
pub mod mesh_error;

/// A convenient prelude importing the most-used types.
pub mod prelude {
    pub use crate::buffer::buffer::{Buffer, BufferRemover};
    pub use crate::buffer::plex::ArrayPlex;
    pub use crate::buffer::scalar::{PlexScalar, ScalarFamily, ScalarKind, ScalarValue};
    pub use crate::buffer::shape::Shape;
    pub use crate::buffer::typed::TypedArray;
    pub use crate::mesh::cell_kind::CellKind;
    pub use crate::mesh::unstructured::{
        MeshCounts, UnstructuredMesh, UnstructuredMesh2d, UnstructuredMesh3d,
    };
    pub use crate::mesh_error::MeshPlexError;
}
