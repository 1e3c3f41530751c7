//! Mesh module: cell taxonomy and the fixed-capacity unstructured mesh.
#![warn(missing_docs)]

pub mod cell_kind;
pub mod unstructured;

pub use cell_kind::CellKind;
pub use unstructured::{
    CELL_MAX_FACES, CELL_MAX_NODES, FACE_MAX_CELLS, FACE_MAX_NODES, MeshCounts, UNSET,
    UnstructuredMesh, UnstructuredMesh2d, UnstructuredMesh3d,
};
