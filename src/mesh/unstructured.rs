//! Fixed-capacity unstructured mesh storage for finite-volume codes.
//!
//! [`UnstructuredMesh`] owns thirteen parallel arrays describing nodes,
//! faces, cells, and their connectivity, all sized once from a
//! [`MeshCounts`] tuple. The core allocates and hands out accessors; an
//! external mesh-construction algorithm populates the arrays and owns every
//! cross-array consistency guarantee. There is no resize path: a larger mesh
//! is a new mesh.
//!
//! Cloning a mesh is a shallow handle copy. Every array of the clone aliases
//! the original's buffers, so writes land in storage every holder reads, and
//! the thirteen buffers release only when the last holder drops. The safe
//! mutable accessors follow [`TypedArray`]'s exclusivity gate: they hand out
//! slices only while the mesh is the sole holder, and aliased writers go
//! through [`TypedArray::as_mut_slice_shared`].

use crate::buffer::shape::Shape;
use crate::buffer::typed::TypedArray;
use crate::mesh_error::MeshPlexError;
use log::debug;

/// Maximum number of nodes a face can reference.
pub const FACE_MAX_NODES: usize = 4;
/// Maximum number of cells adjoining a face.
pub const FACE_MAX_CELLS: usize = 2;
/// Maximum number of nodes a cell can reference.
pub const CELL_MAX_NODES: usize = 8;
/// Maximum number of faces a cell can reference.
pub const CELL_MAX_FACES: usize = 6;

/// Sentinel an external builder writes into connectivity slots beyond an
/// entity's actual count. The core zero-initializes; maintaining the sentinel
/// invariant is the builder's job.
pub const UNSET: i32 = -1;

/// Construction-time sizing counts for an unstructured mesh.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize,
)]
pub struct MeshCounts {
    /// Number of interior nodes.
    pub nnode: usize,
    /// Number of interior faces.
    pub nface: usize,
    /// Number of interior cells.
    pub ncell: usize,
    /// Number of boundary faces.
    pub nboundary: usize,
}

/// Unstructured mesh with `ND`-dimensional coordinates.
///
/// Geometry arrays are `f64`, meta and connectivity arrays are `i32`, laid
/// out exactly as a finite-volume solver walks them:
///
/// | accessor | shape | role |
/// |---|---|---|
/// | `node_coords` | `[nnode, ND]` | geometry |
/// | `face_centers` | `[nface, ND]` | geometry |
/// | `face_normals` | `[nface, ND]` | geometry |
/// | `face_areas` | `[nface]` | geometry |
/// | `cell_centers` | `[ncell, ND]` | geometry |
/// | `cell_volumes` | `[ncell]` | geometry |
/// | `face_types` | `[ncell]` | meta |
/// | `cell_types` | `[ncell]` | meta |
/// | `cell_groups` | `[ncell]` | meta |
/// | `face_nodes` | `[nface, 4]` | connectivity |
/// | `face_cells` | `[nface, 2]` | connectivity |
/// | `cell_nodes` | `[ncell, 8]` | connectivity |
/// | `cell_faces` | `[ncell, 6]` | connectivity |
#[derive(Clone, Debug)]
pub struct UnstructuredMesh<const ND: usize> {
    counts: MeshCounts,
    ngstnode: usize,
    ngstface: usize,
    ngstcell: usize,
    use_incenter: bool,
    node_coords: TypedArray<f64>,
    face_centers: TypedArray<f64>,
    face_normals: TypedArray<f64>,
    face_areas: TypedArray<f64>,
    cell_centers: TypedArray<f64>,
    cell_volumes: TypedArray<f64>,
    face_types: TypedArray<i32>,
    cell_types: TypedArray<i32>,
    cell_groups: TypedArray<i32>,
    face_nodes: TypedArray<i32>,
    face_cells: TypedArray<i32>,
    cell_nodes: TypedArray<i32>,
    cell_faces: TypedArray<i32>,
}

/// Two-dimensional specialization.
pub type UnstructuredMesh2d = UnstructuredMesh<2>;
/// Three-dimensional specialization.
pub type UnstructuredMesh3d = UnstructuredMesh<3>;

impl<const ND: usize> UnstructuredMesh<ND> {
    /// Allocate all thirteen arrays zero-initialized at the sizes fixed by
    /// `counts`. Ghost counters start at zero. Zero counts are legal; the
    /// resulting arrays are simply empty.
    ///
    /// # Errors
    /// `Err(InvalidSize)` if `ND` is not 2 or 3 or an array's byte size
    /// overflows.
    pub fn try_new(counts: MeshCounts) -> Result<Self, MeshPlexError> {
        if ND != 2 && ND != 3 {
            return Err(MeshPlexError::InvalidSize(
                "mesh dimensionality must be 2 or 3",
            ));
        }
        let MeshCounts {
            nnode,
            nface,
            ncell,
            ..
        } = counts;
        let mesh = Self {
            counts,
            ngstnode: 0,
            ngstface: 0,
            ngstcell: 0,
            use_incenter: false,
            node_coords: TypedArray::try_zeroed(Shape::from([nnode, ND]))?,
            face_centers: TypedArray::try_zeroed(Shape::from([nface, ND]))?,
            face_normals: TypedArray::try_zeroed(Shape::from([nface, ND]))?,
            face_areas: TypedArray::try_zeroed(Shape::from([nface]))?,
            cell_centers: TypedArray::try_zeroed(Shape::from([ncell, ND]))?,
            cell_volumes: TypedArray::try_zeroed(Shape::from([ncell]))?,
            face_types: TypedArray::try_zeroed(Shape::from([ncell]))?,
            cell_types: TypedArray::try_zeroed(Shape::from([ncell]))?,
            cell_groups: TypedArray::try_zeroed(Shape::from([ncell]))?,
            face_nodes: TypedArray::try_zeroed(Shape::from([nface, FACE_MAX_NODES]))?,
            face_cells: TypedArray::try_zeroed(Shape::from([nface, FACE_MAX_CELLS]))?,
            cell_nodes: TypedArray::try_zeroed(Shape::from([ncell, CELL_MAX_NODES]))?,
            cell_faces: TypedArray::try_zeroed(Shape::from([ncell, CELL_MAX_FACES]))?,
        };
        debug!(
            "allocated {ND}-d unstructured mesh: nnode={nnode} nface={nface} ncell={ncell} nboundary={}",
            counts.nboundary
        );
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        mesh.debug_assert_layout();
        Ok(mesh)
    }

    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    fn debug_assert_layout(&self) {
        let c = &self.counts;
        debug_assert_eq!(self.node_coords.shape().extents(), &[c.nnode, ND]);
        debug_assert_eq!(self.face_centers.shape().extents(), &[c.nface, ND]);
        debug_assert_eq!(self.face_normals.shape().extents(), &[c.nface, ND]);
        debug_assert_eq!(self.face_areas.shape().extents(), &[c.nface]);
        debug_assert_eq!(self.cell_centers.shape().extents(), &[c.ncell, ND]);
        debug_assert_eq!(self.cell_volumes.shape().extents(), &[c.ncell]);
        debug_assert_eq!(self.face_types.shape().extents(), &[c.ncell]);
        debug_assert_eq!(self.cell_types.shape().extents(), &[c.ncell]);
        debug_assert_eq!(self.cell_groups.shape().extents(), &[c.ncell]);
        debug_assert_eq!(
            self.face_nodes.shape().extents(),
            &[c.nface, FACE_MAX_NODES]
        );
        debug_assert_eq!(
            self.face_cells.shape().extents(),
            &[c.nface, FACE_MAX_CELLS]
        );
        debug_assert_eq!(
            self.cell_nodes.shape().extents(),
            &[c.ncell, CELL_MAX_NODES]
        );
        debug_assert_eq!(
            self.cell_faces.shape().extents(),
            &[c.ncell, CELL_MAX_FACES]
        );
    }

    /// Spatial dimensionality of the mesh.
    #[inline]
    pub const fn ndim(&self) -> usize {
        ND
    }

    /// The sizing counts fixed at construction.
    #[inline]
    pub fn counts(&self) -> MeshCounts {
        self.counts
    }

    /// Number of interior nodes.
    #[inline]
    pub fn nnode(&self) -> usize {
        self.counts.nnode
    }

    /// Number of interior faces.
    #[inline]
    pub fn nface(&self) -> usize {
        self.counts.nface
    }

    /// Number of interior cells.
    #[inline]
    pub fn ncell(&self) -> usize {
        self.counts.ncell
    }

    /// Number of boundary faces.
    #[inline]
    pub fn nboundary(&self) -> usize {
        self.counts.nboundary
    }

    /// Number of ghost nodes.
    #[inline]
    pub fn ngstnode(&self) -> usize {
        self.ngstnode
    }

    /// Number of ghost faces.
    #[inline]
    pub fn ngstface(&self) -> usize {
        self.ngstface
    }

    /// Number of ghost cells.
    #[inline]
    pub fn ngstcell(&self) -> usize {
        self.ngstcell
    }

    /// Set the ghost node count.
    pub fn set_ngstnode(&mut self, n: usize) {
        self.ngstnode = n;
    }

    /// Set the ghost face count.
    pub fn set_ngstface(&mut self, n: usize) {
        self.ngstface = n;
    }

    /// Set the ghost cell count.
    pub fn set_ngstcell(&mut self, n: usize) {
        self.ngstcell = n;
    }

    /// Whether cell centers use the in-center for simplices.
    #[inline]
    pub fn use_incenter(&self) -> bool {
        self.use_incenter
    }

    /// Choose in-center cell centers for simplices.
    pub fn set_use_incenter(&mut self, flag: bool) {
        self.use_incenter = flag;
    }

    /// Node coordinates, shape `[nnode, ND]`.
    #[inline]
    pub fn node_coords(&self) -> &TypedArray<f64> {
        &self.node_coords
    }

    /// Mutable node coordinates.
    #[inline]
    pub fn node_coords_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.node_coords
    }

    /// Face centroids, shape `[nface, ND]`.
    #[inline]
    pub fn face_centers(&self) -> &TypedArray<f64> {
        &self.face_centers
    }

    /// Mutable face centroids.
    #[inline]
    pub fn face_centers_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.face_centers
    }

    /// Unit face normals, shape `[nface, ND]`.
    #[inline]
    pub fn face_normals(&self) -> &TypedArray<f64> {
        &self.face_normals
    }

    /// Mutable face normals.
    #[inline]
    pub fn face_normals_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.face_normals
    }

    /// Face areas (lengths in 2-D), shape `[nface]`.
    #[inline]
    pub fn face_areas(&self) -> &TypedArray<f64> {
        &self.face_areas
    }

    /// Mutable face areas.
    #[inline]
    pub fn face_areas_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.face_areas
    }

    /// Cell centroids, shape `[ncell, ND]`.
    #[inline]
    pub fn cell_centers(&self) -> &TypedArray<f64> {
        &self.cell_centers
    }

    /// Mutable cell centroids.
    #[inline]
    pub fn cell_centers_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.cell_centers
    }

    /// Cell volumes (areas in 2-D), shape `[ncell]`.
    #[inline]
    pub fn cell_volumes(&self) -> &TypedArray<f64> {
        &self.cell_volumes
    }

    /// Mutable cell volumes.
    #[inline]
    pub fn cell_volumes_mut(&mut self) -> &mut TypedArray<f64> {
        &mut self.cell_volumes
    }

    /// Face type tags, shape `[ncell]`.
    #[inline]
    pub fn face_types(&self) -> &TypedArray<i32> {
        &self.face_types
    }

    /// Mutable face type tags.
    #[inline]
    pub fn face_types_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.face_types
    }

    /// Cell type tags ([`crate::mesh::cell_kind::CellKind`] ids), shape `[ncell]`.
    #[inline]
    pub fn cell_types(&self) -> &TypedArray<i32> {
        &self.cell_types
    }

    /// Mutable cell type tags.
    #[inline]
    pub fn cell_types_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.cell_types
    }

    /// Cell group ids, shape `[ncell]`.
    #[inline]
    pub fn cell_groups(&self) -> &TypedArray<i32> {
        &self.cell_groups
    }

    /// Mutable cell group ids.
    #[inline]
    pub fn cell_groups_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.cell_groups
    }

    /// Node list per face, shape `[nface, 4]`, unused slots sentinel-marked
    /// by the builder.
    #[inline]
    pub fn face_nodes(&self) -> &TypedArray<i32> {
        &self.face_nodes
    }

    /// Mutable node list per face.
    #[inline]
    pub fn face_nodes_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.face_nodes
    }

    /// Adjoining-cell pair per face, shape `[nface, 2]`.
    #[inline]
    pub fn face_cells(&self) -> &TypedArray<i32> {
        &self.face_cells
    }

    /// Mutable adjoining-cell pairs.
    #[inline]
    pub fn face_cells_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.face_cells
    }

    /// Node list per cell, shape `[ncell, 8]`.
    #[inline]
    pub fn cell_nodes(&self) -> &TypedArray<i32> {
        &self.cell_nodes
    }

    /// Mutable node list per cell.
    #[inline]
    pub fn cell_nodes_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.cell_nodes
    }

    /// Face list per cell, shape `[ncell, 6]`.
    #[inline]
    pub fn cell_faces(&self) -> &TypedArray<i32> {
        &self.cell_faces
    }

    /// Mutable face list per cell.
    #[inline]
    pub fn cell_faces_mut(&mut self) -> &mut TypedArray<i32> {
        &mut self.cell_faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_d_layout_matches_counts() {
        let mesh = UnstructuredMesh3d::try_new(MeshCounts {
            nnode: 4,
            nface: 5,
            ncell: 2,
            nboundary: 3,
        })
        .unwrap();
        assert_eq!(mesh.ndim(), 3);
        assert_eq!(mesh.node_coords().shape().extents(), &[4, 3]);
        assert_eq!(mesh.cell_volumes().shape().extents(), &[2]);
        assert_eq!(mesh.cell_nodes().shape().extents(), &[2, 8]);
        assert_eq!(mesh.face_cells().shape().extents(), &[5, 2]);
        assert_eq!(mesh.ngstnode(), 0);
        assert_eq!(mesh.ngstface(), 0);
        assert_eq!(mesh.ngstcell(), 0);
    }

    #[test]
    fn two_d_uses_planar_coordinates() {
        let mesh = UnstructuredMesh2d::try_new(MeshCounts {
            nnode: 6,
            nface: 7,
            ncell: 2,
            nboundary: 4,
        })
        .unwrap();
        assert_eq!(mesh.node_coords().shape().extents(), &[6, 2]);
        assert_eq!(mesh.face_normals().shape().extents(), &[7, 2]);
        assert_eq!(mesh.face_areas().shape().extents(), &[7]);
    }

    #[test]
    fn arrays_start_zeroed() {
        let mesh = UnstructuredMesh2d::try_new(MeshCounts {
            nnode: 3,
            nface: 3,
            ncell: 1,
            nboundary: 3,
        })
        .unwrap();
        assert!(mesh.node_coords().as_slice().iter().all(|&v| v == 0.0));
        assert!(mesh.cell_nodes().as_slice().iter().all(|&v| v == 0));
        assert!(!mesh.use_incenter());
    }

    #[test]
    fn empty_mesh_is_legal() {
        let mesh = UnstructuredMesh3d::try_new(MeshCounts::default()).unwrap();
        assert_eq!(mesh.nnode(), 0);
        assert!(mesh.node_coords().is_empty());
    }

    #[test]
    fn unsupported_dimensionality_is_rejected() {
        assert!(matches!(
            UnstructuredMesh::<4>::try_new(MeshCounts::default()),
            Err(MeshPlexError::InvalidSize(_))
        ));
    }

    #[test]
    fn ghost_counters_are_mutable() {
        let mut mesh = UnstructuredMesh2d::try_new(MeshCounts {
            nnode: 1,
            nface: 1,
            ncell: 1,
            nboundary: 1,
        })
        .unwrap();
        mesh.set_ngstcell(2);
        mesh.set_ngstface(5);
        mesh.set_ngstnode(4);
        assert_eq!((mesh.ngstnode(), mesh.ngstface(), mesh.ngstcell()), (4, 5, 2));
    }

    #[test]
    fn clones_alias_array_storage() {
        let mut mesh = UnstructuredMesh2d::try_new(MeshCounts {
            nnode: 2,
            nface: 1,
            ncell: 1,
            nboundary: 1,
        })
        .unwrap();
        mesh.node_coords_mut().row_mut(1).unwrap()[0] = 7.5;
        let mut other = mesh.clone();
        assert_eq!(other.node_coords().row(1).unwrap()[0], 7.5);
        assert_eq!(mesh.node_coords().buffer().holder_count(), 2);
        // Shared handles lose the safe mutable path.
        assert!(other.node_coords_mut().row_mut(1).is_none());
    }
}
