//! Canonical cell shapes and their fixed topological counts.
//!
//! The taxonomy is a closed table: id 0 is the reserved "not a cell" entry
//! and ids 1-8 are the canonical shapes. Counts never change at runtime; the
//! mesh stores the id in its cell-type array and looks topology up here.

use std::fmt;

/// Canonical cell shape, id 0 reserved.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum CellKind {
    /// Reserved "not a cell" entry (id 0).
    #[default]
    None = 0,
    /// 0-D point/vertex.
    Point = 1,
    /// 1-D line/edge.
    Line = 2,
    /// 2-D tensor-product cell.
    Quadrilateral = 3,
    /// 2-D simplex.
    Triangle = 4,
    /// 3-D tensor-product cell (brick).
    Hexahedron = 5,
    /// 3-D simplex.
    Tetrahedron = 6,
    /// 3-D wedge.
    Prism = 7,
    /// 3-D pyramid.
    Pyramid = 8,
}

impl CellKind {
    /// All nine table entries, indexed by id.
    pub const ALL: [CellKind; 9] = [
        CellKind::None,
        CellKind::Point,
        CellKind::Line,
        CellKind::Quadrilateral,
        CellKind::Triangle,
        CellKind::Hexahedron,
        CellKind::Tetrahedron,
        CellKind::Prism,
        CellKind::Pyramid,
    ];

    /// Numeric id, 0 through 8.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Look a kind up by id.
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(CellKind::None),
            1 => Some(CellKind::Point),
            2 => Some(CellKind::Line),
            3 => Some(CellKind::Quadrilateral),
            4 => Some(CellKind::Triangle),
            5 => Some(CellKind::Hexahedron),
            6 => Some(CellKind::Tetrahedron),
            7 => Some(CellKind::Prism),
            8 => Some(CellKind::Pyramid),
            _ => None,
        }
    }

    /// Topological dimension of the shape.
    pub const fn dimension(self) -> u8 {
        match self {
            CellKind::None | CellKind::Point => 0,
            CellKind::Line => 1,
            CellKind::Quadrilateral | CellKind::Triangle => 2,
            CellKind::Hexahedron | CellKind::Tetrahedron | CellKind::Prism | CellKind::Pyramid => 3,
        }
    }

    /// Number of nodes.
    pub const fn node_count(self) -> u8 {
        match self {
            CellKind::None => 0,
            CellKind::Point => 1,
            CellKind::Line => 2,
            CellKind::Quadrilateral => 4,
            CellKind::Triangle => 3,
            CellKind::Hexahedron => 8,
            CellKind::Tetrahedron => 4,
            CellKind::Prism => 6,
            CellKind::Pyramid => 5,
        }
    }

    /// Number of edges.
    pub const fn edge_count(self) -> u8 {
        match self {
            CellKind::None | CellKind::Point | CellKind::Line => 0,
            CellKind::Quadrilateral => 4,
            CellKind::Triangle => 3,
            CellKind::Hexahedron => 12,
            CellKind::Tetrahedron => 6,
            CellKind::Prism => 9,
            CellKind::Pyramid => 8,
        }
    }

    /// Number of 2-D bounding surfaces; zero below 3-D.
    pub const fn surface_count(self) -> u8 {
        match self {
            CellKind::Hexahedron => 6,
            CellKind::Tetrahedron => 4,
            CellKind::Prism | CellKind::Pyramid => 5,
            _ => 0,
        }
    }

    /// Number of bounding faces: edges for 2-D shapes, surfaces for 3-D
    /// shapes, zero otherwise. This is the rule that lets geometry code
    /// treat 2-D and 3-D cells uniformly.
    pub const fn face_count(self) -> u8 {
        match self.dimension() {
            2 => self.edge_count(),
            3 => self.surface_count(),
            _ => 0,
        }
    }

    /// Lower-case shape name.
    pub const fn name(self) -> &'static str {
        match self {
            CellKind::None => "noncelltype",
            CellKind::Point => "point",
            CellKind::Line => "line",
            CellKind::Quadrilateral => "quadrilateral",
            CellKind::Triangle => "triangle",
            CellKind::Hexahedron => "hexahedron",
            CellKind::Tetrahedron => "tetrahedron",
            CellKind::Prism => "prism",
            CellKind::Pyramid => "pyramid",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in CellKind::ALL {
            assert_eq!(CellKind::from_id(kind.id()), Some(kind));
            assert_eq!(CellKind::ALL[kind.id() as usize], kind);
        }
        assert_eq!(CellKind::from_id(9), None);
    }

    #[test]
    fn table_matches_canonical_counts() {
        // (kind, dim, nnode, nedge, nsurface)
        let table = [
            (CellKind::None, 0, 0, 0, 0),
            (CellKind::Point, 0, 1, 0, 0),
            (CellKind::Line, 1, 2, 0, 0),
            (CellKind::Quadrilateral, 2, 4, 4, 0),
            (CellKind::Triangle, 2, 3, 3, 0),
            (CellKind::Hexahedron, 3, 8, 12, 6),
            (CellKind::Tetrahedron, 3, 4, 6, 4),
            (CellKind::Prism, 3, 6, 9, 5),
            (CellKind::Pyramid, 3, 5, 8, 5),
        ];
        for (kind, dim, nnode, nedge, nsurface) in table {
            assert_eq!(kind.dimension(), dim, "{kind}");
            assert_eq!(kind.node_count(), nnode, "{kind}");
            assert_eq!(kind.edge_count(), nedge, "{kind}");
            assert_eq!(kind.surface_count(), nsurface, "{kind}");
        }
    }

    #[test]
    fn face_count_unifies_edges_and_surfaces() {
        assert_eq!(CellKind::Quadrilateral.face_count(), 4);
        assert_eq!(CellKind::Triangle.face_count(), 3);
        assert_eq!(CellKind::Hexahedron.face_count(), 6);
        assert_eq!(CellKind::Tetrahedron.face_count(), 4);
        assert_eq!(CellKind::None.face_count(), 0);
        assert_eq!(CellKind::Point.face_count(), 0);
        assert_eq!(CellKind::Line.face_count(), 0);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(CellKind::None.name(), "noncelltype");
        assert_eq!(CellKind::Pyramid.to_string(), "pyramid");
    }
}
