//! Triangulation data structure for 3D Delaunay tetrahedralizations.
//!
//! The `Tds` stores tetrahedra as four vertex ids plus four neighbor links,
//! following the CGAL convention that `neighbors[i]` is the cell across the
//! facet opposite `vertices[i]`.
//!
//! # Ghost cells
//!
//! The convex hull is closed off with *ghost* cells that use the
//! [`INFINITE_VERTEX`]. Every hull facet is shared by exactly one finite
//! cell and one ghost cell, so every facet of every cell has a neighbor and
//! point location never has to special-case the outside of the hull.
//!
//! # Orientation
//!
//! Every finite cell is positively oriented (see
//! [`orient3d`](crate::geometry::predicates::orient3d)). A ghost cell is
//! oriented so that replacing its infinite vertex by a point beyond its hull
//! facet yields a positively oriented tetrahedron.
//!
//! # Topological invariants
//!
//! | Invariant | Checked by |
//! |---|---|
//! | Neighbor links are mutual and share exactly three vertices | [`Tds::validate_neighbors`] |
//! | Finite cells are positively oriented | [`Tds::validate_orientation`] |
//! | Empty circumsphere property | [`find_delaunay_violations`](crate::core::util::delaunay_validation::find_delaunay_violations) |

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::collections::{FacetIndex, StorageMap};
use crate::geometry::point::GridPoint;
use crate::geometry::predicates::{Orientation, RankedPoint, orient3d};

// =============================================================================
// KEYS AND IDS
// =============================================================================

new_key_type! {
    /// Key type for accessing cells in the storage map.
    ///
    /// Keys stay valid until their cell is removed, and are never reused for
    /// a different cell while the old key is alive.
    pub struct CellKey;
}

/// Dense index of an engine vertex.
pub type VertexId = u32;

/// The vertex at infinity shared by all ghost cells.
pub const INFINITE_VERTEX: VertexId = VertexId::MAX;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Structural problems detected when validating a [`Tds`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TdsValidationError {
    /// A facet has no neighbor.
    #[error("Cell {cell:?} has no neighbor across facet {facet}")]
    MissingNeighbor {
        /// Cell with the open facet.
        cell: CellKey,
        /// Facet index.
        facet: FacetIndex,
    },
    /// Neighbor links are inconsistent.
    #[error("Invalid neighbor relationships: {message}")]
    InvalidNeighbors {
        /// Description of the inconsistency.
        message: String,
    },
    /// A finite cell is flat or inverted.
    #[error("Cell {cell:?} is not positively oriented ({orientation})")]
    BadOrientation {
        /// The offending cell.
        cell: CellKey,
        /// Its orientation.
        orientation: Orientation,
    },
}

// =============================================================================
// VERTICES AND CELLS
// =============================================================================

/// A vertex as seen by the engine: a lattice point plus the bookkeeping that
/// ties it back to the caller's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineVertex {
    /// Snapped position.
    pub point: GridPoint,
    /// Symbolic-perturbation priority; unique per vertex.
    pub rank: u64,
    /// Index of the caller's input point this vertex comes from.
    pub origin: u32,
    /// Periodic translation applied to the input point (zero when non-periodic).
    pub offset: [i8; 3],
}

/// A tetrahedron with its adjacency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Vertex ids; may contain [`INFINITE_VERTEX`] once.
    pub vertices: [VertexId; 4],
    /// `neighbors[i]` is the cell across the facet opposite `vertices[i]`.
    pub neighbors: [Option<CellKey>; 4],
}

impl Cell {
    /// Creates a cell with no neighbors wired yet.
    #[must_use]
    pub const fn new(vertices: [VertexId; 4]) -> Self {
        Self {
            vertices,
            neighbors: [None; 4],
        }
    }

    /// Slot of the infinite vertex, if this is a ghost cell.
    #[must_use]
    pub fn infinite_slot(&self) -> Option<usize> {
        self.vertices.iter().position(|&v| v == INFINITE_VERTEX)
    }

    /// Returns `true` for ghost cells.
    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.infinite_slot().is_some()
    }

    /// Slot of `vertex` in this cell.
    #[must_use]
    pub fn index_of(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    /// Sorted vertex ids of the facet opposite `slot`.
    #[must_use]
    pub fn facet_key(&self, slot: usize) -> [VertexId; 3] {
        let mut key = [0; 3];
        let mut k = 0;
        for (i, &v) in self.vertices.iter().enumerate() {
            if i != slot {
                key[k] = v;
                k += 1;
            }
        }
        key.sort_unstable();
        key
    }
}

// =============================================================================
// TDS
// =============================================================================

/// Triangulation data structure: vertices, cells and adjacency.
#[derive(Clone, Debug, Default)]
pub struct Tds {
    vertices: Vec<EngineVertex>,
    cells: StorageMap<CellKey, Cell>,
    hint: Option<CellKey>,
}

impl Tds {
    /// Creates an empty triangulation over the given vertices.
    #[must_use]
    pub fn new(vertices: Vec<EngineVertex>) -> Self {
        Self {
            vertices,
            cells: StorageMap::with_key(),
            hint: None,
        }
    }

    /// Number of engine vertices (inserted or not).
    #[must_use]
    pub const fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Engine vertex by id.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&EngineVertex> {
        self.vertices.get(id as usize)
    }

    /// Position of a finite vertex.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a finite vertex id of this triangulation.
    #[must_use]
    pub fn point(&self, id: VertexId) -> &GridPoint {
        &self.vertices[id as usize].point
    }

    /// Position and perturbation rank of a finite vertex.
    #[must_use]
    pub fn ranked(&self, id: VertexId) -> RankedPoint<'_> {
        let v = &self.vertices[id as usize];
        RankedPoint {
            point: &v.point,
            rank: v.rank,
        }
    }

    /// Orientation of `vertices` with the vertex at `slot` replaced by `p`.
    ///
    /// The remaining three vertices must be finite.
    #[must_use]
    pub fn orientation_replacing(
        &self,
        vertices: &[VertexId; 4],
        slot: usize,
        p: VertexId,
    ) -> Orientation {
        let mut ids = *vertices;
        ids[slot] = p;
        orient3d(
            self.point(ids[0]),
            self.point(ids[1]),
            self.point(ids[2]),
            self.point(ids[3]),
        )
    }

    /// Number of stored cells, ghosts included.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of finite cells.
    #[must_use]
    pub fn number_of_finite_cells(&self) -> usize {
        self.cells.values().filter(|c| !c.is_ghost()).count()
    }

    /// Cell by key.
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// All cells, ghosts included, in storage order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cells.iter()
    }

    /// Finite cells in storage order.
    pub fn finite_cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cells.iter().filter(|(_, c)| !c.is_ghost())
    }

    /// Adds a cell without neighbors.
    pub fn insert_cell(&mut self, vertices: [VertexId; 4]) -> CellKey {
        self.cells.insert(Cell::new(vertices))
    }

    /// Removes a cell. Neighbor links pointing at it are left dangling.
    pub fn remove_cell(&mut self, key: CellKey) -> Option<Cell> {
        if self.hint == Some(key) {
            self.hint = None;
        }
        self.cells.remove(key)
    }

    /// Sets `neighbors[facet]` of `key`.
    pub fn set_neighbor(&mut self, key: CellKey, facet: usize, neighbor: Option<CellKey>) {
        if let Some(cell) = self.cells.get_mut(key) {
            cell.neighbors[facet] = neighbor;
        }
    }

    /// Links `a` across facet `fa` with `b` across facet `fb`.
    pub fn link(&mut self, a: CellKey, fa: usize, b: CellKey, fb: usize) {
        self.set_neighbor(a, fa, Some(b));
        self.set_neighbor(b, fb, Some(a));
    }

    /// The neighbor across `facet` and the index of the shared facet in it.
    #[must_use]
    pub fn mirror_facet(&self, key: CellKey, facet: usize) -> Option<(CellKey, usize)> {
        let cell = self.cells.get(key)?;
        let neighbor_key = cell.neighbors[facet]?;
        let neighbor = self.cells.get(neighbor_key)?;
        let mirror = neighbor
            .vertices
            .iter()
            .position(|v| !cell.vertices.contains(v))?;
        Some((neighbor_key, mirror))
    }

    /// Walk start hint: a live cell near the last insertion.
    #[must_use]
    pub fn hint(&self) -> Option<CellKey> {
        self.hint
            .filter(|k| self.cells.contains_key(*k))
            .or_else(|| self.cells.keys().next())
    }

    /// Records the walk start hint.
    pub const fn set_hint(&mut self, key: CellKey) {
        self.hint = Some(key);
    }

    /// Drops every cell.
    pub fn clear_cells(&mut self) {
        self.cells.clear();
        self.hint = None;
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Checks that every facet has a neighbor, that links are mutual, and
    /// that linked cells share exactly the facet's three vertices.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate_neighbors(&self) -> Result<(), TdsValidationError> {
        for (key, cell) in &self.cells {
            for facet in 0..4 {
                let Some(neighbor_key) = cell.neighbors[facet] else {
                    return Err(TdsValidationError::MissingNeighbor {
                        cell: key,
                        facet: facet as FacetIndex,
                    });
                };
                let Some(neighbor) = self.cells.get(neighbor_key) else {
                    return Err(TdsValidationError::InvalidNeighbors {
                        message: format!("neighbor {neighbor_key:?} of {key:?} does not exist"),
                    });
                };
                let Some((_, mirror)) = self.mirror_facet(key, facet) else {
                    return Err(TdsValidationError::InvalidNeighbors {
                        message: format!("{key:?} and {neighbor_key:?} share all vertices"),
                    });
                };
                if neighbor.neighbors[mirror] != Some(key) {
                    return Err(TdsValidationError::InvalidNeighbors {
                        message: format!("neighbor relationship not mutual: {key:?} → {neighbor_key:?}"),
                    });
                }
                if cell.facet_key(facet) != neighbor.facet_key(mirror) {
                    return Err(TdsValidationError::InvalidNeighbors {
                        message: format!("{key:?} and {neighbor_key:?} do not share facet {facet}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that every finite cell is positively oriented.
    ///
    /// # Errors
    ///
    /// Returns [`TdsValidationError::BadOrientation`] for the first bad cell.
    pub fn validate_orientation(&self) -> Result<(), TdsValidationError> {
        for (key, cell) in self.finite_cells() {
            let [a, b, c, d] = cell.vertices;
            let orientation = orient3d(self.point(a), self.point(b), self.point(c), self.point(d));
            if orientation != Orientation::POSITIVE {
                return Err(TdsValidationError::BadOrientation {
                    cell: key,
                    orientation,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
