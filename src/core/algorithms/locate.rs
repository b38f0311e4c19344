//! Point location and conflict regions.
//!
//! Implements the visibility walk for locating a vertex and the breadth-first
//! search that collects every cell whose circumsphere contains it.
//!
//! # Algorithm
//!
//! The walk starts from a hint cell and repeatedly crosses a facet whose
//! supporting plane separates the cell from the query point. On a Delaunay
//! triangulation this walk cannot cycle. Reaching a ghost cell means the point
//! lies beyond that hull facet.
//!
//! # References
//!
//! - O. Devillers, S. Pion, and M. Teillaud, "Walking in a Triangulation",
//!   International Journal of Foundations of Computer Science, 2001.
//! - CGAL Triangulation_3 documentation

use crate::core::collections::{
    CavityBoundaryBuffer, ConflictCellBuffer, FacetIndex, FastHashMap, SmallBuffer,
};
use crate::core::triangulation_data_structure::{CellKey, Tds, VertexId};
use crate::geometry::predicates::{InSphere, Orientation, insphere_sos};

/// Result of point location query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateResult {
    /// The point lies in the closed finite cell.
    InsideCell(CellKey),
    /// The point lies strictly beyond the hull facet of this ghost cell.
    Outside(CellKey),
}

impl LocateResult {
    /// The located cell, finite or ghost.
    #[must_use]
    pub const fn cell(self) -> CellKey {
        match self {
            Self::InsideCell(key) | Self::Outside(key) => key,
        }
    }
}

/// Error during point location.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocateError {
    /// Triangulation has no cells
    #[error("Cannot locate in empty triangulation")]
    EmptyTriangulation,

    /// Cell reference is invalid
    #[error("Invalid cell reference: {cell_key:?}")]
    InvalidCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// Neither the walk nor the exhaustive scan found a cell.
    #[error("Point location failed after {steps} steps")]
    CycleDetected {
        /// Number of walk steps taken
        steps: usize,
    },
}

/// Error during conflict region finding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConflictError {
    /// Starting cell is invalid
    #[error("Invalid starting cell: {cell_key:?}")]
    InvalidStartCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// The located cell does not conflict with the point.
    #[error("Starting cell {cell_key:?} is not in conflict with vertex {vertex}")]
    StartNotInConflict {
        /// The located cell
        cell_key: CellKey,
        /// The vertex being inserted
        vertex: VertexId,
    },

    /// A neighbor link is missing.
    #[error("Cell {cell_key:?} has no neighbor across facet {facet}")]
    MissingNeighbor {
        /// The cell with the open facet
        cell_key: CellKey,
        /// Facet index
        facet: FacetIndex,
    },
}

/// Cells in conflict with a point plus the facets bounding them.
#[derive(Debug, Clone, Default)]
pub struct ConflictRegion {
    /// Cells to remove.
    pub cells: ConflictCellBuffer,
    /// `(cell in region, facet)` pairs whose neighbor is outside the region.
    pub boundary: CavityBoundaryBuffer,
}

// =============================================================================
// LOCATION
// =============================================================================

/// Locate vertex `p` by walking from `hint`.
///
/// # Errors
///
/// Returns [`LocateError::EmptyTriangulation`] if there are no cells, and
/// [`LocateError::CycleDetected`] if neither the walk nor the exhaustive
/// fallback scan succeeds.
pub fn locate(tds: &Tds, p: VertexId, hint: Option<CellKey>) -> Result<LocateResult, LocateError> {
    let start = hint
        .or_else(|| tds.hint())
        .ok_or(LocateError::EmptyTriangulation)?;
    let max_steps = 4 * tds.number_of_cells() + 64;

    let mut current = start;
    let cell = tds
        .cell(current)
        .ok_or(LocateError::InvalidCell { cell_key: current })?;
    if let Some(slot) = cell.infinite_slot() {
        current = cell.neighbors[slot].ok_or(LocateError::InvalidCell { cell_key: current })?;
    }

    // Rotating the first tested facet avoids always exiting the same way.
    let mut rotation = (p as usize) % 4;

    for _ in 0..max_steps {
        let cell = tds
            .cell(current)
            .ok_or(LocateError::InvalidCell { cell_key: current })?;

        let mut next = None;
        for k in 0..4 {
            let facet = (rotation + k) % 4;
            if tds.orientation_replacing(&cell.vertices, facet, p) == Orientation::NEGATIVE {
                next = cell.neighbors[facet];
                break;
            }
        }
        rotation = (rotation + 1) % 4;

        let Some(next) = next else {
            return Ok(LocateResult::InsideCell(current));
        };
        let neighbor = tds
            .cell(next)
            .ok_or(LocateError::InvalidCell { cell_key: next })?;
        if neighbor.is_ghost() {
            return Ok(LocateResult::Outside(next));
        }
        current = next;
    }

    tracing::debug!(vertex = p, max_steps, "walk exceeded step budget, scanning all cells");
    scan(tds, p).ok_or(LocateError::CycleDetected { steps: max_steps })
}

/// Exhaustive location: a finite cell containing `p`, or a ghost whose hull
/// facet sees `p`.
fn scan(tds: &Tds, p: VertexId) -> Option<LocateResult> {
    tds.cells().find_map(|(key, cell)| match cell.infinite_slot() {
        Some(slot) => (tds.orientation_replacing(&cell.vertices, slot, p) == Orientation::POSITIVE)
            .then_some(LocateResult::Outside(key)),
        None => (0..4)
            .all(|f| tds.orientation_replacing(&cell.vertices, f, p) != Orientation::NEGATIVE)
            .then_some(LocateResult::InsideCell(key)),
    })
}

// =============================================================================
// CONFLICT REGION
// =============================================================================

fn finite_conflict(tds: &Tds, vertices: &[VertexId; 4], p: VertexId) -> bool {
    let simplex = vertices.map(|v| tds.ranked(v));
    insphere_sos(simplex, tds.ranked(p)) == InSphere::INSIDE
}

/// Whether inserting `p` destroys the cell `key`.
///
/// A finite cell conflicts when `p` is inside its circumsphere. A ghost cell
/// conflicts when `p` is strictly beyond its hull facet; when `p` is coplanar
/// with that facet the ghost follows its finite neighbor, which tests `p`
/// against the facet's circumcircle.
///
/// # Errors
///
/// Returns an error if the cell or its finite neighbor is missing.
pub fn is_in_conflict(tds: &Tds, key: CellKey, p: VertexId) -> Result<bool, ConflictError> {
    let cell = tds
        .cell(key)
        .ok_or(ConflictError::InvalidStartCell { cell_key: key })?;
    let Some(slot) = cell.infinite_slot() else {
        return Ok(finite_conflict(tds, &cell.vertices, p));
    };
    match tds.orientation_replacing(&cell.vertices, slot, p) {
        Orientation::POSITIVE => Ok(true),
        Orientation::NEGATIVE => Ok(false),
        Orientation::DEGENERATE => {
            let neighbor_key = cell.neighbors[slot].ok_or(ConflictError::MissingNeighbor {
                cell_key: key,
                facet: slot as FacetIndex,
            })?;
            let neighbor = tds.cell(neighbor_key).ok_or(ConflictError::InvalidStartCell {
                cell_key: neighbor_key,
            })?;
            Ok(finite_conflict(tds, &neighbor.vertices, p))
        }
    }
}

/// Collect the conflict region of `p` by breadth-first search from `start`.
///
/// Each cell is tested at most once; facets between a region cell and a
/// non-conflicting neighbor form the cavity boundary.
///
/// # Errors
///
/// Returns [`ConflictError::StartNotInConflict`] if `start` does not conflict
/// with `p`, or a structural error if a neighbor link is broken.
pub fn find_conflict_region(
    tds: &Tds,
    p: VertexId,
    start: CellKey,
) -> Result<ConflictRegion, ConflictError> {
    if !is_in_conflict(tds, start, p)? {
        return Err(ConflictError::StartNotInConflict {
            cell_key: start,
            vertex: p,
        });
    }

    let mut region = ConflictRegion::default();
    let mut status: FastHashMap<CellKey, bool> = FastHashMap::default();
    let mut queue: SmallBuffer<CellKey, 64> = SmallBuffer::new();

    status.insert(start, true);
    queue.push(start);

    while let Some(key) = queue.pop() {
        region.cells.push(key);
        let cell = tds
            .cell(key)
            .ok_or(ConflictError::InvalidStartCell { cell_key: key })?;

        for facet in 0..4 {
            let neighbor = cell.neighbors[facet].ok_or(ConflictError::MissingNeighbor {
                cell_key: key,
                facet: facet as FacetIndex,
            })?;
            let in_conflict = match status.get(&neighbor) {
                Some(&known) => {
                    if known {
                        continue;
                    }
                    false
                }
                None => {
                    let conflict = is_in_conflict(tds, neighbor, p)?;
                    status.insert(neighbor, conflict);
                    if conflict {
                        queue.push(neighbor);
                    }
                    conflict
                }
            };
            if !in_conflict {
                region.boundary.push((key, facet as FacetIndex));
            }
        }
    }

    Ok(region)
}
