//! Incremental Delaunay insertion using the cavity (Bowyer–Watson) algorithm.
//!
//! Each insertion follows CGAL's approach:
//! 1. Locate the cell containing the new point (visibility walk)
//! 2. Find the conflict region (BFS with insphere tests)
//! 3. Fill the cavity with cells joining each boundary facet to the new point
//! 4. Wire neighbors locally through a facet map
//! 5. Remove the conflict cells
//!
//! Ghost cells take part in every step, so points outside the current hull
//! need no special treatment.

use crate::core::algorithms::locate::{
    ConflictError, LocateError, find_conflict_region, locate,
};
use crate::core::collections::{FacetIndex, FacetWiringMap, SmallBuffer};
use crate::core::triangulation_data_structure::{CellKey, INFINITE_VERTEX, Tds, VertexId};
use crate::geometry::predicates::{Orientation, collinear, orient3d};

/// Error during incremental insertion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InsertionError {
    /// Conflict region finding failed
    #[error("Conflict region error: {0}")]
    ConflictRegion(#[from] ConflictError),

    /// Point location failed
    #[error("Location error: {0}")]
    Location(#[from] LocateError),

    /// The conflict region has no boundary.
    #[error("Cavity of vertex {vertex} has an empty boundary")]
    CavityBoundaryEmpty {
        /// The vertex being inserted
        vertex: VertexId,
    },

    /// Cavity filling failed
    #[error("Cavity filling failed: {message}")]
    CavityFilling {
        /// Error message
        message: String,
    },

    /// Neighbor wiring failed
    #[error("Neighbor wiring failed: {message}")]
    NeighborWiring {
        /// Error message
        message: String,
    },
}

/// New cells created by one insertion.
pub type NewCellBuffer = SmallBuffer<CellKey, 64>;

// =============================================================================
// INITIAL SIMPLEX
// =============================================================================

/// Pick the first four affinely independent vertices of `order`.
///
/// Returns `None` when every vertex lies in a common plane.
#[must_use]
pub fn find_initial_simplex(tds: &Tds, order: &[VertexId]) -> Option<[VertexId; 4]> {
    let (&a, rest) = order.split_first()?;
    let pa = tds.point(a);
    let b = rest.iter().copied().find(|&v| tds.point(v) != pa)?;
    let pb = tds.point(b);
    let c = rest
        .iter()
        .copied()
        .find(|&v| v != b && !collinear(pa, pb, tds.point(v)))?;
    let pc = tds.point(c);
    let d = rest.iter().copied().find(|&v| {
        v != b && v != c && orient3d(pa, pb, pc, tds.point(v)) != Orientation::DEGENERATE
    })?;
    Some([a, b, c, d])
}

/// Create the first tetrahedron and its four ghost cells.
///
/// The tetrahedron is reoriented to be positive. Ghost `i` replaces vertex
/// `i` by the infinite vertex and swaps two finite vertices, so a point beyond
/// facet `i` completes it to a positive tetrahedron.
///
/// # Errors
///
/// Returns [`InsertionError::NeighborWiring`] if the five cells fail to close up.
pub fn create_initial_cells(
    tds: &mut Tds,
    seed: [VertexId; 4],
) -> Result<CellKey, InsertionError> {
    let [a, b, mut c, mut d] = seed;
    if orient3d(tds.point(a), tds.point(b), tds.point(c), tds.point(d)) == Orientation::NEGATIVE {
        std::mem::swap(&mut c, &mut d);
    }
    let base = [a, b, c, d];
    let root = tds.insert_cell(base);

    let mut keys: NewCellBuffer = SmallBuffer::new();
    keys.push(root);
    for i in 0..4 {
        let mut ghost = base;
        ghost[i] = INFINITE_VERTEX;
        let (j, k) = match i {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        ghost.swap(j, k);
        keys.push(tds.insert_cell(ghost));
    }

    let mut open = FacetWiringMap::default();
    for &key in &keys {
        wire_facets(tds, key, None, &mut open);
    }
    if !open.is_empty() {
        return Err(InsertionError::NeighborWiring {
            message: format!("{} facets of the initial simplex are unmatched", open.len()),
        });
    }

    tds.set_hint(root);
    tracing::trace!(?base, "created initial simplex");
    Ok(root)
}

// =============================================================================
// INSERTION
// =============================================================================

/// Links the facets of `key` (all except `skip`) with their twins in `open`,
/// or records them there until the twin shows up.
fn wire_facets(tds: &mut Tds, key: CellKey, skip: Option<usize>, open: &mut FacetWiringMap) {
    let Some(cell) = tds.cell(key).copied() else {
        return;
    };
    for facet in 0..4 {
        if Some(facet) == skip {
            continue;
        }
        let facet_key = cell.facet_key(facet);
        if let Some((twin, twin_facet)) = open.remove(&facet_key) {
            tds.link(key, facet, twin, usize::from(twin_facet));
        } else {
            open.insert(facet_key, (key, facet as FacetIndex));
        }
    }
}

/// Fill the cavity by joining each boundary facet to vertex `p`.
///
/// The new cell reuses the boundary cell's vertex order with the vertex
/// opposite the facet replaced by `p`, which keeps its orientation. It is
/// linked to the cell outside the cavity across that facet.
///
/// # Errors
///
/// Returns [`InsertionError::CavityFilling`] if a boundary facet has no
/// outside neighbor.
pub fn fill_cavity(
    tds: &mut Tds,
    p: VertexId,
    boundary: &[(CellKey, FacetIndex)],
) -> Result<NewCellBuffer, InsertionError> {
    let mut created = NewCellBuffer::new();
    for &(inside, facet) in boundary {
        let facet = usize::from(facet);
        let cell = tds
            .cell(inside)
            .copied()
            .ok_or_else(|| InsertionError::CavityFilling {
                message: format!("boundary cell {inside:?} is missing"),
            })?;
        let (outside, mirror) =
            tds.mirror_facet(inside, facet)
                .ok_or_else(|| InsertionError::CavityFilling {
                    message: format!("boundary facet {facet} of {inside:?} has no outside neighbor"),
                })?;

        let mut vertices = cell.vertices;
        vertices[facet] = p;
        let key = tds.insert_cell(vertices);
        tds.link(key, facet, outside, mirror);
        created.push(key);
    }
    Ok(created)
}

/// Wire the new cells to each other across the facets that contain `p`.
///
/// # Errors
///
/// Returns [`InsertionError::NeighborWiring`] if some facet does not have
/// exactly one twin among the new cells.
pub fn wire_cavity_neighbors(
    tds: &mut Tds,
    p: VertexId,
    new_cells: &[CellKey],
) -> Result<(), InsertionError> {
    let mut open = FacetWiringMap::default();
    for &key in new_cells {
        let apex = tds.cell(key).and_then(|c| c.index_of(p));
        wire_facets(tds, key, apex, &mut open);
    }
    if open.is_empty() {
        Ok(())
    } else {
        Err(InsertionError::NeighborWiring {
            message: format!(
                "{} cavity facets around vertex {p} are unmatched",
                open.len()
            ),
        })
    }
}

/// Insert vertex `p` into a triangulation that already has cells.
///
/// Returns the number of cells created.
///
/// # Errors
///
/// Propagates location and conflict errors, and reports broken cavities.
pub fn insert_vertex(tds: &mut Tds, p: VertexId) -> Result<usize, InsertionError> {
    let location = locate(tds, p, tds.hint())?;
    let region = find_conflict_region(tds, p, location.cell())?;
    if region.boundary.is_empty() {
        return Err(InsertionError::CavityBoundaryEmpty { vertex: p });
    }

    let created = fill_cavity(tds, p, &region.boundary)?;
    wire_cavity_neighbors(tds, p, &created)?;
    for &key in &region.cells {
        tds.remove_cell(key);
    }

    let hint = created
        .iter()
        .copied()
        .find(|&k| tds.cell(k).is_some_and(|c| !c.is_ghost()))
        .or_else(|| created.first().copied());
    if let Some(hint) = hint {
        tds.set_hint(hint);
    }

    tracing::trace!(
        vertex = p,
        removed = region.cells.len(),
        created = created.len(),
        "inserted vertex"
    );
    Ok(created.len())
}

/// Build the Delaunay triangulation of the vertices listed in `order`.
///
/// Returns `false`, leaving the triangulation empty, when the vertices are
/// coplanar.
///
/// # Errors
///
/// Propagates the first insertion failure.
pub fn triangulate_in_order(tds: &mut Tds, order: &[VertexId]) -> Result<bool, InsertionError> {
    tds.clear_cells();
    let Some(seed) = find_initial_simplex(tds, order) else {
        return Ok(false);
    };
    create_initial_cells(tds, seed)?;
    for &v in order {
        if !seed.contains(&v) {
            insert_vertex(tds, v)?;
        }
    }
    Ok(true)
}

// =============================================================================
// TESTS
// =============================================================================
