//! The 3D Delaunay engine, with optional periodic boundary conditions.
//!
//! [`PeriodicDelaunay3d`] is configured, loaded with a flat coordinate buffer,
//! computed once, and then queried cell by cell.
//!
//! # Periodic mode
//!
//! The domain is a cube with opposite faces identified. The engine
//! triangulates the point set together with its 26 translates by one period
//! (the 3³ image-point method) and keeps, for each cell of the torus, the one
//! copy whose lexicographically smallest vertex offset is `(0, 0, 0)`. Each
//! kept cell must have its circumscribed ball inside the covered region
//! `[-1, 2)³` and the kept cells must tile exactly one period; otherwise the
//! point set is too sparse and [`compute`](PeriodicDelaunay3d::compute) fails
//! with [`EngineFault::InsufficientPeriodicCover`].
//!
//! # Examples
//!
//! ```rust
//! use periodic_delaunay::core::options::PeriodicityMode;
//! use periodic_delaunay::core::periodic_delaunay::PeriodicDelaunay3d;
//!
//! let mut engine = PeriodicDelaunay3d::new(PeriodicityMode::NonPeriodic);
//! engine
//!     .set_vertices(4, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
//!     .unwrap();
//! engine.compute().unwrap();
//! assert_eq!(engine.nb_cells(), 1);
//! let mut corners: Vec<usize> = (0..4).map(|k| engine.cell_vertex(0, k)).collect();
//! corners.sort_unstable();
//! assert_eq!(corners, vec![0, 1, 2, 3]);
//! ```

use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::incremental_insertion::{InsertionError, triangulate_in_order};
use crate::core::algorithms::locate::LocateError;
use crate::core::collections::{FastHashMap, fast_hash_map_with_capacity};
use crate::core::lifecycle::{self, EngineContext, IMAGE_COUNT};
use crate::core::options::{PeriodicityMode, TriangulationOptions};
use crate::core::traits::cell_complex::CellComplex;
use crate::core::triangulation_data_structure::{CellKey, EngineVertex, Tds, VertexId};
use crate::core::util::delaunay_validation::{DelaunayValidationError, validate_delaunay};
use crate::core::util::hilbert::hilbert_sorted_indices;
use crate::geometry::point::{GRID_SCALE, GridPoint};
use crate::geometry::predicates::orient3d_value;
use crate::geometry::util::circumsphere;

/// Largest number of input points: all 27 images must get distinct `u32` ids.
pub const MAX_VERTICES: usize = (u32::MAX as usize - 1) / IMAGE_COUNT;

/// Fewest distinct points that can span a tetrahedron.
pub const MIN_POINTS: usize = 4;

/// Slack kept between a circumball and the edge of the periodic cover.
const COVER_MARGIN: f64 = 1e-9;

// =============================================================================
// ERRORS
// =============================================================================

/// Faults raised by the engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineFault {
    /// `compute()` was called before `set_vertices()`.
    #[error("compute() called before set_vertices()")]
    VerticesNotSet,

    /// The buffer holds fewer than `3 * count` values.
    #[error("vertex buffer holds {actual} coordinates, {expected} required")]
    CoordinateCountMismatch {
        /// `3 * count`
        expected: usize,
        /// Buffer length
        actual: usize,
    },

    /// More points than the engine can index.
    #[error("{count} vertices exceed the engine limit of {max}")]
    TooManyVertices {
        /// Requested count
        count: usize,
        /// Supported maximum
        max: usize,
    },

    /// A coordinate is non-finite, or outside `[0, period)` in periodic mode.
    #[error("coordinate {index} has invalid value {value}")]
    InvalidCoordinate {
        /// Position in the flat buffer
        index: usize,
        /// Offending value
        value: f64,
    },

    /// The period is not a positive finite cube.
    #[error("unsupported period {period:?}; periods must be equal, positive and finite")]
    InvalidPeriod {
        /// The configured period
        period: [f64; 3],
    },

    /// Point location failed.
    #[error("point location failed after {steps} steps")]
    LocateFailed {
        /// Walk steps taken
        steps: usize,
    },

    /// A conflict region had no boundary.
    #[error("cavity of vertex {vertex} has an empty boundary")]
    CavityBoundaryEmpty {
        /// Engine vertex id
        vertex: usize,
    },

    /// Cavity retriangulation produced inconsistent adjacency.
    #[error("neighbor wiring failed: {message}")]
    NeighborWiring {
        /// Details
        message: String,
    },

    /// A periodic cell is not certified by the 27 copies.
    #[error("cell {cell} is not covered by the periodic images; the point set is too sparse")]
    InsufficientPeriodicCover {
        /// Index of the offending emitted cell (or the cell count for a volume mismatch)
        cell: usize,
    },

    /// The opt-in verification found a non-empty circumsphere.
    #[error("cell {cell} violates the Delaunay property")]
    DelaunayViolation {
        /// Index of the emitted cell
        cell: usize,
    },

    /// The engine panicked; recovered at the driver boundary.
    #[error("engine panicked: {message}")]
    Panicked {
        /// Panic payload
        message: String,
    },
}

impl From<InsertionError> for EngineFault {
    fn from(err: InsertionError) -> Self {
        match err {
            InsertionError::Location(LocateError::CycleDetected { steps }) => {
                Self::LocateFailed { steps }
            }
            InsertionError::Location(_) => Self::LocateFailed { steps: 0 },
            InsertionError::CavityBoundaryEmpty { vertex } => Self::CavityBoundaryEmpty {
                vertex: vertex as usize,
            },
            InsertionError::ConflictRegion(e) => Self::NeighborWiring {
                message: e.to_string(),
            },
            InsertionError::CavityFilling { message } | InsertionError::NeighborWiring { message } => {
                Self::NeighborWiring { message }
            }
        }
    }
}

// =============================================================================
// PERIODIC VERTEX
// =============================================================================

/// A cell corner in the periodic cover: an input index plus the whole-period
/// translation of that point used by the cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodicVertex {
    /// Index into the caller's input points.
    pub index: usize,
    /// Translation in periods, each component in `{-1, 0, 1}`.
    pub offset: [i8; 3],
}

impl PeriodicVertex {
    /// Creates a periodic vertex.
    #[must_use]
    pub const fn new(index: usize, offset: [i8; 3]) -> Self {
        Self { index, offset }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// A 3D Delaunay tetrahedralization engine instance.
#[derive(Debug, Clone, Default)]
pub struct PeriodicDelaunay3d {
    options: TriangulationOptions,
    coords: Option<Vec<f64>>,
    nb_vertices: usize,
    nb_duplicates: usize,
    cells: Vec<[PeriodicVertex; 4]>,
    incident: Option<Vec<Vec<usize>>>,
}

impl PeriodicDelaunay3d {
    /// Creates an engine for the given mode with default options.
    #[must_use]
    pub fn new(mode: PeriodicityMode) -> Self {
        Self::with_options(TriangulationOptions {
            mode,
            ..TriangulationOptions::default()
        })
    }

    /// Creates an engine with explicit options.
    #[must_use]
    pub fn with_options(options: TriangulationOptions) -> Self {
        tracing::debug!(?options.mode, "created triangulation handle");
        Self {
            options,
            ..Self::default()
        }
    }

    /// The configured options.
    #[must_use]
    pub const fn options(&self) -> &TriangulationOptions {
        &self.options
    }

    /// Returns `true` in periodic mode.
    #[must_use]
    pub const fn is_periodic(&self) -> bool {
        self.options.mode.is_periodic()
    }

    /// Enables or disables incident-cell bookkeeping for the next `compute()`.
    pub const fn set_stores_cicl(&mut self, stores: bool) {
        self.options.stores_cicl = stores;
    }

    /// Whether incident-cell bookkeeping is enabled.
    #[must_use]
    pub const fn stores_cicl(&self) -> bool {
        self.options.stores_cicl
    }

    /// Loads `count` points from `coords` (`x0 y0 z0 x1 …`).
    ///
    /// Values past `3 * count` are ignored. Any previous result is discarded.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is too short, the count is too large, the period
    /// is unsupported, or a coordinate is non-finite (or outside
    /// `[0, period)` in periodic mode).
    pub fn set_vertices(&mut self, count: usize, coords: &[f64]) -> Result<(), EngineFault> {
        if count > MAX_VERTICES {
            return Err(EngineFault::TooManyVertices {
                count,
                max: MAX_VERTICES,
            });
        }
        let expected = 3 * count;
        if coords.len() < expected {
            return Err(EngineFault::CoordinateCountMismatch {
                expected,
                actual: coords.len(),
            });
        }
        let period = self.period()?;
        for (index, &value) in coords[..expected].iter().enumerate() {
            let in_domain = match period {
                Some(p) => (0.0..p).contains(&value),
                None => value.is_finite(),
            };
            if !in_domain {
                return Err(EngineFault::InvalidCoordinate { index, value });
            }
        }

        self.coords = Some(coords[..expected].to_vec());
        self.nb_vertices = count;
        self.nb_duplicates = 0;
        self.cells.clear();
        self.incident = None;
        tracing::debug!(count, periodic = self.is_periodic(), "loaded vertices");
        Ok(())
    }

    /// The cubic period, validated.
    fn period(&self) -> Result<Option<f64>, EngineFault> {
        match self.options.mode {
            PeriodicityMode::NonPeriodic => Ok(None),
            PeriodicityMode::Periodic { period } => {
                let p = period[0];
                if p.is_finite() && p > 0.0 && period.iter().all(|&q| q == p) {
                    Ok(Some(p))
                } else {
                    Err(EngineFault::InvalidPeriod { period })
                }
            }
        }
    }

    /// Runs the triangulation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineFault::VerticesNotSet`] if nothing was loaded, or the
    /// fault that stopped construction or verification.
    pub fn compute(&mut self) -> Result<(), EngineFault> {
        let ctx = lifecycle::ensure_initialized();
        let coords = self.coords.as_deref().ok_or(EngineFault::VerticesNotSet)?;
        let period = self.period()?;

        let snapped = snap_points(coords, period)?;
        let (unique, duplicates) = deduplicate(&snapped);
        if duplicates > 0 {
            tracing::debug!(duplicates, "merged coincident points");
        }

        let periodic = period.is_some();
        let mut cells = Vec::new();

        if unique.len() >= MIN_POINTS {
            let vertices = engine_vertices(ctx, &snapped, &unique, periodic);
            let mut tds = Tds::new(vertices);
            let order = insertion_order(&tds, self.options.spatial_sort);
            if triangulate_in_order(&mut tds, &order)? {
                let keys = if periodic {
                    extract_periodic(&tds, &mut cells)?
                } else {
                    extract_euclidean(&tds, &mut cells)
                };
                if self.options.check_delaunay {
                    verify_delaunay(&tds, &keys)?;
                }
            }
        }

        self.nb_duplicates = duplicates;
        self.incident = self
            .options
            .stores_cicl
            .then(|| incident_lists(&cells, self.nb_vertices));
        self.cells = cells;

        tracing::info!(
            vertices = self.nb_vertices,
            cells = self.cells.len(),
            periodic,
            "triangulation computed"
        );
        Ok(())
    }

    /// Number of loaded input points, duplicates included.
    #[must_use]
    pub const fn nb_vertices(&self) -> usize {
        self.nb_vertices
    }

    /// Number of input points merged into an earlier coincident point.
    #[must_use]
    pub const fn nb_duplicates(&self) -> usize {
        self.nb_duplicates
    }

    /// Number of emitted cells.
    #[must_use]
    pub fn nb_cells(&self) -> usize {
        self.cells.len()
    }

    /// Input index of `corner` of `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell >= nb_cells()` or `corner >= 4`.
    #[must_use]
    pub fn cell_vertex(&self, cell: usize, corner: usize) -> usize {
        self.cells[cell][corner].index
    }

    /// Corner of `cell` with its periodic offset.
    ///
    /// # Panics
    ///
    /// Panics if `cell >= nb_cells()` or `corner >= 4`.
    #[must_use]
    pub fn cell_periodic_vertex(&self, cell: usize, corner: usize) -> PeriodicVertex {
        self.cells[cell][corner]
    }

    /// All emitted cells with periodic offsets.
    #[must_use]
    pub fn periodic_cells(&self) -> &[[PeriodicVertex; 4]] {
        &self.cells
    }

    /// Cells incident to input point `vertex`, if bookkeeping was enabled.
    #[must_use]
    pub fn incident_cells(&self, vertex: usize) -> Option<&[usize]> {
        self.incident
            .as_ref()
            .and_then(|lists| lists.get(vertex))
            .map(Vec::as_slice)
    }
}

impl CellComplex for PeriodicDelaunay3d {
    fn nb_vertices(&self) -> usize {
        self.nb_vertices
    }

    fn nb_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_vertex(&self, cell: usize, corner: usize) -> usize {
        self.cells[cell][corner].index
    }
}

// =============================================================================
// PIPELINE STAGES
// =============================================================================

/// Snap every point to the lattice.
///
/// Periodic coordinates are divided by the period and folded into `[0, 1)`.
/// Non-periodic coordinates are translated and uniformly scaled into the unit
/// cube, which does not change the Delaunay triangulation.
fn snap_points(coords: &[f64], period: Option<f64>) -> Result<Vec<GridPoint>, EngineFault> {
    let (origin, scale) = if let Some(p) = period {
        ([0.0; 3], p)
    } else {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for point in coords.chunks_exact(3) {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(point[axis]);
                hi[axis] = hi[axis].max(point[axis]);
            }
        }
        let extent = (0..3).map(|a| hi[a] - lo[a]).fold(0.0_f64, f64::max);
        (lo, if extent > 0.0 { extent } else { 1.0 })
    };

    coords
        .chunks_exact(3)
        .enumerate()
        .map(|(i, point)| {
            let unit = [0, 1, 2].map(|axis| (point[axis] - origin[axis]) / scale);
            let snapped = GridPoint::snap(unit).ok_or_else(|| {
                let axis = (0..3)
                    .find(|&a| GridPoint::snap([unit[a], 0.0, 0.0]).is_none())
                    .unwrap_or(0);
                EngineFault::InvalidCoordinate {
                    index: 3 * i + axis,
                    value: point[axis],
                }
            })?;
            Ok(if period.is_some() { snapped.wrapped() } else { snapped })
        })
        .collect()
}

/// Input indices of the first occurrence of each lattice point, and the
/// number of later repeats.
fn deduplicate(points: &[GridPoint]) -> (Vec<usize>, usize) {
    let mut first_seen: FastHashMap<GridPoint, usize> = fast_hash_map_with_capacity(points.len());
    let mut unique = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if let Entry::Vacant(slot) = first_seen.entry(*p) {
            slot.insert(i);
            unique.push(i);
        }
    }
    let duplicates = points.len() - unique.len();
    (unique, duplicates)
}

/// Engine vertices: the unique points, or all 27 images of them.
///
/// Image `code` of unique point `j` gets id `code · U + j`. Its perturbation
/// rank `27 · input_index + code` orders images of one point like their
/// offsets, so ranks compare the same way after any whole-period shift.
fn engine_vertices(
    ctx: &EngineContext,
    snapped: &[GridPoint],
    unique: &[usize],
    periodic: bool,
) -> Vec<EngineVertex> {
    let image = |i: usize, code: usize, offset: [i8; 3]| EngineVertex {
        point: snapped[i].translated(offset),
        rank: (i * IMAGE_COUNT + code) as u64,
        origin: i as u32,
        offset,
    };
    let image = &image;
    if periodic {
        ctx.image_offsets()
            .iter()
            .enumerate()
            .flat_map(|(code, &offset)| unique.iter().map(move |&i| image(i, code, offset)))
            .collect()
    } else {
        unique.iter().map(|&i| image(i, EngineContext::ZERO_OFFSET_INDEX, [0; 3])).collect()
    }
}

fn insertion_order(tds: &Tds, spatial_sort: bool) -> Vec<VertexId> {
    let n = tds.number_of_vertices();
    if spatial_sort {
        let points: Vec<GridPoint> = (0..n as VertexId).map(|v| *tds.point(v)).collect();
        hilbert_sorted_indices(&points)
            .into_iter()
            .map(|i| i as VertexId)
            .collect()
    } else {
        (0..n as VertexId).collect()
    }
}

fn corners(tds: &Tds, vertices: &[VertexId; 4]) -> Option<[EngineVertex; 4]> {
    let [a, b, c, d] = vertices.map(|v| tds.vertex(v).copied());
    Some([a?, b?, c?, d?])
}

fn extract_euclidean(tds: &Tds, out: &mut Vec<[PeriodicVertex; 4]>) -> Vec<CellKey> {
    let mut keys = Vec::new();
    for (key, cell) in tds.finite_cells() {
        if let Some(vs) = corners(tds, &cell.vertices) {
            out.push(vs.map(|v| PeriodicVertex::new(v.origin as usize, [0; 3])));
            keys.push(key);
        }
    }
    keys
}

/// Keep one representative per torus cell and certify it.
fn extract_periodic(
    tds: &Tds,
    out: &mut Vec<[PeriodicVertex; 4]>,
) -> Result<Vec<CellKey>, EngineFault> {
    let mut keys = Vec::new();
    let mut six_volume: i128 = 0;

    for (key, cell) in tds.finite_cells() {
        let Some(vs) = corners(tds, &cell.vertices) else {
            continue;
        };
        if vs.iter().map(|v| v.offset).min() != Some([0; 3]) {
            continue;
        }

        let index = out.len();
        let unit = vs.map(|v| v.point.to_unit());
        let covered = circumsphere(&unit).is_ok_and(|(center, radius)| {
            center.iter().all(|&c| {
                c - radius > -1.0 + COVER_MARGIN && c + radius < 2.0 - COVER_MARGIN
            })
        });
        if !covered {
            tracing::warn!(cell = index, "circumball leaves the periodic cover");
            return Err(EngineFault::InsufficientPeriodicCover { cell: index });
        }

        six_volume += orient3d_value(&vs[0].point, &vs[1].point, &vs[2].point, &vs[3].point);
        out.push(vs.map(|v| PeriodicVertex::new(v.origin as usize, v.offset)));
        keys.push(key);
    }

    // The representatives tile one period exactly.
    let cube = i128::from(GRID_SCALE);
    if six_volume != 6 * cube * cube * cube {
        tracing::warn!(cells = out.len(), "periodic cells do not tile the domain");
        return Err(EngineFault::InsufficientPeriodicCover { cell: out.len() });
    }
    Ok(keys)
}

fn verify_delaunay(tds: &Tds, keys: &[CellKey]) -> Result<(), EngineFault> {
    let all: Vec<VertexId> = (0..tds.number_of_vertices() as VertexId).collect();
    validate_delaunay(tds, keys.iter().copied(), &all).map_err(|err| {
        let DelaunayValidationError::DelaunayViolation { cell_key, .. } = err;
        let cell = keys.iter().position(|&k| k == cell_key).unwrap_or(keys.len());
        tracing::error!(cell, "Delaunay verification failed");
        EngineFault::DelaunayViolation { cell }
    })
}

fn incident_lists(cells: &[[PeriodicVertex; 4]], nb_vertices: usize) -> Vec<Vec<usize>> {
    let mut lists = vec![Vec::new(); nb_vertices];
    for (c, cell) in cells.iter().enumerate() {
        for v in cell {
            if let Some(list) = lists.get_mut(v.index) {
                if list.last() != Some(&c) {
                    list.push(c);
                }
            }
        }
    }
    lists
}

// =============================================================================
// TESTS
// =============================================================================
