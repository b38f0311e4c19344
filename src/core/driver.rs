//! Running the engine on a normalized point set.
//!
//! The driver owns the failure boundary: an [`EngineFault`] or a panic inside
//! the engine comes back as [`TriangulationError::Engine`], never as an abort.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::core::lifecycle;
use crate::core::normalize::NormalizedPoints;
use crate::core::options::TriangulationOptions;
use crate::core::periodic_delaunay::{EngineFault, PeriodicDelaunay3d};
use crate::core::traits::cell_complex::CellComplex;

/// Why a triangulation produced no result.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationError {
    /// The engine rejected the points or failed while computing.
    #[error("triangulation engine fault: {0}")]
    Engine(#[from] EngineFault),
}

/// A computed triangulation. Owns the engine handle.
#[derive(Debug)]
pub struct Triangulation {
    handle: PeriodicDelaunay3d,
}

impl Triangulation {
    /// Read-only view of the cells.
    #[must_use]
    pub const fn view(&self) -> CellComplexView<'_> {
        CellComplexView {
            handle: &self.handle,
        }
    }

    /// Returns `true` if there are enough points but no cells.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.handle.nb_vertices() >= 4 && self.handle.nb_cells() == 0
    }

    /// The underlying engine handle.
    #[must_use]
    pub const fn handle(&self) -> &PeriodicDelaunay3d {
        &self.handle
    }
}

/// Borrowed view of a computed cell complex.
#[derive(Clone, Copy, Debug)]
pub struct CellComplexView<'a> {
    handle: &'a PeriodicDelaunay3d,
}

impl CellComplex for CellComplexView<'_> {
    fn nb_vertices(&self) -> usize {
        self.handle.nb_vertices()
    }

    fn nb_cells(&self) -> usize {
        self.handle.nb_cells()
    }

    fn cell_vertex(&self, cell: usize, corner: usize) -> usize {
        self.handle.cell_vertex(cell, corner)
    }
}

/// Triangulate `points` with default options; `periodic` selects the unit
/// torus.
///
/// # Errors
///
/// Returns [`TriangulationError::Engine`] on any engine fault or panic.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::driver::triangulate;
/// use periodic_delaunay::core::normalize::normalize;
/// use periodic_delaunay::core::traits::cell_complex::CellComplex;
///
/// let coords = [0.1, 0.1, 0.1, 0.9, 0.1, 0.1, 0.1, 0.9, 0.1, 0.1, 0.1, 0.9];
/// let points = normalize(&coords, 4).unwrap();
/// let triangulation = triangulate(&points, false).unwrap();
/// assert_eq!(triangulation.view().nb_cells(), 1);
/// ```
pub fn triangulate(
    points: &NormalizedPoints,
    periodic: bool,
) -> Result<Triangulation, TriangulationError> {
    triangulate_with_options(points, TriangulationOptions::for_flag(periodic))
}

/// Triangulate `points` with explicit options.
///
/// Incident-cell bookkeeping is always disabled here.
///
/// # Errors
///
/// Returns [`TriangulationError::Engine`] on any engine fault or panic.
pub fn triangulate_with_options(
    points: &NormalizedPoints,
    options: TriangulationOptions,
) -> Result<Triangulation, TriangulationError> {
    lifecycle::ensure_initialized();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut handle = PeriodicDelaunay3d::with_options(options);
        handle.set_stores_cicl(false);
        handle.set_vertices(points.len(), points.as_slice())?;
        handle.compute()?;
        Ok::<_, EngineFault>(handle)
    }));

    let handle = match outcome {
        Ok(Ok(handle)) => handle,
        Ok(Err(fault)) => {
            tracing::error!(%fault, "triangulation failed");
            return Err(fault.into());
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "triangulation engine panicked");
            return Err(EngineFault::Panicked { message }.into());
        }
    };

    let triangulation = Triangulation { handle };
    if triangulation.is_degenerate() {
        tracing::warn!(
            points = points.len(),
            "degenerate point set produced no cells"
        );
    }
    Ok(triangulation)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
