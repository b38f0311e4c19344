//! The request pipeline: initialize, normalize, triangulate, materialize.
//!
//! # Examples
//!
//! ```rust
//! use periodic_delaunay::core::pipeline::compute_delaunay;
//!
//! let points = [
//!     0.0, 0.0, 0.0, //
//!     1.0, 0.0, 0.0, //
//!     0.0, 1.0, 0.0, //
//!     0.0, 0.0, 1.0,
//! ];
//! // Coordinates are wrapped into [0, 1) in both modes: 1.0 becomes 0.0 and
//! // all four points collapse onto the origin.
//! let cells = compute_delaunay(&points, 4, false).unwrap();
//! assert!(cells.is_empty());
//!
//! let points = [0.1, 0.1, 0.1, 0.9, 0.1, 0.1, 0.1, 0.9, 0.1, 0.1, 0.1, 0.9];
//! let cells = compute_delaunay(&points, 4, false).unwrap();
//! assert_eq!(cells.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::driver::{TriangulationError, triangulate_with_options};
use crate::core::lifecycle;
use crate::core::materialize::{MaterializeError, Tetrahedron, try_materialize};
use crate::core::normalize::{InputError, normalize};
use crate::core::options::TriangulationOptions;

/// Why a request produced no tetrahedra.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DelaunayError {
    /// The caller's input is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The engine failed.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),

    /// The engine reported an index outside the input.
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

impl DelaunayError {
    /// Returns `true` for engine-side failures, as opposed to bad input.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }
}

/// Delaunay tetrahedralization of `num_points` points read from `points`.
///
/// Coordinates are first wrapped into `[0, 1)`. With `is_periodic` the unit
/// cube is treated as a 3-torus.
///
/// # Errors
///
/// [`DelaunayError::InvalidInput`] for malformed input, otherwise the engine
/// fault.
pub fn compute_delaunay(
    points: &[f64],
    num_points: usize,
    is_periodic: bool,
) -> Result<Vec<Tetrahedron>, DelaunayError> {
    compute_delaunay_with_options(points, num_points, TriangulationOptions::for_flag(is_periodic))
}

/// [`compute_delaunay`] with explicit options.
///
/// # Errors
///
/// See [`compute_delaunay`].
pub fn compute_delaunay_with_options(
    points: &[f64],
    num_points: usize,
    options: TriangulationOptions,
) -> Result<Vec<Tetrahedron>, DelaunayError> {
    lifecycle::ensure_initialized();
    let normalized = normalize(points, num_points)?;
    let triangulation = triangulate_with_options(&normalized, options)?;
    let cells = try_materialize(&triangulation.view())?;
    tracing::debug!(cells = cells.len(), "materialized tetrahedra");
    Ok(cells)
}

/// [`compute_delaunay`] returning a JSON value: an array of index
/// quadruples, or `null` when the engine fails.
///
/// # Errors
///
/// Only malformed input is an error.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::pipeline::compute_delaunay_value;
/// use serde_json::json;
///
/// assert_eq!(compute_delaunay_value(&[], 0, true).unwrap(), json!([]));
/// assert!(compute_delaunay_value(&[0.5], 1, true).is_err());
/// ```
pub fn compute_delaunay_value(
    points: &[f64],
    num_points: usize,
    is_periodic: bool,
) -> Result<Value, InputError> {
    match compute_delaunay(points, num_points, is_periodic) {
        Ok(cells) => Ok(Value::from(
            cells
                .into_iter()
                .map(|tet| Value::from(tet.to_vec()))
                .collect::<Vec<_>>(),
        )),
        Err(DelaunayError::InvalidInput(err)) => Err(err),
        Err(err) => {
            tracing::warn!(%err, "returning null for failed triangulation");
            Ok(Value::Null)
        }
    }
}

/// A triangulation request in serializable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelaunayRequest {
    /// Flat coordinate buffer.
    pub points: Vec<f64>,
    /// Number of points to read.
    pub num_points: usize,
    /// Treat the unit cube as a 3-torus.
    #[serde(default)]
    pub is_periodic: bool,
}

impl DelaunayRequest {
    /// Run the request.
    #[must_use]
    pub fn execute(&self) -> DelaunayResponse {
        match compute_delaunay(&self.points, self.num_points, self.is_periodic) {
            Ok(tetrahedra) => DelaunayResponse::Success { tetrahedra },
            Err(DelaunayError::InvalidInput(err)) => DelaunayResponse::InvalidInput {
                message: err.to_string(),
            },
            Err(err) => DelaunayResponse::Fault {
                message: err.to_string(),
            },
        }
    }
}

/// Outcome of a [`DelaunayRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DelaunayResponse {
    /// The tetrahedra, possibly none.
    Success {
        /// Index quadruples
        tetrahedra: Vec<Tetrahedron>,
    },
    /// The request was malformed.
    InvalidInput {
        /// Description
        message: String,
    },
    /// The engine failed.
    Fault {
        /// Description
        message: String,
    },
}
