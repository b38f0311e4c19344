//! # periodic-delaunay
//!
//! Delaunay tetrahedralization of 3D point sets, either ordinary (bounded by
//! the convex hull) or periodic on the unit cube, where opposite faces are
//! identified and the result is a triangulation of the flat 3-torus.
//!
//! # Basic Usage
//!
//! ```rust
//! use periodic_delaunay::prelude::*;
//!
//! let points = [
//!     0.1, 0.1, 0.1, //
//!     0.9, 0.1, 0.1, //
//!     0.1, 0.9, 0.1, //
//!     0.1, 0.1, 0.9, //
//!     0.25, 0.25, 0.25,
//! ];
//!
//! let cells = compute_delaunay(&points, 5, false).unwrap();
//! assert_eq!(cells.len(), 4);
//! assert!(cells.iter().flatten().all(|&i| i < 5));
//! ```
//!
//! Every request runs four stages in order:
//!
//! 1. [`core::lifecycle::ensure_initialized`] sets up the process-wide engine
//!    context once.
//! 2. [`core::normalize::normalize`] wraps every coordinate into `[0, 1)`.
//! 3. [`core::driver::triangulate`] runs the engine under a failure boundary.
//! 4. [`core::materialize::materialize`] copies the cells out as index
//!    quadruples.
//!
//! # Periodic Triangulations
//!
//! In periodic mode the engine triangulates the 27 translates of the point
//! set by `{-1, 0, 1}³` and keeps one representative of every cell of the
//! torus. Cells may then connect points across the cube faces:
//!
//! ```rust
//! use periodic_delaunay::prelude::*;
//!
//! let mut engine = PeriodicDelaunay3d::new(PeriodicityMode::unit_periodic());
//! let coords: Vec<f64> = (0..64)
//!     .flat_map(|i| {
//!         let (x, y, z) = (i % 4, (i / 4) % 4, i / 16);
//!         [
//!             0.25 * f64::from(x) + 0.01 * f64::from(y),
//!             0.25 * f64::from(y) + 0.01 * f64::from(z),
//!             0.25 * f64::from(z) + 0.01 * f64::from(x),
//!         ]
//!     })
//!     .collect();
//! engine.set_vertices(64, &coords).unwrap();
//! engine.compute().unwrap();
//! assert!(engine.nb_cells() > 0);
//! ```
//!
//! # Correctness
//!
//! Coordinates are snapped to a lattice of spacing `2^-36`, after which every
//! orientation and insphere sign is computed exactly in integer arithmetic.
//! Cospherical configurations are resolved by symbolic perturbation, so the
//! result is unique and independent of insertion order.
//!
//! Faults inside the engine, including panics, are reported as
//! [`core::driver::TriangulationError`]; invalid input shape is reported as
//! [`core::normalize::InputError`].

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Engine data structures, algorithms, and the request pipeline.
pub mod core {
    /// Construction algorithms
    pub mod algorithms {
        /// Incremental cavity-based insertion
        pub mod incremental_insertion;
        /// Point location and conflict regions
        pub mod locate;
    }
    /// Collection aliases used by the engine
    pub mod collections;
    pub mod driver;
    pub mod lifecycle;
    pub mod materialize;
    pub mod normalize;
    pub mod options;
    pub mod periodic_delaunay;
    pub mod pipeline;
    /// Cell storage and adjacency
    pub mod triangulation_data_structure;
    /// Traits shared by result types.
    pub mod traits {
        pub mod cell_complex;
        pub use cell_complex::*;
    }
    /// Validation and ordering helpers
    pub mod util {
        /// Brute-force empty-circumsphere checks
        pub mod delaunay_validation;
        pub mod hilbert;
    }
    pub use traits::*;
}

/// Lattice points and exact geometric predicates.
pub mod geometry {
    /// Fixed-width integer arithmetic for exact determinants
    pub mod exact;
    pub mod point;
    /// Exact orientation and insphere tests
    pub mod predicates;
    /// Floating-point simplex measures
    pub mod util;
    pub use point::*;
    pub use predicates::*;
}

/// Topological spaces and invariants of the emitted complexes.
pub mod topology {
    /// Topological invariants
    pub mod characteristics {
        pub mod euler;
    }
    /// The periodic domain
    pub mod spaces {
        pub mod toroidal;
    }
    /// The topological space abstraction
    pub mod traits {
        pub mod topological_space;
    }
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        driver::{CellComplexView, Triangulation, TriangulationError, triangulate},
        materialize::{Tetrahedron, materialize, try_materialize},
        normalize::{InputError, NormalizedPoints, normalize},
        options::{PeriodicityMode, TriangulationOptions, TriangulationOptionsBuilder},
        periodic_delaunay::{EngineFault, PeriodicDelaunay3d, PeriodicVertex},
        pipeline::{
            DelaunayError, DelaunayRequest, DelaunayResponse, compute_delaunay,
            compute_delaunay_value,
        },
        traits::cell_complex::CellComplex,
    };

    pub use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer};

    pub use crate::topology::{
        characteristics::euler::{FVector, euler_characteristic, validate_euler_characteristic},
        traits::topological_space::TopologyKind,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
