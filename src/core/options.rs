//! Configuration of a triangulation run.
//!
//! [`TriangulationOptions`] is built with a `derive_builder` builder; every
//! field has a default, so `TriangulationOptionsBuilder::default().build()`
//! always succeeds.
//!
//! # Examples
//!
//! ```rust
//! use periodic_delaunay::core::options::{PeriodicityMode, TriangulationOptionsBuilder};
//!
//! let options = TriangulationOptionsBuilder::default()
//!     .mode(PeriodicityMode::unit_periodic())
//!     .stores_cicl(true)
//!     .build()
//!     .unwrap();
//! assert!(options.mode.is_periodic());
//! assert!(options.spatial_sort);
//! ```

use serde::{Deserialize, Serialize};

use crate::topology::traits::topological_space::TopologyKind;

/// Whether the point set is treated as periodic, and with which period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodicityMode {
    /// The domain is a box with opposite faces identified. Only cubic boxes
    /// are supported.
    Periodic {
        /// Period along each axis.
        period: [f64; 3],
    },
    /// Ordinary Delaunay tetrahedralization of the convex hull.
    #[default]
    NonPeriodic,
}

impl PeriodicityMode {
    /// Periodic on the unit cube.
    #[must_use]
    pub const fn unit_periodic() -> Self {
        Self::Periodic { period: [1.0; 3] }
    }

    /// Maps the boundary flag to a mode; periodic means the unit cube.
    #[must_use]
    pub const fn from_flag(is_periodic: bool) -> Self {
        if is_periodic {
            Self::unit_periodic()
        } else {
            Self::NonPeriodic
        }
    }

    /// Returns `true` for [`PeriodicityMode::Periodic`].
    #[must_use]
    pub const fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic { .. })
    }

    /// The period, if periodic.
    #[must_use]
    pub const fn period(self) -> Option<[f64; 3]> {
        match self {
            Self::Periodic { period } => Some(period),
            Self::NonPeriodic => None,
        }
    }

    /// The space the triangulation lives in.
    #[must_use]
    pub const fn topology(self) -> TopologyKind {
        match self {
            Self::Periodic { .. } => TopologyKind::Toroidal,
            Self::NonPeriodic => TopologyKind::Euclidean,
        }
    }
}

/// Settings of a triangulation run.
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriangulationOptions {
    /// Periodic or not.
    #[builder(default)]
    pub mode: PeriodicityMode,
    /// Record, for each input point, the emitted cells incident to it.
    #[builder(default = "false")]
    pub stores_cicl: bool,
    /// Insert points in Hilbert order instead of input order.
    #[builder(default = "true")]
    pub spatial_sort: bool,
    /// After construction, verify the empty-sphere property by brute force.
    #[builder(default = "false")]
    pub check_delaunay: bool,
}

impl TriangulationOptions {
    /// Default options for the given boundary flag.
    #[must_use]
    pub fn for_flag(is_periodic: bool) -> Self {
        Self {
            mode: PeriodicityMode::from_flag(is_periodic),
            ..Self::default()
        }
    }
}

impl Default for TriangulationOptions {
    fn default() -> Self {
        Self {
            mode: PeriodicityMode::NonPeriodic,
            stores_cicl: false,
            spatial_sort: true,
            check_delaunay: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default_impl() {
        let built = TriangulationOptionsBuilder::default().build().unwrap();
        assert_eq!(built, TriangulationOptions::default());
    }

    #[test]
    fn flag_maps_to_unit_cube() {
        assert_eq!(PeriodicityMode::from_flag(true).period(), Some([1.0; 3]));
        assert_eq!(PeriodicityMode::from_flag(false), PeriodicityMode::NonPeriodic);
        assert_eq!(PeriodicityMode::from_flag(true).topology(), TopologyKind::Toroidal);
        assert!(TriangulationOptions::for_flag(true).mode.is_periodic());
    }

    #[test]
    fn options_serialize_with_tagged_mode() {
        let options = TriangulationOptions::for_flag(true);
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["mode"]["kind"], "periodic");
        let back: TriangulationOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, options);
    }
}
