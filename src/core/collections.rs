//! Collection type aliases used throughout the triangulation engine.
//!
//! Hashing uses `rustc-hash` (Fx), which is fast for the small integer keys
//! the engine hashes. Hot per-insertion buffers are `SmallVec`s.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::core::triangulation_data_structure::{CellKey, VertexId};

/// Index of a facet within a tetrahedron (0..=3), the facet opposite that vertex.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::collections::FacetIndex;
///
/// let facet: FacetIndex = 2;
/// assert_eq!(usize::from(facet), 2);
/// ```
pub type FacetIndex = u8;

/// Storage backend for cells.
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Fast hash map for engine-internal keys.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast hash set for engine-internal keys.
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-allocated buffer that spills to the heap past `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Boundary facets of a cavity: `(cell inside the cavity, facet index)`.
pub type CavityBoundaryBuffer = SmallBuffer<(CellKey, FacetIndex), 64>;

/// Cells found to be in conflict with the point being inserted.
pub type ConflictCellBuffer = SmallBuffer<CellKey, 64>;

/// Open facets awaiting their twin while a cavity is being re-triangulated,
/// keyed by sorted vertex ids.
pub type FacetWiringMap = FastHashMap<[VertexId; 3], (CellKey, FacetIndex)>;

/// Creates a [`FastHashMap`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
