//! One-time initialization of the geometry engine.
//!
//! The engine needs a small amount of process-wide state: the table of the 27
//! periodic image offsets and the lattice scale. It is built on first use and
//! shared by every triangulation afterwards, from any thread.
//!
//! # Examples
//!
//! ```rust
//! use periodic_delaunay::core::lifecycle;
//!
//! let ctx = lifecycle::ensure_initialized();
//! assert!(lifecycle::is_initialized());
//! assert_eq!(ctx.image_offsets()[lifecycle::EngineContext::ZERO_OFFSET_INDEX], [0, 0, 0]);
//! ```

use std::sync::OnceLock;

use crate::geometry::point::{GRID_BITS, GRID_SCALE_F64};

/// Number of periodic images of each point: the base domain and its 26
/// neighbors.
pub const IMAGE_COUNT: usize = 27;

/// Process-wide engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineContext {
    image_offsets: [[i8; 3]; IMAGE_COUNT],
    grid_scale: f64,
}

impl EngineContext {
    /// Index of the zero offset in [`Self::image_offsets`].
    pub const ZERO_OFFSET_INDEX: usize = 13;

    fn build() -> Self {
        let image_offsets = std::array::from_fn(|code| {
            let code = code as i8;
            [code / 9 - 1, (code / 3) % 3 - 1, code % 3 - 1]
        });
        Self {
            image_offsets,
            grid_scale: GRID_SCALE_F64,
        }
    }

    /// The 27 offsets in `{-1, 0, 1}³`, in lexicographic order.
    ///
    /// The position of an offset in this table is its *offset code*
    /// `9(x+1) + 3(y+1) + (z+1)`.
    #[must_use]
    pub const fn image_offsets(&self) -> &[[i8; 3]; IMAGE_COUNT] {
        &self.image_offsets
    }

    /// Offset code of `offset`, or `None` if it is not in `{-1, 0, 1}³`.
    #[must_use]
    pub fn offset_code(offset: [i8; 3]) -> Option<usize> {
        if offset.iter().any(|o| !(-1..=1).contains(o)) {
            return None;
        }
        let [x, y, z] = offset.map(|o| usize::from((o + 1).unsigned_abs()));
        Some(9 * x + 3 * y + z)
    }

    /// Lattice units per unit length.
    #[must_use]
    pub const fn grid_scale(&self) -> f64 {
        self.grid_scale
    }
}

static ENGINE_CONTEXT: OnceLock<EngineContext> = OnceLock::new();

/// Initialize the engine if needed and return its context.
///
/// Safe to call from several threads at once; exactly one of them builds the
/// context.
pub fn ensure_initialized() -> &'static EngineContext {
    ENGINE_CONTEXT.get_or_init(|| {
        let ctx = EngineContext::build();
        tracing::info!(
            images = IMAGE_COUNT,
            grid_bits = GRID_BITS,
            "geometry engine initialized"
        );
        ctx
    })
}

/// Returns `true` once [`ensure_initialized`] has completed.
#[must_use]
pub fn is_initialized() -> bool {
    ENGINE_CONTEXT.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_lexicographic_and_centered() {
        let ctx = ensure_initialized();
        let offsets = ctx.image_offsets();
        assert_eq!(offsets[0], [-1, -1, -1]);
        assert_eq!(offsets[EngineContext::ZERO_OFFSET_INDEX], [0, 0, 0]);
        assert_eq!(offsets[26], [1, 1, 1]);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn offset_code_inverts_the_table() {
        let ctx = ensure_initialized();
        for (code, &offset) in ctx.image_offsets().iter().enumerate() {
            assert_eq!(EngineContext::offset_code(offset), Some(code));
        }
        assert_eq!(EngineContext::offset_code([2, 0, 0]), None);
    }

    #[test]
    fn initialization_is_idempotent_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| std::ptr::from_ref(ensure_initialized()) as usize))
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert!(is_initialized());
    }
}
