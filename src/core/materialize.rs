//! Copying cells out of a cell complex.

use thiserror::Error;

use crate::core::traits::cell_complex::CellComplex;

/// Four input-point indices in engine corner order.
pub type Tetrahedron = [usize; 4];

/// A cell refers to a point that does not exist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MaterializeError {
    /// A corner index is not below the vertex count.
    #[error("cell {cell} corner {corner} refers to vertex {index}, but only {nb_vertices} exist")]
    VertexIndexOutOfRange {
        /// Cell number
        cell: usize,
        /// Corner within the cell
        corner: usize,
        /// The index read
        index: usize,
        /// Vertex count of the complex
        nb_vertices: usize,
    },
}

/// All cells in ascending order. Corners are not reordered.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::driver::triangulate;
/// use periodic_delaunay::core::materialize::materialize;
/// use periodic_delaunay::core::normalize::normalize;
///
/// let points = normalize(&[0.5, 0.5, 0.5], 1).unwrap();
/// let triangulation = triangulate(&points, false).unwrap();
/// assert!(materialize(&triangulation.view()).is_empty());
/// ```
#[must_use]
pub fn materialize<C: CellComplex>(view: &C) -> Vec<Tetrahedron> {
    (0..view.nb_cells()).map(|c| view.cell_vertices(c)).collect()
}

/// Like [`materialize`], but every index is checked against
/// [`CellComplex::nb_vertices`].
///
/// # Errors
///
/// Returns [`MaterializeError::VertexIndexOutOfRange`] for the first bad
/// index.
pub fn try_materialize<C: CellComplex>(view: &C) -> Result<Vec<Tetrahedron>, MaterializeError> {
    let nb_vertices = view.nb_vertices();
    let mut out = Vec::with_capacity(view.nb_cells());
    for cell in 0..view.nb_cells() {
        let tet = view.cell_vertices(cell);
        if let Some((corner, &index)) = tet.iter().enumerate().find(|(_, i)| **i >= nb_vertices) {
            return Err(MaterializeError::VertexIndexOutOfRange {
                cell,
                corner,
                index,
                nb_vertices,
            });
        }
        out.push(tet);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        nb_vertices: usize,
        cells: Vec<Tetrahedron>,
    }

    impl CellComplex for Fixed {
        fn nb_vertices(&self) -> usize {
            self.nb_vertices
        }
        fn nb_cells(&self) -> usize {
            self.cells.len()
        }
        fn cell_vertex(&self, cell: usize, corner: usize) -> usize {
            self.cells[cell][corner]
        }
    }

    #[test]
    fn corner_order_is_kept() {
        let complex = Fixed {
            nb_vertices: 5,
            cells: vec![[3, 1, 0, 2], [4, 3, 1, 0]],
        };
        assert_eq!(materialize(&complex), complex.cells);
        assert_eq!(try_materialize(&complex).unwrap(), complex.cells);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let complex = Fixed {
            nb_vertices: 4,
            cells: vec![[0, 1, 2, 3], [0, 1, 4, 3]],
        };
        assert_eq!(
            try_materialize(&complex),
            Err(MaterializeError::VertexIndexOutOfRange {
                cell: 1,
                corner: 2,
                index: 4,
                nb_vertices: 4
            })
        );
    }

    #[test]
    fn empty_complex_is_empty() {
        let complex = Fixed {
            nb_vertices: 0,
            cells: Vec::new(),
        };
        assert!(materialize(&complex).is_empty());
    }
}
