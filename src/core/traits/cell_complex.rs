//! Read-only access to a computed tetrahedralization.

/// A complex of tetrahedra over indexed input points.
///
/// Cells are numbered `0..nb_cells()` and each has four corners `0..4`.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::traits::cell_complex::CellComplex;
///
/// struct Single;
///
/// impl CellComplex for Single {
///     fn nb_vertices(&self) -> usize {
///         4
///     }
///     fn nb_cells(&self) -> usize {
///         1
///     }
///     fn cell_vertex(&self, _cell: usize, corner: usize) -> usize {
///         corner
///     }
/// }
///
/// assert_eq!(Single.cell_vertices(0), [0, 1, 2, 3]);
/// ```
pub trait CellComplex {
    /// Number of input points the indices refer to.
    fn nb_vertices(&self) -> usize;

    /// Number of tetrahedra.
    fn nb_cells(&self) -> usize;

    /// Input index of corner `corner` (0..4) of cell `cell`.
    ///
    /// Implementations may panic for out-of-range arguments.
    fn cell_vertex(&self, cell: usize, corner: usize) -> usize;

    /// All four corners of `cell` in engine order.
    fn cell_vertices(&self, cell: usize) -> [usize; 4] {
        std::array::from_fn(|corner| self.cell_vertex(cell, corner))
    }
}
