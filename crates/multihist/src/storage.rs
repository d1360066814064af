//! Flat accumulator storage backing a histogram.

use crate::cell::{Cell, CellFrom, ScalableCell};

/// Dense, flat collection of accumulator cells.
///
/// The owning histogram keeps the cell count equal to the product of its
/// axis extents at all times; [`reset`](Self::reset) re-establishes that
/// size with default cells whenever the axis configuration is set or
/// replaced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DenseStorage<C: Cell> {
    cells: Vec<C>,
}

impl<C: Cell> DenseStorage<C> {
    /// Storage holding `n` default cells.
    pub fn new(n: usize) -> Self {
        Self { cells: vec![C::default(); n] }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the storage holds no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop all contents and re-fill with `n` default cells.
    pub fn reset(&mut self, n: usize) {
        self.cells.clear();
        self.cells.resize(n, C::default());
    }

    /// The cell at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= len()`.
    #[inline]
    pub fn cell(&self, offset: usize) -> &C {
        &self.cells[offset]
    }

    /// The cell at `offset`, mutable.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= len()`.
    #[inline]
    pub fn cell_mut(&mut self, offset: usize) -> &mut C {
        &mut self.cells[offset]
    }

    /// All cells in linear-index order.
    #[inline]
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// All cells in linear-index order, mutable.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [C] {
        &mut self.cells
    }

    /// Elementwise merge of a same-shape storage, widening `C2` into `C`.
    pub fn merge_from<C2: Cell>(&mut self, rhs: &DenseStorage<C2>)
    where
        C: CellFrom<C2>,
    {
        debug_assert_eq!(self.len(), rhs.len());
        for (dst, src) in self.cells.iter_mut().zip(&rhs.cells) {
            dst.merge(&C::cell_from(src));
        }
    }

    /// Scale every cell by `factor`.
    pub fn scale_by(&mut self, factor: f64)
    where
        C: ScalableCell,
    {
        for cell in &mut self.cells {
            cell.scale(factor);
        }
    }

    /// Widen every cell into a storage of another cell type.
    pub fn converted<C2>(&self) -> DenseStorage<C2>
    where
        C2: CellFrom<C>,
    {
        DenseStorage { cells: self.cells.iter().map(C2::cell_from).collect() }
    }
}
