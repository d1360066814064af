//! The histogram itself: an axis sequence plus flat accumulator storage.

use approx::{AbsDiffEq, RelativeEq};
use ndarray::{ArrayD, IxDyn};

use crate::axes::Axes;
use crate::axis::Axis;
use crate::cell::{
    Cell, CellFrom, CommonCell, Count, EntryCell, Mean, SampleCell, ScalableCell, Sum, UnitCell,
    VarianceCell, WeightCell, WeightedSum,
};
use crate::error::HistogramError;
use crate::fill::{parse_args, FillArg, Sample, Weight};
use crate::iter::IndexedIter;
use crate::storage::DenseStorage;

/// Histogram counting plain observations.
pub type CountHistogram = Histogram<Count>;

/// Histogram accumulating weighted observations with variance bookkeeping.
pub type WeightedHistogram = Histogram<WeightedSum>;

/// Histogram accumulating the mean and variance of a sampled value.
pub type Profile = Histogram<Mean>;

/// A multi-dimensional histogram: one axis per dimension, one accumulator
/// cell per bin (flow bins included) in a flat dense store.
///
/// The cell type `C` decides what a bin records and which fill and
/// scaling operations exist; see the [`cell`](crate::cell) module. The
/// storage size always equals the product of the axis extents.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram<C: Cell = Count> {
    axes: Axes,
    storage: DenseStorage<C>,
}

impl<C: Cell> Histogram<C> {
    /// Create a histogram over `axes` with all cells default-initialized.
    ///
    /// Fails with [`NoAxes`](HistogramError::NoAxes) on an empty axis
    /// list.
    pub fn new(axes: Vec<Axis>) -> Result<Self, HistogramError> {
        let axes = Axes::new(axes)?;
        let storage = DenseStorage::new(axes.cell_count());
        Ok(Self { axes, storage })
    }

    /// Number of axes (dimensions).
    #[inline]
    pub fn rank(&self) -> usize {
        self.axes.rank()
    }

    /// Total number of cells, flow bins included.
    #[inline]
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// The axis sequence.
    #[inline]
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// The `i`-th axis.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rank()`.
    #[inline]
    pub fn axis(&self, i: usize) -> &Axis {
        self.axes.axis(i)
    }

    /// Reset every cell to its default value, keeping the axes.
    pub fn reset(&mut self) {
        self.storage.reset(self.axes.cell_count());
    }

    // =========================================================================
    // Cell access and traversal
    // =========================================================================

    /// The cell addressed by one extended bin index per axis (`-1` =
    /// underflow, `bins` = overflow).
    ///
    /// Fails with [`ArityMismatch`](HistogramError::ArityMismatch) on the
    /// wrong index count and
    /// [`IndexOutOfRange`](HistogramError::IndexOutOfRange) when an index
    /// lies outside its axis's extended range. No clamping.
    pub fn at(&self, indices: &[i32]) -> Result<&C, HistogramError> {
        let offset = self.axes.linearize_indices(indices)?;
        Ok(self.storage.cell(offset))
    }

    /// Mutable variant of [`at`](Self::at).
    pub fn at_mut(&mut self, indices: &[i32]) -> Result<&mut C, HistogramError> {
        let offset = self.axes.linearize_indices(indices)?;
        Ok(self.storage.cell_mut(offset))
    }

    /// Rank-1 convenience for [`at`](Self::at).
    pub fn cell(&self, index: i32) -> Result<&C, HistogramError> {
        self.at(&[index])
    }

    /// Rank-1 convenience for [`at_mut`](Self::at_mut).
    pub fn cell_mut(&mut self, index: i32) -> Result<&mut C, HistogramError> {
        self.at_mut(&[index])
    }

    /// All cells in linear-index order, flow bins included.
    #[inline]
    pub fn cells(&self) -> &[C] {
        self.storage.cells()
    }

    /// All cells in linear-index order, mutable.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [C] {
        self.storage.cells_mut()
    }

    /// Traverse every cell with its extended per-axis bin indices, in
    /// linear-index order.
    pub fn indexed(&self) -> IndexedIter<'_, C> {
        IndexedIter::new(&self.axes, self.storage.cells())
    }

    /// Cell values as a dense array shaped by the axis extents.
    ///
    /// Flow bins are included; the first axis is the slowest-varying
    /// (C order), matching the linear cell layout.
    pub fn values(&self) -> ArrayD<f64> {
        let shape: Vec<usize> = self.axes.iter().map(|a| a.total_bins() as usize).collect();
        let data: Vec<f64> = self.storage.cells().iter().map(|c| c.value()).collect();
        ArrayD::from_shape_vec(IxDyn(&shape), data).expect("cell count matches axis extents")
    }

    /// Cell variances as a dense array shaped by the axis extents.
    pub fn variances(&self) -> ArrayD<f64>
    where
        C: VarianceCell,
    {
        let shape: Vec<usize> = self.axes.iter().map(|a| a.total_bins() as usize).collect();
        let data: Vec<f64> = self.storage.cells().iter().map(|c| c.variance()).collect();
        ArrayD::from_shape_vec(IxDyn(&shape), data).expect("cell count matches axis extents")
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Copy into a histogram with a wider cell type.
    pub fn converted<C2>(&self) -> Histogram<C2>
    where
        C2: CellFrom<C>,
    {
        Histogram { axes: self.axes.clone(), storage: self.storage.converted() }
    }

    /// Replace this histogram wholesale with a converted copy of `rhs`:
    /// axes are assigned across and every cell is widened.
    pub fn assign_from<C2: Cell>(&mut self, rhs: &Histogram<C2>)
    where
        C: CellFrom<C2>,
    {
        self.axes.assign_from(&rhs.axes);
        self.storage = rhs.storage.converted();
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    /// Accumulate another histogram's cells into this one, widening the
    /// right side's cell type when it differs.
    ///
    /// Fails with [`AxesMismatch`](HistogramError::AxesMismatch) when the
    /// axes are not structurally equal, leaving this histogram unchanged.
    pub fn add_assign<C2: Cell>(&mut self, rhs: &Histogram<C2>) -> Result<(), HistogramError>
    where
        C: CellFrom<C2>,
    {
        if !self.axes.structurally_equal(&rhs.axes) {
            return Err(HistogramError::AxesMismatch);
        }
        self.storage.merge_from(&rhs.storage);
        Ok(())
    }

    /// Sum of two histograms in their common cell type.
    ///
    /// The result's cell type comes from the [`CommonCell`] promotion
    /// table; a combination outside the table does not compile. Fails
    /// with [`AxesMismatch`](HistogramError::AxesMismatch) when the axes
    /// are not structurally equal.
    pub fn add<C2: Cell>(
        &self,
        rhs: &Histogram<C2>,
    ) -> Result<Histogram<<C as CommonCell<C2>>::Output>, HistogramError>
    where
        C: CommonCell<C2>,
    {
        if !self.axes.structurally_equal(&rhs.axes) {
            return Err(HistogramError::AxesMismatch);
        }
        let mut out: Histogram<<C as CommonCell<C2>>::Output> = self.converted();
        out.add_assign(rhs)?;
        Ok(out)
    }

    /// Scale every cell in place by `factor`.
    ///
    /// Only available where the cell type scales losslessly; a [`Count`]
    /// histogram must go through [`scaled`](Self::scaled) instead, which
    /// promotes to a real-valued cell.
    pub fn scale_by(&mut self, factor: f64)
    where
        C: ScalableCell,
    {
        self.storage.scale_by(factor);
    }

    /// Divide every cell in place by `divisor`.
    pub fn div_by(&mut self, divisor: f64)
    where
        C: ScalableCell,
    {
        self.scale_by(1.0 / divisor);
    }

    /// Scaled copy in the smallest cell type that holds a scaled value.
    ///
    /// Integer counts promote to [`Sum`]; real-valued cells keep their
    /// type. The operand is left unmodified.
    pub fn scaled(&self, factor: f64) -> Histogram<<C as CommonCell<Sum>>::Output>
    where
        C: CommonCell<Sum>,
        <C as CommonCell<Sum>>::Output: ScalableCell,
    {
        let mut out: Histogram<<C as CommonCell<Sum>>::Output> = self.converted();
        out.scale_by(factor);
        out
    }

    /// Divided copy; see [`scaled`](Self::scaled).
    pub fn divided(&self, divisor: f64) -> Histogram<<C as CommonCell<Sum>>::Output>
    where
        C: CommonCell<Sum>,
        <C as CommonCell<Sum>>::Output: ScalableCell,
    {
        self.scaled(1.0 / divisor)
    }
}

// =============================================================================
// Filling
// =============================================================================

impl<C: UnitCell> Histogram<C> {
    /// Fill one observation at the given coordinates, one per axis in
    /// axis order.
    ///
    /// Out-of-domain coordinates land in flow bins where enabled; on a
    /// side whose flow bin is disabled the whole observation is dropped.
    /// Fails only for a wrong coordinate count.
    pub fn fill(&mut self, coordinates: &[f64]) -> Result<(), HistogramError> {
        if let Some(offset) = self.axes.linearize_values(coordinates)? {
            self.storage.cell_mut(offset).observe();
        }
        Ok(())
    }
}

impl<C: WeightCell> Histogram<C> {
    /// Fill one observation with a weight multiplier.
    pub fn fill_weighted(
        &mut self,
        coordinates: &[f64],
        weight: Weight,
    ) -> Result<(), HistogramError> {
        if let Some(offset) = self.axes.linearize_values(coordinates)? {
            self.storage.cell_mut(offset).observe_weight(weight.0);
        }
        Ok(())
    }
}

impl<C: SampleCell> Histogram<C> {
    /// Fill one observation carrying a sample payload.
    pub fn fill_sampled(
        &mut self,
        coordinates: &[f64],
        sample: &Sample,
    ) -> Result<(), HistogramError> {
        self.fill_sample_inner(coordinates, 1.0, sample)
    }

    /// Fill one weighted observation carrying a sample payload.
    pub fn fill_weighted_sampled(
        &mut self,
        coordinates: &[f64],
        weight: Weight,
        sample: &Sample,
    ) -> Result<(), HistogramError> {
        self.fill_sample_inner(coordinates, weight.0, sample)
    }

    fn fill_sample_inner(
        &mut self,
        coordinates: &[f64],
        weight: f64,
        sample: &Sample,
    ) -> Result<(), HistogramError> {
        if sample.len() != C::SAMPLE_LEN {
            return Err(HistogramError::SampleLenMismatch {
                expected: C::SAMPLE_LEN,
                got: sample.len(),
            });
        }
        if let Some(offset) = self.axes.linearize_values(coordinates)? {
            self.storage.cell_mut(offset).observe_sample(weight, sample.values());
        }
        Ok(())
    }
}

impl<C: EntryCell> Histogram<C> {
    /// Fill from a full argument list: coordinates in axis order plus at
    /// most one weight and one sample marker anywhere in the list.
    ///
    /// The typed fill methods reject unsupported markers at compile time;
    /// this path discovers the call shape at run time, so marker support
    /// is validated against the cell type before any state changes.
    pub fn fill_args(&mut self, args: &[FillArg]) -> Result<(), HistogramError> {
        let parsed = parse_args(args)?;
        C::check_entry(parsed.weight, parsed.sample.as_deref())?;
        if let Some(offset) = self.axes.linearize_values(&parsed.coordinates)? {
            self.storage
                .cell_mut(offset)
                .observe_entry(parsed.weight, parsed.sample.as_deref());
        }
        Ok(())
    }
}

// =============================================================================
// Approximate equality
// =============================================================================

impl<C> AbsDiffEq for Histogram<C>
where
    C: Cell + AbsDiffEq<Epsilon = f64>,
{
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    /// Structurally equal axes and cellwise approximate equality.
    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.axes.structurally_equal(&other.axes)
            && self
                .cells()
                .iter()
                .zip(other.cells())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<C> RelativeEq for Histogram<C>
where
    C: Cell + RelativeEq<Epsilon = f64>,
{
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.axes.structurally_equal(&other.axes)
            && self
                .cells()
                .iter()
                .zip(other.cells())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
