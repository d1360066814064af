//! Accumulator cells and the capability traits storage is built from.
//!
//! A cell is the accumulator occupying one histogram bin:
//! - [`Count`] - plain observation counter
//! - [`Sum`] - real-valued sum; weighted fills add their weight
//! - [`WeightedSum`] - sum of weights plus variance bookkeeping
//! - [`Mean`] - mean/variance of a sample value (the profile accumulator)
//!
//! What a cell can do is expressed through capability traits
//! ([`UnitCell`], [`WeightCell`], [`SampleCell`], [`ScalableCell`],
//! [`VarianceCell`]); the typed fill and scaling methods on
//! [`Histogram`](crate::Histogram) bound on these, so composing a marker
//! with a cell that cannot absorb it fails to compile.
//!
//! # Promotion
//!
//! Combining histograms with different cell types resolves the smallest
//! cell type that represents both sides losslessly:
//!
//! | lhs \ rhs     | `Count`       | `Sum`         | `WeightedSum` | `Mean` |
//! |---------------|---------------|---------------|---------------|--------|
//! | `Count`       | `Count`       | `Sum`         | `WeightedSum` | -      |
//! | `Sum`         | `Sum`         | `Sum`         | `WeightedSum` | -      |
//! | `WeightedSum` | `WeightedSum` | `WeightedSum` | `WeightedSum` | -      |
//! | `Mean`        | -             | -             | -             | `Mean` |
//!
//! The table is exactly the set of [`CommonCell`] impls below; an unlisted
//! pair does not compile. Widening conversions live on [`CellFrom`].

use approx::{AbsDiffEq, RelativeEq};

use crate::error::HistogramError;

// =============================================================================
// Capability traits
// =============================================================================

/// An accumulator occupying one histogram bin.
pub trait Cell: Clone + Default + PartialEq + std::fmt::Debug + 'static {
    /// Merge another accumulator of the same type into this one.
    ///
    /// Associative and commutative; histogram addition reduces to this,
    /// cell by cell.
    fn merge(&mut self, rhs: &Self);

    /// Primary accumulated value: the count, sum, or mean depending on
    /// the cell type.
    fn value(&self) -> f64;
}

/// Cells that record plain unit observations.
pub trait UnitCell: Cell {
    /// Record one unweighted observation.
    fn observe(&mut self);
}

/// Cells that record weighted observations.
pub trait WeightCell: Cell {
    /// Record one observation with weight `w`.
    fn observe_weight(&mut self, w: f64);
}

/// Cells that consume a sample payload with each observation.
pub trait SampleCell: Cell {
    /// Number of values every sample payload must carry.
    const SAMPLE_LEN: usize;

    /// Record a sample with the given weight (1.0 when unweighted).
    ///
    /// `sample.len()` must equal [`SAMPLE_LEN`](Self::SAMPLE_LEN); the fill
    /// engine validates this before calling.
    fn observe_sample(&mut self, weight: f64, sample: &[f64]);
}

/// Cells that scale by a real factor without losing information.
pub trait ScalableCell: Cell {
    /// Multiply the accumulated state by `factor`.
    fn scale(&mut self, factor: f64);
}

/// Cells that track spread alongside their value.
pub trait VarianceCell: Cell {
    /// Variance estimate of the accumulated value.
    fn variance(&self) -> f64;
}

/// Cell-side dispatch for normalized fill calls.
///
/// The typed fill methods check marker support at compile time through
/// the capability traits above; this hook backs the argument-list path
/// ([`Histogram::fill_args`](crate::Histogram::fill_args)), where the call
/// shape is only known at run time. `check_entry` validates before any
/// state is touched, so a rejected call leaves the cell unchanged.
pub trait EntryCell: Cell {
    /// Validate a normalized fill call against this cell type.
    fn check_entry(weight: Option<f64>, sample: Option<&[f64]>) -> Result<(), HistogramError>;

    /// Apply a normalized fill call. Must only be called after
    /// [`check_entry`](Self::check_entry) succeeded.
    fn observe_entry(&mut self, weight: Option<f64>, sample: Option<&[f64]>);
}

// =============================================================================
// Conversion and promotion
// =============================================================================

/// Lossless widening from another cell type.
pub trait CellFrom<C: Cell>: Cell {
    /// Build this cell from an accumulated `C`.
    fn cell_from(cell: &C) -> Self;
}

impl<C: Cell> CellFrom<C> for C {
    #[inline]
    fn cell_from(cell: &C) -> Self {
        cell.clone()
    }
}

/// Resolution of a common cell type for combining two histograms.
///
/// The impls of this trait are the promotion table in the module docs;
/// combining cell types without an impl is a compile error, which is how
/// an unlisted combination becomes a construction-time failure.
pub trait CommonCell<Rhs: Cell>: Cell {
    /// The smallest cell type that represents both operands losslessly.
    type Output: Cell + CellFrom<Self> + CellFrom<Rhs>;
}

// =============================================================================
// Count
// =============================================================================

/// Plain observation counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Count {
    count: u64,
}

impl Count {
    /// Cell holding an existing count.
    #[inline]
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Cell for Count {
    #[inline]
    fn merge(&mut self, rhs: &Self) {
        self.count += rhs.count;
    }

    #[inline]
    fn value(&self) -> f64 {
        self.count as f64
    }
}

impl UnitCell for Count {
    #[inline]
    fn observe(&mut self) {
        self.count += 1;
    }
}

impl EntryCell for Count {
    fn check_entry(weight: Option<f64>, sample: Option<&[f64]>) -> Result<(), HistogramError> {
        if weight.is_some() {
            return Err(HistogramError::WeightUnsupported);
        }
        if sample.is_some() {
            return Err(HistogramError::SampleUnsupported);
        }
        Ok(())
    }

    fn observe_entry(&mut self, _weight: Option<f64>, _sample: Option<&[f64]>) {
        self.observe();
    }
}

// =============================================================================
// Sum
// =============================================================================

/// Real-valued sum.
///
/// Unweighted observations add 1.0, weighted observations add their
/// weight. This is the promotion target for scaled counts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sum {
    sum: f64,
}

impl Sum {
    /// Cell holding an existing sum.
    #[inline]
    pub fn new(sum: f64) -> Self {
        Self { sum }
    }

    /// Accumulated sum.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

impl Cell for Sum {
    #[inline]
    fn merge(&mut self, rhs: &Self) {
        self.sum += rhs.sum;
    }

    #[inline]
    fn value(&self) -> f64 {
        self.sum
    }
}

impl UnitCell for Sum {
    #[inline]
    fn observe(&mut self) {
        self.sum += 1.0;
    }
}

impl WeightCell for Sum {
    #[inline]
    fn observe_weight(&mut self, w: f64) {
        self.sum += w;
    }
}

impl ScalableCell for Sum {
    #[inline]
    fn scale(&mut self, factor: f64) {
        self.sum *= factor;
    }
}

impl EntryCell for Sum {
    fn check_entry(_weight: Option<f64>, sample: Option<&[f64]>) -> Result<(), HistogramError> {
        if sample.is_some() {
            return Err(HistogramError::SampleUnsupported);
        }
        Ok(())
    }

    fn observe_entry(&mut self, weight: Option<f64>, _sample: Option<&[f64]>) {
        match weight {
            Some(w) => self.observe_weight(w),
            None => self.observe(),
        }
    }
}

// =============================================================================
// WeightedSum
// =============================================================================

/// Weighted sum with variance bookkeeping.
///
/// Tracks the sum of weights and the sum of squared weights; under
/// Poisson statistics the latter is the variance of the accumulated
/// value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedSum {
    sum_of_weights: f64,
    sum_of_weights_squared: f64,
}

impl WeightedSum {
    /// Cell holding existing sums.
    #[inline]
    pub fn new(sum_of_weights: f64, sum_of_weights_squared: f64) -> Self {
        Self { sum_of_weights, sum_of_weights_squared }
    }

    /// Accumulated sum of weights.
    #[inline]
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    /// Accumulated sum of squared weights.
    #[inline]
    pub fn sum_of_weights_squared(&self) -> f64 {
        self.sum_of_weights_squared
    }
}

impl Cell for WeightedSum {
    #[inline]
    fn merge(&mut self, rhs: &Self) {
        self.sum_of_weights += rhs.sum_of_weights;
        self.sum_of_weights_squared += rhs.sum_of_weights_squared;
    }

    #[inline]
    fn value(&self) -> f64 {
        self.sum_of_weights
    }
}

impl UnitCell for WeightedSum {
    #[inline]
    fn observe(&mut self) {
        self.sum_of_weights += 1.0;
        self.sum_of_weights_squared += 1.0;
    }
}

impl WeightCell for WeightedSum {
    #[inline]
    fn observe_weight(&mut self, w: f64) {
        self.sum_of_weights += w;
        self.sum_of_weights_squared += w * w;
    }
}

impl ScalableCell for WeightedSum {
    #[inline]
    fn scale(&mut self, factor: f64) {
        self.sum_of_weights *= factor;
        self.sum_of_weights_squared *= factor * factor;
    }
}

impl VarianceCell for WeightedSum {
    #[inline]
    fn variance(&self) -> f64 {
        self.sum_of_weights_squared
    }
}

impl EntryCell for WeightedSum {
    fn check_entry(_weight: Option<f64>, sample: Option<&[f64]>) -> Result<(), HistogramError> {
        if sample.is_some() {
            return Err(HistogramError::SampleUnsupported);
        }
        Ok(())
    }

    fn observe_entry(&mut self, weight: Option<f64>, _sample: Option<&[f64]>) {
        match weight {
            Some(w) => self.observe_weight(w),
            None => self.observe(),
        }
    }
}

// =============================================================================
// Mean
// =============================================================================

/// Mean and variance of a sampled value (the profile accumulator).
///
/// Every observation must carry a one-value sample payload; the weight
/// defaults to 1.0. Uses the weighted Welford update, so a single pass
/// stays numerically stable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mean {
    sum_of_weights: f64,
    mean: f64,
    sum_of_deltas_squared: f64,
}

impl Mean {
    /// Accumulated sum of weights (the observation count when all fills
    /// were unweighted).
    #[inline]
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_of_weights
    }

    /// Mean of the observed sample values.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl Cell for Mean {
    fn merge(&mut self, rhs: &Self) {
        if rhs.sum_of_weights == 0.0 {
            return;
        }
        if self.sum_of_weights == 0.0 {
            *self = *rhs;
            return;
        }
        let (n1, mu1) = (self.sum_of_weights, self.mean);
        let (n2, mu2) = (rhs.sum_of_weights, rhs.mean);
        self.sum_of_weights += rhs.sum_of_weights;
        self.mean = (n1 * mu1 + n2 * mu2) / self.sum_of_weights;
        self.sum_of_deltas_squared += rhs.sum_of_deltas_squared
            + n1 * (self.mean - mu1) * (self.mean - mu1)
            + n2 * (self.mean - mu2) * (self.mean - mu2);
    }

    #[inline]
    fn value(&self) -> f64 {
        self.mean
    }
}

impl SampleCell for Mean {
    const SAMPLE_LEN: usize = 1;

    fn observe_sample(&mut self, weight: f64, sample: &[f64]) {
        debug_assert_eq!(sample.len(), Self::SAMPLE_LEN);
        let x = sample[0];
        self.sum_of_weights += weight;
        let delta = x - self.mean;
        self.mean += weight * delta / self.sum_of_weights;
        self.sum_of_deltas_squared += weight * delta * (x - self.mean);
    }
}

impl ScalableCell for Mean {
    #[inline]
    fn scale(&mut self, factor: f64) {
        self.mean *= factor;
        self.sum_of_deltas_squared *= factor * factor;
    }
}

impl VarianceCell for Mean {
    #[inline]
    fn variance(&self) -> f64 {
        self.sum_of_deltas_squared / (self.sum_of_weights - 1.0)
    }
}

impl EntryCell for Mean {
    fn check_entry(_weight: Option<f64>, sample: Option<&[f64]>) -> Result<(), HistogramError> {
        match sample {
            None => Err(HistogramError::SampleRequired),
            Some(s) if s.len() != Self::SAMPLE_LEN => Err(HistogramError::SampleLenMismatch {
                expected: Self::SAMPLE_LEN,
                got: s.len(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn observe_entry(&mut self, weight: Option<f64>, sample: Option<&[f64]>) {
        let sample = sample.expect("checked by check_entry");
        self.observe_sample(weight.unwrap_or(1.0), sample);
    }
}

// =============================================================================
// Widening table
// =============================================================================

impl CellFrom<Count> for Sum {
    #[inline]
    fn cell_from(cell: &Count) -> Self {
        Sum::new(cell.count() as f64)
    }
}

impl CellFrom<Count> for WeightedSum {
    // n unit-weight observations: sum of squared weights equals the count
    #[inline]
    fn cell_from(cell: &Count) -> Self {
        WeightedSum::new(cell.count() as f64, cell.count() as f64)
    }
}

impl CellFrom<Sum> for WeightedSum {
    #[inline]
    fn cell_from(cell: &Sum) -> Self {
        WeightedSum::new(cell.sum(), cell.sum())
    }
}

// =============================================================================
// Promotion table
// =============================================================================

impl CommonCell<Count> for Count {
    type Output = Count;
}

impl CommonCell<Sum> for Count {
    type Output = Sum;
}

impl CommonCell<WeightedSum> for Count {
    type Output = WeightedSum;
}

impl CommonCell<Count> for Sum {
    type Output = Sum;
}

impl CommonCell<Sum> for Sum {
    type Output = Sum;
}

impl CommonCell<WeightedSum> for Sum {
    type Output = WeightedSum;
}

impl CommonCell<Count> for WeightedSum {
    type Output = WeightedSum;
}

impl CommonCell<Sum> for WeightedSum {
    type Output = WeightedSum;
}

impl CommonCell<WeightedSum> for WeightedSum {
    type Output = WeightedSum;
}

impl CommonCell<Mean> for Mean {
    type Output = Mean;
}

// =============================================================================
// Approximate equality
// =============================================================================

impl AbsDiffEq for Sum {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.sum.abs_diff_eq(&other.sum, epsilon)
    }
}

impl RelativeEq for Sum {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.sum.relative_eq(&other.sum, epsilon, max_relative)
    }
}

impl AbsDiffEq for WeightedSum {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.sum_of_weights.abs_diff_eq(&other.sum_of_weights, epsilon)
            && self
                .sum_of_weights_squared
                .abs_diff_eq(&other.sum_of_weights_squared, epsilon)
    }
}

impl RelativeEq for WeightedSum {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.sum_of_weights
            .relative_eq(&other.sum_of_weights, epsilon, max_relative)
            && self.sum_of_weights_squared.relative_eq(
                &other.sum_of_weights_squared,
                epsilon,
                max_relative,
            )
    }
}

impl AbsDiffEq for Mean {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.sum_of_weights.abs_diff_eq(&other.sum_of_weights, epsilon)
            && self.mean.abs_diff_eq(&other.mean, epsilon)
            && self
                .sum_of_deltas_squared
                .abs_diff_eq(&other.sum_of_deltas_squared, epsilon)
    }
}

impl RelativeEq for Mean {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.sum_of_weights
            .relative_eq(&other.sum_of_weights, epsilon, max_relative)
            && self.mean.relative_eq(&other.mean, epsilon, max_relative)
            && self.sum_of_deltas_squared.relative_eq(
                &other.sum_of_deltas_squared,
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_count_observe_and_merge() {
        let mut a = Count::default();
        a.observe();
        a.observe();
        let mut b = Count::default();
        b.observe();
        a.merge(&b);
        assert_eq!(a.count(), 3);
        assert_eq!(a.value(), 3.0);
    }

    #[test]
    fn test_sum_weighted_and_scaled() {
        let mut s = Sum::default();
        s.observe();
        s.observe_weight(2.5);
        assert_eq!(s.sum(), 3.5);
        s.scale(2.0);
        assert_eq!(s.sum(), 7.0);
    }

    #[test]
    fn test_weighted_sum_variance_bookkeeping() {
        let mut w = WeightedSum::default();
        w.observe();
        w.observe_weight(2.5);
        assert_eq!(w.sum_of_weights(), 3.5);
        assert_eq!(w.variance(), 1.0 + 6.25);
        w.scale(2.0);
        assert_eq!(w.sum_of_weights(), 7.0);
        assert_eq!(w.variance(), 4.0 * 7.25);
    }

    #[test]
    fn test_mean_matches_direct_computation() {
        let mut m = Mean::default();
        for x in [1.0, 2.0, 3.0] {
            m.observe_sample(1.0, &[x]);
        }
        assert_abs_diff_eq!(m.mean(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.variance(), 1.0, epsilon = 1e-12);
        assert_eq!(m.sum_of_weights(), 3.0);
    }

    #[test]
    fn test_mean_merge_equals_concatenated_stream() {
        let mut a = Mean::default();
        a.observe_sample(1.0, &[1.0]);
        a.observe_sample(1.0, &[2.0]);
        let mut b = Mean::default();
        b.observe_sample(1.0, &[3.0]);
        b.observe_sample(1.0, &[4.0]);

        let mut direct = Mean::default();
        for x in [1.0, 2.0, 3.0, 4.0] {
            direct.observe_sample(1.0, &[x]);
        }

        a.merge(&b);
        assert_abs_diff_eq!(a.mean(), direct.mean(), epsilon = 1e-12);
        assert_abs_diff_eq!(a.variance(), direct.variance(), epsilon = 1e-12);
    }

    #[test]
    fn test_mean_merge_with_empty() {
        let mut a = Mean::default();
        a.observe_sample(1.0, &[5.0]);
        let before = a;
        a.merge(&Mean::default());
        assert_eq!(a, before);

        let mut empty = Mean::default();
        empty.merge(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_weighted_mean() {
        // weight 3 on x=2 equals three unit fills of x=2
        let mut weighted = Mean::default();
        weighted.observe_sample(3.0, &[2.0]);
        weighted.observe_sample(1.0, &[4.0]);

        let mut unit = Mean::default();
        for x in [2.0, 2.0, 2.0, 4.0] {
            unit.observe_sample(1.0, &[x]);
        }

        assert_abs_diff_eq!(weighted.mean(), unit.mean(), epsilon = 1e-12);
        assert_abs_diff_eq!(weighted.variance(), unit.variance(), epsilon = 1e-12);
    }

    #[test]
    fn test_widening_preserves_value() {
        let mut c = Count::default();
        c.observe();
        c.observe();
        let s = Sum::cell_from(&c);
        assert_eq!(s.sum(), 2.0);
        let w = WeightedSum::cell_from(&c);
        assert_eq!(w.sum_of_weights(), 2.0);
        assert_eq!(w.sum_of_weights_squared(), 2.0);
        let w2 = WeightedSum::cell_from(&s);
        assert_eq!(w2, w);
    }

    #[test]
    fn test_entry_capability_checks() {
        assert_eq!(
            Count::check_entry(Some(2.0), None),
            Err(HistogramError::WeightUnsupported)
        );
        assert_eq!(
            Sum::check_entry(None, Some(&[1.0])),
            Err(HistogramError::SampleUnsupported)
        );
        assert_eq!(Mean::check_entry(None, None), Err(HistogramError::SampleRequired));
        assert_eq!(
            Mean::check_entry(None, Some(&[1.0, 2.0])),
            Err(HistogramError::SampleLenMismatch { expected: 1, got: 2 })
        );
        assert_eq!(Sum::check_entry(Some(2.0), None), Ok(()));
        assert_eq!(Mean::check_entry(Some(2.0), Some(&[1.0])), Ok(()));
    }
}
