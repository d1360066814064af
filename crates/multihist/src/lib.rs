//! multihist: multi-dimensional histograms with flow bins and pluggable
//! accumulator cells.
//!
//! Observations are accumulated into a grid of bins spanned by one or
//! more axes; each axis maps a raw coordinate to a bin, and the bins of
//! all axes combine into one flat cell store via mixed-radix indexing.
//!
//! # Key Types
//!
//! - [`Histogram`] - the histogram itself; [`CountHistogram`],
//!   [`WeightedHistogram`] and [`Profile`] are the common aliases
//! - [`Axis`] - one dimension's binning rule: [`RegularAxis`],
//!   [`VariableAxis`], [`IntegerAxis`] or [`CategoryAxis`]
//! - [`cell`] - per-bin accumulators ([`Count`], [`Sum`],
//!   [`WeightedSum`], [`Mean`]) and their capability traits
//! - [`Weight`] / [`Sample`] - markers annotating fill arguments
//!
//! # Filling and reading
//!
//! ```
//! use multihist::{Cell, CountHistogram, IntegerAxis, RegularAxis};
//!
//! let mut hist = CountHistogram::new(vec![
//!     IntegerAxis::new(0, 3)?.into(),
//!     RegularAxis::new(2, 0.0, 2.0)?.into(),
//! ])?;
//!
//! hist.fill(&[1.0, 0.5])?;
//! hist.fill(&[5.0, 0.5])?; // out of domain: lands in the overflow bin
//!
//! assert_eq!(hist.at(&[1, 0])?.value(), 1.0);
//! assert_eq!(hist.at(&[3, 0])?.value(), 1.0); // index 3 = overflow
//! # Ok::<(), multihist::HistogramError>(())
//! ```
//!
//! # Weights, samples, arithmetic
//!
//! Weighted fills need a weight-capable cell, profiles need a sample on
//! every fill; composing a marker with a cell that cannot absorb it does
//! not compile. Histograms over structurally equal axes add cellwise,
//! and mixing cell types resolves a common type through the promotion
//! table in [`cell`]:
//!
//! ```
//! use multihist::{Cell, CountHistogram, IntegerAxis, Weight, WeightedHistogram};
//!
//! let axes = || -> Vec<multihist::Axis> { vec![IntegerAxis::new(0, 2).unwrap().into()] };
//! let mut counts = CountHistogram::new(axes())?;
//! counts.fill(&[0.0])?;
//!
//! let mut weighted = WeightedHistogram::new(axes())?;
//! weighted.fill_weighted(&[0.0], Weight(2.5))?;
//!
//! let total = counts.add(&weighted)?; // promoted to WeightedSum cells
//! assert_eq!(total.at(&[0])?.value(), 3.5);
//! # Ok::<(), multihist::HistogramError>(())
//! ```

// Re-export approx traits for users who want to compare histograms
// within floating tolerance
pub use approx;

pub mod axis;
pub mod cell;

mod axes;
mod error;
mod fill;
mod histogram;
mod iter;
mod storage;

pub use axes::Axes;
pub use axis::{Axis, CategoryAxis, IntegerAxis, RegularAxis, VariableAxis};
pub use cell::{Cell, CellFrom, CommonCell, Count, Mean, Sum, WeightedSum};
pub use error::HistogramError;
pub use fill::{parse_args, FillArg, ParsedFill, Sample, Weight};
pub use histogram::{CountHistogram, Histogram, Profile, WeightedHistogram};
pub use iter::IndexedIter;
pub use storage::DenseStorage;
