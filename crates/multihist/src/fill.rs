//! Fill-call argument normalization.
//!
//! A fill call is modeled as a list of [`FillArg`]s: axis coordinates in
//! dimension order, plus at most one [`Weight`] and at most one [`Sample`]
//! marker. Markers may sit anywhere in the list, in any order;
//! [`parse_args`] extracts them in one pass and yields [`ParsedFill`], the
//! normalized form the fill engine dispatches on. Parsing once up front
//! keeps the linearization code agnostic of the argument shape.

use crate::error::HistogramError;

/// Marks a fill argument as a weight multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weight(pub f64);

/// Marks a fill argument as a sample payload of one or more values.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample(pub Vec<f64>);

impl Sample {
    /// Sample payload carrying a single value.
    pub fn single(value: f64) -> Self {
        Self(vec![value])
    }

    /// Number of values in the payload.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// One argument of a fill call.
#[derive(Clone, Debug, PartialEq)]
pub enum FillArg {
    /// An axis coordinate, consumed in axis order.
    Coordinate(f64),
    /// A weight marker.
    Weight(f64),
    /// A sample marker.
    Sample(Vec<f64>),
}

impl From<f64> for FillArg {
    fn from(value: f64) -> Self {
        Self::Coordinate(value)
    }
}

impl From<Weight> for FillArg {
    fn from(weight: Weight) -> Self {
        Self::Weight(weight.0)
    }
}

impl From<Sample> for FillArg {
    fn from(sample: Sample) -> Self {
        Self::Sample(sample.0)
    }
}

/// A fill call normalized into coordinates plus optional annotations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedFill {
    /// Axis coordinates in their original order.
    pub coordinates: Vec<f64>,
    /// Weight marker payload, if one was present.
    pub weight: Option<f64>,
    /// Sample marker payload, if one was present.
    pub sample: Option<Vec<f64>>,
}

/// Scan a fill argument list, extracting at most one weight and at most
/// one sample marker; the remaining arguments become coordinates in their
/// original order.
///
/// A second weight or sample marker fails with
/// [`DuplicateWeight`](HistogramError::DuplicateWeight) /
/// [`DuplicateSample`](HistogramError::DuplicateSample).
pub fn parse_args(args: &[FillArg]) -> Result<ParsedFill, HistogramError> {
    let mut parsed = ParsedFill {
        coordinates: Vec::with_capacity(args.len()),
        weight: None,
        sample: None,
    };
    for arg in args {
        match arg {
            FillArg::Coordinate(value) => parsed.coordinates.push(*value),
            FillArg::Weight(w) => {
                if parsed.weight.replace(*w).is_some() {
                    return Err(HistogramError::DuplicateWeight);
                }
            }
            FillArg::Sample(values) => {
                if parsed.sample.replace(values.clone()).is_some() {
                    return Err(HistogramError::DuplicateSample);
                }
            }
        }
    }
    Ok(parsed)
}
