//! Category axis: unordered integer categories.

use std::collections::HashMap;

use crate::error::HistogramError;

/// Axis with one bin per listed integer category, in listing order.
///
/// Unknown categories land in the overflow ("other") bin when it is
/// enabled and are dropped otherwise. A category axis never has an
/// underflow bin.
#[derive(Clone, Debug)]
pub struct CategoryAxis {
    categories: Box<[i64]>,
    lookup: HashMap<i64, u32>,
    overflow: bool,
}

impl CategoryAxis {
    /// Create a category axis with the overflow bin enabled.
    pub fn new(categories: Vec<i64>) -> Result<Self, HistogramError> {
        Self::with_options(categories, true)
    }

    /// Create a category axis, choosing whether unknown categories get a
    /// bin of their own.
    pub fn with_options(categories: Vec<i64>, overflow: bool) -> Result<Self, HistogramError> {
        if categories.is_empty() {
            return Err(HistogramError::InvalidAxis(
                "category axis requires at least one category".into(),
            ));
        }
        let lookup: HashMap<i64, u32> = categories
            .iter()
            .enumerate()
            .map(|(bin, &cat)| (cat, bin as u32))
            .collect();
        if lookup.len() != categories.len() {
            return Err(HistogramError::InvalidAxis(
                "category axis categories must be unique".into(),
            ));
        }
        Ok(Self { categories: categories.into_boxed_slice(), lookup, overflow })
    }

    /// Number of ordinary bins (listed categories).
    #[inline]
    pub fn bins(&self) -> u32 {
        self.categories.len() as u32
    }

    /// The categories, in bin order.
    #[inline]
    pub fn categories(&self) -> &[i64] {
        &self.categories
    }

    /// Whether unknown categories get the overflow bin.
    #[inline]
    pub fn overflow(&self) -> bool {
        self.overflow
    }

    /// The category held by ordinary bin `bin`, or `None` for the overflow
    /// bin.
    #[inline]
    pub fn value(&self, bin: u32) -> Option<i64> {
        self.categories.get(bin as usize).copied()
    }

    /// Total number of bins including the overflow bin.
    #[inline]
    pub fn total_bins(&self) -> u32 {
        self.bins() + self.overflow as u32
    }

    /// Storage slot for `value`, or `None` when the category is unknown
    /// and the overflow bin is disabled.
    pub fn index(&self, value: f64) -> Option<u32> {
        if value.is_nan() {
            return self.overflow.then(|| self.bins());
        }
        match self.lookup.get(&(value as i64)) {
            Some(&bin) => Some(bin),
            None => self.overflow.then(|| self.bins()),
        }
    }

    /// Storage slot for an extended bin index (`bins()` = overflow), or
    /// `None` when the index lies outside the extended range.
    ///
    /// `-1` is never valid: a category axis has no underflow bin.
    pub fn slot(&self, index: i32) -> Option<u32> {
        if index >= 0 && (index as u32) < self.bins() {
            return Some(index as u32);
        }
        if index >= 0 && index as u32 == self.bins() && self.overflow {
            return Some(self.bins());
        }
        None
    }

    /// Extended bin index occupying storage slot `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= total_bins()`.
    pub fn slot_index(&self, slot: u32) -> i32 {
        assert!(slot < self.total_bins(), "slot out of range");
        slot as i32
    }
}

impl PartialEq for CategoryAxis {
    fn eq(&self, other: &Self) -> bool {
        // the lookup map is derived from the category list
        self.categories == other.categories && self.overflow == other.overflow
    }
}
