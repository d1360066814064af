//! Integration tests for histogram arithmetic, promotion, and scaling.

use multihist::{
    CountHistogram, Histogram, HistogramError, IntegerAxis, Profile, RegularAxis, Sample, Sum,
    VariableAxis, Weight, WeightedHistogram,
};

use approx::assert_abs_diff_eq;

fn axes_2d() -> Vec<multihist::Axis> {
    vec![
        IntegerAxis::new(0, 3).unwrap().into(),
        RegularAxis::new(2, 0.0, 2.0).unwrap().into(),
    ]
}

fn filled_counts(coords: &[[f64; 2]]) -> CountHistogram {
    let mut hist = CountHistogram::new(axes_2d()).unwrap();
    for c in coords {
        hist.fill(c).unwrap();
    }
    hist
}

// =============================================================================
// Additivity
// =============================================================================

#[test]
fn test_add_is_commutative() {
    let a = filled_counts(&[[0.0, 0.5], [1.0, 1.5]]);
    let b = filled_counts(&[[1.0, 1.5], [2.0, 0.5], [5.0, 0.5]]);
    assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
}

#[test]
fn test_add_is_associative() {
    let a = filled_counts(&[[0.0, 0.5]]);
    let b = filled_counts(&[[1.0, 1.5], [1.0, 1.5]]);
    let c = filled_counts(&[[2.0, 0.5]]);
    let left = a.add(&b).unwrap().add(&c).unwrap();
    let right = a.add(&b.add(&c).unwrap()).unwrap();
    assert_eq!(left, right);
}

#[test]
fn test_add_assign_accumulates_cellwise() {
    let mut a = filled_counts(&[[0.0, 0.5], [1.0, 0.5]]);
    let b = filled_counts(&[[1.0, 0.5]]);
    a.add_assign(&b).unwrap();
    assert_eq!(a.at(&[0, 0]).unwrap().count(), 1);
    assert_eq!(a.at(&[1, 0]).unwrap().count(), 2);
}

#[test]
fn test_axis_mismatch_rejected_and_target_unchanged() {
    let mut a = filled_counts(&[[0.0, 0.5]]);
    let snapshot = a.clone();
    let b = CountHistogram::new(vec![
        IntegerAxis::new(0, 4).unwrap().into(),
        RegularAxis::new(2, 0.0, 2.0).unwrap().into(),
    ])
    .unwrap();

    assert_eq!(a.add_assign(&b).unwrap_err(), HistogramError::AxesMismatch);
    assert_eq!(a, snapshot);
    assert_eq!(a.add(&b).unwrap_err(), HistogramError::AxesMismatch);
}

#[test]
fn test_flow_flags_are_structural() {
    // same ordinary bins, different flow layout: not addable
    let mut a = CountHistogram::new(vec![IntegerAxis::new(0, 3).unwrap().into()]).unwrap();
    let b = CountHistogram::new(vec![
        IntegerAxis::with_options(0, 3, false, true).unwrap().into(),
    ])
    .unwrap();
    assert_eq!(a.add_assign(&b).unwrap_err(), HistogramError::AxesMismatch);
}

// =============================================================================
// Promotion
// =============================================================================

#[test]
fn test_count_plus_weighted_promotes() {
    let mut counts = CountHistogram::new(axes_2d()).unwrap();
    counts.fill(&[1.0, 0.5]).unwrap();

    let mut weighted = WeightedHistogram::new(axes_2d()).unwrap();
    weighted.fill_weighted(&[1.0, 0.5], Weight(2.5)).unwrap();

    let total: WeightedHistogram = counts.add(&weighted).unwrap();
    let cell = total.at(&[1, 0]).unwrap();
    assert_eq!(cell.sum_of_weights(), 3.5);
    // the count side contributes unit weights
    assert_eq!(cell.sum_of_weights_squared(), 1.0 + 6.25);
}

#[test]
fn test_count_plus_sum_promotes() {
    let mut counts = CountHistogram::new(axes_2d()).unwrap();
    counts.fill(&[0.0, 0.5]).unwrap();
    let mut sums = Histogram::<Sum>::new(axes_2d()).unwrap();
    sums.fill_weighted(&[0.0, 0.5], Weight(0.25)).unwrap();

    let total: Histogram<Sum> = counts.add(&sums).unwrap();
    assert_eq!(total.at(&[0, 0]).unwrap().sum(), 1.25);
}

#[test]
fn test_profile_merge() {
    let axes = || vec![IntegerAxis::new(0, 2).unwrap().into()];
    let mut a = Profile::new(axes()).unwrap();
    a.fill_sampled(&[0.0], &Sample::single(1.0)).unwrap();
    a.fill_sampled(&[0.0], &Sample::single(2.0)).unwrap();
    let mut b = Profile::new(axes()).unwrap();
    b.fill_sampled(&[0.0], &Sample::single(3.0)).unwrap();
    b.fill_sampled(&[0.0], &Sample::single(4.0)).unwrap();

    let mut direct = Profile::new(axes()).unwrap();
    for x in [1.0, 2.0, 3.0, 4.0] {
        direct.fill_sampled(&[0.0], &Sample::single(x)).unwrap();
    }

    let merged = a.add(&b).unwrap();
    assert_abs_diff_eq!(merged, direct, epsilon = 1e-12);
}

// =============================================================================
// Scaling
// =============================================================================

#[test]
fn test_scaled_by_one_is_identity() {
    let counts = filled_counts(&[[0.0, 0.5], [1.0, 1.5], [1.0, 1.5]]);
    let scaled = counts.scaled(1.0);
    for (value, cell) in counts.values().iter().zip(scaled.cells()) {
        assert_eq!(*value, cell.sum());
    }
}

#[test]
fn test_scale_roundtrip_within_tolerance() {
    let counts = filled_counts(&[[0.0, 0.5], [1.0, 1.5], [2.0, 0.5]]);
    let reference = counts.scaled(1.0);

    let mut roundtrip = counts.scaled(0.3);
    roundtrip.div_by(0.3);
    assert_abs_diff_eq!(roundtrip, reference, epsilon = 1e-12);
}

#[test]
fn test_scaled_promotes_counts() {
    let counts = filled_counts(&[[1.0, 0.5], [1.0, 0.5]]);
    let halved: Histogram<Sum> = counts.scaled(0.5);
    assert_eq!(halved.at(&[1, 0]).unwrap().sum(), 1.0);
    // operand untouched
    assert_eq!(counts.at(&[1, 0]).unwrap().count(), 2);
}

#[test]
fn test_scale_by_weighted_scales_variance_quadratically() {
    let mut hist = WeightedHistogram::new(axes_2d()).unwrap();
    hist.fill_weighted(&[1.0, 0.5], Weight(2.0)).unwrap();
    hist.scale_by(3.0);
    let cell = hist.at(&[1, 0]).unwrap();
    assert_eq!(cell.sum_of_weights(), 6.0);
    assert_eq!(cell.sum_of_weights_squared(), 36.0);
}

#[test]
fn test_divided_matches_reciprocal_scale() {
    let mut sums = Histogram::<Sum>::new(vec![
        VariableAxis::new(vec![0.0, 1.0, 4.0]).unwrap().into(),
    ])
    .unwrap();
    sums.fill_weighted(&[2.0], Weight(8.0)).unwrap();
    let divided = sums.divided(4.0);
    assert_abs_diff_eq!(divided, sums.scaled(0.25), epsilon = 1e-12);
    assert_eq!(divided.cell(1).unwrap().sum(), 2.0);
}

// =============================================================================
// Conversion
// =============================================================================

#[test]
fn test_widening_conversion_chain() {
    let counts = filled_counts(&[[1.0, 0.5], [1.0, 0.5], [2.0, 1.5]]);
    let sums: Histogram<Sum> = counts.converted();
    let weighted: WeightedHistogram = sums.converted();

    assert_eq!(sums.at(&[1, 0]).unwrap().sum(), 2.0);
    let cell = weighted.at(&[1, 0]).unwrap();
    assert_eq!(cell.sum_of_weights(), 2.0);
    assert_eq!(cell.sum_of_weights_squared(), 2.0);
}

#[test]
fn test_direct_widening_equals_chained() {
    let counts = filled_counts(&[[0.0, 0.5], [3.0, 2.0]]);
    let direct: WeightedHistogram = counts.converted();
    let chained: WeightedHistogram = counts.converted::<Sum>().converted();
    assert_eq!(direct, chained);
}

#[test]
fn test_assign_from_counts_into_weighted() {
    let counts = filled_counts(&[[1.0, 0.5]]);
    let mut weighted =
        WeightedHistogram::new(vec![IntegerAxis::new(0, 9).unwrap().into()]).unwrap();
    weighted.assign_from(&counts);
    assert!(weighted.axes().structurally_equal(counts.axes()));
    assert_eq!(weighted.at(&[1, 0]).unwrap().sum_of_weights(), 1.0);
}
