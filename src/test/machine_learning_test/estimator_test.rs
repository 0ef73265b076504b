use super::*;

#[test]
fn test_nominal_estimator_counts() {
    let mut estimator = NominalEstimator::new(3, false);
    estimator.add_value(0.0, 1.0);
    estimator.add_value(2.0, 1.0);
    estimator.add_value(2.0, 2.0);

    assert_eq!(estimator.num_symbols(), 3);
    assert_relative_eq!(estimator.sum_of_counts(), 4.0);
    assert_relative_eq!(estimator.probability(0.0), 0.25);
    assert_relative_eq!(estimator.probability(1.0), 0.0);
    assert_relative_eq!(estimator.probability(2.0), 0.75);
}

#[test]
fn test_nominal_estimator_laplace() {
    let mut estimator = NominalEstimator::new(2, true);
    assert_relative_eq!(estimator.probability(0.0), 0.5);

    estimator.add_value(1.0, 2.0);
    assert_relative_eq!(estimator.probability(1.0), 0.75);
}

#[test]
fn test_nominal_estimator_ignores_unknown_codes_and_zero_weight() {
    let mut estimator = NominalEstimator::new(2, false);
    estimator.add_value(5.0, 1.0);
    estimator.add_value(-1.0, 1.0);
    estimator.add_value(f64::NAN, 1.0);
    estimator.add_value(1.0, 0.0);

    assert_eq!(estimator.sum_of_counts(), 0.0);
    assert_eq!(estimator.probability(1.0), 0.0);
    assert!(estimator.sample(7).is_nan());
}

#[test]
fn test_nominal_estimator_sample() {
    let mut estimator = NominalEstimator::new(4, false);
    estimator.add_value(2.0, 5.0);

    // only one symbol carries mass
    for seed in 0..20 {
        assert_eq!(estimator.sample(seed), 2.0);
    }

    estimator.add_value(0.0, 5.0);
    for seed in 0..50 {
        let value = estimator.sample(seed);
        assert!(value == 0.0 || value == 2.0);
        assert_eq!(value, estimator.sample(seed));
    }
}

#[test]
fn test_numeric_estimator_merges_repeated_values() {
    let mut estimator = NumericEstimator::new(0.01);
    estimator.add_value(1.0, 1.0);
    estimator.add_value(1.001, 1.0);
    estimator.add_value(3.0, 1.0);

    // 1.001 rounds onto the kernel at 1.0
    assert_eq!(estimator.num_kernels(), 2);
    assert_relative_eq!(estimator.sum_of_weights(), 3.0);
    assert_relative_eq!(estimator.precision(), 0.01);
}

#[test]
fn test_numeric_estimator_bandwidth() {
    let mut estimator = NumericEstimator::new(0.01);
    assert_relative_eq!(estimator.standard_deviation(), 0.01 / 6.0);

    estimator.add_value(5.0, 1.0);
    assert_relative_eq!(estimator.standard_deviation(), 0.01 / 6.0);

    estimator.add_value(15.0, 1.0);
    assert_relative_eq!(
        estimator.standard_deviation(),
        10.0 / 2f64.sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_numeric_estimator_probability() {
    let empty = NumericEstimator::new(0.01);
    // one precision unit spans +/- 3 standard deviations
    assert_abs_diff_eq!(empty.probability(0.0), 0.9973, epsilon = 1e-3);

    let mut estimator = NumericEstimator::new(0.01);
    for value in [1.0, 2.0, 2.0, 3.0, 10.0] {
        estimator.add_value(value, 1.0);
    }

    let near = estimator.probability(2.0);
    let far = estimator.probability(40.0);
    assert!(near > 0.0);
    assert!(near > far);
}

#[test]
fn test_numeric_estimator_sample() {
    let empty = NumericEstimator::new(0.01);
    assert!(empty.sample(3).is_nan());

    let mut single = NumericEstimator::new(0.01);
    single.add_value(5.0, 3.0);
    for seed in 0..20 {
        let value = single.sample(seed);
        assert!((value - 5.0).abs() <= single.standard_deviation() + 1e-12);
    }

    let mut spread = NumericEstimator::new(0.01);
    for value in [0.0, 4.0, 8.0] {
        spread.add_value(value, 1.0);
    }
    let sd = spread.standard_deviation();
    for seed in 0..50 {
        let value = spread.sample(seed);
        assert!(value >= -sd - 1e-12 && value <= 8.0 + sd + 1e-12);
        assert_eq!(value, spread.sample(seed));
    }
}

#[test]
fn test_estimator_for_attribute() {
    let nominal = Estimator::for_attribute(&Attribute::nominal("a", vec!["p", "q"]));
    assert!(matches!(nominal, Some(Estimator::Nominal(ref e)) if e.num_symbols() == 2));

    let numeric = Estimator::for_attribute(&Attribute::numeric("x"));
    assert!(matches!(
        numeric,
        Some(Estimator::Numeric(ref e)) if e.precision() == DEFAULT_NUMERIC_PRECISION
    ));

    assert!(Estimator::for_attribute(&Attribute::string("s")).is_none());
}

#[test]
fn test_estimator_display() {
    let mut nominal = NominalEstimator::new(2, false);
    nominal.add_value(1.0, 1.0);
    assert!(nominal.to_string().starts_with("Discrete Estimator. Counts ="));

    let mut numeric = Estimator::Numeric(NumericEstimator::new(0.01));
    numeric.add_value(2.0, 1.0);
    numeric.add_value(4.0, 2.0);
    let text = numeric.to_string();
    assert!(text.contains("2 Normal Kernels"));
    assert!(text.contains("Weights ="));
}

#[test]
fn test_nominal_probabilities_sum_to_one() {
    for laplace in [false, true] {
        let mut estimator = NominalEstimator::new(4, laplace);
        estimator.add_value(3.0, 0.5);
        estimator.add_value(1.0, 2.0);

        let total: f64 = (0..4).map(|v| estimator.probability(v as f64)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_single_kernel_peaks_at_its_value() {
    let mut estimator = NumericEstimator::new(0.01);
    estimator.add_value(3.0, 1.0);

    let peak = estimator.probability(3.0);
    for k in 1..=5 {
        let offset = k as f64 * 0.01;
        assert!(peak > estimator.probability(3.0 + offset));
        assert!(peak > estimator.probability(3.0 - offset));
    }
}
