use statrs::function::erf::erf;

/// Calculates the entropy (log base 2) of a vector of class counts.
///
/// Classes with a zero count contribute nothing, so the result is never NaN.
///
/// # Parameters
///
/// - `counts` - Number (or weight) of examples per class
///
/// # Returns
///
/// - `f64` - Entropy of the class distribution, 0.0 when the total is zero
///
/// # Examples
/// ```rust
/// use trepan::math::entropy_from_counts;
///
/// assert_eq!(entropy_from_counts(&[3.0, 0.0]), 0.0);
/// assert!((entropy_from_counts(&[1.0, 1.0, 1.0, 1.0]) - 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn entropy_from_counts(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    counts
        .iter()
        .filter(|&&count| count > 0.0)
        .map(|&count| {
            let p = count / total;
            -p * p.log2()
        })
        .sum()
}

/// Calculates the information gain of partitioning a set of examples.
///
/// The gain is the entropy of the parent minus the entropy of every partition
/// weighted by the fraction of the parent's examples it receives. Empty
/// partitions are ignored.
///
/// # Parameters
///
/// - `parent` - Class counts of the examples before the split
/// - `partitions` - Class counts of every partition produced by the split
///
/// # Returns
///
/// - `f64` - Information gain of the split (0.0 for an empty parent)
///
/// # Examples
/// ```rust
/// use trepan::math::information_gain;
///
/// let gain = information_gain(&[2.0, 2.0], &[vec![1.0, 1.0], vec![1.0, 1.0]]);
/// assert!(gain.abs() < 1e-12);
/// ```
#[inline]
pub fn information_gain(parent: &[f64], partitions: &[Vec<f64>]) -> f64 {
    let total: f64 = parent.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let weighted_children: f64 = partitions
        .iter()
        .map(|counts| {
            let n: f64 = counts.iter().sum();
            if n > 0.0 {
                (n / total) * entropy_from_counts(counts)
            } else {
                0.0
            }
        })
        .sum();

    entropy_from_counts(parent) - weighted_children
}

/// Cumulative distribution function of the standard normal distribution.
///
/// # Parameters
///
/// - `z` - Point at which the cumulative probability is evaluated
///
/// # Returns
///
/// - `f64` - `P(Z <= z)` for `Z ~ N(0, 1)`
///
/// # Examples
/// ```rust
/// use trepan::math::standard_normal_cdf;
///
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-12);
/// assert!(standard_normal_cdf(8.0) > 0.999999);
/// ```
#[inline]
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Returns the index of the first maximum of a slice.
///
/// # Parameters
///
/// - `values` - Values to scan
///
/// # Returns
///
/// - `Option<usize>` - Index of the first maximal element, `None` for an empty slice
///
/// # Examples
/// ```rust
/// use trepan::math::max_index;
///
/// assert_eq!(max_index(&[0.2, 0.7, 0.7]), Some(1));
/// assert_eq!(max_index(&[]), None);
/// ```
#[inline]
pub fn max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some(b) if value <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Rounds a value to a fixed number of decimal places.
///
/// # Parameters
///
/// - `value` - Value to round
/// - `decimals` - Number of decimal places kept
///
/// # Returns
///
/// - `f64` - The rounded value
///
/// # Examples
/// ```rust
/// use trepan::math::round_to;
///
/// assert_eq!(round_to(0.12345, 3), 0.123);
/// ```
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
