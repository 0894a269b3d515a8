//! Group-by reduction of raw observations into per-group summary statistics.
//!
//! Variance is always the unbiased sample variance (divisor `n - 1`). The
//! Welch-Satterthwaite degrees of freedom downstream assume that estimator.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::{PosthocError, Result};

/// A single labelled measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<L> {
    /// Group label
    pub label: L,
    /// Metric value
    pub value: f64,
}

impl<L> Observation<L> {
    /// Creates an observation.
    #[must_use]
    pub fn new(label: L, value: f64) -> Self {
        Self { label, value }
    }
}

impl<L> From<(L, f64)> for Observation<L> {
    fn from((label, value): (L, f64)) -> Self {
        Self { label, value }
    }
}

/// Summary statistics of one group.
///
/// Always holds `count >= 2`, a finite mean and a finite non-negative variance.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatistics<L> {
    label: L,
    mean: f64,
    variance: f64,
    count: usize,
}

impl<L: Display> GroupStatistics<L> {
    /// Computes the statistics of `values`.
    ///
    /// # Errors
    ///
    /// - [`PosthocError::InsufficientSampleSize`] if fewer than 2 values
    /// - [`PosthocError::NonFiniteObservation`] if any value is NaN or infinite
    ///
    /// # Example
    ///
    /// ```
    /// use posthoc::stats::GroupStatistics;
    ///
    /// let stats = GroupStatistics::from_values("a", &[1.0, 2.0, 3.0, 4.0, 5.0]).expect("valid");
    /// assert!((stats.mean() - 3.0).abs() < 1e-12);
    /// assert!((stats.variance() - 2.5).abs() < 1e-12);
    /// assert_eq!(stats.count(), 5);
    /// ```
    pub fn from_values(label: L, values: &[f64]) -> Result<Self> {
        let n = values.len();
        if n < 2 {
            return Err(PosthocError::InsufficientSampleSize {
                group: label.to_string(),
                count: n,
            });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(PosthocError::NonFiniteObservation {
                group: label.to_string(),
                value: bad,
            });
        }

        // Two-pass: mean first, then squared deviations.
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        Ok(Self {
            label,
            mean,
            variance,
            count: n,
        })
    }

    /// Builds statistics from an already computed summary.
    ///
    /// `variance` must be the unbiased sample variance.
    ///
    /// # Errors
    ///
    /// - [`PosthocError::InsufficientSampleSize`] if `count < 2`
    /// - [`PosthocError::NonFiniteObservation`] if mean or variance is not
    ///   finite, or the variance is negative
    pub fn from_summary(label: L, mean: f64, variance: f64, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(PosthocError::InsufficientSampleSize {
                group: label.to_string(),
                count,
            });
        }
        for value in [mean, variance] {
            if !value.is_finite() {
                return Err(PosthocError::NonFiniteObservation {
                    group: label.to_string(),
                    value,
                });
            }
        }
        if variance < 0.0 {
            return Err(PosthocError::NonFiniteObservation {
                group: label.to_string(),
                value: variance,
            });
        }
        Ok(Self {
            label,
            mean,
            variance,
            count,
        })
    }
}

impl<L> GroupStatistics<L> {
    /// Group label.
    pub fn label(&self) -> &L {
        &self.label
    }

    /// Sample mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Squared standard error of the mean, `variance / count`.
    pub fn variance_of_mean(&self) -> f64 {
        self.variance / self.count as f64
    }
}

/// Reduces observations to one [`GroupStatistics`] per distinct label.
///
/// The map iterates in ascending label order. Every group is checked before
/// anything is returned, so a single undersized group fails the whole input.
///
/// # Errors
///
/// - [`PosthocError::InsufficientSampleSize`] for the first (in label order)
///   group with fewer than 2 observations
/// - [`PosthocError::NonFiniteObservation`] for NaN or infinite values
///
/// # Example
///
/// ```
/// use posthoc::stats::{aggregate, Observation};
///
/// let obs = vec![
///     Observation::new("b", 4.0),
///     Observation::new("a", 1.0),
///     Observation::new("b", 6.0),
///     Observation::new("a", 3.0),
/// ];
/// let groups = aggregate(&obs).expect("valid input");
/// let labels: Vec<_> = groups.keys().copied().collect();
/// assert_eq!(labels, vec!["a", "b"]);
/// assert!((groups["b"].mean() - 5.0).abs() < 1e-12);
/// ```
pub fn aggregate<L>(observations: &[Observation<L>]) -> Result<BTreeMap<L, GroupStatistics<L>>>
where
    L: Ord + Clone + Display,
{
    let mut buckets: BTreeMap<L, Vec<f64>> = BTreeMap::new();
    for obs in observations {
        buckets.entry(obs.label.clone()).or_default().push(obs.value);
    }

    if let Some((label, values)) = buckets.iter().find(|(_, v)| v.len() < 2) {
        return Err(PosthocError::InsufficientSampleSize {
            group: label.to_string(),
            count: values.len(),
        });
    }

    buckets
        .into_iter()
        .map(|(label, values)| {
            let stats = GroupStatistics::from_values(label.clone(), &values)?;
            Ok((label, stats))
        })
        .collect()
}
