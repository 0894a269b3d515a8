//! Games-Howell post-hoc pairwise comparison.
//!
//! For every pair of groups: mean difference, standard error,
//! Welch-Satterthwaite degrees of freedom, studentized t, p-value from the
//! studentized range distribution, and a simultaneous confidence interval.
//! Robust to unequal variances and unequal sample sizes.
//!
//! # Example
//!
//! ```
//! use posthoc::stats::{GamesHowell, Observation};
//!
//! let mut obs = Vec::new();
//! for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     obs.push(Observation::new("a", v));
//! }
//! for v in [10.0, 20.0, 30.0, 40.0, 50.0] {
//!     obs.push(Observation::new("b", v));
//! }
//!
//! let result = GamesHowell::new().run(&obs).expect("valid input");
//! let row = &result.table().rows()[0];
//! assert_eq!(row.group, "a : b");
//! assert!((row.mean_difference - 27.0).abs() < 1e-12);
//! assert!(row.lower_limit <= row.mean_difference && row.mean_difference <= row.upper_limit);
//! ```
//!
//! # References
//!
//! - Games, P. A. & Howell, J. F. (1976). "Pairwise multiple comparison
//!   procedures with unequal n's and/or variances." *J. Educ. Stat.* 1, 113-125.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::group::{aggregate, GroupStatistics, Observation};
use super::pairs::{combinations, GroupPair};
use super::result::{assemble, ResultTable};
use super::studentized_range::{StudentizedRange, Tukey};
use crate::config::GamesHowellConfig;
use crate::error::{PosthocError, Result};

/// One pairwise comparison.
///
/// `mean_difference` is `mean(second) - mean(first)` in the order of `pair`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<L> {
    /// Compared groups
    pub pair: GroupPair<L>,
    /// `mean(second) - mean(first)`
    pub mean_difference: f64,
    /// `sqrt((s1²/n1 + s2²/n2) / 2)`
    pub standard_error: f64,
    /// Welch-Satterthwaite degrees of freedom (NaN for degenerate pairs)
    pub degrees_of_freedom: f64,
    /// `|diff| / sqrt(s1²/n1 + s2²/n2)`
    pub t_value: f64,
    /// Upper-tail studentized range probability of `t * sqrt(2)`
    pub p_value: f64,
    /// Lower confidence limit
    pub lower_limit: f64,
    /// Upper confidence limit
    pub upper_limit: f64,
    /// Both groups had zero variance; the row follows the degenerate policy
    pub is_degenerate: bool,
}

impl<L> Comparison<L> {
    /// Row for a pair whose combined variance term is zero.
    ///
    /// Identical constant groups carry no evidence of a difference, so the row
    /// reports t = 0, p = 1 and a zero-width interval at the mean difference.
    pub fn degenerate(pair: GroupPair<L>, mean_difference: f64) -> Self {
        Self {
            pair,
            mean_difference,
            standard_error: 0.0,
            degrees_of_freedom: f64::NAN,
            t_value: 0.0,
            p_value: 1.0,
            lower_limit: mean_difference,
            upper_limit: mean_difference,
            is_degenerate: true,
        }
    }

    /// Whether `p_value < alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Welch-Satterthwaite degrees of freedom from the two squared standard
/// errors of the means.
///
/// Both terms are scaled by the larger one before squaring so the ratio
/// neither underflows nor overflows. Requires `vm_a + vm_b > 0`.
fn welch_satterthwaite(vm_a: f64, na: usize, vm_b: f64, nb: usize) -> f64 {
    let scale = vm_a.max(vm_b);
    let (ra, rb) = (vm_a / scale, vm_b / scale);
    let numerator = (ra + rb).powi(2);
    let denominator = ra.powi(2) / (na - 1) as f64 + rb.powi(2) / (nb - 1) as f64;
    numerator / denominator
}

/// Compares two groups, `a` first and `b` second.
///
/// The difference is `mean(b) - mean(a)` and the row is labelled `"a : b"`,
/// so swapping the arguments negates the difference and mirrors the
/// interval. The batch driver always passes pairs in canonical order.
///
/// `k` is the number of groups in the whole family of comparisons, shared by
/// every pair.
///
/// # Errors
///
/// - [`PosthocError::DegenerateVariance`] if both groups have zero variance
/// - [`PosthocError::InsufficientGroups`] if `k < 2`
/// - [`PosthocError::InvalidAlpha`] if alpha is outside (0, 1)
/// - [`PosthocError::Domain`] if the distribution rejects its arguments
pub fn compare_pair<L, D>(
    a: &GroupStatistics<L>,
    b: &GroupStatistics<L>,
    k: usize,
    alpha: f64,
    distribution: &D,
) -> Result<Comparison<L>>
where
    L: Ord + Clone + Display,
    D: StudentizedRange + ?Sized,
{
    if k < 2 {
        return Err(PosthocError::InsufficientGroups { found: k });
    }
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(PosthocError::InvalidAlpha { value: alpha });
    }

    let pair = GroupPair::new(a.label().clone(), b.label().clone()).ok_or_else(|| {
        PosthocError::domain("compare_pair", format!("group `{}` paired with itself", a.label()))
    })?;

    let diff = b.mean() - a.mean();
    let vm_a = a.variance_of_mean();
    let vm_b = b.variance_of_mean();
    let pooled_var_term = vm_a + vm_b;

    if pooled_var_term == 0.0 {
        return Err(PosthocError::DegenerateVariance {
            pair: pair.to_string(),
        });
    }

    let t_value = diff.abs() / pooled_var_term.sqrt();
    let df = welch_satterthwaite(vm_a, a.count(), vm_b, b.count());
    let standard_error = (0.5 * pooled_var_term).sqrt();

    if !(df.is_finite() && df > 0.0) {
        return Err(PosthocError::domain(
            "compare_pair",
            format!("degrees of freedom {df} for pair `{pair}`"),
        ));
    }

    let p_value = distribution.tail_probability(t_value * std::f64::consts::SQRT_2, k, df)?;
    let critical = distribution.quantile(1.0 - alpha, k, df)?;

    trace!(%pair, diff, t_value, df, p_value, "compared pair");

    Ok(Comparison {
        pair,
        mean_difference: diff,
        standard_error,
        degrees_of_freedom: df,
        t_value,
        p_value,
        lower_limit: diff - critical * standard_error,
        upper_limit: diff + critical * standard_error,
        is_degenerate: false,
    })
}

/// Output of a Games-Howell run.
#[derive(Debug, Clone)]
pub struct GamesHowellResult<L> {
    groups: BTreeMap<L, GroupStatistics<L>>,
    comparisons: Vec<Comparison<L>>,
    table: ResultTable,
    alpha: f64,
}

impl<L> GamesHowellResult<L> {
    /// Per-group summary statistics, in label order.
    pub fn groups(&self) -> &BTreeMap<L, GroupStatistics<L>> {
        &self.groups
    }

    /// Typed comparisons in canonical pair order.
    pub fn comparisons(&self) -> &[Comparison<L>] {
        &self.comparisons
    }

    /// Rendered result table.
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Number of groups `k`.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Significance level used for the intervals.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Consumes the result, returning the rendered table.
    pub fn into_table(self) -> ResultTable {
        self.table
    }
}

/// Games-Howell batch driver.
///
/// Aggregates observations, enumerates pairs, compares each pair, and
/// assembles the table. Fatal errors abort the batch; degenerate pairs are
/// reported with [`Comparison::degenerate`].
#[derive(Clone)]
pub struct GamesHowell {
    config: GamesHowellConfig,
    distribution: Arc<dyn StudentizedRange>,
}

impl std::fmt::Debug for GamesHowell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamesHowell")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for GamesHowell {
    fn default() -> Self {
        Self::new()
    }
}

impl GamesHowell {
    /// Creates a driver with the default configuration and [`Tukey`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GamesHowellConfig::default(),
            distribution: Arc::new(Tukey),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: GamesHowellConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the significance level.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.config = self.config.with_alpha(alpha);
        self
    }

    /// Enables or disables parallel pair evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config = self.config.with_parallel(parallel);
        self
    }

    /// Replaces the studentized range binding.
    #[must_use]
    pub fn with_distribution<D: StudentizedRange + 'static>(mut self, distribution: D) -> Self {
        self.distribution = Arc::new(distribution);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GamesHowellConfig {
        &self.config
    }

    /// Runs the test on row-wise observations.
    ///
    /// # Errors
    ///
    /// - [`PosthocError::InvalidAlpha`] for a bad configuration
    /// - [`PosthocError::InsufficientSampleSize`] if any group has < 2 values
    /// - [`PosthocError::NonFiniteObservation`] for NaN or infinite values
    /// - [`PosthocError::InsufficientGroups`] for fewer than 2 groups
    /// - [`PosthocError::Domain`] on an internal distribution failure
    pub fn run<L>(&self, observations: &[Observation<L>]) -> Result<GamesHowellResult<L>>
    where
        L: Ord + Clone + Display + Send + Sync,
    {
        self.config.validate()?;
        let groups = aggregate(observations)?;
        self.run_groups(groups)
    }

    /// Runs the test on a two-column table of labels and values.
    ///
    /// # Errors
    ///
    /// [`PosthocError::DimensionMismatch`] if the columns differ in length,
    /// otherwise as [`GamesHowell::run`].
    pub fn run_columns<L>(&self, labels: &[L], values: &[f64]) -> Result<GamesHowellResult<L>>
    where
        L: Ord + Clone + Display + Send + Sync,
    {
        if labels.len() != values.len() {
            return Err(PosthocError::DimensionMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }
        let observations: Vec<Observation<L>> = labels
            .iter()
            .zip(values)
            .map(|(label, &value)| Observation::new(label.clone(), value))
            .collect();
        self.run(&observations)
    }

    /// Runs the test on precomputed group statistics.
    ///
    /// # Errors
    ///
    /// As [`GamesHowell::run`], minus the aggregation errors.
    pub fn run_groups<L>(
        &self,
        groups: BTreeMap<L, GroupStatistics<L>>,
    ) -> Result<GamesHowellResult<L>>
    where
        L: Ord + Clone + Display + Send + Sync,
    {
        self.config.validate()?;
        let alpha = self.config.alpha();
        let pairs = combinations(groups.keys().cloned())?;
        let k = groups.len();

        debug!(
            groups = k,
            pairs = pairs.len(),
            alpha,
            parallel = self.config.parallel(),
            "games-howell start"
        );

        let distribution = self.distribution.as_ref();
        let evaluate = |pair: &GroupPair<L>| -> Result<Comparison<L>> {
            let a = &groups[pair.first()];
            let b = &groups[pair.second()];
            match compare_pair(a, b, k, alpha, distribution) {
                Err(PosthocError::DegenerateVariance { pair: name }) => {
                    warn!(pair = %name, "zero combined variance, reporting degenerate row");
                    Ok(Comparison::degenerate(pair.clone(), b.mean() - a.mean()))
                }
                other => other,
            }
        };

        // Indexed collect keeps canonical pair order in both modes.
        let comparisons: Vec<Comparison<L>> = if self.config.parallel() {
            pairs.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            pairs.iter().map(evaluate).collect::<Result<_>>()?
        };

        let table = assemble(&comparisons);
        debug!(rows = table.len(), "games-howell done");

        Ok(GamesHowellResult {
            groups,
            comparisons,
            table,
            alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(label: &'static str, values: &[f64]) -> GroupStatistics<&'static str> {
        GroupStatistics::from_values(label, values).expect("valid group")
    }

    #[test]
    fn test_known_value_fixture() {
        let a = stats("A", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = stats("B", &[10.0, 20.0, 30.0, 40.0, 50.0]);
        let c = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid pair");

        assert!((c.mean_difference - 27.0).abs() < 1e-12);
        assert!((c.t_value - 27.0 / 50.5_f64.sqrt()).abs() < 1e-12);
        assert!((c.standard_error - 25.25_f64.sqrt()).abs() < 1e-12);
        let expected_df = 50.5_f64.powi(2) / (0.25 / 4.0 + 2500.0 / 4.0);
        assert!((c.degrees_of_freedom - expected_df).abs() < 1e-12);
        assert!((c.degrees_of_freedom - 4.08).abs() < 0.01);
        assert!(c.p_value > 0.0 && c.p_value < 0.05);
        assert!(c.lower_limit > 0.0);
    }

    #[test]
    fn test_swapping_arguments_negates_difference() {
        let a = stats("A", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = stats("B", &[10.0, 20.0, 30.0, 40.0, 50.0]);
        let ab = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid pair");
        let ba = compare_pair(&b, &a, 2, 0.05, &Tukey).expect("valid pair");

        assert_eq!(ab.pair.to_string(), "A : B");
        assert_eq!(ba.pair.to_string(), "B : A");
        assert!((ab.mean_difference - 27.0).abs() < 1e-12);
        assert!((ba.mean_difference + 27.0).abs() < 1e-12);
        assert!((ab.lower_limit + ba.upper_limit).abs() < 1e-9);
        assert!((ab.upper_limit + ba.lower_limit).abs() < 1e-9);
        assert_eq!(ab.t_value, ba.t_value);
        assert_eq!(ab.p_value, ba.p_value);
    }

    #[test]
    fn test_welch_df_is_scale_invariant() {
        let unit = welch_satterthwaite(0.5, 2, 2.0, 2);
        for scale in [1e-300, 1e-160, 1e160, 1e300] {
            let scaled = welch_satterthwaite(0.5 * scale, 2, 2.0 * scale, 2);
            assert!((scaled - unit).abs() < 1e-12, "scale {scale}: {scaled} vs {unit}");
        }
    }

    #[test]
    fn test_extreme_scales_do_not_abort_batch() {
        let labels = ["a", "a", "b", "b"];
        let unit = GamesHowell::new()
            .run_columns(&labels, &[0.0, 1.0, 0.0, 2.0])
            .expect("valid input");
        let expected = &unit.comparisons()[0];

        // Squared variances of the mean under- or overflow at these scales.
        for scale in [1e-150, 1e150] {
            let values = [0.0, scale, 0.0, 2.0 * scale];
            let result = GamesHowell::new()
                .run_columns(&labels, &values)
                .expect("finite input at any scale");
            let c = &result.comparisons()[0];
            assert!((c.degrees_of_freedom - expected.degrees_of_freedom).abs() < 1e-9);
            assert!((c.t_value - expected.t_value).abs() < 1e-9);
            assert!((c.p_value - expected.p_value).abs() < 1e-9);
        }

        // Subnormal variances lose precision but still give a usable row.
        let result = GamesHowell::new()
            .run_columns(&labels, &[0.0, 1e-160, 0.0, 2e-160])
            .expect("finite input at any scale");
        let df = result.comparisons()[0].degrees_of_freedom;
        assert!((1.0..=2.0).contains(&df), "df = {df}");
    }

    #[test]
    fn test_is_significant_uses_strict_threshold() {
        let a = stats("A", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = stats("B", &[10.0, 20.0, 30.0, 40.0, 50.0]);
        let c = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid pair");
        assert!(c.is_significant(0.05));
        assert!(!c.is_significant(c.p_value));
        assert!(!Comparison::degenerate(c.pair.clone(), 0.0).is_significant(0.99));
    }

    #[test]
    fn test_zero_variance_pair_is_degenerate_error() {
        let a = stats("A", &[5.0; 4]);
        let b = stats("B", &[5.0; 4]);
        let err = compare_pair(&a, &b, 2, 0.05, &Tukey).expect_err("zero variance");
        assert_eq!(
            err,
            PosthocError::DegenerateVariance {
                pair: "A : B".into()
            }
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_one_constant_group_is_not_degenerate() {
        let a = stats("A", &[5.0; 4]);
        let b = stats("B", &[4.0, 6.0, 5.0, 7.0]);
        let c = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid pair");
        assert!(!c.is_degenerate);
        // df collapses to n_b - 1
        assert!((c.degrees_of_freedom - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_k_and_alpha() {
        let a = stats("A", &[1.0, 2.0]);
        let b = stats("B", &[3.0, 5.0]);
        assert!(matches!(
            compare_pair(&a, &b, 1, 0.05, &Tukey),
            Err(PosthocError::InsufficientGroups { found: 1 })
        ));
        assert!(matches!(
            compare_pair(&a, &b, 2, 1.0, &Tukey),
            Err(PosthocError::InvalidAlpha { .. })
        ));
    }

    #[test]
    fn test_self_pair_is_domain_error() {
        let a = stats("A", &[1.0, 2.0]);
        assert!(matches!(
            compare_pair(&a, &a, 2, 0.05, &Tukey),
            Err(PosthocError::Domain { .. })
        ));
    }

    #[test]
    fn test_batch_degenerate_policy() {
        let obs: Vec<Observation<i32>> = [5.0, 5.0, 5.0, 5.0]
            .iter()
            .flat_map(|&v| [Observation::new(1, v), Observation::new(2, v)])
            .collect();
        let result = GamesHowell::new().run(&obs).expect("degenerate pairs do not abort");
        let c = &result.comparisons()[0];
        assert!(c.is_degenerate);
        assert_eq!(c.mean_difference, 0.0);
        assert_eq!(c.t_value, 0.0);
        assert_eq!(c.p_value, 1.0);
        assert_eq!(c.lower_limit, 0.0);
        assert_eq!(c.upper_limit, 0.0);
    }

    #[test]
    fn test_invalid_alpha_fails_before_aggregation() {
        // Input would also fail aggregation; alpha is checked first.
        let obs = vec![Observation::new("a", 1.0)];
        let err = GamesHowell::new()
            .with_alpha(0.0)
            .run(&obs)
            .expect_err("alpha = 0 is invalid");
        assert!(matches!(err, PosthocError::InvalidAlpha { .. }));
    }

    #[test]
    fn test_run_columns_length_mismatch() {
        let err = GamesHowell::new()
            .run_columns(&["a", "b"], &[1.0])
            .expect_err("length mismatch");
        assert_eq!(err, PosthocError::DimensionMismatch { labels: 2, values: 1 });
    }

    struct FailingDistribution;

    impl StudentizedRange for FailingDistribution {
        fn quantile(&self, _confidence: f64, _k: usize, _df: f64) -> Result<f64> {
            Err(PosthocError::domain("quantile", "unavailable"))
        }

        fn tail_probability(&self, _q: f64, _k: usize, _df: f64) -> Result<f64> {
            Ok(0.5)
        }
    }

    #[test]
    fn test_distribution_failure_aborts_batch() {
        let labels = ["a", "a", "b", "b", "c", "c"];
        let values = [1.0, 2.0, 3.0, 5.0, 8.0, 13.0];
        let err = GamesHowell::new()
            .with_distribution(FailingDistribution)
            .run_columns(&labels, &values)
            .expect_err("domain errors are fatal");
        assert!(err.is_fatal());
        assert!(matches!(err, PosthocError::Domain { function: "quantile", .. }));
    }
}

#[cfg(test)]
#[path = "tests_games_howell_contract.rs"]
mod tests_games_howell_contract;
