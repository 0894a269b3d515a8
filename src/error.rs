//! Error types for post-hoc comparison.
//!
//! Every fatal condition aborts the whole batch; no partial result table is
//! ever produced.

use thiserror::Error;

/// Result type alias for post-hoc operations.
pub type Result<T> = std::result::Result<T, PosthocError>;

/// Main error type for post-hoc comparison.
///
/// # Examples
///
/// ```
/// use posthoc::error::PosthocError;
///
/// let err = PosthocError::InsufficientGroups { found: 1 };
/// assert!(err.to_string().contains("at least 2 groups"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PosthocError {
    /// Fewer than two distinct group labels in the input.
    #[error("pairwise comparison requires at least 2 groups, found {found}")]
    InsufficientGroups {
        /// Number of distinct labels found
        found: usize,
    },

    /// A group has fewer than two observations, so its sample variance is undefined.
    #[error("group `{group}` has {count} observation(s), at least 2 are required")]
    InsufficientSampleSize {
        /// Offending group label
        group: String,
        /// Observations found for the group
        count: usize,
    },

    /// Both groups of a pair have zero variance, so t and df are 0/0.
    #[error("pair `{pair}` has zero combined variance")]
    DegenerateVariance {
        /// Rendered pair label, e.g. `"3 : 9"`
        pair: String,
    },

    /// A distribution function was called outside its domain.
    ///
    /// Input checks run before any distribution call, so reaching this is an
    /// internal invariant violation.
    #[error("internal domain error in {function}: {reason}")]
    Domain {
        /// Distribution function name
        function: &'static str,
        /// Constraint that was violated
        reason: String,
    },

    /// Significance level outside the open interval (0, 1).
    #[error("invalid significance level alpha = {value}, expected 0 < alpha < 1")]
    InvalidAlpha {
        /// Provided alpha
        value: f64,
    },

    /// NaN or infinite metric value.
    #[error("group `{group}` contains non-finite value {value}")]
    NonFiniteObservation {
        /// Group the value belongs to
        group: String,
        /// The offending value
        value: f64,
    },

    /// Label and value columns have different lengths.
    #[error("column length mismatch: {labels} labels, {values} values")]
    DimensionMismatch {
        /// Length of the label column
        labels: usize,
        /// Length of the value column
        values: usize,
    },
}

impl PosthocError {
    /// Builds a [`PosthocError::Domain`] error.
    pub(crate) fn domain(function: &'static str, reason: impl Into<String>) -> Self {
        Self::Domain {
            function,
            reason: reason.into(),
        }
    }

    /// Returns true for errors that abort the whole batch.
    ///
    /// Only [`PosthocError::DegenerateVariance`] is handled locally by the
    /// batch driver.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DegenerateVariance { .. })
    }
}
