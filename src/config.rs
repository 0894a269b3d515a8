//! Configuration for a Games-Howell run.

use serde::{Deserialize, Serialize};

use crate::error::{PosthocError, Result};

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Games-Howell configuration.
///
/// # Example
///
/// ```
/// use posthoc::GamesHowellConfig;
///
/// let config = GamesHowellConfig::new().with_alpha(0.01).with_parallel(true);
/// assert!((config.alpha() - 0.01).abs() < 1e-12);
/// assert!(config.parallel());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesHowellConfig {
    /// Significance level for the confidence intervals
    alpha: f64,
    /// Evaluate pairs on the rayon thread pool
    parallel: bool,
}

impl Default for GamesHowellConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            parallel: false,
        }
    }
}

impl GamesHowellConfig {
    /// Creates a configuration with alpha = 0.05, evaluated sequentially.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the significance level.
    ///
    /// The value is checked by [`GamesHowellConfig::validate`], not here.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enables or disables parallel pair evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the significance level.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the confidence level, `1 - alpha`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        1.0 - self.alpha
    }

    /// Returns whether pairs are evaluated in parallel.
    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Checks that alpha lies in the open interval (0, 1).
    ///
    /// # Errors
    ///
    /// Returns [`PosthocError::InvalidAlpha`] otherwise (NaN included).
    pub fn validate(&self) -> Result<()> {
        if self.alpha > 0.0 && self.alpha < 1.0 {
            Ok(())
        } else {
            Err(PosthocError::InvalidAlpha { value: self.alpha })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alpha() {
        let config = GamesHowellConfig::default();
        assert!((config.alpha() - 0.05).abs() < 1e-12);
        assert!((config.confidence() - 0.95).abs() < 1e-12);
        assert!(!config.parallel());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = GamesHowellConfig::new()
                .with_alpha(alpha)
                .validate()
                .expect_err("alpha outside (0, 1) must be rejected");
            assert!(matches!(err, PosthocError::InvalidAlpha { .. }));
        }
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: GamesHowellConfig =
            serde_json::from_str(r#"{"parallel": true}"#).expect("valid json");
        assert!((config.alpha() - DEFAULT_ALPHA).abs() < 1e-12);
        assert!(config.parallel());
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_string(&GamesHowellConfig::new().with_alpha(0.1))
            .expect("serializable");
        assert_eq!(json, r#"{"alpha":0.1,"parallel":false}"#);
    }
}
