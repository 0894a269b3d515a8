//! Posthoc: pairwise post-hoc mean comparisons in pure Rust.
//!
//! Implements the Games-Howell procedure: every pair of groups is compared
//! with Welch-Satterthwaite degrees of freedom and a studentized range
//! correction for the family of `k (k - 1) / 2` comparisons. It does not
//! assume equal variances or equal sample sizes.
//!
//! # Quick Start
//!
//! ```
//! use posthoc::prelude::*;
//!
//! let labels = ["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"];
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0];
//!
//! let result = GamesHowell::new()
//!     .with_alpha(0.05)
//!     .run_columns(&labels, &values)
//!     .expect("two groups of five");
//!
//! let row = &result.table().rows()[0];
//! assert_eq!(row.group, "a : b");
//! assert!((row.mean_difference - 27.0).abs() < 1e-12);
//! assert!(row.p_value < 0.05);
//! ```
//!
//! # Modules
//!
//! - [`stats`]: group aggregation, pair enumeration, the pairwise statistic,
//!   the studentized range distribution and result tables
//! - [`config`]: run configuration (significance level, parallelism)
//! - [`error`]: error taxonomy
//!
//! Pair evaluation can run on the rayon thread pool
//! ([`GamesHowellConfig::with_parallel`]); output order is identical either way.
//! Progress is reported through `tracing`; install a subscriber to see it.

pub mod config;
pub mod error;
pub mod prelude;
pub mod stats;

pub use config::GamesHowellConfig;
pub use error::{PosthocError, Result};
pub use stats::{
    Comparison, GamesHowell, GamesHowellResult, GroupStatistics, Observation, ResultRow,
    ResultTable, StudentizedRange, Tukey,
};
