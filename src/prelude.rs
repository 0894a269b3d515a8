//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use posthoc::prelude::*;
//! ```

pub use crate::config::GamesHowellConfig;
pub use crate::error::{PosthocError, Result};
pub use crate::stats::{
    aggregate, combinations, compare_pair, Comparison, GamesHowell, GamesHowellResult,
    GroupPair, GroupStatistics, Observation, ResultRow, ResultTable, StudentizedRange, Tukey,
};
