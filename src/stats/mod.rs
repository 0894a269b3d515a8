//! Post-hoc multiple comparison statistics.
//!
//! The Games-Howell pipeline runs strictly forward:
//!
//! - [`group`]: observations to per-group mean, unbiased variance and count
//! - [`pairs`]: canonical enumeration of the `C(k, 2)` label pairs
//! - [`games_howell`]: per-pair statistic and the batch driver
//! - [`studentized_range`]: distribution consulted for p-values and critical values
//! - [`result`]: rendering comparisons into the output table
//!
//! # Examples
//!
//! ```
//! use posthoc::stats::GamesHowell;
//!
//! let labels = [3, 3, 3, 9, 9, 9, 5, 5, 5];
//! let values = [1.0, 2.0, 3.5, 7.0, 9.0, 8.0, 4.0, 4.5, 6.0];
//!
//! let result = GamesHowell::new().run_columns(&labels, &values).expect("valid input");
//! let groups: Vec<&str> = result.table().rows().iter().map(|r| r.group.as_str()).collect();
//! assert_eq!(groups, vec!["3 : 5", "3 : 9", "5 : 9"]);
//! ```

pub mod games_howell;
pub mod group;
pub mod pairs;
pub mod result;
pub mod studentized_range;

pub use games_howell::{compare_pair, Comparison, GamesHowell, GamesHowellResult};
pub use group::{aggregate, GroupStatistics, Observation};
pub use pairs::{combinations, pair_count, GroupPair};
pub use result::{assemble, ResultRow, ResultTable, COLUMNS};
pub use studentized_range::{StudentizedRange, Tukey};
