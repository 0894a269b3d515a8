//! Canonical enumeration of unordered label pairs.
//!
//! Labels are sorted ascending and pair `(i, j)` is emitted for every `i < j`,
//! row by row. Result tables follow this order exactly.

use std::fmt::{self, Display};

use crate::error::{PosthocError, Result};

/// Ordered pair of distinct labels.
///
/// Pairs from [`combinations`] are canonical (`first < second`); pairs built
/// with [`GroupPair::new`] keep the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupPair<L> {
    first: L,
    second: L,
}

impl<L: Ord> GroupPair<L> {
    /// Creates the pair `(first, second)` as given.
    ///
    /// Returns `None` if both labels are equal.
    pub fn new(first: L, second: L) -> Option<Self> {
        (first != second).then_some(Self { first, second })
    }
}

impl<L> GroupPair<L> {
    /// Label of the first group.
    pub fn first(&self) -> &L {
        &self.first
    }

    /// Label of the second group.
    pub fn second(&self) -> &L {
        &self.second
    }
}

impl<L: Display> Display for GroupPair<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.first, self.second)
    }
}

/// Number of unordered pairs among `k` groups, `k (k - 1) / 2`.
#[must_use]
pub fn pair_count(k: usize) -> usize {
    k * k.saturating_sub(1) / 2
}

/// Enumerates all `C(k, 2)` pairs of the distinct labels in canonical order.
///
/// Input order and duplicates do not matter.
///
/// # Errors
///
/// Returns [`PosthocError::InsufficientGroups`] when fewer than 2 distinct
/// labels are given.
///
/// # Example
///
/// ```
/// use posthoc::stats::combinations;
///
/// let pairs = combinations([9, 3, 5]).expect("three groups");
/// let rendered: Vec<String> = pairs.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, vec!["3 : 5", "3 : 9", "5 : 9"]);
/// ```
pub fn combinations<L, I>(labels: I) -> Result<Vec<GroupPair<L>>>
where
    L: Ord + Clone,
    I: IntoIterator<Item = L>,
{
    let mut sorted: Vec<L> = labels.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    let k = sorted.len();
    if k < 2 {
        return Err(PosthocError::InsufficientGroups { found: k });
    }

    let mut pairs = Vec::with_capacity(pair_count(k));
    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            pairs.push(GroupPair {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }
    Ok(pairs)
}
