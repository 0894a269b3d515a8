//! Result table assembly.
//!
//! A pure structural transformation: one row per comparison, in the order
//! the comparisons were produced.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::games_howell::Comparison;

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Pair label, `"first : second"`
    pub group: String,
    /// `mean(second) - mean(first)`
    pub mean_difference: f64,
    /// Standard error of the difference
    pub std_error: f64,
    /// Studentized t-statistic
    pub t_value: f64,
    /// p-value
    pub p_value: f64,
    /// Lower confidence limit
    pub lower_limit: f64,
    /// Upper confidence limit
    pub upper_limit: f64,
}

impl<L: Display> From<&Comparison<L>> for ResultRow {
    fn from(c: &Comparison<L>) -> Self {
        Self {
            group: c.pair.to_string(),
            mean_difference: c.mean_difference,
            std_error: c.standard_error,
            t_value: c.t_value,
            p_value: c.p_value,
            lower_limit: c.lower_limit,
            upper_limit: c.upper_limit,
        }
    }
}

/// Ordered table of [`ResultRow`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

/// Column headers, in output order.
pub const COLUMNS: [&str; 7] = [
    "group",
    "mean_difference",
    "std_error",
    "t_value",
    "p_value",
    "lower_limit",
    "upper_limit",
];

impl ResultTable {
    /// Wraps already ordered rows.
    #[must_use]
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    /// Rows in canonical pair order.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by its pair label.
    pub fn get(&self, group: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.group == group)
    }

    /// Rows with `p_value < alpha`, order preserved.
    pub fn significant(&self, alpha: f64) -> impl Iterator<Item = &ResultRow> + '_ {
        self.rows.iter().filter(move |r| r.p_value < alpha)
    }
}

impl IntoIterator for ResultTable {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.group.len())
            .chain(std::iter::once(COLUMNS[0].len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:<width$}", COLUMNS[0])?;
        for name in &COLUMNS[1..] {
            write!(f, " {name:>15}")?;
        }
        writeln!(f)?;

        for r in &self.rows {
            write!(f, "{:<width$}", r.group)?;
            for value in [
                r.mean_difference,
                r.std_error,
                r.t_value,
                r.p_value,
                r.lower_limit,
                r.upper_limit,
            ] {
                write!(f, " {value:>15.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders comparisons as a table, one row each, order preserved.
pub fn assemble<L: Display>(comparisons: &[Comparison<L>]) -> ResultTable {
    ResultTable::new(comparisons.iter().map(ResultRow::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::pairs::GroupPair;

    fn comparison(a: u32, b: u32, diff: f64) -> Comparison<u32> {
        Comparison {
            pair: GroupPair::new(a, b).expect("distinct labels"),
            mean_difference: diff,
            standard_error: 1.0,
            degrees_of_freedom: 10.0,
            t_value: diff.abs() * std::f64::consts::FRAC_1_SQRT_2,
            p_value: 0.2,
            lower_limit: diff - 3.0,
            upper_limit: diff + 3.0,
            is_degenerate: false,
        }
    }

    #[test]
    fn test_assemble_preserves_order_and_labels() {
        let table = assemble(&[comparison(3, 9, 1.0), comparison(3, 12, -2.0), comparison(9, 12, 0.5)]);
        let groups: Vec<&str> = table.rows().iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["3 : 9", "3 : 12", "9 : 12"]);
        assert_eq!(table.get("3 : 12").map(|r| r.mean_difference), Some(-2.0));
    }

    #[test]
    fn test_row_serializes_with_output_column_names() {
        let table = assemble(&[comparison(1, 2, 1.5)]);
        let value = serde_json::to_value(&table).expect("serializable");
        let row = value[0].as_object().expect("row object");
        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let mut expected = COLUMNS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(row["group"], "1 : 2");
    }

    #[test]
    fn test_display_has_header_and_rows() {
        let table = assemble(&[comparison(1, 2, 1.5), comparison(1, 3, -0.5)]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("group"));
        assert!(lines[0].contains("upper_limit"));
        assert!(lines[2].starts_with("1 : 3"));
    }

    #[test]
    fn test_significant_filter() {
        let mut low = comparison(1, 2, 4.0);
        low.p_value = 0.01;
        let table = assemble(&[comparison(1, 3, 0.1), low]);
        let hits: Vec<&str> = table.significant(0.05).map(|r| r.group.as_str()).collect();
        assert_eq!(hits, vec!["1 : 2"]);
    }

    #[test]
    fn test_into_iter_yields_owned_rows_in_order() {
        let table = assemble(&[comparison(1, 2, 1.5), comparison(1, 3, -0.5)]);
        let rows: Vec<ResultRow> = table.clone().into_iter().collect();
        assert_eq!(rows.as_slice(), table.rows());
        assert_eq!(rows[1].group, "1 : 3");
    }

    #[test]
    fn test_empty_table() {
        let table = assemble::<u32>(&[]);
        assert!(table.is_empty());
        assert_eq!(table.to_string().lines().count(), 1);
    }
}
