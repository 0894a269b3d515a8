// =========================================================================
// FALSIFY-GH: Games-Howell pairwise comparison contract
//
// References:
//   - Games & Howell (1976) "Pairwise multiple comparison procedures with
//     unequal n's and/or variances"
//   - Welch (1947) "The generalization of Student's problem when several
//     different population variances are involved"
// =========================================================================

use super::*;
use crate::stats::pairs::pair_count;

fn three_groups() -> Vec<Observation<&'static str>> {
    let mut obs = Vec::new();
    for v in [12.1, 13.4, 11.8, 12.9, 13.0, 12.2] {
        obs.push(Observation::new("ctrl", v));
    }
    for v in [15.2, 18.9, 14.1, 20.3] {
        obs.push(Observation::new("dose", v));
    }
    for v in [9.0, 9.4, 8.7, 9.9, 10.2, 9.1, 8.8, 9.6] {
        obs.push(Observation::new("wash", v));
    }
    obs
}

/// FALSIFY-GH-001: swapping a pair negates the difference and mirrors the interval
#[test]
fn falsify_gh_001_swap_symmetry() {
    let a = GroupStatistics::from_values(1, &[2.0, 4.0, 3.0, 5.0]).expect("valid");
    let b = GroupStatistics::from_values(2, &[9.0, 7.5, 12.0]).expect("valid");

    let forward = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid");
    let reverse = compare_pair(&b, &a, 2, 0.05, &Tukey).expect("valid");

    assert_eq!(forward.pair.to_string(), "1 : 2");
    assert_eq!(reverse.pair.to_string(), "2 : 1");
    assert!(forward.mean_difference > 0.0);

    assert!(
        (forward.mean_difference + reverse.mean_difference).abs() < 1e-12,
        "FALSIFIED GH-001: differences not negated"
    );
    assert!((forward.t_value - reverse.t_value).abs() < 1e-12);
    assert!((forward.degrees_of_freedom - reverse.degrees_of_freedom).abs() < 1e-9);
    assert!((forward.standard_error - reverse.standard_error).abs() < 1e-12);
    assert!((forward.p_value - reverse.p_value).abs() < 1e-12);
    assert!((forward.lower_limit + reverse.upper_limit).abs() < 1e-9);
    assert!((forward.upper_limit + reverse.lower_limit).abs() < 1e-9);
}

/// FALSIFY-GH-002: k groups produce k(k-1)/2 rows in canonical order
#[test]
fn falsify_gh_002_row_count_and_order() {
    let result = GamesHowell::new().run(&three_groups()).expect("valid input");
    let groups: Vec<&str> = result.table().rows().iter().map(|r| r.group.as_str()).collect();
    assert_eq!(
        groups,
        vec!["ctrl : dose", "ctrl : wash", "dose : wash"],
        "FALSIFIED GH-002: rows out of canonical order"
    );
    assert_eq!(result.table().len(), pair_count(result.n_groups()));
}

/// FALSIFY-GH-003: p-values in [0, 1] and intervals bracket the difference
#[test]
fn falsify_gh_003_bounds_and_bracketing() {
    let result = GamesHowell::new().run(&three_groups()).expect("valid input");
    for row in result.table().rows() {
        assert!(
            (0.0..=1.0).contains(&row.p_value),
            "FALSIFIED GH-003: p={} outside [0,1]",
            row.p_value
        );
        assert!(
            row.lower_limit <= row.mean_difference && row.mean_difference <= row.upper_limit,
            "FALSIFIED GH-003: {} not bracketed",
            row.group
        );
    }
}

/// FALSIFY-GH-004: identical constant groups report t=0, p=1, zero-width interval
#[test]
fn falsify_gh_004_degenerate_row() {
    let labels = ["x", "x", "x", "x", "y", "y", "y", "y"];
    let values = [5.0; 8];
    let result = GamesHowell::new().run_columns(&labels, &values).expect("not fatal");
    let row = &result.table().rows()[0];
    assert_eq!(row.mean_difference, 0.0);
    assert_eq!(row.t_value, 0.0);
    assert_eq!(row.p_value, 1.0);
    assert_eq!(row.lower_limit, 0.0);
    assert_eq!(row.upper_limit, 0.0);
}

/// FALSIFY-GH-005: a single group is rejected
#[test]
fn falsify_gh_005_insufficient_groups() {
    let err = GamesHowell::new()
        .run_columns(&["only", "only", "only"], &[1.0, 2.0, 3.0])
        .expect_err("one group");
    assert_eq!(err, crate::error::PosthocError::InsufficientGroups { found: 1 });
}

/// FALSIFY-GH-006: a singleton group fails before any pairwise work
#[test]
fn falsify_gh_006_insufficient_sample_size_is_fail_fast() {
    struct Unreachable;
    impl StudentizedRange for Unreachable {
        fn quantile(&self, _: f64, _: usize, _: f64) -> crate::error::Result<f64> {
            panic!("FALSIFIED GH-006: pairwise work started");
        }
        fn tail_probability(&self, _: f64, _: usize, _: f64) -> crate::error::Result<f64> {
            panic!("FALSIFIED GH-006: pairwise work started");
        }
    }

    let err = GamesHowell::new()
        .with_distribution(Unreachable)
        .run_columns(&["a", "a", "b", "b", "c"], &[1.0, 2.0, 3.0, 4.0, 5.0])
        .expect_err("group c has one observation");
    assert!(matches!(
        err,
        crate::error::PosthocError::InsufficientSampleSize { count: 1, .. }
    ));
}

/// FALSIFY-GH-007: a wider family (larger k) widens the interval of the same pair
#[test]
fn falsify_gh_007_family_size_widens_interval() {
    let a = GroupStatistics::from_values("a", &[1.0, 2.0, 3.0, 4.0]).expect("valid");
    let b = GroupStatistics::from_values("b", &[3.0, 5.0, 4.0, 6.0]).expect("valid");
    let two = compare_pair(&a, &b, 2, 0.05, &Tukey).expect("valid");
    let five = compare_pair(&a, &b, 5, 0.05, &Tukey).expect("valid");
    assert!(five.upper_limit - five.lower_limit > two.upper_limit - two.lower_limit);
    assert!(five.p_value > two.p_value);
}
