//! Custom assertions for testing
//!
//! Checks over persisted hierarchies and names.

use taxonomer_storage::{NestedInterval, TaxDb};

/// Assert the nested-interval invariant over a complete hierarchy:
/// the bounds of N taxa use each of `1..=2N` exactly once, every interval is
/// well formed, and any two intervals are either nested or disjoint.
pub fn assert_valid_intervals(intervals: &[NestedInterval]) {
    let n = intervals.len() as i64;
    let mut bounds: Vec<i64> = intervals.iter().flat_map(|i| [i.lft, i.rgt]).collect();
    bounds.sort_unstable();
    assert_eq!(
        bounds,
        (1..=2 * n).collect::<Vec<_>>(),
        "interval bounds are not exactly 1..={}",
        2 * n
    );

    for interval in intervals {
        assert!(
            interval.lft < interval.rgt,
            "interval of {} is empty: ({}, {})",
            interval.tax_id,
            interval.lft,
            interval.rgt
        );
    }

    for a in intervals {
        for b in intervals {
            let disjoint = a.rgt < b.lft || b.rgt < a.lft;
            assert!(
                a.contains(b) || b.contains(a) || disjoint,
                "intervals of {} and {} overlap without nesting",
                a.tax_id,
                b.tax_id
            );
        }
    }
}

/// Assert the primary name of `tax_id`
pub fn assert_primary_name(db: &TaxDb, tax_id: &str, expected: &str) {
    let actual = db
        .primary_name(tax_id)
        .unwrap_or_else(|e| panic!("failed to read name of {}: {}", tax_id, e));
    assert_eq!(
        actual.as_deref(),
        Some(expected),
        "unexpected primary name for {}",
        tax_id
    );
}

/// Assert every taxon has exactly one primary name
pub fn assert_single_primary_names(db: &TaxDb) {
    let offenders: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM (
                 SELECT n.tax_id
                 FROM nodes n
                 LEFT JOIN names m ON m.tax_id = n.tax_id AND m.is_primary = 1
                 GROUP BY n.tax_id
                 HAVING COUNT(m.tax_id) != 1
             )",
            [],
            |row| row.get(0),
        )
        .unwrap_or_else(|e| panic!("failed to count primary names: {}", e));
    assert_eq!(offenders, 0, "{} taxa without exactly one primary name", offenders);
}
