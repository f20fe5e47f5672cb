//! Idempotent bulk loading
//!
//! Every ingestion path writes through [`insert_rows`] so that a store is
//! populated at most once: unless the caller opts in, a table that already
//! holds data is left untouched and the call reports [`LoadOutcome::Skipped`].

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use taxonomer_core::{TaxonomerError, TaxonomerResult};
use tracing::{debug, info, warn};

/// One row of positional column values
pub type Row = Vec<Value>;

/// Result of a load attempt. Skipping is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Inserted(usize),
    Skipped,
}

impl LoadOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, LoadOutcome::Skipped)
    }

    /// Rows written by this call
    pub fn rows(&self) -> usize {
        match self {
            LoadOutcome::Inserted(n) => *n,
            LoadOutcome::Skipped => 0,
        }
    }
}

/// Options for a bulk load
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// Target columns; when absent the width of the first row is used
    pub column_names: Option<Vec<String>>,
    /// Stop after this many rows
    pub max_rows: Option<usize>,
    /// Load even if the table already holds rows
    pub allow_if_nonempty: bool,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.column_names = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn allow_if_nonempty(mut self, allow: bool) -> Self {
        self.allow_if_nonempty = allow;
        self
    }
}

/// Double-quote an SQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// True iff `table` holds at least one row
pub fn has_row(conn: &Connection, table: &str) -> TaxonomerResult<bool> {
    let sql = format!("SELECT 1 FROM {} LIMIT 1", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;
    Ok(stmt.exists([])?)
}

/// Insert `rows` into `table` without committing.
///
/// Meant to run inside a transaction owned by the caller; any failure leaves
/// the rows written so far to be rolled back with that transaction.
pub fn insert_rows<I>(
    conn: &Connection,
    table: &str,
    rows: I,
    options: &InsertOptions,
) -> TaxonomerResult<LoadOutcome>
where
    I: IntoIterator<Item = Row>,
{
    if !options.allow_if_nonempty && has_row(conn, table)? {
        warn!("Table \"{}\" already contains data; load not performed", table);
        return Ok(LoadOutcome::Skipped);
    }

    let mut rows = rows.into_iter().peekable();
    let width = match (&options.column_names, rows.peek()) {
        (_, None) => {
            debug!("No rows supplied for table \"{}\"", table);
            return Ok(LoadOutcome::Inserted(0));
        }
        (Some(columns), Some(_)) => columns.len(),
        (None, Some(first)) => first.len(),
    };

    let placeholders = vec!["?"; width].join(", ");
    let sql = match &options.column_names {
        Some(columns) => format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders
        ),
        None => format!(
            "INSERT INTO {} VALUES ({})",
            quote_identifier(table),
            placeholders
        ),
    };
    debug!("{}", sql);

    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0usize;
    for row in rows.take(options.max_rows.unwrap_or(usize::MAX)) {
        if row.len() != width {
            return Err(TaxonomerError::InvalidInput(format!(
                "row {} for table \"{}\" has {} values, expected {}",
                inserted + 1,
                table,
                row.len(),
                width
            )));
        }
        stmt.execute(params_from_iter(row.iter()))?;
        inserted += 1;
    }

    info!("Inserted {} rows into \"{}\"", inserted, table);
    Ok(LoadOutcome::Inserted(inserted))
}

/// Insert `rows` into `table` as one batch followed by a single commit.
///
/// A constraint failure anywhere in the batch surfaces as
/// [`TaxonomerError::Integrity`] and nothing from the batch is kept.
pub fn bulk_insert<I>(
    conn: &mut Connection,
    table: &str,
    rows: I,
    options: &InsertOptions,
) -> TaxonomerResult<LoadOutcome>
where
    I: IntoIterator<Item = Row>,
{
    let tx = conn.transaction()?;
    let outcome = insert_rows(&tx, table, rows, options)?;
    if !outcome.is_skipped() {
        tx.commit()?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE merged (old_tax_id TEXT, new_tax_id TEXT);
             CREATE TABLE ranks (rank TEXT PRIMARY KEY NOT NULL, rank_order INT);",
        )
        .unwrap();
        conn
    }

    fn pair(a: &str, b: &str) -> Row {
        vec![Value::Text(a.to_string()), Value::Text(b.to_string())]
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_has_row() {
        let mut conn = setup();
        assert!(!has_row(&conn, "merged").unwrap());
        bulk_insert(&mut conn, "merged", vec![pair("1", "2")], &InsertOptions::new()).unwrap();
        assert!(has_row(&conn, "merged").unwrap());
    }

    #[test]
    fn test_second_load_is_skipped() {
        let mut conn = setup();
        let rows = || vec![pair("12", "34"), pair("56", "78")];

        let first = bulk_insert(&mut conn, "merged", rows(), &InsertOptions::new()).unwrap();
        assert_eq!(first, LoadOutcome::Inserted(2));

        let second = bulk_insert(&mut conn, "merged", rows(), &InsertOptions::new()).unwrap();
        assert_eq!(second, LoadOutcome::Skipped);
        assert_eq!(second.rows(), 0);
        assert_eq!(count(&conn, "merged"), 2);
    }

    #[test]
    fn test_allow_if_nonempty_appends() {
        let mut conn = setup();
        let opts = InsertOptions::new().allow_if_nonempty(true);
        bulk_insert(&mut conn, "merged", vec![pair("1", "2")], &opts).unwrap();
        bulk_insert(&mut conn, "merged", vec![pair("3", "4")], &opts).unwrap();
        assert_eq!(count(&conn, "merged"), 2);
    }

    #[test]
    fn test_lookahead_keeps_first_row_and_truncates() {
        let mut conn = setup();
        let rows = (0..10).map(|i| pair(&format!("old{}", i), &format!("new{}", i)));
        let opts = InsertOptions::new().with_max_rows(Some(3));

        let outcome = bulk_insert(&mut conn, "merged", rows, &opts).unwrap();
        assert_eq!(outcome, LoadOutcome::Inserted(3));

        let first: String = conn
            .query_row("SELECT old_tax_id FROM merged ORDER BY rowid LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(first, "old0");
    }

    #[test]
    fn test_named_columns() {
        let mut conn = setup();
        let opts = InsertOptions::new().with_columns(&["rank_order", "rank"]);
        let rows = vec![
            vec![Value::Integer(0), Value::Text("root".into())],
            vec![Value::Integer(1), Value::Text("kingdom".into())],
        ];
        bulk_insert(&mut conn, "ranks", rows, &opts).unwrap();

        let order: i64 = conn
            .query_row("SELECT rank_order FROM ranks WHERE rank = 'kingdom'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(order, 1);
    }

    #[test]
    fn test_empty_sequence_writes_nothing() {
        let mut conn = setup();
        let outcome = bulk_insert(&mut conn, "merged", Vec::<Row>::new(), &InsertOptions::new())
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Inserted(0));
        assert!(!has_row(&conn, "merged").unwrap());
    }

    #[test]
    fn test_constraint_violation_rolls_back_whole_batch() {
        let mut conn = setup();
        let rows = vec![
            vec![Value::Text("root".into()), Value::Integer(0)],
            vec![Value::Text("kingdom".into()), Value::Integer(1)],
            vec![Value::Text("root".into()), Value::Integer(2)],
        ];

        let err = bulk_insert(&mut conn, "ranks", rows, &InsertOptions::new()).unwrap_err();
        assert!(matches!(err, TaxonomerError::Integrity(_)), "got {:?}", err);
        assert_eq!(count(&conn, "ranks"), 0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut conn = setup();
        let rows = vec![pair("1", "2"), vec![Value::Text("3".into())]];
        let err = bulk_insert(&mut conn, "merged", rows, &InsertOptions::new()).unwrap_err();
        assert!(matches!(err, TaxonomerError::InvalidInput(_)));
        assert_eq!(count(&conn, "merged"), 0);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("names"), "\"names\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
