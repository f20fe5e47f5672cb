//! Flat CSV taxtables
//!
//! The header must begin with `tax_id,parent_id,rank,tax_name`; any further
//! columns name ranks from the root down and only their names are used.

use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use taxonomer_core::{TaxonomerError, TaxonomerResult};
use taxonomer_storage::hierarchy::builder::TAXTABLE_COLUMNS;
use taxonomer_storage::TaxtableRow;

#[derive(Debug, Clone)]
pub struct Taxtable {
    fieldnames: Vec<String>,
    rows: Vec<TaxtableRow>,
}

impl Taxtable {
    pub fn from_path(path: impl AsRef<Path>) -> TaxonomerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaxonomerError::MissingResource(path.to_path_buf()));
        }
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> TaxonomerResult<Self> {
        let mut csv = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let fieldnames: Vec<String> = csv
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let leading: Vec<&str> = fieldnames
            .iter()
            .take(TAXTABLE_COLUMNS.len())
            .map(String::as_str)
            .collect();
        if leading != TAXTABLE_COLUMNS {
            return Err(TaxonomerError::parse(
                1,
                format!(
                    "taxtable header must start with {}",
                    TAXTABLE_COLUMNS.join(",")
                ),
            ));
        }

        let mut rows = Vec::new();
        for record in csv.records() {
            rows.push(to_row(&record.map_err(csv_error)?));
        }

        Ok(Self { fieldnames, rows })
    }

    /// The full header, rank columns included
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    pub fn rows(&self) -> &[TaxtableRow] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<TaxtableRow>) {
        (self.fieldnames, self.rows)
    }
}

fn to_row(record: &StringRecord) -> TaxtableRow {
    let field = |i: usize| record.get(i).unwrap_or_default().trim();
    let parent_id = Some(field(1)).filter(|p| !p.is_empty());
    TaxtableRow::new(field(0), parent_id, field(2), field(3))
}

fn csv_error(err: csv::Error) -> TaxonomerError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default();
    TaxonomerError::parse(line, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_fieldnames_and_rows() {
        let input = "tax_id,parent_id,rank,tax_name,root,phylum\n\
                     1,,root,root,,\n\
                     2,1,phylum,Firmicutes,1,\n";
        let table = Taxtable::from_reader(input.as_bytes()).unwrap();

        assert_eq!(
            table.fieldnames(),
            &["tax_id", "parent_id", "rank", "tax_name", "root", "phylum"]
        );
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].parent_id, None);
        assert!(table.rows()[0].is_root());
        assert_eq!(table.rows()[1], TaxtableRow::new("2", Some("1"), "phylum", "Firmicutes"));
    }

    #[test]
    fn test_wrong_header_rejected() {
        let input = "id,parent,rank,name\n1,,root,root\n";
        assert!(matches!(
            Taxtable::from_reader(input.as_bytes()),
            Err(TaxonomerError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_ragged_row_reports_line() {
        let input = "tax_id,parent_id,rank,tax_name\n1,,root,root\n2,1\n";
        match Taxtable::from_reader(input.as_bytes()) {
            Err(TaxonomerError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
