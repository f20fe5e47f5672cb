//! Test fixtures and data generators
//!
//! Lineage records and taxtables shared by the storage and provider suites.

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use taxonomer_core::{ROOT_NAME, UNDEFINED_RANK};
use taxonomer_storage::TaxtableRow;

/// Header line of a GreenGenes taxonomy dump
pub const GREENGENES_HEADER: &str = "prokMSA_id\ttaxonomy";

/// Two records sharing the `Bacteria;A` prefix
pub const SHARED_PREFIX_RECORDS: &[(&str, &str)] = &[
    ("OTU1", "k__Bacteria;p__A;c__B"),
    ("OTU2", "k__Bacteria;p__A;c__C"),
];

/// The same phylum name under two unrelated kingdoms
pub const POLYPHYLETIC_RECORDS: &[(&str, &str)] = &[("OTU1", "k__X;p__Y"), ("OTU2", "k__Z;p__Y")];

/// A small but realistic slice of the GreenGenes dump
pub const GREENGENES_RECORDS: &[(&str, &str)] = &[
    (
        "4",
        "k__Bacteria; p__Proteobacteria; c__Gammaproteobacteria; o__Enterobacteriales; f__Enterobacteriaceae; g__Escherichia; s__Escherichiacoli",
    ),
    (
        "7",
        "k__Bacteria; p__Proteobacteria; c__Gammaproteobacteria; o__Enterobacteriales; f__Enterobacteriaceae; g__Escherichia; s__",
    ),
    (
        "11",
        "k__Bacteria; p__Firmicutes; c__Bacilli; o__Bacillales; f__Bacillaceae; g__Bacillus; s__Bacillus subtilis",
    ),
    ("13", "k__Archaea; p__Euryarchaeota; c__; o__; f__; g__; s__"),
];

/// Tab-separated lineage file contents, header included
pub fn greengenes_contents(records: &[(&str, &str)]) -> String {
    let mut contents = format!("{}\n", GREENGENES_HEADER);
    for (record_id, lineage) in records {
        contents.push_str(record_id);
        contents.push('\t');
        contents.push_str(lineage);
        contents.push('\n');
    }
    contents
}

/// Write a lineage file into `dir`, gzip-compressed when `name` ends in `.gz`
pub fn write_greengenes_file(
    dir: impl AsRef<Path>,
    name: &str,
    records: &[(&str, &str)],
) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    let contents = greengenes_contents(records);

    if name.ends_with(".gz") {
        let file = std::fs::File::create(&path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(contents.as_bytes())?;
        encoder.finish()?;
    } else {
        std::fs::write(&path, contents)?;
    }
    Ok(path)
}

/// CSV taxtable with the rank columns after `tax_name`
pub const SAMPLE_TAXTABLE_CSV: &str = "\
tax_id,parent_id,rank,tax_name,root,phylum,class,genus,species
1,1,root,root,,,,,
1224,1,phylum,Proteobacteria,1,,,,
1236,1224,class,Gammaproteobacteria,1,1224,,,
561,1236,genus,Escherichia,1,1224,1236,,
562,561,species,Escherichia coli,1,1224,1236,561,
1239,1,phylum,Firmicutes,1,,,,
1386,1239,genus,Bacillus,1,1239,,,
";

pub fn sample_taxtable_fieldnames() -> Vec<String> {
    SAMPLE_TAXTABLE_CSV
        .lines()
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Parsed rows of [`SAMPLE_TAXTABLE_CSV`]
pub fn sample_taxtable_rows() -> Vec<TaxtableRow> {
    SAMPLE_TAXTABLE_CSV
        .lines()
        .skip(1)
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            TaxtableRow::new(fields[0], Some(fields[1]), fields[2], fields[3])
        })
        .collect()
}

/// Taxtable for a tree described by parent indices.
///
/// `parents[i]` is the parent of taxon `i + 1`; taxon `0` is the root, so every
/// entry must be at most `i`. Only the root rank is declared in the header.
pub fn taxtable_from_parents(parents: &[usize]) -> (Vec<String>, Vec<TaxtableRow>) {
    let fieldnames = ["tax_id", "parent_id", "rank", "tax_name", ROOT_NAME]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = vec![TaxtableRow::new("t0", None, ROOT_NAME, ROOT_NAME)];
    for (i, parent) in parents.iter().enumerate() {
        let tax_id = format!("t{}", i + 1);
        let parent_id = format!("t{}", parent);
        let name = format!("taxon {}", i + 1);
        rows.push(TaxtableRow::new(tax_id, Some(parent_id.as_str()), UNDEFINED_RANK, name));
    }
    (fieldnames, rows)
}
