//! GreenGenes lineage notation
//!
//! A record is `record_id<TAB>lineage` where the lineage is a `;`-separated
//! chain of `prefix__name` tokens, e.g.
//! `k__Bacteria; p__Proteobacteria; g__Escherichia; s__Escherichiacoli`.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use taxonomer_core::{TaxonomerError, TaxonomerResult, ROOT_NAME};

/// Rank prefixes used by GreenGenes, root excluded
pub const RANK_PREFIXES: [(&str, &str); 7] = [
    ("k", "kingdom"),
    ("p", "phylum"),
    ("c", "class"),
    ("o", "order"),
    ("f", "family"),
    ("g", "genus"),
    ("s", "species"),
];

fn rank_for_prefix(prefix: &str) -> Option<&'static str> {
    RANK_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, rank)| *rank)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageToken {
    pub rank: String,
    pub name: String,
}

impl LineageToken {
    pub fn new(rank: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            name: name.into(),
        }
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageRecord {
    pub record_id: String,
    /// Lineage exactly as it appeared in the input
    pub raw: String,
    pub tokens: Vec<LineageToken>,
}

/// Parse a lineage into tokens, starting with the synthetic root.
///
/// The first empty name ends the chain; deeper tokens are dropped.
pub fn parse_lineage(raw: &str) -> TaxonomerResult<Vec<LineageToken>> {
    tokenize(raw, 1)
}

fn tokenize(raw: &str, line: usize) -> TaxonomerResult<Vec<LineageToken>> {
    let mut tokens = vec![LineageToken::new(ROOT_NAME, ROOT_NAME)];

    for segment in raw.split(';').map(str::trim) {
        if segment.is_empty() {
            break;
        }
        let (prefix, name) = segment.split_once("__").ok_or_else(|| {
            TaxonomerError::parse(line, format!("token '{}' has no rank prefix", segment))
        })?;
        let rank = rank_for_prefix(prefix).ok_or_else(|| {
            TaxonomerError::parse(line, format!("unknown rank prefix '{}'", prefix))
        })?;
        let name = name.trim();
        if name.is_empty() {
            break;
        }
        tokens.push(LineageToken::new(rank, name));
    }

    space_species(&mut tokens);
    Ok(tokens)
}

/// Split `Escherichiacoli` under genus `Escherichia` into `Escherichia coli`
fn space_species(tokens: &mut [LineageToken]) {
    if let [.., genus, species] = tokens {
        if genus.rank == "genus" && species.rank == "species" {
            if let Some(spaced) = add_space(&species.name, &genus.name) {
                species.name = spaced;
            }
        }
    }
}

/// `species` with a space inserted after its leading `genus`, if one is missing
pub fn add_space(species: &str, genus: &str) -> Option<String> {
    let rest = species.strip_prefix(genus)?;
    if rest.is_empty() || rest.starts_with(' ') {
        return None;
    }
    Some(format!("{} {}", genus, rest))
}

/// Parse tab-separated records, skipping blank lines.
///
/// Line numbers in errors count from `first_line`.
pub fn read_records<R: BufRead>(
    reader: R,
    first_line: usize,
) -> impl Iterator<Item = TaxonomerResult<LineageRecord>> {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(i, line)| {
            let number = first_line + i;
            match line {
                Err(e) => Some(Err(e.into())),
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(parse_record(line.trim_end(), number)),
            }
        })
}

fn parse_record(line: &str, number: usize) -> TaxonomerResult<LineageRecord> {
    let (record_id, raw) = line
        .split_once('\t')
        .ok_or_else(|| TaxonomerError::parse(number, "expected record_id<TAB>lineage"))?;
    if raw.contains('\t') {
        return Err(TaxonomerError::parse(number, "more than two tab-separated fields"));
    }

    Ok(LineageRecord {
        record_id: record_id.to_string(),
        raw: raw.to_string(),
        tokens: tokenize(raw, number)?,
    })
}

/// Open a lineage file, decompressing `*.gz` on the fly
pub fn open_lineage_file(path: &Path) -> TaxonomerResult<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(TaxonomerError::MissingResource(path.to_path_buf()));
    }
    let file = File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
