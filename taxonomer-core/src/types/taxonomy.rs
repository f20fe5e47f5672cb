/// Taxonomy-related types used throughout Taxonomer
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance of a taxon, mirrored by the rows seeded into the `source` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Ncbi,
    GreenGenes,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Ncbi, Source::GreenGenes];

    /// Primary key of the seeded `source` row
    pub fn id(&self) -> i64 {
        match self {
            Self::Ncbi => 1,
            Self::GreenGenes => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ncbi => "NCBI",
            Self::GreenGenes => "GreenGenes",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ncbi => "NCBI taxonomy",
            Self::GreenGenes => "GreenGenes taxonomy",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources() {
        assert_eq!(Source::Ncbi.id(), 1);
        assert_eq!(Source::GreenGenes.id(), 2);
        assert_eq!(Source::GreenGenes.name(), "GreenGenes");
        assert_eq!(Source::ALL.len(), 2);
    }
}
