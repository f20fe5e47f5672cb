/// The fixed, totally-ordered rank vocabulary

/// Literal stored for taxa without a recognised rank
pub const UNDEFINED_RANK: &str = "no_rank";

/// Name (and rank) of the synthetic universal root
pub const ROOT_NAME: &str = "root";

const STANDARD_RANKS: &str = "
root
superkingdom
kingdom
subkingdom
superphylum
phylum
subphylum
superclass
class
subclass
infraclass
superorder
order
suborder
infraorder
parvorder
superfamily
family
subfamily
tribe
subtribe
genus
subgenus
species group
species subgroup
species
subspecies
varietas
forma
";

/// Ranks ordered from the root downward.
///
/// Built once and handed to components by reference; there is no way to
/// mutate a vocabulary after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankVocabulary {
    ranks: Vec<String>,
}

impl RankVocabulary {
    /// The NCBI-style vocabulary, multi-word ranks joined with `_`
    pub fn standard() -> Self {
        Self::from_names(
            STANDARD_RANKS
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Vocabulary in the given root-to-leaf order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ranks: names
                .into_iter()
                .map(|name| name.as_ref().trim().replace(' ', "_"))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ranks.iter().map(String::as_str)
    }

    /// Depth of `rank` below the root, `None` for unknown ranks and `no_rank`
    pub fn position(&self, rank: &str) -> Option<usize> {
        self.ranks.iter().position(|r| r == rank)
    }

    pub fn contains(&self, rank: &str) -> bool {
        self.position(rank).is_some()
    }

    /// `(rank, rank_order)` pairs as persisted in the `ranks` table
    pub fn rank_orders(&self) -> impl Iterator<Item = (&str, usize)> {
        self.iter().enumerate().map(|(order, rank)| (rank, order))
    }
}

impl Default for RankVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}
