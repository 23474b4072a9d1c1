//src/taxpath.rs

/// Separator between the levels of a classification, e.g. `d__Bacteria|p__Firmicutes`.
pub const LEVEL_DELIMITER: char = '|';

/// A borrowed mpa classification path.
///
/// Levels are joined by [`LEVEL_DELIMITER`]; each level usually carries a
/// one-letter rank code and underscores (`d__`, `p__`, ...), but the path is
/// treated as opaque text apart from the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaxPath<'a> {
    raw: &'a str,
}

impl<'a> TaxPath<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Candidate ancestors from shallowest to deepest:
    /// `""`, `L1`, `L1|L2`, ..., `L1|...|L(k-1)`.
    ///
    /// Prefixes are cut on level boundaries only, so `d__Bact` is never an
    /// ancestor of `d__Bacteria`.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a str> + 'a {
        let raw = self.raw;
        std::iter::once("").chain(
            raw.match_indices(LEVEL_DELIMITER)
                .map(move |(idx, _)| &raw[..idx]),
        )
    }

    /// True if `self` is a strict level-prefix of `other`.
    pub fn is_ancestor_of(&self, other: &TaxPath<'_>) -> bool {
        other.raw.len() > self.raw.len()
            && other.raw.starts_with(self.raw)
            && other.raw[self.raw.len()..].starts_with(LEVEL_DELIMITER)
    }
}
