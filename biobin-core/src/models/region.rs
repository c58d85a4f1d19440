use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier of a region in the knowledge catalog.
pub type RegionId = u32;

///
/// Region struct, one named closed interval `[start, end]` on a chromosome
///
/// Coordinates stop at `u32::MAX - 1`; a catalog refuses a region ending at
/// `u32::MAX`.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl Region {
    pub fn new(id: RegionId, name: impl Into<String>, chr: impl Into<String>, start: u32, end: u32) -> Self {
        Region {
            id,
            name: name.into(),
            chr: chr.into(),
            start,
            end,
        }
    }

    ///
    /// Number of base pairs covered, both bounds included
    ///
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn contains(&self, pos: u32) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn hit(&self) -> RegionHit {
        RegionHit {
            id: self.id,
            start: self.start,
            end: self.end,
        }
    }

    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.chr, self.start, self.end, self.id, self.name
        )
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

///
/// What a coverage query returns for each matching region: the identifier
/// and the closed bounds. Names are looked up separately, and only for reports.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub struct RegionHit {
    pub id: RegionId,
    pub start: u32,
    pub end: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_width_counts_both_bounds() {
        let r = Region::new(5, "GENE_X", "chr1", 100, 300);
        assert_eq!(r.width(), 201);
    }

    #[rstest]
    #[case(99, false)]
    #[case(100, true)]
    #[case(300, true)]
    #[case(301, false)]
    fn test_contains(#[case] pos: u32, #[case] expected: bool) {
        let r = Region::new(5, "GENE_X", "chr1", 100, 300);
        assert_eq!(r.contains(pos), expected);
    }

    #[rstest]
    fn test_display() {
        let r = Region::new(6, "GENE_Y", "chr1", 280, 320);
        assert_eq!(r.to_string(), "chr1\t280\t320\t6\tGENE_Y");
        assert_eq!(r.hit(), RegionHit { id: 6, start: 280, end: 320 });
    }
}
