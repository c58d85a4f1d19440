//! Provisional → compact index translation.
//!
//! Classifiers record bins by region identifier and genotypes by locus index. Both
//! spaces are sparse and chromosome-local, so once every classifier has finished
//! the coordinator builds one [`IndexRemap`] per space and every classifier is
//! realigned through it.

use crate::errors::{BinningError, Result};

///
/// A two-array indirection table between a sparse raw index space and a
/// dense compact one.
///
/// `forward[raw]` holds the compact index of `raw`, `reverse[compact]` holds the
/// raw index that was assigned to it. Both are built once and never mutated.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexRemap {
    forward: Vec<Option<usize>>,
    reverse: Vec<Option<usize>>,
    mapped: usize,
}

impl IndexRemap {
    ///
    /// Assign consecutive compact indices, starting at `first`, to the raw
    /// indices in the order they are produced. Repeated raw indices keep
    /// their first assignment. Compact indices below `first` stay unassigned,
    /// which is how bin 0 is reserved for the intergenic aggregate.
    ///
    pub fn dense<I>(raw: I, first: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut remap = IndexRemap {
            forward: Vec::new(),
            reverse: vec![None; first],
            mapped: 0,
        };

        for raw_index in raw {
            if remap.get(raw_index).is_some() {
                continue;
            }
            let compact = remap.reverse.len();
            remap.assign(raw_index, compact);
            remap.reverse.push(Some(raw_index));
        }
        remap
    }

    /// Map every index in `0..n` to itself.
    pub fn identity(n: usize) -> Self {
        Self::dense(0..n, 0)
    }

    ///
    /// Build a remap from explicit `(raw, compact)` pairs. A later pair for
    /// the same raw index replaces the earlier one.
    ///
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut remap = IndexRemap::default();
        for (raw_index, compact) in pairs {
            remap.assign(raw_index, compact);
            if remap.reverse.len() <= compact {
                remap.reverse.resize(compact + 1, None);
            }
            remap.reverse[compact] = Some(raw_index);
        }
        remap
    }

    fn assign(&mut self, raw_index: usize, compact: usize) {
        if self.forward.len() <= raw_index {
            self.forward.resize(raw_index + 1, None);
        }
        if self.forward[raw_index].replace(compact).is_none() {
            self.mapped += 1;
        }
    }

    #[inline]
    pub fn get(&self, raw_index: usize) -> Option<usize> {
        self.forward.get(raw_index).copied().flatten()
    }

    #[inline]
    pub fn raw_of(&self, compact: usize) -> Option<usize> {
        self.reverse.get(compact).copied().flatten()
    }

    /// Number of raw indices with a mapping.
    pub fn len(&self) -> usize {
        self.mapped
    }

    pub fn is_empty(&self) -> bool {
        self.mapped == 0
    }

    /// Size of the compact space, reserved leading indices included.
    pub fn compact_len(&self) -> usize {
        self.reverse.len()
    }

    /// `(raw, compact)` pairs in ascending raw order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.forward
            .iter()
            .enumerate()
            .filter_map(|(raw_index, compact)| compact.map(|c| (raw_index, c)))
    }

    ///
    /// Apply `self`, then `then`. Fails if `then` has no entry for one of the
    /// compact indices `self` produces.
    ///
    pub fn compose(&self, then: &IndexRemap) -> Result<IndexRemap> {
        let pairs = self
            .iter()
            .map(|(raw_index, mid)| {
                then.get(mid)
                    .map(|compact| (raw_index, compact))
                    .ok_or(BinningError::UnmappedIntermediate(mid))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(IndexRemap::from_pairs(pairs))
    }
}
