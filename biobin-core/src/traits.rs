use crate::models::{RegionHit, RegionId};

///
/// Answers "which regions cover position `pos` on chromosome `chrom`".
///
/// The binning engine only ever borrows an implementation of this trait; it
/// never owns or mutates region data. Implementations must be safe to share
/// across the per-chromosome classification workers.
///
pub trait RegionIndex: Send + Sync {
    /// Every region whose closed bounds contain `pos`, ordered by id, without
    /// duplicates. An empty vector means the position is intergenic.
    fn coverage(&self, chrom: &str, pos: u32) -> Vec<RegionHit>;
}

///
/// Resolves region identifiers to display names. Used for reports only.
///
pub trait RegionRegistry {
    fn name(&self, id: RegionId) -> Option<&str>;
}

impl<T: RegionIndex + ?Sized> RegionIndex for &T {
    fn coverage(&self, chrom: &str, pos: u32) -> Vec<RegionHit> {
        (**self).coverage(chrom, pos)
    }
}
