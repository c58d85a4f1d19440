//! Genome-wide region catalog for coverage queries across chromosomes.
//!
//! [`RegionCatalog`] keeps one [`Bits`] per chromosome, with each interval carrying the
//! id of the region it came from, plus an id-keyed table of the regions themselves for
//! name and bound lookups.
//!
//! # Examples
//!
//! ```
//! use biobin_core::{Region, RegionIndex};
//! use biobin_overlaprs::IntoRegionCatalog;
//!
//! let genes = vec![
//!     Region::new(1, "BRCA1", "chr17", 1000, 2000),
//!     Region::new(2, "TP53", "chr17", 5000, 6000),
//!     Region::new(3, "EGFR", "chr7", 1000, 3000),
//! ];
//!
//! let catalog = genes.into_region_catalog().unwrap();
//! let hits = catalog.coverage("chr17", 1500);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, 1);
//! assert!(catalog.coverage("chr2", 1500).is_empty());
//! ```

use fxhash::FxHashMap as HashMap;

use biobin_core::errors::{CoreError, Result};
use biobin_core::models::{Interval, Region, RegionHit, RegionId};
use biobin_core::traits::{RegionIndex, RegionRegistry};

use crate::{Bits, Overlapper};

/// A genome-wide index of knowledge regions.
///
/// Built once, read concurrently by every per-chromosome classifier.
pub struct RegionCatalog {
    index_maps: HashMap<String, Bits<u32, RegionId>>,
    regions: HashMap<RegionId, Region>,
}

impl RegionCatalog {
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Chromosomes that carry at least one region, in no particular order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.index_maps.keys().map(String::as_str)
    }
}

impl RegionIndex for RegionCatalog {
    fn coverage(&self, chrom: &str, pos: u32) -> Vec<RegionHit> {
        let Some(lapper) = self.index_maps.get(chrom) else {
            return Vec::new();
        };

        let mut hits: Vec<RegionHit> = lapper
            .covering(pos)
            .map(|iv| RegionHit {
                id: iv.val,
                start: iv.start,
                end: iv.last(),
            })
            .collect();

        hits.sort();
        hits.dedup_by_key(|hit| hit.id);
        hits
    }
}

impl RegionRegistry for RegionCatalog {
    fn name(&self, id: RegionId) -> Option<&str> {
        self.regions.get(&id).map(|r| r.name.as_str())
    }
}

impl TryFrom<Vec<Region>> for RegionCatalog {
    type Error = CoreError;

    fn try_from(regions: Vec<Region>) -> Result<Self> {
        let mut by_id: HashMap<RegionId, Region> = HashMap::default();
        let mut intervals: HashMap<String, Vec<Interval<u32, RegionId>>> = HashMap::default();

        // STEP 1: validate and sort regions into per-chromosome interval vectors
        for region in regions.into_iter() {
            if region.start > region.end {
                return Err(CoreError::InvertedRegion {
                    id: region.id,
                    chr: region.chr,
                    start: region.start,
                    end: region.end,
                });
            }
            if region.end == u32::MAX {
                return Err(CoreError::RegionEndOutOfRange {
                    id: region.id,
                    end: region.end,
                });
            }
            if by_id.contains_key(&region.id) {
                return Err(CoreError::DuplicateRegion(region.id));
            }

            intervals
                .entry(region.chr.clone())
                .or_default()
                .push(Interval::from_closed(region.start, region.end, region.id));
            by_id.insert(region.id, region);
        }

        // STEP 2: build one overlapper per chromosome
        let index_maps = intervals
            .into_iter()
            .map(|(chr, chr_intervals)| (chr, Bits::build(chr_intervals)))
            .collect();

        Ok(RegionCatalog {
            index_maps,
            regions: by_id,
        })
    }
}

/// Convert a collection of regions into a [`RegionCatalog`].
pub trait IntoRegionCatalog {
    fn into_region_catalog(self) -> Result<RegionCatalog>;
}

impl IntoRegionCatalog for Vec<Region> {
    fn into_region_catalog(self) -> Result<RegionCatalog> {
        RegionCatalog::try_from(self)
    }
}
