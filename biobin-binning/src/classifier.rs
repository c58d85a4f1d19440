//! Per-chromosome locus classification.
//!
//! A [`ChromosomeBinClassifier`] owns one contiguous segment of one chromosome. Every
//! locus inside the segment ends up in exactly one of three places:
//!
//! - the bin lookup, when it is rare and covered by at least one region the segment owns
//! - the intergenic set, when it is rare and no owned region covers it (bin 0)
//! - the genotype offsets, when it is common enough to keep per-individual genotypes
//!
//! Regions are owned by the segment their left bound falls in. A region that starts
//! inside the segment but hangs past its stop pushes the effective stop rightwards so
//! every locus the region covers is still classified here.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use log::debug;

use biobin_core::models::{Locus, RegionHit, RegionId};
use biobin_core::traits::{RegionIndex, RegionRegistry};

use crate::config::{BinningConfig, BoundaryPolicy};
use crate::errors::{BinningError, IndexKind, Result};
use crate::individual::{Individual, is_missing};
use crate::remap::IndexRemap;

/// Final classification of a locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocusClass {
    /// Rare, collapsed into one or more region bins.
    CollapsibleRare,
    /// Rare, outside every owned region; collapsed into bin 0. Reports label it
    /// `Intergenic Rare Variant` so it is told apart from region-binned rare loci,
    /// which keep the plain `Rare Variant` label.
    IntergenicRare,
    /// Common; its genotypes are kept per individual.
    Retained,
}

impl Display for LocusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocusClass::CollapsibleRare => "Rare Variant",
            LocusClass::IntergenicRare => "Intergenic Rare Variant",
            LocusClass::Retained => "Variant",
        };
        write!(f, "{}", s)
    }
}

/// What a single [`ChromosomeBinClassifier::classify`] call did with a locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// The locus lives on another chromosome. Routing, not a fault.
    OtherChromosome,
    /// The locus sits on or before the segment start and belongs to the preceding segment.
    PrecedingSegment,
    /// The locus lies past the effective stop as it stands now.
    Deferred,
    /// The locus has no usable allele frequencies and was skipped.
    Malformed,
    Retained,
    IntergenicRare,
    CollapsibleRare { regions: Vec<RegionId> },
}

impl ClassificationOutcome {
    pub fn class(&self) -> Option<LocusClass> {
        match self {
            ClassificationOutcome::Retained => Some(LocusClass::Retained),
            ClassificationOutcome::IntergenicRare => Some(LocusClass::IntergenicRare),
            ClassificationOutcome::CollapsibleRare { .. } => Some(LocusClass::CollapsibleRare),
            _ => None,
        }
    }
}

/// Counters for the loci a classifier looked at but did not place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierDiagnostics {
    pub malformed: usize,
    pub preceding: usize,
    pub deferred: usize,
    /// Covering regions ignored because they start in a neighbouring segment.
    pub foreign_regions: usize,
}

///
/// Classification label of a locus plus the names of every region covering it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusDescription {
    pub class: LocusClass,
    pub regions: Vec<String>,
}

impl Display for LocusDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.class, self.regions.join(":"))
    }
}

enum Placement {
    Preceding,
    Inside,
    Beyond,
}

#[derive(Debug, Clone)]
pub struct ChromosomeBinClassifier {
    chrom: String,
    bp_start: u32,
    /// `None` runs to the end of the chromosome
    bp_stop: Option<u32>,
    eff_stop: Option<u32>,
    maf_cutoff: f32,
    boundary: BoundaryPolicy,

    /// locus index -> region ids, bin indices once realigned
    bin_lookup: BTreeMap<usize, Vec<usize>>,
    intergenic: BTreeSet<usize>,
    /// locus index -> genotype slot, provisional until realigned
    genotype_offsets: BTreeMap<usize, usize>,

    diagnostics: ClassifierDiagnostics,
}

impl ChromosomeBinClassifier {
    ///
    /// A classifier covering a whole chromosome, `[0, end]`. The configured left edge
    /// applies at position 0: under an exclusive left edge a locus at 0 precedes the
    /// segment and is only counted in the diagnostics.
    ///
    pub fn new(chrom: impl Into<String>, config: &BinningConfig) -> Self {
        Self::with_segment(chrom, 0, None, config)
    }

    /// A classifier for the segment `[bp_start, bp_stop]` of one chromosome.
    pub fn with_segment(
        chrom: impl Into<String>,
        bp_start: u32,
        bp_stop: Option<u32>,
        config: &BinningConfig,
    ) -> Self {
        ChromosomeBinClassifier {
            chrom: chrom.into(),
            bp_start,
            bp_stop,
            eff_stop: bp_stop,
            maf_cutoff: config.maf_cutoff,
            boundary: config.boundary,
            bin_lookup: BTreeMap::new(),
            intergenic: BTreeSet::new(),
            genotype_offsets: BTreeMap::new(),
            diagnostics: ClassifierDiagnostics::default(),
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn bp_start(&self) -> u32 {
        self.bp_start
    }

    pub fn bp_stop(&self) -> Option<u32> {
        self.bp_stop
    }

    pub fn effective_stop(&self) -> Option<u32> {
        self.eff_stop
    }

    pub fn diagnostics(&self) -> ClassifierDiagnostics {
        self.diagnostics
    }

    fn placement(&self, pos: u32, stop: Option<u32>) -> Placement {
        if !self.boundary.after_start(pos, self.bp_start) {
            Placement::Preceding
        } else if !self.boundary.before_stop(pos, stop) {
            Placement::Beyond
        } else {
            Placement::Inside
        }
    }

    /// A region belongs to the segment its left bound falls in.
    fn owns(&self, hit: &RegionHit) -> bool {
        hit.start >= self.bp_start && self.bp_stop.is_none_or(|stop| hit.start <= stop)
    }

    fn is_rare(&self, locus: &Locus) -> bool {
        locus.minor_allele_freq() < self.maf_cutoff
    }

    /// Drop any earlier placement of a locus.
    fn forget(&mut self, locus_index: usize) {
        self.bin_lookup.remove(&locus_index);
        self.intergenic.remove(&locus_index);
        self.genotype_offsets.remove(&locus_index);
    }

    ///
    /// Classify one locus against the current effective stop, growing the stop when
    /// the locus is covered by an owned region that reaches further right.
    ///
    pub fn classify<R>(&mut self, locus_index: usize, locus: &Locus, regions: &R) -> ClassificationOutcome
    where
        R: RegionIndex + ?Sized,
    {
        if locus.chrom != self.chrom {
            return ClassificationOutcome::OtherChromosome;
        }

        // a locus is placed by its latest classification only
        self.forget(locus_index);

        match self.placement(locus.pos, self.eff_stop) {
            Placement::Preceding => {
                self.diagnostics.preceding += 1;
                return ClassificationOutcome::PrecedingSegment;
            }
            Placement::Beyond => {
                self.diagnostics.deferred += 1;
                return ClassificationOutcome::Deferred;
            }
            Placement::Inside => {}
        }

        if !locus.is_well_formed() {
            self.diagnostics.malformed += 1;
            return ClassificationOutcome::Malformed;
        }

        if !self.is_rare(locus) {
            // placeholder slot until genotype compaction
            self.genotype_offsets.insert(locus_index, locus_index);
            return ClassificationOutcome::Retained;
        }

        let (owned, foreign): (Vec<RegionHit>, Vec<RegionHit>) = regions
            .coverage(&self.chrom, locus.pos)
            .into_iter()
            .partition(|hit| self.owns(hit));
        self.diagnostics.foreign_regions += foreign.len();

        if owned.is_empty() {
            self.intergenic.insert(locus_index);
            return ClassificationOutcome::IntergenicRare;
        }

        for hit in &owned {
            if let Some(stop) = self.eff_stop {
                if hit.end > stop {
                    debug!(
                        "{}: region {} extends effective stop {} -> {}",
                        self.chrom, hit.id, stop, hit.end
                    );
                    self.eff_stop = Some(hit.end);
                }
            }
        }

        let mut ids: Vec<usize> = owned.iter().map(|hit| hit.id as usize).collect();
        ids.sort_unstable();
        ids.dedup();
        self.bin_lookup.insert(locus_index, ids);

        ClassificationOutcome::CollapsibleRare {
            regions: owned.iter().map(|hit| hit.id).collect(),
        }
    }

    ///
    /// Compute the effective stop this segment settles on for a batch of loci without
    /// touching any lookup state.
    ///
    /// Loci are scanned in position order; every rare, well-formed locus inside the
    /// current bound may extend it to the right bound of an owned region covering it.
    ///
    pub fn settle_effective_stop<R>(&self, batch: &[(usize, &Locus)], regions: &R) -> Option<u32>
    where
        R: RegionIndex + ?Sized,
    {
        let mut stop = self.eff_stop;

        for (_, locus) in self.ordered(batch) {
            match self.placement(locus.pos, stop) {
                Placement::Preceding => continue,
                // positions only increase from here, and only loci inside can grow the stop
                Placement::Beyond => break,
                Placement::Inside => {}
            }
            if !locus.is_well_formed() || !self.is_rare(locus) {
                continue;
            }
            for hit in regions.coverage(&self.chrom, locus.pos) {
                if !self.owns(&hit) {
                    continue;
                }
                if let Some(current) = stop {
                    if hit.end > current {
                        stop = Some(hit.end);
                    }
                }
            }
        }
        stop
    }

    ///
    /// Classify a batch of loci in two passes: settle the effective stop first, then
    /// classify every locus against the settled bound. Returns the indices of loci that
    /// still fall past the stop and belong to a later segment.
    ///
    pub fn classify_batch<R>(&mut self, batch: &[(usize, &Locus)], regions: &R) -> Vec<usize>
    where
        R: RegionIndex + ?Sized,
    {
        let settled = self.settle_effective_stop(batch, regions);
        if settled != self.eff_stop {
            debug!(
                "{}: effective stop settled at {:?} (nominal {:?})",
                self.chrom, settled, self.bp_stop
            );
        }
        self.eff_stop = settled;

        let mut deferred = Vec::new();
        for (locus_index, locus) in self.ordered(batch) {
            if self.classify(locus_index, locus, regions) == ClassificationOutcome::Deferred {
                deferred.push(locus_index);
            }
        }
        deferred
    }

    /// Loci of this chromosome in (position, index) order.
    fn ordered<'a>(&self, batch: &[(usize, &'a Locus)]) -> Vec<(usize, &'a Locus)> {
        let mut ordered: Vec<(usize, &Locus)> = batch
            .iter()
            .filter(|(_, locus)| locus.chrom == self.chrom)
            .copied()
            .collect();
        ordered.sort_by_key(|(locus_index, locus)| (locus.pos, *locus_index));
        ordered
    }

    ///
    /// Replace every recorded region id by its final bin index.
    ///
    pub fn realign_bins(&mut self, remap: &IndexRemap) -> Result<()> {
        let mut realigned = BTreeMap::new();
        for (&locus_index, ids) in &self.bin_lookup {
            let mut bins = ids
                .iter()
                .map(|&id| {
                    remap.get(id).ok_or_else(|| BinningError::UnmappedIdentifier {
                        kind: IndexKind::Bin,
                        chrom: self.chrom.clone(),
                        id,
                    })
                })
                .collect::<Result<Vec<usize>>>()?;
            bins.sort_unstable();
            bins.dedup();
            realigned.insert(locus_index, bins);
        }
        self.bin_lookup = realigned;
        Ok(())
    }

    ///
    /// Replace every genotype slot by its final slot. Keys (locus indices) are untouched.
    ///
    pub fn realign_genotypes(&mut self, remap: &IndexRemap) -> Result<()> {
        let mut realigned = BTreeMap::new();
        for (&locus_index, &slot) in &self.genotype_offsets {
            let compact = remap
                .get(slot)
                .ok_or_else(|| BinningError::UnmappedIdentifier {
                    kind: IndexKind::Genotype,
                    chrom: self.chrom.clone(),
                    id: slot,
                })?;
            realigned.insert(locus_index, compact);
        }
        self.genotype_offsets = realigned;
        Ok(())
    }

    /// Distinct bin identifiers currently recorded (region ids before realignment).
    pub fn bin_ids(&self) -> BTreeSet<usize> {
        self.bin_lookup.values().flatten().copied().collect()
    }

    /// `(locus index, genotype slot)` for every retained locus, by locus index.
    pub fn genotype_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.genotype_offsets.iter().map(|(&k, &v)| (k, v))
    }

    pub fn intergenic_loci(&self) -> impl Iterator<Item = usize> + '_ {
        self.intergenic.iter().copied()
    }

    pub fn class_of(&self, locus_index: usize) -> Option<LocusClass> {
        if self.intergenic.contains(&locus_index) {
            Some(LocusClass::IntergenicRare)
        } else if self.bin_lookup.contains_key(&locus_index) {
            Some(LocusClass::CollapsibleRare)
        } else if self.genotype_offsets.contains_key(&locus_index) {
            Some(LocusClass::Retained)
        } else {
            None
        }
    }

    /// Bins a locus is collapsed into; empty unless the locus is collapsible.
    pub fn bins_of(&self, locus_index: usize) -> &[usize] {
        self.bin_lookup
            .get(&locus_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn genotype_slot(&self, locus_index: usize) -> Option<usize> {
        self.genotype_offsets.get(&locus_index).copied()
    }

    pub fn collapsible_count(&self) -> usize {
        self.bin_lookup.len()
    }

    pub fn intergenic_count(&self) -> usize {
        self.intergenic.len()
    }

    pub fn retained_count(&self) -> usize {
        self.genotype_offsets.len()
    }

    pub fn classified_count(&self) -> usize {
        self.collapsible_count() + self.intergenic_count() + self.retained_count()
    }

    ///
    /// Describe a locus for reporting: its class and the names of every region
    /// covering it (owned or not). Region ids without a registered name are
    /// reported by id. Returns `None` for loci this classifier never placed.
    ///
    pub fn describe_locus<R, G>(
        &self,
        locus_index: usize,
        locus: &Locus,
        regions: &R,
        registry: &G,
    ) -> Option<LocusDescription>
    where
        R: RegionIndex + ?Sized,
        G: RegionRegistry + ?Sized,
    {
        let class = self.class_of(locus_index)?;
        let names = regions
            .coverage(&self.chrom, locus.pos)
            .iter()
            .map(|hit| {
                registry
                    .name(hit.id)
                    .map(str::to_string)
                    .unwrap_or_else(|| hit.id.to_string())
            })
            .collect();

        Some(LocusDescription {
            class,
            regions: names,
        })
    }

    ///
    /// Add this classifier's contributors to `counts`, indexed by bin. Every
    /// intergenic locus counts towards bin 0.
    ///
    pub fn count_contributors(&self, counts: &mut [u32]) -> Result<()> {
        let len = counts.len();
        if let Some(&first) = self.intergenic.first() {
            *counts
                .get_mut(0)
                .ok_or_else(|| self.bin_out_of_range(first, 0, len))? += self.intergenic.len() as u32;
        }

        for (&locus_index, bins) in &self.bin_lookup {
            for &bin in bins {
                *counts
                    .get_mut(bin)
                    .ok_or_else(|| self.bin_out_of_range(locus_index, bin, len))? += 1;
            }
        }
        Ok(())
    }

    ///
    /// Append this classifier's contributing locus indices to `contributors`,
    /// indexed by bin. Intergenic loci are listed under bin 0.
    ///
    pub fn build_contributor_list(&self, contributors: &mut [Vec<usize>]) -> Result<()> {
        let len = contributors.len();
        if let Some(&first) = self.intergenic.first() {
            contributors
                .get_mut(0)
                .ok_or_else(|| self.bin_out_of_range(first, 0, len))?
                .extend(self.intergenic.iter().copied());
        }

        for (&locus_index, bins) in &self.bin_lookup {
            for &bin in bins {
                contributors
                    .get_mut(bin)
                    .ok_or_else(|| self.bin_out_of_range(locus_index, bin, len))?
                    .push(locus_index);
            }
        }
        Ok(())
    }

    fn bin_out_of_range(&self, locus_index: usize, bin: usize, len: usize) -> BinningError {
        BinningError::BinIndexOutOfRange {
            locus_index,
            chrom: self.chrom.clone(),
            bin,
            len,
        }
    }

    ///
    /// Stream one locus worth of raw genotype codes into the individual stores.
    ///
    /// `codes[i]` belongs to `stores[i]`. Missing codes never touch a store.
    /// Rare loci add the code to every bin they are collapsed into (bin 0 for
    /// intergenic loci); retained loci write the code into the individual's
    /// genotype slot. Returns the bins touched, empty for retained loci and
    /// for loci this classifier does not hold.
    ///
    pub fn parse_locus(
        &self,
        locus_index: usize,
        codes: &[i8],
        stores: &mut [Individual],
    ) -> Result<BTreeSet<usize>> {
        if codes.len() != stores.len() {
            return Err(BinningError::IndividualCountMismatch {
                locus_index,
                expected: stores.len(),
                found: codes.len(),
            });
        }

        let bins: &[usize] = match self.class_of(locus_index) {
            None => return Ok(BTreeSet::new()),
            Some(LocusClass::Retained) => {
                self.write_genotypes(locus_index, codes, stores)?;
                return Ok(BTreeSet::new());
            }
            Some(LocusClass::IntergenicRare) => &[0],
            Some(LocusClass::CollapsibleRare) => self.bins_of(locus_index),
        };

        for (store, &code) in stores.iter_mut().zip(codes) {
            if is_missing(code) {
                continue;
            }
            let len = store.bins.len();
            for &bin in bins {
                let count = store
                    .bins
                    .get_mut(bin)
                    .ok_or_else(|| self.bin_out_of_range(locus_index, bin, len))?;
                *count += code as u32;
            }
        }

        Ok(bins.iter().copied().collect())
    }

    fn write_genotypes(&self, locus_index: usize, codes: &[i8], stores: &mut [Individual]) -> Result<()> {
        let Some(slot) = self.genotype_slot(locus_index) else {
            return Ok(());
        };

        for (store, &code) in stores.iter_mut().zip(codes) {
            if is_missing(code) {
                continue;
            }
            let len = store.genotypes.len();
            let cell = store
                .genotypes
                .slot_mut(slot)
                .ok_or_else(|| BinningError::GenotypeSlotOutOfRange {
                    locus_index,
                    chrom: self.chrom.clone(),
                    slot,
                    len,
                })?;
            *cell = code;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Edge;
    use biobin_core::models::{Allele, Region};
    use biobin_overlaprs::RegionCatalog;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn locus(chrom: &str, pos: u32, maf: f32) -> Locus {
        Locus::new(
            chrom,
            pos,
            vec![Allele::new("A", 1.0 - maf), Allele::new("G", maf)],
        )
    }

    #[fixture]
    fn config() -> BinningConfig {
        BinningConfig::new(0.05).unwrap()
    }

    #[fixture]
    fn regions() -> RegionCatalog {
        RegionCatalog::try_from(vec![
            Region::new(5, "GENE_X", "chr1", 100, 300),
            Region::new(6, "GENE_Y", "chr1", 280, 320),
            Region::new(7, "GENE_W", "chr1", 1_500, 1_800),
            Region::new(8, "GENE_V", "chr1", 50, 120),
        ])
        .unwrap()
    }

    fn empty() -> RegionCatalog {
        RegionCatalog::try_from(Vec::<Region>::new()).unwrap()
    }

    fn segment(config: &BinningConfig) -> ChromosomeBinClassifier {
        ChromosomeBinClassifier::with_segment("chr1", 0, Some(1_000), config)
    }

    #[rstest]
    fn test_rare_covered_locus_is_binned(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let outcome = clf.classify(0, &locus("chr1", 110, 0.01), &regions);

        assert_eq!(outcome, ClassificationOutcome::CollapsibleRare { regions: vec![5, 8] });
        assert_eq!(clf.class_of(0), Some(LocusClass::CollapsibleRare));
        assert_eq!(clf.bins_of(0), &[5, 8]);
        assert_eq!(clf.genotype_slot(0), None);
    }

    #[rstest]
    fn test_common_locus_is_retained(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let outcome = clf.classify(3, &locus("chr1", 150, 0.20), &regions);

        assert_eq!(outcome, ClassificationOutcome::Retained);
        assert_eq!(clf.genotype_slot(3), Some(3));
        assert!(clf.bins_of(3).is_empty());
    }

    #[rstest]
    fn test_cutoff_is_exclusive_for_rare(regions: RegionCatalog) {
        let config = BinningConfig::new(0.25).unwrap();
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 150, 0.25), &regions);
        assert_eq!(clf.class_of(0), Some(LocusClass::Retained));
    }

    #[rstest]
    fn test_uncovered_rare_locus_is_intergenic(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let outcome = clf.classify(1, &locus("chr1", 900, 0.01), &regions);

        assert_eq!(outcome, ClassificationOutcome::IntergenicRare);
        assert_eq!(clf.intergenic_loci().collect::<Vec<_>>(), vec![1]);
    }

    #[rstest]
    fn test_other_chromosome_is_ignored(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let outcome = clf.classify(0, &locus("chr2", 150, 0.01), &regions);

        assert_eq!(outcome, ClassificationOutcome::OtherChromosome);
        assert_eq!(clf.classified_count(), 0);
        assert_eq!(clf.diagnostics(), ClassifierDiagnostics::default());
    }

    #[rstest]
    fn test_malformed_locus_is_counted(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let bad = Locus::new("chr1", 150, vec![Allele::new("A", -1.0)]);

        assert_eq!(clf.classify(0, &bad, &regions), ClassificationOutcome::Malformed);
        assert_eq!(clf.classified_count(), 0);
        assert_eq!(clf.diagnostics().malformed, 1);
    }

    #[rstest]
    fn test_effective_stop_grows_for_hanging_region(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 0, Some(200), &config);
        clf.classify(0, &locus("chr1", 150, 0.01), &regions);
        assert_eq!(clf.effective_stop(), Some(300));
        assert_eq!(clf.bp_stop(), Some(200));

        // 290 is past the nominal stop but inside GENE_X, so it still belongs here.
        // GENE_Y starts after the nominal stop and is left to the next segment.
        let outcome = clf.classify(1, &locus("chr1", 290, 0.01), &regions);
        assert_eq!(outcome, ClassificationOutcome::CollapsibleRare { regions: vec![5] });
        assert_eq!(clf.effective_stop(), Some(300));
        assert_eq!(clf.diagnostics().foreign_regions, 1);

        let outcome = clf.classify(2, &locus("chr1", 310, 0.01), &regions);
        assert_eq!(outcome, ClassificationOutcome::Deferred);
    }

    #[rstest]
    fn test_next_segment_owns_late_region(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 200, Some(1_000), &config);
        let outcome = clf.classify(1, &locus("chr1", 290, 0.01), &regions);

        assert_eq!(outcome, ClassificationOutcome::CollapsibleRare { regions: vec![6] });
        assert_eq!(clf.diagnostics().foreign_regions, 1);
    }

    #[rstest]
    fn test_only_foreign_coverage_falls_back_to_intergenic(config: BinningConfig, regions: RegionCatalog) {
        // GENE_V starts at 50, before this segment begins
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 60, Some(1_000), &config);
        let outcome = clf.classify(0, &locus("chr1", 90, 0.01), &regions);

        assert_eq!(outcome, ClassificationOutcome::IntergenicRare);
        assert_eq!(clf.diagnostics().foreign_regions, 1);
    }

    #[rstest]
    #[case(Edge::Exclusive, 100, ClassificationOutcome::PrecedingSegment)]
    #[case(Edge::Inclusive, 100, ClassificationOutcome::IntergenicRare)]
    #[case(Edge::Exclusive, 101, ClassificationOutcome::IntergenicRare)]
    fn test_left_edge_policy(#[case] left: Edge, #[case] pos: u32, #[case] expected: ClassificationOutcome) {
        let config = BinningConfig::new(0.05).unwrap().with_boundary(BoundaryPolicy {
            left,
            right: Edge::Inclusive,
        });
        let empty = empty();
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 100, Some(1_000), &config);
        assert_eq!(clf.classify(0, &locus("chr1", pos, 0.01), &empty), expected);
    }

    #[rstest]
    #[case(Edge::Inclusive, ClassificationOutcome::IntergenicRare)]
    #[case(Edge::Exclusive, ClassificationOutcome::Deferred)]
    fn test_right_edge_policy(#[case] right: Edge, #[case] expected: ClassificationOutcome) {
        let config = BinningConfig::new(0.05).unwrap().with_boundary(BoundaryPolicy {
            left: Edge::Exclusive,
            right,
        });
        let empty = empty();
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 0, Some(1_000), &config);
        assert_eq!(clf.classify(0, &locus("chr1", 1_000, 0.01), &empty), expected);
    }

    #[rstest]
    #[case(Edge::Exclusive, ClassificationOutcome::PrecedingSegment)]
    #[case(Edge::Inclusive, ClassificationOutcome::IntergenicRare)]
    fn test_whole_chromosome_honors_left_edge_at_zero(
        #[case] left: Edge,
        #[case] expected: ClassificationOutcome,
    ) {
        let config = BinningConfig::new(0.05).unwrap().with_boundary(BoundaryPolicy {
            left,
            right: Edge::Inclusive,
        });
        let empty = empty();
        let mut clf = ChromosomeBinClassifier::new("chr1", &config);

        assert_eq!(clf.classify(0, &locus("chr1", 0, 0.01), &empty), expected);
        assert_eq!(
            clf.classify(1, &locus("chr1", u32::MAX, 0.3), &empty),
            ClassificationOutcome::Retained
        );
    }

    #[rstest]
    fn test_whole_chromosome_counts_dropped_position_zero(config: BinningConfig) {
        let empty = empty();
        let mut clf = ChromosomeBinClassifier::new("chr1", &config);
        clf.classify(0, &locus("chr1", 0, 0.01), &empty);

        assert_eq!(clf.class_of(0), None);
        assert_eq!(clf.diagnostics().preceding, 1);
    }

    #[rstest]
    fn test_settle_is_pure_and_order_independent(config: BinningConfig, regions: RegionCatalog) {
        let clf = ChromosomeBinClassifier::with_segment("chr1", 0, Some(200), &config);
        let a = locus("chr1", 310, 0.01);
        let b = locus("chr1", 150, 0.01);
        let c = locus("chr1", 290, 0.01);

        let forward = clf.settle_effective_stop(&[(0, &a), (1, &b), (2, &c)], &regions);
        let backward = clf.settle_effective_stop(&[(2, &c), (1, &b), (0, &a)], &regions);

        assert_eq!(forward, Some(300));
        assert_eq!(forward, backward);
        assert_eq!(clf.effective_stop(), Some(200));
        assert_eq!(clf.classified_count(), 0);
    }

    #[rstest]
    fn test_batch_classifies_loci_reached_by_growth(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = ChromosomeBinClassifier::with_segment("chr1", 0, Some(200), &config);
        let loci = [
            locus("chr1", 290, 0.01),
            locus("chr1", 150, 0.01),
            locus("chr1", 900, 0.01),
            locus("chr2", 150, 0.01),
        ];
        let batch: Vec<(usize, &Locus)> = loci.iter().enumerate().collect();

        let deferred = clf.classify_batch(&batch, &regions);

        // 290 comes first but is still reached once 150 has grown the stop
        assert_eq!(deferred, vec![2]);
        assert_eq!(clf.bins_of(0), &[5]);
        assert_eq!(clf.bins_of(1), &[5]);
        assert_eq!(clf.class_of(2), None);
        assert_eq!(clf.class_of(3), None);
        assert_eq!(clf.effective_stop(), Some(300));
    }

    #[rstest]
    fn test_monomorphic_locus_is_malformed(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let fixed = Locus::new("chr1", 150, vec![Allele::new("A", 1.0), Allele::new("G", 0.0)]);

        assert_eq!(clf.classify(0, &fixed, &regions), ClassificationOutcome::Malformed);
        assert_eq!(clf.diagnostics().malformed, 1);
        assert_eq!(clf.class_of(0), None);
        assert_eq!(clf.classified_count(), 0);
    }

    #[rstest]
    fn test_rejected_reclassification_clears_placement(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let bad = Locus::new("chr1", 150, vec![Allele::new("A", -1.0)]);

        clf.classify(0, &locus("chr1", 150, 0.01), &regions);
        assert_eq!(clf.class_of(0), Some(LocusClass::CollapsibleRare));
        assert_eq!(clf.classify(0, &bad, &regions), ClassificationOutcome::Malformed);
        assert_eq!(clf.class_of(0), None);

        clf.classify(1, &locus("chr1", 150, 0.40), &regions);
        assert_eq!(
            clf.classify(1, &locus("chr1", 5_000, 0.40), &regions),
            ClassificationOutcome::Deferred
        );
        assert_eq!(clf.class_of(1), None);
        assert_eq!(clf.classified_count(), 0);
    }

    #[rstest]
    fn test_reclassification_keeps_single_placement(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 150, 0.01), &regions);
        clf.classify(0, &locus("chr1", 150, 0.40), &regions);

        assert_eq!(clf.class_of(0), Some(LocusClass::Retained));
        assert_eq!(clf.classified_count(), 1);
    }

    #[rstest]
    fn test_realign_bins(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 110, 0.01), &regions);
        clf.classify(1, &locus("chr1", 290, 0.01), &regions);
        assert_eq!(clf.bin_ids(), BTreeSet::from([5, 6, 8]));

        let remap = IndexRemap::dense(clf.bin_ids(), 1);
        clf.realign_bins(&remap).unwrap();

        assert_eq!(clf.bins_of(0), &[1, 3]);
        assert_eq!(clf.bins_of(1), &[1, 2]);
    }

    #[rstest]
    fn test_realign_with_missing_id_fails(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 290, 0.01), &regions);

        let remap = IndexRemap::dense([5], 1);
        let err = clf.realign_bins(&remap).unwrap_err();
        assert!(matches!(
            err,
            BinningError::UnmappedIdentifier { kind: IndexKind::Bin, id: 6, .. }
        ));
    }

    #[rstest]
    fn test_realign_genotypes_keeps_keys(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(10, &locus("chr1", 500, 0.3), &regions);
        clf.classify(4, &locus("chr1", 600, 0.3), &regions);

        clf.realign_genotypes(&IndexRemap::dense([10, 4], 0)).unwrap();

        assert_eq!(clf.genotype_offsets().collect::<Vec<_>>(), vec![(4, 1), (10, 0)]);
        assert!(clf.realign_genotypes(&IndexRemap::dense([0], 0)).is_err());
    }

    #[rstest]
    fn test_contributors(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 110, 0.01), &regions);
        clf.classify(1, &locus("chr1", 290, 0.01), &regions);
        clf.classify(2, &locus("chr1", 900, 0.01), &regions);
        clf.classify(3, &locus("chr1", 950, 0.01), &regions);
        clf.realign_bins(&IndexRemap::dense(clf.bin_ids(), 1)).unwrap();

        let mut counts = vec![0u32; 4];
        clf.count_contributors(&mut counts).unwrap();
        assert_eq!(counts, vec![2, 2, 1, 1]);

        let mut lists = vec![Vec::new(); 4];
        clf.build_contributor_list(&mut lists).unwrap();
        assert_eq!(lists, vec![vec![2, 3], vec![0, 1], vec![1], vec![0]]);

        let mut short = vec![0u32; 2];
        assert!(matches!(
            clf.count_contributors(&mut short),
            Err(BinningError::BinIndexOutOfRange { bin: 3, .. })
        ));
    }

    #[rstest]
    fn test_describe_locus(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        let rare = locus("chr1", 290, 0.01);
        let common = locus("chr1", 150, 0.3);
        let lonely = locus("chr1", 900, 0.01);
        clf.classify(0, &rare, &regions);
        clf.classify(1, &common, &regions);
        clf.classify(2, &lonely, &regions);

        let described = clf.describe_locus(0, &rare, &regions, &regions).unwrap();
        assert_eq!(described.to_string(), "Rare Variant,GENE_X:GENE_Y");

        let described = clf.describe_locus(1, &common, &regions, &regions).unwrap();
        assert_eq!(described.to_string(), "Variant,GENE_X");

        let described = clf.describe_locus(2, &lonely, &regions, &regions).unwrap();
        assert_eq!(described.to_string(), "Intergenic Rare Variant,");

        assert!(clf.describe_locus(9, &lonely, &regions, &regions).is_none());
    }

    #[rstest]
    fn test_parse_locus_paths(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 290, 0.01), &regions);
        clf.classify(1, &locus("chr1", 500, 0.3), &regions);
        clf.classify(2, &locus("chr1", 900, 0.01), &regions);
        clf.realign_bins(&IndexRemap::dense(clf.bin_ids(), 1)).unwrap();
        clf.realign_genotypes(&IndexRemap::dense([1], 0)).unwrap();

        let mut stores = vec![Individual::new("a", 1, 3), Individual::new("b", 1, 3)];

        let touched = clf.parse_locus(0, &[1, -1], &mut stores).unwrap();
        assert_eq!(touched, BTreeSet::from([1, 2]));

        let touched = clf.parse_locus(1, &[2, -1], &mut stores).unwrap();
        assert!(touched.is_empty());

        let touched = clf.parse_locus(2, &[2, 1], &mut stores).unwrap();
        assert_eq!(touched, BTreeSet::from([0]));

        assert_eq!(stores[0].bins, vec![2, 1, 1]);
        assert_eq!(stores[1].bins, vec![1, 0, 0]);
        assert_eq!(stores[0].genotypes.get(0), Some(2));
        assert_eq!(stores[1].genotypes.get(0), Some(-1));

        // unknown locus: no-op
        assert!(clf.parse_locus(42, &[1, 1], &mut stores).unwrap().is_empty());
        assert_eq!(stores[0].bins, vec![2, 1, 1]);
    }

    #[rstest]
    fn test_parse_locus_detects_undersized_stores(config: BinningConfig, regions: RegionCatalog) {
        let mut clf = segment(&config);
        clf.classify(0, &locus("chr1", 290, 0.01), &regions);
        clf.classify(1, &locus("chr1", 500, 0.3), &regions);
        clf.realign_bins(&IndexRemap::dense(clf.bin_ids(), 1)).unwrap();
        clf.realign_genotypes(&IndexRemap::dense([1], 0)).unwrap();

        let mut stores = vec![Individual::new("a", 0, 2)];
        assert!(matches!(
            clf.parse_locus(0, &[1], &mut stores),
            Err(BinningError::BinIndexOutOfRange { locus_index: 0, bin: 2, len: 2, .. })
        ));
        assert!(matches!(
            clf.parse_locus(1, &[1], &mut stores),
            Err(BinningError::GenotypeSlotOutOfRange { locus_index: 1, slot: 0, len: 0, .. })
        ));
        assert!(matches!(
            clf.parse_locus(1, &[1, 1], &mut stores),
            Err(BinningError::IndividualCountMismatch { expected: 1, found: 2, .. })
        ));
    }
}
