//! Genome-wide coordination of the per-chromosome classifiers.
//!
//! The run is a three phase pipeline:
//!
//! 1. [`BinCoordinator::classify`] builds one [`ChromosomeBinClassifier`] per chromosome
//!    and classifies every chromosome in parallel.
//! 2. [`BinCoordinator::compact`] merges the chromosome-local bin and genotype indices
//!    into dense global spaces and realigns every classifier. It consumes the
//!    coordinator and runs on a single thread.
//! 3. [`BinLayout::stream`] pushes raw genotype codes into the individual stores,
//!    partitioned by individual.
//!
//! Streaming and reporting are only reachable through [`BinLayout`], so nothing can
//! read bin indices before they are final.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use fxhash::FxHashMap as HashMap;
use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use biobin_core::models::{Locus, RegionId};
use biobin_core::traits::{RegionIndex, RegionRegistry};
use biobin_core::utils::compare_chroms;

use crate::classifier::{ChromosomeBinClassifier, LocusClass, LocusDescription};
use crate::config::BinningConfig;
use crate::errors::{BinningError, Result};
use crate::genotypes::GenotypeMatrix;
use crate::individual::Individual;
use crate::remap::IndexRemap;

/// Name reported for bin 0.
pub const INTERGENIC_BIN_NAME: &str = "Intergenic";

/// Classification totals for one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSummary {
    pub chrom: String,
    pub loci: usize,
    pub common: usize,
    /// Collapsible and intergenic rare loci together.
    pub rare: usize,
    pub intergenic_rare: usize,
    pub malformed: usize,
}

impl ChromosomeSummary {
    fn from_classifier(clf: &ChromosomeBinClassifier, loci: usize) -> Self {
        ChromosomeSummary {
            chrom: clf.chrom().to_string(),
            loci,
            common: clf.retained_count(),
            rare: clf.collapsible_count() + clf.intergenic_count(),
            intergenic_rare: clf.intergenic_count(),
            malformed: clf.diagnostics().malformed,
        }
    }
}

impl Display for ChromosomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chrom, self.loci, self.common, self.rare, self.intergenic_rare
        )
    }
}

fn with_pool<OP, R>(pool: Option<&ThreadPool>, op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

///
/// Drives classification across every chromosome of a locus catalog.
///
/// # Examples
///
/// ```
/// use biobin_binning::{BinCoordinator, BinningConfig};
/// use biobin_core::{Allele, Locus, Region};
/// use biobin_overlaprs::RegionCatalog;
///
/// let regions = RegionCatalog::try_from(vec![Region::new(5, "GENE_X", "chr1", 100, 300)]).unwrap();
/// let loci = vec![
///     Locus::new("chr1", 150, vec![Allele::new("A", 0.99), Allele::new("G", 0.01)]),
///     Locus::new("chr1", 500, vec![Allele::new("A", 0.80), Allele::new("G", 0.20)]),
/// ];
///
/// let mut coordinator = BinCoordinator::new(BinningConfig::default()).unwrap();
/// coordinator.classify(&loci, &regions);
/// let layout = coordinator.compact().unwrap();
///
/// assert_eq!(layout.total_bins(), 2);
/// assert_eq!(layout.total_genotypes(), 1);
/// ```
#[derive(Debug)]
pub struct BinCoordinator {
    config: BinningConfig,
    pool: Option<ThreadPool>,
    classifiers: Vec<ChromosomeBinClassifier>,
    summaries: Vec<ChromosomeSummary>,
    /// locus index -> position in `classifiers`
    locus_owner: Vec<Option<usize>>,
    positions: Vec<u32>,
    allele_counts: Vec<usize>,
}

impl BinCoordinator {
    pub fn new(config: BinningConfig) -> Result<Self> {
        config.validate()?;

        let pool = match config.threads {
            Some(threads) => Some(ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };

        Ok(BinCoordinator {
            config,
            pool,
            classifiers: Vec::new(),
            summaries: Vec::new(),
            locus_owner: Vec::new(),
            positions: Vec::new(),
            allele_counts: Vec::new(),
        })
    }

    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    pub fn classifiers(&self) -> &[ChromosomeBinClassifier] {
        &self.classifiers
    }

    pub fn chromosome_summaries(&self) -> &[ChromosomeSummary] {
        &self.summaries
    }

    ///
    /// Classify every locus of the catalog. Locus indices are positions in `loci`.
    ///
    /// Calling this again discards the previous classification.
    ///
    pub fn classify<R>(&mut self, loci: &[Locus], regions: &R)
    where
        R: RegionIndex + ?Sized,
    {
        // STEP 1: group loci by chromosome, chromosomes in natural order
        let mut grouped: HashMap<&str, Vec<(usize, &Locus)>> = HashMap::default();
        for (locus_index, locus) in loci.iter().enumerate() {
            grouped
                .entry(locus.chrom.as_str())
                .or_default()
                .push((locus_index, locus));
        }
        let mut work: Vec<(&str, Vec<(usize, &Locus)>)> = grouped.into_iter().collect();
        work.sort_by(|(a, _), (b, _)| compare_chroms(a, b));

        let mut classifiers: Vec<ChromosomeBinClassifier> = work
            .iter()
            .map(|(chrom, _)| ChromosomeBinClassifier::new(*chrom, &self.config))
            .collect();

        // STEP 2: classify each chromosome on its own worker
        with_pool(self.pool.as_ref(), || {
            classifiers
                .par_iter_mut()
                .zip(work.par_iter())
                .for_each(|(clf, (_, batch))| {
                    // whole-chromosome classifiers have no stop, so nothing is deferred
                    let deferred = clf.classify_batch(batch, regions);
                    debug_assert!(deferred.is_empty());
                });
        });

        // STEP 3: record ownership and per-chromosome totals
        let mut locus_owner = vec![None; loci.len()];
        let mut summaries = Vec::with_capacity(classifiers.len());
        for (owner, (clf, (_, batch))) in classifiers.iter().zip(work.iter()).enumerate() {
            for (locus_index, _) in batch {
                locus_owner[*locus_index] = Some(owner);
            }

            let summary = ChromosomeSummary::from_classifier(clf, batch.len());
            if summary.malformed > 0 {
                warn!(
                    "{}: skipped {} loci without usable allele frequencies",
                    summary.chrom, summary.malformed
                );
            }
            let preceding = clf.diagnostics().preceding;
            if preceding > 0 {
                warn!(
                    "{}: skipped {} loci before the left edge of the chromosome",
                    summary.chrom, preceding
                );
            }
            summaries.push(summary);
        }

        info!("Chrom\tLoci\tCommon\tRare\tIntergenic Rare");
        for summary in &summaries {
            info!("{}", summary);
        }

        self.classifiers = classifiers;
        self.summaries = summaries;
        self.locus_owner = locus_owner;
        self.positions = loci.iter().map(|locus| locus.pos).collect();
        self.allele_counts = loci.iter().map(|locus| locus.alleles.len()).collect();
    }

    ///
    /// Merge chromosome-local indices into dense global spaces and realign every
    /// classifier through them.
    ///
    /// Bins are numbered from 1 in ascending region id order. Genotype slots follow
    /// chromosome order, then position, then locus index.
    ///
    pub fn compact(mut self) -> Result<BinLayout> {
        // STEP 1: one dense bin space, 0 reserved for the intergenic aggregate
        let region_ids: BTreeSet<usize> = self
            .classifiers
            .iter()
            .flat_map(ChromosomeBinClassifier::bin_ids)
            .collect();
        let bin_remap = IndexRemap::dense(region_ids, 1);

        // STEP 2: one dense genotype space in a reproducible order
        let mut provisional = Vec::new();
        for clf in &self.classifiers {
            let mut offsets: Vec<(usize, usize)> = clf.genotype_offsets().collect();
            offsets.sort_by_key(|&(locus_index, _)| (self.positions[locus_index], locus_index));
            provisional.extend(offsets.into_iter().map(|(_, slot)| slot));
        }
        let genotype_remap = IndexRemap::dense(provisional, 0);

        // STEP 3: realign
        for clf in self.classifiers.iter_mut() {
            clf.realign_bins(&bin_remap)?;
            clf.realign_genotypes(&genotype_remap)?;
        }

        let mut genotype_allele_counts = vec![0; genotype_remap.compact_len()];
        for (locus_index, slot) in genotype_remap.iter() {
            genotype_allele_counts[slot] = self.allele_counts.get(locus_index).copied().unwrap_or_default();
        }

        info!(
            "Compacted {} regions into {} bins (intergenic included) and {} genotype slots",
            bin_remap.len(),
            bin_remap.compact_len().max(1),
            genotype_remap.compact_len()
        );

        let chrom_index = self
            .classifiers
            .iter()
            .enumerate()
            .map(|(i, clf)| (clf.chrom().to_string(), i))
            .collect();

        Ok(BinLayout {
            pool: self.pool,
            classifiers: self.classifiers,
            chrom_index,
            summaries: self.summaries,
            locus_owner: self.locus_owner,
            bin_remap,
            genotype_remap,
            genotype_allele_counts,
        })
    }
}

///
/// The compacted result of a binning run: realigned classifiers plus the global
/// bin and genotype index spaces.
///
#[derive(Debug)]
pub struct BinLayout {
    pool: Option<ThreadPool>,
    classifiers: Vec<ChromosomeBinClassifier>,
    chrom_index: HashMap<String, usize>,
    summaries: Vec<ChromosomeSummary>,
    locus_owner: Vec<Option<usize>>,
    bin_remap: IndexRemap,
    genotype_remap: IndexRemap,
    genotype_allele_counts: Vec<usize>,
}

impl BinLayout {
    /// Length of every individual's bin vector, the intergenic bin included.
    pub fn total_bins(&self) -> usize {
        self.bin_remap.compact_len().max(1)
    }

    pub fn total_genotypes(&self) -> usize {
        self.genotype_remap.compact_len()
    }

    /// Number of alleles at the locus behind each genotype slot.
    pub fn genotype_allele_counts(&self) -> &[usize] {
        &self.genotype_allele_counts
    }

    pub fn n_loci(&self) -> usize {
        self.locus_owner.len()
    }

    pub fn classifiers(&self) -> &[ChromosomeBinClassifier] {
        &self.classifiers
    }

    pub fn classifier(&self, chrom: &str) -> Option<&ChromosomeBinClassifier> {
        self.chrom_index.get(chrom).map(|&i| &self.classifiers[i])
    }

    pub fn bin_remap(&self) -> &IndexRemap {
        &self.bin_remap
    }

    pub fn genotype_remap(&self) -> &IndexRemap {
        &self.genotype_remap
    }

    /// The region a final bin index stands for. Bin 0 has none.
    pub fn region_of_bin(&self, bin: usize) -> Option<RegionId> {
        self.bin_remap
            .raw_of(bin)
            .and_then(|raw| RegionId::try_from(raw).ok())
    }

    pub fn bin_of_region(&self, id: RegionId) -> Option<usize> {
        self.bin_remap.get(id as usize)
    }

    pub fn chromosome_summaries(&self) -> &[ChromosomeSummary] {
        &self.summaries
    }

    /// Chromosomes from `expected` that carried no loci at all.
    pub fn missing_chromosomes<'a, I>(&self, expected: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expected
            .into_iter()
            .filter(|chrom| !self.chrom_index.contains_key(*chrom))
            .map(str::to_string)
            .collect()
    }

    fn owner(&self, locus_index: usize) -> Result<Option<&ChromosomeBinClassifier>> {
        match self.locus_owner.get(locus_index) {
            Some(owner) => Ok(owner.map(|i| &self.classifiers[i])),
            None => Err(BinningError::NotClassified {
                locus_index,
                n_loci: self.locus_owner.len(),
            }),
        }
    }

    /// Individual stores sized for this layout, in the order the ids are given.
    pub fn new_individuals<I, S>(&self, ids: I) -> Vec<Individual>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .map(|id| Individual::new(id, self.total_genotypes(), self.total_bins()))
            .collect()
    }

    pub fn locus_class(&self, locus_index: usize) -> Option<LocusClass> {
        self.owner(locus_index).ok().flatten()?.class_of(locus_index)
    }

    pub fn genotype_slot(&self, locus_index: usize) -> Option<usize> {
        self.owner(locus_index).ok().flatten()?.genotype_slot(locus_index)
    }

    /// Final bins a locus contributes to. Intergenic loci report bin 0.
    pub fn bins_of(&self, locus_index: usize) -> Vec<usize> {
        match self.owner(locus_index) {
            Ok(Some(clf)) => match clf.class_of(locus_index) {
                Some(LocusClass::IntergenicRare) => vec![0],
                _ => clf.bins_of(locus_index).to_vec(),
            },
            _ => Vec::new(),
        }
    }

    ///
    /// Stream one locus worth of raw codes into `stores`. Loci that were skipped
    /// during classification are a no-op.
    ///
    pub fn parse_locus(
        &self,
        locus_index: usize,
        codes: &[i8],
        stores: &mut [Individual],
    ) -> Result<BTreeSet<usize>> {
        match self.owner(locus_index)? {
            Some(clf) => clf.parse_locus(locus_index, codes, stores),
            None => Ok(BTreeSet::new()),
        }
    }

    ///
    /// Stream every locus of `matrix` into `individuals`.
    ///
    /// Individuals are split into disjoint chunks, one per worker, and each worker
    /// visits every locus for its own chunk, so no two workers ever write the same
    /// store. `individuals[i]` receives column `i` of the matrix.
    ///
    pub fn stream<M>(&self, matrix: &M, individuals: &mut [Individual]) -> Result<()>
    where
        M: GenotypeMatrix + ?Sized,
    {
        let n_individuals = individuals.len();
        if matrix.n_individuals() != n_individuals {
            return Err(BinningError::MatrixWidthMismatch {
                expected: n_individuals,
                found: matrix.n_individuals(),
            });
        }
        for locus_index in 0..self.n_loci() {
            if let Some(row) = matrix.codes(locus_index) {
                if row.len() != n_individuals {
                    return Err(BinningError::IndividualCountMismatch {
                        locus_index,
                        expected: n_individuals,
                        found: row.len(),
                    });
                }
            }
        }

        with_pool(self.pool.as_ref(), || {
            let chunk_size = n_individuals.div_ceil(rayon::current_num_threads()).max(1);

            individuals
                .par_chunks_mut(chunk_size)
                .enumerate()
                .try_for_each(|(chunk_index, chunk)| -> Result<()> {
                    let offset = chunk_index * chunk_size;
                    for locus_index in 0..self.n_loci() {
                        let Some(row) = matrix.codes(locus_index) else {
                            continue;
                        };
                        let Some(clf) = self.owner(locus_index)? else {
                            continue;
                        };
                        clf.parse_locus(locus_index, &row[offset..offset + chunk.len()], chunk)?;
                    }
                    Ok(())
                })
        })?;

        info!(
            "Streamed genotypes for {} loci into {} individuals",
            self.n_loci(),
            n_individuals
        );
        Ok(())
    }

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
        self.owner(locus_index)
            .ok()
            .flatten()?
            .describe_locus(locus_index, locus, regions, registry)
    }

    /// One description per locus of the catalog; `None` for skipped loci.
    pub fn describe_loci<R, G>(&self, loci: &[Locus], regions: &R, registry: &G) -> Vec<Option<LocusDescription>>
    where
        R: RegionIndex + ?Sized,
        G: RegionRegistry + ?Sized,
    {
        loci.iter()
            .enumerate()
            .map(|(locus_index, locus)| self.describe_locus(locus_index, locus, regions, registry))
            .collect()
    }

    /// Number of loci contributing to each bin.
    pub fn bin_contributor_counts(&self) -> Result<Vec<u32>> {
        let mut counts = vec![0; self.total_bins()];
        for clf in &self.classifiers {
            clf.count_contributors(&mut counts)?;
        }
        Ok(counts)
    }

    /// Contributing locus indices for each bin, ascending.
    pub fn bin_contributors(&self) -> Result<Vec<Vec<usize>>> {
        let mut contributors = vec![Vec::new(); self.total_bins()];
        for clf in &self.classifiers {
            clf.build_contributor_list(&mut contributors)?;
        }
        for list in contributors.iter_mut() {
            list.sort_unstable();
        }
        Ok(contributors)
    }

    /// Region id -> contributing locus indices. Intergenic loci are not listed.
    pub fn bin_content_lookup(&self) -> Result<BTreeMap<RegionId, Vec<usize>>> {
        let contributors = self.bin_contributors()?;
        Ok(contributors
            .into_iter()
            .enumerate()
            .skip(1)
            .filter_map(|(bin, loci)| self.region_of_bin(bin).map(|id| (id, loci)))
            .collect())
    }

    /// Display name of every bin. Regions without a registered name use their id.
    pub fn bin_names<G>(&self, registry: &G) -> Vec<String>
    where
        G: RegionRegistry + ?Sized,
    {
        (0..self.total_bins())
            .map(|bin| match self.region_of_bin(bin) {
                Some(id) => registry
                    .name(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| id.to_string()),
                None => INTERGENIC_BIN_NAME.to_string(),
            })
            .collect()
    }

    /// Per-bin sum over every individual's bin counts.
    pub fn bin_totals(&self, individuals: &[Individual]) -> Vec<u64> {
        let mut totals = vec![0; self.total_bins()];
        for individual in individuals {
            individual.add_bin_counts(&mut totals);
        }
        totals
    }
}
