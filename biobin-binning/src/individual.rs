//! Per-individual output of the streaming phase.

use std::fmt::{self, Display};

use fxhash::FxHashMap as HashMap;

/// Raw genotype code for "not observed". Every negative code is treated as missing.
pub const MISSING_CODE: i8 = -1;

#[inline]
pub fn is_missing(code: i8) -> bool {
    code < 0
}

///
/// Compact genotype vector: one slot per retained-genotype locus, laid out in
/// the global order fixed by genotype compaction. Slots start out missing.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeStorage {
    codes: Vec<i8>,
}

impl GenotypeStorage {
    pub fn new(slots: usize) -> Self {
        GenotypeStorage {
            codes: vec![MISSING_CODE; slots],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<i8> {
        self.codes.get(slot).copied()
    }

    #[inline]
    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut i8> {
        self.codes.get_mut(slot)
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.codes
    }

    pub fn missing_count(&self) -> usize {
        self.codes.iter().filter(|&&c| is_missing(c)).count()
    }
}

impl Display for GenotypeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for code in &self.codes {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if is_missing(*code) {
                write!(f, "NA")?;
            } else {
                write!(f, "{}", code)?;
            }
        }
        Ok(())
    }
}

///
/// One study participant: a compact genotype vector, the per-bin variant counts
/// (index 0 is the intergenic aggregate) and an optional phenotype status.
///
/// Created once individual identities are known, mutated only while genotypes
/// are streamed, read-only afterwards.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub id: String,
    pub family_id: Option<String>,
    pub genotypes: GenotypeStorage,
    pub bins: Vec<u32>,
    pub status: Option<f32>,
}

impl Individual {
    /// `bin_count` is the full length of the bin vector, intergenic slot included.
    pub fn new(id: impl Into<String>, genotype_count: usize, bin_count: usize) -> Self {
        Individual {
            id: id.into(),
            family_id: None,
            genotypes: GenotypeStorage::new(genotype_count),
            bins: vec![0; bin_count],
            status: None,
        }
    }

    pub fn with_family(mut self, family_id: impl Into<String>) -> Self {
        self.family_id = Some(family_id.into());
        self
    }

    pub fn genotype_count(&self) -> usize {
        self.genotypes.len()
    }

    pub fn bin_count(&self, bin: usize) -> Option<u32> {
        self.bins.get(bin).copied()
    }

    /// Total rare variants observed across every bin.
    pub fn rare_variant_total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }

    /// Add this individual's bin counts into a running per-bin total.
    pub fn add_bin_counts(&self, totals: &mut [u64]) {
        for (total, &count) in totals.iter_mut().zip(&self.bins) {
            *total += count as u64;
        }
    }
}

///
/// Set `status` on every individual found in `phenotypes`. Individuals without
/// an entry keep whatever status they had. Returns how many were updated.
///
pub fn apply_phenotypes(individuals: &mut [Individual], phenotypes: &HashMap<String, f32>) -> usize {
    let mut applied = 0;
    for individual in individuals.iter_mut() {
        if let Some(&status) = phenotypes.get(&individual.id) {
            individual.status = Some(status);
            applied += 1;
        }
    }
    applied
}
