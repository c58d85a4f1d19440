use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

///
/// One allele observed at a locus and its frequency in the study population.
///
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Allele {
    pub sequence: String,
    pub freq: f32,
}

impl Allele {
    pub fn new(sequence: impl Into<String>, freq: f32) -> Self {
        Allele {
            sequence: sequence.into(),
            freq,
        }
    }
}

///
/// Locus struct, a single genomic position with its allele frequencies as
/// handed over by the variant importer. Loci are never mutated after loading.
///
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Locus {
    pub chrom: String,
    /// No region covers `u32::MAX`, so a locus there is never collapsible.
    pub pos: u32,
    pub id: Option<String>,
    pub alleles: Vec<Allele>,
}

impl Locus {
    pub fn new(chrom: impl Into<String>, pos: u32, alleles: Vec<Allele>) -> Self {
        Locus {
            chrom: chrom.into(),
            pos,
            id: None,
            alleles,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    ///
    /// Frequency of everything that is not the major allele.
    ///
    /// For a biallelic site this is simply the smaller of the two frequencies.
    /// A locus without alleles reports 0.
    ///
    pub fn minor_allele_freq(&self) -> f32 {
        let major = self
            .alleles
            .iter()
            .map(|a| a.freq)
            .fold(f32::NEG_INFINITY, f32::max);

        if major.is_finite() {
            (1.0 - major).max(0.0)
        } else {
            0.0
        }
    }

    ///
    /// A locus is usable for classification when it has at least one allele,
    /// every frequency is a finite non-negative number, they do not all sum to
    /// zero and the locus is polymorphic (its minor allele frequency is above 0).
    ///
    pub fn is_well_formed(&self) -> bool {
        if self.alleles.is_empty() {
            return false;
        }
        if self
            .alleles
            .iter()
            .any(|a| !a.freq.is_finite() || a.freq < 0.0)
        {
            return false;
        }
        self.alleles.iter().map(|a| a.freq).sum::<f32>() > 0.0 && self.minor_allele_freq() > 0.0
    }

    /// The identifier if there is one, `chrom:pos` otherwise.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}:{}", self.chrom, self.pos),
        }
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.pos, self.label())?;
        for allele in &self.alleles {
            write!(f, "\t{}\t{}", allele.sequence, allele.freq)?;
        }
        Ok(())
    }
}
