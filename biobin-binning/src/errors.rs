use std::fmt::{self, Display};

use thiserror::Error;

use crate::config::BinningConfigError;

/// Which provisional index space a remap was meant to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Bin,
    Genotype,
}

impl Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Bin => write!(f, "bin"),
            IndexKind::Genotype => write!(f, "genotype"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BinningError {
    #[error("No {kind} mapping for identifier {id} recorded on {chrom}; compaction skipped an index that classification produced")]
    UnmappedIdentifier {
        kind: IndexKind,
        chrom: String,
        id: usize,
    },

    #[error("Cannot compose index maps: intermediate index {0} has no mapping")]
    UnmappedIntermediate(usize),

    #[error("Genotype slot {slot} for locus {locus_index} on {chrom} is outside the {len} slots held by each individual")]
    GenotypeSlotOutOfRange {
        locus_index: usize,
        chrom: String,
        slot: usize,
        len: usize,
    },

    #[error("Bin {bin} for locus {locus_index} on {chrom} is outside the {len} bins held by each individual")]
    BinIndexOutOfRange {
        locus_index: usize,
        chrom: String,
        bin: usize,
        len: usize,
    },

    #[error("Genotype matrix holds {found} individuals, {expected} individual stores were given")]
    MatrixWidthMismatch { expected: usize, found: usize },

    #[error("Locus {locus_index} supplied {found} genotype codes for {expected} individuals")]
    IndividualCountMismatch {
        locus_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Locus {locus_index} is outside the {n_loci} loci that were classified")]
    NotClassified { locus_index: usize, n_loci: usize },

    #[error(transparent)]
    Config(#[from] BinningConfigError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, BinningError>;
