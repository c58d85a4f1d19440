//! # Rare-variant binning
//!
//! This crate decides, for every locus of a study, whether it is a rare variant that
//! collapses into the bins of the regions covering it, a rare variant outside every
//! region (the intergenic bin, index 0), or a common variant whose genotypes are kept
//! per individual. It then compacts the resulting bin and genotype indices into dense
//! global spaces and streams raw genotype codes into per-individual stores.
//!
//! ## Main components
//!
//! - [`ChromosomeBinClassifier`]: classification of the loci of one chromosome segment
//! - [`BinCoordinator`]: runs one classifier per chromosome, in parallel, and compacts
//!   their indices into a [`BinLayout`]
//! - [`BinLayout`]: genotype streaming and every report view over the final bins
//! - [`IndexRemap`]: the provisional to compact index table used by compaction
//! - [`Individual`]: per-individual bin counts and compact genotype vector
//!
//! ## Example
//!
//! ```rust
//! use biobin_binning::{BinCoordinator, BinningConfig, DenseGenotypes};
//! use biobin_core::{Allele, Locus, Region};
//! use biobin_overlaprs::RegionCatalog;
//! use ndarray::array;
//!
//! let regions = RegionCatalog::try_from(vec![Region::new(5, "GENE_X", "chr1", 100, 300)]).unwrap();
//! let loci = vec![
//!     Locus::new("chr1", 150, vec![Allele::new("A", 0.99), Allele::new("G", 0.01)]),
//!     Locus::new("chr1", 900, vec![Allele::new("A", 0.99), Allele::new("G", 0.01)]),
//! ];
//!
//! let mut coordinator = BinCoordinator::new(BinningConfig::default()).unwrap();
//! coordinator.classify(&loci, &regions);
//! let layout = coordinator.compact().unwrap();
//!
//! let genotypes = DenseGenotypes::from_array(array![[1, 0], [2, -1]]);
//! let mut individuals = layout.new_individuals(["case", "control"]);
//! layout.stream(&genotypes, &mut individuals).unwrap();
//!
//! assert_eq!(individuals[0].bins, vec![2, 1]);
//! assert_eq!(individuals[1].bins, vec![0, 0]);
//! ```
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod genotypes;
pub mod individual;
pub mod remap;

// re-exports
pub use self::classifier::{
    ChromosomeBinClassifier, ClassificationOutcome, ClassifierDiagnostics, LocusClass,
    LocusDescription,
};
pub use self::config::{BinningConfig, BinningConfigError, BoundaryPolicy, Edge};
pub use self::coordinator::{BinCoordinator, BinLayout, ChromosomeSummary};
pub use self::errors::{BinningError, IndexKind, Result};
pub use self::genotypes::{DenseGenotypes, GenotypeMatrix};
pub use self::individual::{GenotypeStorage, Individual, apply_phenotypes};
pub use self::remap::IndexRemap;
