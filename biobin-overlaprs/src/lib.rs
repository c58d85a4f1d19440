//! Region-coverage queries for rare-variant binning.
//!
//! The binning engine asks one question of the knowledge catalog over and over:
//! which regions cover this position? This crate answers it with a per-chromosome
//! [`Bits`] (Binary Interval Search) structure wrapped in a [`RegionCatalog`], which
//! implements both [`RegionIndex`](biobin_core::RegionIndex) and
//! [`RegionRegistry`](biobin_core::RegionRegistry).
//!
//! ## Quick Start
//!
//! ```rust
//! use biobin_core::{Region, RegionIndex, RegionRegistry};
//! use biobin_overlaprs::RegionCatalog;
//!
//! let catalog = RegionCatalog::try_from(vec![
//!     Region::new(5, "GENE_X", "chr1", 100, 300),
//!     Region::new(6, "GENE_Y", "chr1", 280, 320),
//! ])
//! .unwrap();
//!
//! let hits = catalog.coverage("chr1", 290);
//! assert_eq!(hits.len(), 2);
//! assert_eq!(catalog.name(5), Some("GENE_X"));
//! ```

/// Binary Interval Search implementation.
///
/// See [`Bits`] for details.
pub mod bits;

/// Genome-wide region catalog.
///
/// See [`RegionCatalog`] for details.
pub mod region_catalog;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::bits::Bits;
pub use self::region_catalog::{IntoRegionCatalog, RegionCatalog};
pub use self::traits::{Interval, Overlapper};
