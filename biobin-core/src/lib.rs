//! Core data model for rare-variant binning.
//!
//! This crate holds the types that every other biobin crate agrees on:
//!
//! - [`Locus`]: a genomic position with its observed allele frequencies
//! - [`Region`]: a named, closed interval on one chromosome (a gene, an exon set, ...)
//! - [`RegionHit`]: the bounds and identifier of a region that covers a queried position
//! - [`Interval`]: a generic half-open interval used by the overlap backends
//!
//! It also defines the two collaborator traits the binning engine consumes but never
//! implements itself: [`RegionIndex`] (which regions cover a position) and
//! [`RegionRegistry`] (what a region is called).
//!
//! ## Example
//!
//! ```rust
//! use biobin_core::models::{Allele, Locus};
//!
//! let locus = Locus::new("chr1", 150, vec![Allele::new("A", 0.99), Allele::new("G", 0.01)]);
//! assert!((locus.minor_allele_freq() - 0.01).abs() < 1e-6);
//! ```
pub mod errors;
pub mod models;
pub mod traits;
pub mod utils;

// re-exports
pub use self::errors::{CoreError, Result};
pub use self::models::{Allele, Interval, Locus, Region, RegionHit, RegionId};
pub use self::traits::{RegionIndex, RegionRegistry};
