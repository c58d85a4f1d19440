use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAF_CUTOFF: f32 = 0.05;

/// Whether a segment edge admits a locus sitting exactly on it.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Inclusive,
    Exclusive,
}

///
/// How a classifier treats loci on the edges of its segment.
///
/// The left edge is compared against the segment start, the right edge
/// against the effective stop (which may have grown past the nominal stop).
/// The default attributes a locus sitting on the start to the preceding
/// segment and keeps a locus sitting on the stop.
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(default)]
pub struct BoundaryPolicy {
    pub left: Edge,
    pub right: Edge,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy {
            left: Edge::Exclusive,
            right: Edge::Inclusive,
        }
    }
}

impl BoundaryPolicy {
    #[inline]
    pub fn after_start(&self, pos: u32, start: u32) -> bool {
        match self.left {
            Edge::Inclusive => pos >= start,
            Edge::Exclusive => pos > start,
        }
    }

    /// `None` stands for "end of chromosome" and admits everything.
    #[inline]
    pub fn before_stop(&self, pos: u32, stop: Option<u32>) -> bool {
        match (stop, self.right) {
            (None, _) => true,
            (Some(stop), Edge::Inclusive) => pos <= stop,
            (Some(stop), Edge::Exclusive) => pos < stop,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct BinningConfig {
    /// Loci with a minor allele frequency below this value are rare.
    pub maf_cutoff: f32,
    pub boundary: BoundaryPolicy,
    /// Worker threads for classification and streaming; the global rayon pool when unset.
    pub threads: Option<usize>,
}

impl Default for BinningConfig {
    fn default() -> Self {
        BinningConfig {
            maf_cutoff: DEFAULT_MAF_CUTOFF,
            boundary: BoundaryPolicy::default(),
            threads: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum BinningConfigError {
    #[error("MAF cutoff must be a number in (0, 1], got {0}")]
    InvalidMafCutoff(f32),
    #[error("Thread count must be at least 1")]
    ZeroThreads,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type BinningConfigResult<T> = std::result::Result<T, BinningConfigError>;

impl BinningConfig {
    pub fn new(maf_cutoff: f32) -> BinningConfigResult<Self> {
        let config = BinningConfig {
            maf_cutoff,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> BinningConfigResult<Self> {
        self.threads = Some(threads);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> BinningConfigResult<()> {
        if !self.maf_cutoff.is_finite() || self.maf_cutoff <= 0.0 || self.maf_cutoff > 1.0 {
            return Err(BinningConfigError::InvalidMafCutoff(self.maf_cutoff));
        }
        if self.threads == Some(0) {
            return Err(BinningConfigError::ZeroThreads);
        }
        Ok(())
    }
}

impl TryFrom<&Path> for BinningConfig {
    type Error = BinningConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: BinningConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
