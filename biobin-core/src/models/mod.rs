pub mod interval;
pub mod locus;
pub mod region;

// re-export for cleaner imports
pub use self::interval::Interval;
pub use self::locus::{Allele, Locus};
pub use self::region::{Region, RegionHit, RegionId};
