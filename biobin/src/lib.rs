#[cfg(feature = "core")]
#[doc(inline)]
pub use biobin_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use biobin_overlaprs as overlaprs;

#[cfg(feature = "binning")]
#[doc(inline)]
pub use biobin_binning as binning;
