use thiserror::Error;

use crate::models::RegionId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Region {id} on {chr} has inverted bounds: start={start}, end={end}")]
    InvertedRegion {
        id: RegionId,
        chr: String,
        start: u32,
        end: u32,
    },

    #[error("Region {id} ends at {end}, the last addressable position is {}", u32::MAX - 1)]
    RegionEndOutOfRange { id: RegionId, end: u32 },

    #[error("Region id {0} was registered more than once")]
    DuplicateRegion(RegionId),
}

pub type Result<T> = std::result::Result<T, CoreError>;
