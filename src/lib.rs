pub mod core;
pub mod exchanges;

pub use crate::core::{
    config::FtxConfig,
    errors::{ErrorKind, FtxError},
    types::{HttpMethod, Region, RequestDescriptor, VenueResponse},
};
pub use exchanges::ftx::{FtxBuilder, FtxRest};
