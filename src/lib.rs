#![allow(clippy::module_inception)]

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;

pub use crate::error::KvseedError;
pub type Result<T, E = crate::error::KvseedError> = std::result::Result<T, E>;

pub use crate::core::{Decision, ImportSummary, StoreKey};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::internal::Error;
    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub use tracing::{debug, error, info, trace, warn};
}
