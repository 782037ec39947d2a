//! Core types for unisync
//!
//! Domain types shared across all other crates: the source record, the
//! persisted row, the institution classifier and the run configuration.

mod config;
mod constants;
mod env_config;
mod error;
mod institution;
mod institution_type;

pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use institution::*;
pub use institution_type::*;
