//! Source side of the sync: fetches institution records from the search API.

mod client;
mod error;
#[cfg(test)]
mod tests;

pub use client::{InstitutionSource, SourceClient};
pub use error::SourceError;
