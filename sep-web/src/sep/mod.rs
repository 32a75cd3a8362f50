//! Stanford Encyclopedia of Philosophy: keyword search and article fetch.

mod client;
mod types;

pub use client::{EncyclopediaSource, SepClient};
pub use types::{ExtractOutcome, SearchOutcome};
