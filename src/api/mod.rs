//! Content API boundary: typed payloads, the HTTP client and an in-memory source.

mod client;
mod memory;
mod types;

pub use client::*;
pub use memory::MemorySource;
pub use types::{Item, User};
