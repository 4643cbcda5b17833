//! Incremental reply fetching and reply records.

mod incremental;
mod plaintext;
mod reply;

pub use incremental::{FetchError, ReplyFetcher, DEFAULT_WINDOW_SECS};
pub use plaintext::to_plaintext;
pub use reply::{Reply, ReplyBatch};
