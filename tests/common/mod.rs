//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use paperboy::api::{Item, MemorySource};
use tempfile::TempDir;

pub const NOW: i64 = 1_700_000_000;
pub const DAY: i64 = 86_400;

/// A comment by `by` posted `age` seconds before [`NOW`].
pub fn comment(id: u64, by: &str, age: i64, text: &str) -> Item {
    Item {
        id,
        by: Some(by.to_string()),
        time: NOW - age,
        text: Some(text.to_string()),
        ..Item::default()
    }
}

/// A root post by `pg` with the given children.
pub fn post(id: u64, age: i64, kids: Vec<u64>) -> Item {
    Item {
        id,
        by: Some("pg".to_string()),
        time: NOW - age,
        kids,
        ..Item::default()
    }
}

/// `pg` with two recent posts, one old post and a mix of live, dead and
/// deleted replies.
pub fn pg_source() -> MemorySource {
    MemorySource::new()
        .with_user("pg", vec![500, 400, 300])
        .with_item(post(500, DAY, vec![510, 505]))
        .with_item(post(400, 3 * DAY, vec![420, 410, 401]))
        .with_item(post(300, 10 * DAY, vec![310]))
        .with_item(comment(510, "tptacek", 3600, "<p>Agreed &amp; then some</p>"))
        .with_item(comment(505, "dang", 7200, "Please keep it civil."))
        .with_item(comment(420, "patio11", 2 * DAY, "It depends."))
        .with_item(Item {
            dead: true,
            ..comment(410, "spammer", 2 * DAY, "buy now")
        })
        .with_item(Item {
            deleted: true,
            ..comment(401, "", 2 * DAY, "")
        })
        .with_item(comment(310, "old", 9 * DAY, "too old to matter"))
}

/// Ids `pg_source` should deliver on a first run, largest first.
pub const PG_LIVE_REPLIES: [u64; 3] = [510, 505, 420];

/// Path of a fresh state database inside `dir`.
pub fn db_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(format!("{name}.db"))
}
