//! Paperboy - Hacker News reply notifier.

pub mod api;
pub mod commands;
pub mod config;
pub mod display;
pub mod fetcher;
pub mod ipc;
pub mod notifier;
pub mod store;
pub mod timeago;
