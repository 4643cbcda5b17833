//! Colored CLI display utilities for notifier output.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::fetcher::Reply;
use crate::ipc::IpcResponse;
use crate::notifier::{badge_text, CycleOutcome, Event};
use crate::store::NotificationState;
use crate::timeago::time_ago;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Maximum length of a reply preview line.
const PREVIEW_LEN: usize = 100;

/// Truncate a string to at most `max_len` characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// One-line preview of reply content.
#[must_use]
pub fn preview(content: &str) -> String {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    truncate(line, PREVIEW_LEN)
}

/// Header line for a reply: author, relative time and link.
#[must_use]
pub fn format_reply_header(reply: &Reply, now: i64) -> String {
    let author = if reply.author.is_empty() {
        "[unknown]"
    } else {
        reply.author.as_str()
    };
    format!(
        "{} {} {}",
        author.cyan().bold(),
        time_ago(reply.timestamp, now).dimmed(),
        reply.url().blue()
    )
}

/// Human-readable text for an event.
#[must_use]
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Refresh => "refresh requested".to_string(),
        Event::Refreshed => "refreshed".to_string(),
        Event::NetworkError => "network error, will retry on the next poll".to_string(),
        Event::NoSuchUser => "no such user".to_string(),
        Event::BadgeUpdate { count } => match badge_text(*count).as_str() {
            "" => "no unread replies".to_string(),
            text => format!("{text} unread"),
        },
    }
}

/// Print the stored replies of the tracked user.
pub fn print_replies(state: &NotificationState, now: i64) {
    let Some(username) = state.username.as_deref() else {
        print_error("No username set. Run `paperboy user <NAME>` first.");
        return;
    };

    let replies = state.replies_for(username);
    println!(
        "{} {} ({} unread)",
        "[REPLIES]".blue().bold(),
        username.bold(),
        replies.len()
    );
    print_last_refresh(state.last_refresh_for(username), now);

    for reply in replies {
        println!();
        println!("{}", format_reply_header(reply, now));
        println!("  {}", preview(&reply.content));
        println!("  {}", format!("post {}", reply.post_id).dimmed());
    }
    let _ = io::stdout().flush();
}

/// Print when the last refresh happened.
pub fn print_last_refresh(last_refresh: Option<i64>, now: i64) {
    let text = last_refresh.map_or_else(|| "never".to_string(), |at| time_ago(at, now));
    println!("{} {}", "Last refresh:".dimmed(), text.dimmed());
}

/// Print a notifier event.
pub fn print_event(event: &Event) {
    let tag = match event {
        Event::Refresh | Event::Refreshed => "[REFRESH]".green().bold().to_string(),
        Event::NetworkError | Event::NoSuchUser => "[ERROR]".red().bold().to_string(),
        Event::BadgeUpdate { .. } => "[BADGE]".yellow().bold().to_string(),
    };
    println!("{} {} {}", timestamp().dimmed(), tag, describe_event(event));
    let _ = io::stdout().flush();
}

/// Print how an in-process refresh cycle ended.
pub fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Skipped => print_skipped(),
        CycleOutcome::Refreshed(report) => {
            println!(
                "{} {} new for {} ({} unread)",
                "[REFRESH]".green().bold(),
                report.new_replies,
                report.username.bold(),
                report.badge_count
            );
            let _ = io::stdout().flush();
        }
        CycleOutcome::Failed { event, reason } => {
            print_error(&format!("{}: {}", describe_event(event), reason.dimmed()));
        }
    }
}

/// Print a daemon response.
pub fn print_response(response: &IpcResponse) {
    match response {
        IpcResponse::Event { event } => print_event(event),
        IpcResponse::Skipped => print_skipped(),
        IpcResponse::Error { message } => print_error(message),
    }
}

fn print_skipped() {
    println!(
        "{} No username set, nothing to refresh",
        "[SKIPPED]".yellow().bold()
    );
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stdout().flush();
}
