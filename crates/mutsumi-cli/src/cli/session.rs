//! Session browsing CLI commands: list, show, export.
//!
//! Sessions can be named by full id, by their 1-based position in the list
//! (most recent first), or by an unambiguous id prefix.

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use mutsumi_core::session::export::export_markdown;
use mutsumi_types::message::{Message, Sender};
use mutsumi_types::session::{Session, SessionId, truncate_utf16};

use crate::state::AppState;

/// Shortest id prefix accepted as a session reference.
const MIN_PREFIX_LEN: usize = 4;

/// Resolve an id, list index or id prefix against `sessions`.
pub fn resolve_session(sessions: &[Session], reference: &str) -> Option<SessionId> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Some(session) = sessions.iter().find(|s| s.id.as_str() == reference) {
        return Some(session.id.clone());
    }

    // an all-digit id prefix that is not a valid index falls through
    if let Some(session) = reference
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|i| sessions.get(i))
    {
        return Some(session.id.clone());
    }

    if reference.len() < MIN_PREFIX_LEN {
        return None;
    }
    let mut matches = sessions
        .iter()
        .filter(|s| s.id.as_str().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id.clone()),
        _ => None,
    }
}

/// List stored sessions with title, last activity and message count.
///
/// # Examples
///
/// ```bash
/// mutsumi sessions list
/// mutsumi sessions list --json
/// ```
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let repository = state.repository().await;
    let sessions = repository.list_sessions();

    if json {
        println!("{}", serde_json::to_string_pretty(sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("mutsumi chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Last active").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    for (index, session) in sessions.iter().enumerate() {
        let id = session.id.as_str();
        table.add_row(vec![
            Cell::new(index + 1).fg(Color::DarkGrey),
            Cell::new(&session.title).fg(Color::Cyan),
            Cell::new(format_local(session)).fg(Color::White),
            Cell::new(session.messages.len()).fg(Color::White),
            Cell::new(&id[..8.min(id.len())]).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{} ({} storage)",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" },
        state.medium()
    );
    println!();

    Ok(())
}

/// Print a session's transcript.
pub async fn show_session(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let repository = state.repository().await;
    let session = find(repository.list_sessions(), reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {}  {}",
        style(&session.title).cyan().bold(),
        style(format_local(session)).dim()
    );
    println!();
    for message in &session.messages {
        print_message(message);
    }
    println!();

    Ok(())
}

/// Export a session as Markdown (default) or JSON.
///
/// # Examples
///
/// ```bash
/// mutsumi sessions export 1 > chat.md
/// mutsumi sessions export 0192f0c4 --json
/// ```
pub async fn export_session(state: &AppState, reference: &str, json: bool) -> Result<()> {
    let repository = state.repository().await;
    let session = find(repository.list_sessions(), reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
    } else {
        print!("{}", export_markdown(session));
    }

    Ok(())
}

/// One transcript line, as shown by `sessions show` and the chat loop.
pub fn print_message(message: &Message) {
    let label = match message.sender {
        Sender::User => style("You").green().bold(),
        Sender::Persona => style("Mutsumi").cyan().bold(),
        Sender::System => style("System").yellow().bold(),
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let image = if message.image.is_some() {
        format!(" {}", style("[image]").magenta())
    } else {
        String::new()
    };
    println!(
        "  {} {}{} {}",
        label,
        style(time).dim(),
        image,
        message.text
    );
}

/// Title cut to fit a single table or menu line.
pub fn short_title(session: &Session, max_units: usize) -> String {
    let cut = truncate_utf16(&session.title, max_units);
    if cut.len() < session.title.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

fn find<'a>(sessions: &'a [Session], reference: &str) -> Result<&'a Session> {
    resolve_session(sessions, reference)
        .and_then(|id| sessions.iter().find(|s| s.id == id))
        .with_context(|| format!("Session '{reference}' not found"))
}

fn format_local(session: &Session) -> String {
    session
        .last_modified
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions(n: usize) -> Vec<Session> {
        (0..n)
            .map(|i| Session::new(SessionId::new(), Message::user(format!("m{i}"), None)))
            .collect()
    }

    #[test]
    fn test_resolve_by_index() {
        let list = sessions(3);
        assert_eq!(resolve_session(&list, "1"), Some(list[0].id.clone()));
        assert_eq!(resolve_session(&list, "3"), Some(list[2].id.clone()));
        assert_eq!(resolve_session(&list, "0"), None);
        assert_eq!(resolve_session(&list, "4"), None);
    }

    #[test]
    fn test_resolve_by_full_id() {
        let list = sessions(2);
        let id = list[1].id.to_string();
        assert_eq!(resolve_session(&list, &id), Some(list[1].id.clone()));
        assert_eq!(
            resolve_session(&list, &SessionId::new().to_string()),
            None
        );
    }

    #[test]
    fn test_resolve_by_prefix() {
        let list = sessions(1);
        let id = list[0].id.to_string();
        assert_eq!(resolve_session(&list, &id[..8]), Some(list[0].id.clone()));
        assert_eq!(resolve_session(&list, &id[..3]), None);
    }

    #[test]
    fn test_ambiguous_prefix_is_rejected() {
        // v7 ids created back to back share their timestamp prefix
        let list = sessions(2);
        let a = list[0].id.to_string();
        let b = list[1].id.to_string();
        let common = a
            .chars()
            .zip(b.chars())
            .take_while(|(x, y)| x == y)
            .count();
        if common >= MIN_PREFIX_LEN {
            assert_eq!(resolve_session(&list, &a[..common]), None);
        }
    }

    #[test]
    fn test_resolve_millisecond_ids() {
        let mut list = sessions(2);
        list[0].id = SessionId::from("1735689600000");
        list[1].id = SessionId::from("1735689500000");
        assert_eq!(
            resolve_session(&list, "1735689500000"),
            Some(list[1].id.clone())
        );
        assert_eq!(resolve_session(&list, "2"), Some(list[1].id.clone()));
        // shared prefix, ambiguous
        assert_eq!(resolve_session(&list, "173568"), None);
        assert_eq!(resolve_session(&list, "17356896"), Some(list[0].id.clone()));
    }

    #[test]
    fn test_short_title() {
        let mut session = sessions(1).remove(0);
        session.title = "一二三四五六".to_string();
        assert_eq!(short_title(&session, 4), "一二三四...");
        assert_eq!(short_title(&session, 10), "一二三四五六");
    }
}
