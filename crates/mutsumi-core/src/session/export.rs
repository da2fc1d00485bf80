//! Markdown rendering of a session.

use std::fmt::Write;

use mutsumi_types::message::Sender;
use mutsumi_types::session::Session;

/// Render `session` as a Markdown transcript. Images are noted, not inlined.
pub fn export_markdown(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", session.title);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- **Last active:** {}",
        session.last_modified.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "- **Messages:** {}", session.messages.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "---");

    for msg in &session.messages {
        let label = match msg.sender {
            Sender::User => "**You**",
            Sender::Persona => "**Mutsumi**",
            Sender::System => "**System**",
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "### {label} ({})", msg.timestamp.format("%H:%M"));
        let _ = writeln!(out);
        if msg.image.is_some() {
            let _ = writeln!(out, "_[image attached]_");
            let _ = writeln!(out);
        }
        if !msg.text.is_empty() {
            let _ = writeln!(out, "{}", msg.text);
        }
    }

    out
}
