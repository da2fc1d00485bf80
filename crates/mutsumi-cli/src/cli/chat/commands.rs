//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and control sessions, attachments and the
//! garden.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Clear the terminal screen.
    Clear,
    Exit,
    /// Leave the current session and start a new one.
    New,
    /// List stored sessions.
    Sessions,
    /// Open a session by list index or id.
    Switch(String),
    /// Attach an image to the next message.
    Image(String),
    /// Drop a pending attachment.
    Detach,
    Garden,
    Water,
    /// Unknown command, or a known one missing its argument.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (trimmed, ""),
    };
    let cmd = cmd.to_lowercase();

    let with_arg = |make: fn(String) -> ChatCommand, usage: &str| {
        if arg.is_empty() {
            ChatCommand::Unknown(usage.to_string())
        } else {
            make(arg.to_string())
        }
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/sessions" | "/ls" => ChatCommand::Sessions,
        "/switch" | "/open" => with_arg(ChatCommand::Switch, "/switch requires a session number or id"),
        "/image" | "/img" => with_arg(ChatCommand::Image, "/image requires a file path"),
        "/detach" => ChatCommand::Detach,
        "/garden" => ChatCommand::Garden,
        "/water" => ChatCommand::Water,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Text progress bar for the garden, e.g. `[#####-----]  50%`.
pub fn garden_bar(progress: f64, width: usize) -> String {
    let ratio = (progress / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).floor() as usize).min(width);
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress.clamp(0.0, 100.0).floor() as u32
    )
}

pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/new", "Start a new conversation"),
        ("/sessions", "List stored conversations"),
        ("/switch <n|id>", "Open a stored conversation"),
        ("/image <path>", "Attach an image to the next message"),
        ("/detach", "Drop the pending image"),
        ("/garden", "Check on the cucumber"),
        ("/water", "Water the cucumber"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (cmd, desc) in rows {
        println!("  {:<24} {}", style(cmd).cyan(), desc);
    }
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit. Replies always land in the conversation they were sent from.").dim()
    );
    println!();
}
