//! CLI command definitions for the `mutsumi` binary.
//!
//! Uses clap derive macros. Subcommands follow a noun-verb pattern
//! (`mutsumi sessions list`, `mutsumi key set`).

pub mod avatar;
pub mod chat;
pub mod data;
pub mod key;
pub mod prefs;
pub mod session;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;

/// Chat with Mutsumi from the terminal.
#[derive(Parser)]
#[command(name = "mutsumi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also print OpenTelemetry spans to stdout (debugging aid, off with --json).
    #[arg(long, global = true)]
    pub otel: bool,

    /// API key to use instead of the stored one.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Span export shares stdout, so it never runs alongside `--json`.
    pub fn otel_enabled(&self) -> bool {
        self.otel && !self.json
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat {
        /// Open an existing session (list index or id).
        #[arg(long, short)]
        session: Option<String>,

        /// Attach an image to the first message.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Browse and export stored sessions.
    #[command(alias = "session")]
    Sessions {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Manage the Gemini API key.
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// Manage the user and character avatars.
    Avatar {
        #[command(subcommand)]
        action: AvatarCommand,
    },

    /// Show or change stored preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsCommand,
    },

    /// Delete every stored session, key, avatar and preference.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List sessions, most recent first.
    #[command(alias = "ls")]
    List,

    /// Print a session's transcript.
    Show {
        /// List index (1 = most recent) or session id.
        session: String,
    },

    /// Export a session as Markdown (or JSON with --json).
    Export {
        /// List index (1 = most recent) or session id.
        session: String,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Store an API key. Prompts when no value is given.
    Set {
        /// Key value (visible in shell history; prefer the prompt).
        value: Option<String>,
    },

    /// Remove the stored API key.
    Clear,

    /// Show whether a usable key is configured.
    Status {
        /// Send a test request with the key.
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Subcommand)]
pub enum AvatarCommand {
    /// Set an avatar from an image file.
    #[command(group(ArgGroup::new("slot").required(true).args(["user", "character"])))]
    Set {
        /// Set the user's avatar.
        #[arg(long)]
        user: bool,

        /// Set Mutsumi's avatar.
        #[arg(long)]
        character: bool,

        /// Image file (png, jpeg, gif, webp, heic).
        path: PathBuf,
    },

    /// Show which avatars are set.
    Show,

    /// Remove avatars (both unless one is named).
    Clear {
        #[arg(long)]
        user: bool,

        #[arg(long)]
        character: bool,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommand {
    /// Print user preferences and app settings.
    Show,

    /// Set a single entry. The value is parsed as JSON, falling back to a string.
    Set {
        key: String,
        value: String,

        /// Write to app settings instead of user preferences.
        #[arg(long)]
        app: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_otel_is_off_for_json_output() {
        let cli = Cli::try_parse_from(["mutsumi", "--otel", "sessions", "list"]).unwrap();
        assert!(cli.otel_enabled());
        let cli = Cli::try_parse_from(["mutsumi", "--otel", "--json", "sessions", "list"]).unwrap();
        assert!(!cli.otel_enabled());
    }

    #[test]
    fn test_parse_chat_with_session() {
        let cli = Cli::try_parse_from(["mutsumi", "chat", "--session", "2"]).unwrap();
        match cli.command {
            Commands::Chat { session, image } => {
                assert_eq!(session.as_deref(), Some("2"));
                assert!(image.is_none());
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_avatar_set_requires_slot() {
        assert!(Cli::try_parse_from(["mutsumi", "avatar", "set", "a.png"]).is_err());
        assert!(
            Cli::try_parse_from(["mutsumi", "avatar", "set", "--user", "--character", "a.png"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["mutsumi", "avatar", "set", "--user", "a.png"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mutsumi", "sessions", "list", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
