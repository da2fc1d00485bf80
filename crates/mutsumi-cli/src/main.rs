//! Mutsumi CLI entry point.
//!
//! Binary name: `mutsumi`
//!
//! Parses arguments, sets up tracing, opens the store and dispatches to the
//! command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{AvatarCommand, Cli, Commands, KeyCommand, PrefsCommand, SessionCommand};
use mutsumi_core::avatar::AvatarSlot;
use mutsumi_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel_enabled())
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mutsumi", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.api_key.clone()).await?;
    let result = run(&state, cli).await;

    shutdown_tracing();
    result
}

async fn run(state: &AppState, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat { session, image } => {
            cli::chat::loop_runner::run_chat_loop(state, session.as_deref(), image.as_deref())
                .await?;
        }

        Commands::Sessions { action } => match action {
            SessionCommand::List => cli::session::list_sessions(state, cli.json).await?,
            SessionCommand::Show { session } => {
                cli::session::show_session(state, &session, cli.json).await?;
            }
            SessionCommand::Export { session } => {
                cli::session::export_session(state, &session, cli.json).await?;
            }
        },

        Commands::Key { action } => match action {
            KeyCommand::Set { value } => {
                cli::key::set_key(state, value.as_deref(), cli.json).await?;
            }
            KeyCommand::Clear => cli::key::clear_key(state, cli.json).await?,
            KeyCommand::Status { verify } => {
                cli::key::key_status(state, verify, cli.json).await?;
            }
        },

        Commands::Avatar { action } => match action {
            AvatarCommand::Set {
                user,
                character: _,
                path,
            } => {
                let slot = if user {
                    AvatarSlot::User
                } else {
                    AvatarSlot::Character
                };
                cli::avatar::set_avatar(state, slot, &path, cli.json).await?;
            }
            AvatarCommand::Show => cli::avatar::show_avatars(state, cli.json).await?,
            AvatarCommand::Clear { user, character } => {
                cli::avatar::clear_avatars(state, user, character, cli.json).await?;
            }
        },

        Commands::Prefs { action } => match action {
            PrefsCommand::Show => cli::prefs::show_prefs(state, cli.json).await?,
            PrefsCommand::Set { key, value, app } => {
                cli::prefs::set_pref(state, &key, &value, app, cli.json).await?;
            }
        },

        Commands::Reset { force } => cli::data::reset_all(state, force, cli.json).await?,

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}
