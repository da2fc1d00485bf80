//! Main chat loop orchestration.
//!
//! Opens the conversation view, offers to configure a key when none is
//! set, then reads lines until Ctrl+D or `/exit`. Each send goes through
//! `begin_send` / `run` / `finish_send` with a spinner around the remote
//! call.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use mutsumi_core::credential::{CredentialError, mask_secret};
use mutsumi_core::garden::{Garden, MAX_PROGRESS, WaterOutcome};
use mutsumi_core::view::conversation::ConversationView;
use mutsumi_infra::attachment::{ATTACHMENT_MAX_DIMENSION, load_image};

use crate::cli::session::{print_message, resolve_session, short_title};
use crate::state::AppState;

use super::banner::{BannerInfo, print_welcome_banner};
use super::commands::{self, ChatCommand, garden_bar};
use super::input::{ChatInput, InputEvent};

const GARDEN_BAR_WIDTH: usize = 20;

/// Run the interactive chat loop.
pub async fn run_chat_loop(
    state: &AppState,
    session_ref: Option<&str>,
    image: Option<&Path>,
) -> Result<()> {
    let mut view = state.open_view().await;

    if let Some(reference) = session_ref {
        let id = resolve_session(view.repository().list_sessions(), reference)
            .with_context(|| format!("Session '{reference}' not found"))?;
        view.select_session(id);
    }

    let online = state.credentials.has_key().await;
    let session_title = view
        .active_session()
        .and_then(|id| view.repository().get(id))
        .map(|s| s.title.clone());
    print_welcome_banner(&BannerInfo {
        model: &view.dispatch().profile().model,
        medium: state.medium(),
        session_title: session_title.as_deref(),
        online,
    });

    if !online {
        offer_key_setup(state, &mut view).await;
    }

    if let Some(path) = image {
        attach_image(&mut view, path).await;
    }

    for message in view.messages() {
        print_message(message);
    }
    println!();

    let mut garden = Garden::default();

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::New => {
                    view.new_chat();
                    println!("\n  {}\n", style("New conversation.").dim());
                    for message in view.messages() {
                        print_message(message);
                    }
                }
                ChatCommand::Sessions => print_sessions(&view),
                ChatCommand::Switch(reference) => switch_session(&mut view, &reference),
                ChatCommand::Image(path) => attach_image(&mut view, Path::new(&path)).await,
                ChatCommand::Detach => {
                    view.clear_attachment();
                    println!("  {}", style("Attachment dropped.").dim());
                }
                ChatCommand::Garden => {
                    println!(
                        "\n  🥒 {}\n",
                        garden_bar(garden.progress(), GARDEN_BAR_WIDTH)
                    );
                }
                ChatCommand::Water => match garden.water() {
                    WaterOutcome::Watered { progress } => {
                        let hint = if progress >= MAX_PROGRESS {
                            " ready to harvest, water once more"
                        } else {
                            ""
                        };
                        println!(
                            "\n  💧 {}{}\n",
                            garden_bar(progress, GARDEN_BAR_WIDTH),
                            style(hint).green()
                        );
                    }
                    WaterOutcome::Harvested => {
                        println!(
                            "\n  🥒 {}\n",
                            style("Harvested a cucumber. A new one is planted.").green()
                        );
                    }
                },
                ChatCommand::Unknown(cmd_name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(cmd_name).dim()
                    );
                }
            }
            continue;
        }

        send_turn(&mut view, &text).await;
    }

    Ok(())
}

/// Send one message and print the reply.
async fn send_turn(view: &mut ConversationView, text: &str) {
    let Some(pending) = view.begin_send(text).await else {
        return;
    };
    if view.messages().last().is_some_and(|m| m.image.is_some()) {
        println!("  {}", style("[image sent]").magenta());
    }

    let spinner = if pending.is_remote() {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("……");
        spinner.enable_steady_tick(Duration::from_millis(80));
        Some(spinner)
    } else {
        None
    };

    let completed = pending.run().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let reply = view.finish_send(completed).await;
    print_message(&reply);
    println!();
}

/// Ask for a key once; an empty answer keeps the chat offline.
async fn offer_key_setup(state: &AppState, view: &mut ConversationView) {
    println!(
        "  {} No API key configured. Paste one to chat online, or press Enter to stay offline.",
        style("i").blue().bold()
    );
    let raw = match Password::new()
        .with_prompt("Gemini API key")
        .allow_empty_password(true)
        .interact()
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "key prompt unavailable");
            return;
        }
    };
    if raw.trim().is_empty() {
        return;
    }

    match state.credentials.save(&raw).await {
        Ok(key) => match view.dispatch_mut().configure(&key) {
            Ok(()) => {
                info!(key = %mask_secret(key.expose_secret()), "chat configured");
                if view.active_session().is_none() {
                    view.welcome();
                }
                println!("  {} Key saved.\n", style("✓").green().bold());
            }
            Err(e) => println!("  {} {e}\n", style("!").red().bold()),
        },
        Err(CredentialError::Validation(e)) => {
            println!(
                "  {} {e}. Staying offline; set a key later with {}.\n",
                style("!").yellow().bold(),
                style("mutsumi key set").yellow()
            );
        }
        Err(e) => println!("  {} Key not saved: {e}\n", style("!").red().bold()),
    }
}

async fn attach_image(view: &mut ConversationView, path: &Path) {
    match load_image(path, ATTACHMENT_MAX_DIMENSION).await {
        Ok(data_uri) => {
            view.attach(data_uri);
            println!(
                "  {} {} attached to your next message",
                style("+").magenta().bold(),
                style(path.display()).dim()
            );
        }
        Err(e) => println!("  {} {e}", style("!").red().bold()),
    }
}

fn print_sessions(view: &ConversationView) {
    let sessions = view.repository().list_sessions();
    println!();
    if sessions.is_empty() {
        println!("  {}", style("No stored conversations yet.").dim());
    }
    for (index, session) in sessions.iter().enumerate() {
        let marker = if view.active_session() == Some(&session.id) {
            style("*").green().bold()
        } else {
            style(" ").dim()
        };
        println!(
            "  {} {:>2}. {}  {}",
            marker,
            index + 1,
            style(short_title(session, 24)).cyan(),
            style(format!("{} messages", session.messages.len())).dim()
        );
    }
    println!();
}

fn switch_session(view: &mut ConversationView, reference: &str) {
    let Some(id) = resolve_session(view.repository().list_sessions(), reference) else {
        println!(
            "  {} No conversation matches '{}'. Try /sessions.",
            style("?").yellow().bold(),
            reference
        );
        return;
    };
    if view.select_session(id) {
        println!();
        for message in view.messages() {
            print_message(message);
        }
        println!();
    }
}
