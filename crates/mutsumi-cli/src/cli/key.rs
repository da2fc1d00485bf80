//! API key CLI commands: set, clear, status.

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};

use mutsumi_core::credential::{CredentialStatus, mask_secret};
use mutsumi_core::persona::service::PersonaConnector;
use mutsumi_infra::gemini::verify_connection;

use crate::state::AppState;

/// Store an API key, prompting with hidden input when no value is given.
///
/// # Examples
///
/// ```bash
/// # Secure prompt (recommended)
/// mutsumi key set
///
/// # Script/automation mode
/// mutsumi key set AIza...
/// ```
pub async fn set_key(state: &AppState, value: Option<&str>, json: bool) -> Result<()> {
    let raw = match value {
        Some(v) => v.to_string(),
        None => Password::new()
            .with_prompt(format!("Enter your {}", style("Gemini API key").bold()))
            .interact()?,
    };

    let key = state
        .credentials
        .save(&raw)
        .await
        .context("API key not saved")?;
    let masked = mask_secret(key.expose_secret());

    if json {
        println!(
            "{}",
            serde_json::json!({"set": true, "masked": masked, "storage": state.medium().to_string()})
        );
    } else {
        println!(
            "  {} API key saved ({})",
            style("✓").green().bold(),
            style(masked).dim()
        );
        if state.credentials.is_overridden() {
            println!(
                "  {} GEMINI_API_KEY is set and takes precedence over the stored key.",
                style("!").yellow().bold()
            );
        }
    }

    Ok(())
}

/// Remove the stored API key.
pub async fn clear_key(state: &AppState, json: bool) -> Result<()> {
    state.credentials.clear().await;

    if json {
        println!("{}", serde_json::json!({"cleared": true}));
    } else {
        println!("  {} API key removed", style("✓").green().bold());
    }

    Ok(())
}

/// Report the key's status, optionally checking it against the live API.
pub async fn key_status(state: &AppState, verify: bool, json: bool) -> Result<()> {
    let status = state.credentials.status().await;
    let key = state.credentials.configured().await;
    let masked = key.as_ref().map(|k| mask_secret(k.expose_secret()));
    let source = if state.credentials.is_overridden() {
        "environment"
    } else {
        "stored"
    };

    let verified = match (&key, verify) {
        (Some(key), true) if status == CredentialStatus::Valid => {
            Some(verify_key(state, key, json).await)
        }
        _ => None,
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": status.to_string(),
                "masked": masked,
                "source": key.as_ref().map(|_| source),
                "verified": verified.as_ref().map(|r| r.is_ok()),
                "error": verified.as_ref().and_then(|r| r.as_ref().err().cloned()),
            })
        );
        return Ok(());
    }

    println!();
    let status_text = match status {
        CredentialStatus::Valid => style(status.to_string()).green().bold(),
        CredentialStatus::Invalid => style(status.to_string()).red().bold(),
        CredentialStatus::Unset => style(status.to_string()).yellow().bold(),
    };
    println!("  {:<10} {}", style("Status:").bold(), status_text);
    if let Some(masked) = masked {
        println!(
            "  {:<10} {} ({source})",
            style("Key:").bold(),
            style(masked).dim()
        );
    }
    println!(
        "  {:<10} {}",
        style("Model:").bold(),
        style(&state.config.model).dim()
    );
    match verified {
        Some(Ok(())) => println!(
            "  {:<10} {}",
            style("Verified:").bold(),
            style("connection ok").green()
        ),
        Some(Err(e)) => println!(
            "  {:<10} {}",
            style("Verified:").bold(),
            style(e).red()
        ),
        None if verify && status != CredentialStatus::Valid => println!(
            "  {} Nothing to verify. Set a key with: {}",
            style("i").blue().bold(),
            style("mutsumi key set").yellow()
        ),
        None => {}
    }
    println!();

    Ok(())
}

async fn verify_key(state: &AppState, key: &SecretString, quiet: bool) -> Result<(), String> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("verifying...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let result = match state.connector.connect(key) {
        Ok(service) => verify_connection(&service, &state.config.persona_profile())
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    spinner.finish_and_clear();
    result
}
