//! Avatar CLI commands: set, show, clear.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use mutsumi_core::avatar::AvatarSlot;
use mutsumi_core::dispatch::attachment::parse_data_uri;
use mutsumi_infra::attachment::{AVATAR_MAX_DIMENSION, load_image};

use crate::state::AppState;

const SLOTS: [AvatarSlot; 2] = [AvatarSlot::User, AvatarSlot::Character];

fn slot_name(slot: AvatarSlot) -> &'static str {
    match slot {
        AvatarSlot::User => "user",
        AvatarSlot::Character => "character",
    }
}

/// Read an image file and store it as the avatar for `slot`.
///
/// # Examples
///
/// ```bash
/// mutsumi avatar set --character ./mutsumi.png
/// ```
pub async fn set_avatar(state: &AppState, slot: AvatarSlot, path: &Path, json: bool) -> Result<()> {
    let data_uri = load_image(path, AVATAR_MAX_DIMENSION)
        .await
        .with_context(|| format!("Could not load '{}'", path.display()))?;
    state
        .avatars
        .set(slot, &data_uri)
        .await
        .context("Avatar not saved")?;

    if json {
        println!(
            "{}",
            serde_json::json!({"set": slot_name(slot), "bytes": data_uri.len()})
        );
    } else {
        println!(
            "  {} {} avatar set from {}",
            style("✓").green().bold(),
            slot_name(slot),
            style(path.display()).dim()
        );
    }

    Ok(())
}

/// Show which avatars are stored and their image type.
pub async fn show_avatars(state: &AppState, json: bool) -> Result<()> {
    let mut entries = Vec::new();
    for slot in SLOTS {
        let mime = state
            .avatars
            .get(slot)
            .await
            .map(|uri| match parse_data_uri(&uri) {
                Ok(image) => image.mime_type,
                Err(_) => "unreadable".to_string(),
            });
        entries.push((slot, mime));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(slot, mime)| (slot_name(*slot).to_string(), serde_json::json!(mime)))
            .collect();
        println!("{}", serde_json::Value::Object(map));
        return Ok(());
    }

    println!();
    for (slot, mime) in &entries {
        let value = match mime {
            Some(mime) => style(mime.clone()).green(),
            None => style("not set".to_string()).dim(),
        };
        println!("  {:<11} {}", style(format!("{}:", slot_name(*slot))).bold(), value);
    }
    println!();

    Ok(())
}

/// Remove the named avatars, or both when neither flag is given.
pub async fn clear_avatars(state: &AppState, user: bool, character: bool, json: bool) -> Result<()> {
    let both = !user && !character;
    let mut cleared = Vec::new();
    for slot in SLOTS {
        let selected = both
            || (slot == AvatarSlot::User && user)
            || (slot == AvatarSlot::Character && character);
        if selected {
            state.avatars.clear(slot).await;
            cleared.push(slot_name(slot));
        }
    }

    if json {
        println!("{}", serde_json::json!({"cleared": cleared}));
    } else {
        println!(
            "  {} Cleared {} avatar{}",
            style("✓").green().bold(),
            cleared.join(" and "),
            if cleared.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
