//! Local data reset.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use mutsumi_core::preferences::clear_all_data;

use crate::state::AppState;

/// Delete every stored session, the API key, avatars and preferences.
///
/// Asks for confirmation unless `force` is set. With `--json` and no
/// `--force` nothing is deleted, since there is no one to ask.
pub async fn reset_all(state: &AppState, force: bool, json: bool) -> Result<()> {
    if !force {
        if json {
            println!("{}", serde_json::json!({"reset": false, "reason": "confirmation required, pass --force"}));
            return Ok(());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all local Mutsumi data in {}?",
                style(state.data_dir.display()).bold()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    clear_all_data(state.adapter()).await;

    if json {
        println!("{}", serde_json::json!({"reset": true}));
    } else {
        println!("  {} All local data deleted", style("✓").green().bold());
    }

    Ok(())
}
