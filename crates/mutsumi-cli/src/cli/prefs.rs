//! Preference CLI commands: show, set.

use anyhow::Result;
use console::style;
use serde_json::Value;

use mutsumi_core::preferences::Settings;

use crate::state::AppState;

/// Interpret a command-line value: JSON when it parses, a plain string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Print user preferences and app settings.
pub async fn show_prefs(state: &AppState, json: bool) -> Result<()> {
    let preferences = state.preferences.user_preferences().await;
    let settings = state.preferences.app_settings().await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "userPreferences": preferences,
                "appSettings": settings,
            }))?
        );
        return Ok(());
    }

    println!();
    print_section("User preferences", &preferences);
    print_section("App settings", &settings);

    Ok(())
}

/// Set a single entry, leaving the others untouched.
///
/// # Examples
///
/// ```bash
/// mutsumi prefs set nickname "小祥"
/// mutsumi prefs set --app sendOnEnter true
/// ```
pub async fn set_pref(state: &AppState, key: &str, raw: &str, app: bool, json: bool) -> Result<()> {
    let value = parse_value(raw);
    let mut current = if app {
        state.preferences.app_settings().await
    } else {
        state.preferences.user_preferences().await
    };
    current.insert(key.to_string(), value.clone());
    if app {
        state.preferences.set_app_settings(&current).await;
    } else {
        state.preferences.set_user_preferences(&current).await;
    }

    if json {
        println!("{}", serde_json::json!({"key": key, "value": value, "app": app}));
    } else {
        println!(
            "  {} {} = {}",
            style("✓").green().bold(),
            style(key).bold(),
            value
        );
    }

    Ok(())
}

fn print_section(title: &str, entries: &Settings) {
    println!("  {}", style(title).bold());
    if entries.is_empty() {
        println!("    {}", style("(empty)").dim());
    }
    for (key, value) in entries {
        println!("    {} = {}", style(key).cyan(), value);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("42"), serde_json::json!(42));
        assert_eq!(parse_value("小祥"), Value::String("小祥".to_string()));
        assert_eq!(parse_value("\"quoted\""), Value::String("quoted".to_string()));
    }
}
