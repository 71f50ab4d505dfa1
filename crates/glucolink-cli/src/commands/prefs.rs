//! Preference commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use serde_json::{json, Value};

/// Values that parse as JSON are stored typed; anything else is a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Show a single preference.
pub async fn prefs_get(ctx: &Context, key: &str) -> Result<()> {
    let prefs = ctx.preferences()?;

    match (prefs.get_raw(key), ctx.format) {
        (Some(value), OutputFormat::Text) => println!("{}", display_value(value)),
        (Some(value), OutputFormat::Json) => {
            output::print_json(&json!({ "key": key, "value": value }))?
        }
        (None, _) => anyhow::bail!("Preference not set: {}", key),
    }
    Ok(())
}

/// Set a preference.
pub async fn prefs_set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut prefs = ctx.preferences()?;
    prefs.set(key, parse_value(value))?;
    output::print_success(&format!("Set {}", key), &ctx.format);
    Ok(())
}

/// Delete a preference.
pub async fn prefs_delete(ctx: &Context, key: &str) -> Result<()> {
    let mut prefs = ctx.preferences()?;
    if prefs.delete(key)? {
        output::print_success(&format!("Deleted {}", key), &ctx.format);
    } else {
        output::print_notice("not_found", &format!("Preference not set: {}", key), &ctx.format);
    }
    Ok(())
}

/// List every preference.
pub async fn prefs_list(ctx: &Context) -> Result<()> {
    let prefs = ctx.preferences()?;
    let keys = prefs.keys();

    match ctx.format {
        OutputFormat::Text => {
            if keys.is_empty() {
                println!("No preferences set");
                return Ok(());
            }
            output::print_heading("Preferences");
            for key in &keys {
                if let Some(value) = prefs.get_raw(key) {
                    output::print_row(key, &display_value(value));
                }
            }
        }
        OutputFormat::Json => {
            let entries: serde_json::Map<String, Value> = keys
                .iter()
                .filter_map(|key| prefs.get_raw(key).map(|value| (key.clone(), value.clone())))
                .collect();
            output::print_json(&entries)?;
        }
    }
    Ok(())
}

/// Remove every preference.
pub async fn prefs_clear(ctx: &Context) -> Result<()> {
    let mut prefs = ctx.preferences()?;
    prefs.clear()?;
    output::print_success("Preferences cleared", &ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_keeps_json_types() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn parse_value_falls_back_to_string() {
        assert_eq!(parse_value("eu"), json!("eu"));
        assert_eq!(parse_value("not json {"), json!("not json {"));
    }

    #[test]
    fn display_value_unquotes_strings() {
        assert_eq!(display_value(&json!("eu")), "eu");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }
}
