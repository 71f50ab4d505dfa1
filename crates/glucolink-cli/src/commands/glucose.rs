//! Connection and glucose commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use glucolink_auth::{AuthError, CgmData, NO_CONNECTIONS_MESSAGE};
use serde_json::Value;

fn not_logged_in(e: AuthError) -> anyhow::Error {
    match e {
        AuthError::NotLoggedIn => anyhow!("Not logged in. Run 'glucolink login' first."),
        other => other.into(),
    }
}

/// Human-readable trend for the provider's 1..=5 arrow code.
fn trend_label(arrow: i64) -> &'static str {
    match arrow {
        1 => "falling quickly",
        2 => "falling",
        3 => "stable",
        4 => "rising",
        5 => "rising quickly",
        _ => "unknown",
    }
}

/// Summary lines for the latest measurement in a connection payload.
fn measurement_rows(connection: &Value) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    let name = [connection.get("firstName"), connection.get("lastName")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    if !name.is_empty() {
        rows.push(("Patient", name));
    }

    let Some(measurement) = connection.get("glucoseMeasurement") else {
        return rows;
    };

    if let Some(mg_dl) = measurement.get("ValueInMgPerDl").and_then(Value::as_f64) {
        rows.push(("Glucose", format!("{} mg/dL", mg_dl)));
    }
    if let Some(arrow) = measurement.get("TrendArrow").and_then(Value::as_i64) {
        rows.push(("Trend", trend_label(arrow).to_string()));
    }
    if measurement.get("isHigh").and_then(Value::as_bool) == Some(true) {
        rows.push(("Alert", "high".to_string()));
    } else if measurement.get("isLow").and_then(Value::as_bool) == Some(true) {
        rows.push(("Alert", "low".to_string()));
    }
    if let Some(timestamp) = measurement.get("Timestamp").and_then(Value::as_str) {
        rows.push(("Measured", timestamp.to_string()));
    }
    rows
}

/// Show the active connection.
pub async fn connection(ctx: &Context) -> Result<()> {
    let manager = ctx.session_manager()?;

    match manager.fetch_connection_or_refresh().await.map_err(not_logged_in)? {
        Some(connection) => match ctx.format {
            OutputFormat::Text => {
                output::print_heading("Connection");
                output::print_row("Patient ID", &connection.patient_id);
                let raw = serde_json::to_value(&connection)?;
                for (label, value) in measurement_rows(&raw) {
                    output::print_row(label, &value);
                }
            }
            OutputFormat::Json => output::print_json(&connection)?,
        },
        None => output::print_notice("no_connection", "No connection", &ctx.format),
    }
    Ok(())
}

/// Show the latest glucose reading for the active connection.
pub async fn glucose(ctx: &Context) -> Result<()> {
    let manager = ctx.session_manager()?;

    match manager.fetch_cgm_data_or_refresh().await.map_err(not_logged_in)? {
        Some(CgmData::Graph(connection)) => match ctx.format {
            OutputFormat::Text => {
                let rows = measurement_rows(&connection);
                if rows.is_empty() {
                    println!("No measurement in the latest reading");
                }
                for (label, value) in rows {
                    output::print_row(label, &value);
                }
            }
            OutputFormat::Json => output::print_json(&connection)?,
        },
        Some(CgmData::NoConnections) => {
            output::print_notice("no_connections", NO_CONNECTIONS_MESSAGE, &ctx.format)
        }
        None => output::print_notice("no_data", "No data available", &ctx.format),
    }
    Ok(())
}
