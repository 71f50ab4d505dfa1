//! Authentication commands.

use super::{Context, LAST_REGION_PREF};
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use glucolink_auth::{AuthOutcome, AuthStatus, LoginRequest, SessionManager};
use serde_json::json;
use std::io::{self, Write};
use tracing::info;

/// Pick the starting region: flag, then last successful login, then config.
fn starting_region(ctx: &Context, flag: Option<&str>) -> Result<String> {
    if let Some(region) = flag {
        return Ok(region.trim().to_lowercase());
    }
    let prefs = ctx.preferences()?;
    Ok(prefs
        .get::<String>(LAST_REGION_PREF)
        .unwrap_or_else(|| ctx.config.default_region.clone()))
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

fn report_login(ctx: &Context, outcome: AuthOutcome, remember: bool) -> Result<()> {
    match outcome {
        AuthOutcome::Success(session) => {
            let mut prefs = ctx.preferences()?;
            prefs.set(LAST_REGION_PREF, &session.region)?;
            info!(region = %session.region, "Login stored");

            match ctx.format {
                OutputFormat::Text => {
                    println!("Logged in (region: {})", session.region);
                    if !remember {
                        println!("Credentials were not saved; run login again when the session ends.");
                    }
                }
                OutputFormat::Json => output::print_json(&json!({
                    "status": "success",
                    "region": session.region,
                    "remembered": remember,
                }))?,
            }
            Ok(())
        }
        AuthOutcome::Failure { status } => {
            bail!("Login rejected by LibreLinkUp (status {})", status)
        }
        AuthOutcome::Unknown => bail!("Login failed before the server answered"),
    }
}

async fn login_saved(ctx: &Context, manager: &SessionManager) -> Result<()> {
    if manager.credentials().get_credentials().is_none() {
        bail!("No saved credentials. Run 'glucolink login' and enter them once.");
    }
    if ctx.format == OutputFormat::Text {
        println!("Logging in with saved credentials...");
    }
    let outcome = manager.relogin().await?;
    report_login(ctx, outcome, true)
}

/// Login with email and password, or with the saved ones when `saved` is set.
pub async fn login(ctx: &Context, region: Option<&str>, remember: bool, saved: bool) -> Result<()> {
    let manager = ctx.session_manager()?;
    if saved {
        return login_saved(ctx, &manager).await;
    }

    let region = starting_region(ctx, region)?;

    let email = prompt_email()?;
    if email.is_empty() {
        bail!("Email is required");
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        bail!("Password is required");
    }

    if ctx.format == OutputFormat::Text {
        println!("Logging in...");
    }

    let request = LoginRequest::new(region, email, password);
    let outcome = manager.login(&request, remember).await?;
    report_login(ctx, outcome, remember)
}

/// Logout and clear session.
pub async fn logout(ctx: &Context, forget: bool) -> Result<()> {
    let manager = ctx.session_manager()?;
    manager.logout(forget)?;

    let message = if forget {
        "Logged out and forgot saved credentials"
    } else {
        "Logged out successfully"
    };
    output::print_success(message, &ctx.format);
    Ok(())
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

/// Label/value lines for the text form of `status`.
fn status_rows(status: &AuthStatus, remembered: bool) -> Vec<(&'static str, String)> {
    match status {
        AuthStatus::LoggedIn {
            account_id,
            region,
            logged_in_at,
        } => vec![
            ("Auth", "logged in".to_string()),
            ("Region", region.clone()),
            ("Account", account_id.clone()),
            ("Since", logged_in_at.to_rfc3339()),
            ("Saved", yes_no(remembered)),
        ],
        AuthStatus::NotLoggedIn => vec![
            ("Auth", "not logged in".to_string()),
            ("Saved", yes_no(remembered)),
        ],
    }
}

/// Check authentication status.
pub async fn status(ctx: &Context) -> Result<()> {
    let manager = ctx.session_manager()?;
    let status = manager.status();
    let remembered = manager.credentials().get_credentials().is_some();

    match ctx.format {
        OutputFormat::Text => {
            for (label, value) in status_rows(&status, remembered) {
                println!("{:<10}{}", format!("{}:", label), value);
            }
        }
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&status)?;
            value["credentials_saved"] = json!(remembered);
            output::print_json(&value)?;
        }
    }
    Ok(())
}
