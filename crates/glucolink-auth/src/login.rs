//! Two-phase login with server-directed region correction.

use crate::endpoint::normalize_region;
use crate::headers::client_headers;
use crate::{AuthError, AuthOutcome, AuthResult, LinkUpClient, LoginRequest, Session};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Status the provider uses for a successful login.
const SUCCESS_STATUS: i64 = 0;

/// Reported when a rejection carries no usable status.
pub const UNKNOWN_STATUS: i64 = 999_999;

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Where the provider told us the account lives, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RegionHint {
    /// `data.user.country`
    UserCountry(String),
    /// `data.region`
    Region(String),
    /// Neither field present
    Unspecified,
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

impl RegionHint {
    fn from_data(data: &Value) -> Self {
        if let Some(country) = non_empty_str(data.pointer("/user/country")) {
            RegionHint::UserCountry(country.to_string())
        } else if let Some(region) = non_empty_str(data.get("region")) {
            RegionHint::Region(region.to_string())
        } else {
            RegionHint::Unspecified
        }
    }

    fn confirmed_region(&self, requested: &str) -> String {
        match self {
            RegionHint::UserCountry(code) | RegionHint::Region(code) => normalize_region(code),
            RegionHint::Unspecified => normalize_region(requested),
        }
    }
}

/// A login response split on its status field.
#[derive(Debug)]
enum LoginReply {
    Rejected { status: i64 },
    Accepted { data: Value },
}

impl LoginReply {
    fn classify(mut body: Value) -> Self {
        match body.get("status").and_then(Value::as_i64) {
            Some(SUCCESS_STATUS) => LoginReply::Accepted {
                data: body.get_mut("data").map(Value::take).unwrap_or(Value::Null),
            },
            Some(status) => LoginReply::Rejected { status },
            None => LoginReply::Rejected {
                status: UNKNOWN_STATUS,
            },
        }
    }
}

/// Build the session from an authoritative login payload.
fn session_from(data: &Value, answered_region: &str) -> AuthResult<Session> {
    let token = non_empty_str(data.pointer("/authTicket/token")).ok_or_else(|| {
        AuthError::MalformedResponse("login succeeded without authTicket.token".to_string())
    })?;
    let account_id = non_empty_str(data.pointer("/user/id")).ok_or_else(|| {
        AuthError::MalformedResponse("login succeeded without user.id".to_string())
    })?;

    let region = match non_empty_str(data.pointer("/user/country")) {
        Some(country) => normalize_region(country),
        None => normalize_region(answered_region),
    };

    Ok(Session {
        token: token.to_string(),
        account_id: account_id.to_string(),
        region,
    })
}

impl LinkUpClient {
    async fn login_at(&self, region: &str, request: &LoginRequest) -> AuthResult<LoginReply> {
        let url = self.resolver().url(region, "auth/login");
        let body = LoginBody {
            email: &request.username,
            password: &request.password,
        };
        let reply = self.post_json(&url, client_headers(), &body).await?;
        Ok(LoginReply::classify(reply))
    }

    /// Log in, following the provider's region redirect at most once.
    ///
    /// Rejections come back as [`AuthOutcome::Failure`]; transport and parse
    /// failures are returned as `Err`.
    pub async fn authenticate(&self, request: &LoginRequest) -> AuthResult<AuthOutcome> {
        info!(region = %request.region, "Logging in");

        let data = match self.login_at(&request.region, request).await? {
            LoginReply::Rejected { status } => {
                info!(status, region = %request.region, "Login rejected");
                return Ok(AuthOutcome::Failure { status });
            }
            LoginReply::Accepted { data } => data,
        };

        let hint = RegionHint::from_data(&data);
        let confirmed = hint.confirmed_region(&request.region);

        let (answered_region, data) = if confirmed.eq_ignore_ascii_case(&request.region) {
            (request.region.as_str(), data)
        } else {
            info!(
                requested = %request.region,
                confirmed = %confirmed,
                hint = ?hint,
                "Account lives in another region, retrying login there"
            );
            match self.login_at(&confirmed, request).await? {
                LoginReply::Rejected { status } => {
                    info!(status, region = %confirmed, "Login rejected after region redirect");
                    return Ok(AuthOutcome::Failure { status });
                }
                LoginReply::Accepted { data } => (confirmed.as_str(), data),
            }
        };

        let session = session_from(&data, answered_region)?;
        info!(region = %session.region, "Login succeeded");
        Ok(AuthOutcome::Success(session))
    }

    /// Like [`authenticate`](Self::authenticate), folding errors into
    /// [`AuthOutcome::Unknown`].
    pub async fn authenticate_or_unknown(&self, request: &LoginRequest) -> AuthOutcome {
        match self.authenticate(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "Login failed before a status was read");
                AuthOutcome::Unknown
            }
        }
    }
}
