//! Fixed client identification headers.

use crate::account_hash::account_id_digest;
use crate::{AuthResult, Session};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA,
};

/// Client product name the provider expects.
pub const PRODUCT: &str = "llu.android";
/// Client version the provider expects.
pub const VERSION: &str = "4.16.0";

pub const ACCOUNT_ID_HEADER: &str = "account-id";

/// Headers sent on every request.
pub fn client_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static("product"), HeaderValue::from_static(PRODUCT));
    headers.insert(HeaderName::from_static("version"), HeaderValue::from_static(VERSION));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Client headers plus bearer token and hashed account id.
pub fn authorized_headers(session: &Session) -> AuthResult<HeaderMap> {
    let mut headers = client_headers();

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", session.token))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    headers.insert(
        HeaderName::from_static(ACCOUNT_ID_HEADER),
        HeaderValue::from_str(&account_id_digest(&session.account_id))?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "tok-123".to_string(),
            account_id: "abc".to_string(),
            region: "eu".to_string(),
        }
    }

    #[test]
    fn client_headers_identify_the_app() {
        let headers = client_headers();
        assert_eq!(headers["product"], "llu.android");
        assert_eq!(headers["version"], "4.16.0");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn authorized_headers_add_bearer_and_hashed_account() {
        let headers = authorized_headers(&session()).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer tok-123");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(
            headers["Account-Id"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(headers["product"], "llu.android");
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let mut bad = session();
        bad.token = "tok\nInjected: yes".to_string();

        assert!(matches!(
            authorized_headers(&bad),
            Err(crate::AuthError::InvalidHeader(_))
        ));
    }
}
