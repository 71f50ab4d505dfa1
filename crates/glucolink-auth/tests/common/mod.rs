#![allow(dead_code)]

use glucolink_auth::{EndpointResolver, FailureObserver, LinkUpClient, Session, Swallowed};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use wiremock::MockServer;

/// Resolver whose regions map to `/api-<region>/llu` on the mock server.
pub fn resolver(server: &MockServer) -> EndpointResolver {
    EndpointResolver::new(format!("{}/api-COUNTRY_CODE/llu", server.uri())).unwrap()
}

pub fn client(server: &MockServer) -> LinkUpClient {
    LinkUpClient::new(resolver(server))
}

/// A loopback port that was free a moment ago and now has no listener.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Client whose every request is refused at connect time.
pub fn unreachable_client() -> LinkUpClient {
    let template = format!("http://127.0.0.1:{}/api-COUNTRY_CODE/llu", closed_port());
    LinkUpClient::new(EndpointResolver::new(template).unwrap())
}

pub fn session(region: &str) -> Session {
    Session {
        token: "session-token".to_string(),
        account_id: "account-123".to_string(),
        region: region.to_string(),
    }
}

pub fn login_ok(token: &str, account_id: &str, country: &str) -> Value {
    json!({
        "status": 0,
        "data": {
            "user": {"id": account_id, "country": country, "email": "someone@example.com"},
            "authTicket": {"token": token, "expires": 1767225600, "duration": 15552000000u64}
        }
    })
}

/// Observer that keeps every swallowed failure's stage and message.
#[derive(Default)]
pub struct RecordingObserver {
    pub failures: Mutex<Vec<String>>,
}

impl FailureObserver for RecordingObserver {
    fn on_swallowed(&self, failure: &Swallowed) {
        self.failures.lock().push(failure.to_string());
    }
}

pub fn recording_client(server: &MockServer) -> (LinkUpClient, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let client = client(server).with_observer(observer.clone());
    (client, observer)
}

pub fn unreachable_recording_client() -> (LinkUpClient, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let client = unreachable_client().with_observer(observer.clone());
    (client, observer)
}
