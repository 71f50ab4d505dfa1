//! LibreLinkUp authentication and data access for glucolink.
//!
//! This crate provides:
//! - Region to endpoint resolution with the provider's `ch` to `eu` merge
//! - Two-phase login that follows the provider's region redirect once
//! - Best-effort connection and glucose graph fetches
//! - FSM-based session lifecycle backed by the secure credential store

mod account_hash;
mod auth_fsm;
mod client;
mod connections;
mod endpoint;
mod error;
mod headers;
mod login;
mod model;
mod observer;
mod session;

pub use account_hash::account_id_digest;
pub use auth_fsm::auth_machine;
pub use auth_fsm::{AuthMachine, AuthMachineInput, AuthMachineState, AuthState};
pub use client::LinkUpClient;
pub use connections::{CgmData, Connection, NO_CONNECTIONS_MESSAGE};
pub use endpoint::{normalize_region, EndpointResolver};
pub use error::{AuthError, AuthResult};
pub use headers::{authorized_headers, client_headers, PRODUCT, VERSION};
pub use login::UNKNOWN_STATUS;
pub use model::{AuthOutcome, LoginRequest, Session};
pub use observer::{FailureObserver, FetchStage, Swallowed, TracingObserver};
pub use session::{AuthStatus, SessionManager};
