//! Application services and ports for the Planora access-control core.

#![forbid(unsafe_code)]

mod access_gate;
mod auth_session_service;
mod session_ports;

pub use access_gate::{AccessDecision, AccessGate, GateRequirement, evaluate_gate};
pub use auth_session_service::{AuthSessionService, AuthState};
pub use session_ports::{PersistedSession, SessionRepository, TokenPair};
