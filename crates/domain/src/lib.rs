//! Domain types and pure decision logic for the Planora access-control core.

#![forbid(unsafe_code)]

mod role;
mod route;
mod token;
mod user;

pub use role::{RoleCode, RoleGrant, has_all_roles, has_any_role, has_role, resolve_roles};
pub use route::{EdgeDecision, RouteClass, RoutePolicy, decide_edge};
pub use token::{CLOCK_SKEW_MS, Claims, decode_claims, is_expired, is_expired_at, is_valid};
pub use user::{User, UserId, UserUpdate};
