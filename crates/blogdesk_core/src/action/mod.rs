//! Authorized action gateway.
//!
//! # Responsibility
//! - Expose the eight blog actions as `(caller, request) -> result` calls.
//! - Apply one shared guard sequence: permission, payload presence, one
//!   store call, result mapping.
//!
//! # Invariants
//! - A denied caller or an incomplete payload never reaches the store.
//! - Each accepted call issues exactly one registry operation; no retries.
//! - Store errors are passed through unchanged.

mod envelope;
mod error;
mod gateway;
mod name;

pub use envelope::{ActionRequest, Caller};
pub use error::{ActionError, ActionResult, NOT_PERMITTED_MESSAGE};
pub use gateway::ActionGateway;
pub use name::{parse_action_name, ActionName, UnknownActionError};
