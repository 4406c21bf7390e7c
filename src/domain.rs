//! Domain models for conformity requests.
//!
//! This module contains the request and authorizer types, the status
//! lifecycle and its transition rules, application-code extraction, and
//! configuration. Nothing here performs I/O except [`Config`].

/// Conformity request records.
pub mod request;
pub use request::{AuthorizerAssignment, ConformityRequest};

/// Request lifecycle states and the transition policy.
pub mod status;
pub use status::{ForbiddenTransition, Status, UnknownStatusError, validate_transition};

mod authorizer;
pub use authorizer::{AuthorizerRecord, normalize_code};

pub mod code;
pub use code::extract_codes;

mod config;
pub use config::Config;

/// Helpdesk ticket references.
pub mod ticket;
pub use ticket::{InvalidTicketError, Ticket};

pub mod validate;
pub use validate::{Action, Field, ValidationError};
