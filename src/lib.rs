//! Tracking of network-group conformity requests
//!
//! A conformity request asks the owners of one or more applications to
//! approve access for a set of network groups. Each request moves through a
//! small lifecycle, from submission through a helpdesk ticket to closure.
//!
//! Requests live in a JSON file managed by a [`RequestStore`]. Authorizers are
//! looked up by four-letter application code in an [`AuthorizerDirectory`],
//! and the codes themselves are pulled out of group names by
//! [`extract_codes`].

pub mod domain;
pub use domain::{
    Action, AuthorizerAssignment, AuthorizerRecord, Config, ConformityRequest, Field,
    ForbiddenTransition, InvalidTicketError, Status, Ticket, UnknownStatusError,
    ValidationError, extract_codes,
};

/// Filesystem storage for requests and authorizers.
pub mod storage;
pub use storage::{
    AuthorizerDirectory, LoadError, RequestStore, SaveError, Stats, StoreInfo, TransitionError,
    Workspace,
};
