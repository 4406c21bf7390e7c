use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::Status;

/// The authorizer assigned to approve one application code of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerAssignment {
    /// The four-letter application code.
    #[serde(rename = "codigo")]
    pub code: String,
    /// The authorizer's full name.
    #[serde(rename = "autorizador")]
    pub name: String,
    /// Where the notification for this authorizer is sent.
    #[serde(rename = "correo")]
    pub email: String,
}

impl AuthorizerAssignment {
    /// Creates an assignment, upper-casing the code.
    #[must_use]
    pub fn new(code: &str, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A tracked approval workflow for a set of network groups.
///
/// The identifier, creation time, groups and authorizers are fixed at
/// creation. Only the status, ticket, closing time and notes change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformityRequest {
    #[serde(rename = "id_solicitud")]
    pub(crate) id: String,
    #[serde(rename = "fecha_creacion")]
    pub(crate) created_at: NaiveDateTime,
    #[serde(rename = "grupos_red")]
    pub(crate) network_groups: Vec<String>,
    #[serde(rename = "autorizadores")]
    pub(crate) authorizers: Vec<AuthorizerAssignment>,
    #[serde(rename = "estado")]
    pub(crate) status: Status,
    #[serde(rename = "ticket_helpdesk", default)]
    pub(crate) helpdesk_ticket: Option<String>,
    #[serde(rename = "fecha_cierre", default)]
    pub(crate) closed_at: Option<NaiveDateTime>,
    #[serde(rename = "observaciones", default)]
    pub(crate) notes: Option<String>,
}

impl ConformityRequest {
    pub(crate) const fn new(
        id: String,
        created_at: NaiveDateTime,
        network_groups: Vec<String>,
        authorizers: Vec<AuthorizerAssignment>,
    ) -> Self {
        Self {
            id,
            created_at,
            network_groups,
            authorizers,
            status: Status::SubmittedForConformity,
            helpdesk_ticket: None,
            closed_at: None,
            notes: None,
        }
    }

    /// The request identifier, `SOL_<YYYYMMDD_HHMMSS>_<NNN>`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the request was created (local time).
    #[must_use]
    pub const fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// The network groups requested, in the order given.
    #[must_use]
    pub fn network_groups(&self) -> &[String] {
        &self.network_groups
    }

    /// The authorizers assigned, in the order given.
    #[must_use]
    pub fn authorizers(&self) -> &[AuthorizerAssignment] {
        &self.authorizers
    }

    /// The current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// The helpdesk ticket, once one has been recorded.
    #[must_use]
    pub fn helpdesk_ticket(&self) -> Option<&str> {
        self.helpdesk_ticket.as_deref()
    }

    /// When the request was closed. Cleared on reopening.
    #[must_use]
    pub const fn closed_at(&self) -> Option<NaiveDateTime> {
        self.closed_at
    }

    /// Free-text notes. Each update replaces the previous text.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub(crate) fn send_to_helpdesk(&mut self, ticket: String, notes: Option<String>) {
        self.status = Status::InHelpdesk;
        self.helpdesk_ticket = Some(ticket);
        self.notes = notes;
    }

    pub(crate) fn mark_attended(&mut self, notes: Option<String>) {
        self.status = Status::Attended;
        self.notes = notes;
    }

    pub(crate) fn close(&mut self, ticket: String, notes: Option<String>) {
        self.status = Status::Closed;
        self.helpdesk_ticket = Some(ticket);
        self.closed_at = Some(Local::now().naive_local());
        self.notes = notes;
    }

    pub(crate) fn reopen(&mut self, reason: &str) {
        self.status = Status::SubmittedForConformity;
        self.closed_at = None;
        self.notes = Some(format!("Reabierta: {reason}"));
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        if status != Status::Closed {
            self.closed_at = None;
        }
        self.status = status;
    }

    pub(crate) fn set_ticket(&mut self, ticket: Option<String>) {
        self.helpdesk_ticket = ticket;
    }

    pub(crate) fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    pub(crate) fn submit_for_conformity(&mut self, notes: Option<String>) {
        self.status = Status::SubmittedForConformity;
        self.closed_at = None;
        if notes.is_some() {
            self.notes = notes;
        }
    }
}
