//! Business rules checked before a request is edited.
//!
//! Nothing here touches the store. Callers validate first, then call the
//! matching [`RequestStore`](crate::RequestStore) operation.

use std::fmt;

use crate::domain::{
    ConformityRequest, InvalidTicketError, Status, Ticket, UnknownStatusError,
    status::{ForbiddenTransition, validate_transition},
};

/// Longest accepted notes text, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// An operation a user can trigger on a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Escalate to the helpdesk with a ticket.
    SendToHelpdesk,
    /// Record that the helpdesk attended the request.
    MarkAttended,
    /// Close the request.
    Close,
    /// Reopen a closed request.
    Reopen,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SendToHelpdesk => "send to helpdesk",
            Self::MarkAttended => "mark attended",
            Self::Close => "close",
            Self::Reopen => "reopen",
        })
    }
}

/// A field that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The lifecycle status.
    Status,
    /// The helpdesk ticket.
    Ticket,
    /// The free-text notes.
    Notes,
}

/// Why an edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The status change is not in the transition table.
    #[error(transparent)]
    Transition(#[from] ForbiddenTransition),
    /// The ticket reference is malformed.
    #[error(transparent)]
    Ticket(#[from] InvalidTicketError),
    /// The status text names no known status.
    #[error(transparent)]
    Status(#[from] UnknownStatusError),
    /// Notes longer than [`MAX_NOTES_LEN`] characters.
    #[error("notes cannot exceed {MAX_NOTES_LEN} characters")]
    NotesTooLong,
    /// Notes with a control character other than newline, carriage return
    /// or tab.
    #[error("notes contain control characters")]
    NotesControlCharacters,
    /// Only reopening is possible once a request is closed.
    #[error("cannot {action}: the request is already closed")]
    AlreadyClosed {
        /// The action that was attempted.
        action: Action,
    },
    /// Reopening a request that is not closed.
    #[error("only closed requests can be reopened")]
    NotClosed,
    /// Closing a request that has no ticket recorded.
    #[error("a helpdesk ticket is required to close the request")]
    TicketRequired,
}

/// Checks free-text notes. Empty notes are fine.
///
/// # Errors
///
/// Fails if the text is longer than [`MAX_NOTES_LEN`] characters or contains
/// a control character other than newline, carriage return or tab.
pub fn validate_notes(notes: &str) -> Result<(), ValidationError> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::NotesTooLong);
    }
    if notes
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(ValidationError::NotesControlCharacters);
    }
    Ok(())
}

/// Checks that `action` makes sense for the request's current status.
///
/// # Errors
///
/// Closed requests can only be reopened, and only closed requests can be
/// reopened.
pub fn validate_action(request: &ConformityRequest, action: Action) -> Result<(), ValidationError> {
    let closed = request.status() == Status::Closed;
    match action {
        Action::Reopen if !closed => Err(ValidationError::NotClosed),
        Action::Reopen => Ok(()),
        _ if closed => Err(ValidationError::AlreadyClosed { action }),
        _ => Ok(()),
    }
}

/// Checks a raw value typed into an editable field.
///
/// # Errors
///
/// Status values must parse and be reachable from the current status;
/// tickets and notes follow [`Ticket::new`] and [`validate_notes`].
pub fn validate_inline_edit(
    request: &ConformityRequest,
    field: Field,
    value: &str,
) -> Result<(), ValidationError> {
    match field {
        Field::Status => {
            let proposed: Status = value.parse()?;
            validate_transition(request.status(), proposed)?;
        }
        Field::Ticket => {
            Ticket::new(value)?;
        }
        Field::Notes => validate_notes(value)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;

    fn request_in(status: Status) -> ConformityRequest {
        let mut request = ConformityRequest::new(
            "SOL_20250101_100000_001".to_string(),
            Local::now().naive_local(),
            vec!["G".to_string()],
            Vec::new(),
        );
        request.status = status;
        request
    }

    #[test]
    fn notes_allow_whitespace_controls() {
        assert!(validate_notes("").is_ok());
        assert!(validate_notes("line one\nline two\r\n\tindented").is_ok());
    }

    #[test]
    fn notes_reject_other_controls_and_length() {
        assert_eq!(
            validate_notes("bell\u{7}"),
            Err(ValidationError::NotesControlCharacters)
        );
        assert_eq!(
            validate_notes(&"x".repeat(MAX_NOTES_LEN + 1)),
            Err(ValidationError::NotesTooLong)
        );
        assert!(validate_notes(&"x".repeat(MAX_NOTES_LEN)).is_ok());
    }

    #[test]
    fn closed_requests_only_reopen() {
        let closed = request_in(Status::Closed);
        assert!(validate_action(&closed, Action::Reopen).is_ok());
        for action in [Action::SendToHelpdesk, Action::MarkAttended, Action::Close] {
            assert_eq!(
                validate_action(&closed, action),
                Err(ValidationError::AlreadyClosed { action })
            );
        }
    }

    #[test]
    fn open_requests_cannot_reopen() {
        let open = request_in(Status::InHelpdesk);
        assert_eq!(
            validate_action(&open, Action::Reopen),
            Err(ValidationError::NotClosed)
        );
        assert!(validate_action(&open, Action::Close).is_ok());
    }

    #[test]
    fn inline_status_edit_follows_policy() {
        let attended = request_in(Status::Attended);
        assert!(validate_inline_edit(&attended, Field::Status, "Cerrado").is_ok());
        assert!(validate_inline_edit(&attended, Field::Status, "Atendido").is_ok());
        assert!(matches!(
            validate_inline_edit(&attended, Field::Status, "En solicitud de conformidades"),
            Err(ValidationError::Transition(_))
        ));
        assert!(matches!(
            validate_inline_edit(&attended, Field::Status, "Archivado"),
            Err(ValidationError::Status(_))
        ));
    }

    #[test]
    fn inline_ticket_edit_is_validated() {
        let request = request_in(Status::SubmittedForConformity);
        assert!(validate_inline_edit(&request, Field::Ticket, "HD-77").is_ok());
        assert_eq!(
            validate_inline_edit(&request, Field::Ticket, "x"),
            Err(ValidationError::Ticket(InvalidTicketError::TooShort))
        );
    }
}
