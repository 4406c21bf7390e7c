use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The lifecycle state of a conformity request.
///
/// The serialized form is the display string used by the persisted files and
/// must round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Waiting for the authorizers to give their conformity.
    #[serde(rename = "En solicitud de conformidades")]
    SubmittedForConformity,
    /// Escalated to the helpdesk with a ticket.
    #[serde(rename = "En Helpdesk")]
    InHelpdesk,
    /// The helpdesk has attended the request.
    #[serde(rename = "Atendido")]
    Attended,
    /// The request is finished.
    #[serde(rename = "Cerrado")]
    Closed,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::SubmittedForConformity,
        Self::InHelpdesk,
        Self::Attended,
        Self::Closed,
    ];

    /// The exact string this status is persisted as.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubmittedForConformity => "En solicitud de conformidades",
            Self::InHelpdesk => "En Helpdesk",
            Self::Attended => "Atendido",
            Self::Closed => "Cerrado",
        }
    }

    /// The statuses a request in this status may move to.
    ///
    /// Staying in the same status is always allowed and is not listed here;
    /// see [`validate_transition`].
    #[must_use]
    pub const fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::SubmittedForConformity => &[Self::InHelpdesk, Self::Attended, Self::Closed],
            Self::InHelpdesk => &[Self::Attended, Self::Closed, Self::SubmittedForConformity],
            Self::Attended => &[Self::Closed, Self::InHelpdesk],
            Self::Closed => &[Self::SubmittedForConformity],
        }
    }

    /// Whether a request in this status may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next().contains(&next)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatusError;

    /// Parses either the persisted display string or a short alias
    /// (`submitted`, `helpdesk`, `attended`, `closed`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(status) = Self::ALL.into_iter().find(|status| status.as_str() == trimmed) {
            return Ok(status);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "submitted" | "en_solicitud" => Ok(Self::SubmittedForConformity),
            "helpdesk" | "en_helpdesk" => Ok(Self::InHelpdesk),
            "attended" | "atendido" => Ok(Self::Attended),
            "closed" | "cerrado" => Ok(Self::Closed),
            _ => Err(UnknownStatusError(trimmed.to_string())),
        }
    }
}

/// Returned when a string does not name a known [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatusError(String);

/// A status change that the transition policy does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot change status from '{from}' to '{to}'")]
pub struct ForbiddenTransition {
    /// The current status.
    pub from: Status,
    /// The proposed status.
    pub to: Status,
}

/// Checks a proposed status change against the transition table.
///
/// A transition to the current status is always accepted, so field edits that
/// leave the status alone pass through.
///
/// # Errors
///
/// Returns [`ForbiddenTransition`] naming both states when `proposed` is not
/// reachable from `current`.
pub fn validate_transition(current: Status, proposed: Status) -> Result<(), ForbiddenTransition> {
    if current.can_transition_to(proposed) {
        Ok(())
    } else {
        Err(ForbiddenTransition {
            from: current,
            to: proposed,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn same_status_is_always_allowed() {
        for status in Status::ALL {
            assert!(validate_transition(status, status).is_ok());
        }
    }

    #[test_case(Status::SubmittedForConformity, Status::InHelpdesk; "submitted to helpdesk")]
    #[test_case(Status::SubmittedForConformity, Status::Attended; "submitted to attended")]
    #[test_case(Status::SubmittedForConformity, Status::Closed; "submitted to closed")]
    #[test_case(Status::InHelpdesk, Status::Attended; "helpdesk to attended")]
    #[test_case(Status::InHelpdesk, Status::Closed; "helpdesk to closed")]
    #[test_case(Status::InHelpdesk, Status::SubmittedForConformity; "helpdesk reverts")]
    #[test_case(Status::Attended, Status::Closed; "attended to closed")]
    #[test_case(Status::Attended, Status::InHelpdesk; "attended reverts")]
    #[test_case(Status::Closed, Status::SubmittedForConformity; "reopen")]
    fn allowed_transitions(from: Status, to: Status) {
        assert!(validate_transition(from, to).is_ok());
    }

    #[test_case(Status::Attended, Status::SubmittedForConformity; "attended cannot go back to submitted")]
    #[test_case(Status::Closed, Status::InHelpdesk; "closed cannot go to helpdesk")]
    #[test_case(Status::Closed, Status::Attended; "closed cannot go to attended")]
    fn forbidden_transitions(from: Status, to: Status) {
        let error = validate_transition(from, to).unwrap_err();
        let message = error.to_string();
        assert!(message.contains(from.as_str()));
        assert!(message.contains(to.as_str()));
    }

    #[test]
    fn display_strings_round_trip_through_serde() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: Status = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn parses_display_strings_and_aliases() {
        assert_eq!("En Helpdesk".parse::<Status>(), Ok(Status::InHelpdesk));
        assert_eq!("closed".parse::<Status>(), Ok(Status::Closed));
        assert_eq!("ATTENDED".parse::<Status>(), Ok(Status::Attended));
        assert!("pending".parse::<Status>().is_err());
    }
}
