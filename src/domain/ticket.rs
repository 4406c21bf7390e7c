use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// Shortest accepted helpdesk ticket reference.
pub const MIN_TICKET_LEN: usize = 3;
/// Longest accepted helpdesk ticket reference.
pub const MAX_TICKET_LEN: usize = 50;

/// A validated helpdesk ticket reference.
///
/// Surrounding whitespace is trimmed. The remaining text must be between
/// [`MIN_TICKET_LEN`] and [`MAX_TICKET_LEN`] characters long and contain at
/// least one letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(NonEmptyString);

impl Ticket {
    /// Validates and wraps a ticket reference.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTicketError`] describing the first rule the input
    /// breaks.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidTicketError> {
        let trimmed = s.as_ref().trim();
        let len = trimmed.chars().count();

        let non_empty =
            NonEmptyString::new(trimmed.to_string()).map_err(|_| InvalidTicketError::Empty)?;
        if len < MIN_TICKET_LEN {
            return Err(InvalidTicketError::TooShort);
        }
        if len > MAX_TICKET_LEN {
            return Err(InvalidTicketError::TooLong);
        }
        if !trimmed.chars().any(char::is_alphanumeric) {
            return Err(InvalidTicketError::NoAlphanumeric);
        }

        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Ticket {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for Ticket {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticket {
    type Err = InvalidTicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ticket {
    type Error = InvalidTicketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The reason a helpdesk ticket reference was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTicketError {
    /// Nothing but whitespace.
    #[error("the ticket cannot be empty")]
    Empty,
    /// Fewer than [`MIN_TICKET_LEN`] characters.
    #[error("the ticket must have at least {MIN_TICKET_LEN} characters")]
    TooShort,
    /// More than [`MAX_TICKET_LEN`] characters.
    #[error("the ticket cannot have more than {MAX_TICKET_LEN} characters")]
    TooLong,
    /// Only punctuation or symbols.
    #[error("the ticket must contain at least one letter or digit")]
    NoAlphanumeric,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let ticket = Ticket::new("  HD-12345 ").unwrap();
        assert_eq!(ticket.as_str(), "HD-12345");
    }

    #[test_case("", InvalidTicketError::Empty; "empty")]
    #[test_case("   ", InvalidTicketError::Empty; "blank")]
    #[test_case("AB", InvalidTicketError::TooShort; "two characters")]
    #[test_case("---", InvalidTicketError::NoAlphanumeric; "punctuation only")]
    fn rejects_invalid_tickets(input: &str, expected: InvalidTicketError) {
        assert_eq!(Ticket::new(input), Err(expected));
    }

    #[test]
    fn rejects_overlong_ticket() {
        let input = "T".repeat(MAX_TICKET_LEN + 1);
        assert_eq!(Ticket::new(input), Err(InvalidTicketError::TooLong));
    }

    #[test]
    fn accepts_boundary_lengths() {
        assert!(Ticket::new("123").is_ok());
        assert!(Ticket::new("T".repeat(MAX_TICKET_LEN)).is_ok());
    }
}
