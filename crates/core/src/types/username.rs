//! Display name chosen at registration.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty or only whitespace.
    #[error("username cannot be blank")]
    Blank,
    /// The input contains a control character such as NUL.
    #[error("username cannot contain control characters")]
    ContainsControl,
    /// The input is longer than the `username` column allows.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A non-blank username, trimmed of surrounding whitespace, with no control
/// characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `Username`, trimming leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameError::Blank`] for empty input,
    /// [`UsernameError::ContainsControl`] for control characters and
    /// [`UsernameError::TooLong`] past 100 characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Blank);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(UsernameError::ContainsControl);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(Username::parse("  alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(Username::parse("   "), Err(UsernameError::Blank));
    }

    #[test]
    fn test_rejects_control_characters() {
        assert_eq!(Username::parse("bob\0"), Err(UsernameError::ContainsControl));
        assert_eq!(Username::parse("al\u{1b}ice"), Err(UsernameError::ContainsControl));
    }

    #[test]
    fn test_rejects_too_long() {
        assert_eq!(
            Username::parse(&"x".repeat(101)),
            Err(UsernameError::TooLong { max: 100 })
        );
        assert!(Username::parse(&"x".repeat(100)).is_ok());
    }
}
