//! Project progress percentage (0-100).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Completion percentage of a group's project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    pub const MAX: u8 = 100;

    /// Creates a Progress, returning error if outside 0..=100.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=i64::from(Self::MAX)).contains(&value) {
            return Err(ValidationError::out_of_range(
                "progress",
                0,
                i64::from(Self::MAX),
                value,
            ));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Progress::try_new(0).unwrap().value(), 0);
        assert_eq!(Progress::try_new(100).unwrap().value(), 100);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Progress::try_new(-1).is_err());
        assert!(Progress::try_new(101).is_err());
    }

    #[test]
    fn displays_with_percent_sign() {
        assert_eq!(Progress::try_new(42).unwrap().to_string(), "42%");
    }
}
