use std::fmt::{Display, Formatter};

use crate::{bell::MAX_BELLS, Bell, InvalidBell, InvalidStageError, Stage};

/// All the possible ways that a sequence of [`Bell`]s could fail to form a valid
/// [`Row`](crate::Row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidRowError {
    /// No [`Bell`]s were given; every row has at least one bell
    NoBells,
    /// More [`Bell`]s were given than can ever form a row
    TooManyBells(usize),
    /// A [`char`] wasn't a valid bell name
    InvalidBell(InvalidBell),
    /// A given [`Bell`] would be duplicated.
    DuplicateBell(Bell),
    /// A given [`Bell`] is not within the range of the [`Stage`]
    BellOutOfStage(Bell, Stage),
    /// A given [`Bell`] is missing (only reported when the [`Stage`] is known up front)
    MissingBell(Bell),
}

impl Display for InvalidRowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidRowError::NoBells => write!(f, "Rows must contain at least one bell"),
            InvalidRowError::TooManyBells(n) => {
                write!(f, "{} bells given, but rows have at most {}", n, MAX_BELLS)
            }
            InvalidRowError::InvalidBell(e) => write!(f, "{}", e),
            InvalidRowError::DuplicateBell(bell) => {
                write!(f, "Bell '{}' would appear twice.", bell)
            }
            InvalidRowError::BellOutOfStage(bell, stage) => {
                write!(f, "Bell '{}' is not within stage {}", bell, stage)
            }
            InvalidRowError::MissingBell(bell) => {
                write!(f, "Bell '{}' is missing", bell)
            }
        }
    }
}

impl std::error::Error for InvalidRowError {}

impl From<InvalidStageError> for InvalidRowError {
    fn from(e: InvalidStageError) -> Self {
        match e {
            InvalidStageError::Zero => InvalidRowError::NoBells,
            InvalidStageError::TooManyBells(n) => InvalidRowError::TooManyBells(n as usize),
        }
    }
}

impl From<InvalidBell> for InvalidRowError {
    fn from(e: InvalidBell) -> Self {
        InvalidRowError::InvalidBell(e)
    }
}

/// A failure to build a [`Row`](crate::Row) from some text, carrying that text so that the
/// error can be reported without any more context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidPermutation {
    pub text: String,
    pub reason: InvalidRowError,
}

impl Display for InvalidPermutation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid row {:?}: {}", self.text, self.reason)
    }
}

impl std::error::Error for InvalidPermutation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}
