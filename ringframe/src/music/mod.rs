//! Scoring [`Row`](crate::Row)s against sets of music patterns.
//!
//! Patterns are strings of bell names, `?` (matches any one bell) and `*` (matches any number of
//! bells, including none).  All the patterns in a [`MusicCollection`] share a single trie, so each
//! row is matched against every pattern in one pass.

use std::fmt::{Display, Formatter};

use crate::Stage;

mod analysis;
mod collection;
mod macros;
mod pattern;
mod trie;

pub use analysis::{AnalysisError, MusicAnalysis, Span};
pub use collection::{MusicCollection, DEFAULT_NODE_LIMIT};
pub use macros::MACRO_NAMES;
pub use pattern::{Elem, MusicPattern};

index_vec::define_index_type! {
    /// The index of a [`MusicPattern`] within a [`MusicCollection`]
    pub struct PatternIdx = usize;
}
pub type PatternVec<T> = index_vec::IndexVec<PatternIdx, T>;

/// The ways that registering music with a [`MusicCollection`] can fail.  A failed registration
/// never changes the [`MusicCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegisterError {
    /// The weight before a `:` isn't an integer which fits in an `i32`
    InvalidWeight(String),
    /// A pattern contained a character which isn't a bell name, `?` or `*`
    InvalidChar { pattern: String, c: char },
    UnknownMacro {
        name: String,
        /// The closest known macro names, best first
        suggestions: Vec<String>,
    },
    /// The macro exists, but has no meaning on this [`Stage`]
    MacroNotApplicable { name: String, stage: Stage },
    /// Adding the pattern would make the trie grow larger than its node limit.  `nodes_needed` is
    /// the number of new nodes allocated before registration gave up.
    PatternAllocationFailure {
        pattern: String,
        nodes_needed: usize,
        limit: usize,
    },
}

impl Display for RegisterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::InvalidWeight(w) => write!(f, "Invalid music weight {:?}", w),
            RegisterError::InvalidChar { pattern, c } => {
                write!(f, "Invalid character {:?} in music pattern {:?}", c, pattern)
            }
            RegisterError::UnknownMacro { name, suggestions } => {
                write!(f, "Unknown music macro <{}>", name)?;
                if !suggestions.is_empty() {
                    let names = suggestions
                        .iter()
                        .map(|s| format!("<{}>", s))
                        .collect::<Vec<_>>();
                    write!(f, "; did you mean {}?", names.join(" or "))?;
                }
                Ok(())
            }
            RegisterError::MacroNotApplicable { name, stage } => {
                write!(f, "Music macro <{}> can't be used on {}", name, stage)
            }
            RegisterError::PatternAllocationFailure {
                pattern,
                nodes_needed,
                limit,
            } => write!(
                f,
                "Music pattern {:?} needs at least {} more trie nodes, which would exceed the limit of {}",
                pattern, nodes_needed, limit
            ),
        }
    }
}

impl std::error::Error for RegisterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = RegisterError::UnknownMacro {
            name: "CRU".to_owned(),
            suggestions: vec!["CRUs".to_owned()],
        };
        assert_eq!(err.to_string(), "Unknown music macro <CRU>; did you mean <CRUs>?");
        let err = RegisterError::MacroNotApplicable {
            name: "5678s".to_owned(),
            stage: Stage::ROYAL,
        };
        assert_eq!(err.to_string(), "Music macro <5678s> can't be used on Royal");
    }
}
