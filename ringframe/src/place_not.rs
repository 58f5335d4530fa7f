//! Module for parsing sequences of place notation into [`Change`]s

use std::{
    collections::VecDeque,
    fmt::{Display, Formatter},
};

use crate::{Bell, Change, Stage};

/// The ways that a single token of place notation can be invalid
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PnError {
    InvalidChar(char),
    PlaceOutOfStage { place: u8, stage: Stage },
    AmbiguousPlacesBetween { p: u8, q: u8 },
    DuplicatePlace(u8),
    OddStageCross(Stage),
    NoPlacesGiven,
}

impl Display for PnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PnError::InvalidChar(c) => write!(f, "{:?} is not a place", c),
            PnError::OddStageCross(stage) => {
                write!(
                    f,
                    "Cross notation isn't valid for odd stages (in this case {})",
                    stage
                )
            }
            PnError::PlaceOutOfStage { place, stage } => {
                write!(
                    f,
                    "Place '{}' is out of stage {}",
                    Bell::from_index(*place),
                    stage
                )
            }
            PnError::AmbiguousPlacesBetween { p, q } => write!(
                f,
                "Ambiguous gap of {} bells between places '{}' and '{}'.",
                q - p - 1,
                Bell::from_index(*p),
                Bell::from_index(*q)
            ),
            PnError::NoPlacesGiven => {
                write!(f, "No places given.  Use 'x' or '-' for a cross.")
            }
            PnError::DuplicatePlace(p) => {
                write!(f, "Place '{}' is duplicated", Bell::from_index(*p))
            }
        }
    }
}

impl std::error::Error for PnError {}

/// A token of place notation which couldn't be turned into a [`Change`], along with the text of
/// that token.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct InvalidPlaceNotation {
    pub text: String,
    pub reason: PnError,
}

impl Display for InvalidPlaceNotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid place notation {:?}: {}", self.text, self.reason)
    }
}

impl std::error::Error for InvalidPlaceNotation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Parses a sequence of place notation into the [`Change`]s it represents, lazily.
///
/// Changes are separated by `.` or by a cross (`x`, `X` or `-`).  A block starting with `&` is
/// symmetric: after the block is emitted, it is emitted again backwards without its last change
/// (so `&-16-16-16` gives the full first half-lead and then its mirror).  Blocks end at `,` (or at
/// any non-`.` character which follows other filler), and characters which aren't part of the
/// notation are skipped.
///
/// If a token in a block is invalid, that block yields a single error in place of all of its
/// changes, and parsing carries on with the next block.
///
/// # Example
/// ```
/// use ringframe::{interpret_pn, Stage};
///
/// let plain_bob_minor = interpret_pn(Stage::MINOR, "&-16-16-16,12")
///     .map(|c| c.map(|c| c.to_string()))
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(
///     plain_bob_minor,
///     ["-", "16", "-", "16", "-", "16", "-", "16", "-", "16", "-", "12"]
/// );
/// # Ok::<(), ringframe::InvalidPlaceNotation>(())
/// ```
pub fn interpret_pn(stage: Stage, text: &str) -> PnIter<'_> {
    PnIter {
        stage,
        text,
        pos: 0,
        pending: VecDeque::new(),
    }
}

/// Parses a sequence of place notation (as [`interpret_pn`]), returning the first error if there
/// is one.
///
/// # Example
/// ```
/// use ringframe::{parse_pn, PnError, Stage};
///
/// assert_eq!(parse_pn(Stage::DOUBLES, "3,&1.5.1.5.1")?.len(), 10);
/// assert_eq!(
///     parse_pn(Stage::TRIPLES, "&x1x1x1,2").unwrap_err().reason,
///     PnError::OddStageCross(Stage::TRIPLES)
/// );
/// # Ok::<(), ringframe::InvalidPlaceNotation>(())
/// ```
pub fn parse_pn(stage: Stage, text: &str) -> Result<Vec<Change>, InvalidPlaceNotation> {
    interpret_pn(stage, text).collect()
}

/// A lazy [`Iterator`] over the [`Change`]s in some place notation, created by [`interpret_pn`].
/// This can only be consumed once; a second pass requires parsing the text again.
#[derive(Debug, Clone)]
pub struct PnIter<'s> {
    stage: Stage,
    text: &'s str,
    /// Byte index of the next unread `char` of `text`
    pos: usize,
    /// Items from the last block that haven't been returned yet
    pending: VecDeque<Result<Change, InvalidPlaceNotation>>,
}

impl<'s> PnIter<'s> {
    fn peek(&self) -> Option<CharMeaning> {
        self.text[self.pos..].chars().next().map(CharMeaning::from)
    }

    fn bump(&mut self) {
        if let Some(c) = self.text[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_while(&mut self, pred: impl Fn(CharMeaning) -> bool) {
        while self.peek().map_or(false, &pred) {
            self.bump();
        }
    }

    /// Reads the next block of place notation into `self.pending`, returning `false` if the text
    /// has run out.
    fn read_block(&mut self) -> bool {
        use CharMeaning as CM;

        self.skip_while(|m| !matches!(m, CM::Bell | CM::Invalid | CM::Cross | CM::Symmetric));
        let is_symmetric = match self.peek() {
            None => return false,
            Some(m) => m == CM::Symmetric,
        };
        if is_symmetric {
            self.bump();
        }
        self.skip_while(|m| m == CM::Dot);

        let mut block = Vec::new();
        let mut error = None;
        while matches!(self.peek(), Some(CM::Bell | CM::Invalid | CM::Cross)) {
            let token_start = self.pos;
            if self.peek() == Some(CM::Cross) {
                self.bump();
            } else {
                self.skip_while(|m| matches!(m, CM::Bell | CM::Invalid));
            }
            match Change::parse(&self.text[token_start..self.pos], self.stage) {
                Ok(change) => block.push(change),
                Err(e) => {
                    error.get_or_insert(e);
                }
            }
            self.skip_while(|m| m == CM::Dot);
            self.skip_while(|m| m == CM::Filler);
        }

        if let Some(e) = error {
            self.pending.push_back(Err(e));
            return true;
        }
        self.pending.extend(block.iter().cloned().map(Ok));
        if is_symmetric {
            block.pop();
            self.pending.extend(block.into_iter().rev().map(Ok));
        }
        true
    }
}

impl Iterator for PnIter<'_> {
    type Item = Result<Change, InvalidPlaceNotation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if !self.read_block() {
                return None;
            }
        }
    }
}

/// How a single [`char`] is treated in place notation
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum CharMeaning {
    /// A [`Bell`] name (in either case)
    Bell,
    Cross,
    /// `&`, which marks a symmetric block
    Symmetric,
    Dot,
    /// `,`, which ends a block
    Comma,
    /// Alphanumeric, but not a bell name.  These are kept as part of a token so that they are
    /// reported as errors
    Invalid,
    /// Anything else
    Filler,
}

impl From<char> for CharMeaning {
    fn from(c: char) -> Self {
        match c {
            'x' | 'X' | '-' => CharMeaning::Cross,
            '&' => CharMeaning::Symmetric,
            '.' => CharMeaning::Dot,
            ',' => CharMeaning::Comma,
            _ if Bell::parse(c).is_ok() => CharMeaning::Bell,
            _ if c.is_ascii_alphanumeric() => CharMeaning::Invalid,
            _ => CharMeaning::Filler,
        }
    }
}
