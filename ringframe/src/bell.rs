//! A type-safe representation of a bell.

use std::fmt::{Debug, Display, Formatter};

use bytemuck::{Pod, Zeroable};
#[cfg(feature = "serde")]
use serde_crate::{
    de::{Error, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::Stage;

/// A lookup string of the bell names
// Letters missing from the alphabet sequence
// - E, T stand for 11 and 12
// - I could be confused with 1
// - O could be confused with 0 and Q
// - X is not a valid bell name to avoid confusion with 'x' as place notation
const BELL_NAMES: &str = "1234567890ETABCDFGHJKLMNPQRSUVWYZ";

/// The number of [`Bell`]s which have names, and therefore the largest possible [`Stage`].
pub const MAX_BELLS: usize = BELL_NAMES.len();

/// A type-safe representation of a 'bell', which adds things like conversions to and from
/// commonly-used bell names.  Each `Bell` takes a single byte in memory.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Zeroable, Pod)]
#[repr(transparent)] // Needed to force memory layout
pub struct Bell {
    /// A zero-indexed number representing the `Bell`.  I.e the treble is always
    /// `Bell { index: 0 }`, and the 12th is `Bell { index: 11 }` but would be
    /// [`Display`](std::fmt::Display)ed as `T`.
    ///
    /// `index` is always smaller than [`MAX_BELLS`], so every `Bell` has a name.
    index: u8,
}

impl Bell {
    /// Creates a `Bell` from a [`char`] containing a bell name (e.g. `'4'` or `'T'`).  If the name
    /// is not valid, then this fails and returns [`None`].  Note that lower case [`char`]s are not
    /// considered valid bell names by this function; use [`Bell::parse`] to accept them.
    ///
    /// # Example
    /// ```
    /// # fn test() -> Option<()> {
    /// use ringframe::Bell;
    ///
    /// assert_eq!(Bell::from_name('1')?.name(), '1');
    /// assert_eq!(Bell::from_name('0')?.name(), '0');
    /// assert_eq!(Bell::from_name('T')?.name(), 'T');
    /// assert_eq!(Bell::from_name('t'), None);
    /// assert_eq!(Bell::from_name('X'), None);
    /// assert_eq!(Bell::from_name('\r'), None);
    /// # Some(())
    /// # }
    /// # fn main() { test().unwrap() }
    /// ```
    pub fn from_name(c: char) -> Option<Bell> {
        // All the names are ASCII, so a byte search is enough
        let byte = u8::try_from(c).ok()?;
        memchr::memchr(byte, BELL_NAMES.as_bytes()).map(|idx| Bell { index: idx as u8 })
    }

    /// Parses a `Bell` from its name, accepting lower-case letters as well as upper-case ones.
    /// Anything which isn't a bell name produces [`InvalidBell::UnknownName`].
    ///
    /// # Example
    /// ```
    /// use ringframe::{Bell, InvalidBell};
    ///
    /// assert_eq!(Bell::parse('e')?, Bell::from_number(11).unwrap());
    /// assert_eq!(Bell::parse('8')?.index(), 7);
    /// assert_eq!(Bell::parse('?'), Err(InvalidBell::UnknownName('?')));
    /// assert_eq!(Bell::parse('I'), Err(InvalidBell::UnknownName('I')));
    /// # Ok::<(), InvalidBell>(())
    /// ```
    pub fn parse(c: char) -> Result<Bell, InvalidBell> {
        Self::from_name(c.to_ascii_uppercase()).ok_or(InvalidBell::UnknownName(c))
    }

    /// Creates a `Bell` from a 0-indexed integer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is [`MAX_BELLS`] or larger, since such a `Bell` has no name.
    ///
    /// # Example
    /// ```
    /// use ringframe::Bell;
    ///
    /// assert_eq!(Bell::from_index(0).name(), '1');
    /// assert_eq!(Bell::from_index(11).name(), 'T');
    /// ```
    #[inline]
    #[track_caller]
    pub fn from_index(index: u8) -> Bell {
        match Self::try_from_index(index) {
            Ok(bell) => bell,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a `Bell` from a 0-indexed integer, returning an error if that `Bell` would be
    /// too large to have a name.
    pub fn try_from_index(index: u8) -> Result<Bell, InvalidBell> {
        if (index as usize) < MAX_BELLS {
            Ok(Bell { index })
        } else {
            Err(InvalidBell::IndexOutOfRange(index))
        }
    }

    /// Creates a `Bell` from a 1-indexed integer.  This fails if `number` is `0` or too large.
    ///
    /// # Example
    /// ```
    /// # fn test() -> Option<()> {
    /// use ringframe::Bell;
    ///
    /// assert_eq!(Bell::from_number(12)?.name(), 'T');
    /// assert_eq!(Bell::from_number(0), None);
    /// assert_eq!(Bell::from_number(34), None);
    /// # Some(())
    /// # }
    /// # fn main() { test().unwrap() }
    /// ```
    pub fn from_number(number: u8) -> Option<Bell> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::try_from_index(idx).ok())
    }

    /// Creates the `Bell` representing the tenor or heaviest bell on a given [`Stage`].
    pub fn tenor(stage: Stage) -> Bell {
        // `Stage`s are never empty and never larger than `MAX_BELLS`
        Bell {
            index: stage.num_bells_u8() - 1,
        }
    }

    /// A [`Bell`] representing the 'treble' on any stage.
    pub const TREBLE: Bell = Bell { index: 0 };

    /// The name of this `Bell`, as it would be written in a row.
    #[inline]
    pub fn name(self) -> char {
        BELL_NAMES.as_bytes()[self.index()] as char
    }

    /// Returns the 0-indexed representation of this `Bell`.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the 0-indexed representation of this `Bell`, as a [`u8`].
    #[inline]
    pub fn index_u8(self) -> u8 {
        self.index
    }

    /// Returns the 1-indexed representation of this `Bell`.
    ///
    /// # Example
    /// ```
    /// # fn test() -> Option<()> {
    /// use ringframe::Bell;
    ///
    /// assert_eq!(Bell::from_index(0).number(), 1);
    /// assert_eq!(Bell::from_name('0')?.number(), 10);
    /// # Some(())
    /// # }
    /// # fn main() { test().unwrap() }
    /// ```
    #[inline]
    pub fn number(self) -> u8 {
        self.index + 1
    }
}

impl Debug for Bell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bell({})", self)
    }
}

impl Display for Bell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The ways that creating a [`Bell`] can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidBell {
    /// The [`char`] isn't the name of any [`Bell`]
    UnknownName(char),
    /// The index is too large for the [`Bell`] to have a name
    IndexOutOfRange(u8),
}

impl Display for InvalidBell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidBell::UnknownName(c) => write!(f, "{:?} is not a bell name", c),
            InvalidBell::IndexOutOfRange(idx) => write!(
                f,
                "Bell index {} is too large (only {} bells have names)",
                idx, MAX_BELLS
            ),
        }
    }
}

impl std::error::Error for InvalidBell {}

///////////
// SERDE //
///////////

#[cfg(feature = "serde")]
struct BellVisitor;

#[cfg(feature = "serde")]
impl<'de> Visitor<'de> for BellVisitor {
    type Value = Bell;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a positive integer, or a bell name")
    }

    fn visit_u64<E>(self, val: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        u8::try_from(val)
            .ok()
            .and_then(Bell::from_number)
            .ok_or_else(|| E::custom(format!("invalid Bell number: {}", val)))
    }

    fn visit_i64<E>(self, val: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        u64::try_from(val)
            .map_err(|_| E::custom(format!("invalid Bell number: {}", val)))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_char<E>(self, v: char) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Bell::parse(v).map_err(E::custom)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let mut chars = v.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.visit_char(c),
            _ => Err(E::custom(format!("'{}' is not a bell name", v))),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Bell {
    fn deserialize<D>(deserializer: D) -> Result<Bell, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BellVisitor)
    }
}

// Serialise as the bell's name
#[cfg(feature = "serde")]
impl Serialize for Bell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_char(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Bell, InvalidBell, MAX_BELLS};

    #[test]
    #[should_panic]
    fn from_index_panic() {
        Bell::from_index(MAX_BELLS as u8);
    }

    #[test]
    fn name_round_trip() {
        for idx in 0..MAX_BELLS as u8 {
            let bell = Bell::from_index(idx);
            assert_eq!(Bell::from_name(bell.name()), Some(bell));
            assert_eq!(Bell::parse(bell.name().to_ascii_lowercase()), Ok(bell));
        }
    }

    #[test]
    fn parse_err() {
        #[track_caller]
        fn check(c: char) {
            assert_eq!(Bell::parse(c), Err(InvalidBell::UnknownName(c)));
        }

        check('x');
        check('X');
        check('I');
        check('o');
        check('?');
        check('*');
        check(' ');
        check('🦀');
    }

    #[test]
    fn numbers() {
        assert_eq!(Bell::from_number(1), Some(Bell::TREBLE));
        assert_eq!(Bell::from_number(10).map(Bell::name), Some('0'));
        assert_eq!(Bell::from_number(MAX_BELLS as u8 + 1), None);
        assert_eq!(
            Bell::try_from_index(40),
            Err(InvalidBell::IndexOutOfRange(40))
        );
    }
}
