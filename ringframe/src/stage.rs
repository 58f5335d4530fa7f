//! The number of bells being rung, with `const`s for the common stages.

use std::{
    convert::TryFrom,
    fmt::{Debug, Display, Formatter},
};

use factorial::Factorial;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde_crate::{
    de::{Error, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{bell::MAX_BELLS, Bell, RowBuf};
// Imports used solely by doc comments
#[allow(unused_imports)]
use crate::Row;

/// The names of the stages from one to sixteen bells
const STAGE_NAMES: [&str; 16] = [
    "One", "Two", "Singles", "Minimus", "Doubles", "Minor", "Triples", "Major", "Caters", "Royal",
    "Cinques", "Maximus", "Sextuples", "Fourteen", "Septuples", "Sixteen",
];

/// How many bells are being rung.  Every `Stage` has between one and
/// [`MAX_BELLS`](crate::MAX_BELLS) [`Bell`]s, so every [`Bell`] in a [`Row`] has a name.
///
/// ```
/// use ringframe::Stage;
///
/// assert_eq!(Stage::SINGLES, Stage::new(3));
/// assert_eq!(Stage::MAJOR, Stage::new(8));
/// assert_eq!(Stage::MAXIMUS.to_string(), "Maximus");
/// assert_eq!(Stage::new(9).to_string(), "Caters");
/// assert_eq!(Stage::new(30).to_string(), "30 bells");
/// assert!(Stage::try_from(0).is_err());
/// assert!(Stage::try_from(34).is_err());
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Stage(u8);

impl Stage {
    pub const ONE: Stage = Stage(1);
    pub const TWO: Stage = Stage(2);
    pub const SINGLES: Stage = Stage(3);
    pub const MINIMUS: Stage = Stage(4);
    pub const DOUBLES: Stage = Stage(5);
    pub const MINOR: Stage = Stage(6);
    pub const TRIPLES: Stage = Stage(7);
    pub const MAJOR: Stage = Stage(8);
    pub const CATERS: Stage = Stage(9);
    pub const ROYAL: Stage = Stage(10);
    pub const CINQUES: Stage = Stage(11);
    pub const MAXIMUS: Stage = Stage(12);
    pub const FOURTEEN: Stage = Stage(14);
    pub const SIXTEEN: Stage = Stage(16);
    /// The largest `Stage` whose [`Bell`]s can all be named
    pub const MAX: Stage = Stage(MAX_BELLS as u8);

    /// Creates a `Stage` of `num_bells` [`Bell`]s.
    ///
    /// # Panics
    ///
    /// Panics if `num_bells` is zero or larger than [`MAX_BELLS`](crate::MAX_BELLS).
    #[track_caller]
    pub fn new(num_bells: u8) -> Stage {
        Self::try_from(num_bells).unwrap_or_else(|e| panic!("{}", e))
    }

    /// The number of [`Bell`]s in this `Stage`.  Never zero.
    #[inline(always)]
    pub fn num_bells(self) -> usize {
        self.0 as usize
    }

    /// [`Self::num_bells`] as a [`u8`]
    #[inline(always)]
    pub fn num_bells_u8(self) -> u8 {
        self.0
    }

    /// The heaviest [`Bell`] in this `Stage`
    pub fn tenor(self) -> Bell {
        Bell::tenor(self)
    }

    /// Every [`Bell`] in this `Stage`, treble first
    pub fn bells(self) -> impl DoubleEndedIterator<Item = Bell> + ExactSizeIterator + Clone {
        (0..self.0).map(Bell::from_index)
    }

    pub fn contains(self, bell: Bell) -> bool {
        bell.index_u8() < self.0
    }

    #[inline(always)]
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }

    /// Finds the `Stage` with a given name (e.g. `"royal"`, `"Triples"` or `"SIXTEEN"`), ignoring
    /// case.
    pub fn from_name(name: &str) -> Option<Stage> {
        let idx = STAGE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name.trim()))?;
        Some(Stage(idx as u8 + 1))
    }

    /// The usual name of this `Stage`, or `None` for stages above sixteen.
    pub fn name(self) -> Option<&'static str> {
        STAGE_NAMES.get(self.num_bells() - 1).copied()
    }

    /// Every [`Row`] on this `Stage`, in lexicographic order.  There are `n!` of these, so this
    /// is only sensible for small `Stage`s.
    pub fn extent(self) -> Vec<RowBuf> {
        let mut extent = Vec::with_capacity(self.num_bells().checked_factorial().unwrap_or(0));
        for bells in self.bells().permutations(self.num_bells()) {
            // SAFETY: each permutation of a stage's bells is a valid row
            extent.push(unsafe { RowBuf::from_vec_unchecked(bells) });
        }
        extent
    }
}

impl Debug for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Stage::{}", name.to_uppercase()),
            None => write!(f, "Stage({})", self.0),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "{} bells", self.0),
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = InvalidStageError;

    fn try_from(num_bells: u8) -> Result<Self, Self::Error> {
        match num_bells {
            0 => Err(InvalidStageError::Zero),
            n if n as usize > MAX_BELLS => Err(InvalidStageError::TooManyBells(n)),
            n => Ok(Stage(n)),
        }
    }
}

/// The ways that creating a [`Stage`] can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidStageError {
    Zero,
    TooManyBells(u8),
}

impl Display for InvalidStageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidStageError::Zero => write!(f, "A stage must have at least one bell"),
            InvalidStageError::TooManyBells(n) => write!(
                f,
                "Stage of {} bells is too big; only {} bells have names",
                n, MAX_BELLS
            ),
        }
    }
}

impl std::error::Error for InvalidStageError {}

//////////////////////////
// `IncompatibleStages` //
//////////////////////////

/// An error created when two things of different [`Stage`]s are combined, e.g. multiplying
/// [`Row`]s or applying a [`Change`](crate::Change) to a [`Row`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IncompatibleStages {
    pub(crate) lhs_stage: Stage,
    pub(crate) rhs_stage: Stage,
}

impl IncompatibleStages {
    /// Returns `Ok(())` if `lhs_stage` and `rhs_stage` are equal
    pub fn check(lhs_stage: Stage, rhs_stage: Stage) -> Result<(), Self> {
        match lhs_stage == rhs_stage {
            true => Ok(()),
            false => Err(IncompatibleStages {
                lhs_stage,
                rhs_stage,
            }),
        }
    }
}

impl Display for IncompatibleStages {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Can't combine {} (left) with {} (right)",
            self.lhs_stage, self.rhs_stage
        )
    }
}

impl std::error::Error for IncompatibleStages {}

///////////
// SERDE //
///////////

// Serialise as a u64
#[cfg(feature = "serde")]
impl Serialize for Stage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0 as u64)
    }
}

// Stage will deserialise from either a name (i.e. a string) or a positive number
#[cfg(feature = "serde")]
struct StageVisitor;

#[cfg(feature = "serde")]
impl<'de> Visitor<'de> for StageVisitor {
    type Value = Stage;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a positive integer, or a stage name")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("negative stage: {}", v)))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let num_bells = u8::try_from(v).map_err(|_| E::custom(format!("stage too big: {}", v)))?;
        Stage::try_from(num_bells).map_err(E::custom)
    }

    /// Attempt to parse a [`Stage`] from a string.  This matches standard [`Stage`] names on up to
    /// 16 bells, and is not case sensitive.
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Stage::from_name(v)
            .ok_or_else(|| E::custom(format!("unknown stage name '{}'", v)))
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Stage, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StageVisitor)
    }
}

//////////////////
// TESTING CODE //
//////////////////

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

#[cfg(test)]
impl Arbitrary for Stage {
    fn arbitrary(gen: &mut Gen) -> Self {
        // Anything from 1 to `MAX_BELLS - 1` bells
        let num_bells = u8::arbitrary(gen) % MAX_BELLS as u8;
        Self::new(num_bells.max(1))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::RowBuf;

    use super::*;

    #[test]
    #[rustfmt::skip]
    fn extent() {
        #[track_caller]
        fn check(stage: Stage, exp_extent: &[&str]) {
            let extent = stage.extent().into_iter().sorted().collect_vec();
            let expected_extent = exp_extent.iter().map(|s| RowBuf::parse(s).unwrap()).sorted().collect_vec();
            assert_eq!(extent, expected_extent);
        }

        check(Stage::ONE, &["1"]);
        check(Stage::TWO, &["12", "21"]);
        check(Stage::SINGLES, &["123", "132", "213", "231", "312", "321"]);
        check(
            Stage::MINIMUS,
            &[
                "1234", "1243", "1324", "1342", "1423", "1432",
                "2134", "2143", "2314", "2341", "2413", "2431",
                "3124", "3142", "3214", "3241", "3412", "3421",
                "4123", "4132", "4213", "4231", "4312", "4321",
            ]
        );
        assert_eq!(Stage::MINOR.extent().len(), 720);
    }

    #[test]
    fn names() {
        assert_eq!(Stage::from_name("major"), Some(Stage::MAJOR));
        assert_eq!(Stage::from_name("SIXTEEN"), Some(Stage::SIXTEEN));
        assert_eq!(Stage::from_name("twenty"), None);
        assert_eq!(format!("{:?}", Stage::ROYAL), "Stage::ROYAL");
        assert_eq!(format!("{:?}", Stage::new(20)), "Stage(20)");
    }

    #[test]
    fn try_from() {
        assert_eq!(Stage::try_from(0), Err(InvalidStageError::Zero));
        assert_eq!(Stage::try_from(33), Ok(Stage::MAX));
        assert_eq!(
            Stage::try_from(34),
            Err(InvalidStageError::TooManyBells(34))
        );
    }
}
