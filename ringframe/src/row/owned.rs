use std::{
    borrow::{Borrow, BorrowMut},
    fmt::{Debug, Display, Formatter},
    ops::{Deref, DerefMut},
    str::FromStr,
};

use itertools::Itertools;

use crate::{bell::MAX_BELLS, Bell, InvalidRowError, Stage};

use super::{borrowed::Row, BellIter, InvalidPermutation};

/// An owned row.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct RowBuf {
    /// The [`Bell`]s in the order that they would be rung.  Because of the 'valid row' invariant,
    /// this can't contain duplicate [`Bell`]s or any [`Bell`]s with number greater than the
    /// [`Stage`] of this `RowBuf`.
    // This is `pub(super)` so that `super::borrowed::Row` can access it
    pub(super) bell_vec: Vec<Bell>,
}

impl RowBuf {
    /* CONSTRUCTORS */

    /// Parse a string into a `RowBuf`.  Every [`char`] (after trimming surrounding whitespace)
    /// must be a [`Bell`] name, in either case.  Any failure returns an [`InvalidPermutation`]
    /// which contains the text that failed to parse.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Bell, RowBuf, Stage, InvalidRowError};
    ///
    /// assert_eq!(RowBuf::parse("12543")?.to_string(), "12543");
    /// assert_eq!(RowBuf::parse("1234567890et")?.stage(), Stage::MAXIMUS);
    /// // Parsing an invalid `Row` returns an error describing the problem
    /// assert_eq!(
    ///     RowBuf::parse("112345").unwrap_err().reason,
    ///     InvalidRowError::DuplicateBell(Bell::from_number(1).unwrap())
    /// );
    /// assert_eq!(
    ///     RowBuf::parse("12745").unwrap_err().reason,
    ///     InvalidRowError::BellOutOfStage(Bell::from_number(7).unwrap(), Stage::DOUBLES)
    /// );
    /// assert_eq!(RowBuf::parse("12 43").unwrap_err().text, "12 43");
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidPermutation> {
        parse_bells(s)
            .and_then(Self::from_vec)
            .map_err(|reason| InvalidPermutation {
                text: s.to_owned(),
                reason,
            })
    }

    /// Parse a string into a `RowBuf`, extending to the given [`Stage`] with cover bells if
    /// required.  This produces better error messages than [`RowBuf::parse`] because of the
    /// extra information provided by the [`Stage`].
    ///
    /// # Example
    /// ```
    /// use ringframe::{Bell, RowBuf, Stage, InvalidRowError};
    ///
    /// assert_eq!(RowBuf::parse_with_stage("1342", Stage::MAJOR)?.to_string(), "13425678");
    /// assert_eq!(
    ///     RowBuf::parse_with_stage("14", Stage::MINOR).unwrap_err().reason,
    ///     InvalidRowError::MissingBell(Bell::from_name('2').unwrap())
    /// );
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn parse_with_stage(s: &str, stage: Stage) -> Result<Self, InvalidPermutation> {
        parse_bells(s)
            .and_then(|bells| Self::from_vec_with_stage(bells, stage))
            .map_err(|reason| InvalidPermutation {
                text: s.to_owned(),
                reason,
            })
    }

    /// Creates rounds on a given [`Stage`].
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::rounds(Stage::MINIMUS).to_string(), "1234");
    /// assert_eq!(RowBuf::rounds(Stage::CATERS).to_string(), "123456789");
    /// ```
    pub fn rounds(stage: Stage) -> Self {
        // This unsafety is OK, because rounds is always a valid `Row`
        unsafe { Self::from_bell_iter_unchecked(stage.bells()) }
    }

    /// Creates backrounds (i.e. reverse rounds) on a given [`Stage`].
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::backrounds(Stage::MINIMUS).to_string(), "4321");
    /// assert_eq!(RowBuf::backrounds(Stage::CATERS).to_string(), "987654321");
    /// ```
    pub fn backrounds(stage: Stage) -> Self {
        // This unsafety is OK, because backrounds is always a valid `Row`
        unsafe { Self::from_bell_iter_unchecked(stage.bells().rev()) }
    }

    /// Creates Queens on a given [`Stage`].
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::queens(Stage::MINIMUS).to_string(), "1324");
    /// assert_eq!(RowBuf::queens(Stage::CATERS).to_string(), "135792468");
    /// ```
    pub fn queens(stage: Stage) -> Self {
        let odds = stage.bells().step_by(2);
        let evens = stage.bells().skip(1).step_by(2);
        // This unsafety is OK, because Queens is always a valid `Row`
        unsafe { Self::from_bell_iter_unchecked(odds.chain(evens)) }
    }

    /// Creates Kings on a given [`Stage`]: the odd bells descending to the treble, then the even
    /// bells ascending.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::kings(Stage::MAJOR).to_string(), "75312468");
    /// assert_eq!(RowBuf::kings(Stage::TRIPLES).to_string(), "7531246");
    /// ```
    pub fn kings(stage: Stage) -> Self {
        let odds = stage.bells().step_by(2).rev();
        let evens = stage.bells().skip(1).step_by(2);
        // This unsafety is OK, because Kings is always a valid `Row`
        unsafe { Self::from_bell_iter_unchecked(odds.chain(evens)) }
    }

    /// Creates Titums on a given [`Stage`]: the front and back halves interleaved.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::titums(Stage::MAJOR).to_string(), "15263748");
    /// assert_eq!(RowBuf::titums(Stage::TRIPLES).to_string(), "1526374");
    /// ```
    pub fn titums(stage: Stage) -> Self {
        let front_len = (stage.num_bells() + 1) / 2;
        let front = stage.bells().take(front_len);
        let back = stage.bells().skip(front_len);
        let bells = front.interleave(back);
        // This unsafety is OK, because interleaving the two halves of rounds keeps every bell
        unsafe { Self::from_bell_iter_unchecked(bells) }
    }

    /// Creates the plain lead head of Plain Bob on a given [`Stage`], where the first `hunts`
    /// bells are hunt bells and so stay fixed.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::pblh(Stage::MAJOR, 1).to_string(), "13527486");
    /// assert_eq!(RowBuf::pblh(Stage::MINOR, 1).to_string(), "135264");
    /// assert_eq!(RowBuf::pblh(Stage::DOUBLES, 1).to_string(), "13524");
    /// assert_eq!(RowBuf::pblh(Stage::MINIMUS, 1).to_string(), "1342");
    /// // Too few working bells to have a lead head
    /// assert_eq!(RowBuf::pblh(Stage::TWO, 1).to_string(), "12");
    /// ```
    pub fn pblh(stage: Stage, hunts: usize) -> Self {
        let num_bells = stage.num_bells();
        let num_working = num_bells.saturating_sub(hunts);
        if num_working < 2 {
            return Self::rounds(stage);
        }
        let working_bell = |w: usize| -> usize {
            match w {
                0 => 1,
                _ if w % 2 == 0 => w - 2,
                _ if w + 3 <= num_working => w + 2,
                _ if w + 2 <= num_working => w + 1,
                _ => w - 1,
            }
        };
        let bells = (0..num_bells).map(|i| {
            if i < hunts {
                Bell::from_index(i as u8)
            } else {
                Bell::from_index((hunts + working_bell(i - hunts)) as u8)
            }
        });
        // This unsafety is OK, because the working bells are a permutation of themselves
        unsafe { Self::from_bell_iter_unchecked(bells) }
    }

    /* UTILITY CONSTRUCTORS */

    /// Creates a `RowBuf` from a [`Vec`] of [`Bell`]s, checking that the resulting `RowBuf` is
    /// valid.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Bell, InvalidRowError, RowBuf};
    ///
    /// let bells = |s: &str| s.chars().map(|c| Bell::from_name(c).unwrap()).collect::<Vec<_>>();
    /// assert_eq!(RowBuf::from_vec(bells("4213"))?.to_string(), "4213");
    /// assert_eq!(
    ///     RowBuf::from_vec(bells("4214")),
    ///     Err(InvalidRowError::DuplicateBell(Bell::from_name('4').unwrap()))
    /// );
    /// assert_eq!(RowBuf::from_vec(vec![]), Err(InvalidRowError::NoBells));
    /// # Ok::<(), InvalidRowError>(())
    /// ```
    pub fn from_vec(bells: Vec<Bell>) -> Result<RowBuf, InvalidRowError> {
        if bells.len() > MAX_BELLS {
            return Err(InvalidRowError::TooManyBells(bells.len()));
        }
        let stage = Stage::try_from(bells.len() as u8)?;
        crate::utils::check_duplicate_or_out_of_stage(bells.iter().copied(), stage)?;
        Ok(Self { bell_vec: bells })
    }

    /// Creates a `RowBuf` from a [`Vec`] of [`Bell`]s, **without** checking that the resulting
    /// `RowBuf` is valid.  This is the unsafe version of [`RowBuf::from_vec`].
    ///
    /// # Safety
    ///
    /// This function is safe if `bells` corresponds to a valid `Row`.  This means that each
    /// [`Bell`] is unique, and has [`index`](Bell::index) smaller than the `bells.len()`.
    #[inline]
    pub unsafe fn from_vec_unchecked(bells: Vec<Bell>) -> RowBuf {
        RowBuf { bell_vec: bells }
    }

    /// Utility function that creates a `RowBuf` from an [`Iterator`] of [`Bell`]s, checking that
    /// the resulting `RowBuf` is valid.
    pub fn from_bell_iter(iter: impl Iterator<Item = Bell>) -> Result<Self, InvalidRowError> {
        Self::from_vec(iter.collect_vec())
    }

    /// Creates a `RowBuf` from an [`Iterator`] of [`Bell`]s, **without** checking that the
    /// resulting `RowBuf` is valid.  This is the unsafe version of [`RowBuf::from_bell_iter`].
    ///
    /// # Safety
    ///
    /// This function is safe if `iter` yields a valid `Row`.  This means that each [`Bell`] is
    /// unique, and has [`index`](Bell::index) smaller than the number of items yielded by `iter`.
    pub unsafe fn from_bell_iter_unchecked(iter: impl Iterator<Item = Bell>) -> Self {
        Self::from_vec_unchecked(iter.collect())
    }

    /// Checks the validity of a potential `RowBuf`, extending it to the given [`Stage`] with
    /// cover bells if valid and returning an [`InvalidRowError`] otherwise.
    pub fn from_vec_with_stage(
        mut bells: Vec<Bell>,
        stage: Stage,
    ) -> Result<Self, InvalidRowError> {
        // Check off each bell as we see it
        let mut checklist = vec![false; stage.num_bells()];
        let mut biggest_bell_found = Bell::TREBLE;
        for &b in &bells {
            match checklist.get_mut(b.index()) {
                None => return Err(InvalidRowError::BellOutOfStage(b, stage)),
                Some(&mut true) => return Err(InvalidRowError::DuplicateBell(b)),
                Some(x) => *x = true,
            }
            biggest_bell_found = b.max(biggest_bell_found);
        }
        // Any gap below the biggest bell is a missing bell.  `biggest_bell_found` itself can't be
        // missing, so it isn't checked
        if let Some(index) = checklist[..biggest_bell_found.index()]
            .iter()
            .position(|seen| !*seen)
        {
            return Err(InvalidRowError::MissingBell(Bell::from_index(index as u8)));
        }
        // `bells` is now a valid row on some stage <= `stage` (or empty), so cover bells finish
        // it off
        bells.extend(stage.bells().skip(bells.len()));
        Ok(Self { bell_vec: bells })
    }

    /// Consumes this `RowBuf` and returns the underlying [`Vec`] of [`Bell`]s
    #[inline]
    pub fn into_bell_vec(self) -> Vec<Bell> {
        self.bell_vec
    }

    /// Converts a [`RowBuf`] into a [`Row`].  Equivalent to `&*self`, but doesn't rely on type
    /// inference.
    #[inline]
    pub fn as_row(&self) -> &Row {
        // This unsafety is OK, because `RowBuf` requires its bells to form a valid row
        unsafe { Row::from_slice_unchecked(&self.bell_vec) }
    }

    /// Converts a [`RowBuf`] into a mutable [`Row`].
    #[inline]
    pub fn as_mut_row(&mut self) -> &mut Row {
        // This unsafety is OK, because `RowBuf` requires its bells to form a valid row
        unsafe { Row::from_mut_slice_unchecked(&mut self.bell_vec) }
    }

    /* MUTATING OPERATIONS */

    /// Extend this `RowBuf` in-place with cover bells until that it has a given [`Stage`].
    #[track_caller]
    pub fn extend_to_stage(&mut self, stage: Stage) {
        assert!(self.stage() <= stage);
        self.bell_vec
            .extend(stage.bells().skip(self.bell_vec.len()));
    }
}

/// Converts every [`char`] of `s` (ignoring surrounding whitespace) into a [`Bell`]
fn parse_bells(s: &str) -> Result<Vec<Bell>, InvalidRowError> {
    s.trim()
        .chars()
        .map(|c| Bell::parse(c).map_err(InvalidRowError::from))
        .collect()
}

/* CONVERSIONS BETWEEN `Row` AND `RowBuf` */

impl Deref for RowBuf {
    type Target = Row;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_row()
    }
}

impl DerefMut for RowBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_row()
    }
}

impl Borrow<Row> for RowBuf {
    #[inline]
    fn borrow(&self) -> &Row {
        self.deref()
    }
}

impl BorrowMut<Row> for RowBuf {
    #[inline]
    fn borrow_mut(&mut self) -> &mut Row {
        self.deref_mut()
    }
}

impl AsRef<Row> for RowBuf {
    #[inline]
    fn as_ref(&self) -> &Row {
        self.as_row()
    }
}

impl ToOwned for Row {
    type Owned = RowBuf;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // We can skip the validity checks here because `Row` is valid by invariant
        unsafe { RowBuf::from_bell_iter_unchecked(self.bell_iter()) }
    }
}

/* FORMATTING */

impl Debug for RowBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RowBuf({})", self)
    }
}

impl Display for RowBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.as_row(), f)
    }
}

/* OTHER TRAITS */

impl<'row> IntoIterator for &'row RowBuf {
    type Item = Bell;
    type IntoIter = BellIter<'row>;

    fn into_iter(self) -> Self::IntoIter {
        self.bell_iter()
    }
}

impl FromStr for RowBuf {
    type Err = InvalidPermutation;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq<Row> for RowBuf {
    fn eq(&self, other: &Row) -> bool {
        self.as_row() == other
    }
}

impl PartialEq<RowBuf> for Row {
    fn eq(&self, other: &RowBuf) -> bool {
        self == other.as_row()
    }
}

//////////////////
// TESTING CODE //
//////////////////

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

#[cfg(test)]
impl Arbitrary for RowBuf {
    fn arbitrary(gen: &mut Gen) -> Self {
        let stage = Stage::arbitrary(gen);
        let mut bells = stage.bells().collect_vec();
        // Fisher-Yates shuffle
        for i in (1..bells.len()).rev() {
            let j = usize::arbitrary(gen) % (i + 1);
            bells.swap(i, j);
        }
        // Shuffling rounds always gives a valid row
        unsafe { Self::from_vec_unchecked(bells) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn parse_ok() {
        #[track_caller]
        fn check(inp_str: &str, exp: &str) {
            let row = RowBuf::parse(inp_str).unwrap();
            assert_eq!(row.to_string(), exp);
        }

        check("1", "1");
        check("21", "21");
        check("164589237", "164589237");
        check("  4321 ", "4321");
        check("1234567890et", "1234567890ET");
    }

    #[test]
    fn parse_err() {
        #[track_caller]
        fn check(inp_str: &str, exp_err: InvalidRowError) {
            let err = RowBuf::parse(inp_str).unwrap_err();
            assert_eq!(err.text, inp_str);
            assert_eq!(err.reason, exp_err);
        }

        let bell = |c: char| Bell::from_name(c).unwrap();
        check("", InvalidRowError::NoBells);
        check("11", InvalidRowError::DuplicateBell(bell('1')));
        check("124523", InvalidRowError::DuplicateBell(bell('2')));
        check("124", InvalidRowError::BellOutOfStage(bell('4'), Stage::SINGLES));
        check("21A65", InvalidRowError::BellOutOfStage(bell('A'), Stage::DOUBLES));
        check(
            "12|34",
            InvalidRowError::InvalidBell(crate::InvalidBell::UnknownName('|')),
        );
        check(
            "12x4",
            InvalidRowError::InvalidBell(crate::InvalidBell::UnknownName('x')),
        );
    }

    #[test]
    fn parse_with_stage_ok() {
        #[track_caller]
        fn check(inp_str: &str, stage: Stage, exp_row: &str) {
            assert_eq!(
                RowBuf::parse_with_stage(inp_str, stage).unwrap(),
                RowBuf::parse(exp_row).unwrap()
            );
        }

        check("321", Stage::SINGLES, "321");
        check("321", Stage::MINOR, "321456");
        check("1342", Stage::MAJOR, "13425678");
        check("123564", Stage::ROYAL, "1235647890");
        check("", Stage::MINIMUS, "1234");
    }

    #[test]
    fn parse_with_stage_err() {
        #[track_caller]
        fn check(inp_str: &str, stage: Stage, exp_err: InvalidRowError) {
            assert_eq!(
                RowBuf::parse_with_stage(inp_str, stage).unwrap_err().reason,
                exp_err
            );
        }

        let bell = |c: char| Bell::from_name(c).unwrap();
        check("322", Stage::SINGLES, InvalidRowError::DuplicateBell(bell('2')));
        check("512435", Stage::MINOR, InvalidRowError::DuplicateBell(bell('5')));
        check("3218", Stage::MINOR, InvalidRowError::BellOutOfStage(bell('8'), Stage::MINOR));
        check("13", Stage::SINGLES, InvalidRowError::MissingBell(bell('2')));
        check("14567892", Stage::CATERS, InvalidRowError::MissingBell(bell('3')));
    }

    #[test]
    fn named_rows() {
        #[track_caller]
        fn check(row: RowBuf, exp: &str) {
            assert_eq!(row.to_string(), exp);
        }

        check(RowBuf::queens(Stage::MAJOR), "13572468");
        check(RowBuf::kings(Stage::MINOR), "531246");
        check(RowBuf::kings(Stage::ONE), "1");
        check(RowBuf::titums(Stage::MINOR), "142536");
        check(RowBuf::titums(Stage::TWO), "12");
        check(RowBuf::backrounds(Stage::ROYAL), "0987654321");
        check(RowBuf::pblh(Stage::ROYAL, 1), "1352749608");
        check(RowBuf::pblh(Stage::MAJOR, 2), "12463857");
        check(RowBuf::pblh(Stage::MAJOR, 7), "12345678");
    }

    #[test]
    fn too_many_bells() {
        let bells = (0..34).map(|i| Bell::from_index(i % 33)).collect_vec();
        assert_eq!(
            RowBuf::from_vec(bells),
            Err(InvalidRowError::TooManyBells(34))
        );
    }

    #[quickcheck]
    fn parse_doesnt_panic(v: String) -> bool {
        let _ = v.parse::<RowBuf>();
        true // the only way for this test to fail is if `RowBuf::parse` panics
    }

    #[quickcheck]
    fn parse_with_stage_doesnt_panic(s: String, stage: Stage) -> bool {
        let _ = RowBuf::parse_with_stage(&s, stage);
        true
    }

    #[quickcheck]
    fn display_parse_round_trip(row: RowBuf) -> bool {
        RowBuf::parse(&row.to_string()).as_ref() == Ok(&row)
    }
}
