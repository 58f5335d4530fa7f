//! A single change: one step of adjacent swaps between two [`Row`]s.

use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Mul, MulAssign},
};

use itertools::Itertools;

use crate::{
    place_not::{CharMeaning, InvalidPlaceNotation, PnError},
    Bell, IncompatibleStages, Parity, Row, RowBuf, Stage,
};

/// One change on a given [`Stage`], stored as the adjacent pairs of places whose bells swap.  All
/// other places are 'made', i.e. their bells stay where they are.
///
/// `Change`s are ordered first by [`Stage`], then by their swaps.
///
/// # Example
/// ```
/// use ringframe::{Change, RowBuf, Stage};
///
/// let change = Change::parse("14", Stage::MAJOR)?;
/// assert_eq!(change.swaps(), &[1, 4, 6]);
/// assert_eq!(change.to_string(), "14");
/// assert_eq!(&*RowBuf::rounds(Stage::MAJOR) * &change, RowBuf::parse("13246587").unwrap());
///
/// // Implicit places are expanded
/// assert_eq!(Change::parse("3", Stage::MAJOR)?.to_string(), "38");
/// # Ok::<(), ringframe::InvalidPlaceNotation>(())
/// ```
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Change {
    stage: Stage,
    /// The lower places of each swapped pair, in ascending order.  No two pairs overlap, so
    /// consecutive entries differ by at least 2.
    swaps: Vec<u8>,
}

impl Change {
    /// Creates a `Change` from the lower places of each pair of swapping bells, checking that the
    /// pairs all fit within the [`Stage`] and don't overlap.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, InvalidChangeError, Stage};
    ///
    /// assert_eq!(Change::new(Stage::MINOR, [4, 0])?.to_string(), "34");
    /// assert_eq!(Change::new(Stage::MINOR, [5]), Err(InvalidChangeError::SwapOutOfStage(5)));
    /// assert_eq!(Change::new(Stage::MINOR, [1, 2]), Err(InvalidChangeError::OverlappingSwaps(2)));
    /// # Ok::<(), InvalidChangeError>(())
    /// ```
    pub fn new(
        stage: Stage,
        swaps: impl IntoIterator<Item = u8>,
    ) -> Result<Self, InvalidChangeError> {
        let mut swaps = swaps.into_iter().collect_vec();
        swaps.sort_unstable();
        for &p in &swaps {
            if p as usize + 1 >= stage.num_bells() {
                return Err(InvalidChangeError::SwapOutOfStage(p));
            }
        }
        for (p, q) in swaps.iter().copied().tuple_windows() {
            if q < p + 2 {
                return Err(InvalidChangeError::OverlappingSwaps(q));
            }
        }
        Ok(Self { stage, swaps })
    }

    /// The `Change` which makes every place.
    pub fn identity(stage: Stage) -> Self {
        Self {
            stage,
            swaps: Vec::new(),
        }
    }

    /// The 'cross' `Change`, where every bell swaps.  Returns `None` on odd [`Stage`]s.
    pub fn cross(stage: Stage) -> Option<Self> {
        stage.is_even().then(|| Self {
            stage,
            swaps: (0..stage.num_bells_u8()).step_by(2).collect(),
        })
    }

    /// Parses a single `Change` from place notation, such as `"14"`, `"3"` or `"x"`.  Implicit
    /// places (in lead, in lie, or a single place between two written places) are expanded, but
    /// any ambiguity is an error.  Bell names are accepted in either case.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, Stage};
    ///
    /// assert_eq!(Change::parse("x", Stage::MINOR)?, Change::cross(Stage::MINOR).unwrap());
    /// assert_eq!(Change::parse("467", Stage::MAXIMUS)?.to_string(), "14567T");
    /// assert_eq!(Change::parse("1t", Stage::MAXIMUS)?.to_string(), "1T");
    /// assert_eq!(
    ///     Change::parse("15", Stage::MAJOR).unwrap_err().to_string(),
    ///     "Invalid place notation \"15\": Ambiguous gap of 3 bells between places '1' and '5'."
    /// );
    /// # Ok::<(), ringframe::InvalidPlaceNotation>(())
    /// ```
    pub fn parse(s: &str, stage: Stage) -> Result<Self, InvalidPlaceNotation> {
        Self::parse_places(s.trim(), stage).map_err(|reason| InvalidPlaceNotation {
            text: s.to_owned(),
            reason,
        })
    }

    fn parse_places(s: &str, stage: Stage) -> Result<Self, PnError> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if CharMeaning::from(c) == CharMeaning::Cross {
                return Self::cross(stage).ok_or(PnError::OddStageCross(stage));
            }
        }
        let mut places = s
            .chars()
            .map(|c| match Bell::parse(c) {
                Ok(b) => Ok(b.index_u8()),
                Err(_) => Err(PnError::InvalidChar(c)),
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Self::from_places(&mut places, stage)
    }

    /// Creates a `Change` from the places made, expanding implicit places and returning an error
    /// if the places are ambiguous or don't fit in the [`Stage`].
    pub fn from_places(input_places: &mut [u8], stage: Stage) -> Result<Self, PnError> {
        input_places.sort_unstable();
        let (lowest_place, highest_place) = match (input_places.first(), input_places.last()) {
            (Some(&l), Some(&h)) => (l, h),
            _ => return Err(PnError::NoPlacesGiven),
        };
        if highest_place >= stage.num_bells_u8() {
            return Err(PnError::PlaceOutOfStage {
                place: highest_place,
                stage,
            });
        }

        let mut places = Vec::with_capacity(input_places.len() + 5);
        // Implicit place in lead
        if lowest_place % 2 == 1 {
            places.push(0);
        }
        for (p, q) in input_places.iter().copied().tuple_windows() {
            places.push(p);
            let num_intermediate_places = (q - p)
                .checked_sub(1)
                .ok_or(PnError::DuplicatePlace(p))?;
            if num_intermediate_places == 1 {
                places.push(p + 1);
            } else if num_intermediate_places % 2 == 1 {
                return Err(PnError::AmbiguousPlacesBetween { p, q });
            }
        }
        places.push(highest_place);
        // Implicit place in lie
        if (stage.num_bells_u8() - highest_place) % 2 == 0 {
            places.push(stage.num_bells_u8() - 1);
        }

        // Every gap between made places now has even length, so it's filled by swapping pairs
        let mut swaps = Vec::new();
        let mut places = places.into_iter().peekable();
        let mut i = 0;
        while i < stage.num_bells_u8() {
            if places.peek() == Some(&i) {
                places.next();
                i += 1;
            } else {
                swaps.push(i);
                i += 2;
            }
        }
        Ok(Self { stage, swaps })
    }

    /// Returns the `Change` that goes between two [`Row`]s, or `None` if the [`Row`]s aren't
    /// related by a single change.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, RowBuf};
    ///
    /// let r1 = RowBuf::parse("12345678").unwrap();
    /// let r2 = RowBuf::parse("21346587").unwrap();
    /// assert_eq!(Change::between(&r1, &r2).unwrap().to_string(), "34");
    /// assert_eq!(Change::between(&r1, &RowBuf::parse("31245678").unwrap()), None);
    /// ```
    pub fn between(r1: &Row, r2: &Row) -> Option<Change> {
        if r1.stage() != r2.stage() {
            return None;
        }
        let mut swaps = Vec::new();
        let mut bell_pair_iter = r1.bell_iter().zip(r2.bell_iter()).enumerate();
        while let Some((place, (b1, b2))) = bell_pair_iter.next() {
            if b1 != b2 {
                // `b1` and `b2` must swap round with the next place:
                // ... b1  b2 ...
                // ... b2  b1 ...
                if Some((place + 1, (b2, b1))) != bell_pair_iter.next() {
                    return None;
                }
                swaps.push(place as u8);
            }
        }
        Some(Self {
            stage: r1.stage(),
            swaps,
        })
    }

    /* GETTERS */

    /// The [`Stage`] of this `Change`
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The lower place of every swapping pair, in ascending order
    #[inline]
    pub fn swaps(&self) -> &[u8] {
        &self.swaps
    }

    /// Returns `true` if this `Change` is the cross (i.e. no places are made)
    pub fn is_cross(&self) -> bool {
        self.count_places() == 0
    }

    /// Does the pair of places `place` and `place + 1` swap in this `Change`?
    pub fn find_swap(&self, place: u8) -> bool {
        self.swaps.binary_search(&place).is_ok()
    }

    /// Is `place` made (i.e. does the bell in that place stay put) in this `Change`?
    pub fn find_place(&self, place: u8) -> bool {
        place < self.stage.num_bells_u8()
            && !self.find_swap(place)
            && !(place > 0 && self.find_swap(place - 1))
    }

    /// Iterates over the places made by this `Change`, in ascending order
    pub fn places(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.stage.num_bells_u8()).filter(move |&p| self.find_place(p))
    }

    /// The number of places made by this `Change`
    pub fn count_places(&self) -> usize {
        self.stage.num_bells() - 2 * self.swaps.len()
    }

    /// Returns `true` if a place is made anywhere other than lead or lie.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, Stage};
    ///
    /// assert!(!Change::parse("18", Stage::MAJOR)?.internal());
    /// assert!(Change::parse("14", Stage::MAJOR)?.internal());
    /// assert!(!Change::parse("x", Stage::MAJOR)?.internal());
    /// # Ok::<(), ringframe::InvalidPlaceNotation>(())
    /// ```
    pub fn internal(&self) -> bool {
        let lie = self.stage.num_bells_u8() - 1;
        self.places().any(|p| p != 0 && p != lie)
    }

    /// The [`Parity`] of this `Change`, i.e. whether it swaps an odd or even number of pairs
    pub fn parity(&self) -> Parity {
        Parity::from_number(self.swaps.len())
    }

    /// The sign of this `Change` as a permutation (`+1` if even, `-1` if odd)
    pub fn sign(&self) -> i8 {
        self.parity().sign()
    }

    /// Returns the 0-indexed place that the bell in `place` moves to
    pub fn destination(&self, place: u8) -> u8 {
        if self.find_swap(place) {
            place + 1
        } else if place > 0 && self.find_swap(place - 1) {
            place - 1
        } else {
            place
        }
    }

    /* OPERATIONS */

    /// The `Change` read from the other end, i.e. with place `p` turned into place `n - 1 - p`.
    /// This is how a `Change` looks when a method is rung backwards.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, Stage};
    ///
    /// assert_eq!(Change::parse("14", Stage::MAJOR)?.reverse().to_string(), "58");
    /// assert_eq!(Change::parse("3", Stage::TRIPLES)?.reverse().to_string(), "5");
    /// # Ok::<(), ringframe::InvalidPlaceNotation>(())
    /// ```
    pub fn reverse(&self) -> Change {
        // Any swap needs two bells, so this can't underflow
        let num_bells = self.stage.num_bells_u8();
        let mut swaps = self.swaps.iter().map(|&p| num_bells - 2 - p).collect_vec();
        swaps.reverse();
        Self {
            stage: self.stage,
            swaps,
        }
    }

    /// Toggles whether the bells in `place` and `place + 1` swap.  Swapping a new pair removes any
    /// overlapping pairs.  Returns `true` if the pair swaps after the call.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Change, Stage};
    ///
    /// let mut change = Change::parse("x", Stage::MINOR)?;
    /// assert_eq!(change.swap_pair(1), Ok(true)); // Removes the swaps at 0 and 2
    /// assert_eq!(change.to_string(), "14");
    /// assert_eq!(change.swap_pair(1), Ok(false));
    /// assert_eq!(change.to_string(), "1234");
    /// # Ok::<(), ringframe::InvalidPlaceNotation>(())
    /// ```
    pub fn swap_pair(&mut self, place: u8) -> Result<bool, InvalidChangeError> {
        if place as usize + 1 >= self.stage.num_bells() {
            return Err(InvalidChangeError::SwapOutOfStage(place));
        }
        if let Ok(idx) = self.swaps.binary_search(&place) {
            self.swaps.remove(idx);
            return Ok(false);
        }
        self.swaps
            .retain(|&p| p + 1 != place && p != place + 1);
        let idx = self.swaps.partition_point(|&p| p < place);
        self.swaps.insert(idx, place);
        Ok(true)
    }

    /// Returns a [`RowBuf`] representing the same transposition as this `Change`.
    pub fn transposition(&self) -> RowBuf {
        let mut row = RowBuf::rounds(self.stage);
        // SAFETY: `row` has the same stage as `self`
        unsafe { self.permute_unchecked(&mut row) };
        row
    }

    /// Uses this `Change` to perform an in-place permutation of a given [`Row`].
    pub fn permute(&self, row: &mut Row) -> Result<(), IncompatibleStages> {
        IncompatibleStages::check(row.stage(), self.stage)?;
        unsafe { self.permute_unchecked(row) };
        Ok(())
    }

    /// Uses this `Change` to perform an in-place permutation of a given [`Row`], **without**
    /// checking that the [`Stage`]s match.
    ///
    /// # Safety
    ///
    /// This is safe if `self.stage() == row.stage()`.
    pub unsafe fn permute_unchecked(&self, row: &mut Row) {
        for &p in &self.swaps {
            row.swap(p as usize, p as usize + 1);
        }
    }
}

impl Mul<&Change> for &Row {
    type Output = RowBuf;

    /// Applies a [`Change`] to a [`Row`], panicking if the [`Stage`]s don't match.
    #[track_caller]
    fn mul(self, rhs: &Change) -> RowBuf {
        let mut row = self.to_owned();
        row *= rhs;
        row
    }
}

impl Mul<&Change> for &RowBuf {
    type Output = RowBuf;

    #[track_caller]
    fn mul(self, rhs: &Change) -> RowBuf {
        self.as_row() * rhs
    }
}

impl MulAssign<&Change> for RowBuf {
    #[track_caller]
    fn mul_assign(&mut self, rhs: &Change) {
        if let Err(e) = rhs.permute(self) {
            panic!("{}", e);
        }
    }
}

impl Debug for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Change({})", self)
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_cross() {
            // Always display cross notation as '-' to avoid confusion with bell names
            write!(f, "-")
        } else {
            for p in self.places() {
                write!(f, "{}", Bell::from_index(p))?;
            }
            Ok(())
        }
    }
}

/// The ways that an explicit list of swapping pairs can fail to form a [`Change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidChangeError {
    /// The pair starting at this place runs off the end of the [`Stage`]
    SwapOutOfStage(u8),
    /// The pair starting at this place overlaps with the pair below it
    OverlappingSwaps(u8),
}

impl Display for InvalidChangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidChangeError::SwapOutOfStage(p) => {
                write!(f, "Swap at place {} runs off the end of the row", p + 1)
            }
            InvalidChangeError::OverlappingSwaps(p) => {
                write!(f, "Swap at place {} overlaps with the swap below it", p + 1)
            }
        }
    }
}

impl std::error::Error for InvalidChangeError {}
