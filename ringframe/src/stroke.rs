use std::ops::Not;

use self::Stroke::{Back, Hand};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Stroke of a row, i.e. handstroke (`Stroke::Hand`) or backstroke (`Stroke::Back`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Stroke {
    Hand = 0,
    Back = 1,
}

impl Stroke {
    /// Returns the `Stroke` which happens `offset` [`Row`](crate::Row)s after a given `start` `Stroke`.
    ///
    /// # Example
    ///
    /// ```
    /// use ringframe::Stroke;
    ///
    /// assert_eq!(Stroke::Hand.offset(0), Stroke::Hand);
    /// // The row after a backstroke is a handstroke
    /// assert_eq!(Stroke::Back.offset(1), Stroke::Hand);
    /// assert_eq!(Stroke::Hand.offset(5040), Stroke::Hand);
    /// ```
    pub fn offset(self, offset: usize) -> Stroke {
        if offset % 2 == 0 {
            self
        } else {
            !self
        }
    }

    /// The index of this `Stroke` in a per-stroke array (`0` for handstroke, `1` for backstroke).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Not for Stroke {
    type Output = Self;

    /// Returns the opposite `Stroke` to `self`
    fn not(self) -> Self::Output {
        match self {
            Hand => Back,
            Back => Hand,
        }
    }
}

/// A set of [`Stroke`]s over which music can be counted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum StrokeSet {
    Hand,
    Back,
    #[default]
    Both,
}

impl StrokeSet {
    /// Returns `true` if `stroke` is in this set
    ///
    /// ```
    /// use ringframe::{Stroke, StrokeSet};
    ///
    /// assert!(StrokeSet::Both.contains(Stroke::Back));
    /// assert!(StrokeSet::Hand.contains(Stroke::Hand));
    /// assert!(!StrokeSet::Hand.contains(Stroke::Back));
    /// ```
    pub fn contains(self, stroke: Stroke) -> bool {
        matches!(
            (self, stroke),
            (Self::Both, _) | (Self::Hand, Hand) | (Self::Back, Back)
        )
    }

    /// Iterates over the [`Stroke`]s in this set, handstroke first
    pub fn strokes(self) -> impl Iterator<Item = Stroke> {
        [Hand, Back].into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<Stroke> for StrokeSet {
    fn from(stroke: Stroke) -> Self {
        match stroke {
            Hand => StrokeSet::Hand,
            Back => StrokeSet::Back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset() {
        #[track_caller]
        fn check(start: Stroke, offset: usize, expected: Stroke) {
            assert_eq!(start.offset(offset), expected);
        }
        check(Hand, 0, Hand);
        check(Back, 0, Back);
        check(Hand, 1, Back);
        check(Back, 1, Hand);
        check(Hand, 123547, Back);
        check(Back, 123547, Hand);
        check(Hand, usize::MAX, Back); // usize::MAX is odd
    }

    #[test]
    fn not() {
        assert_eq!(!Hand, Back);
        assert_eq!(!Back, Hand);
    }

    #[test]
    fn stroke_set() {
        assert_eq!(StrokeSet::Both.strokes().collect::<Vec<_>>(), vec![Hand, Back]);
        assert_eq!(StrokeSet::Back.strokes().collect::<Vec<_>>(), vec![Back]);
        assert_eq!(StrokeSet::from(Hand), StrokeSet::Hand);
        assert_eq!(StrokeSet::default(), StrokeSet::Both);
    }
}
