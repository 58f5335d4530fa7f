//! Methods: named leads of [`Change`]s, and the [`Row`]s they generate.

use std::fmt::{Display, Formatter};

use crate::{parse_pn, Change, InvalidPlaceNotation, Row, RowBuf, Stage};

/// A named sequence of [`Change`]s, intended to be rung as a repeating unit (a 'lead').  Every
/// lead starts where the previous one finished, so a course is made by repeating the lead until
/// the starting row comes round again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: String,
    stage: Stage,
    changes: Vec<Change>,
    /// The overall transposition of one lead
    lead_head: RowBuf,
}

impl Method {
    //////////////////
    // CONSTRUCTORS //
    //////////////////

    /// Parses some place notation (see [`interpret_pn`](crate::interpret_pn)) and creates a
    /// `Method` with one lead of those changes.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Method, RowBuf, Stage};
    ///
    /// let plain_bob = Method::from_place_notation("Plain Bob", Stage::MINOR, "&x16x16x16,12")?;
    /// assert_eq!(plain_bob.lead_len(), 12);
    /// assert_eq!(plain_bob.lead_head(), &*RowBuf::parse("135264").unwrap());
    /// assert_eq!(plain_bob.leads_per_course(), 5);
    /// # Ok::<(), ringframe::MethodError>(())
    /// ```
    pub fn from_place_notation(
        name: impl Into<String>,
        stage: Stage,
        place_notation: &str,
    ) -> Result<Self, MethodError> {
        let changes = parse_pn(stage, place_notation).map_err(MethodError::PlaceNotation)?;
        Self::new(name.into(), stage, changes)
    }

    /// Creates a `Method` from a lead of [`Change`]s, which must all have the given [`Stage`].
    ///
    /// # Panics
    ///
    /// Panics if any of the [`Change`]s have a different [`Stage`] to `stage`.
    #[track_caller]
    pub fn new(name: String, stage: Stage, changes: Vec<Change>) -> Result<Self, MethodError> {
        if changes.is_empty() {
            return Err(MethodError::EmptyLead);
        }
        let mut lead_head = RowBuf::rounds(stage);
        for c in &changes {
            lead_head *= c;
        }
        Ok(Self {
            name,
            stage,
            changes,
            lead_head,
        })
    }

    /////////////
    // GETTERS //
    /////////////

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The [`Change`]s which make up one lead of this `Method`
    #[inline]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The number of [`Row`]s (equivalently, [`Change`]s) in one lead
    #[inline]
    pub fn lead_len(&self) -> usize {
        self.changes.len()
    }

    /// The overall transposing effect of one lead, i.e. the first row of the second lead of the
    /// plain course.
    #[inline]
    pub fn lead_head(&self) -> &Row {
        &self.lead_head
    }

    /// The last [`Row`] of the first lead, i.e. the row before the
    /// [lead head](Self::lead_head).
    pub fn lead_end(&self) -> RowBuf {
        // Every change is its own inverse, so undoing the last change of the lead head gives the
        // row before it.  `changes` is never empty
        match self.changes.last() {
            Some(last) => &self.lead_head * last,
            None => self.lead_head.clone(),
        }
    }

    /// The number of leads in a plain course
    pub fn leads_per_course(&self) -> usize {
        self.lead_head.order()
    }

    ////////////////////
    // ROW GENERATION //
    ////////////////////

    /// The [`Row`]s of the first lead of the plain course, finishing with the
    /// [lead head](Self::lead_head) but not including rounds.
    pub fn plain_lead(&self) -> Vec<RowBuf> {
        rows_from(&RowBuf::rounds(self.stage), &self.changes).collect()
    }

    /// The [`Row`]s of the course starting at `course_head`, generated one lead at a time until
    /// `course_head` comes round again.  `course_head` is the last row returned, not the first.
    ///
    /// # Panics
    ///
    /// Panics if `course_head` has a different [`Stage`] to this `Method`.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Method, RowBuf, Stage};
    ///
    /// let plain_bob = Method::from_place_notation("Plain Bob", Stage::MINOR, "&x16x16x16,12")?;
    /// let course = plain_bob.course_from(&RowBuf::rounds(Stage::MINOR));
    /// assert_eq!(course.len(), 60);
    /// assert!(course.last().unwrap().is_rounds());
    /// # Ok::<(), ringframe::MethodError>(())
    /// ```
    #[track_caller]
    pub fn course_from(&self, course_head: &Row) -> Vec<RowBuf> {
        let mut rows = Vec::with_capacity(self.lead_len() * self.leads_per_course());
        let mut lead_head = course_head.to_owned();
        loop {
            rows.extend(rows_from(&lead_head, &self.changes));
            // `rows` can't be empty, because every method has at least one change
            match rows.last() {
                Some(r) if r.as_row() != course_head => lead_head = r.clone(),
                _ => break,
            }
        }
        rows
    }
}

/// Applies some [`Change`]s in turn to `start`, returning every new [`Row`].  `start` itself is
/// not returned.
///
/// # Panics
///
/// The iterator panics if any [`Change`] has a different [`Stage`] to `start`.
pub fn rows_from<'c>(
    start: &Row,
    changes: impl IntoIterator<Item = &'c Change> + 'c,
) -> impl Iterator<Item = RowBuf> + 'c {
    let mut row = start.to_owned();
    changes.into_iter().map(move |c| {
        row *= c;
        row.clone()
    })
}

/// The ways that a [`Method`] can fail to be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodError {
    PlaceNotation(InvalidPlaceNotation),
    /// The place notation contained no changes
    EmptyLead,
}

impl Display for MethodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodError::PlaceNotation(e) => write!(f, "{}", e),
            MethodError::EmptyLead => write!(f, "Methods must have at least one change"),
        }
    }
}

impl std::error::Error for MethodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MethodError::PlaceNotation(e) => Some(e),
            MethodError::EmptyLead => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::PnError;

    fn row(s: &str) -> RowBuf {
        RowBuf::parse(s).unwrap()
    }

    #[test]
    fn lead_heads() {
        #[track_caller]
        fn check(stage: Stage, pn: &str, lead_len: usize, lead_head: &str, leads: usize) {
            let method = Method::from_place_notation("", stage, pn).unwrap();
            assert_eq!(method.lead_len(), lead_len);
            assert_eq!(method.lead_head(), row(lead_head).as_row());
            assert_eq!(method.leads_per_course(), leads);
            assert_eq!(method.plain_lead().last().map(|r| r.as_row()), Some(method.lead_head()));
        }

        check(Stage::MINOR, "&x16x16x16,12", 12, "135264", 5);
        check(Stage::MAJOR, "&x18x18x18x18,12", 16, "13527486", 7);
        check(Stage::MINOR, "&x36x14x12x36x14x56,12", 24, "156342", 5);
        check(Stage::MAJOR, "&x38x14x1258x36x14x58x16x78,12", 32, "15738264", 7);
        check(Stage::DOUBLES, "3,&1.5.1.5.1", 10, "12534", 3);
        check(Stage::MINIMUS, "&x14x14,12", 8, "1342", 3);
    }

    #[test]
    fn lead_end() {
        let method = Method::from_place_notation("", Stage::MINOR, "&x16x16x16,12").unwrap();
        assert_eq!(method.lead_end(), row("132546"));
        assert_eq!(method.plain_lead()[10], row("132546"));
    }

    #[test]
    fn courses() {
        let plain_bob = Method::from_place_notation("", Stage::MINOR, "&x16x16x16,12").unwrap();
        let course_head = row("132456");
        let course = plain_bob.course_from(&course_head);
        assert_eq!(course.len(), 60);
        assert_eq!(course.last(), Some(&course_head));
        // A plain course contains no repeated rows
        assert!(course.iter().all_unique());
        assert_eq!(course[0], row("314265"));
    }

    #[test]
    fn rows_from_doesnt_yield_start() {
        let changes = parse_pn(Stage::MINIMUS, "x14").unwrap();
        let rows = rows_from(&RowBuf::rounds(Stage::MINIMUS), &changes).collect_vec();
        assert_eq!(rows, [row("2143"), row("2413")]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            Method::from_place_notation("", Stage::MAJOR, " ,, "),
            Err(MethodError::EmptyLead)
        );
        let err = Method::from_place_notation("", Stage::MAJOR, "x15x18").unwrap_err();
        assert!(matches!(
            err,
            MethodError::PlaceNotation(InvalidPlaceNotation {
                reason: PnError::AmbiguousPlacesBetween { p: 0, q: 4 },
                ..
            })
        ));
    }
}
