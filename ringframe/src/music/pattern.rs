use std::fmt::{Debug, Formatter};

use crate::{Bell, Stage, Stroke, StrokeSet};

use super::RegisterError;

/// One element of a [`MusicPattern`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Elem {
    /// Matches exactly this [`Bell`]
    Bell(Bell),
    /// `?`: matches any single bell
    Any,
    /// `*`: matches any number of bells, including none
    Star,
}

impl Elem {
    fn parse(c: char) -> Option<Self> {
        match c {
            '?' => Some(Elem::Any),
            '*' => Some(Elem::Star),
            _ => Bell::parse(c).ok().map(Elem::Bell),
        }
    }
}

/// A single music pattern, with a weight and the number of times it has matched at each
/// [`Stroke`].  The pattern text can only be changed through [`MusicPattern::set`], which also
/// clears the counts.
#[derive(Clone, PartialEq, Eq)]
pub struct MusicPattern {
    text: String,
    elems: Vec<Elem>,
    weight: i32,
    /// Indexed by [`Stroke::index`]
    counts: [usize; 2],
}

impl MusicPattern {
    /// Parses a literal pattern (not a `<macro>`), with no matches counted.
    ///
    /// # Example
    /// ```
    /// use ringframe::{music::{Elem, MusicPattern}, Bell};
    ///
    /// let pattern = MusicPattern::new("1*8", 2)?;
    /// assert_eq!(pattern.elems(), &[
    ///     Elem::Bell(Bell::TREBLE),
    ///     Elem::Star,
    ///     Elem::Bell(Bell::from_name('8').unwrap()),
    /// ]);
    /// assert!(MusicPattern::new("1x8", 2).is_err());
    /// # Ok::<(), ringframe::music::RegisterError>(())
    /// ```
    pub fn new(text: &str, weight: i32) -> Result<Self, RegisterError> {
        let elems = text
            .chars()
            .map(|c| {
                Elem::parse(c).ok_or_else(|| RegisterError::InvalidChar {
                    pattern: text.to_owned(),
                    c,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            text: text.to_owned(),
            elems,
            weight,
            counts: [0; 2],
        })
    }

    /// Replaces the text and weight of this pattern, clearing its counts.  If `text` is invalid,
    /// `self` is left unchanged.
    pub fn set(&mut self, text: &str, weight: i32) -> Result<(), RegisterError> {
        *self = Self::new(text, weight)?;
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn elems(&self) -> &[Elem] {
        &self.elems
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// The number of times this pattern has matched on the given [`Stroke`]s
    pub fn count(&self, strokes: StrokeSet) -> usize {
        strokes.strokes().map(|s| self.counts[s.index()]).sum()
    }

    /// The score contributed by this pattern on the given [`Stroke`]s, i.e.
    /// `count * weight`.
    pub fn total(&self, strokes: StrokeSet) -> i64 {
        self.count(strokes) as i64 * self.weight as i64
    }

    /// Resets the counts of this pattern to zero
    pub fn clear(&mut self) {
        self.counts = [0; 2];
    }

    pub fn increment(&mut self, stroke: Stroke) {
        self.counts[stroke.index()] += 1;
    }

    /// The smallest number of bells that a row must have for this pattern to match it
    pub fn min_len(&self) -> usize {
        self.elems.iter().filter(|e| **e != Elem::Star).count()
    }

    /// Returns the first [`Bell`] of this pattern which can't appear in a row of `stage`.
    pub(crate) fn bell_out_of_stage(&self, stage: Stage) -> Option<Bell> {
        self.elems.iter().find_map(|e| match e {
            Elem::Bell(b) if !stage.contains(*b) => Some(*b),
            _ => None,
        })
    }
}

impl Debug for MusicPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MusicPattern({:?} x {}, hand {}, back {})",
            self.text, self.weight, self.counts[0], self.counts[1]
        )
    }
}

/// Splits a weighted pattern line (e.g. `"2:5678*"` or `"-1:*78"`) into its weight and body.
/// Lines with no `:` use `default_weight`.
pub(crate) fn split_weight(line: &str, default_weight: i32) -> Result<(i32, &str), RegisterError> {
    let line = line.trim();
    match line.split_once(':') {
        Some((weight, body)) => {
            let weight = weight.trim();
            let weight = weight
                .parse::<i32>()
                .map_err(|_| RegisterError::InvalidWeight(weight.to_owned()))?;
            Ok((weight, body.trim()))
        }
        None => Ok((default_weight, line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_elems() {
        let pattern = MusicPattern::new("?4*e", 1).unwrap();
        assert_eq!(
            pattern.elems(),
            &[
                Elem::Any,
                Elem::Bell(Bell::from_name('4').unwrap()),
                Elem::Star,
                Elem::Bell(Bell::from_name('E').unwrap()),
            ]
        );
        assert_eq!(pattern.min_len(), 3);
        assert_eq!(pattern.bell_out_of_stage(Stage::MAJOR), Bell::from_name('E'));
        assert_eq!(pattern.bell_out_of_stage(Stage::CINQUES), None);

        assert_eq!(
            MusicPattern::new("56 78", 1),
            Err(RegisterError::InvalidChar {
                pattern: "56 78".to_owned(),
                c: ' ',
            })
        );
    }

    #[test]
    fn counts() {
        let mut pattern = MusicPattern::new("5678", -3).unwrap();
        pattern.increment(Stroke::Hand);
        pattern.increment(Stroke::Back);
        pattern.increment(Stroke::Back);
        assert_eq!(pattern.count(StrokeSet::Hand), 1);
        assert_eq!(pattern.count(StrokeSet::Back), 2);
        assert_eq!(pattern.count(StrokeSet::Both), 3);
        assert_eq!(pattern.total(StrokeSet::Both), -9);

        pattern.clear();
        assert_eq!(pattern.count(StrokeSet::Both), 0);

        pattern.increment(Stroke::Hand);
        pattern.set("8765", 2).unwrap();
        assert_eq!(pattern.text(), "8765");
        assert_eq!(pattern.weight(), 2);
        assert_eq!(pattern.count(StrokeSet::Both), 0);
        // Failing to set leaves the pattern alone
        assert!(pattern.set("87!5", 4).is_err());
        assert_eq!(pattern.text(), "8765");
    }

    #[test]
    fn weights() {
        #[track_caller]
        fn check(line: &str, exp: Result<(i32, &str), RegisterError>) {
            assert_eq!(split_weight(line, 1), exp);
        }

        check("5678*", Ok((1, "5678*")));
        check("2:5678*", Ok((2, "5678*")));
        check(" -1 : *78 ", Ok((-1, "*78")));
        check("10:<CRUs>", Ok((10, "<CRUs>")));
        check("x:5678", Err(RegisterError::InvalidWeight("x".to_owned())));
        check(
            "99999999999:5678",
            Err(RegisterError::InvalidWeight("99999999999".to_owned())),
        );
    }
}
