use std::ops::Range;

use itertools::Itertools;

use crate::{Row, Stage, Stroke, StrokeSet};

use super::{
    macros,
    pattern::{self, MusicPattern},
    trie::Trie,
    PatternIdx, PatternVec, RegisterError,
};

/// The default maximum number of trie nodes in a [`MusicCollection`]
pub const DEFAULT_NODE_LIMIT: usize = 1_000_000;

/// A set of [`MusicPattern`]s for a given [`Stage`], which can count how many times each pattern
/// occurs in a sequence of [`Row`]s.
///
/// # Example
/// ```
/// use ringframe::{music::MusicCollection, RowBuf, Stage, Stroke, StrokeSet};
///
/// let mut music = MusicCollection::new(Stage::MAJOR);
/// music.register("?4", 1)?;
/// music.register("<CRUs>", 2)?;
/// assert_eq!(music.len(), 7);
///
/// music.process_row(&RowBuf::parse("14235678").unwrap(), Stroke::Hand);
/// music.process_row(&RowBuf::parse("84235671").unwrap(), Stroke::Back);
/// assert_eq!(music.count(StrokeSet::Both), 3);
/// assert_eq!(music.score(StrokeSet::Hand), 3);
/// # Ok::<(), ringframe::music::RegisterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MusicCollection {
    stage: Stage,
    patterns: PatternVec<MusicPattern>,
    trie: Trie,
    node_limit: usize,
}

impl MusicCollection {
    /// Creates a `MusicCollection` with no patterns
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            patterns: PatternVec::new(),
            trie: Trie::empty(),
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    /// Sets the maximum number of nodes which the pattern trie can grow to.  Patterns which would
    /// exceed this fail to register.
    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Changes the [`Stage`] of this `MusicCollection`, rebuilding the trie for every pattern
    /// registered so far.  The node limit isn't checked during the rebuild.
    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.trie = Trie::build(
            stage,
            self.patterns
                .iter_enumerated()
                .map(|(idx, p)| (idx, p.elems())),
        );
        log::debug!(
            "Rebuilt music trie for {} ({} nodes)",
            stage,
            self.trie.num_nodes()
        );
    }

    /////////////
    // GETTERS //
    /////////////

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The number of [`MusicPattern`]s (after expanding macros)
    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, idx: PatternIdx) -> Option<&MusicPattern> {
        self.patterns.get(idx)
    }

    pub fn patterns(&self) -> impl Iterator<Item = (PatternIdx, &MusicPattern)> {
        self.patterns.iter_enumerated()
    }

    /// The number of nodes in the pattern trie, including the root
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.trie.num_nodes()
    }

    //////////////////
    // REGISTRATION //
    //////////////////

    /// Adds a pattern to this collection, returning the indices of the new [`MusicPattern`]s.
    /// `text` can be either a literal pattern (e.g. `"5678*"`) or a macro (e.g. `"<CRUs>"`), which
    /// adds every pattern of the macro with the same weight.
    ///
    /// If this fails, no patterns are added.
    pub fn register(
        &mut self,
        text: &str,
        weight: i32,
    ) -> Result<Range<PatternIdx>, RegisterError> {
        let text = text.trim();
        let pattern_texts = match text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            Some(name) => {
                let texts = macros::expand(name, self.stage)?;
                if texts.is_empty() {
                    log::warn!("Music macro {} has no patterns on {}", text, self.stage);
                }
                texts
            }
            None => vec![text.to_owned()],
        };
        let new_patterns = pattern_texts
            .iter()
            .map(|t| MusicPattern::new(t, weight))
            .collect::<Result<Vec<_>, _>>()?;

        let first_idx = self.patterns.next_idx();
        // Stop building as soon as the limit is hit, rather than building the whole trie first
        let budget = self.node_limit.saturating_sub(self.trie.num_nodes());
        let staging = Trie::build_within(
            self.stage,
            new_patterns
                .iter()
                .enumerate()
                .map(|(i, p)| (first_idx + i, p.elems())),
            &self.trie,
            budget,
        )
        .map_err(|nodes_needed| RegisterError::PatternAllocationFailure {
            pattern: text.to_owned(),
            nodes_needed,
            limit: self.node_limit,
        })?;
        let nodes_needed = staging.nodes_missing_from(&self.trie);

        for (i, p) in new_patterns.iter().enumerate() {
            if let Some(b) = p.bell_out_of_stage(self.stage) {
                log::warn!(
                    "Music pattern {:?} contains bell {}, which isn't in {}",
                    p.text(),
                    b,
                    self.stage
                );
            } else if !staging.contains(first_idx + i) {
                log::warn!(
                    "Music pattern {:?} can never fit in a row of {}",
                    p.text(),
                    self.stage
                );
            }
        }

        self.trie.merge(staging);
        self.patterns.extend(new_patterns);
        log::debug!(
            "Registered {:?} as {} pattern(s); trie has {} nodes (+{})",
            text,
            pattern_texts.len(),
            self.trie.num_nodes(),
            nodes_needed
        );
        Ok(first_idx..self.patterns.next_idx())
    }

    /// Registers a line of the form `[weight:]pattern`, using `default_weight` if no weight is
    /// given.
    ///
    /// # Example
    /// ```
    /// use ringframe::{music::MusicCollection, Stage, StrokeSet};
    ///
    /// let mut music = MusicCollection::new(Stage::MAJOR);
    /// let idxs = music.register_line("-2:<5678s>", 1)?;
    /// assert_eq!(idxs.end.index() - idxs.start.index(), 48);
    /// assert!(music.patterns().all(|(_, p)| p.weight() == -2));
    /// # Ok::<(), ringframe::music::RegisterError>(())
    /// ```
    pub fn register_line(
        &mut self,
        line: &str,
        default_weight: i32,
    ) -> Result<Range<PatternIdx>, RegisterError> {
        let (weight, body) = pattern::split_weight(line, default_weight)?;
        self.register(body, weight)
    }

    ////////////////
    // PROCESSING //
    ////////////////

    /// Matches one [`Row`] against every pattern, incrementing the counts of those which match
    /// at the given [`Stroke`].
    pub fn process_row(&mut self, row: &Row, stroke: Stroke) {
        let patterns = &mut self.patterns;
        self.trie
            .match_row(row.bells(), &mut |idx| patterns[idx].increment(stroke));
    }

    /// Matches a sequence of [`Row`]s, alternating [`Stroke`]s and starting with `first_stroke`.
    pub fn process_rows<R: AsRef<Row>>(
        &mut self,
        rows: impl IntoIterator<Item = R>,
        first_stroke: Stroke,
    ) {
        for (i, row) in rows.into_iter().enumerate() {
            self.process_row(row.as_ref(), first_stroke.offset(i));
        }
    }

    /// Sets the counts of every pattern to zero, keeping the patterns themselves
    pub fn reset_counts(&mut self) {
        self.patterns.iter_mut().for_each(MusicPattern::clear);
    }

    /// The total number of matches on the given [`Stroke`]s
    pub fn count(&self, strokes: StrokeSet) -> usize {
        self.patterns.iter().map(|p| p.count(strokes)).sum()
    }

    /// The total weighted score on the given [`Stroke`]s
    pub fn score(&self, strokes: StrokeSet) -> i64 {
        self.patterns.iter().map(|p| p.total(strokes)).sum()
    }

    /// The text of every pattern which has matched at least once, along with its count
    pub fn matched_patterns(&self, strokes: StrokeSet) -> Vec<(&str, usize)> {
        self.patterns
            .iter()
            .map(|p| (p.text(), p.count(strokes)))
            .filter(|(_, count)| *count > 0)
            .collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::{Bell, RowBuf};

    fn row(s: &str) -> RowBuf {
        RowBuf::parse(s).unwrap()
    }

    #[test]
    fn single_wildcard() {
        let mut music = MusicCollection::new(Stage::MAJOR);
        let idxs = music.register("?4", 1).unwrap();
        let idx = idxs.start;
        let four = Bell::from_name('4').unwrap();
        let mut exp_count = 0;
        for (i, r) in Stage::MAJOR.extent().iter().enumerate().step_by(97) {
            music.process_row(r, Stroke::Hand.offset(i));
            if r[1] == four {
                exp_count += 1;
            }
        }
        assert_eq!(music.pattern(idx).unwrap().count(StrokeSet::Both), exp_count);
        assert!(exp_count > 0);
    }

    #[test]
    fn end_anchored_star() {
        let mut music = MusicCollection::new(Stage::MAJOR);
        music.register("1*8", 1).unwrap();
        music.process_rows(Stage::MAJOR.extent(), Stroke::Hand);
        // 6! arrangements of the middle bells
        assert_eq!(music.count(StrokeSet::Both), 720);
    }

    #[test]
    fn scores() {
        let mut music = MusicCollection::new(Stage::MINOR);
        music.register_line("3:*56", 1).unwrap();
        music.register_line("-1:65*", 1).unwrap();
        music.register("123456", 10).unwrap();
        music.process_rows([row("123456"), row("654321"), row("213456"), row("652143")], Stroke::Back);
        // "*56" and rounds match at backstroke, "65*" at handstroke
        assert_eq!(music.count(StrokeSet::Both), 5);
        assert_eq!(music.score(StrokeSet::Both), 3 * 2 - 2 + 10);
        assert_eq!(music.score(StrokeSet::Back), 3 * 2 + 10);
        assert_eq!(music.matched_patterns(StrokeSet::Hand), [("65*", 2)]);
        assert_eq!(
            music.matched_patterns(StrokeSet::Back),
            [("*56", 2), ("123456", 1)]
        );
    }

    #[test]
    fn failed_registration_changes_nothing() {
        let mut music = MusicCollection::new(Stage::MAJOR);
        assert!(matches!(
            music.register("<CRUS", 1),
            Err(RegisterError::InvalidChar { c: '<', .. })
        ));
        assert!(matches!(
            music.register("<Wraps>", 1),
            Err(RegisterError::UnknownMacro { .. })
        ));
        assert_eq!(music.len(), 0);
        assert_eq!(music.num_nodes(), 1);

        let mut music = MusicCollection::new(Stage::MAJOR).with_node_limit(10);
        music.register("5678*", 1).unwrap();
        assert_eq!(music.num_nodes(), 5);
        // The CRUs need 25 new nodes, but building stops at the sixth
        assert_eq!(
            music.register("<CRUs>", 1),
            Err(RegisterError::PatternAllocationFailure {
                pattern: "<CRUs>".to_owned(),
                nodes_needed: 6,
                limit: 10,
            })
        );
        assert_eq!(music.len(), 1);
        assert_eq!(music.num_nodes(), 5);
        // Sharing existing nodes is free
        music.register("56", 1).unwrap();
        assert_eq!(music.num_nodes(), 5);
    }

    #[test]
    fn node_limit_stops_runaway_patterns() {
        // Every star can match any number of bells, so this would need far too many nodes to build
        let mut music = MusicCollection::new(Stage::new(32)).with_node_limit(10);
        assert_eq!(
            music.register("*1*2*3*4*5*6*7*8*9*0*", 1),
            Err(RegisterError::PatternAllocationFailure {
                pattern: "*1*2*3*4*5*6*7*8*9*0*".to_owned(),
                nodes_needed: 10,
                limit: 10,
            })
        );
        assert!(music.is_empty());
        assert_eq!(music.num_nodes(), 1);
        music.register("1234*", 1).unwrap();
        assert_eq!(music.num_nodes(), 5);
    }

    #[test]
    fn unmatchable_patterns_are_kept() {
        let mut music = MusicCollection::new(Stage::MINIMUS);
        let idxs = music.register("12345", 1).unwrap();
        assert_eq!(idxs.end.index() - idxs.start.index(), 1);
        assert_eq!(music.len(), 1);
        assert_eq!(music.num_nodes(), 1);
        music.register("*5", 1).unwrap();
        music.process_row(&row("1234"), Stroke::Hand);
        assert_eq!(music.count(StrokeSet::Both), 0);
    }

    #[test]
    fn set_stage_rebuilds_trie() {
        let mut music = MusicCollection::new(Stage::MINOR);
        music.register("*78", 1).unwrap();
        music.set_stage(Stage::MAJOR);
        music.process_row(&row("12345678"), Stroke::Hand);
        music.process_row(&row("12345687"), Stroke::Back);
        assert_eq!(music.count(StrokeSet::Both), 1);
        assert_eq!(music.stage(), Stage::MAJOR);
    }

    #[quickcheck]
    fn reset_matches_fresh_collection(rows: Vec<RowBuf>) -> bool {
        let build = || {
            let mut music = MusicCollection::new(Stage::MINOR);
            music.register("<4-runs>", 2).unwrap();
            music.register("?*5?", 1).unwrap();
            music
        };
        let rows = rows.into_iter().filter(|r| r.stage() == Stage::MINOR).collect_vec();

        let mut reused = build();
        reused.process_rows(&rows, Stroke::Back);
        reused.reset_counts();
        reused.process_rows(&rows, Stroke::Hand);
        let mut fresh = build();
        fresh.process_rows(&rows, Stroke::Hand);

        reused.score(StrokeSet::Hand) == fresh.score(StrokeSet::Hand)
            && reused.count(StrokeSet::Both) == fresh.count(StrokeSet::Both)
    }
}
