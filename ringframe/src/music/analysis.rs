//! Scoring whole [`Method`]s, using a separate [`MusicCollection`] for each part of the method
//! that music is counted in.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    ops::Range,
    str::FromStr,
};

use crate::{
    method::rows_from, Bell, InvalidPermutation, Method, Row, RowBuf, Stage, Stroke, StrokeSet,
};

use super::{pattern, MusicCollection, PatternIdx, RegisterError, DEFAULT_NODE_LIMIT};

/// Which rows of a [`Method`] are scored, starting from a given lead head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Span {
    /// Every lead until the lead head comes round again
    Course,
    /// One lead
    Lead,
    /// The first half of the lead's changes
    HalfLead,
    /// The second half of the lead's changes
    SecondHalfLead,
    /// The first half of the lead's changes, applied backwards
    HalfLeadReversed,
    /// The second half of the lead's changes, applied backwards
    SecondHalfLeadReversed,
}

impl Span {
    pub const ALL: [Span; 6] = [
        Span::Course,
        Span::Lead,
        Span::HalfLead,
        Span::SecondHalfLead,
        Span::HalfLeadReversed,
        Span::SecondHalfLeadReversed,
    ];

    /// The keyword used for this `Span` in music definitions
    pub fn keyword(self) -> &'static str {
        match self {
            Span::Course => "course",
            Span::Lead => "lead",
            Span::HalfLead => "halflead",
            Span::SecondHalfLead => "2halflead",
            Span::HalfLeadReversed => "rhalflead",
            Span::SecondHalfLeadReversed => "2rhalflead",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|span| span.keyword() == s)
    }

    /// The [`Row`]s of `method` covered by this `Span`, starting (but not including) `head`.
    ///
    /// # Example
    /// ```
    /// use ringframe::{music::Span, Method, RowBuf, Stage};
    ///
    /// let plain_bob = Method::from_place_notation("Plain Bob", Stage::MINOR, "&x16x16x16,12")?;
    /// let rounds = RowBuf::rounds(Stage::MINOR);
    /// assert_eq!(Span::Course.rows(&plain_bob, &rounds).len(), 60);
    /// assert_eq!(Span::HalfLead.rows(&plain_bob, &rounds).len(), 6);
    /// assert_eq!(Span::HalfLead.rows(&plain_bob, &rounds)[5].to_string(), "654321");
    /// # Ok::<(), ringframe::MethodError>(())
    /// ```
    pub fn rows(self, method: &Method, head: &Row) -> Vec<RowBuf> {
        let changes = method.changes();
        // Splits as `[..half]` / `[half..]` forwards, and as `[..len - half]` / `[len - half..]`
        // when reversed, so that odd-length leads split around the same change either way
        let half = changes.len() / 2;
        let rev_half = changes.len() - half;
        match self {
            Span::Course => method.course_from(head),
            Span::Lead => rows_from(head, changes).collect(),
            Span::HalfLead => rows_from(head, &changes[..half]).collect(),
            Span::SecondHalfLead => rows_from(head, &changes[half..]).collect(),
            Span::HalfLeadReversed => rows_from(head, changes[..rev_half].iter().rev()).collect(),
            Span::SecondHalfLeadReversed => {
                rows_from(head, changes[rev_half..].iter().rev()).collect()
            }
        }
    }
}

impl FromStr for Span {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| AnalysisError::UnknownSpan(s.to_owned()))
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Music definitions for scoring [`Method`]s on one [`Stage`].  Each pattern belongs to a 'set',
/// identified by a lead head and a [`Span`].  A [`Method`] is scored by generating the rows of
/// every set and summing the scores of their [`MusicCollection`]s.
///
/// # Example
/// ```
/// use ringframe::{music::MusicAnalysis, Method, Stage};
///
/// let mut analysis = MusicAnalysis::new(Stage::MAJOR);
/// analysis.add_line("2:*5678")?;
/// analysis.add_line("lead=15738264")?;
/// analysis.add_line("5678*")?;
/// assert_eq!(analysis.sets().count(), 2);
///
/// let plain_bob = Method::from_place_notation("Plain Bob", Stage::MAJOR, "&x18x18x18x18,12")?;
/// assert!(analysis.analyse(&plain_bob) > 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct MusicAnalysis {
    stage: Stage,
    node_limit: usize,
    score_strokes: StrokeSet,
    sets: BTreeMap<(RowBuf, Span), MusicCollection>,
    /// The lead head and span used by [`Self::add_line`]
    current_head: RowBuf,
    current_span: Span,
    rows_analysed: usize,
}

impl MusicAnalysis {
    /// Creates a `MusicAnalysis` with no patterns.  Lines default to the plain course.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            node_limit: DEFAULT_NODE_LIMIT,
            score_strokes: StrokeSet::Both,
            sets: BTreeMap::new(),
            current_head: RowBuf::rounds(stage),
            current_span: Span::Course,
            rows_analysed: 0,
        }
    }

    /// Sets the node limit of every [`MusicCollection`] created after this call
    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Only count music on the given [`Stroke`]s
    pub fn with_score_strokes(mut self, score_strokes: StrokeSet) -> Self {
        self.score_strokes = score_strokes;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The total number of rows generated by every call to [`Self::analyse`]
    pub fn rows_analysed(&self) -> usize {
        self.rows_analysed
    }

    /// Every music set, in order of lead head then [`Span`]
    pub fn sets(&self) -> impl Iterator<Item = (&Row, Span, &MusicCollection)> {
        self.sets
            .iter()
            .map(|((head, span), music)| (head.as_row(), *span, music))
    }

    /// Adds one line of a music definition.  This is either:
    /// - an option `span[=lead_head]` (e.g. `course` or `lead=15738264`), which sets the span and
    ///   lead head used by following lines.  The treble can be left out of the lead head, and any
    ///   missing cover bells are added.
    /// - a pattern line `[weight:]pattern` (e.g. `2:*5678` or `<CRUs>`), which is added to the
    ///   current set.
    pub fn add_line(&mut self, line: &str) -> Result<(), AnalysisError> {
        let line = line.trim();
        let (option, lead_head) = match line.split_once('=') {
            Some((option, lead_head)) => (option.trim(), Some(lead_head.trim())),
            None => (line, None),
        };
        match (Span::from_keyword(option), lead_head) {
            (Some(span), lead_head) => {
                self.current_span = span;
                if let Some(text) = lead_head {
                    self.current_head = self.parse_lead_head(text)?;
                }
                Ok(())
            }
            (None, Some(_)) => Err(AnalysisError::UnknownSpan(option.to_owned())),
            (None, None) => {
                let (weight, body) = pattern::split_weight(line, 1)?;
                let head = self.current_head.clone();
                self.add_pattern(&head, self.current_span, body, weight)?;
                Ok(())
            }
        }
    }

    /// Registers a pattern (or macro) in the set for `lead_head` and `span`, creating the set if
    /// needed.
    pub fn add_pattern(
        &mut self,
        lead_head: &Row,
        span: Span,
        text: &str,
        weight: i32,
    ) -> Result<Range<PatternIdx>, AnalysisError> {
        let key = (lead_head.to_owned(), span);
        if let Some(music) = self.sets.get_mut(&key) {
            return Ok(music.register(text, weight)?);
        }
        // Only keep a new set if its first pattern registers
        let mut music = MusicCollection::new(self.stage).with_node_limit(self.node_limit);
        let idxs = music.register(text, weight)?;
        log::debug!("Created music set for {} from {}", span, lead_head);
        self.sets.insert(key, music);
        Ok(idxs)
    }

    /// Scores a [`Method`] against every set, returning the total score.  If no patterns have been
    /// added, `<CRUs>` in the plain course are counted.
    ///
    /// # Panics
    ///
    /// Panics if `method` has a different [`Stage`] to this `MusicAnalysis`.
    #[track_caller]
    pub fn analyse(&mut self, method: &Method) -> i64 {
        assert_eq!(
            method.stage(),
            self.stage,
            "Can't analyse a method of a different stage"
        );
        if self.sets.is_empty() {
            let rounds = RowBuf::rounds(self.stage);
            if let Err(e) = self.add_pattern(&rounds, Span::Course, "<CRUs>", 1) {
                log::warn!("Couldn't add default music: {}", e);
            }
        }

        let mut score = 0;
        for ((head, span), music) in &mut self.sets {
            let rows = span.rows(method, head);
            self.rows_analysed += rows.len();
            music.reset_counts();
            music.process_rows(&rows, Stroke::Hand);
            score += music.score(self.score_strokes);
        }
        score
    }

    /// Parses a lead head on this analysis' [`Stage`].  The treble is added at the front if it is
    /// missing, and cover bells are added at the back.
    pub fn parse_lead_head(&self, text: &str) -> Result<RowBuf, AnalysisError> {
        let mut full_text = text.to_owned();
        if !text.contains(Bell::TREBLE.name()) {
            full_text.insert(0, Bell::TREBLE.name());
        }
        RowBuf::parse_with_stage(&full_text, self.stage).map_err(|error| AnalysisError::LeadHead {
            text: text.to_owned(),
            error,
        })
    }
}

/// The ways that adding to a [`MusicAnalysis`] can fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    LeadHead {
        text: String,
        error: InvalidPermutation,
    },
    /// An option line used a keyword which isn't a [`Span`]
    UnknownSpan(String),
    Register(RegisterError),
}

impl From<RegisterError> for AnalysisError {
    fn from(e: RegisterError) -> Self {
        AnalysisError::Register(e)
    }
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::LeadHead { text, error } => {
                write!(f, "Can't parse music lead head {:?}: {}", text, error.reason)
            }
            AnalysisError::UnknownSpan(s) => write!(
                f,
                "Unknown music span {:?}; expected one of {}",
                s,
                Span::ALL.map(Span::keyword).join(", ")
            ),
            AnalysisError::Register(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::LeadHead { error, .. } => Some(error),
            AnalysisError::UnknownSpan(_) => None,
            AnalysisError::Register(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::InvalidRowError;

    fn plain_bob_major() -> Method {
        Method::from_place_notation("Plain Bob", Stage::MAJOR, "&x18x18x18x18,12").unwrap()
    }

    #[test]
    fn spans() {
        let method = plain_bob_major();
        let rounds = RowBuf::rounds(Stage::MAJOR);
        let rows = |span: Span| {
            span.rows(&method, &rounds)
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(rows(Span::Course).len(), 112);
        assert_eq!(rows(Span::Lead).len(), 16);
        assert_eq!(rows(Span::Lead)[15], "13527486");
        assert_eq!(rows(Span::HalfLead)[..2], ["21436587", "24163857"]);
        assert_eq!(rows(Span::SecondHalfLead)[0], "21436587");
        assert_eq!(rows(Span::HalfLeadReversed)[0], "13254768");
        assert_eq!(rows(Span::SecondHalfLeadReversed)[0], "12436587");
        assert_eq!(rows(Span::SecondHalfLeadReversed).len(), 8);
        for span in Span::ALL {
            assert_eq!(span.to_string().parse::<Span>(), Ok(span));
        }
        assert_eq!(
            "half".parse::<Span>(),
            Err(AnalysisError::UnknownSpan("half".to_owned()))
        );
    }

    #[test]
    fn option_lines() {
        let mut analysis = MusicAnalysis::new(Stage::MAJOR);
        analysis.add_line("lead=5738264").unwrap();
        analysis.add_line("*5678").unwrap();
        analysis.add_line("halflead").unwrap();
        analysis.add_line("3:5678*").unwrap();
        analysis.add_line("course=132").unwrap();
        analysis.add_line("<CRUs>").unwrap();

        let sets = analysis
            .sets()
            .map(|(head, span, music)| (head.to_string(), span, music.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            sets,
            [
                ("13245678".to_owned(), Span::Course, 6),
                ("15738264".to_owned(), Span::Lead, 1),
                ("15738264".to_owned(), Span::HalfLead, 1),
            ]
        );

        assert_eq!(
            analysis.add_line("half=1234"),
            Err(AnalysisError::UnknownSpan("half".to_owned()))
        );
        assert_eq!(
            analysis.add_line("lead=1223"),
            Err(AnalysisError::LeadHead {
                text: "1223".to_owned(),
                error: InvalidPermutation {
                    text: "1223".to_owned(),
                    reason: InvalidRowError::DuplicateBell(Bell::from_name('2').unwrap()),
                },
            })
        );
        assert!(matches!(
            analysis.add_line("x:5678"),
            Err(AnalysisError::Register(RegisterError::InvalidWeight(_)))
        ));
    }

    #[test]
    fn default_music_is_crus_in_the_plain_course() {
        let mut analysis = MusicAnalysis::new(Stage::MAJOR);
        let method = plain_bob_major();
        let score = analysis.analyse(&method);

        let mut crus = MusicCollection::new(Stage::MAJOR);
        crus.register("<CRUs>", 1).unwrap();
        crus.process_rows(method.course_from(&RowBuf::rounds(Stage::MAJOR)), Stroke::Hand);
        assert_eq!(score, crus.score(StrokeSet::Both));
        assert_eq!(analysis.rows_analysed(), 112);
    }

    #[test]
    fn failed_pattern_adds_no_set() {
        let rounds = RowBuf::rounds(Stage::MAJOR);
        let mut analysis = MusicAnalysis::new(Stage::MAJOR).with_node_limit(3);
        assert!(matches!(
            analysis.add_pattern(&rounds, Span::Course, "<CRUs>", 1),
            Err(AnalysisError::Register(RegisterError::PatternAllocationFailure { .. }))
        ));
        assert_eq!(analysis.sets().count(), 0);

        // With no sets, the default music is still used
        let method = plain_bob_major();
        let mut analysis = analysis.with_node_limit(DEFAULT_NODE_LIMIT);
        let exp_score = MusicAnalysis::new(Stage::MAJOR).analyse(&method);
        assert_eq!(analysis.analyse(&method), exp_score);
        assert_eq!(analysis.sets().count(), 1);

        // A failure in an existing set leaves that set alone
        let mut analysis = MusicAnalysis::new(Stage::MAJOR).with_node_limit(3);
        analysis.add_pattern(&rounds, Span::Lead, "5*", 1).unwrap();
        assert!(analysis
            .add_pattern(&rounds, Span::Lead, "<CRUs>", 1)
            .is_err());
        let sets = analysis.sets().collect_vec();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].2.len(), 1);
    }

    #[test]
    fn analysis_resets_counts() {
        let mut analysis = MusicAnalysis::new(Stage::MAJOR).with_score_strokes(StrokeSet::Back);
        analysis.add_line("course").unwrap();
        analysis.add_line("?*").unwrap();
        let method = plain_bob_major();
        // Every row matches, but only backstrokes are scored
        assert_eq!(analysis.analyse(&method), 56);
        assert_eq!(analysis.analyse(&method), 56);
        assert_eq!(analysis.rows_analysed(), 224);
    }
}
