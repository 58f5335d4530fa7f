use std::path::Path;

use anyhow::anyhow;
use ringframe::{
    music::{MusicAnalysis, Span, DEFAULT_NODE_LIMIT},
    Method, Stage, StrokeSet,
};
use serde::Deserialize;

/// The contents of a `methscore` input file.  This is parsed directly from the TOML, and can be
/// thought of as an AST of the file.  Lowering it into [`Method`]s and a [`MusicAnalysis`] can
/// still fail, for example if a place notation is invalid.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlFile {
    /// The [`Stage`] of every method, and of the music
    stage: Stage,
    /// If set, overrides the `--node-limit` CLI argument
    node_limit: Option<usize>,
    /// Which strokes music is scored on.  Defaults to both.
    #[serde(default)]
    score_stroke: StrokeSet,

    /// The methods to score
    #[serde(default)]
    methods: Vec<TomlMethod>,
    /// The music to score them with.  If this is empty, `<CRUs>` in the plain course are used.
    #[serde(default)]
    music: Vec<TomlMusic>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlMethod {
    name: String,
    place_notation: String,
}

/// The specification for one group of music patterns
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum TomlMusic {
    Pattern {
        pattern: String,
        #[serde(flatten)]
        common: MusicCommon,
    },
    Patterns {
        patterns: Vec<String>,
        #[serde(flatten)]
        common: MusicCommon,
    },
    /// A music macro, with or without its angle brackets (e.g. `preset = "CRUs"`)
    Preset {
        preset: String,
        #[serde(flatten)]
        common: MusicCommon,
    },
    /// Raw music lines (e.g. `"2:*5678"` or `"lead=15738264"`).  These carry their own weights and
    /// spans, so take none of the common values.
    Lines { lines: Vec<String> },
}

/// Values common to all the structured variants of [`TomlMusic`]
#[derive(Debug, Clone, Deserialize)]
pub struct MusicCommon {
    #[serde(default = "crate::utils::get_one")]
    weight: i32,
    /// Which part of the method to count music in.  Defaults to the course.
    span: Option<String>,
    /// The lead head that `span` starts from.  The treble can be omitted, and the empty string
    /// means rounds.
    #[serde(default)]
    lead_head: String,
}

impl TomlFile {
    /// Load and parse a `TomlFile` from a file
    pub fn new(toml_path: &Path) -> anyhow::Result<Self> {
        let toml_buf = crate::utils::read_file_to_string(toml_path)?;
        crate::utils::parse_toml(&toml_buf)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn score_stroke(&self) -> StrokeSet {
        self.score_stroke
    }

    /// Parse every method's place notation
    pub fn methods(&self) -> anyhow::Result<Vec<Method>> {
        if self.methods.is_empty() {
            anyhow::bail!(
                "No methods specified.  Try something like \
                 `methods = [{{ name = \"Plain Bob\", place_notation = \"x18x18x18x18,12\" }}]`."
            );
        }
        self.methods
            .iter()
            .map(|m| {
                Method::from_place_notation(&m.name, self.stage, &m.place_notation)
                    .map_err(|e| anyhow!("Can't parse method {:?}: {}", m.name, e))
            })
            .collect()
    }

    /// Build a [`MusicAnalysis`] containing all the music in this file.  `cli_node_limit` is only
    /// used if the file doesn't set `node_limit`.
    pub fn music_analysis(&self, cli_node_limit: Option<usize>) -> anyhow::Result<MusicAnalysis> {
        log::debug!("Generating music analysis");
        let node_limit = self
            .node_limit
            .or(cli_node_limit)
            .unwrap_or(DEFAULT_NODE_LIMIT);
        let mut analysis = MusicAnalysis::new(self.stage)
            .with_node_limit(node_limit)
            .with_score_strokes(self.score_stroke);
        for music in &self.music {
            music.add_to(&mut analysis)?;
        }
        Ok(analysis)
    }
}

impl TomlMusic {
    fn add_to(&self, analysis: &mut MusicAnalysis) -> anyhow::Result<()> {
        let (texts, common) = match self {
            TomlMusic::Pattern { pattern, common } => (vec![pattern.clone()], common),
            TomlMusic::Patterns { patterns, common } => (patterns.clone(), common),
            TomlMusic::Preset { preset, common } => {
                let name = preset.trim().trim_start_matches('<').trim_end_matches('>');
                (vec![format!("<{}>", name)], common)
            }
            TomlMusic::Lines { lines } => {
                for line in lines.iter().filter(|l| !l.trim().is_empty()) {
                    analysis
                        .add_line(line)
                        .map_err(|e| anyhow!("Error in music line {:?}: {}", line, e))?;
                }
                return Ok(());
            }
        };

        let span = match &common.span {
            Some(s) => s.parse::<Span>()?,
            None => Span::Course,
        };
        let lead_head = analysis.parse_lead_head(&common.lead_head)?;
        for text in texts {
            analysis
                .add_pattern(&lead_head, span, &text, common.weight)
                .map_err(|e| anyhow!("Can't add music pattern {:?}: {}", text, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use ringframe::RowBuf;

    use super::*;
    use crate::utils::parse_toml;

    const PLAIN_BOB_MAJOR: &str = r#"
stage = "Major"
score_stroke = "back"
methods = [
    { name = "Plain Bob", place_notation = "&x18x18x18x18,12" },
    { name = "Little Bob", place_notation = "&x18x14,12" },
]

[[music]]
preset = "CRUs"

[[music]]
patterns = ["5678*", "*5678"]
weight = 2
span = "lead"

[[music]]
lines = ["halflead=3527486", "-1:87654321", "", "course=12345678", "<near-misses>"]
"#;

    #[test]
    fn lowering() {
        let file: TomlFile = parse_toml(PLAIN_BOB_MAJOR).unwrap();
        assert_eq!(file.stage(), Stage::MAJOR);
        assert_eq!(file.score_stroke(), StrokeSet::Back);

        let methods = file.methods().unwrap();
        assert_eq!(
            methods.iter().map(|m| m.name()).collect_vec(),
            ["Plain Bob", "Little Bob"]
        );
        assert_eq!(methods[1].lead_len(), 8);

        let analysis = file.music_analysis(None).unwrap();
        let sets = analysis
            .sets()
            .map(|(head, span, music)| (head.to_string(), span, music.len()))
            .collect_vec();
        let rounds = RowBuf::rounds(Stage::MAJOR).to_string();
        assert_eq!(
            sets,
            [
                // CRUs and the near misses from the `lines` share the plain course
                (rounds.clone(), Span::Course, 6 + 7),
                (rounds, Span::Lead, 2),
                ("13527486".to_owned(), Span::HalfLead, 1),
            ]
        );
    }

    #[test]
    fn scoring_strokes() {
        #[track_caller]
        fn check(score_stroke: &str, exp_score: i64) {
            let toml = format!(
                r#"
stage = 6
score_stroke = "{}"
methods = [{{ name = "Plain Bob", place_notation = "&x16x16x16,12" }}]
music = [{{ pattern = "123456", weight = 5 }}]
"#,
                score_stroke
            );
            let file: TomlFile = parse_toml(&toml).unwrap();
            let mut analysis = file.music_analysis(None).unwrap();
            let method = &file.methods().unwrap()[0];
            // Rounds only comes up as the 60th row of the course, which is at backstroke
            assert_eq!(analysis.analyse(method), exp_score);
        }

        check("both", 5);
        check("back", 5);
        check("hand", 0);
    }

    #[test]
    fn node_limit() {
        let toml = "stage = 8\nmethods = []\nmusic = [{ preset = \"<5678s>\" }]";
        let file: TomlFile = parse_toml(toml).unwrap();
        assert!(file.music_analysis(None).is_ok());
        let err = file.music_analysis(Some(10)).unwrap_err();
        assert!(err.to_string().contains("<5678s>"));

        let toml = format!("node_limit = 1_000\n{}", toml);
        let file: TomlFile = parse_toml(&toml).unwrap();
        assert!(file.music_analysis(Some(10)).is_ok());
    }

    #[test]
    fn errors() {
        #[track_caller]
        fn check(toml: &str, exp_msg: &str) {
            let err = parse_toml::<TomlFile>(toml)
                .and_then(|f| f.methods().and(f.music_analysis(None)))
                .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains(exp_msg), "{:?} doesn't contain {:?}", msg, exp_msg);
        }

        let pb = "methods = [{ name = \"PB\", place_notation = \"&x16x16x16,12\" }]";
        check("stage = 6\nmethod = \"Bristol\"", "unknown field");
        check("stage = \"Minorr\"", "unknown stage name");
        check("stage = 6", "No methods specified");
        check(
            "stage = 6\nmethods = [{ name = \"Bad\", place_notation = \"x1I8x\" }]",
            "Can't parse method \"Bad\"",
        );
        check(
            &format!("stage = 6\n{}\nmusic = [{{ pattern = \"*56\", span = \"half\" }}]", pb),
            "Unknown music span",
        );
        check(
            &format!("stage = 6\n{}\nmusic = [{{ preset = \"CRU\" }}]", pb),
            "Can't add music pattern \"<CRU>\"",
        );
        check(
            &format!("stage = 6\n{}\nmusic = [{{ lines = [\"lead=1x\"] }}]", pb),
            "Error in music line \"lead=1x\"",
        );
    }
}
