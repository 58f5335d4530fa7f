//! Crate for loading and running `methscore`'s input files.  The CLI itself is a very thin wrapper
//! around this, parsing CLI args and immediately calling [`run`].

#![deny(clippy::all)]

pub mod args;
pub mod toml_file;
mod utils;

use std::{
    cmp::Reverse,
    path::Path,
    str::FromStr,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use colored::Colorize;
use itertools::Itertools;
use log::{log_enabled, LevelFilter};
use ringframe::RowBuf;
use ringing_utils::BigNumInt;
use simple_logger::SimpleLogger;

use crate::{args::Options, toml_file::TomlFile};

pub fn init_logging(log_level: LevelFilter) -> anyhow::Result<()> {
    SimpleLogger::new()
        .without_timestamps()
        .with_colors(true)
        .with_level(log_level)
        .init()
        .map_err(|e| anyhow!("Can't start logging: {}", e))
}

/// Score every method in `input_file`, returning `None` if a [`DebugOption`] stopped the run
/// early.
pub fn run(input_file: &Path, options: &Options) -> anyhow::Result<Option<Summary>> {
    let start_time = Instant::now();

    /// If the user specifies a [`DebugOption`] flag with e.g. `-D toml`, then debug print the
    /// corresponding value and exit.
    macro_rules! debug_print {
        ($variant: ident, $val: expr) => {
            if options.debug_option == Some(DebugOption::$variant) {
                dbg!($val);
                return Ok(None);
            }
        };
    }

    let toml_file =
        TomlFile::new(input_file).map_err(|e| anyhow!("Error in {:?}: {}", input_file, e))?;
    debug_print!(Toml, &toml_file);

    let methods = toml_file.methods()?;
    let mut analysis = toml_file.music_analysis(options.node_limit)?;
    debug_print!(Analysis, &analysis);

    let score_stroke = toml_file.score_stroke();
    let mut scores = Vec::with_capacity(methods.len());
    for method in &methods {
        let score = analysis.analyse(method);
        log::debug!("{} scored {}", method.name(), score);
        if log_enabled!(log::Level::Trace) {
            for (head, span, music) in analysis.sets() {
                for (pattern, count) in music.matched_patterns(score_stroke) {
                    log::trace!("  {} from {}: {}x {}", span, head, count, pattern);
                }
            }
        }
        scores.push(MethodScore {
            name: method.name().to_owned(),
            lead_head: method.lead_head().to_owned(),
            lead_len: method.lead_len(),
            course_len: method.lead_len() * method.leads_per_course(),
            score,
            counts: analysis
                .sets()
                .map(|(_, _, music)| music.count(score_stroke))
                .collect_vec(),
        });
    }
    // Sorting is stable, so equal scores stay in the order the file gave them
    scores.sort_by_key(|s| Reverse(s.score));
    if let Some(top) = options.top {
        scores.truncate(top);
    }

    let duration = Instant::now() - start_time;
    log::info!(
        "Analysed {} rows of {} methods in {:.2?}",
        BigNumInt(analysis.rows_analysed()),
        methods.len(),
        duration
    );
    Ok(Some(Summary {
        set_names: analysis
            .sets()
            .map(|(head, span, _)| match head.is_rounds() {
                true => span.to_string(),
                false => format!("{}={}", span, head),
            })
            .collect_vec(),
        scores,
        duration,
    }))
}

/// The results of scoring every method, best first
#[derive(Debug, Clone)]
pub struct Summary {
    /// The name of each music set, in the same order as [`MethodScore::counts`]
    pub set_names: Vec<String>,
    pub scores: Vec<MethodScore>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct MethodScore {
    pub name: String,
    pub lead_head: RowBuf,
    pub lead_len: usize,
    pub course_len: usize,
    pub score: i64,
    /// How many times each music set matched
    pub counts: Vec<usize>,
}

impl Summary {
    pub fn print(&self) {
        let widths = self.column_widths();
        let header = self.header(&widths);
        println!("{}", header.bold());
        println!("{}", ruleoff(&header));
        for s in &self.scores {
            println!("{}", self.method_string(s, &widths));
        }
        println!("Scored in {:.2?}", self.duration);
    }

    /// The width of every column: name, lead head, lead length, course length, score, then the
    /// count of each set
    fn column_widths(&self) -> Vec<usize> {
        fn max_width(header: &str, values: impl Iterator<Item = String>) -> usize {
            values
                .map(|v| v.chars().count())
                .fold(header.chars().count(), usize::max)
        }
        let mut widths = vec![
            max_width("method", self.scores.iter().map(|s| s.name.clone())),
            max_width("lead head", self.scores.iter().map(|s| s.lead_head.to_string())),
            max_width("lead", self.scores.iter().map(|s| s.lead_len.to_string())),
            max_width("course", self.scores.iter().map(|s| s.course_len.to_string())),
            max_width("score", self.scores.iter().map(|s| s.score.to_string())),
        ];
        for (i, name) in self.set_names.iter().enumerate() {
            widths.push(max_width(
                name,
                self.scores.iter().map(|s| s.counts[i].to_string()),
            ));
        }
        widths
    }

    fn header(&self, widths: &[usize]) -> String {
        let mut s = String::new();
        utils::write_left_aligned(&mut s, "method", widths[0]);
        let headers = ["lead head", "lead", "course", "score"]
            .into_iter()
            .chain(self.set_names.iter().map(String::as_str));
        for (text, width) in headers.zip_eq(&widths[1..]) {
            s.push_str(" | ");
            utils::write_right_aligned(&mut s, text, *width);
        }
        s
    }

    fn method_string(&self, method: &MethodScore, widths: &[usize]) -> String {
        let mut s = String::new();
        utils::write_left_aligned(&mut s, &method.name, widths[0]);
        let values = [
            method.lead_head.to_string(),
            method.lead_len.to_string(),
            method.course_len.to_string(),
            method.score.to_string(),
        ]
        .into_iter()
        .chain(method.counts.iter().map(usize::to_string));
        for (text, width) in values.zip_eq(&widths[1..]) {
            s.push_str(" | ");
            utils::write_right_aligned(&mut s, &text, *width);
        }
        s
    }
}

/// A ruleoff is the same as the header, but with every non-'|' char replaced with '-'
fn ruleoff(header: &str) -> String {
    header
        .chars()
        .map(|c| if c == '|' { '|' } else { '-' })
        .collect()
}

/// What item should be debug printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugOption {
    /// The parsed input file
    Toml,
    /// The [`MusicAnalysis`](ringframe::MusicAnalysis) built from the input file
    Analysis,
}

impl FromStr for DebugOption {
    type Err = String;

    fn from_str(v: &str) -> Result<Self, String> {
        Ok(match v.to_lowercase().as_str() {
            "toml" => Self::Toml,
            "analysis" => Self::Analysis,
            _ => {
                return Err(format!(
                    "Unknown value {:?}. Expected `toml` or `analysis`.",
                    v
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use ringframe::Stage;

    use super::*;

    fn summary() -> Summary {
        let method = |name: &str, lead_head: &str, score: i64, counts: Vec<usize>| MethodScore {
            name: name.to_owned(),
            lead_head: RowBuf::parse(lead_head).unwrap(),
            lead_len: 2 * lead_head.len(),
            course_len: 2 * lead_head.len() * (lead_head.len() - 1),
            score,
            counts,
        };
        Summary {
            set_names: vec!["course".to_owned(), "lead=132546".to_owned()],
            scores: vec![
                method("Plain Bob", "135264", 12, vec![10, 2]),
                method("Cambridge Surprise", "156342", 7, vec![5, 2]),
            ],
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn table() {
        let summary = summary();
        let widths = summary.column_widths();
        assert_eq!(widths, [18, 9, 4, 6, 5, 6, 11]);

        let header = summary.header(&widths);
        assert_eq!(
            header,
            "method             | lead head | lead | course | score | course | lead=132546"
        );
        assert_eq!(
            ruleoff(&header),
            "-------------------|-----------|------|--------|-------|--------|------------"
        );
        assert_eq!(
            summary.method_string(&summary.scores[0], &widths),
            "Plain Bob          |    135264 |   12 |     60 |    12 |     10 |           2"
        );
    }

    #[test]
    fn debug_options() {
        assert_eq!("toml".parse::<DebugOption>(), Ok(DebugOption::Toml));
        assert_eq!("Analysis".parse::<DebugOption>(), Ok(DebugOption::Analysis));
        assert!("graph".parse::<DebugOption>().is_err());
    }

    #[test]
    fn run_scores_and_sorts() {
        let path = std::env::temp_dir().join(format!("methscore-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
stage = "minor"
methods = [
    { name = "Plain Bob", place_notation = "&x16x16x16,12" },
    { name = "Cambridge Surprise", place_notation = "&x36x14x12x36x14x56,12" },
    { name = "Plain Bob again", place_notation = "x16x16x16x16x16x12" },
]
music = [{ pattern = "*56", weight = 2 }, { pattern = "65*", weight = -1, span = "lead" }]
"#,
        )
        .unwrap();

        let options = Options {
            top: Some(2),
            ..Options::default()
        };
        let summary = run(&path, &options).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(summary.set_names, ["course", "lead"]);
        assert_eq!(summary.scores.len(), 2);
        // Both spellings of Plain Bob score the same, and keep their order
        assert!(summary.scores[0].score >= summary.scores[1].score);
        let names = summary.scores.iter().map(|s| s.name.as_str()).collect_vec();
        if names[0] == "Plain Bob" {
            assert_eq!(names[1], "Plain Bob again");
            assert_eq!(summary.scores[0].score, summary.scores[1].score);
        }
        for s in &summary.scores {
            assert_eq!(s.lead_head.stage(), Stage::MINOR);
            assert_eq!(s.counts.len(), 2);
        }
    }

    #[test]
    fn debug_option_stops_early() {
        let path = std::env::temp_dir().join(format!("methscore-dbg-{}.toml", std::process::id()));
        std::fs::write(&path, "stage = 6\nmethods = []").unwrap();
        let options = Options {
            debug_option: Some(DebugOption::Toml),
            ..Options::default()
        };
        // Lowering would fail (there are no methods), but `-D toml` stops before then
        let result = run(&path, &options);
        std::fs::remove_file(&path).unwrap();
        assert!(result.unwrap().is_none());
    }
}
