use std::path::PathBuf;

use log::LevelFilter;
use structopt::StructOpt;

use crate::DebugOption;

/// A struct storing the CLI args taken by `methscore`.  `StructOpt` will generate the argument
/// parsing/help code for us.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "methscore", about = "Scores the music of change ringing methods")]
pub struct CliArgs {
    /// The name of the file listing the methods and music to score (`*.toml`)
    #[structopt(parse(from_os_str))]
    pub input_file: PathBuf,

    #[structopt(flatten)]
    pub options: Options,

    /// Makes methscore print more output (`-vv` will produce all output).
    #[structopt(short, long = "verbose", parse(from_occurrences))]
    pub verbosity: usize,
    /// Makes methscore print less output (`-qq` will only produce errors).
    #[structopt(short, long = "quiet", parse(from_occurrences))]
    pub quietness: usize,
}

// Parameters passed directly into `methscore::run`.  This isn't a doc-comment because doc comments
// override `#[structopt(about = "...")]`.
#[derive(Default, Debug, Clone, StructOpt)]
pub struct Options {
    /// The maximum number of nodes in each music trie (e.g. `500k` or `2M`).  Registering music
    /// which would exceed this is an error.  Defaults to 1M.
    #[structopt(long, parse(try_from_str = parse_big_int))]
    pub node_limit: Option<usize>,
    /// Only print the best `N` methods
    #[structopt(long = "top")]
    pub top: Option<usize>,

    /// Debug options.  `toml` and `analysis` print the corresponding data structures and stop
    /// before any methods are scored.
    #[structopt(short = "D", long)]
    pub debug_option: Option<DebugOption>,
}

impl CliArgs {
    /// Parse the `-q`/`-v` args into the [`LevelFilter`] to give to the `log` library
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity as isize - self.quietness as isize {
            x if x < -2 => LevelFilter::Off, // -qqq (or more `q`s)
            -2 => LevelFilter::Error,        // -qq
            -1 => LevelFilter::Warn,         // -q
            0 => LevelFilter::Info,          // <none of -q or -v>
            1 => LevelFilter::Debug,         // -v
            _ => LevelFilter::Trace,         // -vv (or more `v`s)
        }
    }
}

/// Parse a big integer like '100' or '140M'
pub fn parse_big_int(s: &str) -> anyhow::Result<usize> {
    let Some((last_char_idx, last_char)) = s.char_indices().last() else {
        anyhow::bail!("Expected a number, found an empty string");
    };
    let mut number_string = &s[..last_char_idx];
    let multiplier = match last_char {
        'k' | 'K' => 1_000,
        'm' | 'M' => 1_000_000,
        'g' | 'G' => 1_000_000_000,
        '0'..='9' => {
            number_string = s; // Part of the number
            1
        }
        _ => {
            return Err(anyhow::Error::msg(
                "Expected number with a multiplier from [KMG]",
            ));
        }
    };
    Ok(number_string.parse::<usize>()? * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_ints() {
        #[track_caller]
        fn check(s: &str, exp: Option<usize>) {
            assert_eq!(parse_big_int(s).ok(), exp);
        }

        check("100", Some(100));
        check("0", Some(0));
        check("2k", Some(2_000));
        check("140M", Some(140_000_000));
        check("3g", Some(3_000_000_000));
        check("", None);
        check("M", None);
        check("12x", None);
        check("1.5M", None);
        check("-4", None);
    }

    #[test]
    fn log_levels() {
        #[track_caller]
        fn check(args: &[&str], exp: LevelFilter) {
            let args = CliArgs::from_iter_safe(
                std::iter::once("methscore")
                    .chain(args.iter().copied())
                    .chain(["music.toml"]),
            )
            .unwrap();
            assert_eq!(args.log_level(), exp);
        }

        check(&[], LevelFilter::Info);
        check(&["-v"], LevelFilter::Debug);
        check(&["-vvv"], LevelFilter::Trace);
        check(&["-q"], LevelFilter::Warn);
        check(&["-qq"], LevelFilter::Error);
        check(&["-qqq"], LevelFilter::Off);
        check(&["-vq"], LevelFilter::Info);
    }

    #[test]
    fn options() {
        let args = CliArgs::from_iter_safe([
            "methscore",
            "--node-limit",
            "50k",
            "--top",
            "3",
            "-D",
            "analysis",
            "music.toml",
        ])
        .unwrap();
        assert_eq!(args.input_file, PathBuf::from("music.toml"));
        assert_eq!(args.options.node_limit, Some(50_000));
        assert_eq!(args.options.top, Some(3));
        assert_eq!(args.options.debug_option, Some(DebugOption::Analysis));

        assert!(CliArgs::from_iter_safe(["methscore", "--node-limit", "lots", "x.toml"]).is_err());
    }
}
