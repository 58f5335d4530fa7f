#![deny(clippy::all)]
#![deny(rustdoc::broken_intra_doc_links)]

use methscore::args::CliArgs;
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::from_args();
    methscore::init_logging(args.log_level())?;
    if let Some(summary) = methscore::run(&args.input_file, &args.options)? {
        summary.print();
    }
    Ok(())
}
