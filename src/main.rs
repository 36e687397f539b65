use anyhow::Result;
use clap::Parser;
use daybook::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    daybook::init_logger();
    log::debug!("Parsed command line: {:?}", cli);

    daybook::run(cli)
}
