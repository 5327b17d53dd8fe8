use clap::Parser;
use finledger::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
