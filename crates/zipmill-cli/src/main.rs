//! Zipmill CLI - command-line utility for creating and reworking ZIP
//! archives.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Create(args) => commands::create::execute(args, &*formatter),
        cli::Commands::Add(args) => commands::add::execute(args, &*formatter),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Extract(args) => commands::extract::execute(args, &*formatter),
        cli::Commands::Delete(args) => commands::delete::execute(args, &*formatter),
        cli::Commands::Merge(args) => commands::merge::execute(args, &*formatter),
    }
}
