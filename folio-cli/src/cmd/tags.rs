use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::cmd::build::{add_source_args, build_site};
use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    add_source_args(Command::new("tags")).about("List every tag with its post count and URL")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let site = build_site(&config)?;

    if site.tags().is_empty() {
        println!("No tags");
        return Ok(());
    }

    let width = site.tags().iter().map(|(tag, _)| tag.len()).max().unwrap_or(0);
    for (tag, entry) in site.tags().iter() {
        println!("{tag:<width$}  {:>3}  {}", entry.documents.len(), entry.url);
    }

    Ok(())
}
