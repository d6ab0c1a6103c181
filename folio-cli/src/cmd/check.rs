use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::cmd::build::{add_source_args, build_site};
use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    add_source_args(Command::new("check")).about("Validate the content without writing anything")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let site = build_site(&config)?;

    let listed = site.documents().count();
    println!("mode:      {}", site.mode());
    println!("documents: {} listed, {} hidden", listed, site.loaded() - listed);
    println!("tags:      {}", site.tags().len());
    println!("series:    {}", site.series().len());
    println!("OK");

    Ok(())
}
