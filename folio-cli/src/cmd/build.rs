use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use folio_core::{Site, SiteBuilder};

use crate::config::FolioConfig;

/// Arguments shared by every command that runs the pipeline.
pub fn add_source_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing markdown files [default: ./content]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./folio.toml]"),
        )
        .arg(
            Arg::new("preview")
                .long("preview")
                .help("List drafts as if they were published")
                .action(ArgAction::SetTrue),
        )
}

pub fn add_build_args(command: Command) -> Command {
    add_source_args(command).arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Where to write the JSON manifest [default: ./public/manifest.json]"),
    )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the site index and write its manifest")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = FolioConfig::load(args)?;

    let site = build_site(&config)?;
    let output = config.output_path();
    site.write_manifest(&output)
        .with_context(|| format!("Failed to write manifest to {}", output.display()))?;

    println!(
        "Built {} documents ({} tags) into {}",
        site.documents().count(),
        site.tags().len(),
        output.display()
    );

    Ok(())
}

/// Run the whole pipeline for the given configuration.
pub fn build_site(config: &FolioConfig) -> Result<Site> {
    let source_dir = config.source_dir();

    SiteBuilder::new()
        .source_dir(&source_dir)
        .mode(config.build.mode)
        .pipeline_config(config.site.pipeline.clone())
        .build()
        .with_context(|| format!("Failed to build site from {}", source_dir.display()))
}
