use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use folio_core::slug::{permalink, slug_for};
use folio_core::{Document, Identity, load_document};
use serde::Serialize;

use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    Command::new("show")
        .about("Load a single document by identity, drafts included")
        .arg(
            Arg::new("identity")
                .value_name("IDENTITY")
                .help("Path of the document relative to the source directory")
                .required(true),
        )
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
            Arg::new("raw")
                .long("raw")
                .help("Print the document back in source form instead of JSON")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Serialize)]
struct Shown<'a> {
    url: Option<String>,
    #[serde(flatten)]
    document: &'a Document,
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let identity = Identity::new(
        args.get_one::<String>("identity")
            .context("IDENTITY is required")?
            .as_str(),
    );

    let document = load_document(config.source_dir(), &identity)
        .with_context(|| format!("Failed to load {identity}"))?;

    if args.get_flag("raw") {
        print!("{}", document.to_source()?);
        return Ok(());
    }

    let shown = Shown {
        url: slug_for(&identity).map(|slug| permalink(&config.site.pipeline.permalink_prefix, &slug)),
        document: &document,
    };
    println!("{}", serde_json::to_string_pretty(&shown)?);

    Ok(())
}
