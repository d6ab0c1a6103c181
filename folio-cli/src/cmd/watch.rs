use anyhow::Result;
use clap::{ArgMatches, Command};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::cmd::build::{add_build_args, build_site};
use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("watch")).about("Build, then rebuild whenever content or config changes")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let source_dir = config.source_dir();
    let config_file = config.config_path();

    rebuild(args);

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    // Watch source directory
    debouncer
        .watcher()
        .watch(&source_dir, RecursiveMode::Recursive)?;
    tracing::info!("Watching source directory: {}", source_dir.display());

    // Watch config file if it exists
    if config_file.exists() {
        debouncer
            .watcher()
            .watch(&config_file, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching config file: {}", config_file.display());
    }

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Watch error: {e:?}");
                continue;
            }
        };

        let output = config.output_path();
        let changed: Vec<&Path> = events
            .iter()
            .map(|event| event.path.as_path())
            .filter(|path| is_input(path, &source_dir, &config_file, &output))
            .collect();
        if changed.is_empty() {
            continue;
        }

        for path in &changed {
            tracing::debug!("Changed: {}", path.display());
        }
        rebuild(args);
    }

    Ok(())
}

/// Rebuild from scratch, re-reading config so edits to it take effect.
/// A failed rebuild is reported and the watcher carries on.
fn rebuild(args: &ArgMatches) {
    let result = FolioConfig::load(args).and_then(|config| {
        let site = build_site(&config)?;
        site.write_manifest(&config.output_path())?;
        Ok(site.documents().count())
    });

    match result {
        Ok(count) => println!("Site rebuilt successfully ({count} documents)"),
        Err(e) => tracing::error!("Build error: {e:#}"),
    }
}

fn is_input(path: &Path, source_dir: &Path, config_file: &Path, output: &Path) -> bool {
    let path = absolute(path);
    if path == absolute(output) {
        return false;
    }
    path.starts_with(absolute(source_dir)) || path == absolute(config_file)
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
