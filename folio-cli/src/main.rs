use anyhow::Result;
use clap::{Arg, ArgAction, Command};

mod config;
mod cmd {
    pub mod build;
    pub mod check;
    pub mod show;
    pub mod tags;
    pub mod watch;
}

fn cli() -> Command {
    Command::new("folio")
        .about("Turn a folder of markdown posts into a deterministic site index")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::check::make_subcommand())
        .subcommand(cmd::show::make_subcommand())
        .subcommand(cmd::tags::make_subcommand())
        .subcommand(cmd::watch::make_subcommand())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some((name, args)) => {
            init_tracing(args.get_flag("verbose"))?;
            tracing::debug!("Running {name}");

            match name {
                "build" => cmd::build::execute(args),
                "check" => cmd::check::execute(args),
                "show" => cmd::show::execute(args),
                "tags" => cmd::tags::execute(args),
                "watch" => cmd::watch::execute(args),
                _ => unreachable!("unknown subcommand {name}"),
            }
        }
        None => unreachable!("a subcommand is required"),
    }
}
