use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use picoman::cli::{Cli, Commands};
use picoman::{PicomanContext, commands, output};
use std::io;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    if let Err(e) = run() {
        output::report(&e);
        process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "picoman=debug" } else { "picoman=warn" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_verbosity(output::verbosity_from_flags(cli.verbose, cli.quiet));

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = PicomanContext::new()?;

    match cli.command {
        Commands::Install { library, url } => {
            commands::install::execute(&mut ctx, &library, url.as_deref())?;
        }
        Commands::Add {
            project,
            library,
            target,
            dry_run,
        } => {
            commands::add::execute(&ctx, &project, &library, target.as_deref(), dry_run)?;
        }
        Commands::Remove {
            project,
            library,
            target,
            dry_run,
        } => {
            commands::remove::execute(&ctx, &project, &library, target.as_deref(), dry_run)?;
        }
        Commands::List => commands::list::execute(&ctx)?,
        Commands::Projects => commands::projects::execute(&ctx)?,
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => {
            commands::config::execute(&mut ctx, key.as_deref(), value, unset, list)?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
