//! CLI entry point - the composition root.
//!
//! Parses arguments, wires the reservation service via `bootstrap` and
//! dispatches to handlers. The main task doubles as the origin context.

use clap::{CommandFactory, Parser};

use savepath_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, init_tracing};

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let mut ctx = bootstrap(CliConfig::from_cli(&cli))?;

    match command {
        Commands::Reserve(args) => handlers::reserve::execute(&mut ctx, args).await?,
        Commands::Candidates { path, count } => handlers::candidates::execute(&ctx, path, *count)?,
        Commands::Prompt(args) => handlers::prompt::execute(&mut ctx, args).await?,
        Commands::Config => handlers::config::execute(&ctx)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads SAVEPATH_* defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        eprintln!("Error: {err}");
        std::process::exit(code);
    }
    Ok(())
}
