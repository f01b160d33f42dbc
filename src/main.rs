use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::Config;
use database::{bootstrap, close, connect, schema, verify};
use std::process::ExitCode;

mod render;

/// The main entry point for the library seeder.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Parse command-line arguments
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Bootstrap);

    // Printing the DDL needs neither configuration nor a database.
    if let Commands::Schema = command {
        print!("{}", schema::create_script());
        return Ok(ExitCode::SUCCESS);
    }

    let config = configuration::load_config().context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match command {
        Commands::Bootstrap => handle_bootstrap(&config).await,
        Commands::Verify(args) => handle_verify(&config, args).await,
        Commands::Schema => Ok(ExitCode::SUCCESS),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Drops, recreates and seeds the library tables (users, addresses, books,
/// checkouts, reviews) in PostgreSQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Defaults to `bootstrap` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop, recreate and seed every table in one transaction.
    Bootstrap,
    /// Check the live tables against the declared schema and seed data.
    Verify(VerifyArgs),
    /// Print the CREATE TABLE statements without connecting.
    Schema,
}

#[derive(Parser)]
struct VerifyArgs {
    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_bootstrap(config: &Config) -> Result<ExitCode> {
    let mut conn = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let report = bootstrap(&mut conn).await.context("Bootstrap failed")?;
    close(conn).await?;

    println!("{}", render::seed_table(&report));
    Ok(ExitCode::SUCCESS)
}

async fn handle_verify(config: &Config, args: VerifyArgs) -> Result<ExitCode> {
    let mut conn = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let report = verify(&mut conn).await.context("Verification failed")?;
    close(conn).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::verify_summary(&report));
    }

    if report.is_ok() {
        tracing::info!("Database matches the declared schema and seed data");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("Database does not match the declared schema and seed data");
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_bootstrap() {
        let cli = Cli::try_parse_from(["library-seed"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["library-seed", "verify", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Verify(VerifyArgs { json: true }))));
    }
}
