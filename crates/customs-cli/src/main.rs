//! Customs CLI - command-line interface for the clearance folder engine.

use anyhow::Context;
use clap::Parser;
use customs_cli::logging::{init_cli_logger, ConsoleNotifier};
use customs_cli::{commands, Cli, Config, Formatter, Session};
use customs_engine::{ClearanceEngine, Collaborators, TracingNotifier};
use customs_store::{Sha256Credentials, SqliteStore};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let store = SqliteStore::open(&config.database, &config.store)
        .with_context(|| format!("cannot open database {}", config.database.display()))?;

    let services = Collaborators::new(config.authorizer()?, Sha256Credentials);
    let services = if formatter.is_structured() {
        services.with_notifier(TracingNotifier)
    } else {
        services.with_notifier(ConsoleNotifier::new(formatter.clone()))
    };
    let engine = ClearanceEngine::with_config(store, services, config.engine.clone());

    let mut session = Session {
        engine,
        actor: config.actor()?,
        formatter,
        documents_dir: config.documents_dir.clone(),
    };

    commands::execute(cli.command, &mut session)?;
    Ok(())
}
