use std::env;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ops_dashboard::access::passcode_matches;
use ops_dashboard::board::TaskFilter;
use ops_dashboard::cli::Cli;
use ops_dashboard::cmd::*;
use ops_dashboard::config::{load_config, Config};
use ops_dashboard::db::Database;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("OPSDASH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(config.log.filter.as_deref().unwrap_or("ops_dashboard=info,warn"))
    });

    let format = env::var("OPSDASH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

fn check_passcode(config: &Config, given: Option<&str>) -> Result<()> {
    let Some(secret) = config.passcode_secret() else {
        return Ok(());
    };
    match given {
        Some(given) if passcode_matches(given, &secret) => Ok(()),
        Some(_) => bail!("incorrect passcode"),
        None => bail!("a passcode is required (use --passcode or OPSDASH_PASSCODE)"),
    }
}

fn run(cli: Cli) -> Result<()> {
    // Completions need no data directory at all
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.dir.as_deref());
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let config = load_config(&data_dir)?;
    init_tracing(&config);
    tracing::debug!(dir = %data_dir.display(), "using data directory");

    if let Commands::Access { action } = cli.command {
        return cmd_access(&config, action);
    }
    check_passcode(&config, cli.passcode.as_deref())?;

    let db = Database::open(&data_dir);
    if let Commands::Init { sample, force } = cli.command {
        return cmd_init(&db, &config, sample, force);
    }
    if let Commands::Backup = cli.command {
        return cmd_backup(&db);
    }

    let mut dashboard = db.load_dashboard(config.default_revenue_target);

    match cli.command {
        Commands::Add { section, title, fields } => cmd_add(&db, &mut dashboard, section, title, fields),

        Commands::Update { id, title, fields } => cmd_update(&db, &mut dashboard, id, title, fields),

        Commands::Move { id, column, section } => cmd_move(&db, &mut dashboard, id, &column, section),

        Commands::Delete { id, section } => cmd_delete(&db, &mut dashboard, id, section),

        Commands::List { all, section, status, stage, priority, owner, deadline, sort, limit, json } => {
            let filter = TaskFilter { section, status, stage, priority, owner, deadline, all };
            cmd_list(&dashboard, filter, sort, limit, json)
        }

        Commands::View { id } => cmd_view(&dashboard, id),

        Commands::Board { section } => cmd_board(&dashboard, section),

        Commands::Summary { json } => cmd_summary(&dashboard, json),

        Commands::Settings { action } => cmd_settings(&db, &mut dashboard, action),

        Commands::Team { action } => cmd_team(&db, &mut dashboard, action),

        Commands::Export { output, section, all } => cmd_export(&dashboard, output, section, all),

        Commands::Completions { .. }
        | Commands::Access { .. }
        | Commands::Init { .. }
        | Commands::Backup => unreachable!("handled before loading the dashboard"),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
