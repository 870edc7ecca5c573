//! MiDinero CLI - Personal finance dashboard
//!
//! Usage:
//!   midinero init                          Initialize database
//!   midinero user add ana                  Create a user
//!   midinero import --file CSV --user ana  Import transactions
//!   midinero report predict --user ana     Predict next month's expenses
//!   midinero goal list --user ana          Show savings goals
//!   midinero serve --port 3000             Start web server

mod cli;
mod commands;


use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use midinero_core::models::CategoryType;
use midinero_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.database.path));
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, cli.no_encrypt),
        Commands::User { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None | Some(UserAction::List) => commands::cmd_users_list(&db),
                Some(UserAction::Add { username, email }) => {
                    commands::cmd_users_add(&db, &username, email.as_deref())
                }
            }
        }
        Commands::Import { file, user } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, &user)
        }
        Commands::Budget { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                BudgetAction::Set {
                    user,
                    category,
                    month,
                    limit,
                } => commands::cmd_budget_set(&db, &user, &category, &month, &limit),
                BudgetAction::List { user, month } => {
                    commands::cmd_budget_list(&db, &user, month.as_deref(), today)
                }
            }
        }
        Commands::Goal { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                GoalAction::Set {
                    user,
                    name,
                    month,
                    target,
                } => commands::cmd_goal_set(&db, &user, &name, month.as_deref(), &target, today),
                GoalAction::Add { user, id, amount } => {
                    commands::cmd_goal_add(&db, &user, id, &amount)
                }
                GoalAction::List { user } => commands::cmd_goal_list(&db, &user, today),
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            let defaults = config.dashboard;
            match report_type {
                ReportType::Overview {
                    user,
                    from,
                    to,
                    json,
                } => {
                    let period = commands::resolve_period(from.as_deref(), to.as_deref())?;
                    commands::cmd_report_overview(&db, &user, period, today, json)
                }
                ReportType::Trends { user, months, json } => commands::cmd_report_trends(
                    &db,
                    &user,
                    months.unwrap_or(defaults.trend_months),
                    today,
                    json,
                ),
                ReportType::Categories {
                    user,
                    category_type,
                    from,
                    to,
                    json,
                } => {
                    let category_type: Option<CategoryType> = category_type
                        .as_deref()
                        .map(str::parse)
                        .transpose()
                        .map_err(|e: String| anyhow::anyhow!(e))?;
                    let period = commands::resolve_period(from.as_deref(), to.as_deref())?;
                    commands::cmd_report_categories(&db, &user, category_type, period, today, json)
                }
                ReportType::Patterns { user, days, json } => commands::cmd_report_patterns(
                    &db,
                    &user,
                    days.unwrap_or(defaults.pattern_days),
                    today,
                    json,
                ),
                ReportType::Predict { user, months, json } => commands::cmd_report_predict(
                    &db,
                    &user,
                    months.unwrap_or(defaults.prediction_months),
                    today,
                    json,
                ),
                ReportType::Budgets { user, month, json } => {
                    commands::cmd_report_budgets(&db, &user, month.as_deref(), today, json)
                }
            }
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let static_dir = static_dir.or_else(|| config.server.static_dir.clone());
            commands::cmd_serve(
                &db_path,
                &config,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
