//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MiDinero - Personal finance dashboard
#[derive(Parser)]
#[command(name = "midinero")]
#[command(about = "Self-hosted personal finance dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the configured path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/midinero/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set MIDINERO_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage users (add, list)
    User {
        #[command(subcommand)]
        action: Option<UserAction>,
    },

    /// Import transactions from CSV
    ///
    /// Expected columns: date,category,type,amount[,description]
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// User the transactions belong to
        #[arg(short, long)]
        user: String,
    },

    /// Manage monthly budgets (set, list)
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Manage savings goals (set, add, list)
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Generate dashboard reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// Every request is served as the configured development user.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user (or update their email)
    Add {
        /// Username
        username: String,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// List users
    List,
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Set the spending limit for a category in a month
    Set {
        #[arg(short, long)]
        user: String,

        /// Expense category name
        #[arg(short, long)]
        category: String,

        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: String,

        /// Spending limit
        #[arg(short, long)]
        limit: String,
    },

    /// Show the budgets of a month (defaults to the current month)
    List {
        #[arg(short, long)]
        user: String,

        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal or change its target
    Set {
        #[arg(short, long)]
        user: String,

        /// Goal name
        #[arg(short, long)]
        name: String,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Amount to save
        #[arg(short, long)]
        target: String,
    },

    /// Set money aside for a goal
    Add {
        #[arg(short, long)]
        user: String,

        /// Goal ID (see `goal list`)
        #[arg(long)]
        id: i64,

        /// Amount to add
        #[arg(short, long)]
        amount: String,
    },

    /// Show all goals with their progress
    List {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Income and expense totals
    Overview {
        #[arg(short, long)]
        user: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Month-by-month income, expense and balance
    Trends {
        #[arg(short, long)]
        user: String,

        /// Number of months to include (1-36)
        #[arg(short, long)]
        months: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Totals per category
    Categories {
        #[arg(short, long)]
        user: String,

        /// Only one category type: income, expense
        #[arg(short = 't', long = "type")]
        category_type: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Spending by day of the week
    Patterns {
        #[arg(short, long)]
        user: String,

        /// Days to analyze (7-365)
        #[arg(short, long)]
        days: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Predict next month's expenses
    Predict {
        #[arg(short, long)]
        user: String,

        /// Months of history to analyze (3-12)
        #[arg(short, long)]
        months: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Budget health for a month
    Budgets {
        #[arg(short, long)]
        user: String,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        #[arg(long)]
        json: bool,
    },
}
