pub mod accounts;
pub mod categories;
pub mod demo;
pub mod export;
pub mod forecast;
pub mod goals;
pub mod import;
pub mod init;
pub mod status;
pub mod transactions;
pub mod users;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::{PennyError, Result};
use crate::models::AccountKind;
use crate::settings;

/// Open (and if needed create) the database the command should work on.
/// Schema setup is idempotent, so every command can call this blindly.
pub(crate) fn open_db(db_flag: Option<&str>) -> Result<Connection> {
    let path = settings::resolve_db_path(db_flag);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = db::get_connection(&path)?;
    db::init_db(&conn)?;
    Ok(conn)
}

pub(crate) fn resolve_user(flag: Option<&str>) -> String {
    match flag {
        Some(user) => user.to_string(),
        None => settings::load_settings().default_user,
    }
}

/// Parse an `--extra "Account Name=125.00"` argument.
pub(crate) fn parse_extra(raw: &str) -> Result<(String, f64)> {
    let Some((name, amount)) = raw.split_once('=') else {
        return Err(PennyError::Other(format!(
            "invalid --extra '{raw}' (expected NAME=AMOUNT)"
        )));
    };
    let amount: f64 = amount.trim().parse().map_err(|_| {
        PennyError::Other(format!("invalid --extra amount in '{raw}'"))
    })?;
    Ok((name.trim().to_string(), amount))
}

#[derive(Parser)]
#[command(name = "penny", about = "Personal budgeting CLI with payoff forecasting.")]
pub struct Cli {
    /// Path to the database file (default: $PENNY_DB or <data_dir>/penny.db)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Penny: choose a data directory and initialize the database.
    Init {
        /// Path for Penny data (default: ~/Documents/penny)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record an income entry.
    Income {
        /// Category name
        category: String,
        /// Amount (positive)
        amount: f64,
        /// Free-form note
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Item or merchant name
        #[arg(short = 'i', long)]
        item: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Record an expense entry.
    Expense {
        /// Category name
        category: String,
        /// Amount (positive magnitude)
        amount: f64,
        /// Free-form note
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Item or merchant name
        #[arg(short = 'i', long)]
        item: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Show income, expenses and balance for one category.
    Balance {
        category: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Show overall income, expenses and net balance.
    Totals {
        #[arg(long)]
        user: Option<String>,
    },
    /// Show recent transactions, optionally for one category.
    History {
        category: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        user: Option<String>,
    },
    /// Manage spending categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage monthly spending goals.
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
    /// Manage accounts and payoff forecasts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage users.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Project the bank balance forward under the current monthly net.
    Forecast {
        /// Horizon in months
        months: u32,
        #[arg(long)]
        user: Option<String>,
    },
    /// Import a bank statement (CSV/TSV) and report recurring expenses.
    Import {
        /// Path to the statement file
        file: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Export transactions to CSV.
    Export {
        /// Output file path
        #[arg(long, default_value = "transactions.csv")]
        output: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Load sample data (categories, transactions, accounts) to explore Penny.
    Demo,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a new category.
    Add {
        name: String,
    },
    /// List all categories.
    List,
    /// Rename a category, keeping its transactions.
    Rename {
        old_name: String,
        new_name: String,
    },
    /// Delete a category and its transactions.
    Delete {
        name: String,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommands {
    /// Set (or replace) a spending goal for a category.
    Set {
        category: String,
        amount: f64,
        #[arg(long)]
        user: Option<String>,
    },
    /// Show goal vs spent for each category with a goal.
    List {
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add or update an account.
    Set {
        /// Account name, e.g. 'BofA Checking'
        name: String,
        /// Current balance (negative for debt)
        #[arg(allow_negative_numbers = true)]
        balance: f64,
        /// Scheduled monthly payment
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        payment: f64,
        /// Account kind
        #[arg(long, value_enum, default_value = "other")]
        kind: AccountKind,
        /// Annual percentage rate
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        apr: f64,
        /// Monthly escrow portion of the payment
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        escrow: f64,
        /// Monthly insurance portion of the payment
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        insurance: f64,
        /// Monthly tax portion of the payment
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        tax: f64,
    },
    /// List accounts with payoff estimates.
    List,
    /// Delete an account.
    Delete {
        name: String,
    },
    /// Split an extra-payment budget across accounts and recompute payoff.
    Payoff {
        /// Monthly budget available for extra payments
        #[arg(long, default_value_t = 0.0)]
        net: f64,
        /// Extra payment per account: NAME=AMOUNT (repeatable)
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Add a user.
    Add {
        username: String,
    },
    /// List users.
    List,
}
