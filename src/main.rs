mod cli;
mod db;
mod error;
mod fmt;
mod forecast;
mod importer;
mod ledger;
mod models;
mod recurring;
mod settings;
mod statement;

use clap::Parser;

use cli::{AccountsCommands, CategoriesCommands, Cli, Commands, GoalsCommands, UsersCommands};
use ledger::TxKind;

fn main() {
    let cli = Cli::parse();
    let db = cli.db.as_deref();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(db, data_dir),
        Commands::Income {
            category,
            amount,
            description,
            item,
            user,
        } => cli::transactions::record(
            db,
            TxKind::Income,
            &category,
            amount,
            description.as_deref(),
            item.as_deref(),
            user.as_deref(),
        ),
        Commands::Expense {
            category,
            amount,
            description,
            item,
            user,
        } => cli::transactions::record(
            db,
            TxKind::Expense,
            &category,
            amount,
            description.as_deref(),
            item.as_deref(),
            user.as_deref(),
        ),
        Commands::Balance { category, user } => {
            cli::transactions::balance(db, &category, user.as_deref())
        }
        Commands::Totals { user } => cli::transactions::totals(db, user.as_deref()),
        Commands::History {
            category,
            limit,
            user,
        } => cli::transactions::history(db, category.as_deref(), limit, user.as_deref()),
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name } => cli::categories::add(db, &name),
            CategoriesCommands::List => cli::categories::list(db),
            CategoriesCommands::Rename { old_name, new_name } => {
                cli::categories::rename(db, &old_name, &new_name)
            }
            CategoriesCommands::Delete { name } => cli::categories::delete(db, &name),
        },
        Commands::Goals { command } => match command {
            GoalsCommands::Set {
                category,
                amount,
                user,
            } => cli::goals::set(db, &category, amount, user.as_deref()),
            GoalsCommands::List { user } => cli::goals::list(db, user.as_deref()),
        },
        Commands::Accounts { command } => match command {
            AccountsCommands::Set {
                name,
                balance,
                payment,
                kind,
                apr,
                escrow,
                insurance,
                tax,
            } => cli::accounts::set(db, &name, balance, payment, kind, apr, escrow, insurance, tax),
            AccountsCommands::List => cli::accounts::list(db),
            AccountsCommands::Delete { name } => cli::accounts::delete(db, &name),
            AccountsCommands::Payoff { net, extras } => cli::accounts::payoff(db, net, &extras),
        },
        Commands::Users { command } => match command {
            UsersCommands::Add { username } => cli::users::add(db, &username),
            UsersCommands::List => cli::users::list(db),
        },
        Commands::Forecast { months, user } => cli::forecast::run(db, months, user.as_deref()),
        Commands::Import { file, user } => cli::import::run(db, &file, user.as_deref()),
        Commands::Export { output, user } => cli::export::run(db, &output, user.as_deref()),
        Commands::Status => cli::status::run(db),
        Commands::Demo => cli::demo::run(db),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
