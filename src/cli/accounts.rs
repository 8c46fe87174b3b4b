use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, parse_extra};
use crate::error::{PennyError, Result};
use crate::fmt::money;
use crate::forecast::{months_to_payoff, ExtraBudget};
use crate::ledger;
use crate::models::AccountKind;

#[allow(clippy::too_many_arguments)]
pub fn set(
    db: Option<&str>,
    name: &str,
    balance: f64,
    payment: f64,
    kind: AccountKind,
    apr: f64,
    escrow: f64,
    insurance: f64,
    tax: f64,
) -> Result<()> {
    for (label, value) in [
        ("payment", payment),
        ("apr", apr),
        ("escrow", escrow),
        ("insurance", insurance),
        ("tax", tax),
    ] {
        if value < 0.0 {
            return Err(PennyError::Other(format!("{label} must be non-negative")));
        }
    }
    let conn = open_db(db)?;
    ledger::upsert_account(
        &conn, name, balance, payment, kind.as_str(), apr, escrow, insurance, tax,
    )?;
    println!("Account '{name}' set to {balance:.2} with payment {payment:.2}");
    Ok(())
}

pub fn list(db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let accounts = ledger::list_accounts(&conn)?;
    if accounts.is_empty() {
        println!("Accounts\n(none)");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Name", "Kind", "Balance", "Payment", "APR", "Months to Payoff"]);
    for account in &accounts {
        let months = months_to_payoff(
            account.balance,
            account.payment,
            account.apr,
            account.escrow,
            account.insurance,
            account.tax,
        );
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(&account.kind),
            Cell::new(money(account.balance)),
            Cell::new(money(account.payment)),
            Cell::new(format!("{:.2}%", account.apr)),
            Cell::new(months.to_string()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}

pub fn delete(db: Option<&str>, name: &str) -> Result<()> {
    let conn = open_db(db)?;
    if ledger::delete_account(&conn, name)? {
        println!("Account '{name}' deleted.");
    } else {
        println!("Account '{name}' not found.");
    }
    Ok(())
}

/// Split `net` of extra monthly payment across the debt accounts and show
/// the recomputed payoff. Extras are applied in argument order, each one
/// clamped to whatever the earlier ones left of the budget.
pub fn payoff(db: Option<&str>, net: f64, extras: &[String]) -> Result<()> {
    let conn = open_db(db)?;
    let accounts: Vec<_> = ledger::list_accounts(&conn)?
        .into_iter()
        .filter(|a| a.payment > 0.0)
        .collect();
    if accounts.is_empty() {
        println!("No accounts with a monthly payment.");
        return Ok(());
    }

    let mut budget = ExtraBudget::new(net, accounts.len());
    for arg in extras {
        let (name, amount) = parse_extra(arg)?;
        let idx = accounts
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| PennyError::UnknownAccount(name.clone()))?;
        let applied = budget.set(idx, amount);
        if applied < amount {
            println!(
                "{}",
                format!("Extra for '{name}' clamped to {applied:.2} (budget {net:.2}).").yellow()
            );
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Balance", "Payment", "Extra", "Max Extra", "Months", "With Extra"]);
    for (idx, account) in accounts.iter().enumerate() {
        let base = months_to_payoff(
            account.balance,
            account.payment,
            account.apr,
            account.escrow,
            account.insurance,
            account.tax,
        );
        let boosted = months_to_payoff(
            account.balance,
            account.payment + budget.get(idx),
            account.apr,
            account.escrow,
            account.insurance,
            account.tax,
        );
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(money(account.balance)),
            Cell::new(money(account.payment)),
            Cell::new(money(budget.get(idx))),
            Cell::new(money(budget.max_for(idx))),
            Cell::new(base.to_string()),
            Cell::new(boosted.to_string()),
        ]);
    }
    println!("Payoff plan\n{table}");
    println!(
        "Extra budget: {} allocated, {} remaining of {}",
        money(budget.allocated()),
        money(budget.remaining()),
        money(net),
    );
    Ok(())
}
