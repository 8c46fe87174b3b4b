use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::ledger::{self, TxKind};

pub fn record(
    db: Option<&str>,
    kind: TxKind,
    category: &str,
    amount: f64,
    description: Option<&str>,
    item: Option<&str>,
    user: Option<&str>,
) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let category_id = ledger::get_category_id(&conn, category)?;

    let created_at = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    ledger::record_transaction(
        &conn, user_id, category_id, kind, amount, description, item, &created_at,
    )?;
    let label = match kind {
        TxKind::Income => "Income",
        TxKind::Expense => "Expense",
    };
    println!("{label} of {:.2} added to {category} for {user}.", amount.abs());

    // Recording an expense checks the category goal.
    if kind == TxKind::Expense {
        if let Some(goal) = ledger::get_goal(&conn, user_id, category_id)? {
            let spent = ledger::spent_in_category(&conn, user_id, category_id)?;
            if spent > goal {
                println!(
                    "{}",
                    format!("Warning: {user} exceeded goal for {category} ({spent:.2}/{goal:.2})")
                        .red()
                );
            }
        }
    }
    Ok(())
}

pub fn balance(db: Option<&str>, category: &str, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let category_id = ledger::get_category_id(&conn, category)?;
    let bal = ledger::get_category_balance(&conn, user_id, category_id)?;
    println!("Category: {category} ({user})");
    println!("  Income: {:.2}", bal.income);
    println!("  Expense: {:.2}", bal.expense);
    println!("  Balance: {:.2}", bal.balance);
    Ok(())
}

pub fn totals(db: Option<&str>, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let totals = ledger::get_totals(&conn, user_id)?;
    println!("Total Income: {:.2}", totals.income);
    println!("Total Expense: {:.2}", totals.expense);
    println!("Net Balance: {:.2} ({user})", totals.net);

    let bank = ledger::bank_balance(&conn)?;
    if let Some(months) = crate::forecast::months_until_depleted(bank, totals.net) {
        println!(
            "{}",
            format!("Bank balance will be negative in about {months} months.").yellow()
        );
    }
    Ok(())
}

pub fn history(
    db: Option<&str>,
    category: Option<&str>,
    limit: u32,
    user: Option<&str>,
) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let category_id = match category {
        Some(name) => Some(ledger::get_category_id(&conn, name)?),
        None => None,
    };
    let rows = ledger::get_history(&conn, user_id, category_id, limit)?;
    if rows.is_empty() {
        println!("(no transactions)");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Category", "Kind", "Amount", "Item", "Description"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.created_at),
            Cell::new(&row.category),
            Cell::new(&row.kind),
            Cell::new(format!("{:.2}", row.amount)),
            Cell::new(row.item_name.as_deref().unwrap_or("")),
            Cell::new(row.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}
