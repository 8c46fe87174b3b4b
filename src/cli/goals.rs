use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger;

pub fn set(db: Option<&str>, category: &str, amount: f64, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let category_id = ledger::get_category_id(&conn, category)?;
    ledger::set_goal(&conn, user_id, category_id, amount)?;
    println!("Goal for {category} set to {amount:.2} for {user}.");
    Ok(())
}

pub fn list(db: Option<&str>, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let rows = ledger::get_goal_status(&conn, user_id)?;
    if rows.is_empty() {
        println!("No goals set for {user}.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Goal", "Spent", "Remaining"]);
    for status in rows {
        let remaining = status.goal - status.spent;
        let remaining_cell = if remaining < 0.0 {
            Cell::new(format!("{} over", money(-remaining)).red().to_string())
        } else {
            Cell::new(money(remaining))
        };
        table.add_row(vec![
            Cell::new(&status.category),
            Cell::new(money(status.goal)),
            Cell::new(money(status.spent)),
            remaining_cell,
        ]);
    }
    println!("Goals ({user})\n{table}");
    Ok(())
}
