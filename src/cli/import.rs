use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::fmt::money;
use crate::importer::{import_statement, FALLBACK_CATEGORY};

pub fn run(db: Option<&str>, file: &str, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let file_path = PathBuf::from(file);

    let result = import_statement(&conn, &file_path, &user)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} imported, {} skipped (duplicates)", result.imported, result.skipped);

    if result.recurring.is_empty() {
        println!("No recurring expenses detected.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Description", "Amount", "Category"]);
    for expense in &result.recurring {
        table.add_row(vec![
            Cell::new(&expense.description),
            Cell::new(money(expense.amount)),
            Cell::new(expense.category.as_deref().unwrap_or(FALLBACK_CATEGORY)),
        ]);
    }
    println!("Recurring expenses\n{table}");
    Ok(())
}
