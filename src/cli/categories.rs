use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::ledger::get_category_id;

pub fn add(db: Option<&str>, name: &str) -> Result<()> {
    let conn = open_db(db)?;
    if get_category_id(&conn, name).is_ok() {
        println!("Category '{name}' already exists.");
        return Ok(());
    }
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
    println!("Category '{name}' added.");
    Ok(())
}

pub fn list(db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let mut stmt = conn.prepare(
        "SELECT c.name, COUNT(t.id) FROM categories c \
         LEFT JOIN transactions t ON t.category_id = c.id \
         GROUP BY c.id ORDER BY c.name",
    )?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        println!("Categories\n(none)");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Transactions"]);
    for (name, count) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn rename(db: Option<&str>, old_name: &str, new_name: &str) -> Result<()> {
    let conn = open_db(db)?;
    get_category_id(&conn, old_name)?;
    conn.execute(
        "UPDATE categories SET name = ?1 WHERE name = ?2",
        [new_name, old_name],
    )?;
    println!("Category '{old_name}' renamed to '{new_name}'.");
    Ok(())
}

/// Deletes the category's transactions and goal rows with it; foreign keys
/// are on, so orphans would be rejected anyway.
pub fn delete(db: Option<&str>, name: &str) -> Result<()> {
    let conn = open_db(db)?;
    let Ok(category_id) = get_category_id(&conn, name) else {
        println!("Category '{name}' not found.");
        return Ok(());
    };
    conn.execute("DELETE FROM transactions WHERE category_id = ?1", [category_id])?;
    conn.execute("DELETE FROM goals WHERE category_id = ?1", [category_id])?;
    conn.execute("DELETE FROM categories WHERE id = ?1", [category_id])?;
    println!("Category '{name}' deleted.");
    Ok(())
}
