use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;

pub fn add(db: Option<&str>, username: &str) -> Result<()> {
    let conn = open_db(db)?;
    let exists: bool = conn
        .prepare("SELECT 1 FROM users WHERE username = ?1")?
        .exists([username])?;
    if exists {
        println!("User '{username}' already exists.");
        return Ok(());
    }
    conn.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
    println!("User '{username}' added.");
    Ok(())
}

pub fn list(db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let mut stmt = conn.prepare(
        "SELECT u.username, COUNT(t.id) FROM users u \
         LEFT JOIN transactions t ON t.user_id = u.id \
         GROUP BY u.id ORDER BY u.username",
    )?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["User", "Transactions"]);
    for (username, count) in rows {
        table.add_row(vec![Cell::new(username), Cell::new(count)]);
    }
    println!("Users\n{table}");
    Ok(())
}
