use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::resolve_db_path;

pub fn run(db: Option<&str>) -> Result<()> {
    let db_path = resolve_db_path(db);
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `penny init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db_path)?;
    let count = |table: &str| -> Result<i64> {
        Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
    };

    println!();
    println!("Users:         {}", count("users")?);
    println!("Categories:    {}", count("categories")?);
    println!("Transactions:  {}", count("transactions")?);
    println!("Goals:         {}", count("goals")?);
    println!("Accounts:      {}", count("accounts")?);
    println!("Imports:       {}", count("imports")?);
    Ok(())
}
