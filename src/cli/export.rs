use std::path::PathBuf;

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::ledger;

pub fn run(db: Option<&str>, output: &str, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let output_path = PathBuf::from(output);
    let count = ledger::export_csv(&conn, user_id, &output_path)?;
    println!("Exported {count} transactions for {user} to {output}");
    Ok(())
}
