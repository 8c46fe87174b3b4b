use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::ledger::{self, TxKind};
use crate::models::StatementRow;
use crate::recurring::{detect_recurring, RecurringExpense};
use crate::statement::parse_statement;

/// Category assigned to statement rows that carry no category label.
pub const FALLBACK_CATEGORY: &str = "Misc";

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_row(conn: &Connection, user_id: i64, row: &StatementRow) -> bool {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM transactions WHERE user_id = ?1 AND created_at = ?2 \
             AND amount = ?3 AND description = ?4",
        )
        .unwrap();
    stmt.exists(rusqlite::params![
        user_id,
        row.date.format("%Y-%m-%d").to_string(),
        row.amount,
        row.description,
    ])
    .unwrap_or(false)
}

pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub duplicate_file: bool,
    /// Expenses recurring across distinct months in the parsed statement.
    pub recurring: Vec<RecurringExpense>,
}

/// Import a statement file as transactions for `username`.
///
/// A file already imported (same checksum) is rejected wholesale; rows that
/// already exist (same date, amount, description) are skipped individually,
/// so overlapping statements can be imported back to back. Rows with a
/// category column keep their label; everything else lands in "Misc".
pub fn import_statement(conn: &Connection, file_path: &Path, username: &str) -> Result<ImportResult> {
    let user_id = ledger::get_user_id(conn, username)?;

    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            return Ok(ImportResult {
                imported: 0,
                skipped: 0,
                duplicate_file: true,
                recurring: Vec::new(),
            });
        }
    }

    let rows = parse_statement(file_path)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for row in &rows {
        if is_duplicate_row(conn, user_id, row) {
            skipped += 1;
            continue;
        }
        let label = row.category.as_deref().unwrap_or(FALLBACK_CATEGORY);
        let category_id = ledger::get_or_create_category(conn, label)?;
        let kind = if row.amount >= 0.0 { TxKind::Income } else { TxKind::Expense };
        ledger::record_transaction(
            conn,
            user_id,
            category_id,
            kind,
            row.amount.abs(),
            Some(&row.description),
            None,
            &row.date.format("%Y-%m-%d").to_string(),
        )?;
        imported += 1;
    }

    let dates: Vec<String> = rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
    conn.execute(
        "INSERT INTO imports (filename, checksum, record_count, date_range_start, date_range_end) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            checksum,
            rows.len() as i64,
            dates.iter().min(),
            dates.iter().max(),
        ],
    )?;

    // Recurring detection targets expenses only; monthly paychecks are not
    // recurring expenses.
    let expenses: Vec<StatementRow> = rows.into_iter().filter(|r| r.amount < 0.0).collect();
    let recurring = detect_recurring(&expenses);

    Ok(ImportResult {
        imported,
        skipped,
        duplicate_file: false,
        recurring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db, DEFAULT_USER};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn write_stmt(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("Date,Description,Amount,Category\n{body}")).unwrap();
        path
    }

    #[test]
    fn test_import_inserts_signed_transactions() {
        let (dir, conn) = test_db();
        let path = write_stmt(
            dir.path(),
            "jan.csv",
            "2024-01-05,NETFLIX #4492,-15.99,Streaming\n\
             2024-01-07,PAYCHECK,2500.00,Salary\n",
        );
        let result = import_statement(&conn, &path, DEFAULT_USER).unwrap();
        assert_eq!(result.imported, 2);
        assert!(!result.duplicate_file);

        let (amount, kind): (f64, String) = conn
            .query_row(
                "SELECT amount, kind FROM transactions WHERE description = 'NETFLIX #4492'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(amount, -15.99);
        assert_eq!(kind, "expense");

        let kind: String = conn
            .query_row(
                "SELECT kind FROM transactions WHERE description = 'PAYCHECK'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(kind, "income");
    }

    #[test]
    fn test_import_uses_fallback_category() {
        let (dir, conn) = test_db();
        let path = dir.path().join("jan.csv");
        std::fs::write(&path, "Date,Description,Amount\n2024-01-05,MYSTERY CHARGE,-9.99\n").unwrap();
        import_statement(&conn, &path, DEFAULT_USER).unwrap();
        let category: String = conn
            .query_row(
                "SELECT c.name FROM transactions t JOIN categories c ON t.category_id = c.id",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(category, FALLBACK_CATEGORY);
    }

    #[test]
    fn test_duplicate_file_is_rejected() {
        let (dir, conn) = test_db();
        let path = write_stmt(dir.path(), "jan.csv", "2024-01-05,COFFEE,-4.50,\n");
        let first = import_statement(&conn, &path, DEFAULT_USER).unwrap();
        assert_eq!(first.imported, 1);
        let second = import_statement(&conn, &path, DEFAULT_USER).unwrap();
        assert!(second.duplicate_file);
        assert_eq!(second.imported, 0);
    }

    #[test]
    fn test_overlapping_rows_are_skipped() {
        let (dir, conn) = test_db();
        let jan = write_stmt(
            dir.path(),
            "jan.csv",
            "2024-01-05,COFFEE,-4.50,\n2024-01-20,RENT,-900.00,\n",
        );
        import_statement(&conn, &jan, DEFAULT_USER).unwrap();
        let overlap = write_stmt(
            dir.path(),
            "jan-feb.csv",
            "2024-01-20,RENT,-900.00,\n2024-02-20,RENT,-900.00,\n",
        );
        let result = import_statement(&conn, &overlap, DEFAULT_USER).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_recurring_reported_for_expenses_only() {
        let (dir, conn) = test_db();
        let path = write_stmt(
            dir.path(),
            "q1.csv",
            "2024-01-05,NETFLIX #4492,-15.99,Streaming\n\
             2024-02-05,NETFLIX #7731,-15.99,Streaming\n\
             2024-01-15,PAYCHECK,2500.00,\n\
             2024-02-15,PAYCHECK,2500.00,\n\
             2024-01-10,COFFEE SHOP,-4.50,\n",
        );
        let result = import_statement(&conn, &path, DEFAULT_USER).unwrap();
        assert_eq!(result.recurring.len(), 1);
        assert_eq!(result.recurring[0].description, "NETFLIX #4492");
        assert_eq!(result.recurring[0].category.as_deref(), Some("Streaming"));
    }

    #[test]
    fn test_import_records_audit_row() {
        let (dir, conn) = test_db();
        let path = write_stmt(dir.path(), "jan.csv", "2024-01-05,COFFEE,-4.50,\n");
        import_statement(&conn, &path, DEFAULT_USER).unwrap();
        let (filename, count): (String, i64) = conn
            .query_row(
                "SELECT filename, record_count FROM imports",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(filename, "jan.csv");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unknown_user_fails() {
        let (dir, conn) = test_db();
        let path = write_stmt(dir.path(), "jan.csv", "2024-01-05,COFFEE,-4.50,\n");
        assert!(import_statement(&conn, &path, "nobody").is_err());
    }
}
