//! Query layer over the budget database.
//!
//! Amounts are stored signed: income positive, expenses negative. The
//! `kind` column always agrees with the sign; report structs convert
//! expense sums back to positive figures for display.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{PennyError, Result};
use crate::models::Account;

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn get_user_id(conn: &Connection, username: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM users WHERE username = ?1", [username], |r| r.get(0))
        .map_err(|_| PennyError::UnknownUser(username.to_string()))
}

pub fn get_category_id(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM categories WHERE name = ?1", [name], |r| r.get(0))
        .map_err(|_| PennyError::UnknownCategory(name.to_string()))
}

pub fn get_or_create_category(conn: &Connection, name: &str) -> Result<i64> {
    if let Ok(id) = get_category_id(conn, name) {
        return Ok(id);
    }
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign a magnitude per the storage convention.
    pub fn signed(&self, magnitude: f64) -> f64 {
        match self {
            Self::Income => magnitude.abs(),
            Self::Expense => -magnitude.abs(),
        }
    }
}

pub fn record_transaction(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    kind: TxKind,
    magnitude: f64,
    description: Option<&str>,
    item_name: Option<&str>,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (category_id, user_id, amount, kind, description, item_name, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            category_id,
            user_id,
            kind.signed(magnitude),
            kind.as_str(),
            description,
            item_name,
            created_at,
        ],
    )?;
    Ok(())
}

pub struct HistoryRow {
    pub category: String,
    pub amount: f64,
    pub kind: String,
    pub description: Option<String>,
    pub item_name: Option<String>,
    pub created_at: String,
}

pub fn get_history(
    conn: &Connection,
    user_id: i64,
    category_id: Option<i64>,
    limit: u32,
) -> Result<Vec<HistoryRow>> {
    let sql = if category_id.is_some() {
        "SELECT c.name, t.amount, t.kind, t.description, t.item_name, t.created_at \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.user_id = ?1 AND t.category_id = ?2 \
         ORDER BY t.created_at DESC LIMIT ?3"
    } else {
        "SELECT c.name, t.amount, t.kind, t.description, t.item_name, t.created_at \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.user_id = ?1 \
         ORDER BY t.created_at DESC LIMIT ?2"
    };
    let mut stmt = conn.prepare(sql)?;
    let map_row = |row: &rusqlite::Row<'_>| {
        Ok(HistoryRow {
            category: row.get(0)?,
            amount: row.get(1)?,
            kind: row.get(2)?,
            description: row.get(3)?,
            item_name: row.get(4)?,
            created_at: row.get(5)?,
        })
    };
    let rows = match category_id {
        Some(cat) => stmt
            .query_map(rusqlite::params![user_id, cat, limit], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(rusqlite::params![user_id, limit], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Totals & balances
// ---------------------------------------------------------------------------

/// Overall figures for a user. `expense` is reported as a positive
/// magnitude; `net` is income minus expenses.
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

pub fn get_totals(conn: &Connection, user_id: i64) -> Result<Totals> {
    let (income, expense) = sum_by_kind(conn, user_id, None)?;
    Ok(Totals {
        income,
        expense,
        net: income - expense,
    })
}

pub struct CategoryBalance {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

pub fn get_category_balance(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
) -> Result<CategoryBalance> {
    let (income, expense) = sum_by_kind(conn, user_id, Some(category_id))?;
    Ok(CategoryBalance {
        income,
        expense,
        balance: income - expense,
    })
}

fn sum_by_kind(conn: &Connection, user_id: i64, category_id: Option<i64>) -> Result<(f64, f64)> {
    let sql = match category_id {
        Some(_) => {
            "SELECT kind, SUM(amount) FROM transactions \
             WHERE user_id = ?1 AND category_id = ?2 GROUP BY kind"
        }
        None => "SELECT kind, SUM(amount) FROM transactions WHERE user_id = ?1 GROUP BY kind",
    };
    let mut stmt = conn.prepare(sql)?;
    let map_row = |row: &rusqlite::Row<'_>| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    };
    let sums: Vec<(String, f64)> = match category_id {
        Some(cat) => stmt
            .query_map(rusqlite::params![user_id, cat], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([user_id], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    let mut income = 0.0;
    let mut expense = 0.0;
    for (kind, total) in sums {
        match kind.as_str() {
            "income" => income = total,
            // Stored negative; report the magnitude.
            "expense" => expense = -total,
            _ => {}
        }
    }
    Ok((income, expense))
}

/// Total spent in a category, as a positive magnitude. Used for goal checks.
pub fn spent_in_category(conn: &Connection, user_id: i64, category_id: i64) -> Result<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM transactions \
         WHERE user_id = ?1 AND category_id = ?2 AND kind = 'expense'",
        rusqlite::params![user_id, category_id],
        |r| r.get(0),
    )?;
    Ok(-total)
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

pub fn set_goal(conn: &Connection, user_id: i64, category_id: i64, amount: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO goals (category_id, user_id, amount) VALUES (?1, ?2, ?3) \
         ON CONFLICT(category_id, user_id) DO UPDATE SET amount = excluded.amount",
        rusqlite::params![category_id, user_id, amount],
    )?;
    Ok(())
}

pub fn get_goal(conn: &Connection, user_id: i64, category_id: i64) -> Result<Option<f64>> {
    let goal = conn
        .query_row(
            "SELECT amount FROM goals WHERE user_id = ?1 AND category_id = ?2",
            rusqlite::params![user_id, category_id],
            |r| r.get(0),
        )
        .map(Some)
        .unwrap_or(None);
    Ok(goal)
}

pub struct GoalStatus {
    pub category: String,
    pub goal: f64,
    pub spent: f64,
}

pub fn get_goal_status(conn: &Connection, user_id: i64) -> Result<Vec<GoalStatus>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, g.amount, \
                COALESCE(-(SELECT SUM(t.amount) FROM transactions t \
                           WHERE t.category_id = g.category_id AND t.user_id = g.user_id \
                           AND t.kind = 'expense'), 0) \
         FROM goals g JOIN categories c ON g.category_id = c.id \
         WHERE g.user_id = ?1 ORDER BY c.name",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(GoalStatus {
                category: row.get(0)?,
                goal: row.get(1)?,
                spent: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn upsert_account(
    conn: &Connection,
    name: &str,
    balance: f64,
    payment: f64,
    kind: &str,
    apr: f64,
    escrow: f64,
    insurance: f64,
    tax: f64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO accounts (name, balance, payment, kind, apr, escrow, insurance, tax) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT(name) DO UPDATE SET balance = excluded.balance, \
         payment = excluded.payment, kind = excluded.kind, apr = excluded.apr, \
         escrow = excluded.escrow, insurance = excluded.insurance, tax = excluded.tax",
        rusqlite::params![name, balance, payment, kind, apr, escrow, insurance, tax],
    )?;
    Ok(())
}

pub fn delete_account(conn: &Connection, name: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM accounts WHERE name = ?1", [name])?;
    Ok(deleted > 0)
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, balance, payment, kind, apr, escrow, insurance, tax \
         FROM accounts ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
                balance: row.get(2)?,
                payment: row.get(3)?,
                kind: row.get(4)?,
                apr: row.get(5)?,
                escrow: row.get(6)?,
                insurance: row.get(7)?,
                tax: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Sum of all bank account balances, the figure the depletion forecast
/// projects forward.
pub fn bank_balance(conn: &Connection) -> Result<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(balance), 0) FROM accounts WHERE kind = 'Bank'",
        [],
        |r| r.get(0),
    )?;
    Ok(total)
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

pub fn export_csv(conn: &Connection, user_id: i64, output: &Path) -> Result<usize> {
    let mut stmt = conn.prepare(
        "SELECT c.name, t.amount, t.kind, t.description, t.item_name, t.created_at \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.user_id = ?1 ORDER BY t.created_at ASC",
    )?;
    let rows: Vec<(String, f64, String, Option<String>, Option<String>, String)> = stmt
        .query_map([user_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["category", "amount", "kind", "description", "item_name", "created_at"])?;
    for (category, amount, kind, description, item_name, created_at) in &rows {
        let amount_field = format!("{amount:.2}");
        writer.write_record([
            category.as_str(),
            amount_field.as_str(),
            kind.as_str(),
            description.as_deref().unwrap_or(""),
            item_name.as_deref().unwrap_or(""),
            created_at.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(rows.len())
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

    fn seed(conn: &Connection) -> (i64, i64) {
        let user_id = get_user_id(conn, DEFAULT_USER).unwrap();
        let cat_id = get_or_create_category(conn, "Groceries").unwrap();
        (user_id, cat_id)
    }

    #[test]
    fn test_unknown_lookups_fail() {
        let (_dir, conn) = test_db();
        assert!(get_user_id(&conn, "nobody").is_err());
        assert!(get_category_id(&conn, "Nothing").is_err());
    }

    #[test]
    fn test_get_or_create_category_is_idempotent() {
        let (_dir, conn) = test_db();
        let a = get_or_create_category(&conn, "Food").unwrap();
        let b = get_or_create_category(&conn, "Food").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_expenses_are_stored_negative() {
        let (_dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        record_transaction(&conn, user_id, cat_id, TxKind::Expense, 60.0, None, None, "2024-01-05").unwrap();
        let stored: f64 = conn
            .query_row("SELECT amount FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, -60.0);
    }

    #[test]
    fn test_totals_and_net() {
        let (_dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        record_transaction(&conn, user_id, cat_id, TxKind::Income, 1500.0, None, None, "2024-01-01").unwrap();
        record_transaction(&conn, user_id, cat_id, TxKind::Expense, 500.0, None, None, "2024-01-02").unwrap();
        let totals = get_totals(&conn, user_id).unwrap();
        assert_eq!(totals.income, 1500.0);
        assert_eq!(totals.expense, 500.0);
        assert_eq!(totals.net, 1000.0);
    }

    #[test]
    fn test_category_balance() {
        let (_dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        let other = get_or_create_category(&conn, "Other").unwrap();
        record_transaction(&conn, user_id, cat_id, TxKind::Income, 1000.0, None, None, "2024-01-01").unwrap();
        record_transaction(&conn, user_id, cat_id, TxKind::Expense, 200.0, None, None, "2024-01-02").unwrap();
        record_transaction(&conn, user_id, other, TxKind::Expense, 999.0, None, None, "2024-01-02").unwrap();
        let bal = get_category_balance(&conn, user_id, cat_id).unwrap();
        assert_eq!(bal.income, 1000.0);
        assert_eq!(bal.expense, 200.0);
        assert_eq!(bal.balance, 800.0);
    }

    #[test]
    fn test_goal_roundtrip_and_status() {
        let (_dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        set_goal(&conn, user_id, cat_id, 50.0).unwrap();
        set_goal(&conn, user_id, cat_id, 75.0).unwrap();
        assert_eq!(get_goal(&conn, user_id, cat_id).unwrap(), Some(75.0));

        record_transaction(&conn, user_id, cat_id, TxKind::Expense, 60.0, None, None, "2024-01-05").unwrap();
        let status = get_goal_status(&conn, user_id).unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].goal, 75.0);
        assert_eq!(status[0].spent, 60.0);
    }

    #[test]
    fn test_history_respects_limit_and_category() {
        let (_dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        let other = get_or_create_category(&conn, "Rent").unwrap();
        for day in 1..=5 {
            record_transaction(
                &conn, user_id, cat_id, TxKind::Expense, day as f64,
                Some("snack"), None, &format!("2024-01-{day:02}"),
            ).unwrap();
        }
        record_transaction(&conn, user_id, other, TxKind::Expense, 900.0, None, None, "2024-01-06").unwrap();

        let all = get_history(&conn, user_id, None, 3).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].created_at, "2024-01-06");

        let only = get_history(&conn, user_id, Some(other), 10).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].category, "Rent");
    }

    #[test]
    fn test_bank_balance_sums_bank_accounts_only() {
        let (_dir, conn) = test_db();
        upsert_account(&conn, "Checking", 1200.0, 0.0, "Bank", 0.0, 0.0, 0.0, 0.0).unwrap();
        upsert_account(&conn, "Savings", 800.0, 0.0, "Bank", 0.0, 0.0, 0.0, 0.0).unwrap();
        upsert_account(&conn, "Visa", -500.0, 50.0, "Credit Card", 19.9, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(bank_balance(&conn).unwrap(), 2000.0);
    }

    #[test]
    fn test_upsert_account_updates_in_place() {
        let (_dir, conn) = test_db();
        upsert_account(&conn, "Visa", -500.0, 50.0, "Credit Card", 19.9, 0.0, 0.0, 0.0).unwrap();
        upsert_account(&conn, "Visa", -400.0, 75.0, "Credit Card", 17.0, 0.0, 0.0, 0.0).unwrap();
        let accounts = list_accounts(&conn).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, -400.0);
        assert_eq!(accounts[0].payment, 75.0);
        assert_eq!(accounts[0].apr, 17.0);
    }

    #[test]
    fn test_delete_account() {
        let (_dir, conn) = test_db();
        upsert_account(&conn, "Visa", -500.0, 50.0, "Credit Card", 19.9, 0.0, 0.0, 0.0).unwrap();
        assert!(delete_account(&conn, "Visa").unwrap());
        assert!(!delete_account(&conn, "Visa").unwrap());
    }

    #[test]
    fn test_export_csv_writes_all_rows() {
        let (dir, conn) = test_db();
        let (user_id, cat_id) = seed(&conn);
        record_transaction(&conn, user_id, cat_id, TxKind::Income, 100.0, Some("pay"), None, "2024-01-01").unwrap();
        record_transaction(&conn, user_id, cat_id, TxKind::Expense, 40.0, None, Some("apples"), "2024-01-02").unwrap();

        let out = dir.path().join("out.csv");
        let count = export_csv(&conn, user_id, &out).unwrap();
        assert_eq!(count, 2);
        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("category"));
        assert!(lines[2].contains("-40.00"));
        assert!(lines[2].contains("apples"));
    }
}
