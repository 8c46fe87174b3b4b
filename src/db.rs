use std::path::Path;

use rusqlite::Connection;
use zeroize::Zeroize;

use crate::error::{PennyError, Result};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    kind TEXT CHECK(kind IN ('income','expense')) NOT NULL,
    description TEXT,
    item_name TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    UNIQUE(category_id, user_id),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    balance REAL NOT NULL,
    payment REAL DEFAULT 0,
    kind TEXT DEFAULT 'Other',
    apr REAL DEFAULT 0,
    escrow REAL DEFAULT 0,
    insurance REAL DEFAULT 0,
    tax REAL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    imported_at TEXT DEFAULT (datetime('now'))
);
";

pub const DEFAULT_USER: &str = "default";

/// Open the database, unlocking it first when a key applies. The key comes
/// from `PENNY_DB_KEY` or, if the file turns out to be encrypted anyway,
/// from an interactive prompt.
pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    if let Ok(key) = std::env::var("PENNY_DB_KEY") {
        apply_key(&conn, key)?;
    }
    if !readable(&conn) {
        let key = rpassword::prompt_password("Database key: ")
            .map_err(|e| PennyError::Settings(format!("could not read database key: {e}")))?;
        apply_key(&conn, key)?;
        if !readable(&conn) {
            return Err(PennyError::Settings("invalid database key".to_string()));
        }
    }
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

fn apply_key(conn: &Connection, mut key: String) -> Result<()> {
    conn.pragma_update(None, "key", &key)?;
    key.zeroize();
    Ok(())
}

fn readable(conn: &Connection) -> bool {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))
        .is_ok()
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO users (username) VALUES (?1)",
        [DEFAULT_USER],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["users", "categories", "transactions", "goals", "accounts", "imports"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let users: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }

    #[test]
    fn test_init_db_seeds_default_user() {
        let (_dir, conn) = test_db();
        let name: String = conn
            .query_row("SELECT username FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, DEFAULT_USER);
    }

    #[test]
    fn test_transaction_kind_is_checked() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO categories (name) VALUES ('Misc')", []).unwrap();
        let err = conn.execute(
            "INSERT INTO transactions (category_id, user_id, amount, kind, created_at) \
             VALUES (1, 1, 5.0, 'transfer', '2024-01-01')",
            [],
        );
        assert!(err.is_err());
    }
}
