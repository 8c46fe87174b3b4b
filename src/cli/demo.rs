use chrono::{Datelike, Local};

use crate::cli::open_db;
use crate::db::DEFAULT_USER;
use crate::error::Result;
use crate::ledger::{self, TxKind};
use crate::models::AccountKind;

struct DemoTxn {
    day: u32,
    category: &'static str,
    kind: TxKind,
    amount: f64,
    item: &'static str,
}

/// Generated for each of the last three months.
const MONTHLY: &[DemoTxn] = &[
    DemoTxn { day: 1, category: "Salary", kind: TxKind::Income, amount: 4200.00, item: "Paycheck" },
    DemoTxn { day: 1, category: "Housing", kind: TxKind::Expense, amount: 1450.00, item: "Rent" },
    DemoTxn { day: 5, category: "Streaming", kind: TxKind::Expense, amount: 15.99, item: "NETFLIX" },
    DemoTxn { day: 7, category: "Utilities", kind: TxKind::Expense, amount: 84.50, item: "City Power" },
    DemoTxn { day: 12, category: "Groceries", kind: TxKind::Expense, amount: 210.34, item: "Grocery Mart" },
    DemoTxn { day: 19, category: "Groceries", kind: TxKind::Expense, amount: 164.80, item: "Grocery Mart" },
];

/// One-off purchases cycled across the three months.
const ONE_OFFS: &[DemoTxn] = &[
    DemoTxn { day: 9, category: "Dining", kind: TxKind::Expense, amount: 42.75, item: "Thai Garden" },
    DemoTxn { day: 16, category: "Dining", kind: TxKind::Expense, amount: 28.10, item: "Corner Deli" },
    DemoTxn { day: 23, category: "Misc", kind: TxKind::Expense, amount: 63.99, item: "Hardware Store" },
];

struct DemoAccount {
    name: &'static str,
    balance: f64,
    payment: f64,
    kind: AccountKind,
    apr: f64,
    escrow: f64,
    insurance: f64,
    tax: f64,
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        name: "Checking", balance: 3500.00, payment: 0.0, kind: AccountKind::Bank,
        apr: 0.0, escrow: 0.0, insurance: 0.0, tax: 0.0,
    },
    DemoAccount {
        name: "Visa", balance: -1800.00, payment: 75.0, kind: AccountKind::CreditCard,
        apr: 19.9, escrow: 0.0, insurance: 0.0, tax: 0.0,
    },
    DemoAccount {
        name: "Mortgage", balance: -240_000.00, payment: 1950.0, kind: AccountKind::Mortgage,
        apr: 6.5, escrow: 210.0, insurance: 90.0, tax: 180.0,
    },
];

const GOALS: &[(&str, f64)] = &[("Groceries", 400.0), ("Dining", 150.0)];

fn month_back(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let total = year as u32 * 12 + (month - 1) - offset;
    ((total / 12) as i32, total % 12 + 1)
}

pub fn run(db: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user_id = ledger::get_user_id(&conn, DEFAULT_USER)?;
    let today = Local::now().date_naive();

    let mut inserted = 0usize;
    for offset in (0u32..3).rev() {
        let (year, month) = month_back(today.year(), today.month(), offset);
        for txn in MONTHLY {
            insert(&conn, user_id, year, month, txn)?;
            inserted += 1;
        }
        let one_off = &ONE_OFFS[offset as usize % ONE_OFFS.len()];
        insert(&conn, user_id, year, month, one_off)?;
        inserted += 1;
    }

    for account in ACCOUNTS {
        ledger::upsert_account(
            &conn,
            account.name,
            account.balance,
            account.payment,
            account.kind.as_str(),
            account.apr,
            account.escrow,
            account.insurance,
            account.tax,
        )?;
    }

    for (category, amount) in GOALS {
        let category_id = ledger::get_or_create_category(&conn, category)?;
        ledger::set_goal(&conn, user_id, category_id, *amount)?;
    }

    println!(
        "Demo data loaded: {} transactions, {} accounts, {} goals.",
        inserted,
        ACCOUNTS.len(),
        GOALS.len()
    );
    println!("Try `penny totals`, `penny accounts list`, or `penny forecast 12`.");
    Ok(())
}

fn insert(
    conn: &rusqlite::Connection,
    user_id: i64,
    year: i32,
    month: u32,
    txn: &DemoTxn,
) -> Result<()> {
    let category_id = ledger::get_or_create_category(conn, txn.category)?;
    ledger::record_transaction(
        conn,
        user_id,
        category_id,
        txn.kind,
        txn.amount,
        None,
        Some(txn.item),
        &format!("{year:04}-{month:02}-{:02}", txn.day),
    )
}
