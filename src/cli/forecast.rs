use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_user};
use crate::error::Result;
use crate::fmt::money;
use crate::forecast::forecast_balance;
use crate::ledger;

pub fn run(db: Option<&str>, months: u32, user: Option<&str>) -> Result<()> {
    let conn = open_db(db)?;
    let user = resolve_user(user);
    let user_id = ledger::get_user_id(&conn, &user)?;
    let totals = ledger::get_totals(&conn, user_id)?;
    let bank = ledger::bank_balance(&conn)?;

    let projection = forecast_balance(bank, totals.net, months);

    println!("Bank balance: {}  Monthly net: {}", money(bank), money(totals.net));
    let mut table = Table::new();
    table.set_header(vec!["Month", "Balance"]);
    for (month, balance) in projection.series.iter().enumerate() {
        let cell = if *balance < 0.0 {
            Cell::new(money(*balance).red().to_string())
        } else {
            Cell::new(money(*balance))
        };
        table.add_row(vec![Cell::new(month), cell]);
    }
    println!("{table}");

    match projection.shortfall_month {
        Some(month) => println!(
            "{}",
            format!("Balance goes negative in month {month}.").red()
        ),
        None => println!("Balance stays positive over {months} months."),
    }
    Ok(())
}
