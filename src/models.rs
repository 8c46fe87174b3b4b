use chrono::NaiveDate;
use clap::ValueEnum;

/// Account kinds the forecast views know about. `Bank` balances feed the
/// depletion forecast; debt-like kinds are forecast by `months_to_payoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccountKind {
    Bank,
    CryptoWallet,
    StockAccount,
    CreditCard,
    Mortgage,
    Vehicle,
    Loan,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "Bank",
            Self::CryptoWallet => "Crypto Wallet",
            Self::StockAccount => "Stock Account",
            Self::CreditCard => "Credit Card",
            Self::Mortgage => "Mortgage",
            Self::Vehicle => "Vehicle",
            Self::Loan => "Loan",
            Self::Other => "Other",
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    pub payment: f64,
    pub kind: String,
    pub apr: f64,
    pub escrow: f64,
    pub insurance: f64,
    pub tax: f64,
}

/// Intermediate representation from the statement parser before DB insert
/// and recurring detection. Amounts are signed: expenses negative.
#[derive(Debug, Clone)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}
