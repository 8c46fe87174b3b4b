//! Bank statement parsing.
//!
//! Statements arrive as delimited text (comma or tab, auto-detected) with a
//! header row naming at least Date, Description and Amount columns. A column
//! whose header mentions "category" is honored when present. Rows with an
//! unparseable date or amount are dropped here so the recurring detector and
//! the importer only ever see well-formed rows.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{PennyError, Result};
use crate::models::StatementRow;

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a currency amount, tolerating `$`, thousands separators, stray
/// quotes and parenthesized negatives.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Parse a statement date: ISO (`2024-01-05`), compact (`20240105`), or US
/// (`01/05/2024`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Statement reader
// ---------------------------------------------------------------------------

struct ColumnMap {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

fn map_header(record: &csv::StringRecord) -> Option<ColumnMap> {
    let mut date = None;
    let mut description = None;
    let mut amount = None;
    let mut category = None;
    for (i, field) in record.iter().enumerate() {
        let f = field.trim().to_lowercase();
        if f.contains("date") && date.is_none() {
            date = Some(i);
        } else if f.contains("description") && description.is_none() {
            description = Some(i);
        } else if f.contains("amount") && amount.is_none() {
            amount = Some(i);
        } else if f.contains("category") && category.is_none() {
            category = Some(i);
        }
    }
    Some(ColumnMap {
        date: date?,
        description: description?,
        amount: amount?,
        category,
    })
}

/// Guess the delimiter from the first non-empty line: tab when present,
/// comma otherwise.
fn sniff_delimiter(content: &str) -> u8 {
    match content.lines().find(|l| !l.trim().is_empty()) {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

/// Parse a statement file into well-formed rows.
pub fn parse_statement(path: &Path) -> Result<Vec<StatementRow>> {
    let content = std::fs::read_to_string(path)?;
    let delimiter = sniff_delimiter(&content);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut columns: Option<ColumnMap> = None;

    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let Some(cols) = &columns else {
            columns = map_header(&record);
            continue;
        };
        let min_cols = [cols.date, cols.description, cols.amount]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1;
        if record.len() < min_cols {
            continue;
        }
        let Some(date) = parse_date(&record[cols.date]) else {
            continue;
        };
        let Some(amount) = parse_amount(&record[cols.amount]) else {
            continue;
        };
        let description = record[cols.description].trim().to_string();
        if description.is_empty() {
            continue;
        }
        let category = cols
            .category
            .and_then(|i| record.get(i))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        rows.push(StatementRow {
            date,
            description,
            amount,
            category,
        });
    }

    if columns.is_none() {
        return Err(PennyError::MissingHeader(path.display().to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_stmt(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$-50.00"), Some(-50.0));
        assert_eq!(parse_amount("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount("\"(1,250.75)\""), Some(-1250.75));
        assert_eq!(parse_amount("0"), Some(0.0));
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_date("2024-01-05"), Some(expected));
        assert_eq!(parse_date("20240105"), Some(expected));
        assert_eq!(parse_date("01/05/2024"), Some(expected));
        assert_eq!(parse_date("05.01.2024"), None);
        assert_eq!(parse_date("13/40/2024"), None);
    }

    #[test]
    fn test_parse_comma_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n\
             2024-01-05,NETFLIX #4492,-15.99\n\
             2024-01-07,PAYCHECK,\"2,500.00\"\n",
        );
        let rows = parse_statement(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "NETFLIX #4492");
        assert_eq!(rows[0].amount, -15.99);
        assert_eq!(rows[1].amount, 2500.0);
        assert_eq!(rows[0].category, None);
    }

    #[test]
    fn test_parse_tab_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(
            dir.path(),
            "stmt.tsv",
            "Posting Date\tDescription\tAmount\n\
             01/05/2024\tGROCERY MART\t-82.13\n",
        );
        let rows = parse_statement(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "GROCERY MART");
        assert_eq!(rows[0].amount, -82.13);
    }

    #[test]
    fn test_category_column_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount,Merchant Category\n\
             20240105,NETFLIX,-15.99,Streaming\n\
             20240106,UNKNOWN VENDOR,-3.00,\n",
        );
        let rows = parse_statement(&path).unwrap();
        assert_eq!(rows[0].category.as_deref(), Some("Streaming"));
        assert_eq!(rows[1].category, None);
    }

    #[test]
    fn test_preamble_before_header_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(
            dir.path(),
            "stmt.csv",
            "Account: Checking ****1234\n\
             \n\
             Date,Description,Amount\n\
             2024-01-05,COFFEE SHOP,-4.50\n",
        );
        let rows = parse_statement(&path).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(
            dir.path(),
            "stmt.csv",
            "Date,Description,Amount\n\
             not-a-date,BAD ROW,-5.00\n\
             2024-01-05,BAD AMOUNT,abc\n\
             2024-01-05,,-5.00\n\
             2024-01-06,GOOD ROW,-5.00\n",
        );
        let rows = parse_statement(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "GOOD ROW");
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_stmt(dir.path(), "stmt.csv", "just,some,cells\n1,2,3\n");
        assert!(parse_statement(&path).is_err());
    }
}
