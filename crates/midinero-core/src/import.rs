//! CSV transaction import
//!
//! Expected header: `date,category,type,amount[,description]` (any order,
//! case-insensitive). Dates are `YYYY-MM-DD` (`MM/DD/YYYY` is accepted too),
//! `type` is `income` or `expense` and amounts are positive decimals.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CategoryType, NewTransaction};
use crate::money::{parse_amount, round_money};

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    category: usize,
    category_type: usize,
    amount: usize,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing '{}' column", name)))
        };

        Ok(Self {
            date: require("date")?,
            category: require("category")?,
            category_type: require("type")?,
            amount: require("amount")?,
            description: find("description"),
        })
    }
}

/// Parse a date in `YYYY-MM-DD` or `MM/DD/YYYY` format
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map_err(|_| Error::Import(format!("Invalid date: {}", s)))
}

/// Hash identifying a transaction for deduplication
///
/// `occurrence` tells apart identical rows within the same file.
pub fn transaction_hash(
    date: &NaiveDate,
    category: &str,
    category_type: CategoryType,
    amount: Decimal,
    description: &str,
    occurrence: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(category.to_lowercase().as_bytes());
    hasher.update(category_type.as_str().as_bytes());
    hasher.update(round_money(amount).to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a CSV export into transactions
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;

        let field = |i: usize, name: &str| {
            record
                .get(i)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::Import(format!("Line {}: missing {}", line, name)))
        };

        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;
        let category = field(columns.category, "category")?.to_string();
        let category_type: CategoryType = field(columns.category_type, "type")?
            .parse()
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;
        let amount = round_money(
            parse_amount(field(columns.amount, "amount")?)
                .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?,
        );
        if amount <= Decimal::ZERO {
            return Err(Error::Import(format!(
                "Line {}: amount must be positive, got {}",
                line, amount
            )));
        }
        let description = columns
            .description
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string();

        let key = transaction_hash(&date, &category, category_type, amount, &description, 0);
        let occurrence = seen.entry(key).or_insert(0);
        let import_hash = transaction_hash(
            &date,
            &category,
            category_type,
            amount,
            &description,
            *occurrence,
        );
        *occurrence += 1;

        transactions.push(NewTransaction {
            date,
            category,
            category_type,
            amount,
            description,
            import_hash,
        });
    }

    debug!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("01/15/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("15.01.2024").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let csv = "date,category,type,amount,description
2025-01-05,Salary,income,3000.00,January pay
2025-01-06,Food,expense,\"1,120.50\",Groceries
2025-01-07,Transport,Expense,12,";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].category_type, CategoryType::Income);
        assert_eq!(transactions[1].amount, dec!(1120.50));
        assert_eq!(transactions[1].description, "Groceries");
        assert_eq!(transactions[2].category_type, CategoryType::Expense);
        assert_eq!(transactions[2].description, "");
    }

    #[test]
    fn test_columns_any_order_without_description() {
        let csv = "Amount,Type,Category,Date
25.00,expense,Food,2025-02-01";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions[0].category, "Food");
        assert_eq!(transactions[0].amount, dec!(25));
    }

    #[test]
    fn test_identical_rows_get_distinct_hashes() {
        let csv = "date,category,type,amount
2025-01-06,Coffee,expense,3.50
2025-01-06,Coffee,expense,3.50";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_ne!(transactions[0].import_hash, transactions[1].import_hash);

        // Re-parsing yields the same hashes so re-imports are skipped
        let again = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions[0].import_hash, again[0].import_hash);
        assert_eq!(transactions[1].import_hash, again[1].import_hash);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let missing_column = "date,category,amount\n2025-01-06,Food,3.50";
        assert!(matches!(
            parse_csv(missing_column.as_bytes()),
            Err(Error::Import(_))
        ));

        let negative = "date,category,type,amount\n2025-01-06,Food,expense,-3.50";
        assert!(matches!(parse_csv(negative.as_bytes()), Err(Error::Import(_))));

        let bad_type = "date,category,type,amount\n2025-01-06,Food,transfer,3.50";
        assert!(matches!(parse_csv(bad_type.as_bytes()), Err(Error::Import(_))));
    }
}
