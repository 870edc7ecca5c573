//! Test utilities for midinero-core
//!
//! Builds a throwaway database with six months of history for one user so
//! the server and CLI tests can exercise the dashboard end to end.
//!
//! Seeded data (January to June 2025, "today" is 2025-06-15):
//! - Salary: 3000.00 income on the 5th of every month
//! - Rent: 900.00 expense on the 1st of every month
//! - Food: 300.00 in January, rising by 20.00 a month to 400.00 in June
//! - June budgets: Food 350.00, Rent 1000.00, Fun 100.00

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::import::transaction_hash;
use crate::models::{CategoryType, NewTransaction, YearMonth};

/// Username of the seeded user
pub const SEED_USER: &str = "ana";

/// Reference "today" for the seeded history
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

/// Insert one transaction for a user
pub fn add_transaction(
    db: &Database,
    user_id: i64,
    date: NaiveDate,
    category: &str,
    category_type: CategoryType,
    amount: Decimal,
) -> Option<i64> {
    let import_hash = transaction_hash(&date, category, category_type, amount, "", 0);
    db.insert_transaction(
        user_id,
        &NewTransaction {
            date,
            category: category.to_string(),
            category_type,
            amount,
            description: String::new(),
            import_hash,
        },
    )
    .expect("insert transaction")
}

/// Database seeded with six months of history; returns it with the user ID
pub fn seeded_database() -> (Database, i64) {
    let db = Database::in_memory().expect("create test database");
    let user_id = db.upsert_user(SEED_USER, None).expect("create user");

    for (i, month) in (1..=6u32).enumerate() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2025, month, d).expect("valid date");
        let food = Decimal::new(300 + 20 * i as i64, 0);

        add_transaction(
            &db,
            user_id,
            day(5),
            "Salary",
            CategoryType::Income,
            Decimal::new(3000, 0),
        );
        add_transaction(
            &db,
            user_id,
            day(1),
            "Rent",
            CategoryType::Expense,
            Decimal::new(900, 0),
        );
        add_transaction(&db, user_id, day(10), "Food", CategoryType::Expense, food);
    }

    let june = YearMonth::new(2025, 6).expect("valid month");
    for (category, limit) in [("Food", 350), ("Rent", 1000), ("Fun", 100)] {
        db.set_budget(user_id, category, june, Decimal::new(limit, 0))
            .expect("set budget");
    }

    (db, user_id)
}
