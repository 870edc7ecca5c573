//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(day: NaiveDate, category: &str, kind: CategoryType, amount: Decimal) -> NewTransaction {
        NewTransaction {
            date: day,
            category: category.to_string(),
            category_type: kind,
            amount,
            description: String::new(),
            import_hash: format!("{}|{}|{}|{}", day, category, kind, amount),
        }
    }

    fn seeded() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("ana", None).unwrap();

        let rows = [
            tx(date(2025, 1, 5), "Salary", CategoryType::Income, dec!(3000)),
            tx(date(2025, 1, 6), "Food", CategoryType::Expense, dec!(120.50)),
            tx(date(2025, 1, 20), "Rent", CategoryType::Expense, dec!(900)),
            tx(date(2025, 2, 5), "Salary", CategoryType::Income, dec!(3000)),
            tx(date(2025, 2, 7), "Food", CategoryType::Expense, dec!(80.25)),
            tx(date(2025, 2, 8), "Food", CategoryType::Expense, dec!(45)),
            tx(date(2025, 2, 21), "Rent", CategoryType::Expense, dec!(900)),
        ];
        for row in &rows {
            db.insert_transaction(user, row).unwrap();
        }

        (db, user)
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_user_upsert() {
        let db = Database::in_memory().unwrap();

        let id = db.upsert_user("ana", Some("ana@example.com")).unwrap();
        assert!(id > 0);

        // Upsert same user returns same ID
        let id2 = db.upsert_user("ana", None).unwrap();
        assert_eq!(id, id2);

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
        assert_eq!(db.get_user_by_username("ana").unwrap().unwrap().id, id);
    }

    #[test]
    fn test_category_unique_per_type() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("ana", None).unwrap();

        let expense = db
            .upsert_category(user, "Gifts", CategoryType::Expense)
            .unwrap();
        let income = db.upsert_category(user, "Gifts", CategoryType::Income).unwrap();
        assert_ne!(expense, income);
        assert_eq!(
            db.upsert_category(user, " Gifts ", CategoryType::Expense)
                .unwrap(),
            expense
        );
        assert!(db.upsert_category(user, "  ", CategoryType::Expense).is_err());

        assert_eq!(db.list_categories(user).unwrap().len(), 2);
        let found = db.find_category(user, "gifts").unwrap().unwrap();
        assert_eq!(found.category_type, CategoryType::Expense);
    }

    #[test]
    fn test_insert_transaction_deduplicates() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("ana", None).unwrap();
        let row = tx(date(2025, 1, 6), "Food", CategoryType::Expense, dec!(10));

        assert!(db.insert_transaction(user, &row).unwrap().is_some());
        assert!(db.insert_transaction(user, &row).unwrap().is_none());
        assert_eq!(db.count_transactions(user).unwrap(), 1);
    }

    #[test]
    fn test_insert_transaction_rejects_non_positive() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("ana", None).unwrap();
        let row = tx(date(2025, 1, 6), "Food", CategoryType::Expense, dec!(-10));

        assert!(db.insert_transaction(user, &row).is_err());
    }

    #[test]
    fn test_monthly_aggregates() {
        let (db, user) = seeded();

        let months = db
            .monthly_aggregates(user, date(2025, 1, 1), date(2025, 2, 28))
            .unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, YearMonth::new(2025, 1).unwrap());
        assert_eq!(months[0].total_income, dec!(3000));
        assert_eq!(months[0].total_expense, dec!(1020.50));
        assert_eq!(months[0].transaction_count, 3);
        assert_eq!(months[1].total_expense, dec!(1025.25));

        // Range excludes January
        let feb = db
            .monthly_aggregates(user, date(2025, 2, 1), date(2025, 2, 28))
            .unwrap();
        assert_eq!(feb.len(), 1);
    }

    #[test]
    fn test_category_aggregates_filters() {
        let (db, user) = seeded();

        let expenses = db
            .category_aggregates(user, Some(CategoryType::Expense), None, None)
            .unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].category_name, "Rent");
        assert_eq!(expenses[0].total, dec!(1800));
        assert_eq!(expenses[1].category_name, "Food");
        assert_eq!(expenses[1].transaction_count, 3);
        assert_eq!(expenses[1].average.round_dp(2), dec!(81.92));

        let all = db.category_aggregates(user, None, None, None).unwrap();
        assert_eq!(all.len(), 3);

        let january = db
            .category_aggregates(user, None, Some(date(2025, 1, 1)), Some(date(2025, 1, 31)))
            .unwrap();
        assert_eq!(january.iter().map(|c| c.transaction_count).sum::<i64>(), 3);
    }

    #[test]
    fn test_category_monthly_history() {
        let (db, user) = seeded();

        let history = db
            .category_monthly_history(user, date(2025, 1, 1), date(2025, 2, 28))
            .unwrap();
        let feb = &history[&YearMonth::new(2025, 2).unwrap()];
        assert_eq!(feb.len(), 2);
        assert_eq!(feb[0].category_name, "Food");
        assert_eq!(feb[0].total, dec!(125.25));
        assert!(feb.iter().all(|c| c.category_type == CategoryType::Expense));
    }

    #[test]
    fn test_overview_totals() {
        let (db, user) = seeded();

        let totals = db.overview_totals(user, None, None).unwrap();
        assert_eq!(totals.total_income, dec!(6000));
        assert_eq!(totals.total_expense, dec!(2045.75));
        assert_eq!(totals.income_count, 2);
        assert_eq!(totals.expense_count, 5);
        assert_eq!(totals.max_expense, Some(dec!(900)));
        assert_eq!(totals.min_expense, Some(dec!(45)));

        let empty = db
            .overview_totals(user, Some(date(2030, 1, 1)), None)
            .unwrap();
        assert_eq!(empty.total_income, Decimal::ZERO);
        assert_eq!(empty.max_expense, None);
    }

    #[test]
    fn test_expense_days_and_most_frequent() {
        let (db, user) = seeded();

        let days = db
            .expense_days(user, date(2025, 2, 1), date(2025, 2, 28))
            .unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], (date(2025, 2, 7), dec!(80.25)));

        let frequent = db
            .most_frequent_expense_category(user, date(2025, 1, 1), date(2025, 2, 28))
            .unwrap();
        assert_eq!(frequent, Some(("Food".to_string(), 3)));

        let none = db
            .most_frequent_expense_category(user, date(2030, 1, 1), date(2030, 2, 1))
            .unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_budget_set_and_spend() {
        let (db, user) = seeded();
        let feb = YearMonth::new(2025, 2).unwrap();

        let id = db.set_budget(user, "Food", feb, dec!(100)).unwrap();
        // Setting again replaces the limit
        let id2 = db.set_budget(user, "Food", feb, dec!(150)).unwrap();
        assert_eq!(id, id2);
        db.set_budget(user, "Travel", feb, dec!(300)).unwrap();

        let budgets = db.list_budget_spend(user, feb).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Food");
        assert_eq!(budgets[0].limit, dec!(150));
        assert_eq!(budgets[0].spent, dec!(125.25));
        assert_eq!(budgets[1].category, "Travel");
        assert_eq!(budgets[1].spent, Decimal::ZERO);

        assert!(db.set_budget(user, "Food", feb, dec!(-1)).is_err());
        assert!(db
            .list_budget_spend(user, YearMonth::new(2025, 3).unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_goal_set_and_list() {
        let (db, user) = seeded();
        let jan = YearMonth::new(2025, 1).unwrap();
        let feb = YearMonth::new(2025, 2).unwrap();

        let id = db.set_goal(user, "Vacation", jan, dec!(500)).unwrap();
        // Same name and month replaces the target
        let id2 = db.set_goal(user, " Vacation ", jan, dec!(600)).unwrap();
        assert_eq!(id, id2);
        db.set_goal(user, "Car", feb, dec!(2000)).unwrap();
        db.set_goal(user, "Bike", feb, dec!(300)).unwrap();

        let goals = db.list_goals(user).unwrap();
        let names: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Bike", "Car", "Vacation"]);
        assert_eq!(goals[2].month, jan);
        assert_eq!(goals[2].target_amount, dec!(600));
        assert_eq!(goals[2].current_amount, Decimal::ZERO);
        assert_eq!(goals[2].progress, Decimal::ZERO);
        assert!(!goals[2].achieved);

        assert!(db.set_goal(user, "Vacation", jan, Decimal::ZERO).is_err());
        assert!(db.set_goal(user, "Vacation", jan, dec!(-5)).is_err());
        assert!(db.set_goal(user, "  ", jan, dec!(5)).is_err());
    }

    #[test]
    fn test_goal_add_amount() {
        let (db, user) = seeded();
        let jan = YearMonth::new(2025, 1).unwrap();
        let id = db.set_goal(user, "Vacation", jan, dec!(500)).unwrap();

        let goal = db.add_goal_amount(user, id, dec!(200)).unwrap();
        assert_eq!(goal.current_amount, dec!(200));
        assert_eq!(goal.progress, dec!(40));
        assert!(!goal.achieved);

        let goal = db.add_goal_amount(user, id, dec!(350.50)).unwrap();
        assert_eq!(goal.current_amount, dec!(550.50));
        assert_eq!(goal.progress, dec!(110.1));
        assert!(goal.achieved);

        // Raising the target keeps the goal achieved
        db.set_goal(user, "Vacation", jan, dec!(1000)).unwrap();
        let goal = db.get_goal(user, id).unwrap().unwrap();
        assert!(goal.achieved);
        assert_eq!(goal.progress, dec!(55.05));

        assert!(matches!(
            db.add_goal_amount(user, id, Decimal::ZERO),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.add_goal_amount(user, id + 100, dec!(1)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_goal_target_lowered_below_savings() {
        let (db, user) = seeded();
        let jan = YearMonth::new(2025, 1).unwrap();
        let id = db.set_goal(user, "Vacation", jan, dec!(500)).unwrap();
        db.add_goal_amount(user, id, dec!(300)).unwrap();

        db.set_goal(user, "Vacation", jan, dec!(250)).unwrap();
        assert!(db.get_goal(user, id).unwrap().unwrap().achieved);
    }

    #[test]
    fn test_goals_are_isolated() {
        let (db, user) = seeded();
        let other = db.upsert_user("luis", None).unwrap();
        let id = db
            .set_goal(user, "Vacation", YearMonth::new(2025, 1).unwrap(), dec!(500))
            .unwrap();

        assert!(db.get_goal(other, id).unwrap().is_none());
        assert!(db.list_goals(other).unwrap().is_empty());
        assert!(matches!(
            db.add_goal_amount(other, id, dec!(10)),
            Err(Error::NotFound(_))
        ));
        assert_eq!(
            db.get_goal(user, id).unwrap().unwrap().current_amount,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_users_are_isolated() {
        let (db, _) = seeded();
        let other = db.upsert_user("luis", None).unwrap();

        assert!(db
            .monthly_aggregates(other, date(2025, 1, 1), date(2025, 12, 31))
            .unwrap()
            .is_empty());
        assert_eq!(db.overview_totals(other, None, None).unwrap().expense_count, 0);
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        let user = db.upsert_user("ana", None).unwrap();

        db.log_audit(user, "dashboard_overview", Some("dashboard"), None)
            .unwrap();
        db.log_audit(user, "dashboard_trends", Some("dashboard"), Some("months=6"))
            .unwrap();

        let entries = db.list_audit_log(user, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "dashboard_trends");
        assert_eq!(entries[0].details.as_deref(), Some("months=6"));
    }
}
