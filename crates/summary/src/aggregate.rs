use std::collections::HashMap;
use transactions::models::{TransactionKind, TransactionWithCategory};

/// Per-category totals in integer cents.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category_id: i64,
    pub category_name: String,
    pub income: i64,
    pub expenses: i64,
    pub transaction_count: u32,
}

impl CategoryTotals {
    pub fn balance(&self) -> i64 {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthTotals {
    pub categories: Vec<CategoryTotals>,
    pub total_income: i64,
    pub total_expenses: i64,
}

impl MonthTotals {
    pub fn balance(&self) -> i64 {
        self.total_income - self.total_expenses
    }
}

/// Single pass over a month's transactions, grouping by category. Output
/// is sorted by category name (ties by id) so summaries are deterministic.
pub fn aggregate(transactions: &[TransactionWithCategory]) -> MonthTotals {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut categories: Vec<CategoryTotals> = Vec::new();
    let mut total_income = 0;
    let mut total_expenses = 0;

    for t in transactions {
        let slot = *index.entry(t.category_id).or_insert_with(|| {
            categories.push(CategoryTotals {
                category_id: t.category_id,
                category_name: t.category_name.clone(),
                income: 0,
                expenses: 0,
                transaction_count: 0,
            });
            categories.len() - 1
        });

        let entry = &mut categories[slot];
        entry.transaction_count += 1;
        match t.kind {
            TransactionKind::Income => {
                entry.income += t.amount_cents;
                total_income += t.amount_cents;
            }
            TransactionKind::Expense => {
                entry.expenses += t.amount_cents;
                total_expenses += t.amount_cents;
            }
        }
    }

    categories.sort_by(|a, b| {
        a.category_name
            .cmp(&b.category_name)
            .then(a.category_id.cmp(&b.category_id))
    });

    MonthTotals {
        categories,
        total_income,
        total_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(category_id: i64, name: &str, cents: i64, kind: TransactionKind) -> TransactionWithCategory {
        TransactionWithCategory {
            id: 0,
            category_id,
            category_name: name.to_string(),
            occurred_at: "2024-02-10T12:00:00Z".to_string(),
            amount_cents: cents,
            kind,
            notes: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let totals = aggregate(&[]);
        assert!(totals.categories.is_empty());
        assert_eq!(totals.total_income, 0);
        assert_eq!(totals.total_expenses, 0);
        assert_eq!(totals.balance(), 0);
    }

    #[test]
    fn test_food_and_salary_scenario() {
        let transactions = vec![
            tx(1, "Food", 20050, TransactionKind::Expense),
            tx(1, "Food", 15025, TransactionKind::Expense),
            tx(2, "Salary", 100000, TransactionKind::Income),
        ];

        let totals = aggregate(&transactions);

        assert_eq!(totals.categories.len(), 2);

        let food = &totals.categories[0];
        assert_eq!(food.category_name, "Food");
        assert_eq!(food.income, 0);
        assert_eq!(food.expenses, 35075);
        assert_eq!(food.balance(), -35075);
        assert_eq!(food.transaction_count, 2);

        let salary = &totals.categories[1];
        assert_eq!(salary.category_name, "Salary");
        assert_eq!(salary.income, 100000);
        assert_eq!(salary.expenses, 0);
        assert_eq!(salary.balance(), 100000);
        assert_eq!(salary.transaction_count, 1);

        assert_eq!(totals.total_income, 100000);
        assert_eq!(totals.total_expenses, 35075);
        assert_eq!(totals.balance(), 64925);
    }

    #[test]
    fn test_grand_totals_equal_category_sums() {
        let transactions = vec![
            tx(1, "Food", 100, TransactionKind::Expense),
            tx(2, "Salary", 5000, TransactionKind::Income),
            tx(3, "Rent", 90000, TransactionKind::Expense),
            tx(2, "Salary", 700, TransactionKind::Income),
            tx(1, "Food", 250, TransactionKind::Expense),
        ];

        let totals = aggregate(&transactions);

        let income_sum: i64 = totals.categories.iter().map(|c| c.income).sum();
        let expense_sum: i64 = totals.categories.iter().map(|c| c.expenses).sum();
        assert_eq!(income_sum, totals.total_income);
        assert_eq!(expense_sum, totals.total_expenses);

        let count_sum: u32 = totals.categories.iter().map(|c| c.transaction_count).sum();
        assert_eq!(count_sum as usize, transactions.len());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let transactions = vec![
            tx(1, "Food", 100, TransactionKind::Expense),
            tx(2, "Salary", 5000, TransactionKind::Income),
        ];

        let first = aggregate(&transactions);
        let second = aggregate(&transactions);
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_is_sorted_by_name() {
        let transactions = vec![
            tx(3, "Zoo", 10, TransactionKind::Expense),
            tx(1, "Food", 10, TransactionKind::Expense),
            tx(2, "Alpha", 10, TransactionKind::Expense),
        ];

        let totals = aggregate(&transactions);
        let names: Vec<&str> = totals.categories.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Food", "Zoo"]);
    }

    #[test]
    fn test_mixed_kinds_in_one_category() {
        let transactions = vec![
            tx(1, "Side gig", 5000, TransactionKind::Income),
            tx(1, "Side gig", 1200, TransactionKind::Expense),
        ];

        let totals = aggregate(&transactions);
        let gig = &totals.categories[0];
        assert_eq!(gig.income, 5000);
        assert_eq!(gig.expenses, 1200);
        assert_eq!(gig.balance(), 3800);
        assert_eq!(gig.transaction_count, 2);
    }
}
