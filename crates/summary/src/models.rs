use serde::Serialize;

/// Fixed two-decimal rendering of integer cents.
pub fn format_cents(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategorySummary {
    pub category_id: i64,
    pub category_name: String,
    pub income: String,
    pub expenses: String,
    pub balance: String,
    pub transaction_count: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthlySummary {
    pub month: String, // YYYY-MM
    pub total_income: String,
    pub total_expenses: String,
    pub balance: String,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyAnalysis {
    pub month: String,
    pub analysis: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(35075), "350.75");
        assert_eq!(format_cents(-35075), "-350.75");
        assert_eq!(format_cents(100000), "1000.00");
    }
}
