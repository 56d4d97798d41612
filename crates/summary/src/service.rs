use crate::aggregate::{self, MonthTotals};
use crate::models::{CategorySummary, MonthlyAnalysis, MonthlySummary, format_cents};
use crate::month_range::{self, MonthRange, MonthRangeError};
use assistant::{ChatClient, ChatMessage, ChatOptions};
use database::Database;
use tracing::instrument;

const FALLBACK_TIMEZONE: &str = "UTC";

const ANALYSIS_PROMPT: &str = "You are a personal finance assistant. Given a monthly \
budget summary, write a short plain-language analysis (3-5 sentences): the most \
notable spending, how healthy the balance looks, and one concrete suggestion.";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Assistant is not configured")]
    AssistantNotConfigured,
    #[error("Assistant request failed: {0}")]
    Assistant(String),
}

impl From<MonthRangeError> for SummaryError {
    fn from(err: MonthRangeError) -> Self {
        match err {
            MonthRangeError::InvalidLabel(label) => {
                SummaryError::InvalidInput(format!("Invalid month: {label}"))
            }
            MonthRangeError::UnknownTimezone(tz) => SummaryError::UnknownTimezone(tz),
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    #[instrument(skip(db))]
    pub async fn get_monthly_summary(
        db: &Database,
        user_id: i64,
        month: Option<&str>,
    ) -> Result<MonthlySummary, SummaryError> {
        // 1. Stored timezone preference; a missing profile silently falls
        //    back to UTC
        let timezone = profiles::service::ProfileService::get_timezone(db, user_id)
            .await
            .map_err(|e| SummaryError::Infrastructure(e.to_string()))?
            .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string());

        // 2. Month boundaries as experienced in that timezone
        let range = month_range::resolve(month, &timezone)?;

        // 3. Matching transactions, joined with category names
        let transactions = transactions::service::TransactionService::list_between(
            db, user_id, range.start, range.end,
        )
        .await
        .map_err(|e| SummaryError::Infrastructure(e.to_string()))?;

        // 4.-6. Aggregate, format, assemble the DTO
        let totals = aggregate::aggregate(&transactions);

        Ok(Self::to_summary(range, totals))
    }

    #[instrument(skip(db, chat))]
    pub async fn get_monthly_analysis(
        db: &Database,
        chat: &ChatClient,
        user_id: i64,
        month: Option<&str>,
    ) -> Result<MonthlyAnalysis, SummaryError> {
        let summary = Self::get_monthly_summary(db, user_id, month).await?;

        let options = ChatOptions {
            messages: vec![
                ChatMessage::system(ANALYSIS_PROMPT),
                ChatMessage::user(Self::describe(&summary)),
            ],
            temperature: Some(0.4),
            max_tokens: Some(400),
            ..Default::default()
        };

        let response = chat.chat(&options).await.map_err(|e| {
            tracing::error!("monthly analysis request failed: {e}");
            SummaryError::Assistant(e.to_string())
        })?;

        Ok(MonthlyAnalysis {
            month: summary.month,
            analysis: response.content,
        })
    }

    fn to_summary(range: MonthRange, totals: MonthTotals) -> MonthlySummary {
        let balance = format_cents(totals.balance());
        MonthlySummary {
            month: range.label,
            total_income: format_cents(totals.total_income),
            total_expenses: format_cents(totals.total_expenses),
            balance,
            categories: totals
                .categories
                .into_iter()
                .map(|c| {
                    let balance = format_cents(c.balance());
                    CategorySummary {
                        category_id: c.category_id,
                        category_name: c.category_name,
                        income: format_cents(c.income),
                        expenses: format_cents(c.expenses),
                        balance,
                        transaction_count: c.transaction_count,
                    }
                })
                .collect(),
        }
    }

    fn describe(summary: &MonthlySummary) -> String {
        let mut lines = vec![format!(
            "Month {}: income {}, expenses {}, balance {}.",
            summary.month, summary.total_income, summary.total_expenses, summary.balance
        )];
        for c in &summary.categories {
            lines.push(format!(
                "- {}: income {}, expenses {}, balance {} ({} transactions)",
                c.category_name, c.income, c.expenses, c.balance, c.transaction_count
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use categories::service::CategoryService;
    use database::get_test_db;
    use profiles::service::ProfileService;
    use transactions::models::TransactionKind;
    use transactions::service::TransactionService;

    fn is_money(s: &str) -> bool {
        let s = s.strip_prefix('-').unwrap_or(s);
        match s.split_once('.') {
            Some((whole, frac)) => {
                !whole.is_empty()
                    && whole.chars().all(|c| c.is_ascii_digit())
                    && frac.len() == 2
                    && frac.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    async fn seed_transaction(
        db: &Database,
        user_id: i64,
        category_id: i64,
        occurred_at: &str,
        amount: f64,
        kind: TransactionKind,
    ) {
        TransactionService::create_transaction(
            db,
            user_id,
            category_id,
            occurred_at.to_string(),
            amount,
            kind,
            None,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_missing_profile_falls_back_to_utc() {
        let db = get_test_db().await;

        let summary = SummaryService::get_monthly_summary(&db, 9999, Some("2024-02"))
            .await
            .unwrap();

        assert_eq!(summary.month, "2024-02");
        assert_eq!(summary.total_income, "0.00");
        assert_eq!(summary.total_expenses, "0.00");
        assert_eq!(summary.balance, "0.00");
        assert!(summary.categories.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_summary_end_to_end() {
        let db = get_test_db().await;

        let user = ProfileService::ensure_profile(&db, "ada@example.com").await.unwrap();
        let food = CategoryService::create_category(&db, user.id, "Food".into()).await.unwrap();
        let salary = CategoryService::create_category(&db, user.id, "Salary".into()).await.unwrap();

        seed_transaction(&db, user.id, food, "2024-02-05T12:00:00Z", 200.50, TransactionKind::Expense).await;
        seed_transaction(&db, user.id, food, "2024-02-20T18:30:00Z", 150.25, TransactionKind::Expense).await;
        seed_transaction(&db, user.id, salary, "2024-02-01T09:00:00Z", 1000.0, TransactionKind::Income).await;
        // Outside the month: ignored
        seed_transaction(&db, user.id, food, "2024-03-01T00:00:00Z", 999.0, TransactionKind::Expense).await;

        let summary = SummaryService::get_monthly_summary(&db, user.id, Some("2024-02"))
            .await
            .unwrap();

        assert_eq!(summary.month, "2024-02");
        assert_eq!(summary.total_income, "1000.00");
        assert_eq!(summary.total_expenses, "350.75");
        assert_eq!(summary.balance, "649.25");

        assert_eq!(summary.categories.len(), 2);
        let food_row = &summary.categories[0];
        assert_eq!(food_row.category_name, "Food");
        assert_eq!(food_row.income, "0.00");
        assert_eq!(food_row.expenses, "350.75");
        assert_eq!(food_row.balance, "-350.75");
        assert_eq!(food_row.transaction_count, 2);

        let salary_row = &summary.categories[1];
        assert_eq!(salary_row.category_name, "Salary");
        assert_eq!(salary_row.income, "1000.00");
        assert_eq!(salary_row.expenses, "0.00");
        assert_eq!(salary_row.balance, "1000.00");
        assert_eq!(salary_row.transaction_count, 1);

        for c in &summary.categories {
            assert!(is_money(&c.income) && is_money(&c.expenses) && is_money(&c.balance));
        }
        assert!(is_money(&summary.total_income));
        assert!(is_money(&summary.total_expenses));
        assert!(is_money(&summary.balance));
    }

    #[tokio::test]
    async fn test_summary_follows_profile_timezone() {
        let db = get_test_db().await;

        let user = ProfileService::ensure_profile(&db, "ada@example.com").await.unwrap();
        ProfileService::update_profile(&db, user.id, None, Some("Europe/Warsaw".into()))
            .await
            .unwrap();
        let food = CategoryService::create_category(&db, user.id, "Food".into()).await.unwrap();

        // 23:30 UTC on Jan 31 is already February in Warsaw (UTC+1)
        seed_transaction(&db, user.id, food, "2024-01-31T23:30:00Z", 10.0, TransactionKind::Expense).await;

        let january = SummaryService::get_monthly_summary(&db, user.id, Some("2024-01"))
            .await
            .unwrap();
        assert_eq!(january.total_expenses, "0.00");

        let february = SummaryService::get_monthly_summary(&db, user.id, Some("2024-02"))
            .await
            .unwrap();
        assert_eq!(february.total_expenses, "10.00");
    }

    #[tokio::test]
    async fn test_invalid_month_label_is_rejected() {
        let db = get_test_db().await;
        let err = SummaryService::get_monthly_summary(&db, 1, Some("2024-13"))
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_stored_timezone_surfaces_as_error() {
        let db = get_test_db().await;

        let user = ProfileService::ensure_profile(&db, "ada@example.com").await.unwrap();
        // Bypass the service-level validation to simulate a corrupt preference
        sqlx::query("UPDATE profiles SET timezone = 'Not/A_Zone' WHERE id = $1")
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let err = SummaryService::get_monthly_summary(&db, user.id, Some("2024-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::UnknownTimezone(_)));
    }
}
