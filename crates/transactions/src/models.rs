use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// UTC instants are stored as RFC 3339 text at second precision. The
/// format is fixed-width, so lexical order in SQL equals instant order.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub occurred_at: String, // RFC 3339 UTC
    pub amount_cents: i64,   // Always positive; kind carries the sign
    pub kind: TransactionKind,
    pub notes: Option<String>,
}

/// Read model joined with the category name. This is what range queries
/// return and what the summary aggregation consumes.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TransactionWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub occurred_at: String,
    pub amount_cents: i64,
    pub kind: TransactionKind,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTransactionRequest {
    category_id: i64,
    occurred_at: String,
    amount_cents: i64,
    kind: TransactionKind,
    notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RawCreateTransactionRequest {
    pub category_id: i64,
    pub occurred_at: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub notes: Option<String>,
}

impl CreateTransactionRequest {
    pub fn new(
        category_id: i64,
        occurred_at: String,
        amount: f64,
        kind: TransactionKind,
        notes: Option<String>,
    ) -> Result<Self, String> {
        let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
            .map_err(|_| "Invalid timestamp, expected RFC 3339".to_string())?
            .with_timezone(&Utc);

        if !amount.is_finite() || amount <= 0.0 {
            return Err("Amount must be a positive number".to_string());
        }
        let amount_cents = (amount * 100.0).round() as i64;

        Ok(Self {
            category_id,
            occurred_at: format_instant(&occurred_at),
            amount_cents,
            kind,
            notes,
        })
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn occurred_at(&self) -> &str {
        &self.occurred_at
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
