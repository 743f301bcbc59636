use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// For recording payments (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub invoice_id: i64,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
}
