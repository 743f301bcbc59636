use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::{LineItem, TaxBreakdown};
use crate::models::{DocumentLineItem, EstimateStatus, NewDocumentLineItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: i64,
    pub estimate_number: String,
    pub client_name: String,
    pub status: EstimateStatus,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,

    // Calculated values, rounded to cents
    pub totals: TaxBreakdown,

    pub line_items: Vec<DocumentLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    /// The stored line items as calculator input.
    pub fn calculator_items(&self) -> Vec<LineItem> {
        self.line_items
            .iter()
            .map(DocumentLineItem::to_line_item)
            .collect()
    }

    /// Whether the estimate is still undecided and its `valid_until` is
    /// before `today`. The last valid day itself has not lapsed.
    pub fn has_lapsed(
        &self,
        today: NaiveDate,
    ) -> bool {
        self.status.can_expire() && self.valid_until.is_some_and(|last_day| last_day < today)
    }
}

/// What a user enters when creating or editing an estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateContent {
    pub client_name: String,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub line_items: Vec<LineItem>,
}

/// For creating or replacing estimates (no id, number or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEstimate {
    pub client_name: String,
    pub status: EstimateStatus,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub totals: TaxBreakdown,
    pub line_items: Vec<NewDocumentLineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn estimate(
        status: EstimateStatus,
        valid_until: Option<NaiveDate>,
    ) -> Estimate {
        let now = Utc::now();
        Estimate {
            id: 1,
            estimate_number: "EST-000001".to_string(),
            client_name: "Northwind".to_string(),
            status,
            valid_until,
            notes: None,
            totals: TaxBreakdown::default(),
            line_items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lapses_the_day_after_valid_until() {
        let sent = estimate(EstimateStatus::Sent, Some(date(10)));

        assert!(!sent.has_lapsed(date(10)));
        assert!(sent.has_lapsed(date(11)));
    }

    #[test]
    fn decided_or_undated_estimates_never_lapse() {
        assert!(!estimate(EstimateStatus::Accepted, Some(date(1))).has_lapsed(date(30)));
        assert!(!estimate(EstimateStatus::Rejected, Some(date(1))).has_lapsed(date(30)));
        assert!(!estimate(EstimateStatus::Viewed, None).has_lapsed(date(30)));
    }
}
