use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Accepted,
    Expired,
    Rejected,
}

impl EstimateStatus {
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Sent,
        Self::Viewed,
        Self::Accepted,
        Self::Expired,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "viewed" => Some(Self::Viewed),
            "accepted" => Some(Self::Accepted),
            "expired" => Some(Self::Expired),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Statuses still awaiting a client decision, which lapse once the
    /// estimate's validity date has passed.
    pub fn can_expire(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent | Self::Viewed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Partial,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Partial,
        Self::Paid,
        Self::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    /// Statuses that reflect money received rather than a user's choice.
    pub fn is_payment_driven(&self) -> bool {
        matches!(self, Self::Partial | Self::Paid)
    }

    /// Whether late fees may be assessed on an invoice in this status.
    pub fn accrues_late_fees(&self) -> bool {
        matches!(self, Self::Sent | Self::Partial | Self::Overdue)
    }
}
