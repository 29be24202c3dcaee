//! Lesson credit balances and purchase records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Credits held by a user. One credit books one private lesson.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredits {
    pub id: i32,
    pub user_id: String,
    pub total_credits: i32,
    pub used_credits: i32,
    pub available_credits: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserCredits {
    pub fn has_available(&self, required: i32) -> bool {
        self.available_credits >= required
    }
}

/// Balance reported to users without a credits row yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub total_credits: i32,
    pub used_credits: i32,
    pub available_credits: i32,
}

impl From<&UserCredits> for CreditBalance {
    fn from(credits: &UserCredits) -> Self {
        Self {
            total_credits: credits.total_credits,
            used_credits: credits.used_credits,
            available_credits: credits.available_credits,
        }
    }
}

/// Payment outcome of a credit purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Transaction record for a credit purchase
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: i32,
    pub user_id: String,
    pub payment_id: String,
    pub credits_amount: i32,
    /// Decimal amount kept as text to preserve precision
    pub total_price: String,
    pub currency: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl CreditTransaction {
    pub fn status_enum(&self) -> Option<TransactionStatus> {
        TransactionStatus::from_str(&self.status)
    }

    pub fn price(&self) -> Option<Decimal> {
        self.total_price.parse::<Decimal>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_price_parses_decimal_text() {
        let tx = CreditTransaction {
            id: 1,
            user_id: "u1".into(),
            payment_id: "manual-1".into(),
            credits_amount: 5,
            total_price: "449.90".into(),
            currency: "TRY".into(),
            status: "success".into(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        assert_eq!(tx.price(), Some(Decimal::new(44990, 2)));
        assert_eq!(tx.status_enum(), Some(TransactionStatus::Success));
    }
}
