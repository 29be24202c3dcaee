use crate::error::{AppError, AppResult};
use crate::models::{CreditBalance, CreditTransaction};
use crate::repositories::{CreditRepository, UserRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "TRY";

pub struct CreditService {
    credit_repo: Arc<CreditRepository>,
    user_repo: Arc<UserRepository>,
}

impl CreditService {
    pub fn new(credit_repo: Arc<CreditRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            credit_repo,
            user_repo,
        }
    }

    pub async fn balance(&self, user_id: &str) -> AppResult<CreditBalance> {
        let credits = self.credit_repo.get_or_create(user_id).await?;
        Ok(CreditBalance::from(&credits))
    }

    pub async fn history(&self, user_id: &str) -> AppResult<Vec<CreditTransaction>> {
        Ok(self.credit_repo.transactions(user_id).await?)
    }

    /// Add credits after a purchase settled outside the platform
    pub async fn grant(
        &self,
        user_id: &str,
        credits: i32,
        total_price: Decimal,
        payment_id: Option<String>,
    ) -> AppResult<(CreditBalance, CreditTransaction)> {
        if credits <= 0 {
            return Err(AppError::Validation("Credit amount must be positive".to_string()));
        }
        if total_price.is_sign_negative() {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let payment_id = payment_id.unwrap_or_else(|| format!("manual-{}", Uuid::new_v4()));
        let (balance, transaction) = self
            .credit_repo
            .grant(user_id, &payment_id, credits, total_price, DEFAULT_CURRENCY)
            .await?;

        info!(
            "Credits granted: user={}, credits={}, price={} {}",
            user_id, credits, total_price, DEFAULT_CURRENCY
        );
        Ok((CreditBalance::from(&balance), transaction))
    }
}
