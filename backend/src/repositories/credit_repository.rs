//! Repository for lesson credit balances and purchase records

use crate::error::RepositoryError;
use crate::models::{CreditTransaction, TransactionStatus, UserCredits};
use rust_decimal::Decimal;
use sqlx::PgPool;

const CREDIT_COLUMNS: &str =
    "id, user_id, total_credits, used_credits, available_credits, created_at, updated_at";

pub struct CreditRepository {
    pool: PgPool,
}

impl CreditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<UserCredits>, RepositoryError> {
        let credits = sqlx::query_as::<_, UserCredits>(&format!(
            "SELECT {} FROM user_credits WHERE user_id = $1",
            CREDIT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credits)
    }

    /// Get or create a zero balance
    pub async fn get_or_create(&self, user_id: &str) -> Result<UserCredits, RepositoryError> {
        if let Some(credits) = self.find(user_id).await? {
            return Ok(credits);
        }

        let credits = sqlx::query_as::<_, UserCredits>(&format!(
            r#"
            INSERT INTO user_credits (user_id, total_credits, used_credits, available_credits)
            VALUES ($1, 0, 0, 0)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING {}
            "#,
            CREDIT_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(credits)
    }

    /// Record a settled purchase and add its credits to the balance
    pub async fn grant(
        &self,
        user_id: &str,
        payment_id: &str,
        credits: i32,
        total_price: Decimal,
        currency: &str,
    ) -> Result<(UserCredits, CreditTransaction), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, CreditTransaction>(
            r#"
            INSERT INTO credit_transactions (user_id, payment_id, credits_amount, total_price, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, payment_id, credits_amount, total_price, currency, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(payment_id)
        .bind(credits)
        .bind(total_price.to_string())
        .bind(currency)
        .bind(TransactionStatus::Success.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let balance = sqlx::query_as::<_, UserCredits>(&format!(
            r#"
            INSERT INTO user_credits (user_id, total_credits, used_credits, available_credits)
            VALUES ($1, $2, 0, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET total_credits = user_credits.total_credits + $2,
                available_credits = user_credits.available_credits + $2,
                updated_at = NOW()
            RETURNING {}
            "#,
            CREDIT_COLUMNS
        ))
        .bind(user_id)
        .bind(credits)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((balance, transaction))
    }

    pub async fn transactions(&self, user_id: &str) -> Result<Vec<CreditTransaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, CreditTransaction>(
            r#"
            SELECT id, user_id, payment_id, credits_amount, total_price, currency, status, created_at
            FROM credit_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
