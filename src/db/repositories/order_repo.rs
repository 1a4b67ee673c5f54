use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::OrderRepository;
use crate::error::{AppError, AppResult};
use crate::models::{Gateway, OrderRecord, OrderStatus, PaymentUpdate};

const ORDER_COLUMNS: &str = r#"
    order_id, gateway, amount, amount_minor, currency, status,
    receipt, notes, customer_reference, redirect_url, payment_id,
    created_at, paid_at
"#;

#[derive(Debug, FromRow)]
struct OrderRow {
    order_id: String,
    gateway: String,
    amount: String,
    amount_minor: i64,
    currency: String,
    status: String,
    receipt: Option<String>,
    notes: Option<serde_json::Value>,
    customer_reference: Option<String>,
    redirect_url: Option<String>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = AppError;

    fn try_from(row: OrderRow) -> AppResult<Self> {
        let gateway = Gateway::parse(&row.gateway)
            .ok_or_else(|| AppError::Storage(format!("unknown gateway '{}'", row.gateway)))?;
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| AppError::Storage(format!("unknown order status '{}'", row.status)))?;

        Ok(OrderRecord {
            order_id: row.order_id,
            gateway,
            amount: row.amount,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status,
            receipt: row.receipt,
            notes: row.notes,
            customer_reference: row.customer_reference,
            redirect_url: row.redirect_url,
            payment_id: row.payment_id,
            created_at: row.created_at,
            paid_at: row.paid_at,
        })
    }
}

/// Orders table in Postgres.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &OrderRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, gateway, amount, amount_minor, currency, status,
                receipt, notes, customer_reference, redirect_url, payment_id,
                created_at, paid_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&order.order_id)
        .bind(order.gateway.as_str())
        .bind(&order.amount)
        .bind(order.amount_minor)
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(&order.receipt)
        .bind(&order.notes)
        .bind(&order.customer_reference)
        .bind(&order.redirect_url)
        .bind(&order.payment_id)
        .bind(order.created_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, order_id: &str) -> AppResult<Option<OrderRecord>> {
        let query = format!("SELECT {} FROM orders WHERE order_id = $1", ORDER_COLUMNS);

        sqlx::query_as::<_, OrderRow>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .map(OrderRecord::try_from)
            .transpose()
    }

    async fn mark_paid(
        &self,
        order_id: &str,
        payment_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<PaymentUpdate> {
        // The status guard makes the transition happen at most once even
        // under concurrent verifications.
        let query = format!(
            r#"
            UPDATE orders
            SET status = $2, payment_id = $3, paid_at = $4
            WHERE order_id = $1 AND status <> $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let updated = sqlx::query_as::<_, OrderRow>(&query)
            .bind(order_id)
            .bind(OrderStatus::Paid.as_str())
            .bind(payment_id)
            .bind(paid_at)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = updated {
            return Ok(PaymentUpdate::Updated(row.try_into()?));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE order_id = $1)")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(if exists {
            PaymentUpdate::AlreadyPaid
        } else {
            PaymentUpdate::NotFound
        })
    }
}
