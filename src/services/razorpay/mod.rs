mod client;
mod orders;
mod signature;

pub use client::RazorpayClient;
pub use orders::*;
pub use signature::RazorpaySignature;

use std::sync::Arc;

use chrono::Utc;

use crate::config::RazorpayConfig;
use crate::crypto_utils::IdGenerator;
use crate::db::SharedOrderRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    Amount, Gateway, OrderRecord, OrderStatus, PaymentUpdate, Persisted, PersistenceOutcome,
};

pub const DEFAULT_CURRENCY: &str = "INR";

/// Order the client asked for, already validated.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub amount: Amount,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub order_id: String,
    /// Minor units, as echoed by the gateway.
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
}

pub struct RazorpayService {
    gateway: Arc<dyn OrderGateway>,
    key_id: String,
    key_secret: String,
    orders: SharedOrderRepository,
}

impl RazorpayService {
    pub fn new(config: &RazorpayConfig, orders: SharedOrderRepository) -> AppResult<Self> {
        let client = RazorpayClient::new(config)?;
        Ok(Self::with_gateway(
            Arc::new(client),
            &config.key_id,
            &config.key_secret,
            orders,
        ))
    }

    pub fn with_gateway(
        gateway: Arc<dyn OrderGateway>,
        key_id: &str,
        key_secret: &str,
        orders: SharedOrderRepository,
    ) -> Self {
        Self {
            gateway,
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            orders,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Creates the order at Razorpay, then records it locally. Nothing is
    /// recorded when the gateway call fails.
    pub async fn create_order(&self, order: NewOrder) -> AppResult<Persisted<CreatedOrder>> {
        let amount = order.amount.minor_units();
        if amount < 1 {
            return Err(AppError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }

        let request = CreateOrderRequest {
            amount,
            currency: order
                .currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            receipt: order.receipt.unwrap_or_else(IdGenerator::receipt),
            notes: order.notes.unwrap_or_else(|| serde_json::json!({})),
            payment_capture: 1,
        };

        tracing::info!(
            amount = request.amount,
            currency = %request.currency,
            receipt = %request.receipt,
            "Creating Razorpay order"
        );

        let created = self.gateway.create_order(&request).await?;

        tracing::info!(
            order_id = %created.id,
            amount = created.amount,
            currency = %created.currency,
            "Razorpay order created"
        );

        let record = OrderRecord {
            order_id: created.id.clone(),
            gateway: Gateway::Razorpay,
            amount: order.amount.as_str().to_string(),
            amount_minor: created.amount,
            currency: created.currency.clone(),
            status: OrderStatus::Created,
            receipt: created.receipt.clone(),
            notes: created.notes.clone(),
            customer_reference: None,
            redirect_url: None,
            payment_id: None,
            created_at: Utc::now(),
            paid_at: None,
        };

        let persistence = match self.orders.create(&record).await {
            Ok(()) => {
                tracing::info!(order_id = %record.order_id, "Order saved locally");
                PersistenceOutcome::Stored
            }
            Err(e) => {
                tracing::warn!(order_id = %record.order_id, error = %e, "Failed to save order locally");
                PersistenceOutcome::Failed(e.to_string())
            }
        };

        Ok(Persisted::new(
            CreatedOrder {
                order_id: created.id,
                amount: created.amount,
                currency: created.currency,
                receipt: created.receipt,
            },
            persistence,
        ))
    }

    /// Verifies a checkout callback and, when genuine, marks the order
    /// paid. The value is whether the signature matched; on a mismatch the
    /// stored order is not touched.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> AppResult<Persisted<bool>> {
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return Err(AppError::MissingParameters(
                "razorpay_order_id, razorpay_payment_id and razorpay_signature are required"
                    .to_string(),
            ));
        }

        tracing::info!(order_id = %order_id, "Verifying payment signature");

        if !RazorpaySignature::verify_payment(order_id, payment_id, signature, &self.key_secret)? {
            tracing::warn!(order_id = %order_id, "Signature validation failed");
            return Ok(Persisted::new(false, PersistenceOutcome::Skipped));
        }

        tracing::info!(order_id = %order_id, payment_id = %payment_id, "Signature is valid");

        let persistence = match self.orders.mark_paid(order_id, payment_id, Utc::now()).await {
            Ok(PaymentUpdate::Updated(_)) => {
                tracing::info!(order_id = %order_id, "Order marked paid");
                PersistenceOutcome::Stored
            }
            Ok(PaymentUpdate::AlreadyPaid) => {
                tracing::info!(order_id = %order_id, "Order already marked paid");
                PersistenceOutcome::Skipped
            }
            Ok(PaymentUpdate::NotFound) => {
                tracing::warn!(order_id = %order_id, "Order not found in local storage");
                PersistenceOutcome::Skipped
            }
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Failed to update order status");
                PersistenceOutcome::Failed(e.to_string())
            }
        };

        Ok(Persisted::new(true, persistence))
    }
}

pub type SharedRazorpayService = Arc<RazorpayService>;
