//! BillDesk redirect flow: the customer's browser is sent to the gateway
//! with a pipe-delimited request message appended to the payment URL.

pub mod checksum;
pub mod payload;

pub use checksum::{append_checksum, checksum, verify_checksum};
pub use payload::{PaymentMessage, DEFAULT_CURRENCY, FIELD_COUNT, PLACEHOLDER};

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::config::BillDeskConfig;
use crate::crypto_utils::IdGenerator;
use crate::db::SharedOrderRepository;
use crate::error::AppResult;
use crate::models::{Amount, Gateway, OrderRecord, OrderStatus, Persisted, PersistenceOutcome};

#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    pub redirect_url: String,
    pub merchant_transaction_id: String,
    pub customer_reference: String,
    /// Message as sent, including the checksum when enabled.
    pub message: String,
}

pub struct BillDeskService {
    config: BillDeskConfig,
    orders: SharedOrderRepository,
}

impl BillDeskService {
    pub fn new(config: BillDeskConfig, orders: SharedOrderRepository) -> Self {
        if config.checksum_enabled && config.checksum_key.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("BillDesk checksum is enabled but BD_CHECKSUM_KEY is not set; redirects will be refused");
        }
        Self { config, orders }
    }

    /// Builds the gateway redirect for `amount` and records the pending
    /// order. Recording is best-effort: a storage failure is reported in
    /// the result, never as an error.
    pub async fn create_redirect(
        &self,
        amount: &Amount,
        payment_option: Option<String>,
    ) -> AppResult<Persisted<PaymentRedirect>> {
        let merchant_transaction_id = IdGenerator::order_id();
        let customer_reference = IdGenerator::customer_reference();

        tracing::info!(
            merchant_transaction_id = %merchant_transaction_id,
            amount = %amount.as_str(),
            "Building BillDesk payment request"
        );

        let message = PaymentMessage {
            merchant_id: &self.config.merchant_id,
            customer_reference: &customer_reference,
            amount,
            currency: DEFAULT_CURRENCY,
            security_id: &self.config.security_id,
            return_url: &self.config.return_url,
        }
        .encode()?;

        let message = if self.config.checksum_enabled {
            append_checksum(&message, self.config.checksum_key.as_deref())?
        } else {
            message
        };

        // BillDesk expects the message appended without URL encoding.
        let redirect_url = format!("{}{}", self.config.base_url, message);
        tracing::debug!(redirect_url = %redirect_url, "BillDesk redirect URL generated");

        let record = OrderRecord {
            order_id: merchant_transaction_id.clone(),
            gateway: Gateway::BillDesk,
            amount: amount.as_str().to_string(),
            amount_minor: amount.minor_units(),
            currency: DEFAULT_CURRENCY.to_string(),
            status: OrderStatus::Pending,
            receipt: None,
            notes: payment_option.map(|option| json!({ "payment_option": option })),
            customer_reference: Some(customer_reference.clone()),
            redirect_url: Some(redirect_url.clone()),
            payment_id: None,
            created_at: Utc::now(),
            paid_at: None,
        };

        let persistence = match self.orders.create(&record).await {
            Ok(()) => {
                tracing::info!(merchant_transaction_id = %merchant_transaction_id, "Transaction saved");
                PersistenceOutcome::Stored
            }
            Err(e) => {
                tracing::warn!(
                    merchant_transaction_id = %merchant_transaction_id,
                    error = %e,
                    "Order log failed"
                );
                PersistenceOutcome::Failed(e.to_string())
            }
        };

        Ok(Persisted::new(
            PaymentRedirect {
                redirect_url,
                merchant_transaction_id,
                customer_reference,
                message,
            },
            persistence,
        ))
    }
}

pub type SharedBillDeskService = Arc<BillDeskService>;
