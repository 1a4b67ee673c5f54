use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::RazorpayClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    /// Minor currency units (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: serde_json::Value,
    /// 1 = capture automatically on authorisation.
    pub payment_capture: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: i32,
    pub notes: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: i64,
}

/// Remote order creation. Implemented by [`RazorpayClient`]; tests swap in
/// their own.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> AppResult<RazorpayOrder>;
}

#[async_trait]
impl OrderGateway for RazorpayClient {
    async fn create_order(&self, request: &CreateOrderRequest) -> AppResult<RazorpayOrder> {
        self.post("/orders", request).await
    }
}
