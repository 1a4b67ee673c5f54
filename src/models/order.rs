use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    BillDesk,
    Razorpay,
}

impl Gateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::BillDesk => "billdesk",
            Gateway::Razorpay => "razorpay",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "billdesk" => Some(Gateway::BillDesk),
            "razorpay" => Some(Gateway::Razorpay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Razorpay order accepted by the gateway.
    Created,
    /// BillDesk redirect issued, outcome unknown.
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(OrderStatus::Created),
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    /// Merchant transaction id (BillDesk) or gateway order id (Razorpay).
    pub order_id: String,
    pub gateway: Gateway,
    /// Amount in major units, as the client submitted it.
    pub amount: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Apply a verified payment. Returns false when the order was already
    /// paid; the record is left as it was.
    pub fn mark_paid(&mut self, payment_id: &str, paid_at: DateTime<Utc>) -> bool {
        if self.status == OrderStatus::Paid {
            return false;
        }
        self.status = OrderStatus::Paid;
        self.payment_id = Some(payment_id.to_string());
        self.paid_at = Some(paid_at);
        true
    }
}

/// Result of the status update that follows a verified payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentUpdate {
    Updated(OrderRecord),
    AlreadyPaid,
    NotFound,
}

/// What happened to the side write that accompanies a primary operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceOutcome {
    Stored,
    /// Nothing needed writing (e.g. order unknown or already paid).
    Skipped,
    Failed(String),
}

impl PersistenceOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, PersistenceOutcome::Stored)
    }
}

/// A primary result that succeeded, together with the outcome of its
/// best-effort persistence.
#[derive(Debug, Clone)]
pub struct Persisted<T> {
    pub value: T,
    pub persistence: PersistenceOutcome,
}

impl<T> Persisted<T> {
    pub fn new(value: T, persistence: PersistenceOutcome) -> Self {
        Self { value, persistence }
    }
}
