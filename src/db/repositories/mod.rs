pub mod file_repo;
pub mod memory_repo;
pub mod order_repo;

pub use file_repo::FileOrderRepository;
pub use memory_repo::InMemoryOrderRepository;
pub use order_repo::PgOrderRepository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{OrderRecord, PaymentUpdate};

/// Append-only order store. Records are never deleted; the only mutation
/// is the one-time transition to paid.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &OrderRecord) -> AppResult<()>;

    async fn find_by_id(&self, order_id: &str) -> AppResult<Option<OrderRecord>>;

    async fn mark_paid(
        &self,
        order_id: &str,
        payment_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<PaymentUpdate>;
}

pub type SharedOrderRepository = Arc<dyn OrderRepository>;
