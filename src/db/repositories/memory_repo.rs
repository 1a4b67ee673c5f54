use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::OrderRepository;
use crate::error::{AppError, AppResult};
use crate::models::{OrderRecord, PaymentUpdate};

/// Process-local order store.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<OrderRecord>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &OrderRecord) -> AppResult<()> {
        let mut orders = self.orders.write();
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(AppError::Storage(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: &str) -> AppResult<Option<OrderRecord>> {
        Ok(self
            .orders
            .read()
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn mark_paid(
        &self,
        order_id: &str,
        payment_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<PaymentUpdate> {
        let mut orders = self.orders.write();
        let Some(order) = orders.iter_mut().find(|o| o.order_id == order_id) else {
            return Ok(PaymentUpdate::NotFound);
        };

        if order.mark_paid(payment_id, paid_at) {
            Ok(PaymentUpdate::Updated(order.clone()))
        } else {
            Ok(PaymentUpdate::AlreadyPaid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gateway, OrderStatus};

    fn order(order_id: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            gateway: Gateway::BillDesk,
            amount: "250".to_string(),
            amount_minor: 25000,
            currency: "INR".to_string(),
            status: OrderStatus::Pending,
            receipt: None,
            notes: None,
            customer_reference: Some("ARP10234".to_string()),
            redirect_url: None,
            payment_id: None,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("ORD_1_abc")).await.unwrap();
        repo.create(&order("ORD_2_def")).await.unwrap();

        let found = repo.find_by_id("ORD_2_def").await.unwrap().unwrap();
        assert_eq!(found.order_id, "ORD_2_def");
        assert!(repo.find_by_id("ORD_3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("ORD_1_abc")).await.unwrap();
        assert!(repo.create(&order("ORD_1_abc")).await.is_err());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_paid_transitions() {
        let repo = InMemoryOrderRepository::new();
        repo.create(&order("ORD_1_abc")).await.unwrap();

        let update = repo.mark_paid("ORD_1_abc", "pay_1", Utc::now()).await.unwrap();
        match update {
            PaymentUpdate::Updated(record) => {
                assert_eq!(record.status, OrderStatus::Paid);
                assert_eq!(record.payment_id.as_deref(), Some("pay_1"));
            }
            other => panic!("unexpected update {:?}", other),
        }

        let again = repo.mark_paid("ORD_1_abc", "pay_2", Utc::now()).await.unwrap();
        assert_eq!(again, PaymentUpdate::AlreadyPaid);

        let missing = repo.mark_paid("ORD_404", "pay_3", Utc::now()).await.unwrap();
        assert_eq!(missing, PaymentUpdate::NotFound);
    }
}
