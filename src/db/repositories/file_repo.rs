use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::OrderRepository;
use crate::error::{AppError, AppResult};
use crate::models::{OrderRecord, PaymentUpdate};

/// Orders kept as a pretty-printed JSON array in a single file.
///
/// Every operation reads the whole file, and writes replace it through a
/// temporary file and a rename. The mutex serialises read-modify-write
/// cycles within this process; lookups are a linear scan.
pub struct FileOrderRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileOrderRepository {
    /// Opens the store, creating an empty array file if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let repo = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };

        if tokio::fs::metadata(&repo.path).await.is_err() {
            tracing::info!(path = %repo.path.display(), "Orders file not found, creating new file");
            repo.write_all(&[]).await?;
        }

        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> AppResult<Vec<OrderRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(Vec::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "Orders file missing, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, orders: &[OrderRecord]) -> AppResult<()> {
        let data = serde_json::to_string_pretty(orders)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), count = orders.len(), "Orders written");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for FileOrderRepository {
    async fn create(&self, order: &OrderRecord) -> AppResult<()> {
        let _guard = self.lock.lock().await;

        let mut orders = self.read_all().await?;
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(AppError::Storage(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        orders.push(order.clone());
        self.write_all(&orders).await
    }

    async fn find_by_id(&self, order_id: &str) -> AppResult<Option<OrderRecord>> {
        let _guard = self.lock.lock().await;

        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|o| o.order_id == order_id))
    }

    async fn mark_paid(
        &self,
        order_id: &str,
        payment_id: &str,
        paid_at: DateTime<Utc>,
    ) -> AppResult<PaymentUpdate> {
        let _guard = self.lock.lock().await;

        let mut orders = self.read_all().await?;
        let Some(order) = orders.iter_mut().find(|o| o.order_id == order_id) else {
            return Ok(PaymentUpdate::NotFound);
        };

        if !order.mark_paid(payment_id, paid_at) {
            return Ok(PaymentUpdate::AlreadyPaid);
        }

        let updated = order.clone();
        self.write_all(&orders).await?;
        Ok(PaymentUpdate::Updated(updated))
    }
}
