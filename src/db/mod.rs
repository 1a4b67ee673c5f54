pub mod pool;
pub mod repositories;

pub use pool::{create_pool, open_repository, run_migrations};
pub use repositories::{OrderRepository, SharedOrderRepository};
