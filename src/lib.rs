pub mod api;
pub mod config;
pub mod crypto_utils;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Instant;

use config::Config;
use db::SharedOrderRepository;
use error::AppResult;
use services::{BillDeskService, RazorpayService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orders: SharedOrderRepository,
    /// Present when BillDesk is configured.
    pub billdesk: Option<Arc<BillDeskService>>,
    /// Present when Razorpay is configured.
    pub razorpay: Option<Arc<RazorpayService>>,
    pub started_at: Instant,
}

impl AppState {
    /// Wires each configured gateway to the given order store.
    pub fn new(config: Config, orders: SharedOrderRepository) -> AppResult<Self> {
        let billdesk = config
            .billdesk
            .clone()
            .map(|bd| Arc::new(BillDeskService::new(bd, orders.clone())));

        let razorpay = match &config.razorpay {
            Some(rzp) => Some(Arc::new(RazorpayService::new(rzp, orders.clone())?)),
            None => None,
        };

        Ok(Self::from_parts(config, orders, billdesk, razorpay))
    }

    pub fn from_parts(
        config: Config,
        orders: SharedOrderRepository,
        billdesk: Option<Arc<BillDeskService>>,
        razorpay: Option<Arc<RazorpayService>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orders,
            billdesk,
            razorpay,
            started_at: Instant::now(),
        }
    }
}
