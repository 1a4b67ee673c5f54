pub mod logging;

pub use logging::{init_tracing, init_tracing_dev, request_logging, RequestId};
