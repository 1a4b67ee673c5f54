pub mod billdesk;
pub mod health;
pub mod razorpay;

pub use billdesk::*;
pub use health::*;
pub use razorpay::*;
