pub mod billdesk;
pub mod razorpay;

pub use billdesk::BillDeskService;
pub use razorpay::RazorpayService;
