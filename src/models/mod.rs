pub mod amount;
pub mod order;

pub use amount::*;
pub use order::*;
