pub mod identifiers;
pub mod signature;

pub use identifiers::{CustomerReferenceFormat, IdGenerator};
pub use signature::HmacSignature;
