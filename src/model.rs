//! Request and response models with the constraint checks PayPal documents for them.
//!
//! Only a representative set of models lives here; every model implements [`Validate`] so
//! callers can check payloads before sending them.

pub mod disputes;
pub mod orders;
pub mod validate;

pub use validate::*;
