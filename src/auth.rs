//! Credentials, token secrets, merchant assertions, and the authentication manager.

pub mod assertion;
pub mod credentials;
pub mod id;
pub mod manager;
pub mod secret;

pub use assertion::*;
pub use credentials::*;
pub use id::*;
pub use manager::*;
pub use secret::*;
