//! Storage contract and built-in implementations for the cached bearer token.

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the single current bearer token.
///
/// The value is opaque; stores keep exactly one token and overwrite it on every save.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the last persisted token, or `None` when nothing has been stored.
	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Persists the token, replacing any prior value.
	fn store(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes the persisted token.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The stored value could not be decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Token store operation labels used in warnings and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
	/// [`TokenStore::load`].
	Load,
	/// [`TokenStore::store`].
	Store,
	/// [`TokenStore::clear`].
	Clear,
}
impl StoreOperation {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StoreOperation::Load => "load",
			StoreOperation::Store => "store",
			StoreOperation::Clear => "clear",
		}
	}
}
impl Display for StoreOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
