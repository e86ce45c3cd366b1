//! Thread-safe in-memory [`TokenStore`] used when no cache file is configured and in tests.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{StoreFuture, TokenStore},
};

type Slot = Arc<RwLock<Option<TokenSecret>>>;

/// Keeps the token in-process; cloned handles share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(Slot);
impl MemoryTokenStore {
	/// Creates a store that already holds `token`, as if persisted by an earlier process.
	pub fn seeded(token: TokenSecret) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Returns the currently stored token without going through the async contract.
	pub fn snapshot(&self) -> Option<TokenSecret> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryTokenStore {
	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn store(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	#[test]
	fn clones_share_the_same_slot() {
		let store = MemoryTokenStore::default();
		let handle = store.clone();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for memory store test.");

		rt.block_on(store.store(TokenSecret::new("shared"))).expect("Store should succeed.");

		assert_eq!(handle.snapshot().map(|t| t.expose().to_owned()), Some("shared".into()));

		rt.block_on(handle.clear()).expect("Clear should succeed.");

		assert!(rt.block_on(store.load()).expect("Load should succeed.").is_none());
	}
}
