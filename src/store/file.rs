//! File-backed [`TokenStore`] holding the bearer token as a single opaque text value.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists the token to a plain text file after each change.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
	path: PathBuf,
}
impl FileTokenStore {
	/// Creates a store writing to `path`. The file is created on the first save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Location of the cached token.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(&self) -> Result<Option<TokenSecret>, StoreError> {
		let raw = match fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) if e.kind() == ErrorKind::InvalidData => {
				return Err(StoreError::Serialization {
					message: format!("{} does not hold a UTF-8 token: {e}", self.path.display()),
				});
			},
			Err(e) => {
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				});
			},
		};
		let token = raw.trim();

		if token.is_empty() { Ok(None) } else { Ok(Some(TokenSecret::new(token))) }
	}

	fn write_now(&self, token: &TokenSecret) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(token.expose().as_bytes()).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn remove_now(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}
}
impl TokenStore for FileTokenStore {
	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { self.read_now() })
	}

	fn store(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.write_now(&token) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.remove_now() })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"paypal_api_token_{label}_{}_{}.txt",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn missing_file_loads_as_none() {
		let store = FileTokenStore::new(temp_path("missing"));
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		assert_eq!(rt.block_on(store.load()).expect("Loading a missing file should succeed."), None);
	}

	#[test]
	fn save_overwrite_and_reload() {
		let path = temp_path("overwrite");
		let store = FileTokenStore::new(&path);
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.store(TokenSecret::new("first-token")))
			.expect("Failed to save first token.");
		rt.block_on(store.store(TokenSecret::new("second-token")))
			.expect("Failed to overwrite token.");

		assert_eq!(
			fs::read_to_string(&path).expect("Token file should exist after save."),
			"second-token"
		);

		let reopened = FileTokenStore::new(&path);
		let loaded = rt
			.block_on(reopened.load())
			.expect("Failed to load token from file.")
			.expect("File store lost the token after reopen.");

		assert_eq!(loaded.expose(), "second-token");

		rt.block_on(reopened.clear()).expect("Failed to clear token file.");

		assert!(!path.exists());
		assert_eq!(rt.block_on(reopened.load()).expect("Load after clear should succeed."), None);
	}

	#[test]
	fn blank_file_loads_as_none() {
		let path = temp_path("blank");

		fs::write(&path, "\n").expect("Failed to seed blank token file.");

		let store = FileTokenStore::new(&path);
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		assert_eq!(rt.block_on(store.load()).expect("Blank file should load."), None);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary token file {}: {e}", path.display())
		});
	}

	#[test]
	fn non_utf8_file_is_a_serialization_error() {
		let path = temp_path("binary");

		fs::write(&path, [0xff, 0xfe, 0x00]).expect("Failed to seed binary token file.");

		let store = FileTokenStore::new(&path);
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let err = rt.block_on(store.load()).expect_err("Binary content must not load as a token.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary token file {}: {e}", path.display())
		});
	}
}
