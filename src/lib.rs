//! PayPal REST API client: OAuth 2.0 client-credentials authentication, token caching,
//! idempotent request dispatch with a single retry on token expiry, and validated models.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod oauth;
pub mod obs;
pub mod request;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::{_prelude::*, error::Error};

	// self
	use crate::{
		auth::Credentials,
		client::Client,
		config::{ClientConfig, Environment},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		store::{MemoryTokenStore, TokenStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a [`ClientConfig`] that targets a mock server base URL.
	pub fn test_config(base_url: &str, credentials: Credentials) -> ClientConfig {
		let endpoint = Url::parse(base_url).expect("Mock server URL should parse.");

		ClientConfig::builder(Environment::Custom(endpoint), credentials)
			.build()
			.expect("Test client configuration should build.")
	}

	/// Constructs a [`Client`] backed by an in-memory token store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_client(
		base_url: &str,
		credentials: Credentials,
	) -> (ReqwestTestClient, Arc<MemoryTokenStore>) {
		let store_backend = Arc::new(MemoryTokenStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let client = Client::with_http_client(
			test_config(base_url, credentials),
			store,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test client should build.");

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
