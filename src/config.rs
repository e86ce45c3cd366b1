//! Client configuration: target environment, credentials, timeouts, and token cache location.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::ConfigError,
	http::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT},
};

/// Base URL of the PayPal sandbox.
pub const SANDBOX_URL: &str = "https://api.sandbox.paypal.com";
/// Base URL of the PayPal production API.
pub const PRODUCTION_URL: &str = "https://api.paypal.com";

/// PayPal environment the client talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
	/// `https://api.sandbox.paypal.com`.
	Sandbox,
	/// `https://api.paypal.com`.
	Production,
	/// Any other base URL (proxies, mock servers).
	Custom(Url),
}
impl Environment {
	/// Resolves the base URL for the environment.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		match self {
			Self::Sandbox => parse_endpoint(SANDBOX_URL),
			Self::Production => parse_endpoint(PRODUCTION_URL),
			Self::Custom(url) => Ok(url.clone()),
		}
	}
}

/// Immutable, validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API base URL without a trailing slash.
	pub endpoint: Url,
	/// Credentials used for every call.
	pub credentials: Credentials,
	/// Maximum time spent establishing a connection.
	pub connect_timeout: Duration,
	/// Maximum time spent waiting for a complete response.
	pub request_timeout: Duration,
	/// File holding the cached bearer token; `None` keeps the token in memory only.
	pub token_cache_path: Option<PathBuf>,
}
impl ClientConfig {
	/// Creates a new builder for the provided environment and credentials.
	pub fn builder(environment: Environment, credentials: Credentials) -> ClientConfigBuilder {
		ClientConfigBuilder::new(environment, credentials)
	}

	/// Appends `path` (and any query it carries) to the endpoint.
	pub fn url_for(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.endpoint.as_str().trim_end_matches('/');

		parse_endpoint(&format!("{base}{path}"))
	}

	/// URL of the OAuth 2.0 token endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.url_for(crate::oauth::TOKEN_PATH)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	environment: Environment,
	credentials: Credentials,
	connect_timeout: Duration,
	request_timeout: Duration,
	token_cache_path: Option<PathBuf>,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the default timeouts and no token cache file.
	pub fn new(environment: Environment, credentials: Credentials) -> Self {
		Self {
			environment,
			credentials,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			token_cache_path: None,
		}
	}

	/// Overrides the connect timeout.
	pub fn connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;

		self
	}

	/// Overrides the request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Persists the bearer token to `path`.
	pub fn token_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.token_cache_path = Some(path.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let endpoint = self.environment.base_url()?;

		validate_endpoint(&endpoint)?;
		validate_timeout("connect_timeout", self.connect_timeout)?;
		validate_timeout("request_timeout", self.request_timeout)?;

		Ok(ClientConfig {
			endpoint,
			credentials: self.credentials,
			connect_timeout: self.connect_timeout,
			request_timeout: self.request_timeout,
			token_cache_path: self.token_cache_path,
		})
	}
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn validate_endpoint(url: &Url) -> Result<(), ConfigError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { url: url.to_string() })
	}
}

fn validate_timeout(name: &'static str, timeout: Duration) -> Result<(), ConfigError> {
	if timeout.is_positive() {
		Ok(())
	} else {
		Err(ConfigError::InvalidTimeout { name, timeout })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> Credentials {
		Credentials::new("abc", "xyz").expect("Credentials fixture should be valid.")
	}

	#[test]
	fn sandbox_config_uses_default_timeouts() {
		let config = ClientConfig::builder(Environment::Sandbox, credentials())
			.build()
			.expect("Sandbox config should build.");

		assert_eq!(config.endpoint.as_str(), "https://api.sandbox.paypal.com/");
		assert_eq!(config.connect_timeout, Duration::seconds(5));
		assert_eq!(config.request_timeout, Duration::seconds(30));
		assert!(config.token_cache_path.is_none());
		assert_eq!(
			config.token_url().expect("Token URL should resolve.").as_str(),
			"https://api.sandbox.paypal.com/v1/oauth2/token"
		);
	}

	#[test]
	fn url_for_concatenates_like_a_base_path() {
		let endpoint =
			Url::parse("https://proxy.example.com/paypal/").expect("Proxy URL should parse.");
		let config = ClientConfig::builder(Environment::Custom(endpoint), credentials())
			.build()
			.expect("Custom config should build.");
		let url = config.url_for("/v2/checkout/orders?page=2").expect("URL should resolve.");

		assert_eq!(url.as_str(), "https://proxy.example.com/paypal/v2/checkout/orders?page=2");
	}

	#[test]
	fn rejects_plain_http_outside_loopback() {
		let insecure = Url::parse("http://api.example.com").expect("URL should parse.");
		let err = ClientConfig::builder(Environment::Custom(insecure), credentials())
			.build()
			.expect_err("Plain HTTP endpoints must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));

		let local = Url::parse("http://127.0.0.1:8080").expect("URL should parse.");

		ClientConfig::builder(Environment::Custom(local), credentials())
			.build()
			.expect("Loopback endpoints may use plain HTTP.");
	}

	#[test]
	fn rejects_non_positive_timeouts() {
		let err = ClientConfig::builder(Environment::Sandbox, credentials())
			.request_timeout(Duration::ZERO)
			.build()
			.expect_err("A zero request timeout must be rejected.");

		assert!(matches!(err, ConfigError::InvalidTimeout { name: "request_timeout", .. }));

		let err = ClientConfig::builder(Environment::Sandbox, credentials())
			.connect_timeout(Duration::seconds(-1))
			.build()
			.expect_err("A negative connect timeout must be rejected.");

		assert!(matches!(err, ConfigError::InvalidTimeout { name: "connect_timeout", .. }));

		let config = ClientConfig::builder(Environment::Sandbox, credentials())
			.request_timeout(Duration::seconds(10))
			.build()
			.expect("A positive timeout should be accepted.");

		assert_eq!(config.request_timeout, Duration::seconds(10));
	}
}
