//! Client-level error types shared across authentication, dispatch, and storage.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authentication against the token endpoint failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Business call failed; carries the HTTP status when one was received.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Model constraint violation.
	#[error(transparent)]
	Validation(#[from] crate::model::ValidationError),
}

impl From<crate::auth::IdentifierError> for Error {
	fn from(e: crate::auth::IdentifierError) -> Self {
		Self::Config(e.into())
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint cannot be parsed or joined with a path.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint does not use HTTPS and is not a loopback address.
	#[error("The endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A timeout is zero or negative.
	#[error("The {name} must be positive, got {timeout}.")]
	InvalidTimeout {
		/// Offending setting.
		name: &'static str,
		/// Rejected value.
		timeout: Duration,
	},
	/// Header name or value cannot be sent over HTTP.
	#[error("Header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Credentials failed validation.
	#[error("Credentials are invalid.")]
	InvalidCredentials(#[from] crate::auth::IdentifierError),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialization {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures while obtaining or using the OAuth 2.0 bearer token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The token endpoint could not be reached.
	#[error("Token endpoint is unreachable.")]
	Unreachable(#[source] TransportError),
	/// The token endpoint rejected the client credentials.
	#[error("Token endpoint rejected the credentials: {error}.")]
	Rejected {
		/// OAuth `error` code returned by PayPal.
		error: String,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The token response could not be parsed (e.g. `access_token` is missing).
	#[error("Token endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The token endpoint answered with something other than a token or an OAuth error.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Summary of the unexpected response.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Auth headers were requested before a token was obtained.
	#[error("No bearer token is available; authenticate first.")]
	NotAuthenticated,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The connect or request timeout elapsed.
	#[error("Request to {target} timed out.")]
	Timeout {
		/// Endpoint label (`token endpoint` or `API`).
		target: &'static str,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the PayPal API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport could not turn the request into a wire request.
	#[error("Request could not be prepared by the HTTP client.")]
	Request {
		/// Transport-specific builder error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the PayPal API.")]
	Io(#[from] std::io::Error),
	/// Any other client failure reported by the transport.
	#[error("HTTP client error occurred while calling the PayPal API: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific request preparation error.
	pub fn request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Request { source: Box::new(src) }
	}

	/// Returns `true` when the failure was a timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures surfaced by [`Client::send`](crate::client::Client::send).
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// PayPal answered with a non-success status (including a repeated 401).
	#[error("PayPal API responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, decoded lossily as UTF-8.
		body: String,
		/// `PayPal-Debug-Id` header, when present.
		debug_id: Option<String>,
		/// Retry-After hint, when present.
		retry_after: Option<Duration>,
	},
	/// Authentication failed before the business call could be made.
	#[error("Authentication failed before dispatching the request.")]
	Auth(#[source] AuthError),
	/// The request never produced a response.
	#[error("Request failed before a response was received.")]
	Transport(#[source] TransportError),
	/// A successful response body could not be decoded.
	#[error("Response body could not be decoded.")]
	MalformedBody {
		/// HTTP status code of the decoded response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}
impl ApiError {
	/// Returns the HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::MalformedBody { status, .. } => Some(*status),
			Self::Auth(
				AuthError::Rejected { status, .. }
				| AuthError::MalformedResponse { status, .. }
				| AuthError::UnexpectedResponse { status, .. },
			) => *status,
			Self::Auth(_) | Self::Transport(_) => None,
		}
	}

	/// Returns `true` when the failure is an HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_exposes_status_when_available() {
		let status = ApiError::Status {
			status: 422,
			body: "{}".into(),
			debug_id: Some("debug-1".into()),
			retry_after: None,
		};

		assert_eq!(status.status(), Some(422));
		assert!(!status.is_unauthorized());

		let auth = ApiError::Auth(AuthError::Rejected {
			error: "invalid_client".into(),
			description: None,
			status: Some(401),
		});

		assert_eq!(auth.status(), Some(401));

		let transport = ApiError::Transport(TransportError::Timeout { target: "API" });

		assert_eq!(transport.status(), None);
	}

	#[test]
	fn api_error_wraps_source() {
		let err: Error =
			ApiError::Transport(TransportError::Other { message: "boom".into() }).into();
		let source = StdError::source(&err).expect("Api error should expose its source.");

		assert!(err.to_string().contains("Request failed before a response"));
		assert!(source.to_string().contains("boom"));
	}
}
