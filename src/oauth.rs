//! OAuth 2.0 client-credentials exchange and transport error mapping.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderValue, Method as HttpMethod,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	error::{AuthError, ConfigError, TransportError},
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::CallKind,
};

/// Path of the PayPal token endpoint relative to the API base URL.
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const GRANT_BODY: &str = "grant_type=client_credentials";

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a transport error.
	fn map_transport_error(
		&self,
		call: CallKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		call: CallKind,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(call, *inner),
			HttpClientError::Http(inner) => TransportError::request(inner),
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { message },
			_ => TransportError::Other { message: format!("unclassified {call} failure") },
		}
	}
}

/// Token issued by the client-credentials grant.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Bearer token.
	pub access_token: TokenSecret,
	/// Lifetime announced by PayPal, when present.
	pub expires_in: Option<Duration>,
}

#[derive(Deserialize)]
struct TokenBody {
	access_token: String,
	#[serde(default)]
	expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Performs the client-credentials grant on top of an [`ApiHttpClient`].
///
/// The `Authorization` header is `Basic base64(id:secret)` over the raw credential values.
pub(crate) struct TokenExchange<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	token_url: Url,
	authorization: HeaderValue,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> TokenExchange<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		token_url: &Url,
		credentials: &Credentials,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self, ConfigError> {
		let authorization = basic_authorization(credentials)?;

		Ok(Self { token_url: token_url.clone(), authorization, http_client, error_mapper })
	}

	/// Exchanges the client id/secret for a bearer token.
	pub(crate) async fn client_credentials(&self) -> Result<IssuedToken, AuthError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let request = self
			.token_request()
			.map_err(|e| AuthError::Unreachable(TransportError::request(e)))?;
		let response = handle.call(request).await.map_err(|e| {
			AuthError::Unreachable(self.error_mapper.map_transport_error(
				CallKind::Authenticate,
				meta.take().as_ref(),
				e,
			))
		})?;

		parse_token_response(&response)
	}

	fn token_request(&self) -> Result<HttpRequest, oauth2::http::Error> {
		oauth2::http::Request::builder()
			.method(HttpMethod::POST)
			.uri(self.token_url.as_str())
			.header(AUTHORIZATION, self.authorization.clone())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, crate::request::CONTENT_TYPE_JSON)
			.body(GRANT_BODY.as_bytes().to_vec())
	}
}

fn basic_authorization(credentials: &Credentials) -> Result<HeaderValue, ConfigError> {
	let raw = format!("{}:{}", credentials.client_id(), credentials.client_secret().expose());
	let mut value = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(raw)))
		.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.as_str().to_owned() })?;

	value.set_sensitive(true);

	Ok(value)
}

fn parse_token_response(response: &HttpResponse) -> Result<IssuedToken, AuthError> {
	let status = response.status().as_u16();
	let body = response.body();

	if !response.status().is_success() {
		return Err(rejection(status, body));
	}
	if body.is_empty() {
		return Err(AuthError::UnexpectedResponse {
			message: "empty token response".into(),
			status: Some(status),
		});
	}
	if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
		let json = content_type
			.to_str()
			.is_ok_and(|value| value.to_ascii_lowercase().contains("json"));

		if !json {
			return Err(AuthError::UnexpectedResponse {
				message: format!("token response has content type {content_type:?}"),
				status: Some(status),
			});
		}
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let token: TokenBody = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthError::MalformedResponse { source, status: Some(status) })?;

	if token.access_token.trim().is_empty() {
		return Err(AuthError::UnexpectedResponse {
			message: "token response carries an empty access_token".into(),
			status: Some(status),
		});
	}

	Ok(IssuedToken {
		access_token: TokenSecret::new(token.access_token),
		expires_in: token
			.expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.map(Duration::seconds),
	})
}

fn rejection(status: u16, body: &[u8]) -> AuthError {
	match serde_json::from_slice::<OAuthErrorBody>(body) {
		Ok(error) => AuthError::Rejected {
			error: error.error,
			description: error.error_description,
			status: Some(status),
		},
		Err(_) => AuthError::UnexpectedResponse {
			message: format!("HTTP {status}: {}", String::from_utf8_lossy(body)),
			status: Some(status),
		},
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(call: CallKind, err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		let target = match call {
			CallKind::Authenticate => "the token endpoint",
			CallKind::Dispatch => "the PayPal API",
		};

		return TransportError::Timeout { target };
	}
	if err.is_builder() {
		return TransportError::request(err);
	}

	TransportError::from(err)
}
