//! Request dispatcher: authentication, idempotency, and the single retry on 401.

pub mod service;

pub use service::*;

// crates.io
use oauth2::{AsyncHttpClient, HttpResponse};
// self
use crate::{
	_prelude::*,
	auth::{AuthManager, TokenSecret},
	config::ClientConfig,
	error::ApiError,
	http::{ApiHttpClient, ResponseMetadataSlot, metadata_from_response},
	oauth::TransportErrorMapper,
	obs::{self, CallKind, CallOutcome, CallSpan},
	request::{ApiResponse, Method, OutboundRequest, RequestBuilder},
	store::TokenStore,
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	store::{FileTokenStore, MemoryTokenStore},
};

const UNAUTHORIZED: u16 = 401;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// PayPal REST API client.
///
/// The client owns the HTTP transport, the error mapper, and the [`AuthManager`] holding the
/// bearer token. Every call goes through [`Client::send`]: the token is ensured, auth headers
/// and the `PayPal-Request-Id` idempotency key are attached, and an HTTP 401 triggers exactly
/// one re-authentication followed by one retry carrying the same idempotency key.
/// Cloning is cheap and clones share the token.
pub struct Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Arc<ClientConfig>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	auth: Arc<AuthManager<C, M>>,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport, mapper, and token store.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let auth = AuthManager::<C, M>::new(
			config.credentials.clone(),
			&config.token_url()?,
			store,
			http_client.clone(),
			transport_mapper.clone(),
		)?;

		Ok(Self { config: Arc::new(config), http_client, transport_mapper, auth: Arc::new(auth) })
	}

	/// Validated configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Authentication manager owning the bearer token.
	pub fn auth(&self) -> &AuthManager<C, M> {
		&self.auth
	}

	/// Starts a request builder for `method` on `path`.
	pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
		RequestBuilder::new(method, path)
	}

	/// Scopes calls under `base_path` (for example `/v2/checkout`).
	pub fn service(&self, base_path: impl Into<String>) -> Service<'_, C, M> {
		Service::new(self, base_path)
	}

	/// Sends `request`, authenticating first and retrying exactly once on HTTP 401.
	///
	/// Non-success statuses (including a second 401) surface as [`ApiError::Status`].
	pub async fn send(&self, request: OutboundRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Dispatch;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.dispatch(&request)).await;

		obs::record_call_outcome(
			KIND,
			if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure },
		);

		result
	}

	async fn dispatch(&self, request: &OutboundRequest) -> Result<ApiResponse> {
		let url = self.config.url_for(request.path())?;
		let request_id = request.request_id(self.config.credentials.action_hash());
		let (token, response) = self.attempt(request, &url, &request_id, 1).await?;

		if response.status().as_u16() != UNAUTHORIZED {
			return Ok(into_api_response(response)?);
		}

		obs::log_reauthentication(request.path());
		obs::record_call_outcome(CallKind::Dispatch, CallOutcome::Retry);
		self.auth.invalidate_stale(&token).await;

		let (_, response) = self.attempt(request, &url, &request_id, 2).await?;

		Ok(into_api_response(response)?)
	}

	async fn attempt(
		&self,
		request: &OutboundRequest,
		url: &Url,
		request_id: &str,
		attempt: u8,
	) -> Result<(TokenSecret, HttpResponse)> {
		let token = self.auth.ensure_authenticated().await.map_err(ApiError::Auth)?;
		let http_request =
			request.to_http_request(url, &self.auth.headers_for(&token), request_id)?;

		obs::log_dispatch(request.method().as_str(), request.path(), request_id, attempt);

		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle.call(http_request).await.map_err(|e| {
			ApiError::Transport(self.transport_mapper.map_transport_error(
				CallKind::Dispatch,
				slot.take().as_ref(),
				e,
			))
		})?;

		Ok((token, response))
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client with its own reqwest transport using the configured timeouts.
	///
	/// The token is cached in `token_cache_path` when set, otherwise in memory.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client =
			ReqwestHttpClient::with_timeouts(config.connect_timeout, config.request_timeout)?;
		let store: Arc<dyn TokenStore> = match &config.token_cache_path {
			Some(path) => Arc::new(FileTokenStore::new(path.clone())),
			None => Arc::new(MemoryTokenStore::default()),
		};

		Self::with_http_client(config, store, http_client, ReqwestTransportErrorMapper)
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			auth: self.auth.clone(),
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("auth", &self.auth)
			.finish()
	}
}

fn into_api_response(response: HttpResponse) -> Result<ApiResponse, ApiError> {
	if response.status().is_success() {
		return Ok(ApiResponse::from_http(response));
	}

	let meta = metadata_from_response(&response);

	Err(ApiError::Status {
		status: response.status().as_u16(),
		body: String::from_utf8_lossy(response.body()).into_owned(),
		debug_id: meta.debug_id,
		retry_after: meta.retry_after,
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{HeaderValue, StatusCode};
	// self
	use super::*;

	#[test]
	fn non_success_maps_to_status_error() {
		let mut response = HttpResponse::new(br#"{"name":"UNPROCESSABLE_ENTITY"}"#.to_vec());

		*response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
		response.headers_mut().insert("paypal-debug-id", HeaderValue::from_static("dbg-1"));

		match into_api_response(response) {
			Err(ApiError::Status { status, body, debug_id, retry_after }) => {
				assert_eq!(status, 422);
				assert!(body.contains("UNPROCESSABLE_ENTITY"));
				assert_eq!(debug_id.as_deref(), Some("dbg-1"));
				assert_eq!(retry_after, None);
			},
			other => panic!("Unexpected result: {other:?}."),
		}
	}

	#[test]
	fn success_passes_body_through() {
		let mut response = HttpResponse::new(b"{}".to_vec());

		*response.status_mut() = StatusCode::CREATED;

		let response = into_api_response(response).expect("201 must be a success.");

		assert_eq!(response.status(), 201);
		assert_eq!(response.body(), b"{}");
	}
}
