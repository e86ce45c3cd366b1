//! Transport primitives shared by token exchanges and business requests.
//!
//! The module exposes [`ApiHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can plug in custom HTTP clients
//! without losing the client's error classification. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status is known.

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, header::RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Response header PayPal uses to correlate support requests.
pub const DEBUG_ID_HEADER: &str = "paypal-debug-id";
/// Maximum time spent establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::seconds(5);
/// Maximum time spent waiting for a complete response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

/// Abstraction over HTTP transports executing both token exchanges and API calls.
///
/// The trait is the client's only dependency on an HTTP stack. Callers provide an
/// implementation (typically behind `Arc<T>`) and the client requests short-lived
/// [`AsyncHttpClient`] handles that each carry a clone of a [`ResponseMetadataSlot`].
/// Handles must own whatever state they need so their request futures stay `Send`.
/// Non-success statuses are returned as responses, not errors; the client classifies them.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request so stale
	///   information never leaks across retries.
	/// - Once a response provides status headers, save them with [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// `PayPal-Debug-Id` header, if present.
	pub debug_id: Option<String>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Clients built through [`ReqwestHttpClient::new`] apply the fixed connect and request
/// timeouts and never follow redirects; configure custom clients the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with the default 5 s connect and 30 s request timeouts.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
	}

	/// Builds a client with explicit timeouts.
	pub fn with_timeouts(
		connect: Duration,
		request: Duration,
	) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.connect_timeout(to_std(connect))
			.timeout(to_std(request))
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds an instrumented HTTP client that captures response metadata.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestHttpClient`] that satisfies [`ApiHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				retry_after: parse_retry_after(&headers),
				debug_id: parse_debug_id(&headers),
			});

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

/// Extracts [`ResponseMetadata`] from a completed response.
pub fn metadata_from_response(response: &HttpResponse) -> ResponseMetadata {
	let headers = response.headers();

	ResponseMetadata {
		status: Some(response.status().as_u16()),
		retry_after: parse_retry_after(headers),
		debug_id: parse_debug_id(headers),
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).ok()?));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

fn parse_debug_id(headers: &HeaderMap) -> Option<String> {
	headers.get(DEBUG_ID_HEADER)?.to_str().ok().map(str::to_owned)
}

#[cfg(feature = "reqwest")]
fn to_std(duration: Duration) -> std::time::Duration {
	std::time::Duration::try_from(duration).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{HeaderValue, StatusCode};
	// self
	use super::*;

	#[test]
	fn metadata_reads_status_retry_after_and_debug_id() {
		let mut response = HttpResponse::new(Vec::new());

		*response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
		response.headers_mut().insert("retry-after", HeaderValue::from_static("7"));
		response.headers_mut().insert("paypal-debug-id", HeaderValue::from_static("f00d"));

		let meta = metadata_from_response(&response);

		assert_eq!(meta.status, Some(429));
		assert_eq!(meta.retry_after, Some(Duration::seconds(7)));
		assert_eq!(meta.debug_id.as_deref(), Some("f00d"));
	}

	#[test]
	fn slot_take_consumes_metadata() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(200), ..Default::default() });

		assert_eq!(slot.take().and_then(|m| m.status), Some(200));
		assert!(slot.take().is_none());
	}
}
