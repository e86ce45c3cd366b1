//! Logical requests, responses, and the deterministic idempotency key.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		HeaderName, HeaderValue, Method as HttpMethod,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use url::form_urlencoded::Serializer as QuerySerializer;
// self
use crate::{_prelude::*, auth::AuthHeaders, error::ConfigError};

/// Header carrying the idempotency key.
pub const REQUEST_ID_HEADER: &str = "PayPal-Request-Id";
/// Media type used for request and response bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP methods accepted by the PayPal REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Upper-case wire name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}

	fn to_http(self) -> HttpMethod {
		match self {
			Method::Get => HttpMethod::GET,
			Method::Post => HttpMethod::POST,
			Method::Put => HttpMethod::PUT,
			Method::Patch => HttpMethod::PATCH,
			Method::Delete => HttpMethod::DELETE,
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = UnsupportedMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"PATCH" => Ok(Method::Patch),
			"DELETE" => Ok(Method::Delete),
			_ => Err(UnsupportedMethod(s.to_owned())),
		}
	}
}

/// Method name outside the supported set.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HTTP method `{0}` is not supported by the PayPal API.")]
pub struct UnsupportedMethod(pub String);

/// Fully composed request handed to the dispatcher.
///
/// Header names are stored lower-cased so lookups are case-insensitive and later writes win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
	method: Method,
	path: String,
	headers: BTreeMap<String, String>,
	body: Option<Vec<u8>>,
}
impl OutboundRequest {
	/// Starts a builder for `method` on `path` (relative to the endpoint, leading `/`).
	pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
		RequestBuilder::new(method, path)
	}

	/// Request method.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Path including the encoded query string.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the value of `name`, matched case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Iterates headers as `(lower-case name, value)`.
	pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
		self.headers.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Request body, when present.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Idempotency key for this request: the caller's `PayPal-Request-Id`, or the derived hash.
	pub fn request_id(&self, action_hash: &str) -> String {
		match self.header(REQUEST_ID_HEADER) {
			Some(value) => value.to_owned(),
			None => idempotency_key(&self.path, self.body(), action_hash),
		}
	}

	pub(crate) fn to_http_request(
		&self,
		url: &Url,
		auth: &AuthHeaders,
		request_id: &str,
	) -> Result<HttpRequest, ConfigError> {
		let mut builder = oauth2::http::Request::builder()
			.method(self.method.to_http())
			.uri(url.as_str())
			.header(ACCEPT, CONTENT_TYPE_JSON);

		for (name, value) in self.headers() {
			builder = builder.header(name, value);
		}
		for (name, value) in auth.iter() {
			builder = builder.header(name, value);
		}

		builder = builder.header(REQUEST_ID_HEADER, request_id);

		let mut request = builder.body(self.body.clone().unwrap_or_default())?;

		// `header` appends; keep only the last value so auth always overrides caller headers.
		dedup_headers(request.headers_mut());

		Ok(request)
	}
}

fn dedup_headers(headers: &mut oauth2::http::HeaderMap) {
	let names = headers.keys().cloned().collect::<Vec<_>>();

	for name in names {
		if let Some(last) = headers.get_all(&name).iter().last().cloned() {
			headers.insert(name, last);
		}
	}
}

/// Builder for [`OutboundRequest`] values.
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	headers: BTreeMap<String, String>,
	body: Option<Vec<u8>>,
	error: Option<ConfigError>,
}
impl RequestBuilder {
	/// Creates a builder for `method` on `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: BTreeMap::new(),
			body: None,
			error: None,
		}
	}

	/// Appends a query parameter.
	pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Appends query parameters, dropping those with empty values.
	pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (name, value) in pairs {
			let value = value.into();

			if !value.is_empty() {
				self.query.push((name.into(), value));
			}
		}

		self
	}

	/// Sets a header; names are case-insensitive and the last write wins.
	pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Sets the raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the JSON body and sets `Content-Type` unless already present.
	pub fn json<T>(mut self, value: &T) -> Self
	where
		T: ?Sized + Serialize,
	{
		match serde_json::to_vec(value) {
			Ok(body) => {
				self.body = Some(body);
				self.headers
					.entry(CONTENT_TYPE.as_str().to_owned())
					.or_insert_with(|| CONTENT_TYPE_JSON.to_owned());
			},
			Err(source) => self.error = Some(ConfigError::BodySerialization { source }),
		}

		self
	}

	/// Validates headers and produces the request.
	pub fn build(self) -> Result<OutboundRequest, ConfigError> {
		if let Some(e) = self.error {
			return Err(e);
		}

		for (name, value) in &self.headers {
			if HeaderName::from_bytes(name.as_bytes()).is_err()
				|| HeaderValue::from_str(value).is_err()
			{
				return Err(ConfigError::InvalidHeader { name: name.clone() });
			}
		}

		let path = if self.query.is_empty() {
			self.path
		} else {
			let query = QuerySerializer::new(String::new()).extend_pairs(&self.query).finish();
			let separator = if self.path.contains('?') { '&' } else { '?' };

			format!("{}{separator}{query}", self.path)
		};

		Ok(OutboundRequest { method: self.method, path, headers: self.headers, body: self.body })
	}
}

/// Response returned by a successful dispatch.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	status: u16,
	headers: BTreeMap<String, String>,
	body: Vec<u8>,
}
impl ApiResponse {
	pub(crate) fn from_http(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
			})
			.collect();

		Self { status, headers, body: response.into_body() }
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Returns the value of `name`, matched case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// `PayPal-Debug-Id` header, when present.
	pub fn debug_id(&self) -> Option<&str> {
		self.header(crate::http::DEBUG_ID_HEADER)
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self) -> Result<T, crate::error::ApiError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| crate::error::ApiError::MalformedBody { status: self.status, source })
	}
}

/// Derives the `PayPal-Request-Id` for a request.
///
/// SHA-256 over the length-prefixed path (with query), body bytes, and partner action hash,
/// encoded as unpadded URL-safe base64. Identical inputs always yield the same key.
pub fn idempotency_key(path: &str, body: Option<&[u8]>, action_hash: &str) -> String {
	let mut hasher = Sha256::new();

	for part in [path.as_bytes(), body.unwrap_or_default(), action_hash.as_bytes()] {
		hasher.update((part.len() as u64).to_be_bytes());
		hasher.update(part);
	}

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
