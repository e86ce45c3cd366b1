//! Base-path scoped view over a [`Client`].

// self
use crate::{
	_prelude::*,
	client::Client,
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	request::{ApiResponse, Method, OutboundRequest},
};

/// Groups calls that share a base path, such as `/v2/checkout` or `/v1/customer/disputes`.
pub struct Service<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: &'a Client<C, M>,
	base_path: String,
}
impl<'a, C, M> Service<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a service rooted at `base_path`; a trailing `/` is ignored.
	pub fn new(client: &'a Client<C, M>, base_path: impl Into<String>) -> Self {
		let mut base_path = base_path.into();

		while base_path.ends_with('/') {
			base_path.pop();
		}

		Self { client, base_path }
	}

	/// Base path prepended to every call.
	pub fn base_path(&self) -> &str {
		&self.base_path
	}

	/// Composes and sends a request below the base path.
	///
	/// Parameters with empty values are dropped before the query string is encoded.
	pub async fn send<'p, P, H>(
		&self,
		method: Method,
		path: &str,
		params: P,
		headers: H,
		body: Option<Vec<u8>>,
	) -> Result<ApiResponse>
	where
		P: IntoIterator<Item = (&'p str, &'p str)>,
		H: IntoIterator<Item = (&'p str, &'p str)>,
	{
		let mut builder = OutboundRequest::builder(method, self.full_path(path)).query_pairs(params);

		for (name, value) in headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = body {
			builder = builder.body(body);
		}

		self.client.send(builder.build()?).await
	}

	/// Sends `value` as a JSON body below the base path.
	pub async fn send_json<T>(&self, method: Method, path: &str, value: &T) -> Result<ApiResponse>
	where
		T: ?Sized + Serialize,
	{
		let request = OutboundRequest::builder(method, self.full_path(path)).json(value).build()?;

		self.client.send(request).await
	}

	fn full_path(&self, path: &str) -> String {
		format!("{}{path}", self.base_path)
	}
}
impl<C, M> Debug for Service<'_, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Service").field("base_path", &self.base_path).finish()
	}
}
