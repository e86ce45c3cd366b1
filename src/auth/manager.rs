//! Bearer token lifecycle: client-credentials grant, caching, header decoration, invalidation.
//!
//! [`AuthManager`] owns the only "current" token. It starts in
//! [`AuthState::Unauthenticated`], consults the [`TokenStore`] once on cold start, and otherwise
//! performs the client-credentials grant the first time a caller needs a token. A singleflight
//! guard serializes grants so concurrent callers that find no token trigger exactly one token
//! request. A 401 observed by the dispatcher moves the manager back to `Unauthenticated`
//! through [`AuthManager::invalidate`].

// self
use crate::{
	_prelude::*,
	auth::{AUTH_ASSERTION_HEADER, Credentials, TokenSecret, merchant_assertion},
	error::{AuthError, ConfigError},
	http::ApiHttpClient,
	oauth::{TokenExchange, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::{StoreError, StoreOperation, TokenStore},
};

/// Header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Authentication state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
	/// No token is current.
	Unauthenticated,
	/// A client-credentials grant is in flight.
	Authenticating,
	/// A token is current.
	Authenticated,
	/// The last grant failed; the next call starts from scratch.
	Failed,
}

/// Headers attached to every business request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
	authorization: String,
	assertion: Option<String>,
}
impl AuthHeaders {
	/// `Bearer <token>` value.
	pub fn authorization(&self) -> &str {
		&self.authorization
	}

	/// `PayPal-Auth-Assertion` value, present only for partner calls.
	pub fn assertion(&self) -> Option<&str> {
		self.assertion.as_deref()
	}

	/// Iterates `(name, value)` pairs in the order they should be applied.
	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		[(AUTHORIZATION_HEADER, Some(self.authorization.as_str())), (
			AUTH_ASSERTION_HEADER,
			self.assertion.as_deref(),
		)]
		.into_iter()
		.filter_map(|(name, value)| value.map(|value| (name, value)))
	}
}
impl Debug for AuthHeaders {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthHeaders")
			.field("authorization", &"Bearer <redacted>")
			.field("assertion", &self.assertion)
			.finish()
	}
}

#[derive(Clone)]
struct CurrentToken {
	secret: TokenSecret,
	expires_at: Option<OffsetDateTime>,
}

struct TokenState {
	current: Option<CurrentToken>,
	cache_consulted: bool,
	state: AuthState,
}

/// Owns the bearer token and decides when the client must re-authenticate.
pub struct AuthManager<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	credentials: Credentials,
	store: Arc<dyn TokenStore>,
	exchange: TokenExchange<C, M>,
	token: Mutex<TokenState>,
	singleflight: AsyncMutex<()>,
	expiry_window: Duration,
}
impl<C, M> AuthManager<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	const DEFAULT_EXPIRY_WINDOW: Duration = Duration::seconds(60);

	/// Creates a manager that authenticates against `token_url`.
	pub fn new(
		credentials: Credentials,
		token_url: &Url,
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self, ConfigError> {
		let exchange =
			TokenExchange::new(token_url, &credentials, http_client.into(), mapper.into())?;

		Ok(Self {
			credentials,
			store,
			exchange,
			token: Mutex::new(TokenState {
				current: None,
				cache_consulted: false,
				state: AuthState::Unauthenticated,
			}),
			singleflight: AsyncMutex::new(()),
			expiry_window: Self::DEFAULT_EXPIRY_WINDOW,
		})
	}

	/// Overrides how long before the announced expiry a self-issued token is replaced.
	pub fn with_expiry_window(mut self, window: Duration) -> Self {
		self.expiry_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Credentials used by the manager.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Current state of the authentication state machine.
	pub fn state(&self) -> AuthState {
		self.token.lock().state
	}

	/// Returns `true` when a usable token is held in memory.
	pub fn is_authenticated(&self) -> bool {
		self.current(OffsetDateTime::now_utc()).is_some()
	}

	/// Returns the current token, reading the cache on cold start.
	pub async fn token(&self) -> Option<TokenSecret> {
		if let Some(token) = self.current(OffsetDateTime::now_utc()) {
			return Some(token);
		}

		let _singleflight = self.singleflight.lock().await;

		match self.current(OffsetDateTime::now_utc()) {
			Some(token) => Some(token),
			None => self.load_cached().await,
		}
	}

	/// Injects a token obtained elsewhere and persists it.
	pub async fn set_token(&self, token: TokenSecret) {
		let _singleflight = self.singleflight.lock().await;

		self.adopt(token.clone(), None);
		self.persist(token).await;
	}

	/// Guarantees a current token, performing the client-credentials grant when none is held.
	///
	/// Failures invalidate the cached token so the next call starts fresh.
	pub async fn ensure_authenticated(&self) -> Result<TokenSecret, AuthError> {
		if let Some(token) = self.current(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.singleflight.lock().await;

		if let Some(token) = self.current(OffsetDateTime::now_utc()) {
			return Ok(token);
		}
		if let Some(token) = self.load_cached().await {
			return Ok(token);
		}

		self.authenticate().await
	}

	/// Builds the `Authorization` header and, for partner calls, the merchant assertion.
	pub fn build_auth_headers(&self) -> Result<AuthHeaders, AuthError> {
		let token = self.current(OffsetDateTime::now_utc()).ok_or(AuthError::NotAuthenticated)?;

		Ok(self.headers_for(&token))
	}

	/// Builds auth headers for an explicit token.
	pub fn headers_for(&self, token: &TokenSecret) -> AuthHeaders {
		let assertion = self
			.credentials
			.payer_id()
			.map(|payer_id| merchant_assertion(self.credentials.client_id(), payer_id));

		AuthHeaders { authorization: format!("Bearer {}", token.expose()), assertion }
	}

	/// Drops the current token from memory and from the cache.
	pub async fn invalidate(&self) {
		let _singleflight = self.singleflight.lock().await;

		self.reset(AuthState::Unauthenticated);
		self.clear_cache().await;
	}

	/// Drops `stale` unless another caller already replaced it.
	pub(crate) async fn invalidate_stale(&self, stale: &TokenSecret) {
		let _singleflight = self.singleflight.lock().await;
		let replaced = {
			let guard = self.token.lock();

			guard.current.as_ref().is_some_and(|current| current.secret != *stale)
		};

		if replaced {
			return;
		}

		self.reset(AuthState::Unauthenticated);
		self.clear_cache().await;
	}

	async fn authenticate(&self) -> Result<TokenSecret, AuthError> {
		const KIND: CallKind = CallKind::Authenticate;

		let span = CallSpan::new(KIND, "ensure_authenticated");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.token.lock().state = AuthState::Authenticating;

		let result = span.instrument(self.exchange.client_credentials()).await;

		match result {
			Ok(issued) => {
				let expires_at = issued.expires_in.map(|ttl| OffsetDateTime::now_utc() + ttl);

				self.adopt(issued.access_token.clone(), expires_at);
				self.persist(issued.access_token.clone()).await;
				obs::record_call_outcome(KIND, CallOutcome::Success);

				Ok(issued.access_token)
			},
			Err(e) => {
				self.reset(AuthState::Failed);
				self.clear_cache().await;
				obs::record_call_outcome(KIND, CallOutcome::Failure);

				Err(e)
			},
		}
	}

	fn current(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let guard = self.token.lock();
		let current = guard.current.as_ref()?;
		let fresh = current.expires_at.is_none_or(|expires_at| expires_at - self.expiry_window > now);

		fresh.then(|| current.secret.clone())
	}

	fn adopt(&self, secret: TokenSecret, expires_at: Option<OffsetDateTime>) {
		let mut guard = self.token.lock();

		guard.current = Some(CurrentToken { secret, expires_at });
		guard.cache_consulted = true;
		guard.state = AuthState::Authenticated;
	}

	fn reset(&self, state: AuthState) {
		let mut guard = self.token.lock();

		guard.current = None;
		guard.cache_consulted = true;
		guard.state = state;
	}

	async fn load_cached(&self) -> Option<TokenSecret> {
		{
			let mut guard = self.token.lock();

			if guard.cache_consulted {
				return None;
			}

			guard.cache_consulted = true;
		}

		match self.store.load().await {
			Ok(Some(token)) => {
				self.adopt(token.clone(), None);

				Some(token)
			},
			Ok(None) => None,
			Err(e) => {
				warn_store(StoreOperation::Load, &e);

				None
			},
		}
	}

	async fn persist(&self, token: TokenSecret) {
		if let Err(e) = self.store.store(token).await {
			warn_store(StoreOperation::Store, &e);
		}
	}

	async fn clear_cache(&self) {
		if let Err(e) = self.store.clear().await {
			warn_store(StoreOperation::Clear, &e);
		}
	}
}
impl<C, M> Debug for AuthManager<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthManager")
			.field("credentials", &self.credentials)
			.field("state", &self.state())
			.finish()
	}
}

fn warn_store(operation: StoreOperation, error: &StoreError) {
	obs::log_store_warning(operation, error);
	obs::record_store_warning(operation);
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::PayerId,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		store::MemoryTokenStore,
	};

	type TestManager = AuthManager<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	fn manager(credentials: Credentials, store: MemoryTokenStore) -> TestManager {
		let token_url = Url::parse("https://api.sandbox.paypal.com/v1/oauth2/token")
			.expect("Token URL should parse.");

		AuthManager::new(
			credentials,
			&token_url,
			Arc::new(store),
			ReqwestHttpClient::new().expect("Default reqwest client should build."),
			ReqwestTransportErrorMapper,
		)
		.expect("Auth manager should build.")
	}

	#[test]
	fn headers_require_a_current_token() {
		let credentials = Credentials::new("abc", "xyz").expect("Credentials should be valid.");
		let manager = manager(credentials, MemoryTokenStore::default());

		assert!(matches!(manager.build_auth_headers(), Err(AuthError::NotAuthenticated)));
		assert_eq!(manager.state(), AuthState::Unauthenticated);
	}

	#[tokio::test]
	async fn cached_token_is_adopted_without_network() {
		let credentials = Credentials::new("abc", "xyz").expect("Credentials should be valid.");
		let manager = manager(credentials, MemoryTokenStore::seeded(TokenSecret::new("cached")));
		let token = manager
			.ensure_authenticated()
			.await
			.expect("A cached token must satisfy ensure_authenticated.");

		assert_eq!(token.expose(), "cached");
		assert_eq!(manager.state(), AuthState::Authenticated);

		let headers = manager.build_auth_headers().expect("Headers should build.");

		assert_eq!(headers.authorization(), "Bearer cached");
		assert_eq!(headers.assertion(), None);
		assert_eq!(headers.iter().count(), 1);
	}

	#[tokio::test]
	async fn payer_id_adds_assertion_header() {
		let credentials = Credentials::new("partner", "xyz")
			.expect("Credentials should be valid.")
			.with_payer_id(PayerId::new("MERCHANT42").expect("Payer id should be valid."));
		let manager = manager(credentials, MemoryTokenStore::default());

		manager.set_token(TokenSecret::new("injected")).await;

		let headers = manager.build_auth_headers().expect("Headers should build.");
		let names = headers.iter().map(|(name, _)| name).collect::<Vec<_>>();

		assert_eq!(names, vec![AUTHORIZATION_HEADER, AUTH_ASSERTION_HEADER]);
		assert!(headers.assertion().is_some_and(|value| value.ends_with('.')));
	}

	#[tokio::test]
	async fn invalidate_clears_memory_and_cache() {
		let credentials = Credentials::new("abc", "xyz").expect("Credentials should be valid.");
		let store = MemoryTokenStore::default();
		let manager = manager(credentials, store.clone());

		manager.set_token(TokenSecret::new("doomed")).await;

		assert!(store.snapshot().is_some());
		assert!(manager.is_authenticated());

		manager.invalidate().await;

		assert!(!manager.is_authenticated());
		assert!(store.snapshot().is_none());
		assert_eq!(manager.state(), AuthState::Unauthenticated);
		assert!(manager.token().await.is_none());
	}

	#[tokio::test]
	async fn invalidate_stale_keeps_a_replaced_token() {
		let credentials = Credentials::new("abc", "xyz").expect("Credentials should be valid.");
		let manager = manager(credentials, MemoryTokenStore::default());

		manager.set_token(TokenSecret::new("fresh")).await;
		manager.invalidate_stale(&TokenSecret::new("stale")).await;

		assert_eq!(manager.token().await.map(|t| t.expose().to_owned()), Some("fresh".into()));

		manager.invalidate_stale(&TokenSecret::new("fresh")).await;

		assert!(!manager.is_authenticated());
	}
}
