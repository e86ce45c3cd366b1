//! Immutable REST application credentials.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, IdentifierError, PayerId},
};

/// Client id/secret pair plus the optional partner context used by every call.
///
/// The client id and secret belong to the merchant for first-party calls or to the partner for
/// third-party calls. Configuring a payer id turns every call into a partner call carrying a
/// `PayPal-Auth-Assertion` header. The action hash is mixed into each `PayPal-Request-Id`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: ClientId,
	client_secret: ClientSecret,
	payer_id: Option<PayerId>,
	action_hash: String,
}
impl Credentials {
	/// Validates and wraps a client id/secret pair.
	pub fn new(
		client_id: impl AsRef<str>,
		client_secret: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		let client_id = ClientId::new(client_id)?;
		let client_secret = client_secret.into();

		if client_secret.is_empty() {
			return Err(IdentifierError::Empty { kind: "Client secret" });
		}

		Ok(Self {
			client_id,
			client_secret: ClientSecret::new(client_secret),
			payer_id: None,
			action_hash: String::new(),
		})
	}

	/// Attaches the merchant payer id for partner calls.
	pub fn with_payer_id(mut self, payer_id: PayerId) -> Self {
		self.payer_id = Some(payer_id);

		self
	}

	/// Attaches the partner action hash mixed into idempotency keys.
	pub fn with_action_hash(mut self, action_hash: impl Into<String>) -> Self {
		self.action_hash = action_hash.into();

		self
	}

	/// Client identifier (merchant or partner).
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Client secret; never log the exposed value.
	pub fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}

	/// Merchant payer id, when partner calls are configured.
	pub fn payer_id(&self) -> Option<&PayerId> {
		self.payer_id.as_ref()
	}

	/// Action hash (empty when unset).
	pub fn action_hash(&self) -> &str {
		&self.action_hash
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("payer_id", &self.payer_id)
			.field("action_hash_set", &!self.action_hash.is_empty())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_reject_empty_secret() {
		let err = Credentials::new("abc", "").expect_err("Empty secrets must be rejected.");

		assert_eq!(err, IdentifierError::Empty { kind: "Client secret" });
	}

	#[test]
	fn debug_output_redacts_secret() {
		let credentials = Credentials::new("abc", "xyz")
			.expect("Credentials fixture should be valid.")
			.with_action_hash("hash");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("xyz"));
		assert!(rendered.contains("action_hash_set: true"));
	}
}
