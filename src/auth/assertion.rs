//! Unsigned `PayPal-Auth-Assertion` values for partner calls.
//!
//! The assertion is JWT-shaped (`header.payload.signature`) but uses `alg: none` and an empty
//! signature segment; PayPal only reads the issuer and payer id from it.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::auth::{ClientId, PayerId};

/// Header carrying the merchant assertion.
pub const AUTH_ASSERTION_HEADER: &str = "PayPal-Auth-Assertion";

const JOSE_HEADER: &str = r#"{"alg":"none"}"#;

/// Builds the assertion asserting that `issuer` acts on behalf of `payer_id`.
///
/// The payload keeps PayPal's documented byte layout, `{"iss": "<client id>", "payer_id":"<payer id>"}`.
pub fn merchant_assertion(issuer: &ClientId, payer_id: &PayerId) -> String {
	let payload = format!(
		r#"{{"iss": {}, "payer_id":{}}}"#,
		json_string(issuer.as_ref()),
		json_string(payer_id.as_ref()),
	);

	format!("{}.{}.", STANDARD.encode(JOSE_HEADER), STANDARD.encode(payload))
}

fn json_string(value: &str) -> String {
	serde_json::Value::from(value).to_string()
}
