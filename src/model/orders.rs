//! Orders API models.

// self
use crate::{
	_prelude::*,
	model::{Constraints, Validate, ValidationError},
};

/// Information used to pay using iDEAL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ideal {
	/// Full name representation, like `Mr J Smith`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Two-character ISO 3166-1 country or region code (`GB`, not `UK`; `C2` for China
	/// worldwide).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country_code: Option<String>,
	/// Last characters of the IBAN used to pay.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iban_last_chars: Option<String>,
}
impl Validate for Ideal {
	fn validate(&self, within: Option<&str>) -> Result<(), ValidationError> {
		let check = Constraints::new("Ideal", within);

		check.length("name", self.name.as_deref(), 3, 300)?;
		check.length("country_code", self.country_code.as_deref(), 2, 2)?;
		check.length("iban_last_chars", self.iban_last_chars.as_deref(), 4, 34)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decodes_partial_payload_and_validates() {
		let ideal = serde_json::from_str::<Ideal>(r#"{"name":"Mr J Smith","country_code":"NL"}"#)
			.expect("Partial iDEAL payload should decode.");

		assert_eq!(ideal.iban_last_chars, None);
		ideal.validate(None).expect("Payload within bounds should validate.");
		assert_eq!(
			serde_json::to_string(&ideal).expect("Ideal should serialize."),
			r#"{"name":"Mr J Smith","country_code":"NL"}"#
		);
	}

	#[test]
	fn reports_first_violated_constraint() {
		let ideal = Ideal {
			name: Some("Mr J Smith".into()),
			country_code: Some("NLD".into()),
			iban_last_chars: Some("12".into()),
		};
		let err = ideal.validate(Some("PaymentSource")).expect_err("Three-letter code must fail.");

		assert_eq!(
			err.to_string(),
			"country_code in Ideal must have maxlength of 2 within PaymentSource"
		);
	}
}
