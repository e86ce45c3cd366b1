//! Disputes API models.

// self
use crate::{
	_prelude::*,
	model::{Constraints, Validate, ValidationError},
};

/// Status of a contestation shared with the processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestationStatus {
	/// Generated and shared with the processor, which must accept or deny it.
	Contested,
	/// Accepted by the processor.
	Accepted,
	/// Rejected by the processor.
	Denied,
}
impl ContestationStatus {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			ContestationStatus::Contested => "CONTESTED",
			ContestationStatus::Accepted => "ACCEPTED",
			ContestationStatus::Denied => "DENIED",
		}
	}
}
impl FromStr for ContestationStatus {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"CONTESTED" => Ok(ContestationStatus::Contested),
			"ACCEPTED" => Ok(ContestationStatus::Accepted),
			"DENIED" => Ok(ContestationStatus::Denied),
			_ => Err(Constraints::new("ResponseContestation", None).unknown_value("status", s)),
		}
	}
}

/// Origin of a contestation document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentSource {
	/// Generated by PayPal as part of the contestation.
	Paypal,
	/// Submitted by the seller as evidence.
	Seller,
}
impl DocumentSource {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			DocumentSource::Paypal => "PAYPAL",
			DocumentSource::Seller => "SELLER",
		}
	}
}

/// Contestation generated by PayPal and shared with the processor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseContestation {
	/// Supporting documents; between 1 and 100.
	#[serde(default)]
	pub documents: Vec<ResponseContestationDocument>,
	/// Raw status; see [`ContestationStatus`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// RFC 3339 creation timestamp.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub create_time: Option<String>,
	/// RFC 3339 update timestamp.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub update_time: Option<String>,
}
impl ResponseContestation {
	/// Sets the status from a known value.
	pub fn with_status(mut self, status: ContestationStatus) -> Self {
		self.status = Some(status.as_str().to_owned());

		self
	}

	/// Parses the raw status, if present.
	pub fn status(&self) -> Option<Result<ContestationStatus, ValidationError>> {
		self.status.as_deref().map(str::parse)
	}
}
impl Validate for ResponseContestation {
	fn validate(&self, within: Option<&str>) -> Result<(), ValidationError> {
		let check = Constraints::new("ResponseContestation", within);

		check.min_count("documents", &self.documents, 1)?;
		check.max_count("documents", &self.documents, 100)?;
		check.each(&self.documents)?;
		check.length("status", self.status.as_deref(), 1, 255)?;
		check.length("create_time", self.create_time.as_deref(), 20, 64)?;
		check.length("update_time", self.update_time.as_deref(), 20, 64)
	}
}

/// Document supporting a contestation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseContestationDocument {
	/// Document identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Document name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Document URI.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<Url>,
	/// Raw source; see [`DocumentSource`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}
impl ResponseContestationDocument {
	/// Sets the source from a known value.
	pub fn with_source(mut self, source: DocumentSource) -> Self {
		self.source = Some(source.as_str().to_owned());

		self
	}
}
impl Validate for ResponseContestationDocument {
	fn validate(&self, within: Option<&str>) -> Result<(), ValidationError> {
		let check = Constraints::new("ResponseContestationDocument", within);

		check.length("id", self.id.as_deref(), 1, 255)?;
		check.length("name", self.name.as_deref(), 1, 2000)?;
		check.length("source", self.source.as_deref(), 1, 255)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const PAYLOAD: &str = r#"{
		"documents": [
			{ "id": "DOC-1", "name": "evidence.pdf", "url": "https://example.com/d/1", "source": "SELLER" }
		],
		"status": "CONTESTED",
		"create_time": "2024-03-01T10:00:00Z"
	}"#;

	#[test]
	fn decodes_and_validates_contestation() {
		let contestation = serde_json::from_str::<ResponseContestation>(PAYLOAD)
			.expect("Contestation payload should decode.");

		contestation.validate(None).expect("Payload within bounds should validate.");
		assert_eq!(contestation.status().and_then(Result::ok), Some(ContestationStatus::Contested));
		assert_eq!(contestation.documents[0].source.as_deref(), Some(DocumentSource::Seller.as_str()));
	}

	#[test]
	fn empty_documents_violate_min_count() {
		let err = ResponseContestation::default()
			.with_status(ContestationStatus::Denied)
			.validate(None)
			.expect_err("At least one document is required.");

		assert_eq!(err.to_string(), "documents in ResponseContestation must have min. count of 1");
	}

	#[test]
	fn nested_document_errors_name_the_parent() {
		let contestation = ResponseContestation {
			documents: vec![ResponseContestationDocument {
				name: Some(String::new()),
				..Default::default()
			}
			.with_source(DocumentSource::Paypal)],
			..Default::default()
		};
		let err = contestation.validate(None).expect_err("Empty document name must fail.");

		assert_eq!(
			err.to_string(),
			"name in ResponseContestationDocument must have minlength of 1 within ResponseContestation"
		);
	}

	#[test]
	fn unknown_status_is_reported() {
		let contestation = ResponseContestation { status: Some("PENDING".into()), ..Default::default() };

		assert!(matches!(contestation.status(), Some(Err(e)) if e.field() == "status"));
	}
}
