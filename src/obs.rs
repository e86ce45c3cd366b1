//! Optional observability helpers for authentication and dispatch.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `paypal_api.call` with the `call` (authenticate or
//!   dispatch) and `stage` (call site) fields, plus debug/warn events for dispatches, retries, and
//!   token cache failures.
//! - Enable `metrics` to increment the `paypal_api_call_total` counter for every
//!   attempt/success/failure/retry, labeled by `call` + `outcome`, and
//!   `paypal_api_token_cache_warning_total` labeled by `operation`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Client-credentials grant against the token endpoint.
	Authenticate,
	/// Business request dispatched to the API.
	Dispatch,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Authenticate => "authenticate",
			CallKind::Dispatch => "dispatch",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Re-authentication after a 401, followed by a second attempt.
	Retry,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
