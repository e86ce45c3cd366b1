// self
use crate::{
	_prelude::*,
	obs::CallKind,
	store::{StoreError, StoreOperation},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("paypal_api.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for an outbound business request.
pub fn log_dispatch(method: &str, path: &str, request_id: &str, attempt: u8) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(method, path, request_id, attempt, "Sending PayPal request.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, path, request_id, attempt);
	}
}

/// Emits a debug event when a 401 forces re-authentication.
pub fn log_reauthentication(path: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(path, "PayPal rejected the bearer token; re-authenticating once.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = path;
	}
}

/// Emits a warning for a token cache failure that does not block the caller.
pub fn log_store_warning(operation: StoreOperation, error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(operation = operation.as_str(), %error, "Token cache operation failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_accept_calls_without_subscriber() {
		let _span = CallSpan::new(CallKind::Authenticate, "test");

		log_dispatch("GET", "/v1/test", "request-id", 1);
		log_reauthentication("/v1/test");
		log_store_warning(StoreOperation::Clear, &StoreError::Backend { message: "x".into() });
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Dispatch, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
