// self
use crate::{
	obs::{CallKind, CallOutcome},
	store::StoreOperation,
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"paypal_api_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a token cache operation that failed without blocking the caller.
pub fn record_store_warning(operation: StoreOperation) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"paypal_api_token_cache_warning_total",
			"operation" => operation.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = operation;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_call_outcome(CallKind::Dispatch, CallOutcome::Retry);
		record_store_warning(StoreOperation::Store);
	}
}
