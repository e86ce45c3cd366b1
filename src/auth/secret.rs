//! Secret wrappers that redact sensitive material.

// self
use crate::_prelude::*;

macro_rules! def_secret {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		pub struct $name(String);
		impl $name {
			/// Wraps a new secret string.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// Returns the inner secret value. Callers must avoid logging this string.
			pub fn expose(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.expose()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
}

def_secret! { TokenSecret, "Redacted bearer token; the opaque value persisted by token stores." }
def_secret! { ClientSecret, "Redacted REST application client secret." }
