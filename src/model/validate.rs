//! Constraint checks shared by the models.

// self
use crate::_prelude::*;

/// Checks a model against its documented constraints.
pub trait Validate {
	/// Validates the model; `within` names the enclosing model for nested values.
	fn validate(&self, within: Option<&str>) -> Result<(), ValidationError>;
}
impl<T> Validate for Option<T>
where
	T: Validate,
{
	fn validate(&self, within: Option<&str>) -> Result<(), ValidationError> {
		match self {
			Some(value) => value.validate(within),
			None => Ok(()),
		}
	}
}

/// Constraint violation reported by [`Validate`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ValidationError {
	field: &'static str,
	message: String,
}
impl ValidationError {
	/// Field that violated its constraint.
	pub fn field(&self) -> &'static str {
		self.field
	}

	/// Human-readable description, e.g. `name in Ideal must have minlength of 3`.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Constraint checker bound to one model type and its enclosing context.
#[derive(Clone, Copy, Debug)]
pub struct Constraints<'a> {
	model: &'static str,
	within: Option<&'a str>,
}
impl<'a> Constraints<'a> {
	/// Creates a checker for `model`, optionally nested `within` another model.
	pub fn new(model: &'static str, within: Option<&'a str>) -> Self {
		Self { model, within }
	}

	/// Requires a present value.
	pub fn not_null<T>(&self, field: &'static str, value: Option<&T>) -> Result<(), ValidationError> {
		match value {
			Some(_) => Ok(()),
			None => Err(self.violation(field, "must not be NULL".into())),
		}
	}

	/// Requires at least `min` characters when the value is present.
	pub fn min_length(
		&self,
		field: &'static str,
		value: Option<&str>,
		min: usize,
	) -> Result<(), ValidationError> {
		match value {
			Some(value) if value.chars().count() < min =>
				Err(self.violation(field, format!("must have minlength of {min}"))),
			_ => Ok(()),
		}
	}

	/// Allows at most `max` characters when the value is present.
	pub fn max_length(
		&self,
		field: &'static str,
		value: Option<&str>,
		max: usize,
	) -> Result<(), ValidationError> {
		match value {
			Some(value) if value.chars().count() > max =>
				Err(self.violation(field, format!("must have maxlength of {max}"))),
			_ => Ok(()),
		}
	}

	/// Shorthand for [`Self::min_length`] followed by [`Self::max_length`].
	pub fn length(
		&self,
		field: &'static str,
		value: Option<&str>,
		min: usize,
		max: usize,
	) -> Result<(), ValidationError> {
		self.min_length(field, value, min)?;
		self.max_length(field, value, max)
	}

	/// Requires at least `min` items.
	pub fn min_count<T>(
		&self,
		field: &'static str,
		items: &[T],
		min: usize,
	) -> Result<(), ValidationError> {
		if items.len() < min {
			return Err(self.violation(field, format!("must have min. count of {min}")));
		}

		Ok(())
	}

	/// Allows at most `max` items.
	pub fn max_count<T>(
		&self,
		field: &'static str,
		items: &[T],
		max: usize,
	) -> Result<(), ValidationError> {
		if items.len() > max {
			return Err(self.violation(field, format!("must have max. count of {max}")));
		}

		Ok(())
	}

	/// Reports a value outside the documented set.
	pub fn unknown_value(&self, field: &'static str, value: &str) -> ValidationError {
		self.violation(field, format!("must be one of the documented values, got `{value}`"))
	}

	/// Validates each nested item in the context of this model.
	pub fn each<T>(&self, items: &[T]) -> Result<(), ValidationError>
	where
		T: Validate,
	{
		items.iter().try_for_each(|item| item.validate(Some(self.model)))
	}

	fn violation(&self, field: &'static str, rule: String) -> ValidationError {
		let message = match self.within {
			Some(within) => format!("{field} in {} {rule} within {within}", self.model),
			None => format!("{field} in {} {rule}", self.model),
		};

		ValidationError { field, message }
	}
}
