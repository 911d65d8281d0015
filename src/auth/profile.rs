//! Opaque user profile returned by the provider's profile endpoint.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{self, ProfileError},
};

/// User profile exactly as the provider returned it.
///
/// No schema is enforced: the value may be any JSON document. Accessors return
/// `Option` and never fail, leaving interpretation to the verify callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Value);
impl Profile {
	/// Parses a raw response body.
	pub fn from_slice(body: &[u8]) -> Result<Self, ProfileError> {
		serde_json::from_slice(body)
			.map(Self)
			.map_err(|source| ProfileError::Parse { source, body_preview: error::body_preview(body) })
	}

	/// Returns the field stored under `key` when the profile is a JSON object.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the string stored under `key`, if any.
	pub fn str_field(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Convenience accessor for the conventional `id` field.
	pub fn id(&self) -> Option<&str> {
		self.str_field("id")
	}

	/// Returns the object map when the profile is a JSON object.
	pub fn as_object(&self) -> Option<&Map<String, Value>> {
		self.0.as_object()
	}

	/// Borrows the underlying JSON value.
	pub fn as_value(&self) -> &Value {
		&self.0
	}

	/// Consumes the profile and returns the underlying JSON value.
	pub fn into_value(self) -> Value {
		self.0
	}
}
impl From<Value> for Profile {
	fn from(value: Value) -> Self {
		Self(value)
	}
}
impl PartialEq<Value> for Profile {
	fn eq(&self, other: &Value) -> bool {
		&self.0 == other
	}
}
