//! Provider redirect parsing.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Query parameters the provider attaches to the callback redirect.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRequest {
	/// Authorization code to exchange.
	pub code: Option<String>,
	/// State value echoed by the provider.
	pub state: Option<String>,
	/// OAuth `error` code when authorization failed.
	pub error: Option<String>,
	/// Human-readable error description.
	pub error_description: Option<String>,
	/// Link to an error page.
	pub error_uri: Option<String>,
	/// Full URL the redirect arrived on, used to resolve a relative callback.
	pub url: Option<Url>,
}
impl CallbackRequest {
	/// Callback carrying only an authorization code.
	pub fn with_code(code: impl Into<String>) -> Self {
		Self { code: Some(code.into()), ..Default::default() }
	}

	/// Parses the query of a full callback URL and remembers the URL itself.
	pub fn from_url(url: &Url) -> Self {
		Self { url: Some(url.clone()), ..Self::from_pairs(url.query_pairs()) }
	}

	/// Parses a raw query string, with or without the leading `?`.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);

		Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
	}

	fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
		let mut request = Self::default();

		for (key, value) in pairs {
			if value.is_empty() {
				continue;
			}

			let slot = match &*key {
				"code" => &mut request.code,
				"state" => &mut request.state,
				"error" => &mut request.error,
				"error_description" => &mut request.error_description,
				"error_uri" => &mut request.error_uri,
				_ => continue,
			};

			slot.get_or_insert_with(|| value.into_owned());
		}

		request
	}
}
