//! Provider-facing endpoint data and token error classification.
//!
//! [`ProviderEndpoints`] holds the three URLs a strategy talks to. `classify` maps OAuth
//! error responses from the token endpoint into the crate's error taxonomy without
//! tying the mapping to any HTTP client.

pub mod classify;

pub use classify::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Endpoint set a strategy is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the user agent is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Profile endpoint returning the authenticated user as JSON.
	pub profile: Url,
}
impl ProviderEndpoints {
	/// Parses and validates the three endpoint URLs.
	pub fn parse(authorization: &str, token: &str, profile: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			authorization: parse_endpoint("authorization", authorization)?,
			token: parse_endpoint("token", token)?,
			profile: parse_endpoint("profile", profile)?,
		})
	}

	/// Derives the endpoints by joining fixed paths onto a base URL.
	pub fn from_base(
		base: &str,
		authorization_path: &str,
		token_path: &str,
		profile_path: &str,
	) -> Result<Self, ConfigError> {
		let base = base.trim_end_matches('/');

		Self::parse(
			&format!("{base}{authorization_path}"),
			&format!("{base}{token_path}"),
			&format!("{base}{profile_path}"),
		)
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

	match url.scheme() {
		"https" | "http" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { endpoint, url: url.to_string() }),
	}
}
