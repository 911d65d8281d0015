//! Token endpoint error classification.
//!
//! Structured OAuth fields (`error`, `error_description`) win. The HTTP status is consulted
//! only when the provider sent no `error` code at all, so an unrecognized code such as
//! `invalid_request` stays unexpected instead of posing as a rejected grant.

// self
use crate::_prelude::*;

/// Canonical categories for token endpoint failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization code.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes were refused.
	InsufficientScope,
	/// Anything else; surfaced as an unexpected token endpoint response.
	Unexpected,
}

/// Primitive data extracted from a failing token response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl ProviderErrorContext {
	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth `error` code.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Classifies the failure.
	pub fn classify(&self) -> ProviderErrorKind {
		let structured = self
			.oauth_error
			.as_deref()
			.and_then(match_exact_value)
			.or_else(|| self.error_description.as_deref().and_then(match_contained_value));

		match structured {
			Some(kind) => kind,
			None if self.oauth_error.is_some() => ProviderErrorKind::Unexpected,
			None => classify_status(self.http_status),
		}
	}
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else {
		None
	}
}

fn match_contained_value(text: &str) -> Option<ProviderErrorKind> {
	let lowered = text.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Unexpected,
	}
}

impl Display for ProviderErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Self::InvalidGrant => "invalid_grant",
			Self::InvalidClient => "invalid_client",
			Self::InsufficientScope => "insufficient_scope",
			Self::Unexpected => "unexpected",
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_field_takes_precedence() {
		let ctx = ProviderErrorContext::default().with_http_status(401).with_oauth_error("invalid_grant");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidGrant);

		let ctx = ProviderErrorContext::default().with_oauth_error("UNAUTHORIZED_CLIENT");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidClient);
	}

	#[test]
	fn description_is_searched_when_error_code_is_unknown() {
		let ctx = ProviderErrorContext::default()
			.with_http_status(500)
			.with_oauth_error("server_error")
			.with_error_description("invalid_grant: code already used");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn unknown_error_code_ignores_status() {
		for code in ["invalid_request", "unsupported_grant_type"] {
			let ctx = ProviderErrorContext::default().with_http_status(400).with_oauth_error(code);

			assert_eq!(ctx.classify(), ProviderErrorKind::Unexpected, "{code}");
		}
	}

	#[test]
	fn status_is_the_last_resort() {
		assert_eq!(
			ProviderErrorContext::default().with_http_status(403).classify(),
			ProviderErrorKind::InsufficientScope
		);
		assert_eq!(
			ProviderErrorContext::default().with_http_status(503).classify(),
			ProviderErrorKind::Unexpected
		);
		assert_eq!(ProviderErrorContext::default().classify(), ProviderErrorKind::Unexpected);
	}
}
