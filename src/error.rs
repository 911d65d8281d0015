//! Strategy-level error types shared by the client, profile, and callback layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used wherever the concrete source type belongs to a caller.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by every public API.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, unexpected HTTP status).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Profile endpoint answered with a body that is not JSON.
	#[error(transparent)]
	Profile(#[from] ProfileError),
	/// Token endpoint returned something the client could not interpret.
	#[error(transparent)]
	TokenEndpoint(#[from] TokenEndpointError),

	/// Provider rejected the authorization code.
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Requested scopes were refused.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider redirected back with an `error` other than `access_denied`.
	#[error("Authorization was denied by the provider: {error}.")]
	AuthorizationDenied {
		/// OAuth `error` code from the redirect.
		error: String,
		/// Optional `error_description` from the redirect.
		description: Option<String>,
	},
	/// Callback carried neither `code` nor `error`.
	#[error("Callback request is missing the authorization code.")]
	MissingAuthorizationCode,
	/// Application verify callback failed.
	#[error("Verify callback failed.")]
	Verify(#[source] BoxError),
}
impl Error {
	/// Wraps an application error raised inside a verify callback.
	pub fn verify(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Verify(Box::new(src))
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A mandatory option was not supplied.
	#[error("The `{field}` option is required.")]
	MissingField {
		/// Option name as it appears in configuration.
		field: &'static str,
	},
	/// Provider endpoint cannot be parsed.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider endpoint uses a scheme other than HTTP(S).
	#[error("The {endpoint} endpoint must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Callback URL cannot be parsed.
	#[error("Callback URL is invalid.")]
	InvalidCallback {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Relative callback used without the URL of the request it belongs to.
	#[error("Callback `{callback}` is relative and no request URL was supplied to resolve it.")]
	UnresolvedCallback {
		/// Configured relative callback.
		callback: String,
	},
	/// Scope separators must be printable.
	#[error("Scope separator must be a printable character.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: char,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint responses that are neither tokens nor classifiable OAuth errors.
#[derive(Debug, ThisError)]
pub enum TokenEndpointError {
	/// Provider returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Provider answered an authenticated request with a non-2xx status.
	#[error("Provider responded with HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Leading part of the response body.
		body_preview: String,
	},
	/// HTTP client failed without a more specific cause.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Profile endpoint payload failures.
#[derive(Debug, ThisError)]
pub enum ProfileError {
	/// Body is not valid JSON.
	#[error("Profile endpoint returned malformed JSON.")]
	Parse {
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
		/// Leading part of the offending body.
		body_preview: String,
	},
}

const BODY_PREVIEW_LIMIT: usize = 256;

/// Truncates a response body for inclusion in error values.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
