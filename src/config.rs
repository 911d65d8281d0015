//! Strategy configuration supplied by the integrating application.
//!
//! [`StrategyConfig`] carries only the client registration (identifier, secret, callback)
//! and a handful of behavioral switches. Provider endpoints are never part of it; they are
//! owned by the provider module so no configuration can redirect tokens elsewhere.

// self
use crate::{_prelude::*, error::ConfigError};

/// Client registration and behavior switches for an OAuth 2.0 strategy.
///
/// The struct deserializes with serde so applications can embed it in their own
/// configuration files; call [`StrategyConfig::validate`] (or construct a strategy, which
/// does so) before use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
	/// Identifies the client to the provider.
	#[serde(default)]
	pub client_id: String,
	/// Secret establishing ownership of the client identifier.
	#[serde(default)]
	pub client_secret: String,
	/// URL the provider redirects to after authorization.
	///
	/// A path such as `/auth/briq/callback` is resolved against the URL of the request
	/// being handled; see [`CallbackUrl`].
	#[serde(default)]
	pub callback_url: String,
	/// When `true`, the callback request is handed to the verify callback.
	#[serde(default)]
	pub pass_request_to_callback: bool,
	/// Scopes requested during authorization.
	#[serde(default)]
	pub scope: Vec<String>,
	/// Character used to join scopes in the `scope` parameter.
	#[serde(default = "default_scope_separator")]
	pub scope_separator: char,
	/// Sends an S256 PKCE challenge with the authorization request.
	#[serde(default)]
	pub pkce: bool,
	/// Skips the profile fetch during [`authenticate`](crate::strategy::OAuth2Strategy::authenticate).
	#[serde(default)]
	pub skip_user_profile: bool,
}
impl StrategyConfig {
	/// Creates a new builder.
	pub fn builder() -> StrategyConfigBuilder {
		StrategyConfigBuilder::default()
	}

	/// Checks mandatory options and returns the parsed callback URL.
	pub fn validate(&self) -> Result<CallbackUrl, ConfigError> {
		require("client_id", &self.client_id)?;
		require("client_secret", &self.client_secret)?;
		require("callback_url", &self.callback_url)?;

		if self.scope_separator.is_control() {
			return Err(ConfigError::InvalidScopeSeparator { separator: self.scope_separator });
		}

		CallbackUrl::parse(&self.callback_url)
	}

	/// Joins the configured scopes with the configured separator.
	pub fn joined_scope(&self) -> Option<String> {
		if self.scope.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.scope.iter().enumerate() {
			if idx > 0 {
				buf.push(self.scope_separator);
			}

			buf.push_str(value);
		}

		Some(buf)
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("callback_url", &self.callback_url)
			.field("pass_request_to_callback", &self.pass_request_to_callback)
			.field("scope", &self.scope)
			.field("pkce", &self.pkce)
			.field("skip_user_profile", &self.skip_user_profile)
			.finish()
	}
}

/// Callback URL as configured, either absolute or relative to the incoming request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackUrl {
	/// Fully-qualified URL sent as `redirect_uri` as-is.
	Absolute(Url),
	/// Path (optionally with query) joined onto the URL of the request being handled.
	Relative(String),
}
impl CallbackUrl {
	/// Parses a configured callback value.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		match Url::parse(raw) {
			Ok(url) => Ok(Self::Absolute(url)),
			Err(url::ParseError::RelativeUrlWithoutBase) => {
				// Any base works to check the path is joinable.
				Url::parse("http://localhost")
					.and_then(|base| base.join(raw))
					.map_err(|source| ConfigError::InvalidCallback { source })?;

				Ok(Self::Relative(raw.to_owned()))
			},
			Err(source) => Err(ConfigError::InvalidCallback { source }),
		}
	}

	/// Returns the absolute callback, if configured as one.
	pub fn as_absolute(&self) -> Option<&Url> {
		match self {
			Self::Absolute(url) => Some(url),
			Self::Relative(_) => None,
		}
	}

	/// Resolves the callback for one request.
	///
	/// Relative callbacks require `request_url`; absolute ones ignore it.
	pub fn resolve(&self, request_url: Option<&Url>) -> Result<Url, ConfigError> {
		match (self, request_url) {
			(Self::Absolute(url), _) => Ok(url.clone()),
			(Self::Relative(path), Some(base)) =>
				base.join(path).map_err(|source| ConfigError::InvalidCallback { source }),
			(Self::Relative(path), None) =>
				Err(ConfigError::UnresolvedCallback { callback: path.clone() }),
		}
	}
}

/// Fluent builder for [`StrategyConfig`].
#[derive(Debug)]
pub struct StrategyConfigBuilder {
	client_id: Option<String>,
	client_secret: Option<String>,
	callback_url: Option<String>,
	pass_request_to_callback: bool,
	scope: Vec<String>,
	scope_separator: char,
	pkce: bool,
	skip_user_profile: bool,
}
impl Default for StrategyConfigBuilder {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			callback_url: None,
			pass_request_to_callback: false,
			scope: Vec::new(),
			scope_separator: default_scope_separator(),
			pkce: false,
			skip_user_profile: false,
		}
	}
}
impl StrategyConfigBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Sets the callback URL.
	pub fn callback_url(mut self, value: impl Into<String>) -> Self {
		self.callback_url = Some(value.into());

		self
	}

	/// Hands the callback request to the verify callback.
	pub fn pass_request_to_callback(mut self, enabled: bool) -> Self {
		self.pass_request_to_callback = enabled;

		self
	}

	/// Adds scopes to request during authorization.
	pub fn scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the scope separator (defaults to a single space).
	pub fn scope_separator(mut self, separator: char) -> Self {
		self.scope_separator = separator;

		self
	}

	/// Enables PKCE for authorization requests.
	pub fn pkce(mut self, enabled: bool) -> Self {
		self.pkce = enabled;

		self
	}

	/// Skips the profile fetch after the code exchange.
	pub fn skip_user_profile(mut self, enabled: bool) -> Self {
		self.skip_user_profile = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let config = StrategyConfig {
			client_id: self.client_id.unwrap_or_default(),
			client_secret: self.client_secret.unwrap_or_default(),
			callback_url: self.callback_url.unwrap_or_default(),
			pass_request_to_callback: self.pass_request_to_callback,
			scope: self.scope,
			scope_separator: self.scope_separator,
			pkce: self.pkce,
			skip_user_profile: self.skip_user_profile,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_scope_separator() -> char {
	' '
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { field }) } else { Ok(()) }
}
