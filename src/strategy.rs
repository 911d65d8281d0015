//! Pluggable authentication strategy built on an [`OAuth2Client`].
//!
//! A host middleware dispatches to a strategy by [`name`](OAuth2Strategy::name), sends the
//! user agent to [`authorization_request`](OAuth2Strategy::authorization_request), and hands
//! the provider's redirect to [`authenticate`](OAuth2Strategy::authenticate). The strategy
//! exchanges the code, fetches the profile, and lets the application's [`Verify`] callback
//! decide who the user is. It keeps no state between attempts, so one instance can serve
//! any number of concurrent logins.

pub mod authorize;
pub mod callback;

pub use authorize::*;
pub use callback::*;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{Profile, TokenSet},
	config::{CallbackUrl, StrategyConfig},
	oauth::OAuth2Client,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderEndpoints,
};
#[cfg(feature = "reqwest")] use crate::oauth::ReqwestOAuth2Client;

const ACCESS_DENIED: &str = "access_denied";

/// Application callback mapping tokens and a profile to an application user.
///
/// Any `Fn(VerifyContext) -> impl Future<Output = Result<Verified<U>>>` closure implements
/// the trait.
pub trait Verify: Send + Sync {
	/// Application user record.
	type User;

	/// Decides whether the attempt authenticates a user.
	fn verify(
		&self,
		ctx: VerifyContext,
	) -> impl Future<Output = Result<Verified<Self::User>>> + Send;
}
impl<F, Fut, U> Verify for F
where
	F: Send + Sync + Fn(VerifyContext) -> Fut,
	Fut: Send + Future<Output = Result<Verified<U>>>,
{
	type User = U;

	fn verify(&self, ctx: VerifyContext) -> impl Future<Output = Result<Verified<U>>> + Send {
		self(ctx)
	}
}

/// Inputs handed to a [`Verify`] callback.
#[derive(Clone, Debug)]
pub struct VerifyContext {
	/// Callback request, present only when `pass_request_to_callback` is enabled.
	pub request: Option<CallbackRequest>,
	/// Tokens issued by the code exchange.
	pub tokens: TokenSet,
	/// Provider profile, absent when `skip_user_profile` is enabled.
	pub profile: Option<Profile>,
}
impl VerifyContext {
	/// Returns the access token. Callers must avoid logging it.
	pub fn access_token(&self) -> &str {
		self.tokens.access_token.expose()
	}

	/// Returns the refresh token, when issued.
	pub fn refresh_token(&self) -> Option<&str> {
		self.tokens.refresh_token.as_ref().map(|secret| secret.expose())
	}
}

/// Verdict returned by a [`Verify`] callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Verified<U> {
	/// The attempt authenticated `user`.
	Success {
		/// Application user record.
		user: U,
		/// Optional extra information for the host middleware.
		info: Option<Value>,
	},
	/// The attempt was understood but rejected.
	Failure {
		/// Optional explanation for the host middleware.
		info: Option<Value>,
	},
}
impl<U> Verified<U> {
	/// Successful verdict without extra information.
	pub fn success(user: U) -> Self {
		Self::Success { user, info: None }
	}

	/// Rejected verdict without extra information.
	pub fn failure() -> Self {
		Self::Failure { info: None }
	}

	/// Attaches extra information to either verdict.
	pub fn with_info(self, value: Value) -> Self {
		match self {
			Self::Success { user, .. } => Self::Success { user, info: Some(value) },
			Self::Failure { .. } => Self::Failure { info: Some(value) },
		}
	}

	/// Returns the authenticated user, if any.
	pub fn user(&self) -> Option<&U> {
		match self {
			Self::Success { user, .. } => Some(user),
			Self::Failure { .. } => None,
		}
	}

	/// Returns the attached information, if any.
	pub fn info(&self) -> Option<&Value> {
		match self {
			Self::Success { info, .. } | Self::Failure { info } => info.as_ref(),
		}
	}
}

/// OAuth 2.0 authorization-code strategy bound to one provider's endpoints.
pub struct OAuth2Strategy<V> {
	name: String,
	endpoints: ProviderEndpoints,
	config: StrategyConfig,
	callback: CallbackUrl,
	client: Arc<dyn OAuth2Client>,
	verify: V,
}
impl<V> OAuth2Strategy<V> {
	/// Creates a strategy that talks to `endpoints` through a reqwest-backed client.
	#[cfg(feature = "reqwest")]
	pub fn new(
		name: impl Into<String>,
		endpoints: ProviderEndpoints,
		config: StrategyConfig,
		verify: V,
	) -> Result<Self> {
		let client = ReqwestOAuth2Client::new(&endpoints, &config)?;

		Self::with_client(name, endpoints, config, verify, Arc::new(client))
	}

	/// Creates a strategy that delegates to a caller-provided client.
	///
	/// Fails when the configuration misses a mandatory option, even though the client is
	/// already built.
	pub fn with_client(
		name: impl Into<String>,
		endpoints: ProviderEndpoints,
		config: StrategyConfig,
		verify: V,
		client: Arc<dyn OAuth2Client>,
	) -> Result<Self> {
		let callback = config.validate()?;

		Ok(Self { name: name.into(), endpoints, config, callback, client, verify })
	}

	/// Name the host middleware dispatches on.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Endpoints the strategy is bound to.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.endpoints
	}

	/// Configuration supplied at construction.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Parsed callback sent as `redirect_uri`.
	pub fn callback_url(&self) -> &CallbackUrl {
		&self.callback
	}

	/// Builds the redirect that starts an authorization with a random `state`.
	///
	/// `request_url` is the URL of the request being handled and is required only when the
	/// callback is relative.
	pub fn authorization_request(&self, request_url: Option<&Url>) -> Result<AuthorizationRequest> {
		self.authorization_request_with_state(request_url, authorize::random_state())
	}

	/// Builds the redirect that starts an authorization with a caller-chosen `state`.
	pub fn authorization_request_with_state(
		&self,
		request_url: Option<&Url>,
		state: impl Into<String>,
	) -> Result<AuthorizationRequest> {
		const KIND: FlowKind = FlowKind::Authorize;

		let _guard = FlowSpan::new(KIND, "authorization_request").entered();
		let result = self.callback.resolve(request_url).map_err(Error::from).map(|callback| {
			let pkce = self.config.pkce.then(PkcePair::generate);

			authorize::build_request(&self.endpoints, &self.config, &callback, state.into(), pkce)
		});

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Exchanges an authorization code for tokens through the client.
	pub async fn exchange_code(
		&self,
		code: &str,
		redirect_uri: &Url,
		pkce_verifier: Option<&str>,
	) -> Result<TokenSet> {
		const KIND: FlowKind = FlowKind::CodeExchange;

		let span = FlowSpan::new(KIND, "exchange_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result =
			span.instrument(self.client.exchange_code(code, redirect_uri, pkce_verifier)).await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Fetches and parses the profile of the user owning `access_token`.
	///
	/// Transport errors from the client are returned as-is; a body that is not JSON
	/// becomes [`Error::Profile`]. Each call issues exactly one request.
	pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "fetch_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let response =
					self.client.authenticated_get(&self.endpoints.profile, access_token).await?;

				Ok(Profile::from_slice(&response.body)?)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
impl<V> OAuth2Strategy<V>
where
	V: Verify,
{
	/// Completes an attempt from the provider's redirect.
	///
	/// An `access_denied` redirect is a rejected attempt and yields [`Verified::Failure`]
	/// carrying the provider's description; any other redirect error fails with
	/// [`Error::AuthorizationDenied`]. Otherwise the verify callback runs once, after the
	/// code exchange and (unless skipped) the profile fetch both succeed. A relative callback
	/// is resolved against [`CallbackRequest::url`].
	pub async fn authenticate(
		&self,
		callback: &CallbackRequest,
		pkce_verifier: Option<&str>,
	) -> Result<Verified<V::User>> {
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if let Some(error) = &callback.error {
					if error == ACCESS_DENIED {
						let info = callback
							.error_description
							.as_ref()
							.map(|message| serde_json::json!({ "message": message }));

						return Ok(Verified::Failure { info });
					}

					return Err(Error::AuthorizationDenied {
						error: error.clone(),
						description: callback.error_description.clone(),
					});
				}

				let code = callback.code.as_deref().ok_or(Error::MissingAuthorizationCode)?;
				let redirect_uri = self.callback.resolve(callback.url.as_ref())?;
				let tokens = self.exchange_code(code, &redirect_uri, pkce_verifier).await?;
				let profile = if self.config.skip_user_profile {
					None
				} else {
					Some(self.fetch_profile(tokens.access_token.expose()).await?)
				};
				let request = self.config.pass_request_to_callback.then(|| callback.clone());

				self.verify.verify(VerifyContext { request, tokens, profile }).await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
impl<V> Debug for OAuth2Strategy<V> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Strategy")
			.field("name", &self.name)
			.field("endpoints", &self.endpoints)
			.field("config", &self.config)
			.finish()
	}
}
