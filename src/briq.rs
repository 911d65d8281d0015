//! Briq provider binding.
//!
//! Briq exposes its OAuth 2.0 endpoints under a single base URL. The endpoints are
//! constants of this module; [`StrategyConfig`] carries no way to override them.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	config::StrategyConfig,
	oauth::OAuth2Client,
	provider::ProviderEndpoints,
	strategy::OAuth2Strategy,
};

/// Name the host middleware dispatches Briq requests on.
pub const STRATEGY_NAME: &str = "briq";
/// Base URL every Briq endpoint lives under.
pub const BASE_URL: &str = "https://www.givebriq.com";
/// Path of the authorization endpoint.
pub const AUTHORIZATION_PATH: &str = "/oauth/authorize";
/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/oauth/token";
/// Path of the profile endpoint.
pub const PROFILE_PATH: &str = "/oauth/me";

/// Returns the fixed Briq endpoint set.
pub fn endpoints() -> Result<ProviderEndpoints> {
	Ok(ProviderEndpoints::from_base(BASE_URL, AUTHORIZATION_PATH, TOKEN_PATH, PROFILE_PATH)?)
}

/// OAuth 2.0 strategy pinned to Briq's name and endpoints.
///
/// ```no_run
/// use briq_oauth::{
/// 	briq::BriqStrategy,
/// 	config::StrategyConfig,
/// 	error::Error,
/// 	strategy::{Verified, VerifyContext},
/// };
///
/// # fn main() -> briq_oauth::error::Result<()> {
/// let config = StrategyConfig::builder()
/// 	.client_id("123-456-789")
/// 	.client_secret("shhh-its-a-secret")
/// 	.callback_url("https://www.example.net/auth/briq/callback")
/// 	.build()?;
/// let strategy = BriqStrategy::new(config, |ctx: VerifyContext| async move {
/// 	let id = ctx.profile.as_ref().and_then(|profile| profile.id()).map(str::to_owned);
///
/// 	Ok::<_, Error>(match id {
/// 		Some(id) => Verified::success(id),
/// 		None => Verified::failure(),
/// 	})
/// })?;
///
/// assert_eq!(strategy.name(), "briq");
/// # Ok(())
/// # }
/// ```
pub struct BriqStrategy<V>(OAuth2Strategy<V>);
impl<V> BriqStrategy<V> {
	/// Creates the strategy with a reqwest-backed client.
	#[cfg(feature = "reqwest")]
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self> {
		OAuth2Strategy::new(STRATEGY_NAME, endpoints()?, config, verify).map(Self)
	}

	/// Creates the strategy with a caller-provided client.
	pub fn with_client(
		config: StrategyConfig,
		verify: V,
		client: Arc<dyn OAuth2Client>,
	) -> Result<Self> {
		OAuth2Strategy::with_client(STRATEGY_NAME, endpoints()?, config, verify, client).map(Self)
	}

	/// Unwraps the generic strategy.
	pub fn into_inner(self) -> OAuth2Strategy<V> {
		self.0
	}
}
impl<V> Deref for BriqStrategy<V> {
	type Target = OAuth2Strategy<V>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl<V> Debug for BriqStrategy<V> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BriqStrategy").field(&self.0).finish()
	}
}
