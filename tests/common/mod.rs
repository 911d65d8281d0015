//! Stub collaborators shared by integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
// self
use briq_oauth::{
	auth::TokenSet,
	config::StrategyConfig,
	error::Result,
	oauth::{AuthenticatedResponse, ClientFuture, OAuth2Client},
	url::Url,
};
#[cfg(feature = "reqwest")]
use briq_oauth::{http::ReqwestHttpClient, reqwest::Client as ReqwestClient};

pub const CLIENT_ID: &str = "123-456-789";
pub const CLIENT_SECRET: &str = "shhh-its-a-secret";
pub const CALLBACK_URL: &str = "https://www.example.net/auth/briq/callback";

type Responder<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;
type ProfileResponder = Box<dyn Fn(&str) -> Result<AuthenticatedResponse> + Send + Sync>;

/// Records every call and answers from canned responders.
pub struct StubClient {
	exchange: Responder<TokenSet>,
	profile: ProfileResponder,
	pub exchanges: Mutex<Vec<(String, Option<String>)>>,
	pub redirects: Mutex<Vec<Url>>,
	pub gets: Mutex<Vec<(Url, String)>>,
}
impl StubClient {
	pub fn new(
		exchange: impl 'static + Send + Sync + Fn() -> Result<TokenSet>,
		profile: impl 'static + Send + Sync + Fn() -> Result<AuthenticatedResponse>,
	) -> Self {
		Self {
			exchange: Box::new(exchange),
			profile: Box::new(move |_| profile()),
			exchanges: Mutex::new(Vec::new()),
			redirects: Mutex::new(Vec::new()),
			gets: Mutex::new(Vec::new()),
		}
	}

	/// Answers every profile request with `{"id": <access token>}`.
	pub fn echoing_token() -> Self {
		Self {
			profile: Box::new(|token| {
				Ok(AuthenticatedResponse::json(serde_json::json!({ "id": token }).to_string()))
			}),
			..Self::with_profile_body("{}")
		}
	}

	pub fn with_profile(
		profile: impl 'static + Send + Sync + Fn() -> Result<AuthenticatedResponse>,
	) -> Self {
		Self::new(|| Ok(TokenSet::bearer("access-token").with_refresh_token("refresh-token")), profile)
	}

	pub fn with_profile_body(body: &'static str) -> Self {
		Self::with_profile(move || Ok(AuthenticatedResponse::json(body)))
	}

	pub fn get_count(&self) -> usize {
		self.gets.lock().len()
	}

	pub fn exchange_count(&self) -> usize {
		self.exchanges.lock().len()
	}

	pub fn shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}
impl OAuth2Client for StubClient {
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: &'a Url,
		pkce_verifier: Option<&'a str>,
	) -> ClientFuture<'a, TokenSet> {
		self.exchanges.lock().push((code.to_owned(), pkce_verifier.map(str::to_owned)));
		self.redirects.lock().push(redirect_uri.clone());

		let result = (self.exchange)();

		Box::pin(async move { result })
	}

	fn authenticated_get<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
	) -> ClientFuture<'a, AuthenticatedResponse> {
		self.gets.lock().push((url.clone(), access_token.to_owned()));

		let result = (self.profile)(access_token);

		Box::pin(async move { result })
	}
}

pub fn config() -> StrategyConfig {
	StrategyConfig::builder()
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.callback_url(CALLBACK_URL)
		.build()
		.expect("Fixture configuration should build.")
}

#[cfg(feature = "reqwest")]
/// Builds a reqwest client that accepts the self-signed certificates served by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}
