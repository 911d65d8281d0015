//! Authorization redirect construction (state + optional PKCE).
//!
//! The state value is generated or accepted here but never verified; matching it against
//! the redirect is left to the host application.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, config::StrategyConfig, provider::ProviderEndpoints};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Redirect that starts an authorization, plus what the callback handler needs later.
#[derive(Clone)]
pub struct AuthorizationRequest {
	/// Fully-formed authorize URL to send the user agent to.
	pub url: Url,
	/// Opaque state value sent with the request.
	pub state: String,
	pkce: Option<PkcePair>,
}
impl AuthorizationRequest {
	/// PKCE verifier to pass to the code exchange, when PKCE is enabled.
	pub fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}

	/// PKCE challenge sent in the authorize URL, when PKCE is enabled.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when PKCE is enabled.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("url", &self.url.as_str())
			.field("state", &self.state)
			.field("code_challenge", &self.code_challenge())
			.finish()
	}
}

#[derive(Clone)]
pub(crate) struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(crate) fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(crate) fn build_request(
	endpoints: &ProviderEndpoints,
	config: &StrategyConfig,
	callback_url: &Url,
	state: String,
	pkce: Option<PkcePair>,
) -> AuthorizationRequest {
	let mut url = endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("redirect_uri", callback_url.as_str());

	if let Some(scope) = config.joined_scope() {
		pairs.append_pair("scope", &scope);
	}

	pairs.append_pair("state", &state);

	if let Some(pkce) = &pkce {
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", pkce.method.as_str());
	}

	drop(pairs);

	AuthorizationRequest { url, state, pkce }
}

pub(crate) fn random_state() -> String {
	random_string(STATE_LEN)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
