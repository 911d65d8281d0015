mod common;

// std
use std::sync::Arc;
// crates.io
use serde_json::json;
// self
use briq_oauth::{
	briq::{self, BriqStrategy},
	config::StrategyConfig,
	error::{ConfigError, Error, ProfileError, TransportError},
	oauth::OAuth2Client,
	strategy::{CallbackRequest, Verified, Verify, VerifyContext},
};
use common::StubClient;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Connection refused by {0}.")]
struct ConnectionRefused(&'static str);

async fn accept_everyone(_ctx: VerifyContext) -> Result<Verified<()>, Error> {
	Ok(Verified::success(()))
}

type ReadyVerify = fn(VerifyContext) -> std::future::Ready<Result<Verified<()>, Error>>;

fn assert_send_sync<T: Send + Sync>() {}

fn assert_send<T: Send>(_: &T) {}

fn strategy(client: Arc<StubClient>) -> BriqStrategy<impl Verify<User = ()>> {
	BriqStrategy::with_client(common::config(), accept_everyone, client)
		.expect("Strategy should build from complete configuration.")
}

#[test]
fn endpoints_ignore_configuration_contents() {
	let client = StubClient::with_profile_body("{}").shared();
	let config = StrategyConfig::builder()
		.client_id("someone-else")
		.client_secret("another-secret")
		.callback_url("https://evil.example.com/oauth/token")
		.scope(["https://other.example.com/oauth/me"])
		.build()
		.expect("Alternate configuration should build.");
	let strategy = BriqStrategy::with_client(config, accept_everyone, client)
		.expect("Strategy should build from alternate configuration.");

	assert_eq!(strategy.name(), "briq");
	assert_eq!(strategy.name(), briq::STRATEGY_NAME);
	assert_eq!(
		strategy.endpoints().authorization.as_str(),
		"https://www.givebriq.com/oauth/authorize"
	);
	assert_eq!(strategy.endpoints().token.as_str(), "https://www.givebriq.com/oauth/token");
	assert_eq!(strategy.endpoints().profile.as_str(), "https://www.givebriq.com/oauth/me");
}

#[tokio::test]
async fn fetch_profile_returns_parsed_json() {
	let client = StubClient::with_profile_body(r#"{"id":"42","name":"Ada"}"#).shared();
	let strategy = strategy(client.clone());
	let profile =
		strategy.fetch_profile("access-token").await.expect("Profile fetch should succeed.");

	assert_eq!(profile, json!({ "id": "42", "name": "Ada" }));

	let gets = client.gets.lock();

	assert_eq!(gets.len(), 1);
	assert_eq!(gets[0].0.as_str(), "https://www.givebriq.com/oauth/me");
	assert_eq!(gets[0].1, "access-token");
}

#[tokio::test]
async fn fetch_profile_surfaces_transport_errors_unchanged() {
	let client = StubClient::with_profile(|| {
		Err(TransportError::network(ConnectionRefused("www.givebriq.com")).into())
	})
	.shared();
	let strategy = strategy(client);
	let err = strategy
		.fetch_profile("access-token")
		.await
		.expect_err("Transport failures should propagate.");
	let source = match err {
		Error::Transport(TransportError::Network { source }) => source,
		other => panic!("Expected the transport error to pass through, got {other:?}."),
	};

	assert_eq!(
		source.downcast_ref::<ConnectionRefused>(),
		Some(&ConnectionRefused("www.givebriq.com"))
	);
}

#[tokio::test]
async fn fetch_profile_surfaces_unexpected_status_unchanged() {
	let client = StubClient::with_profile(|| {
		Err(TransportError::UnexpectedStatus { status: 401, body_preview: "expired".into() }.into())
	})
	.shared();
	let err = strategy(client)
		.fetch_profile("expired-token")
		.await
		.expect_err("Non-2xx responses should propagate.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::UnexpectedStatus { status: 401, ref body_preview })
			if body_preview == "expired"
	));
}

#[tokio::test]
async fn fetch_profile_turns_malformed_json_into_typed_error() {
	let client = StubClient::with_profile_body("not-json").shared();
	let err = strategy(client)
		.fetch_profile("access-token")
		.await
		.expect_err("Malformed JSON should fail.");

	assert!(matches!(
		err,
		Error::Profile(ProfileError::Parse { ref body_preview, .. }) if body_preview == "not-json"
	));
}

#[tokio::test]
async fn fetch_profile_never_caches() {
	let client = StubClient::with_profile_body(r#"{"id":"7"}"#).shared();
	let strategy = strategy(client.clone());
	let first = strategy.fetch_profile("same-token").await.expect("First fetch should succeed.");
	let second = strategy.fetch_profile("same-token").await.expect("Second fetch should succeed.");

	assert_eq!(first, second);
	assert_eq!(client.get_count(), 2);
}

#[test]
fn strategy_is_shareable_across_threads() {
	assert_send_sync::<BriqStrategy<ReadyVerify>>();

	let strategy = strategy(StubClient::with_profile_body("{}").shared());
	let callback = CallbackRequest::with_code("abc");

	assert_send(&strategy.authenticate(&callback, None));
	assert_send(&strategy.fetch_profile("access-token"));
}

#[tokio::test]
async fn concurrent_profile_fetches_stay_independent() {
	const CALLS: usize = 8;

	let client = StubClient::echoing_token().shared();
	let strategy = Arc::new(strategy(client.clone()));
	let handles = (0..CALLS)
		.map(|idx| {
			let strategy = strategy.clone();

			tokio::spawn(async move {
				let token = format!("token-{idx}");
				let profile = strategy
					.fetch_profile(&token)
					.await
					.expect("Concurrent profile fetch should succeed.");

				(token, profile)
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let (token, profile) = handle.await.expect("Profile task should not panic.");

		assert_eq!(profile.id(), Some(token.as_str()));
	}

	assert_eq!(client.get_count(), CALLS);
}

#[tokio::test]
async fn concurrent_attempts_share_one_strategy() {
	let client = StubClient::with_profile_body(r#"{"id":"7"}"#).shared();
	let strategy = Arc::new(strategy(client.clone()));
	let first = CallbackRequest::with_code("code-a");
	let second = CallbackRequest::with_code("code-b");
	let (a, b) =
		tokio::join!(strategy.authenticate(&first, None), strategy.authenticate(&second, None));

	assert_eq!(a.expect("First attempt should succeed."), Verified::success(()));
	assert_eq!(b.expect("Second attempt should succeed."), Verified::success(()));

	let mut codes =
		client.exchanges.lock().iter().map(|(code, _)| code.clone()).collect::<Vec<_>>();

	codes.sort();

	assert_eq!(codes, vec!["code-a".to_owned(), "code-b".to_owned()]);
	assert_eq!(client.get_count(), 2);
}

#[test]
fn construction_requires_mandatory_fields() {
	for (field, config) in [
		("client_id", StrategyConfig { client_id: String::new(), ..common::config() }),
		("client_secret", StrategyConfig { client_secret: String::new(), ..common::config() }),
		("callback_url", StrategyConfig { callback_url: String::new(), ..common::config() }),
	] {
		let client: Arc<dyn OAuth2Client> = StubClient::with_profile_body("{}").shared();
		let err = BriqStrategy::with_client(config, accept_everyone, client)
			.expect_err("Missing mandatory option should fail construction.");

		assert!(
			matches!(err, Error::Config(ConfigError::MissingField { field: missing }) if missing == field),
			"Unexpected error for {field}: {err:?}."
		);
	}
}

#[cfg(feature = "reqwest")]
#[test]
fn default_client_construction_requires_mandatory_fields() {
	let config = StrategyConfig { client_secret: String::new(), ..common::config() };
	let err = BriqStrategy::new(config, accept_everyone)
		.expect_err("Missing client secret should fail construction.");

	assert!(matches!(err, Error::Config(ConfigError::MissingField { field: "client_secret" })));
}
