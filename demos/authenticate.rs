//! Walks through the Briq handshake: build the authorization redirect, then interpret the
//! provider's callback before handing it to `authenticate`.

// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use briq_oauth::{
	briq::BriqStrategy,
	config::StrategyConfig,
	error::Error,
	strategy::{CallbackRequest, Verified, VerifyContext},
	url::Url,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = StrategyConfig::builder()
		.client_id("demo-client")
		.client_secret("demo-secret")
		.callback_url("/auth/briq/callback")
		.scope(["read", "write"])
		.pkce(true)
		.build()?;
	let strategy = BriqStrategy::new(config, |ctx: VerifyContext| async move {
		let user = ctx.profile.as_ref().and_then(|profile| profile.id()).map(str::to_owned);

		Ok::<_, Error>(match user {
			Some(id) => Verified::success(id),
			None => Verified::failure(),
		})
	})?;
	// The login request being handled; the relative callback resolves against it.
	let login = Url::parse("https://app.example.com/login/briq")?;
	let request = strategy.authorization_request(Some(&login))?;

	println!("Send your user to {}.", request.url);
	println!("Remember state `{}` and the PKCE verifier for the redirect.", request.state);

	// Simulate the provider redirecting back to the callback URL.
	let mut redirect = login.join("/auth/briq/callback")?;

	redirect
		.query_pairs_mut()
		.append_pair("code", "demo-code")
		.append_pair("state", &request.state);

	let callback = CallbackRequest::from_url(&redirect);

	if callback.state.as_deref() != Some(request.state.as_str()) {
		return Err(eyre!("State mismatch; refusing to exchange the code."));
	}

	println!(
		"Callback carries code `{}`; pass it to `authenticate` together with the verifier.",
		callback.code.as_deref().unwrap_or_default()
	);

	Ok(())
}
