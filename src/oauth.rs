//! OAuth 2.0 client collaborator used by strategies.
//!
//! [`OAuth2Client`] is the capability a strategy composes with: exchange an authorization
//! code for tokens and issue bearer-authenticated GET requests. [`BasicOAuth2Client`] is
//! the stock implementation on top of the `oauth2` crate and any [`TokenHttpClient`].

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse, BasicTokenType},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet},
	config::StrategyConfig,
	error::{self, ConfigError, TokenEndpointError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ProviderEndpoints, ProviderErrorContext, ProviderErrorKind},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Boxed future returned by [`OAuth2Client`] operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuth2Client = BasicOAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Capability a strategy delegates token exchange and authenticated requests to.
pub trait OAuth2Client: Send + Sync {
	/// Exchanges an authorization code (and optional PKCE verifier) for tokens.
	///
	/// `redirect_uri` must equal the one sent with the authorization request.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: &'a Url,
		pkce_verifier: Option<&'a str>,
	) -> ClientFuture<'a, TokenSet>;

	/// Issues a GET to `url` authenticated with `access_token`.
	///
	/// Implementations report non-2xx responses as [`TransportError::UnexpectedStatus`].
	fn authenticated_get<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
	) -> ClientFuture<'a, AuthenticatedResponse>;
}

/// Successful response to an authenticated GET.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header, when present.
	pub content_type: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl AuthenticatedResponse {
	/// Builds a `200 OK` JSON response, mostly useful for stub clients.
	pub fn json(body: impl Into<Vec<u8>>) -> Self {
		Self { status: 200, content_type: Some("application/json".into()), body: body.into() }
	}
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					TransportError::from(*inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: "unrecognized client failure".into() }.into(),
		}
	}
}

/// [`OAuth2Client`] built on the `oauth2` crate.
///
/// Client credentials travel in the token request body. The `redirect_uri` is supplied per
/// exchange since relative callbacks depend on the request being handled.
pub struct BasicOAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicOAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a client for `endpoints` using a caller-provided transport + mapper pair.
	///
	/// Fails when the configuration misses a mandatory option.
	pub fn with_http_client(
		endpoints: &ProviderEndpoints,
		config: &StrategyConfig,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		config.validate()?;

		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client: http_client.into(), error_mapper: error_mapper.into() })
	}
}
#[cfg(feature = "reqwest")]
impl BasicOAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds a client backed by a fresh reqwest transport.
	pub fn new(endpoints: &ProviderEndpoints, config: &StrategyConfig) -> Result<Self> {
		Self::with_http_client(
			endpoints,
			config,
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> OAuth2Client for BasicOAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: &'a Url,
		pkce_verifier: Option<&'a str>,
	) -> ClientFuture<'a, TokenSet> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect_uri.clone())));

			if let Some(verifier) = pkce_verifier {
				request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
			}

			let response = request.request_async(&handle).await.map_err(|err| {
				map_request_error(meta.take(), err, self.error_mapper.as_ref())
			})?;

			map_token_response(response)
		})
	}

	fn authenticated_get<'a>(
		&'a self,
		url: &'a Url,
		access_token: &'a str,
	) -> ClientFuture<'a, AuthenticatedResponse> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let request = Request::builder()
				.method(Method::GET)
				.uri(url.as_str())
				.header(AUTHORIZATION, format!("Bearer {access_token}"))
				.header(ACCEPT, "application/json")
				.body(Vec::new())
				.map_err(ConfigError::from)?;
			let response = handle
				.call(request)
				.await
				.map_err(|err| self.error_mapper.map_transport_error(meta.take().as_ref(), err))?;
			let status = response.status();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.into_body();

			if !status.is_success() {
				return Err(TransportError::UnexpectedStatus {
					status: status.as_u16(),
					body_preview: error::body_preview(&body),
				}
				.into());
			}

			Ok(AuthenticatedResponse { status: status.as_u16(), content_type, body })
		})
	}
}
impl<C, M> Debug for BasicOAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicOAuth2Client")
			.field("client_id", self.oauth_client.client_id())
			.field("auth_uri", &self.oauth_client.auth_uri().as_str())
			.field("token_uri", &self.oauth_client.token_uri().as_str())
			.finish()
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenSet> {
	let expires_in = response
		.expires_in()
		.map(|lifetime| {
			Duration::try_from(lifetime).map_err(|_| TokenEndpointError::Unexpected {
				message: "expires_in exceeds the supported range".into(),
				status: None,
			})
		})
		.transpose()?;
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => "bearer".to_owned(),
		BasicTokenType::Mac => "mac".to_owned(),
		BasicTokenType::Extension(value) => value.clone(),
	};
	let scope = response
		.scopes()
		.map(|scopes| scopes.iter().map(|scope| scope.to_string()).collect())
		.unwrap_or_default();

	Ok(TokenSet {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response.refresh_token().map(|token| TokenSecret::new(token.secret().to_owned())),
		token_type,
		expires_in,
		scope,
		issued_at: OffsetDateTime::now_utc(),
	})
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response, status),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta.as_ref(), error),
		RequestTokenError::Parse(source, _body) => TokenEndpointError::Parse { source, status }.into(),
		RequestTokenError::Other(message) => TokenEndpointError::Unexpected { message, status }.into(),
	}
}

fn map_server_response(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let mut ctx = ProviderErrorContext::default().with_oauth_error(response.error().as_ref());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = status {
		ctx = ctx.with_http_status(status);
	}

	let reason = response
		.error_description()
		.cloned()
		.unwrap_or_else(|| response.error().as_ref().to_owned());

	match ctx.classify() {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason },
		ProviderErrorKind::Unexpected =>
			TokenEndpointError::Unexpected { message: format!("OAuth error {reason}"), status }.into(),
	}
}
