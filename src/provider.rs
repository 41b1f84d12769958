//! Fitbit provider type and construction helpers.

pub mod authorize;
pub mod config;

pub use authorize::*;
pub use config::*;

// self
use crate::{
	_prelude::*,
	auth::{BasicCredentialEncoder, ClientCredential, CredentialEncoder, ScopeCatalog},
	http::TokenHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport.
pub type ReqwestFitbitProvider = FitbitProvider<ReqwestHttpClient>;

/// Fitbit OAuth 2.0 service provider.
///
/// One instance serves one flow variant. Instances hold only immutable configuration, the
/// client credential, and a shared transport handle, so several providers (e.g. one per flow)
/// may run concurrently without coordination.
#[derive(Clone)]
pub struct FitbitProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Endpoint table and response keys.
	pub config: ProviderConfiguration,
	/// Scope catalog applied to authorization requests.
	pub catalog: ScopeCatalog,
	/// Flow variant driving authorization shaping.
	pub flow: Flow,
	/// Client credential pair held for the provider's lifetime.
	pub credential: ClientCredential,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Encoder producing `Authorization` headers for token-endpoint calls.
	pub encoder: Arc<dyn CredentialEncoder>,
	/// Transport used for every outbound call.
	pub http_client: Arc<C>,
}
impl<C> FitbitProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a provider over a caller-supplied transport with the Fitbit defaults:
	/// Authorization flow, Basic client authentication, and the official endpoint table.
	pub fn with_http_client(
		credential: ClientCredential,
		redirect_uri: Url,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			config: ProviderConfiguration::default(),
			catalog: ScopeCatalog::default(),
			flow: Flow::default(),
			credential,
			redirect_uri,
			encoder: Arc::new(BasicCredentialEncoder),
			http_client: http_client.into(),
		}
	}

	/// Replaces the configuration, validating endpoint security.
	pub fn with_config(mut self, config: ProviderConfiguration) -> Result<Self> {
		config.validate()?;

		self.config = config;

		Ok(self)
	}

	/// Replaces the scope catalog.
	pub fn with_catalog(mut self, catalog: ScopeCatalog) -> Self {
		self.catalog = catalog;

		self
	}

	/// Selects the flow variant.
	pub fn with_flow(mut self, flow: Flow) -> Self {
		self.flow = flow;

		self
	}

	/// Replaces the credential encoder.
	pub fn with_encoder(mut self, encoder: Arc<dyn CredentialEncoder>) -> Self {
		self.encoder = encoder;

		self
	}

	/// Shapes the validated authorization parameters for this provider's flow.
	///
	/// No network call is made; every failure is a local scope-policy violation.
	pub fn authorization_parameters(
		&self,
		options: &AuthorizationRequestOptions,
	) -> Result<AuthorizationParameters> {
		authorize::shape(
			&self.catalog,
			&self.credential.client_id,
			&self.redirect_uri,
			self.flow,
			options,
		)
		.map(|shaped| shaped.parameters)
	}

	/// Builds the full authorization redirect: URL, state, and the effective scope set.
	pub fn authorize_session(
		&self,
		options: &AuthorizationRequestOptions,
	) -> Result<AuthorizationSession> {
		let shaped = authorize::shape(
			&self.catalog,
			&self.credential.client_id,
			&self.redirect_uri,
			self.flow,
			options,
		)?;
		let authorize_url = shaped.parameters.apply_to(&self.config.authorization_endpoint);

		Ok(AuthorizationSession {
			authorize_url,
			state: shaped.state,
			scope: shaped.scope,
			parameters: shaped.parameters,
		})
	}
}
#[cfg(feature = "reqwest")]
impl FitbitProvider<ReqwestHttpClient> {
	/// Creates a provider with the crate's default reqwest transport.
	///
	/// Use the `with_*` helpers to switch flows, install a custom encoder, or override the
	/// endpoint table.
	pub fn new(credential: ClientCredential, redirect_uri: Url) -> Self {
		Self::with_http_client(credential, redirect_uri, ReqwestHttpClient::default())
	}
}
impl<C> Debug for FitbitProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FitbitProvider")
			.field("config", &self.config)
			.field("flow", &self.flow)
			.field("client_id", &self.credential.client_id)
			.field("redirect_uri", &self.redirect_uri)
			.field("encoder_scheme", &self.encoder.scheme())
			.finish()
	}
}
