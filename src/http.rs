//! Transport primitives for provider endpoint calls.
//!
//! [`TokenHttpClient`] is the crate's only dependency on an HTTP stack. Implementations execute
//! a [`ProviderRequest`] and resolve to the raw [`ProviderResponse`] so the flows layer can
//! apply the provider's response validation itself. Transport failures map into the crate
//! taxonomy at the implementation: timeouts become transient token-endpoint errors, other
//! network failures become transport errors.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{AUTHORIZATION, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::error::{ConfigError, TransientError, TransportError};

/// HTTP methods the provider issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Form-encoded POST (token endpoint).
	Post,
	/// Plain GET (resource-owner endpoint).
	Get,
}

/// Outbound request handed to the transport layer.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	/// HTTP method to use.
	pub method: HttpMethod,
	/// Endpoint URL.
	pub url: Url,
	/// Pre-built `Authorization` header value.
	pub authorization: String,
	/// Form body pairs; empty for GET requests.
	pub form: Vec<(String, String)>,
}

/// Raw response surfaced by the transport layer.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
	/// Retry-After hint expressed as a relative duration, when the endpoint supplied one.
	pub retry_after: Option<Duration>,
}

/// Future alias returned by [`TokenHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ProviderResponse>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing provider endpoint calls.
///
/// Implementations must be `Send + Sync + 'static` so a provider can be shared across tasks
/// without additional wrappers, and the returned futures must be `Send` for the lifetime of
/// the in-flight call. The crate imposes no timeout or retry policy of its own; whatever the
/// transport reports is surfaced unchanged.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes one provider request, resolving to the raw response.
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure any
/// custom [`ReqwestClient`] accordingly before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ProviderRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let builder = match request.method {
				HttpMethod::Post => client.post(request.url.clone()).form(&request.form),
				HttpMethod::Get => client.get(request.url.clone()),
			};
			let response = builder
				.header(AUTHORIZATION, request.authorization.as_str())
				.send()
				.await
				.map_err(map_reqwest_error)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

			Ok(ProviderResponse { status, body, retry_after })
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		let status = err.status().map(|code| code.as_u16());

		return TransientError::TokenEndpoint {
			message: "Request timed out while calling the endpoint.".into(),
			status,
			retry_after: None,
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
