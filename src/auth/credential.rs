//! Client credential material and `Authorization` header encoders.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::token::TokenSecret};

/// Errors emitted while encoding credentials into header values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialError {
	/// The scheme cannot derive a payload from the client pair alone.
	#[error("The {scheme} scheme requires a per-call credential.")]
	MissingCallCredential {
		/// Scheme label that failed to derive a payload.
		scheme: &'static str,
	},
}

/// Client identifier/secret pair owned by a provider instance for its entire lifetime.
#[derive(Clone, Debug)]
pub struct ClientCredential {
	/// OAuth 2.0 client identifier issued by the provider.
	pub client_id: String,
	client_secret: TokenSecret,
}
impl ClientCredential {
	/// Creates a new credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}

	/// Returns the client secret. Callers must avoid logging it.
	pub fn client_secret(&self) -> &str {
		self.client_secret.expose()
	}
}

/// Capability interface producing `Authorization` header values for provider calls.
///
/// A provider holds exactly one encoder by composition, selected at construction; the Fitbit
/// token endpoint expects the Basic variant.
pub trait CredentialEncoder
where
	Self: Send + Sync,
{
	/// Scheme label prefixed to the header payload.
	fn scheme(&self) -> &'static str;

	/// Derives the header payload from the owned client pair, when the scheme allows it.
	fn derive_payload(&self, credential: &ClientCredential) -> Option<String>;

	/// Builds the full header value; a per-call credential overrides the derived payload.
	fn authorization_header(
		&self,
		credential: &ClientCredential,
		call_credential: Option<&str>,
	) -> Result<String, CredentialError> {
		let payload = match call_credential {
			Some(value) => value.to_owned(),
			None => self
				.derive_payload(credential)
				.ok_or(CredentialError::MissingCallCredential { scheme: self.scheme() })?,
		};

		Ok(format!("{} {payload}", self.scheme()))
	}
}

/// `Basic` scheme encoder: base64 of `client_id:client_secret`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicCredentialEncoder;
impl CredentialEncoder for BasicCredentialEncoder {
	fn scheme(&self) -> &'static str {
		"Basic"
	}

	fn derive_payload(&self, credential: &ClientCredential) -> Option<String> {
		let raw = format!("{}:{}", credential.client_id, credential.client_secret());

		Some(STANDARD.encode(raw))
	}
}

/// `Bearer` scheme encoder: forwards a per-call token verbatim.
///
/// A bearer payload cannot be derived from the client pair, so calls without a per-call
/// credential fail with [`CredentialError::MissingCallCredential`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerCredentialEncoder;
impl CredentialEncoder for BearerCredentialEncoder {
	fn scheme(&self) -> &'static str {
		"Bearer"
	}

	fn derive_payload(&self, _credential: &ClientCredential) -> Option<String> {
		None
	}
}
