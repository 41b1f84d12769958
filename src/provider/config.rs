//! Immutable provider configuration: endpoint table, response keys, and constants.

// self
use crate::{_prelude::*, error::ConfigError};

/// Fitbit API base URL.
pub const API_BASE_URL: &str = "https://api.fitbit.com/1/";
/// Fitbit authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://www.fitbit.com/oauth2/authorize";
/// Fitbit token endpoint.
pub const TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";
/// Fitbit resource-owner profile endpoint.
pub const RESOURCE_OWNER_URL: &str = "https://api.fitbit.com/1/users/-/profile.json";

/// One day of token lifetime.
pub const EXPIRES_IN_DAY: Duration = Duration::seconds(86_400);
/// One week of token lifetime.
pub const EXPIRES_IN_WEEK: Duration = Duration::seconds(604_800);
/// Thirty days of token lifetime.
pub const EXPIRES_IN_MONTH: Duration = Duration::seconds(2_592_000);

/// OAuth 2.0 flow variants supported by the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
	#[default]
	/// Server-side Authorization Code flow (`response_type=code`).
	Authorization,
	/// Browser-side Implicit flow (`response_type=token`, token delivered in the fragment).
	Implicit,
}
impl Flow {
	/// Returns a stable label for the flow variant.
	pub const fn as_str(self) -> &'static str {
		match self {
			Flow::Authorization => "authorization",
			Flow::Implicit => "implicit",
		}
	}

	/// Returns the `response_type` tag sent to the authorization endpoint.
	pub const fn response_type(self) -> &'static str {
		match self {
			Flow::Authorization => "code",
			Flow::Implicit => "token",
		}
	}
}
impl Display for Flow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Consent-prompt directives accepted by the authorization endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
	/// Skip the authorization UI when possible.
	None,
	/// Force the login screen.
	Login,
	/// Force the consent screen.
	Consent,
}
impl Prompt {
	/// Returns the wire value for the `prompt` parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			Prompt::None => "none",
			Prompt::Login => "login",
			Prompt::Consent => "consent",
		}
	}
}
impl Display for Prompt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable endpoint table and response-key configuration.
///
/// The defaults describe the Fitbit Web API; caller-supplied overrides win over the defaults.
/// Endpoints must use HTTPS, which [`FitbitProvider::with_config`](crate::provider::FitbitProvider::with_config)
/// enforces when an override is installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfiguration {
	/// Base URL all API requests derive from.
	pub api_base: Url,
	/// Authorization endpoint end users are redirected to.
	pub authorization_endpoint: Url,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Url,
	/// Resource-owner profile endpoint.
	pub resource_owner_endpoint: Url,
	/// Response key whose non-empty value marks a provider-reported failure.
	pub response_error_key: String,
	/// Optional response key carrying a numeric error code.
	pub response_error_code_key: Option<String>,
	/// Response key carrying the resource-owner identifier.
	pub resource_owner_id_key: String,
}
impl ProviderConfiguration {
	/// Overrides the API base URL.
	pub fn with_api_base(mut self, url: Url) -> Self {
		self.api_base = url;

		self
	}

	/// Overrides the authorization endpoint.
	pub fn with_authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = url;

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = url;

		self
	}

	/// Overrides the resource-owner profile endpoint.
	pub fn with_resource_owner_endpoint(mut self, url: Url) -> Self {
		self.resource_owner_endpoint = url;

		self
	}

	/// Overrides the response error key.
	pub fn with_response_error_key(mut self, key: impl Into<String>) -> Self {
		self.response_error_key = key.into();

		self
	}

	/// Configures the response key carrying a numeric error code.
	pub fn with_response_error_code_key(mut self, key: impl Into<String>) -> Self {
		self.response_error_code_key = Some(key.into());

		self
	}

	/// Overrides the resource-owner identifier key.
	pub fn with_resource_owner_id_key(mut self, key: impl Into<String>) -> Self {
		self.resource_owner_id_key = key.into();

		self
	}

	/// Validates that every endpoint uses HTTPS.
	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("api base", &self.api_base)?;
		validate_endpoint("authorization", &self.authorization_endpoint)?;
		validate_endpoint("token", &self.token_endpoint)?;
		validate_endpoint("resource owner", &self.resource_owner_endpoint)?;

		Ok(())
	}
}
impl Default for ProviderConfiguration {
	fn default() -> Self {
		Self {
			api_base: parse_endpoint_literal(API_BASE_URL),
			authorization_endpoint: parse_endpoint_literal(AUTHORIZATION_URL),
			token_endpoint: parse_endpoint_literal(TOKEN_URL),
			resource_owner_endpoint: parse_endpoint_literal(RESOURCE_OWNER_URL),
			response_error_key: "error".into(),
			response_error_code_key: None,
			resource_owner_id_key: "id".into(),
		}
	}
}

fn parse_endpoint_literal(value: &'static str) -> Url {
	Url::parse(value).expect("Endpoint literals are valid URLs.")
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_the_fitbit_endpoint_table() {
		let config = ProviderConfiguration::default();

		assert_eq!(config.api_base.as_str(), "https://api.fitbit.com/1/");
		assert_eq!(config.authorization_endpoint.as_str(), "https://www.fitbit.com/oauth2/authorize");
		assert_eq!(config.token_endpoint.as_str(), "https://api.fitbit.com/oauth2/token");
		assert_eq!(
			config.resource_owner_endpoint.as_str(),
			"https://api.fitbit.com/1/users/-/profile.json"
		);
		assert_eq!(config.response_error_key, "error");
		assert_eq!(config.response_error_code_key, None);
		assert_eq!(config.resource_owner_id_key, "id");
		assert!(config.validate().is_ok());
	}

	#[test]
	fn caller_overrides_win_over_defaults() {
		let token_endpoint = Url::parse("https://sandbox.example.com/oauth2/token")
			.expect("Override URL fixture should parse successfully.");
		let config = ProviderConfiguration::default()
			.with_token_endpoint(token_endpoint.clone())
			.with_response_error_code_key("errorCode")
			.with_resource_owner_id_key("user_id");

		assert_eq!(config.token_endpoint, token_endpoint);
		assert_eq!(config.response_error_code_key.as_deref(), Some("errorCode"));
		assert_eq!(config.resource_owner_id_key, "user_id");
		// Untouched entries keep the Fitbit defaults.
		assert_eq!(config.authorization_endpoint.as_str(), "https://www.fitbit.com/oauth2/authorize");
	}

	#[test]
	fn insecure_endpoints_fail_validation() {
		let insecure = Url::parse("http://api.fitbit.com/oauth2/token")
			.expect("Insecure URL fixture should parse successfully.");
		let err = ProviderConfiguration::default()
			.with_token_endpoint(insecure)
			.validate()
			.expect_err("Plain HTTP endpoints must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn named_expiry_durations_match_the_documented_seconds() {
		assert_eq!(EXPIRES_IN_DAY.whole_seconds(), 86_400);
		assert_eq!(EXPIRES_IN_WEEK.whole_seconds(), 604_800);
		assert_eq!(EXPIRES_IN_MONTH.whole_seconds(), 2_592_000);
	}

	#[test]
	fn flow_and_prompt_tags_match_the_wire_vocabulary() {
		assert_eq!(Flow::Authorization.response_type(), "code");
		assert_eq!(Flow::Implicit.response_type(), "token");
		assert_eq!(Prompt::None.as_str(), "none");
		assert_eq!(Prompt::Login.as_str(), "login");
		assert_eq!(Prompt::Consent.as_str(), "consent");
	}
}
