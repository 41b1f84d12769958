//! Token-exchange and resource-owner operations on [`FitbitProvider`].

pub mod grant;
pub mod owner;

pub use grant::*;
pub use owner::*;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, ScopeSet},
	error::{ConfigError, TransientError},
	http::{HttpMethod, ProviderRequest, ProviderResponse, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{FitbitProvider, ProviderConfiguration},
};

/// Options applied to a single token exchange.
#[derive(Clone, Debug, Default)]
pub struct TokenExchangeOptions {
	/// Per-call credential overriding the derived `Authorization` payload.
	///
	/// Consumed before the form is assembled; never sent as a wire parameter.
	pub token: Option<String>,
	/// Extra form parameters merged after the grant's own (caller wins).
	pub extra: BTreeMap<String, String>,
}
impl TokenExchangeOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the per-call credential.
	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(token.into());

		self
	}

	/// Merges one extra form parameter.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}

impl<C> FitbitProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges a grant for an access token record.
	///
	/// Malformed grant material fails before any network call; provider-reported failures
	/// surface as [`Error::IdentityProvider`] after the response error key is checked.
	pub async fn exchange(
		&self,
		grant: TokenGrant,
		options: TokenExchangeOptions,
	) -> Result<AccessTokenRecord> {
		let kind = match &grant {
			TokenGrant::AuthorizationCode { .. } => FlowKind::AuthorizationCode,
			TokenGrant::RefreshToken { .. } => FlowKind::Refresh,
		};
		let span = FlowSpan::new(kind, "exchange");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_inner(grant, options)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_inner(
		&self,
		grant: TokenGrant,
		options: TokenExchangeOptions,
	) -> Result<AccessTokenRecord> {
		let mut form = BTreeMap::new();

		form.insert("client_id".into(), self.credential.client_id.clone());
		form.insert("redirect_uri".into(), self.redirect_uri.to_string());

		grant.prepare_request_parameters(&mut form)?;

		for (key, value) in options.extra {
			form.insert(key, value);
		}

		// The `token` option authenticates this call; it never rides in the form.
		let call_credential = options.token;
		let authorization =
			self.encoder.authorization_header(&self.credential, call_credential.as_deref())?;
		let request = ProviderRequest {
			method: HttpMethod::Post,
			url: self.config.token_endpoint.clone(),
			authorization,
			form: form.into_iter().collect(),
		};
		let response = self.http_client.execute(request).await?;
		let data = parse_json(&response)?;

		self.check_response(&data)?;

		build_record(&self.config, &data)
	}

	// Applies the configured error-key check to a parsed response body.
	pub(crate) fn check_response(&self, data: &Value) -> Result<()> {
		let Some(message) = non_empty_str(data.get(self.config.response_error_key.as_str()))
		else {
			return Ok(());
		};
		let code = self
			.config
			.response_error_code_key
			.as_deref()
			.and_then(|key| data.get(key))
			.map(error_code)
			.unwrap_or(0);

		Err(Error::IdentityProvider { message: message.to_owned(), code })
	}
}

pub(crate) fn parse_json(response: &ProviderResponse) -> Result<Value> {
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		TransientError::ResponseParse { source, status: Some(response.status) }.into()
	})
}

fn build_record(config: &ProviderConfiguration, data: &Value) -> Result<AccessTokenRecord> {
	let access_token =
		non_empty_str(data.get("access_token")).ok_or(ConfigError::MissingAccessToken)?;
	let expires_in = match data.get("expires_in") {
		Some(value) if value.is_i64() => value.as_i64().unwrap_or_default(),
		Some(value) if value.is_u64() => return Err(ConfigError::ExpiresInOutOfRange.into()),
		_ => return Err(ConfigError::MissingExpiresIn.into()),
	};

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let issued_at = OffsetDateTime::now_utc();
	let mut builder = AccessTokenRecord::builder()
		.access_token(access_token)
		.issued_at(issued_at)
		.expires_in(Duration::seconds(expires_in));

	if let Some(refresh) = non_empty_str(data.get("refresh_token")) {
		builder = builder.refresh_token(refresh);
	}
	if let Some(scope_raw) = non_empty_str(data.get("scope")) {
		let scope = ScopeSet::from_str(scope_raw).map_err(ConfigError::from)?;

		builder = builder.scope(scope);
	}
	if let Some(owner_id) = identifier_value(data.get(config.resource_owner_id_key.as_str())) {
		builder = builder.resource_owner_id(owner_id);
	}

	builder.build().map_err(|err| ConfigError::from(err).into())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
	value.and_then(Value::as_str).filter(|raw| !raw.is_empty())
}

// Identifier fields arrive as strings or numbers depending on the provider's mood.
pub(crate) fn identifier_value(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(raw) => Some(raw.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn error_code(value: &Value) -> i64 {
	match value {
		Value::Number(number) => number.as_i64().unwrap_or(0),
		Value::String(raw) => raw.parse().unwrap_or(0),
		_ => 0,
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn fitbit_config() -> ProviderConfiguration {
		ProviderConfiguration::default()
			.with_response_error_code_key("errorCode")
			.with_resource_owner_id_key("user_id")
	}

	#[test]
	fn record_mapping_reads_every_field() {
		let data = json!({
			"access_token": "access-1",
			"refresh_token": "refresh-1",
			"expires_in": 3_600,
			"scope": "activity sleep",
			"user_id": "26FWFL",
		});
		let record = build_record(&fitbit_config(), &data)
			.expect("A fully populated response should map successfully.");

		assert_eq!(record.access_token.expose(), "access-1");
		assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-1"));
		assert_eq!(record.scope.as_ref().map(ScopeSet::normalized), Some("activity sleep".into()));
		assert_eq!(record.resource_owner_id.as_deref(), Some("26FWFL"));
		assert_eq!(record.expires_at - record.issued_at, Duration::seconds(3_600));
	}

	#[test]
	fn numeric_owner_identifiers_are_stringified() {
		let data = json!({ "access_token": "a", "expires_in": 60, "user_id": 1_045 });
		let record = build_record(&fitbit_config(), &data)
			.expect("Numeric identifiers should map successfully.");

		assert_eq!(record.resource_owner_id.as_deref(), Some("1045"));
	}

	#[test]
	fn malformed_token_payloads_are_rejected() {
		let config = fitbit_config();

		assert!(matches!(
			build_record(&config, &json!({ "expires_in": 60 })),
			Err(Error::Config(ConfigError::MissingAccessToken))
		));
		assert!(matches!(
			build_record(&config, &json!({ "access_token": "a" })),
			Err(Error::Config(ConfigError::MissingExpiresIn))
		));
		assert!(matches!(
			build_record(&config, &json!({ "access_token": "a", "expires_in": 0 })),
			Err(Error::Config(ConfigError::NonPositiveExpiresIn))
		));
		assert!(matches!(
			build_record(&config, &json!({ "access_token": "a", "expires_in": u64::MAX })),
			Err(Error::Config(ConfigError::ExpiresInOutOfRange))
		));
	}

	#[test]
	fn error_codes_accept_numbers_and_numeric_strings() {
		assert_eq!(error_code(&json!(1_045)), 1_045);
		assert_eq!(error_code(&json!("1045")), 1_045);
		assert_eq!(error_code(&json!("not-a-number")), 0);
		assert_eq!(error_code(&json!(null)), 0);
	}

	#[test]
	fn parse_json_surfaces_malformed_bodies_as_transient() {
		let response =
			ProviderResponse { status: 502, body: b"<html>bad gateway</html>".to_vec(), retry_after: None };
		let err = parse_json(&response).expect_err("Non-JSON bodies must be rejected.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::ResponseParse { status: Some(502), .. })
		));
	}
}
