//! Resource-owner profile retrieval.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenRecord, BearerCredentialEncoder, CredentialEncoder},
	error::ConfigError,
	flows,
	http::{HttpMethod, ProviderRequest, TokenHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::FitbitProvider,
};

/// Generic resource-owner value wrapping the profile response fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceOwner {
	fields: Map<String, Value>,
	id_key: String,
}
impl ResourceOwner {
	pub(crate) fn new(fields: Map<String, Value>, id_key: impl Into<String>) -> Self {
		Self { fields, id_key: id_key.into() }
	}

	/// Resource-owner identifier stored under the configured id key, when present.
	pub fn id(&self) -> Option<String> {
		flows::identifier_value(self.fields.get(&self.id_key))
	}

	/// Returns the raw field stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// All response fields.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}
}

impl<C> FitbitProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Fetches the resource-owner profile using the record's access token.
	///
	/// Profile calls always authenticate with the Bearer scheme regardless of the encoder the
	/// provider uses for token exchanges.
	pub async fn resource_owner(&self, record: &AccessTokenRecord) -> Result<ResourceOwner> {
		const KIND: FlowKind = FlowKind::ResourceOwner;

		let span = FlowSpan::new(KIND, "resource_owner");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.resource_owner_inner(record)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn resource_owner_inner(&self, record: &AccessTokenRecord) -> Result<ResourceOwner> {
		let authorization = BearerCredentialEncoder
			.authorization_header(&self.credential, Some(record.access_token.expose()))?;
		let request = ProviderRequest {
			method: HttpMethod::Get,
			url: self.config.resource_owner_endpoint.clone(),
			authorization,
			form: Vec::new(),
		};
		let response = self.http_client.execute(request).await?;
		let data = flows::parse_json(&response)?;

		self.check_response(&data)?;

		let Value::Object(fields) = data else {
			return Err(ConfigError::ResourceOwnerShape.into());
		};

		Ok(ResourceOwner::new(fields, self.config.resource_owner_id_key.clone()))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn owner_identifier_reads_the_configured_key() {
		let Value::Object(fields) = json!({ "encodedId": "26FWFL", "displayName": "F." }) else {
			unreachable!("Fixture is an object.");
		};
		let owner = ResourceOwner::new(fields, "encodedId");

		assert_eq!(owner.id().as_deref(), Some("26FWFL"));
		assert_eq!(owner.get("displayName"), Some(&json!("F.")));
		assert_eq!(owner.get("missing"), None);
	}

	#[test]
	fn owner_identifier_is_absent_when_unmapped() {
		let Value::Object(fields) = json!({ "id": 7 }) else {
			unreachable!("Fixture is an object.");
		};
		let owner = ResourceOwner::new(fields, "user_id");

		assert_eq!(owner.id(), None);
	}
}
