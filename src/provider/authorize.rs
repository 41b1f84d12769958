//! Authorization-parameter validation and request shaping.
//!
//! The generic option-to-parameter projection mirrors what a base OAuth client layer emits
//! (`response_type`, `client_id`, `redirect_uri`, `scope`, `state`, `approval_prompt`); the
//! Fitbit step then applies the scope policy, remaps the consent knob to `prompt`, and adds the
//! implicit-flow `expires_in` parameter.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{ScopeCatalog, ScopeSet},
	flows::GrantVerificationError,
	provider::config::{EXPIRES_IN_DAY, Flow, Prompt},
};

const STATE_LEN: usize = 32;

/// Caller input consumed when shaping an authorization redirect.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationRequestOptions {
	/// Requested scope set; the required set is substituted when absent or empty.
	pub scope: Option<ScopeSet>,
	/// Consent-prompt directive; omitted from the redirect when unset.
	pub prompt: Option<Prompt>,
	/// CSRF state value; a random alphanumeric value is generated when unset.
	pub state: Option<String>,
	/// Token lifetime request, honored by the Implicit flow only.
	pub expires_in: Option<Duration>,
}
impl AuthorizationRequestOptions {
	/// Creates empty options: required scopes, generated state, no prompt directive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the requested scope set.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Sets the consent-prompt directive.
	pub fn with_prompt(mut self, prompt: Prompt) -> Self {
		self.prompt = Some(prompt);

		self
	}

	/// Pins the CSRF state value instead of generating one.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Requests a token lifetime (Implicit flow only).
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}
}

/// Ordered query parameters destined for the authorization redirect URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationParameters(BTreeMap<String, String>);
impl AuthorizationParameters {
	/// Returns the value stored under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns true when `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no parameters are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the key/value pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Appends every pair to the query string of `endpoint`.
	pub fn apply_to(&self, endpoint: &Url) -> Url {
		let mut url = endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		for (key, value) in self.0.iter() {
			pairs.append_pair(key, value);
		}

		drop(pairs);

		url
	}

	fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}
}

/// Shaped authorization redirect: URL, state, and the effective scope set.
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Fully-formed authorize URL callers should send end users to.
	pub authorize_url: Url,
	/// State value that must round-trip via the redirect handler.
	pub state: String,
	/// Scope set actually encoded into the redirect.
	pub scope: ScopeSet,
	/// The shaped query parameters, for callers composing their own URL.
	pub parameters: AuthorizationParameters,
}
impl AuthorizationSession {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(GrantVerificationError::StateMismatch.into())
		}
	}
}

#[derive(Debug)]
pub(crate) struct ShapedAuthorization {
	pub(crate) parameters: AuthorizationParameters,
	pub(crate) state: String,
	pub(crate) scope: ScopeSet,
}

pub(crate) fn shape(
	catalog: &ScopeCatalog,
	client_id: &str,
	redirect_uri: &Url,
	flow: Flow,
	options: &AuthorizationRequestOptions,
) -> Result<ShapedAuthorization> {
	let scope = match options.scope.as_ref() {
		// An empty request is distinct from one failing validation: it takes the required set
		// verbatim and skips the policy checks entirely.
		None => catalog.required().clone(),
		Some(requested) if requested.is_empty() => catalog.required().clone(),
		Some(requested) => {
			catalog.check_requested(requested)?;

			requested.clone()
		},
	};
	let state = options.state.clone().unwrap_or_else(|| random_state(STATE_LEN));
	let mut parameters = base_projection(client_id, redirect_uri, flow, &scope, &state);

	// The generic layer speaks `approval_prompt`; Fitbit only understands `prompt`.
	parameters.remove("approval_prompt");

	if let Some(prompt) = options.prompt {
		parameters.insert("prompt", prompt.as_str());
	}
	if matches!(flow, Flow::Implicit) {
		let expires_in = options.expires_in.unwrap_or(EXPIRES_IN_DAY);

		parameters.insert("expires_in", expires_in.whole_seconds().to_string());
	}

	Ok(ShapedAuthorization { parameters, state, scope })
}

// Generic option-to-parameter projection, matching the base layer's output.
fn base_projection(
	client_id: &str,
	redirect_uri: &Url,
	flow: Flow,
	scope: &ScopeSet,
	state: &str,
) -> AuthorizationParameters {
	let mut parameters = AuthorizationParameters::default();

	parameters.insert("response_type", flow.response_type());
	parameters.insert("client_id", client_id);
	parameters.insert("redirect_uri", redirect_uri.as_str());
	parameters.insert("scope", scope.normalized());
	parameters.insert("state", state);
	parameters.insert("approval_prompt", "auto");

	parameters
}

fn random_state(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeSet;
	// self
	use super::*;
	use crate::auth::ScopeConfigurationError;

	fn catalog() -> ScopeCatalog {
		ScopeCatalog::default()
	}

	fn redirect_uri() -> Url {
		Url::parse("https://app.example.com/callback")
			.expect("Redirect URI fixture should parse successfully.")
	}

	fn shape_with(
		flow: Flow,
		options: &AuthorizationRequestOptions,
	) -> Result<ShapedAuthorization> {
		shape(&catalog(), "client-1", &redirect_uri(), flow, options)
	}

	#[test]
	fn required_scope_set_passes_and_serializes_space_joined() {
		let options =
			AuthorizationRequestOptions::new().with_scope(catalog().required().clone());
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("The exact required set should be accepted.");

		assert_eq!(
			shaped.parameters.get("scope"),
			Some("activity nutrition profile settings sleep social weight")
		);
		assert_eq!(shaped.parameters.get("response_type"), Some("code"));
		assert_eq!(shaped.parameters.get("client_id"), Some("client-1"));
		assert_eq!(shaped.parameters.get("redirect_uri"), Some(redirect_uri().as_str()));
	}

	#[test]
	fn scope_round_trips_as_a_set() {
		let requested = ScopeSet::new([
			"weight", "social", "sleep", "settings", "profile", "nutrition", "activity",
			"heartrate",
		])
		.expect("Scope fixture should be valid.");
		let options = AuthorizationRequestOptions::new().with_scope(requested.clone());
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("A superset of the required scopes should be accepted.");
		let serialized = shaped.parameters.get("scope").expect("Scope parameter should be set.");
		let round_tripped: BTreeSet<&str> = serialized.split(' ').collect();
		let original: BTreeSet<&str> = requested.iter().collect();

		assert_eq!(round_tripped, original);
	}

	#[test]
	fn empty_scope_input_substitutes_the_required_set() {
		let shaped = shape_with(Flow::Authorization, &AuthorizationRequestOptions::new())
			.expect("Absent scope input should default to the required set.");

		assert_eq!(&shaped.scope, catalog().required());

		let options = AuthorizationRequestOptions::new()
			.with_scope(ScopeSet::default());
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("Empty scope input should default to the required set.");

		assert_eq!(&shaped.scope, catalog().required());
	}

	#[test]
	fn undersized_scope_sets_are_rejected() {
		let requested =
			ScopeSet::new(["activity", "sleep"]).expect("Scope fixture should be valid.");
		let options = AuthorizationRequestOptions::new().with_scope(requested);
		let err = shape_with(Flow::Authorization, &options)
			.expect_err("Undersized scope sets must be rejected.");

		assert!(matches!(
			err,
			Error::Scope(ScopeConfigurationError::TooFew { supplied: 2, required: 7 })
		));
	}

	#[test]
	fn missing_required_scope_is_rejected_at_matching_cardinality() {
		let requested = ScopeSet::new([
			"activity",
			"nutrition",
			"profile",
			"settings",
			"sleep",
			"social",
			"location",
		])
		.expect("Scope fixture should be valid.");
		let options = AuthorizationRequestOptions::new().with_scope(requested);
		let err = shape_with(Flow::Authorization, &options)
			.expect_err("Incomplete required coverage must be rejected.");

		assert!(matches!(err, Error::Scope(ScopeConfigurationError::MissingRequired { .. })));
	}

	#[test]
	fn disallowed_scope_is_rejected() {
		let requested = ScopeSet::new([
			"activity",
			"nutrition",
			"profile",
			"settings",
			"sleep",
			"social",
			"weight",
			"calendar",
		])
		.expect("Scope fixture should be valid.");
		let options = AuthorizationRequestOptions::new().with_scope(requested);
		let err = shape_with(Flow::Authorization, &options)
			.expect_err("Out-of-vocabulary scopes must be rejected.");

		assert!(matches!(err, Error::Scope(ScopeConfigurationError::Disallowed { .. })));
	}

	#[test]
	fn approval_prompt_never_survives_and_prompt_is_opt_in() {
		let shaped = shape_with(Flow::Authorization, &AuthorizationRequestOptions::new())
			.expect("Default options should shape successfully.");

		assert!(!shaped.parameters.contains_key("approval_prompt"));
		assert!(!shaped.parameters.contains_key("prompt"));

		let options = AuthorizationRequestOptions::new().with_prompt(Prompt::Consent);
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("Prompt-bearing options should shape successfully.");

		assert!(!shaped.parameters.contains_key("approval_prompt"));
		assert_eq!(shaped.parameters.get("prompt"), Some("consent"));
	}

	#[test]
	fn implicit_flow_always_carries_expires_in() {
		let shaped = shape_with(Flow::Implicit, &AuthorizationRequestOptions::new())
			.expect("Implicit defaults should shape successfully.");

		assert_eq!(shaped.parameters.get("response_type"), Some("token"));
		assert_eq!(shaped.parameters.get("expires_in"), Some("86400"));

		let options =
			AuthorizationRequestOptions::new().with_expires_in(Duration::seconds(604_800));
		let shaped = shape_with(Flow::Implicit, &options)
			.expect("Implicit options with a lifetime should shape successfully.");

		assert_eq!(shaped.parameters.get("expires_in"), Some("604800"));
	}

	#[test]
	fn authorization_flow_never_carries_expires_in() {
		let options =
			AuthorizationRequestOptions::new().with_expires_in(Duration::seconds(604_800));
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("Authorization options should shape successfully.");

		assert!(!shaped.parameters.contains_key("expires_in"));
	}

	#[test]
	fn state_is_generated_or_pinned() {
		let shaped = shape_with(Flow::Authorization, &AuthorizationRequestOptions::new())
			.expect("Default options should shape successfully.");

		assert_eq!(shaped.state.len(), STATE_LEN);
		assert!(shaped.state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_eq!(shaped.parameters.get("state"), Some(shaped.state.as_str()));

		let options = AuthorizationRequestOptions::new().with_state("pinned-state");
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("Pinned-state options should shape successfully.");

		assert_eq!(shaped.state, "pinned-state");
		assert_eq!(shaped.parameters.get("state"), Some("pinned-state"));
	}

	#[test]
	fn apply_to_appends_every_pair() {
		let options = AuthorizationRequestOptions::new().with_state("abc");
		let shaped = shape_with(Flow::Authorization, &options)
			.expect("Default options should shape successfully.");
		let endpoint = Url::parse("https://www.fitbit.com/oauth2/authorize")
			.expect("Endpoint fixture should parse successfully.");
		let url = shaped.parameters.apply_to(&endpoint);
		let pairs: BTreeMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.len(), shaped.parameters.len());
		assert_eq!(pairs.get("state").map(String::as_str), Some("abc"));
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	}
}
