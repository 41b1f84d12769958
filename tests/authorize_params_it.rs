#![cfg(feature = "reqwest")]

// std
use std::collections::HashMap;
// self
use oauth2_fitbit::{
	auth::{ClientCredential, ScopeSet},
	error::Error,
	provider::{AuthorizationRequestOptions, FitbitProvider, Flow, Prompt, ReqwestFitbitProvider},
	url::Url,
};

const CLIENT_ID: &str = "22942C";
const CLIENT_SECRET: &str = "client secret";

fn build_provider(flow: Flow) -> ReqwestFitbitProvider {
	let credential = ClientCredential::new(CLIENT_ID, CLIENT_SECRET);
	let redirect_uri = Url::parse("https://app.example.com/callback")
		.expect("Redirect URI fixture should parse successfully.");

	FitbitProvider::new(credential, redirect_uri).with_flow(flow)
}

fn query_pairs(url: &Url) -> HashMap<String, String> {
	url.query_pairs().into_owned().collect()
}

#[test]
fn authorization_flow_builds_the_documented_redirect() {
	let provider = build_provider(Flow::Authorization);
	let session = provider
		.authorize_session(&AuthorizationRequestOptions::new())
		.expect("Default options should build an authorization session.");

	assert!(session.authorize_url.as_str().starts_with("https://www.fitbit.com/oauth2/authorize?"));

	let pairs = query_pairs(&session.authorize_url);

	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(CLIENT_ID));
	assert_eq!(
		pairs.get("redirect_uri").map(String::as_str),
		Some("https://app.example.com/callback")
	);
	assert_eq!(
		pairs.get("scope").map(String::as_str),
		Some("activity nutrition profile settings sleep social weight")
	);
	assert_eq!(pairs.get("state").map(String::as_str), Some(session.state.as_str()));
	assert!(!pairs.contains_key("approval_prompt"));
	assert!(!pairs.contains_key("prompt"));
	assert!(!pairs.contains_key("expires_in"));
}

#[test]
fn implicit_flow_carries_response_type_token_and_expiry() {
	let provider = build_provider(Flow::Implicit);
	let session = provider
		.authorize_session(&AuthorizationRequestOptions::new().with_prompt(Prompt::Login))
		.expect("Implicit options should build an authorization session.");
	let pairs = query_pairs(&session.authorize_url);

	assert_eq!(pairs.get("response_type").map(String::as_str), Some("token"));
	assert_eq!(pairs.get("prompt").map(String::as_str), Some("login"));
	assert_eq!(pairs.get("expires_in").map(String::as_str), Some("86400"));
	assert!(!pairs.contains_key("approval_prompt"));
}

#[test]
fn session_state_round_trips_through_the_redirect_handler() {
	let provider = build_provider(Flow::Authorization);
	let session = provider
		.authorize_session(&AuthorizationRequestOptions::new())
		.expect("Default options should build an authorization session.");

	assert!(session.validate_state(&session.state.clone()).is_ok());

	let err = session.validate_state("tampered").expect_err("State mismatch should fail.");

	assert!(matches!(err, Error::Grant(_)));
}

#[test]
fn scope_policy_violations_fail_before_any_url_is_built() {
	let provider = build_provider(Flow::Authorization);
	let undersized =
		ScopeSet::new(["activity"]).expect("Scope fixture should normalize successfully.");
	let err = provider
		.authorize_session(&AuthorizationRequestOptions::new().with_scope(undersized))
		.expect_err("Undersized scope sets must be rejected.");

	assert!(matches!(err, Error::Scope(_)));
}
