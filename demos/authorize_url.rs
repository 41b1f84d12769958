//! Shapes authorization redirects for both flow variants and walks the `state` value through a
//! simulated redirect handler.

// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_fitbit::{
	auth::{ClientCredential, ScopeSet},
	provider::{AuthorizationRequestOptions, FitbitProvider, Flow, Prompt},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let credential = ClientCredential::new("demo-client", "demo-secret");
	let redirect_uri = Url::parse("https://app.example.com/oauth/callback")?;
	let provider = FitbitProvider::new(credential, redirect_uri);
	// No scope supplied: the required Fitbit set is substituted automatically.
	let session = provider.authorize_session(&AuthorizationRequestOptions::new())?;

	println!("Authorization flow: send your user to {}.", &session.authorize_url);
	println!("Requested scopes: {}.", &session.scope);

	// Simulate the redirect handler checking the returned `state`.
	let returned_state = session.state.clone();

	session.validate_state(&returned_state)?;
	println!("State `{returned_state}` validated.");

	let implicit = provider.clone().with_flow(Flow::Implicit);
	let scope = ScopeSet::new([
		"activity",
		"heartrate",
		"nutrition",
		"profile",
		"settings",
		"sleep",
		"social",
		"weight",
	])?;
	let options = AuthorizationRequestOptions::new()
		.with_scope(scope)
		.with_prompt(Prompt::Consent)
		.with_expires_in(oauth2_fitbit::provider::EXPIRES_IN_WEEK);
	let session = implicit.authorize_session(&options)?;

	println!("Implicit flow: send your user to {}.", &session.authorize_url);

	Ok(())
}
