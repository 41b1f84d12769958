//! Exchanges an authorization code for an access token and fetches the resource-owner profile.
//!
//! Usage: set `FITBIT_CLIENT_ID`, `FITBIT_CLIENT_SECRET`, and `FITBIT_REDIRECT_URI`, then pass
//! the code from the redirect callback as the first argument.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_fitbit::{
	auth::ClientCredential,
	flows::{TokenExchangeOptions, TokenGrant},
	provider::{FitbitProvider, ProviderConfiguration},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client_id = env::var("FITBIT_CLIENT_ID")?;
	let client_secret = env::var("FITBIT_CLIENT_SECRET")?;
	let redirect_uri = Url::parse(&env::var("FITBIT_REDIRECT_URI")?)?;
	let code = env::args().nth(1).ok_or_else(|| eyre!("Pass the authorization code."))?;
	let credential = ClientCredential::new(client_id, client_secret);
	// Fitbit token responses carry the owner id under `user_id`.
	let config = ProviderConfiguration::default()
		.with_response_error_code_key("errorCode")
		.with_resource_owner_id_key("user_id");
	let provider = FitbitProvider::new(credential, redirect_uri).with_config(config)?;
	let record = provider
		.exchange(TokenGrant::AuthorizationCode { code }, TokenExchangeOptions::new())
		.await?;

	println!("Token expires at {}.", record.expires_at);

	if let Some(owner_id) = record.resource_owner_id.as_deref() {
		println!("Resource owner: {owner_id}.");
	}
	if let Some(scope) = record.scope.as_ref() {
		println!("Granted scopes: {scope}.");
	}

	let owner = provider.resource_owner(&record).await?;

	println!("Profile fields: {}.", owner.fields().len());

	Ok(())
}
