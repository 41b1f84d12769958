//! Grant descriptions exchanged at the token endpoint.

// self
use crate::_prelude::*;

/// Errors raised while verifying grant material before a token request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum GrantVerificationError {
	/// Authorization codes cannot be empty.
	#[error("Authorization code cannot be empty.")]
	EmptyAuthorizationCode,
	/// Refresh tokens cannot be empty.
	#[error("Refresh token cannot be empty.")]
	EmptyRefreshToken,
	/// Redirect state did not round-trip.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}

/// Opaque grant description exchanged for an access token.
#[derive(Clone)]
pub enum TokenGrant {
	/// Authorization code obtained from the redirect callback.
	AuthorizationCode {
		/// Code returned by the authorization endpoint.
		code: String,
	},
	/// Refresh token issued by a previous exchange.
	RefreshToken {
		/// Refresh token secret.
		token: String,
	},
}
impl TokenGrant {
	/// Returns the RFC 6749 `grant_type` tag.
	pub fn grant_type(&self) -> &'static str {
		match self {
			TokenGrant::AuthorizationCode { .. } => "authorization_code",
			TokenGrant::RefreshToken { .. } => "refresh_token",
		}
	}

	/// Verifies the grant material and merges its wire parameters into `form`.
	pub(crate) fn prepare_request_parameters(
		&self,
		form: &mut BTreeMap<String, String>,
	) -> Result<(), GrantVerificationError> {
		form.insert("grant_type".into(), self.grant_type().into());

		match self {
			TokenGrant::AuthorizationCode { code } => {
				if code.is_empty() {
					return Err(GrantVerificationError::EmptyAuthorizationCode);
				}

				form.insert("code".into(), code.clone());
			},
			TokenGrant::RefreshToken { token } => {
				if token.is_empty() {
					return Err(GrantVerificationError::EmptyRefreshToken);
				}

				form.insert("refresh_token".into(), token.clone());
			},
		}

		Ok(())
	}
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			TokenGrant::AuthorizationCode { .. } =>
				f.debug_struct("AuthorizationCode").field("code", &"<redacted>").finish(),
			TokenGrant::RefreshToken { .. } =>
				f.debug_struct("RefreshToken").field("token", &"<redacted>").finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grants_prepare_their_wire_parameters() {
		let mut form = BTreeMap::new();

		TokenGrant::AuthorizationCode { code: "abc".into() }
			.prepare_request_parameters(&mut form)
			.expect("Non-empty codes should prepare successfully.");

		assert_eq!(form.get("grant_type").map(String::as_str), Some("authorization_code"));
		assert_eq!(form.get("code").map(String::as_str), Some("abc"));

		let mut form = BTreeMap::new();

		TokenGrant::RefreshToken { token: "xyz".into() }
			.prepare_request_parameters(&mut form)
			.expect("Non-empty refresh tokens should prepare successfully.");

		assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
		assert_eq!(form.get("refresh_token").map(String::as_str), Some("xyz"));
	}

	#[test]
	fn empty_grant_material_is_rejected() {
		let mut form = BTreeMap::new();
		let err = TokenGrant::AuthorizationCode { code: String::new() }
			.prepare_request_parameters(&mut form)
			.expect_err("Empty codes must be rejected.");

		assert_eq!(err, GrantVerificationError::EmptyAuthorizationCode);

		let err = TokenGrant::RefreshToken { token: String::new() }
			.prepare_request_parameters(&mut form)
			.expect_err("Empty refresh tokens must be rejected.");

		assert_eq!(err, GrantVerificationError::EmptyRefreshToken);
	}

	#[test]
	fn grant_debug_redacts_material() {
		let grant = TokenGrant::AuthorizationCode { code: "sensitive".into() };

		assert!(!format!("{grant:?}").contains("sensitive"));
	}
}
