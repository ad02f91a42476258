//! HTTP Basic-auth principal extractor.
//!
//! A request without an `Authorization` header is [`Principal::Anonymous`];
//! one with credentials must match a configured operator or it is rejected
//! with 401.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use mkwawa_core::{
  auth::{Capability, Principal, Role},
  collab::Collaborators,
  store::ParishStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// An operator account, deserialised from the `[[operators]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Operator {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub operators: Vec<Operator>,
}

/// Resolve the principal of a request from its headers.
pub fn principal_from(headers: &HeaderMap, config: &AuthConfig) -> Result<Principal, ApiError> {
  let Some(header_val) = headers.get(axum::http::header::AUTHORIZATION) else {
    return Ok(Principal::Anonymous);
  };
  let header_val = header_val.to_str().map_err(|_| ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let operator = config
    .operators
    .iter()
    .find(|o| o.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&operator.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Principal::Operator { username: operator.username.clone(), role: operator.role })
}

/// The authenticated (or anonymous) caller of a handler.
pub struct Caller(pub Principal);

impl Caller {
  /// Anonymous callers are asked to authenticate; operators lacking the
  /// capability are refused.
  pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
    if self.0 == Principal::Anonymous && !self.0.can(capability) {
      return Err(ApiError::Unauthorized);
    }
    Ok(self.0.require(capability)?)
  }

  /// Passes when any of `capabilities` is held.
  pub fn require_any(&self, capabilities: &[Capability]) -> Result<(), ApiError> {
    if capabilities.iter().any(|&c| self.0.can(c)) {
      return Ok(());
    }
    match self.0 {
      Principal::Anonymous => Err(ApiError::Unauthorized),
      Principal::Operator { .. } => Err(mkwawa_core::Error::PermissionDenied.into()),
    }
  }
}

impl<S, C> FromRequestParts<AppState<S, C>> for Caller
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C>,
  ) -> Result<Self, Self::Rejection> {
    principal_from(&parts.headers, &state.auth).map(Caller)
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::{HeaderValue, header};
  use rand_core::OsRng;

  use super::*;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig {
      operators: vec![Operator {
        username:      "hazina".into(),
        password_hash: hash,
        role:          Role::ParishTreasurer,
      }],
    }
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("Basic {}", B64.encode(format!("{user}:{pass}")));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
    headers
  }

  #[test]
  fn correct_credentials_resolve_the_operator() {
    let principal = principal_from(&basic("hazina", "secret"), &config("secret")).unwrap();
    assert_eq!(
      principal,
      Principal::Operator { username: "hazina".into(), role: Role::ParishTreasurer }
    );
  }

  #[test]
  fn missing_header_is_anonymous() {
    let principal = principal_from(&HeaderMap::new(), &config("secret")).unwrap();
    assert_eq!(principal, Principal::Anonymous);
  }

  #[test]
  fn wrong_password_or_user_is_rejected() {
    let cfg = config("secret");
    assert!(matches!(principal_from(&basic("hazina", "wrong"), &cfg), Err(ApiError::Unauthorized)));
    assert!(matches!(principal_from(&basic("mchungaji", "secret"), &cfg), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn invalid_base64_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64!!!"));
    assert!(matches!(principal_from(&headers, &config("secret")), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn anonymous_callers_are_challenged_and_operators_refused() {
    let anonymous = Caller(Principal::Anonymous);
    assert!(anonymous.require(Capability::RegisterSelf).is_ok());
    assert!(matches!(anonymous.require(Capability::ViewMembers), Err(ApiError::Unauthorized)));

    let evangelist = Caller(Principal::Operator { username: "e".into(), role: Role::Evangelist });
    assert!(matches!(
      evangelist.require(Capability::ManageFinance),
      Err(ApiError::Core(mkwawa_core::Error::PermissionDenied))
    ));
    assert!(evangelist.require_any(&[Capability::ManageMembers, Capability::ViewMembers]).is_ok());
  }
}
