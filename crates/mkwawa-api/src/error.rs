//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use mkwawa_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] mkwawa_core::Error),

  /// Credentials missing or wrong on a route that needs an operator.
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  fn status_and_kind(&self) -> (StatusCode, &'static str) {
    match self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
      ApiError::Core(e) => match e.kind() {
        ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        ErrorKind::Invariant => (StatusCode::UNPROCESSABLE_ENTITY, "invariant"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
        ErrorKind::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
        ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.status_and_kind();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self, "request failed");
    }
    let mut res =
      (status, Json(json!({ "error": self.to_string(), "kind": kind }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"mkwawa\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use mkwawa_core::Error;

  use super::*;

  #[test]
  fn statuses_follow_error_kinds() {
    let status = |e: ApiError| e.into_response().status();
    assert_eq!(
      status(Error::validation("phone_number", "bad").into()),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
      status(Error::EvangelistOutstationRequired.into()),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(status(Error::not_found("member", 7).into()), StatusCode::NOT_FOUND);
    assert_eq!(status(Error::Protected("outstation".into()).into()), StatusCode::CONFLICT);
    assert_eq!(status(Error::PermissionDenied.into()), StatusCode::FORBIDDEN);
    assert_eq!(status(Error::IdExhaustion("member ID").into()), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status(ApiError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn unauthorized_carries_a_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
