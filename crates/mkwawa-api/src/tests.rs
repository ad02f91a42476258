//! Router tests: requests go through the full axum stack against an
//! in-memory SQLite store and recording collaborators.

use std::time::Duration;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use mkwawa_core::{
  auth::Role,
  parish::Parish,
  testing::Fakes,
};
use mkwawa_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;

type State = AppState<SqliteStore, Fakes>;

const PASSWORD: &str = "siri";

async fn make_state(collab: Fakes) -> State {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt  = SaltString::generate(&mut OsRng);
  let hash  = Argon2::default()
    .hash_password(PASSWORD.as_bytes(), &salt)
    .unwrap()
    .to_string();
  let operator = |username: &str, role| Operator {
    username:      username.into(),
    password_hash: hash.clone(),
    role,
  };

  AppState::new(
    Parish::new(store, collab),
    AuthConfig {
      operators: vec![
        operator("admin", Role::Admin),
        operator("hazina", Role::ParishTreasurer),
        operator("katibu", Role::CouncilSecretary),
        operator("mwinjilisti", Role::Evangelist),
      ],
    },
  )
}

fn auth_header(user: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{PASSWORD}")))
}

async fn send(state: &State, req: Request<Body>) -> (StatusCode, Value) {
  let resp   = api_router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body   = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, body)
}

async fn call(
  state:  &State,
  user:   Option<&str>,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(user) = user {
    builder = builder.header(header::AUTHORIZATION, auth_header(user));
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  send(state, req).await
}

const BOUNDARY: &str = "mkwawa-test-boundary";

/// `(field name, optional file name, content)`
fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
  let mut body = Vec::new();
  for (name, file_name, content) in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    let disposition = match file_name {
      Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
      None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
    };
    body.extend_from_slice(disposition.as_bytes());
    if file_name.is_some() {
      body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(content.as_bytes());
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

async fn upload(
  state: &State,
  user:  &str,
  method: &str,
  uri:   &str,
  parts: &[(&str, Option<&str>, &str)],
) -> (StatusCode, Value) {
  let req = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::AUTHORIZATION, auth_header(user))
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(multipart_body(parts)))
    .unwrap();
  send(state, req).await
}

fn signup_form(name: &str, phone: &str) -> Value {
  json!({
    "full_name":     name,
    "date_of_birth": "1990-01-15",
    "gender":        "Female",
    "phone_number":  phone,
  })
}

/// Sign a member up anonymously and approve them; returns the member JSON.
async fn active_member(state: &State, name: &str, phone: &str) -> Value {
  let (status, member) =
    call(state, None, "POST", "/signup", Some(signup_form(name, phone))).await;
  assert_eq!(status, StatusCode::CREATED, "{member}");
  let id = member["id"].as_str().unwrap().to_owned();
  let (status, member) =
    call(state, Some("katibu"), "POST", &format!("/members/{id}/approve"), None).await;
  assert_eq!(status, StatusCode::OK, "{member}");
  member
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_signup_creates_a_pending_member() {
  let state = make_state(Fakes::default()).await;
  let (status, member) =
    call(&state, None, "POST", "/signup", Some(signup_form("Neema Mushi", "255717000001"))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(member["status"], "Pending");
  assert_eq!(member["member_id"].as_str().unwrap().len(), 20);
}

#[tokio::test]
async fn anonymous_listing_is_challenged() {
  let state = make_state(Fakes::default()).await;
  let req = Request::builder().uri("/members").body(Body::empty()).unwrap();
  let resp = api_router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_is_rejected_even_on_open_routes() {
  let state = make_state(Fakes::default()).await;
  let req = Request::builder()
    .method("POST")
    .uri("/signup")
    .header(header::AUTHORIZATION, format!("Basic {}", B64.encode("admin:wrong")))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(signup_form("Neema Mushi", "255717000001").to_string()))
    .unwrap();
  let (status, body) = send(&state, req).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn roles_are_enforced_per_route() {
  let state = make_state(Fakes::default()).await;
  let form = signup_form("Neema Mushi", "255717000001");

  let (status, body) = call(&state, Some("hazina"), "POST", "/members", Some(form.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["kind"], "permission_denied");

  let (status, _) = call(&state, Some("mwinjilisti"), "GET", "/offerings", None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = call(&state, Some("hazina"), "GET", "/members", None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = call(&state, Some("katibu"), "POST", "/members", Some(form)).await;
  assert_eq!(status, StatusCode::CREATED);
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_texts_the_member() {
  let state = make_state(Fakes::default()).await;
  let member = active_member(&state, "Neema Mushi", "255717000001").await;
  assert_eq!(member["status"], "Active");

  let sent = state.parish.collaborators().sms.messages();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0, "255717000001");
  assert!(sent[0].1.starts_with("Hongera Neema Mushi!"));

  let (status, log) = call(&state, Some("admin"), "GET", "/sms", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(log.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_phone_is_a_validation_error() {
  let state = make_state(Fakes::default()).await;
  let (status, body) =
    call(&state, None, "POST", "/signup", Some(signup_form("Neema Mushi", "0717000001"))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation");
  assert!(body["error"].as_str().unwrap().contains("phone_number"));
}

#[tokio::test]
async fn unknown_member_is_not_found() {
  let state = make_state(Fakes::default()).await;
  let (status, body) =
    call(&state, Some("admin"), "GET", &format!("/members/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn profile_lookup_and_filtering() {
  let state = make_state(Fakes::default()).await;
  let member = active_member(&state, "Neema Mushi", "255717000001").await;
  call(&state, None, "POST", "/signup", Some(signup_form("Rehema Kibona", "255717000002"))).await;

  let id = member["id"].as_str().unwrap();
  let (_, profile) = call(&state, Some("admin"), "GET", &format!("/members/{id}"), None).await;
  assert!(profile["age"].as_i64().unwrap() >= 35);
  assert!(profile["registered_since"].is_string());

  let member_id = member["member_id"].as_str().unwrap();
  let (status, found) = call(
    &state,
    Some("admin"),
    "GET",
    &format!("/members/by-member-id/{member_id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(found["id"], member["id"]);

  let (_, pending) = call(&state, Some("admin"), "GET", "/members?status=Pending", None).await;
  let pending = pending.as_array().unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0]["full_name"], "Rehema Kibona");
}

#[tokio::test]
async fn passport_upload_is_stored() {
  let state = make_state(Fakes::default()).await;
  let member = active_member(&state, "Neema Mushi", "255717000001").await;
  let id = member["id"].as_str().unwrap();

  let (status, updated) = upload(
    &state,
    "katibu",
    "PUT",
    &format!("/members/{id}/passport"),
    &[("passport", Some("neema.jpg"), "jpeg")],
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{updated}");
  let path = updated["passport"].as_str().unwrap();
  assert!(state.parish.collaborators().files.paths().contains(&path.to_owned()));

  let (status, body) =
    upload(&state, "katibu", "PUT", &format!("/members/{id}/passport"), &[]).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation");
}

// ─── Sacraments ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn baptism_with_certificate_then_confirmation() {
  let state = make_state(Fakes::default()).await;
  let member = active_member(&state, "Neema Mushi", "255717000001").await;
  let id = member["id"].as_str().unwrap();

  let (status, body) = upload(
    &state,
    "katibu",
    "POST",
    &format!("/members/{id}/confirmation"),
    &[("date", None, "2005-06-01")],
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "invariant");

  let (status, baptised) = upload(
    &state,
    "katibu",
    "POST",
    &format!("/members/{id}/baptism"),
    &[("date", None, "1990-03-01"), ("certificate", Some("cheti.pdf"), "pdf")],
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{baptised}");
  assert_eq!(baptised["sacraments"]["stage"], "baptized");
  assert!(
    baptised["baptism_certificate"]
      .as_str()
      .unwrap()
      .starts_with("baptism_certificates/")
  );

  let (status, confirmed) = upload(
    &state,
    "katibu",
    "POST",
    &format!("/members/{id}/confirmation"),
    &[("date", None, "2005-06-01")],
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{confirmed}");
  assert_eq!(confirmed["sacraments"]["stage"], "confirmed");

  let (status, revoked) =
    call(&state, Some("katibu"), "DELETE", &format!("/members/{id}/baptism"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(revoked["sacraments"]["stage"], "none");
  assert!(revoked["baptism_certificate"].is_null());
}

#[tokio::test]
async fn malformed_sacrament_date_is_rejected() {
  let state = make_state(Fakes::default()).await;
  let member = active_member(&state, "Neema Mushi", "255717000001").await;
  let id = member["id"].as_str().unwrap();
  let (status, body) = upload(
    &state,
    "katibu",
    "POST",
    &format!("/members/{id}/baptism"),
    &[("date", None, "01/03/1990")],
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("date"));
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn current_year_lifecycle() {
  let state = make_state(Fakes::default()).await;

  let (status, body) = call(&state, Some("admin"), "GET", "/years/current", None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "invariant");

  let (status, year) = call(
    &state,
    Some("admin"),
    "POST",
    "/years",
    Some(json!({ "year": 2024, "is_current": true })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) =
    call(&state, Some("admin"), "POST", "/years", Some(json!({ "year": 2019 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "validation");

  let id = year["id"].as_str().unwrap();
  let (status, _) = call(&state, Some("admin"), "DELETE", &format!("/years/{id}"), None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, _) = call(&state, Some("hazina"), "PUT", "/years/current", Some(json!({ "year": 2024 }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn church_altitude_is_resolved_in_the_background() {
  let state = make_state(Fakes::with_altitude(1_635.0)).await;
  let (status, location) = call(
    &state,
    Some("admin"),
    "POST",
    "/church-locations",
    Some(json!({ "latitude": -7.77, "longitude": 35.69, "altitude": null })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(location["altitude"].is_null());

  let mut altitude = Value::Null;
  for _ in 0..50 {
    let (_, active) = call(&state, Some("admin"), "GET", "/church-locations/active", None).await;
    altitude = active["altitude"].clone();
    if !altitude.is_null() {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert_eq!(altitude, json!(1_635.0));

  let (status, body) = call(
    &state,
    Some("admin"),
    "POST",
    "/church-locations?replace=false",
    Some(json!({ "latitude": -7.0, "longitude": 35.0, "altitude": 1500.0 })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "invariant");
}

// ─── Finance and reports ─────────────────────────────────────────────────────

#[tokio::test]
async fn money_records_need_a_current_year() {
  let state = make_state(Fakes::default()).await;
  let (_, category) = call(
    &state,
    Some("hazina"),
    "POST",
    "/expense-categories",
    Some(json!({ "name": "Umeme" })),
  )
  .await;
  let id = category["id"].as_str().unwrap();
  let form = json!({ "expenditure_amount": "30000", "month": "March" });

  let uri = format!("/expense-categories/{id}/expenditures");
  let (status, body) = call(&state, Some("hazina"), "POST", &uri, Some(form.clone())).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["kind"], "invariant");

  call(&state, Some("admin"), "POST", "/years", Some(json!({ "year": 2025, "is_current": true }))).await;
  let (status, spent) = call(&state, Some("hazina"), "POST", &uri, Some(form)).await;
  assert_eq!(status, StatusCode::CREATED, "{spent}");

  let (status, listed) =
    call(&state, Some("hazina"), "GET", "/expenditures?year=2025&month=March", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, report) = call(
    &state,
    Some("hazina"),
    "GET",
    "/reports/general?month=March&year=2025",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["period"]["month"], "March");
  assert_eq!(report["table_h"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_category_is_a_conflict() {
  let state = make_state(Fakes::default()).await;
  let body = json!({ "name": "Sadaka ya Jumapili" });
  let (status, _) =
    call(&state, Some("admin"), "POST", "/offering-categories", Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, err) = call(&state, Some("admin"), "POST", "/offering-categories", Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(err["kind"], "conflict");
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn dispatch_texts_each_recipient_once() {
  let state = make_state(Fakes::default()).await;
  let a = active_member(&state, "Neema Mushi", "255717000001").await;
  let b = active_member(&state, "Rehema Kibona", "255717000002").await;

  let (status, report) = call(
    &state,
    Some("katibu"),
    "POST",
    "/notifications",
    Some(json!({
      "title":         "Ibada",
      "message":       "Ibada ni saa tatu",
      "recipient_ids": [a["id"], b["id"], a["id"]],
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{report}");
  assert_eq!(report["sms_sent"], 2);
  assert_eq!(report["notifications"].as_array().unwrap().len(), 2);

  let (_, deleted) =
    call(&state, Some("katibu"), "DELETE", "/notifications?title=Ibada", None).await;
  assert_eq!(deleted["deleted"], 2);

  let (status, _) = call(&state, Some("katibu"), "DELETE", "/notifications", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
