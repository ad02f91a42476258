//! Handlers for the identity store.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/signup` | Open to anonymous callers; the member starts `Pending` |
//! | `GET`    | `/members` | Filters: `status`, `gender`, `cell_id`, `outstation_id`, `is_leader`, `is_baptised`, `is_confirmed`, `is_married`, `text`, `limit`, `offset` |
//! | `POST`   | `/members` | |
//! | `GET`    | `/members/by-member-id/:member_id` | |
//! | `GET`    | `/members/:id` | Includes `age` and `registered_since` |
//! | `PUT`    | `/members/:id` | |
//! | `DELETE` | `/members/:id` | |
//! | `POST`   | `/members/:id/approve` | Texts the member when they become active |
//! | `PUT`    | `/members/:id/status` | Body: `{"status":"Inactive"}` |
//! | `PUT`    | `/members/:id/passport` | Multipart, file field `passport` |

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  member::{ChurchMember, MemberForm, MemberProfile, MemberQuery, MemberStatus},
  store::ParishStore,
};
use serde::Deserialize;
use uuid::Uuid;

use super::MultipartForm;
use crate::{AppState, auth::Caller, error::ApiError};

// ─── Registration ─────────────────────────────────────────────────────────────

/// `POST /signup`
pub async fn signup<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<MemberForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require_any(&[Capability::RegisterSelf, Capability::ManageMembers])?;
  let member = state.parish.create_member(body).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `POST /members`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<MemberForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  let member = state.parish.create_member(body).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

// ─── Lookup ───────────────────────────────────────────────────────────────────

/// `GET /members[?<filters>]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<ChurchMember>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewMembers)?;
  Ok(Json(state.parish.list_members(query).await?))
}

/// `GET /members/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<MemberProfile>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewMembers)?;
  Ok(Json(state.parish.member_profile(id).await?))
}

/// `GET /members/by-member-id/:member_id`
pub async fn find_by_member_id<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(member_id): Path<String>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewMembers)?;
  Ok(Json(state.parish.find_member_by_member_id(&member_id).await?))
}

// ─── Changes ──────────────────────────────────────────────────────────────────

/// `PUT /members/:id`
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<MemberForm>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  Ok(Json(state.parish.update_member(id, body).await?))
}

/// `POST /members/:id/approve`
pub async fn approve<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  Ok(Json(state.parish.approve_member(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: MemberStatus,
}

/// `PUT /members/:id/status`
pub async fn set_status<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  Ok(Json(state.parish.set_member_status(id, body.status).await?))
}

/// `PUT /members/:id/passport`
pub async fn set_passport<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  let upload = MultipartForm::read(multipart).await?.file("passport")?;
  Ok(Json(state.parish.set_member_passport(id, upload).await?))
}

/// `DELETE /members/:id`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageMembers)?;
  state.parish.delete_member(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
