//! Handlers for `/leaders`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/leaders` | Filters: `member_status`, `gender`, `occupation`, `cell_id`, `outstation_id` |
//! | `POST`   | `/leaders` | Creates or updates the member's leader record |
//! | `GET`    | `/leaders/:id` | |
//! | `DELETE` | `/leaders/:id` | Clears the member's leader flag |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  leader::{LeaderForm, LeaderQuery, LeaderView},
  store::ParishStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

/// `GET /leaders[?<filters>]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LeaderQuery>,
) -> Result<Json<Vec<LeaderView>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewLeaders)?;
  Ok(Json(state.parish.list_leaders(query).await?))
}

/// `POST /leaders`
pub async fn save<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<LeaderForm>,
) -> Result<Json<LeaderView>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageLeaders)?;
  Ok(Json(state.parish.create_or_update_leader(body).await?))
}

/// `GET /leaders/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<LeaderView>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewLeaders)?;
  Ok(Json(state.parish.get_leader(id).await?))
}

/// `DELETE /leaders/:id`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageLeaders)?;
  state.parish.delete_leader(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
