//! Handlers for the configuration registry: years, outstations, cells and
//! the church location.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/years` | |
//! | `POST`   | `/years` | Body: `{"year":2025,"is_current":true}` |
//! | `GET`    | `/years/current` | 422 when none is current |
//! | `PUT`    | `/years/current` | Body: `{"year":2025}` |
//! | `DELETE` | `/years/:id` | 422 for the current year, 409 while referenced |
//! | `GET`/`POST` | `/outstations` | |
//! | `GET`/`PUT`/`DELETE` | `/outstations/:id` | |
//! | `GET`/`POST` | `/cells` | Optional `?outstation_id=` |
//! | `GET`/`PUT`/`DELETE` | `/cells/:id` | |
//! | `GET`    | `/church-locations` | |
//! | `POST`   | `/church-locations` | `?replace=false` refuses to displace an active location |
//! | `GET`    | `/church-locations/active` | `null` when none is set |
//! | `PUT`    | `/church-locations/:id/activate` | |
//! | `DELETE` | `/church-locations/:id` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  settings::{
    Cell, CellForm, ChurchLocation, NewChurchLocation, NewYear, OutStation,
    OutStationForm, Year,
  },
  store::ParishStore,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Years ────────────────────────────────────────────────────────────────────

/// `GET /years`
pub async fn list_years<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<Year>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.list_years().await?))
}

/// `POST /years`
pub async fn create_year<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<NewYear>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  let year = state.parish.create_year(body).await?;
  Ok((StatusCode::CREATED, Json(year)))
}

/// `GET /years/current`
pub async fn current_year<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Year>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.current_year().await?))
}

#[derive(Debug, Deserialize)]
pub struct CurrentYearBody {
  pub year: i32,
}

/// `PUT /years/current`
pub async fn set_current_year<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<CurrentYearBody>,
) -> Result<Json<Year>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  Ok(Json(state.parish.set_current_year(body.year).await?))
}

/// `DELETE /years/:id`
pub async fn delete_year<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  state.parish.delete_year(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Outstations ──────────────────────────────────────────────────────────────

/// `GET /outstations`
pub async fn list_outstations<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<OutStation>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.list_outstations().await?))
}

/// `POST /outstations`
pub async fn create_outstation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<OutStationForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  let outstation = state.parish.create_outstation(body).await?;
  Ok((StatusCode::CREATED, Json(outstation)))
}

/// `GET /outstations/:id`
pub async fn get_outstation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<OutStation>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.get_outstation(id).await?))
}

/// `PUT /outstations/:id`
pub async fn update_outstation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<OutStationForm>,
) -> Result<Json<OutStation>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  Ok(Json(state.parish.update_outstation(id, body).await?))
}

/// `DELETE /outstations/:id`: cascades to cells; refused while offerings
/// reference the outstation.
pub async fn delete_outstation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  state.parish.delete_outstation(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Cells ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CellParams {
  pub outstation_id: Option<Uuid>,
}

/// `GET /cells[?outstation_id=<uuid>]`
pub async fn list_cells<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(params): Query<CellParams>,
) -> Result<Json<Vec<Cell>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.list_cells(params.outstation_id).await?))
}

/// `POST /cells`
pub async fn create_cell<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<CellForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  let cell = state.parish.create_cell(body).await?;
  Ok((StatusCode::CREATED, Json(cell)))
}

/// `GET /cells/:id`
pub async fn get_cell<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Cell>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.get_cell(id).await?))
}

/// `PUT /cells/:id`
pub async fn update_cell<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<CellForm>,
) -> Result<Json<Cell>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  Ok(Json(state.parish.update_cell(id, body).await?))
}

/// `DELETE /cells/:id`
pub async fn delete_cell<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  state.parish.delete_cell(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Church location ──────────────────────────────────────────────────────────

/// `GET /church-locations`
pub async fn list_church_locations<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<ChurchLocation>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.list_church_locations().await?))
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
  #[serde(default = "default_replace")]
  pub replace: bool,
}

fn default_replace() -> bool { true }

/// `POST /church-locations[?replace=false]`
///
/// The location is saved and returned at once. A missing altitude is looked
/// up in the background and stored when the elevation service answers.
pub async fn set_church_location<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(params): Query<LocationParams>,
  Json(body): Json<NewChurchLocation>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  let location = if params.replace {
    state.parish.set_church_location(body).await?
  } else {
    state.parish.insert_church_location(body).await?
  };

  if location.altitude.is_none() {
    let parish = state.parish.clone();
    let pending = location.clone();
    tokio::spawn(async move {
      if let Err(e) = parish.resolve_altitude(&pending).await {
        warn!(id = %pending.id, error = %e, "could not store church altitude");
      }
    });
  }
  Ok((StatusCode::CREATED, Json(location)))
}

/// `GET /church-locations/active`
pub async fn active_church_location<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Option<ChurchLocation>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewSettings)?;
  Ok(Json(state.parish.active_church_location().await?))
}

/// `PUT /church-locations/:id/activate`
pub async fn activate_church_location<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchLocation>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  Ok(Json(state.parish.activate_church_location(id).await?))
}

/// `DELETE /church-locations/:id`
pub async fn delete_church_location<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSettings)?;
  state.parish.delete_church_location(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
