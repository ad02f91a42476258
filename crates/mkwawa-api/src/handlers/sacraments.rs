//! Handlers for the sacrament ledger.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/members/:id/baptism` | Multipart: `date`, optional file `certificate` |
//! | `DELETE` | `/members/:id/baptism` | Also revokes confirmation and marriage |
//! | `POST`   | `/members/:id/confirmation` | Multipart: `date`, optional file `certificate` |
//! | `DELETE` | `/members/:id/confirmation` | Also revokes marriage |
//! | `GET`    | `/members/:id/marriage` | `null` when unmarried |
//! | `DELETE` | `/members/:id/marriage` | Both partners become single |
//! | `GET`    | `/marriages` | Future dates first, then most recent |
//! | `POST`   | `/marriages` | Body: `{"husband_id":…,"wife_id":…,"married_on":"2020-05-01"}` |
//! | `PUT`    | `/marriages/:id` | Body: `{"married_on":"2020-05-02"}` |

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use mkwawa_core::{
  Error,
  auth::Capability,
  collab::Collaborators,
  member::ChurchMember,
  sacrament::{Marriage, MarriageEntry, MarriageParties, NewMarriage},
  store::ParishStore,
};
use serde::Deserialize;
use uuid::Uuid;

use super::MultipartForm;
use crate::{AppState, auth::Caller, error::ApiError};

/// Pull the sacrament date and optional certificate out of a multipart body.
async fn sacrament_form(
  multipart: Multipart,
) -> Result<(NaiveDate, Option<mkwawa_core::collab::Upload>), ApiError> {
  let mut form = MultipartForm::read(multipart).await?;
  let date = form
    .fields
    .get("date")
    .ok_or_else(|| Error::validation("date", "this field is required"))?;
  let date = date
    .trim()
    .parse::<NaiveDate>()
    .map_err(|_| Error::validation("date", format!("'{date}' is not a YYYY-MM-DD date")))?;
  Ok((date, form.files.remove("certificate")))
}

// ─── Baptism and confirmation ─────────────────────────────────────────────────

/// `POST /members/:id/baptism`
pub async fn register_baptism<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  let (on, certificate) = sacrament_form(multipart).await?;
  Ok(Json(state.parish.register_baptism(id, on, certificate).await?))
}

/// `POST /members/:id/confirmation`
pub async fn register_confirmation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  let (on, certificate) = sacrament_form(multipart).await?;
  Ok(Json(state.parish.register_confirmation(id, on, certificate).await?))
}

/// `DELETE /members/:id/baptism`
pub async fn revoke_baptism<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  Ok(Json(state.parish.revoke_baptism(id).await?))
}

/// `DELETE /members/:id/confirmation`
pub async fn revoke_confirmation<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  Ok(Json(state.parish.revoke_confirmation(id).await?))
}

// ─── Marriage ─────────────────────────────────────────────────────────────────

/// `GET /members/:id/marriage`
pub async fn marriage_for<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Option<MarriageParties>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewMembers)?;
  Ok(Json(state.parish.get_marriage_for(id).await?))
}

/// `DELETE /members/:id/marriage`
pub async fn revoke_marriage<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchMember>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  Ok(Json(state.parish.revoke_marriage(id).await?))
}

/// `GET /marriages`
pub async fn list_marriages<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<MarriageEntry>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewMembers)?;
  Ok(Json(state.parish.list_marriages().await?))
}

/// `POST /marriages`
pub async fn register_marriage<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<NewMarriage>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  let marriage = state.parish.register_marriage(body).await?;
  Ok((StatusCode::CREATED, Json(marriage)))
}

#[derive(Debug, Deserialize)]
pub struct MarriageDateBody {
  pub married_on: NaiveDate,
}

/// `PUT /marriages/:id`
pub async fn update_marriage_date<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<MarriageDateBody>,
) -> Result<Json<Marriage>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageSacraments)?;
  Ok(Json(state.parish.update_marriage_date(id, body.married_on).await?))
}
