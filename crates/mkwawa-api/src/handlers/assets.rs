//! Handlers for the asset registry.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assets` | Optional `?asset_type=` and `?status=` |
//! | `POST`   | `/assets` | |
//! | `GET`/`PUT`/`DELETE` | `/assets/:id` | Delete removes media and rentings |
//! | `GET`    | `/assets/:id/media` | |
//! | `POST`   | `/assets/:id/media` | Multipart, file field `image` |
//! | `DELETE` | `/asset-media/:id` | |

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mkwawa_core::{
  asset::{AssetForm, AssetMedia, AssetQuery, ChurchAsset},
  auth::Capability,
  collab::Collaborators,
  store::ParishStore,
};
use uuid::Uuid;

use super::MultipartForm;
use crate::{AppState, auth::Caller, error::ApiError};

/// `GET /assets[?asset_type=<type>&status=<status>]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<AssetQuery>,
) -> Result<Json<Vec<ChurchAsset>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewAssets)?;
  Ok(Json(state.parish.list_assets(query).await?))
}

/// `POST /assets`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<AssetForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageAssets)?;
  let asset = state.parish.create_asset(body).await?;
  Ok((StatusCode::CREATED, Json(asset)))
}

/// `GET /assets/:id`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ChurchAsset>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewAssets)?;
  Ok(Json(state.parish.get_asset(id).await?))
}

/// `PUT /assets/:id`
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<AssetForm>,
) -> Result<Json<ChurchAsset>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageAssets)?;
  Ok(Json(state.parish.update_asset(id, body).await?))
}

/// `DELETE /assets/:id`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageAssets)?;
  state.parish.delete_asset(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Media ────────────────────────────────────────────────────────────────────

/// `GET /assets/:id/media`
pub async fn list_media<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssetMedia>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewAssets)?;
  Ok(Json(state.parish.list_asset_media(id).await?))
}

/// `POST /assets/:id/media`
pub async fn add_media<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageAssets)?;
  let upload = MultipartForm::read(multipart).await?.file("image")?;
  let media = state.parish.add_asset_media(id, upload).await?;
  Ok((StatusCode::CREATED, Json(media)))
}

/// `DELETE /asset-media/:id`
pub async fn delete_media<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageAssets)?;
  state.parish.delete_asset_media(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
