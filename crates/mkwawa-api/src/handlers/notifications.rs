//! Handlers for the notification dispatcher and the SMS log.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | Optional `recipient_id`, `title`, `is_read` |
//! | `POST`   | `/notifications` | Body: `{"title":…,"message":…,"recipient_ids":[…]}` |
//! | `DELETE` | `/notifications?title=<title>` | Deletes every notification with the title |
//! | `DELETE` | `/notifications/:id` | |
//! | `PUT`    | `/notifications/:id/read` | |
//! | `GET`    | `/sms` | Newest first |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  notification::{Dispatch, Notification, NotificationQuery, SentSms},
  store::ParishStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

/// `GET /notifications[?<filters>]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewNotifications)?;
  Ok(Json(state.parish.list_notifications(query).await?))
}

/// `POST /notifications`
///
/// Responds with the stored notifications and how many texts went out. A
/// failed SMS never fails the request.
pub async fn dispatch<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<Dispatch>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::SendNotifications)?;
  let report = state.parish.dispatch(body).await?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `PUT /notifications/:id/read`
pub async fn mark_read<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewNotifications)?;
  Ok(Json(state.parish.mark_notification_read(id).await?))
}

/// `DELETE /notifications/:id`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::SendNotifications)?;
  state.parish.delete_notification(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct TitleParams {
  pub title: Option<String>,
}

/// `DELETE /notifications?title=<title>`
pub async fn delete_by_title<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(params): Query<TitleParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::SendNotifications)?;
  let title = params
    .title
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("the `title` parameter is required".into()))?;
  let deleted = state.parish.delete_notifications_by_title(&title).await?;
  Ok(Json(json!({ "deleted": deleted })))
}

/// `GET /sms`
pub async fn sent_sms<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<SentSms>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewNotifications)?;
  Ok(Json(state.parish.list_sent_sms().await?))
}
