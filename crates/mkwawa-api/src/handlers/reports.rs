//! Handlers for `/reports`.

use axum::{
  Json,
  extract::{Query, State},
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  finance::Month,
  report::{GeneralReport, ParishSummary},
  store::ParishStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Caller, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub month: Option<Month>,
  pub year:  Option<i32>,
}

/// `GET /reports/general[?month=March&year=2025]`
///
/// The month defaults to the calendar month, the year to the current year.
pub async fn general<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(params): Query<ReportParams>,
) -> Result<Json<GeneralReport>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewReports)?;
  Ok(Json(state.parish.general_report(params.month, params.year).await?))
}

/// `GET /reports/summary`
pub async fn summary<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<ParishSummary>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewReports)?;
  Ok(Json(state.parish.parish_summary().await?))
}
