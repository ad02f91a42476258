//! JSON REST API for the parish registry.
//!
//! Exposes an axum [`Router`] backed by a [`Parish`] service over any
//! [`ParishStore`]. Every route resolves the caller from HTTP Basic
//! credentials and checks one capability before calling the service. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mkwawa_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post, put},
};
use mkwawa_core::{collab::Collaborators, parish::Parish, store::ParishStore};
use tower_http::trace::TraceLayer;

pub use auth::{AuthConfig, Caller, Operator};
pub use error::ApiError;
use handlers::{
  assets, finance, leaders, members, notifications, reports, sacraments, settings,
};

/// Largest accepted request body; certificate scans and asset photographs
/// travel as multipart uploads.
pub const UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, C> {
  pub parish: Arc<Parish<S, C>>,
  pub auth:   Arc<AuthConfig>,
}

impl<S, C> AppState<S, C> {
  pub fn new(parish: Parish<S, C>, auth: AuthConfig) -> Self {
    Self { parish: Arc::new(parish), auth: Arc::new(auth) }
  }
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self { parish: Arc::clone(&self.parish), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  Router::new()
    // Configuration registry
    .route("/years", get(settings::list_years::<S, C>).post(settings::create_year::<S, C>))
    .route(
      "/years/current",
      get(settings::current_year::<S, C>).put(settings::set_current_year::<S, C>),
    )
    .route("/years/{id}", delete(settings::delete_year::<S, C>))
    .route(
      "/outstations",
      get(settings::list_outstations::<S, C>).post(settings::create_outstation::<S, C>),
    )
    .route(
      "/outstations/{id}",
      get(settings::get_outstation::<S, C>)
        .put(settings::update_outstation::<S, C>)
        .delete(settings::delete_outstation::<S, C>),
    )
    .route("/cells", get(settings::list_cells::<S, C>).post(settings::create_cell::<S, C>))
    .route(
      "/cells/{id}",
      get(settings::get_cell::<S, C>)
        .put(settings::update_cell::<S, C>)
        .delete(settings::delete_cell::<S, C>),
    )
    .route(
      "/church-locations",
      get(settings::list_church_locations::<S, C>).post(settings::set_church_location::<S, C>),
    )
    .route("/church-locations/active", get(settings::active_church_location::<S, C>))
    .route(
      "/church-locations/{id}/activate",
      put(settings::activate_church_location::<S, C>),
    )
    .route("/church-locations/{id}", delete(settings::delete_church_location::<S, C>))
    // Identity store
    .route("/signup", post(members::signup::<S, C>))
    .route("/members", get(members::list::<S, C>).post(members::create::<S, C>))
    .route("/members/by-member-id/{member_id}", get(members::find_by_member_id::<S, C>))
    .route(
      "/members/{id}",
      get(members::get_one::<S, C>)
        .put(members::update::<S, C>)
        .delete(members::delete_one::<S, C>),
    )
    .route("/members/{id}/approve", post(members::approve::<S, C>))
    .route("/members/{id}/status", put(members::set_status::<S, C>))
    .route("/members/{id}/passport", put(members::set_passport::<S, C>))
    // Sacrament ledger
    .route(
      "/members/{id}/baptism",
      post(sacraments::register_baptism::<S, C>).delete(sacraments::revoke_baptism::<S, C>),
    )
    .route(
      "/members/{id}/confirmation",
      post(sacraments::register_confirmation::<S, C>)
        .delete(sacraments::revoke_confirmation::<S, C>),
    )
    .route(
      "/members/{id}/marriage",
      get(sacraments::marriage_for::<S, C>).delete(sacraments::revoke_marriage::<S, C>),
    )
    .route(
      "/marriages",
      get(sacraments::list_marriages::<S, C>).post(sacraments::register_marriage::<S, C>),
    )
    .route("/marriages/{id}", put(sacraments::update_marriage_date::<S, C>))
    // Leader registry
    .route("/leaders", get(leaders::list::<S, C>).post(leaders::save::<S, C>))
    .route(
      "/leaders/{id}",
      get(leaders::get_one::<S, C>).delete(leaders::delete_one::<S, C>),
    )
    // Asset registry
    .route("/assets", get(assets::list::<S, C>).post(assets::create::<S, C>))
    .route(
      "/assets/{id}",
      get(assets::get_one::<S, C>)
        .put(assets::update::<S, C>)
        .delete(assets::delete_one::<S, C>),
    )
    .route(
      "/assets/{id}/media",
      get(assets::list_media::<S, C>).post(assets::add_media::<S, C>),
    )
    .route("/asset-media/{id}", delete(assets::delete_media::<S, C>))
    // Finance ledger
    .route(
      "/offering-categories",
      get(finance::list_offering_categories::<S, C>)
        .post(finance::create_offering_category::<S, C>),
    )
    .route(
      "/offering-categories/{id}",
      put(finance::update_offering_category::<S, C>)
        .delete(finance::delete_offering_category::<S, C>),
    )
    .route(
      "/offerings",
      get(finance::list_offerings::<S, C>).post(finance::create_offering::<S, C>),
    )
    .route(
      "/offerings/{id}",
      put(finance::update_offering::<S, C>).delete(finance::delete_offering::<S, C>),
    )
    .route(
      "/facility-rentings",
      get(finance::list_facility_rentings::<S, C>)
        .post(finance::create_facility_renting::<S, C>),
    )
    .route(
      "/facility-rentings/{id}",
      put(finance::update_facility_renting::<S, C>)
        .delete(finance::delete_facility_renting::<S, C>),
    )
    .route(
      "/special-contributions",
      get(finance::list_special_contributions::<S, C>)
        .post(finance::create_special_contribution::<S, C>),
    )
    .route(
      "/special-contributions/{id}",
      put(finance::update_special_contribution::<S, C>)
        .delete(finance::delete_special_contribution::<S, C>),
    )
    .route(
      "/special-contributions/{id}/funds",
      post(finance::create_donation_item_fund::<S, C>),
    )
    .route("/donation-item-funds", get(finance::list_donation_item_funds::<S, C>))
    .route(
      "/donation-item-funds/{id}",
      put(finance::update_donation_item_fund::<S, C>)
        .delete(finance::delete_donation_item_fund::<S, C>),
    )
    .route("/pledges", get(finance::list_pledges::<S, C>).post(finance::create_pledge::<S, C>))
    .route(
      "/pledges/{id}",
      put(finance::update_pledge::<S, C>).delete(finance::delete_pledge::<S, C>),
    )
    .route(
      "/expense-categories",
      get(finance::list_expense_categories::<S, C>)
        .post(finance::create_expense_category::<S, C>),
    )
    .route(
      "/expense-categories/{id}",
      put(finance::update_expense_category::<S, C>)
        .delete(finance::delete_expense_category::<S, C>),
    )
    .route(
      "/expense-categories/{id}/expenditures",
      post(finance::create_expenditure::<S, C>),
    )
    .route("/expenditures", get(finance::list_expenditures::<S, C>))
    .route(
      "/expenditures/{id}",
      put(finance::update_expenditure::<S, C>).delete(finance::delete_expenditure::<S, C>),
    )
    .route("/expenditures/{id}/receipt", put(finance::set_expenditure_receipt::<S, C>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S, C>)
        .post(notifications::dispatch::<S, C>)
        .delete(notifications::delete_by_title::<S, C>),
    )
    .route("/notifications/{id}", delete(notifications::delete_one::<S, C>))
    .route("/notifications/{id}/read", put(notifications::mark_read::<S, C>))
    .route("/sms", get(notifications::sent_sms::<S, C>))
    // Reports
    .route("/reports/general", get(reports::general::<S, C>))
    .route("/reports/summary", get(reports::summary::<S, C>))
    .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
