//! Handlers for the finance ledger.
//!
//! Every money record is filed under a [`Year`](mkwawa_core::settings::Year);
//! omitting `year_id` files it under the current year, and creating a record
//! with no current year set fails with 422.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`/`POST` | `/offering-categories` | |
//! | `PUT`/`DELETE` | `/offering-categories/:id` | Delete removes its offerings |
//! | `GET`/`POST` | `/offerings` | `recorded_by` must be a leader |
//! | `PUT`/`DELETE` | `/offerings/:id` | |
//! | `GET`/`POST` | `/facility-rentings` | The receipt ID is generated |
//! | `PUT`/`DELETE` | `/facility-rentings/:id` | |
//! | `GET`/`POST` | `/special-contributions` | |
//! | `PUT`/`DELETE` | `/special-contributions/:id` | Delete removes its funds |
//! | `POST` | `/special-contributions/:id/funds` | |
//! | `GET` | `/donation-item-funds` | |
//! | `PUT`/`DELETE` | `/donation-item-funds/:id` | |
//! | `GET`/`POST` | `/pledges` | |
//! | `PUT`/`DELETE` | `/pledges/:id` | |
//! | `GET`/`POST` | `/expense-categories` | |
//! | `PUT`/`DELETE` | `/expense-categories/:id` | |
//! | `POST` | `/expense-categories/:id/expenditures` | |
//! | `GET` | `/expenditures` | |
//! | `PUT`/`DELETE` | `/expenditures/:id` | |
//! | `PUT` | `/expenditures/:id/receipt` | Multipart, file field `receipt` |
//!
//! Ledger listings accept `year`, `month`, `category_id`, `outstation_id`,
//! `member_id` and `asset_id`; filters that do not apply to a ledger are
//! ignored.

use axum::{
  Json,
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mkwawa_core::{
  auth::Capability,
  collab::Collaborators,
  finance::{
    CategoryForm, DonationItemFund, DonationItemFundForm, ExpenseCategory,
    Expenditure, ExpenditureForm, FacilityRenting, FacilityRentingForm,
    LedgerQuery, Offering, OfferingCategory, OfferingForm, Pledge, PledgeForm,
    SpecialContribution, SpecialContributionForm,
  },
  store::ParishStore,
};
use uuid::Uuid;

use super::MultipartForm;
use crate::{AppState, auth::Caller, error::ApiError};

// ─── Offerings ─────────────────────────────────────────────────────────────

/// `GET /offering-categories`
pub async fn list_offering_categories<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<OfferingCategory>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_offering_categories().await?))
}

/// `POST /offering-categories`
pub async fn create_offering_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<CategoryForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let category = state.parish.create_offering_category(body).await?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /offering-categories/:id`
pub async fn update_offering_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<CategoryForm>,
) -> Result<Json<OfferingCategory>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_offering_category(id, body).await?))
}

/// `DELETE /offering-categories/:id`
pub async fn delete_offering_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_offering_category(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /offerings[?<filters>]`
pub async fn list_offerings<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<Offering>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_offerings(query).await?))
}

/// `POST /offerings`
pub async fn create_offering<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<OfferingForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let offering = state.parish.create_offering(body).await?;
  Ok((StatusCode::CREATED, Json(offering)))
}

/// `PUT /offerings/:id`
pub async fn update_offering<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<OfferingForm>,
) -> Result<Json<Offering>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_offering(id, body).await?))
}

/// `DELETE /offerings/:id`
pub async fn delete_offering<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_offering(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Facility rentings ─────────────────────────────────────────────────────

/// `GET /facility-rentings[?<filters>]`
pub async fn list_facility_rentings<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<FacilityRenting>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_facility_rentings(query).await?))
}

/// `POST /facility-rentings`
pub async fn create_facility_renting<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<FacilityRentingForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let renting = state.parish.create_facility_renting(body).await?;
  Ok((StatusCode::CREATED, Json(renting)))
}

/// `PUT /facility-rentings/:id`
pub async fn update_facility_renting<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<FacilityRentingForm>,
) -> Result<Json<FacilityRenting>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_facility_renting(id, body).await?))
}

/// `DELETE /facility-rentings/:id`
pub async fn delete_facility_renting<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_facility_renting(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Special contributions ─────────────────────────────────────────────────

/// `GET /special-contributions`
pub async fn list_special_contributions<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<SpecialContribution>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_special_contributions().await?))
}

/// `POST /special-contributions`
pub async fn create_special_contribution<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<SpecialContributionForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let contribution = state.parish.create_special_contribution(body).await?;
  Ok((StatusCode::CREATED, Json(contribution)))
}

/// `PUT /special-contributions/:id`
pub async fn update_special_contribution<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<SpecialContributionForm>,
) -> Result<Json<SpecialContribution>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_special_contribution(id, body).await?))
}

/// `DELETE /special-contributions/:id`
pub async fn delete_special_contribution<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_special_contribution(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /special-contributions/:id/funds`
pub async fn create_donation_item_fund<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(parent): Path<Uuid>,
  Json(body): Json<DonationItemFundForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let fund = state.parish.create_donation_item_fund(parent, body).await?;
  Ok((StatusCode::CREATED, Json(fund)))
}

/// `GET /donation-item-funds[?<filters>]`
pub async fn list_donation_item_funds<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<DonationItemFund>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_donation_item_funds(query).await?))
}

/// `PUT /donation-item-funds/:id`
pub async fn update_donation_item_fund<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<DonationItemFundForm>,
) -> Result<Json<DonationItemFund>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_donation_item_fund(id, body).await?))
}

/// `DELETE /donation-item-funds/:id`
pub async fn delete_donation_item_fund<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_donation_item_fund(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Pledges ───────────────────────────────────────────────────────────────

/// `GET /pledges[?<filters>]`
pub async fn list_pledges<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<Pledge>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_pledges(query).await?))
}

/// `POST /pledges`
pub async fn create_pledge<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<PledgeForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let pledge = state.parish.create_pledge(body).await?;
  Ok((StatusCode::CREATED, Json(pledge)))
}

/// `PUT /pledges/:id`
pub async fn update_pledge<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<PledgeForm>,
) -> Result<Json<Pledge>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_pledge(id, body).await?))
}

/// `DELETE /pledges/:id`
pub async fn delete_pledge<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_pledge(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Expenditures ──────────────────────────────────────────────────────────

/// `GET /expense-categories`
pub async fn list_expense_categories<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
) -> Result<Json<Vec<ExpenseCategory>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_expense_categories().await?))
}

/// `POST /expense-categories`
pub async fn create_expense_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Json(body): Json<CategoryForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let category = state.parish.create_expense_category(body).await?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /expense-categories/:id`
pub async fn update_expense_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<CategoryForm>,
) -> Result<Json<ExpenseCategory>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_expense_category(id, body).await?))
}

/// `DELETE /expense-categories/:id`
pub async fn delete_expense_category<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_expense_category(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /expense-categories/:id/expenditures`
pub async fn create_expenditure<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(parent): Path<Uuid>,
  Json(body): Json<ExpenditureForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let expenditure = state.parish.create_expenditure(parent, body).await?;
  Ok((StatusCode::CREATED, Json(expenditure)))
}

/// `GET /expenditures[?<filters>]`
pub async fn list_expenditures<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<Expenditure>>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ViewFinance)?;
  Ok(Json(state.parish.list_expenditures(query).await?))
}

/// `PUT /expenditures/:id`
pub async fn update_expenditure<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ExpenditureForm>,
) -> Result<Json<Expenditure>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  Ok(Json(state.parish.update_expenditure(id, body).await?))
}

/// `DELETE /expenditures/:id`
pub async fn delete_expenditure<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  state.parish.delete_expenditure(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /expenditures/:id/receipt`: replaces and removes any previous receipt.
pub async fn set_expenditure_receipt<S, C>(
  State(state): State<AppState<S, C>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<Expenditure>, ApiError>
where
  S: ParishStore + 'static,
  C: Collaborators,
{
  caller.require(Capability::ManageFinance)?;
  let upload = MultipartForm::read(multipart).await?.file("receipt")?;
  Ok(Json(state.parish.set_expenditure_receipt(id, upload).await?))
}
