//! [`SqliteStore`], the SQLite implementation of [`ParishStore`].
//!
//! Every trait method ships one synchronous function to the connection
//! thread with [`SqliteStore::run`]. Writes open a `rusqlite` transaction
//! there, so the invariant checks and the rows they guard commit together.

mod assets;
mod finance;
mod leaders;
mod members;
mod notifications;
mod reports;
mod sacraments;
mod settings;

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension as _, types::Value};
use uuid::Uuid;

use mkwawa_core::{
  asset::{AssetForm, AssetMedia, AssetQuery, ChurchAsset},
  finance::{
    CategoryForm, DonationItemFund, DonationItemFundForm, ExpenseCategory,
    Expenditure, ExpenditureForm, FacilityRenting, FacilityRentingForm,
    LedgerQuery, Offering, OfferingCategory, OfferingForm, Pledge, PledgeForm,
    SpecialContribution, SpecialContributionForm,
  },
  leader::{Leader, LeaderForm, LeaderQuery, LeaderView},
  member::{ChurchMember, MemberAttachment, MemberForm, MemberQuery, MemberStatus},
  notification::{
    NewSentSms, Notification, NotificationDelivery, NotificationQuery, SentSms,
  },
  report::{ParishSummary, ReportInputs, ReportPeriod},
  sacrament::{Marriage, MarriageParties, NewMarriage, Revocation},
  settings::{
    Cell, CellForm, ChurchLocation, NewChurchLocation, NewYear, OutStation,
    OutStationForm, Year,
  },
  store::ParishStore,
};

use crate::{Error, Result, encode::encode_uuid, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A parish store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        Ok(version)
      })
      .await
      .map(|version| tracing::debug!(version, "schema ready"))?;
    Ok(())
  }

  /// Run `f` on the connection thread.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL, for tests that need rows the public API cannot produce.
  pub(crate) async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self.run(move |c| Ok(c.execute_batch(&sql)?)).await
  }
}

// ─── Shared SQL helpers ──────────────────────────────────────────────────────

/// Whether `table` has a row with primary key `id`.
pub(crate) fn exists(conn: &Connection, table: &str, id: Uuid) -> Result<bool> {
  let found = conn
    .query_row(
      &format!("SELECT 1 FROM {table} WHERE id = ?1"),
      rusqlite::params![encode_uuid(id)],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

/// `NotFound` unless `table` has a row with primary key `id`.
pub(crate) fn require(conn: &Connection, table: &str, entity: &'static str, id: Uuid) -> Result<()> {
  if exists(conn, table, id)? {
    Ok(())
  } else {
    Err(mkwawa_core::Error::not_found(entity, id).into())
  }
}

/// Whether any row of `table` has `column = value`.
pub(crate) fn any_with(conn: &Connection, table: &str, column: &str, value: &str) -> Result<bool> {
  let found = conn
    .query_row(
      &format!("SELECT 1 FROM {table} WHERE {column} = ?1 LIMIT 1"),
      rusqlite::params![value],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

/// `NotFound` when an `UPDATE`/`DELETE` touched no row.
pub(crate) fn touched(changed: usize, entity: &'static str, id: Uuid) -> Result<()> {
  if changed == 0 {
    Err(mkwawa_core::Error::not_found(entity, id).into())
  } else {
    Ok(())
  }
}

/// `WHERE` clauses collected from optional query fields.
#[derive(Default)]
pub(crate) struct Filters {
  clauses: Vec<String>,
  args:    Vec<Value>,
}

impl Filters {
  /// Add `clause`, whose placeholders are written as `?`, bound to `args`.
  pub fn push(&mut self, clause: impl Into<String>, args: impl IntoIterator<Item = Value>) {
    self.clauses.push(clause.into());
    self.args.extend(args);
  }

  pub fn eq(&mut self, column: &str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
      self.push(format!("{column} = ?"), [v.into()]);
    }
  }

  pub fn uuid(&mut self, column: &str, value: Option<Uuid>) {
    self.eq(column, value.map(encode_uuid));
  }

  /// Match an enum column against the label the enum displays as.
  pub fn label(&mut self, column: &str, value: Option<impl ToString>) {
    self.eq(column, value.map(|v| v.to_string()));
  }

  pub fn where_sql(&self) -> String {
    if self.clauses.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", self.clauses.join(" AND "))
    }
  }

  pub fn args(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
    rusqlite::params_from_iter(self.args.iter())
  }
}

// ─── ParishStore impl ────────────────────────────────────────────────────────

impl ParishStore for SqliteStore {
  type Error = Error;

  // ── Years ─────────────────────────────────────────────────────────────

  async fn create_year(&self, input: NewYear) -> Result<Year> {
    self.run(move |c| settings::create_year(c, input)).await
  }

  async fn list_years(&self) -> Result<Vec<Year>> { self.run(settings::list_years).await }

  async fn current_year(&self) -> Result<Option<Year>> {
    self.run(|c| settings::current_year(c)).await
  }

  async fn set_current_year(&self, year: i32) -> Result<Year> {
    self.run(move |c| settings::set_current_year(c, year)).await
  }

  async fn delete_year(&self, id: Uuid) -> Result<()> {
    self.run(move |c| settings::delete_year(c, id)).await
  }

  // ── Outstations and cells ─────────────────────────────────────────────

  async fn create_outstation(&self, form: OutStationForm) -> Result<OutStation> {
    self.run(move |c| settings::create_outstation(c, form)).await
  }

  async fn update_outstation(&self, id: Uuid, form: OutStationForm) -> Result<OutStation> {
    self.run(move |c| settings::update_outstation(c, id, form)).await
  }

  async fn get_outstation(&self, id: Uuid) -> Result<Option<OutStation>> {
    self.run(move |c| settings::get_outstation(c, id)).await
  }

  async fn list_outstations(&self) -> Result<Vec<OutStation>> {
    self.run(settings::list_outstations).await
  }

  async fn delete_outstation(&self, id: Uuid) -> Result<()> {
    self.run(move |c| settings::delete_outstation(c, id)).await
  }

  async fn create_cell(&self, form: CellForm) -> Result<Cell> {
    self.run(move |c| settings::create_cell(c, form)).await
  }

  async fn update_cell(&self, id: Uuid, form: CellForm) -> Result<Cell> {
    self.run(move |c| settings::update_cell(c, id, form)).await
  }

  async fn get_cell(&self, id: Uuid) -> Result<Option<Cell>> {
    self.run(move |c| settings::get_cell(c, id)).await
  }

  async fn list_cells(&self, outstation_id: Option<Uuid>) -> Result<Vec<Cell>> {
    self.run(move |c| settings::list_cells(c, outstation_id)).await
  }

  async fn delete_cell(&self, id: Uuid) -> Result<()> {
    self.run(move |c| settings::delete_cell(c, id)).await
  }

  // ── Church location ───────────────────────────────────────────────────

  async fn replace_church_location(&self, input: NewChurchLocation) -> Result<ChurchLocation> {
    self.run(move |c| settings::replace_church_location(c, input)).await
  }

  async fn insert_church_location(&self, input: NewChurchLocation) -> Result<ChurchLocation> {
    self.run(move |c| settings::insert_church_location(c, input)).await
  }

  async fn set_church_location_altitude(&self, id: Uuid, altitude: f64) -> Result<ChurchLocation> {
    self.run(move |c| settings::set_church_location_altitude(c, id, altitude)).await
  }

  async fn activate_church_location(&self, id: Uuid) -> Result<ChurchLocation> {
    self.run(move |c| settings::activate_church_location(c, id)).await
  }

  async fn active_church_location(&self) -> Result<Option<ChurchLocation>> {
    self.run(|c| settings::active_church_location(c)).await
  }

  async fn list_church_locations(&self) -> Result<Vec<ChurchLocation>> {
    self.run(settings::list_church_locations).await
  }

  async fn delete_church_location(&self, id: Uuid) -> Result<()> {
    self.run(move |c| settings::delete_church_location(c, id)).await
  }

  // ── Members ───────────────────────────────────────────────────────────

  async fn create_member(&self, form: MemberForm, status: MemberStatus) -> Result<ChurchMember> {
    self.run(move |c| members::create_member(c, form, status)).await
  }

  async fn get_member(&self, id: Uuid) -> Result<Option<ChurchMember>> {
    self.run(move |c| members::get_member(c, id)).await
  }

  async fn find_member_by_member_id(&self, member_id: String) -> Result<Option<ChurchMember>> {
    self.run(move |c| members::find_member_by_member_id(c, &member_id)).await
  }

  async fn list_members(&self, query: MemberQuery) -> Result<Vec<ChurchMember>> {
    self.run(move |c| members::list_members(c, query)).await
  }

  async fn update_member(&self, id: Uuid, form: MemberForm) -> Result<ChurchMember> {
    self.run(move |c| members::update_member(c, id, form)).await
  }

  async fn set_member_status(
    &self,
    id: Uuid,
    status: MemberStatus,
  ) -> Result<(ChurchMember, MemberStatus)> {
    self.run(move |c| members::set_member_status(c, id, status)).await
  }

  async fn set_member_attachment(
    &self,
    id: Uuid,
    attachment: MemberAttachment,
    path: Option<String>,
  ) -> Result<Option<String>> {
    self.run(move |c| members::set_member_attachment(c, id, attachment, path)).await
  }

  async fn delete_member(&self, id: Uuid) -> Result<Vec<String>> {
    self.run(move |c| members::delete_member(c, id)).await
  }

  // ── Sacraments ────────────────────────────────────────────────────────

  async fn register_baptism(
    &self,
    member: Uuid,
    on: NaiveDate,
    certificate: Option<String>,
  ) -> Result<(ChurchMember, Option<String>)> {
    self.run(move |c| sacraments::register_baptism(c, member, on, certificate)).await
  }

  async fn register_confirmation(
    &self,
    member: Uuid,
    on: NaiveDate,
    certificate: Option<String>,
  ) -> Result<(ChurchMember, Option<String>)> {
    self.run(move |c| sacraments::register_confirmation(c, member, on, certificate)).await
  }

  async fn register_marriage(&self, input: NewMarriage) -> Result<Marriage> {
    self.run(move |c| sacraments::register_marriage(c, input)).await
  }

  async fn update_marriage_date(&self, marriage: Uuid, on: NaiveDate) -> Result<Marriage> {
    self.run(move |c| sacraments::update_marriage_date(c, marriage, on)).await
  }

  async fn revoke_baptism(&self, member: Uuid) -> Result<Revocation> {
    self.run(move |c| sacraments::revoke_baptism(c, member)).await
  }

  async fn revoke_confirmation(&self, member: Uuid) -> Result<Revocation> {
    self.run(move |c| sacraments::revoke_confirmation(c, member)).await
  }

  async fn revoke_marriage(&self, member: Uuid) -> Result<Revocation> {
    self.run(move |c| sacraments::revoke_marriage(c, member)).await
  }

  async fn get_marriage_for(&self, member: Uuid) -> Result<Option<MarriageParties>> {
    self.run(move |c| sacraments::get_marriage_for(c, member)).await
  }

  async fn list_marriages(&self) -> Result<Vec<MarriageParties>> {
    self.run(sacraments::list_marriages).await
  }

  // ── Leaders ───────────────────────────────────────────────────────────

  async fn upsert_leader(&self, form: LeaderForm) -> Result<Leader> {
    self.run(move |c| leaders::upsert_leader(c, form)).await
  }

  async fn get_leader(&self, id: Uuid) -> Result<Option<LeaderView>> {
    self.run(move |c| leaders::get_leader(c, id)).await
  }

  async fn list_leaders(&self, query: LeaderQuery) -> Result<Vec<LeaderView>> {
    self.run(move |c| leaders::list_leaders(c, query)).await
  }

  async fn save_time_in_service(&self, id: Uuid, value: String) -> Result<()> {
    self.run(move |c| leaders::save_time_in_service(c, id, &value)).await
  }

  async fn delete_leader(&self, id: Uuid) -> Result<()> {
    self.run(move |c| leaders::delete_leader(c, id)).await
  }

  // ── Assets ────────────────────────────────────────────────────────────

  async fn create_asset(&self, form: AssetForm) -> Result<ChurchAsset> {
    self.run(move |c| assets::create_asset(c, form)).await
  }

  async fn update_asset(&self, id: Uuid, form: AssetForm) -> Result<ChurchAsset> {
    self.run(move |c| assets::update_asset(c, id, form)).await
  }

  async fn get_asset(&self, id: Uuid) -> Result<Option<ChurchAsset>> {
    self.run(move |c| assets::get_asset(c, id)).await
  }

  async fn list_assets(&self, query: AssetQuery) -> Result<Vec<ChurchAsset>> {
    self.run(move |c| assets::list_assets(c, query)).await
  }

  async fn delete_asset(&self, id: Uuid) -> Result<()> {
    self.run(move |c| assets::delete_asset(c, id)).await
  }

  async fn add_asset_media(&self, asset: Uuid, image: String) -> Result<AssetMedia> {
    self.run(move |c| assets::add_asset_media(c, asset, image)).await
  }

  async fn get_asset_media(&self, id: Uuid) -> Result<Option<AssetMedia>> {
    self.run(move |c| assets::get_asset_media(c, id)).await
  }

  async fn list_asset_media(&self, asset: Uuid) -> Result<Vec<AssetMedia>> {
    self.run(move |c| assets::list_asset_media(c, asset)).await
  }

  async fn delete_asset_media(&self, id: Uuid) -> Result<()> {
    self.run(move |c| assets::delete_asset_media(c, id)).await
  }

  // ── Finance: offerings ────────────────────────────────────────────────

  async fn create_offering_category(&self, form: CategoryForm) -> Result<OfferingCategory> {
    self.run(move |c| finance::create_offering_category(c, form)).await
  }

  async fn update_offering_category(
    &self,
    id: Uuid,
    form: CategoryForm,
  ) -> Result<OfferingCategory> {
    self.run(move |c| finance::update_offering_category(c, id, form)).await
  }

  async fn list_offering_categories(&self) -> Result<Vec<OfferingCategory>> {
    self.run(finance::list_offering_categories).await
  }

  async fn delete_offering_category(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_offering_category(c, id)).await
  }

  async fn create_offering(&self, form: OfferingForm) -> Result<Offering> {
    self.run(move |c| finance::create_offering(c, form)).await
  }

  async fn update_offering(&self, id: Uuid, form: OfferingForm) -> Result<Offering> {
    self.run(move |c| finance::update_offering(c, id, form)).await
  }

  async fn list_offerings(&self, query: LedgerQuery) -> Result<Vec<Offering>> {
    self.run(move |c| finance::list_offerings(c, query)).await
  }

  async fn delete_offering(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_offering(c, id)).await
  }

  // ── Finance: facility rentings ────────────────────────────────────────

  async fn create_facility_renting(&self, form: FacilityRentingForm) -> Result<FacilityRenting> {
    self.run(move |c| finance::create_facility_renting(c, form)).await
  }

  async fn update_facility_renting(
    &self,
    id: Uuid,
    form: FacilityRentingForm,
  ) -> Result<FacilityRenting> {
    self.run(move |c| finance::update_facility_renting(c, id, form)).await
  }

  async fn list_facility_rentings(&self, query: LedgerQuery) -> Result<Vec<FacilityRenting>> {
    self.run(move |c| finance::list_facility_rentings(c, query)).await
  }

  async fn delete_facility_renting(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_facility_renting(c, id)).await
  }

  // ── Finance: special contributions ────────────────────────────────────

  async fn create_special_contribution(
    &self,
    form: SpecialContributionForm,
  ) -> Result<SpecialContribution> {
    self.run(move |c| finance::create_special_contribution(c, form)).await
  }

  async fn update_special_contribution(
    &self,
    id: Uuid,
    form: SpecialContributionForm,
  ) -> Result<SpecialContribution> {
    self.run(move |c| finance::update_special_contribution(c, id, form)).await
  }

  async fn list_special_contributions(&self) -> Result<Vec<SpecialContribution>> {
    self.run(finance::list_special_contributions).await
  }

  async fn delete_special_contribution(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_special_contribution(c, id)).await
  }

  async fn create_donation_item_fund(
    &self,
    contribution: Uuid,
    form: DonationItemFundForm,
  ) -> Result<DonationItemFund> {
    self.run(move |c| finance::create_donation_item_fund(c, contribution, form)).await
  }

  async fn update_donation_item_fund(
    &self,
    id: Uuid,
    form: DonationItemFundForm,
  ) -> Result<DonationItemFund> {
    self.run(move |c| finance::update_donation_item_fund(c, id, form)).await
  }

  async fn list_donation_item_funds(&self, query: LedgerQuery) -> Result<Vec<DonationItemFund>> {
    self.run(move |c| finance::list_donation_item_funds(c, query)).await
  }

  async fn delete_donation_item_fund(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_donation_item_fund(c, id)).await
  }

  // ── Finance: pledges ──────────────────────────────────────────────────

  async fn create_pledge(&self, form: PledgeForm) -> Result<Pledge> {
    self.run(move |c| finance::create_pledge(c, form)).await
  }

  async fn update_pledge(&self, id: Uuid, form: PledgeForm) -> Result<Pledge> {
    self.run(move |c| finance::update_pledge(c, id, form)).await
  }

  async fn list_pledges(&self, query: LedgerQuery) -> Result<Vec<Pledge>> {
    self.run(move |c| finance::list_pledges(c, query)).await
  }

  async fn delete_pledge(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_pledge(c, id)).await
  }

  // ── Finance: expenditures ─────────────────────────────────────────────

  async fn create_expense_category(&self, form: CategoryForm) -> Result<ExpenseCategory> {
    self.run(move |c| finance::create_expense_category(c, form)).await
  }

  async fn update_expense_category(&self, id: Uuid, form: CategoryForm) -> Result<ExpenseCategory> {
    self.run(move |c| finance::update_expense_category(c, id, form)).await
  }

  async fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>> {
    self.run(finance::list_expense_categories).await
  }

  async fn delete_expense_category(&self, id: Uuid) -> Result<()> {
    self.run(move |c| finance::delete_expense_category(c, id)).await
  }

  async fn create_expenditure(&self, category: Uuid, form: ExpenditureForm) -> Result<Expenditure> {
    self.run(move |c| finance::create_expenditure(c, category, form)).await
  }

  async fn update_expenditure(&self, id: Uuid, form: ExpenditureForm) -> Result<Expenditure> {
    self.run(move |c| finance::update_expenditure(c, id, form)).await
  }

  async fn get_expenditure(&self, id: Uuid) -> Result<Option<Expenditure>> {
    self.run(move |c| finance::get_expenditure(c, id)).await
  }

  async fn list_expenditures(&self, query: LedgerQuery) -> Result<Vec<Expenditure>> {
    self.run(move |c| finance::list_expenditures(c, query)).await
  }

  async fn delete_expenditure(&self, id: Uuid) -> Result<Option<String>> {
    self.run(move |c| finance::delete_expenditure(c, id)).await
  }

  async fn set_expenditure_receipt(&self, id: Uuid, path: Option<String>) -> Result<Option<String>> {
    self.run(move |c| finance::set_expenditure_receipt(c, id, path)).await
  }

  // ── Notifications ─────────────────────────────────────────────────────

  async fn create_notifications(
    &self,
    title: String,
    message: String,
    recipients: Vec<Uuid>,
  ) -> Result<Vec<NotificationDelivery>> {
    self
      .run(move |c| notifications::create_notifications(c, &title, &message, &recipients))
      .await
  }

  async fn list_notifications(&self, query: NotificationQuery) -> Result<Vec<Notification>> {
    self.run(move |c| notifications::list_notifications(c, query)).await
  }

  async fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
    self.run(move |c| notifications::mark_notification_read(c, id)).await
  }

  async fn delete_notification(&self, id: Uuid) -> Result<()> {
    self.run(move |c| notifications::delete_notification(c, id)).await
  }

  async fn delete_notifications_by_title(&self, title: String) -> Result<usize> {
    self.run(move |c| notifications::delete_notifications_by_title(c, &title)).await
  }

  async fn record_sent_sms(&self, input: NewSentSms) -> Result<SentSms> {
    self.run(move |c| notifications::record_sent_sms(c, input)).await
  }

  async fn list_sent_sms(&self) -> Result<Vec<SentSms>> {
    self.run(notifications::list_sent_sms).await
  }

  // ── Reports ───────────────────────────────────────────────────────────

  async fn report_inputs(&self, period: ReportPeriod) -> Result<ReportInputs> {
    self.run(move |c| reports::report_inputs(c, period)).await
  }

  async fn parish_summary(&self) -> Result<ParishSummary> {
    self.run(reports::parish_summary).await
  }
}
