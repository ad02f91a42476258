//! The `ParishStore` trait.
//!
//! Implemented by storage backends (e.g. `mkwawa-store-sqlite`). The
//! [`Parish`](crate::parish::Parish) service and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! Every method is one atomic unit: multi-row effects (current-year flips,
//! marriages touching two members, cascades) either commit together or not at
//! all. Ledger invariants are re-checked inside the same transaction as the
//! write.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
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
};

/// Abstraction over a parish data store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ParishStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Years ─────────────────────────────────────────────────────────────

  /// Insert a year. A current year replaces the previous one; a non-current
  /// year is rejected while no year is current.
  fn create_year(
    &self,
    input: NewYear,
  ) -> impl Future<Output = Result<Year, Self::Error>> + Send + '_;

  fn list_years(&self) -> impl Future<Output = Result<Vec<Year>, Self::Error>> + Send + '_;

  /// Always read from storage; never cached.
  fn current_year(
    &self,
  ) -> impl Future<Output = Result<Option<Year>, Self::Error>> + Send + '_;

  /// Flag the year with value `year` current and clear every other flag.
  fn set_current_year(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Year, Self::Error>> + Send + '_;

  /// Fails with `CurrentYearLocked` for the current year and `Protected`
  /// while any ledger record is filed under it.
  fn delete_year(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Outstations and cells ─────────────────────────────────────────────

  fn create_outstation(
    &self,
    form: OutStationForm,
  ) -> impl Future<Output = Result<OutStation, Self::Error>> + Send + '_;

  fn update_outstation(
    &self,
    id: Uuid,
    form: OutStationForm,
  ) -> impl Future<Output = Result<OutStation, Self::Error>> + Send + '_;

  fn get_outstation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OutStation>, Self::Error>> + Send + '_;

  fn list_outstations(
    &self,
  ) -> impl Future<Output = Result<Vec<OutStation>, Self::Error>> + Send + '_;

  /// Cascades to the outstation's cells. Protected while offerings or
  /// evangelists reference it.
  fn delete_outstation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn create_cell(
    &self,
    form: CellForm,
  ) -> impl Future<Output = Result<Cell, Self::Error>> + Send + '_;

  fn update_cell(
    &self,
    id: Uuid,
    form: CellForm,
  ) -> impl Future<Output = Result<Cell, Self::Error>> + Send + '_;

  fn get_cell(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Cell>, Self::Error>> + Send + '_;

  fn list_cells(
    &self,
    outstation_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Cell>, Self::Error>> + Send + '_;

  /// Members of the cell keep their record with no cell.
  fn delete_cell(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Church location ───────────────────────────────────────────────────

  /// Deactivate every location and insert `input` as the active one.
  fn replace_church_location(
    &self,
    input: NewChurchLocation,
  ) -> impl Future<Output = Result<ChurchLocation, Self::Error>> + Send + '_;

  /// Insert an active location; `SingletonViolation` if one is already
  /// active.
  fn insert_church_location(
    &self,
    input: NewChurchLocation,
  ) -> impl Future<Output = Result<ChurchLocation, Self::Error>> + Send + '_;

  fn set_church_location_altitude(
    &self,
    id: Uuid,
    altitude: f64,
  ) -> impl Future<Output = Result<ChurchLocation, Self::Error>> + Send + '_;

  fn activate_church_location(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<ChurchLocation, Self::Error>> + Send + '_;

  fn active_church_location(
    &self,
  ) -> impl Future<Output = Result<Option<ChurchLocation>, Self::Error>> + Send + '_;

  fn list_church_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<ChurchLocation>, Self::Error>> + Send + '_;

  fn delete_church_location(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Members ───────────────────────────────────────────────────────────

  /// Insert a member with a freshly generated `member_id`.
  fn create_member(
    &self,
    form: MemberForm,
    status: MemberStatus,
  ) -> impl Future<Output = Result<ChurchMember, Self::Error>> + Send + '_;

  fn get_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ChurchMember>, Self::Error>> + Send + '_;

  fn find_member_by_member_id(
    &self,
    member_id: String,
  ) -> impl Future<Output = Result<Option<ChurchMember>, Self::Error>> + Send + '_;

  fn list_members(
    &self,
    query: MemberQuery,
  ) -> impl Future<Output = Result<Vec<ChurchMember>, Self::Error>> + Send + '_;

  /// Replace the editable fields. A member in a recorded marriage cannot
  /// change marriage state or date through this path.
  fn update_member(
    &self,
    id: Uuid,
    form: MemberForm,
  ) -> impl Future<Output = Result<ChurchMember, Self::Error>> + Send + '_;

  /// Returns the updated member and the status it had before.
  fn set_member_status(
    &self,
    id: Uuid,
    status: MemberStatus,
  ) -> impl Future<Output = Result<(ChurchMember, MemberStatus), Self::Error>> + Send + '_;

  /// Point an attachment at `path` and return the path it replaced.
  fn set_member_attachment(
    &self,
    id: Uuid,
    attachment: MemberAttachment,
    path: Option<String>,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Delete the member and everything that cascades from it. Returns the
  /// stored files the member referenced.
  fn delete_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Sacraments ────────────────────────────────────────────────────────

  /// Record a baptism, pointing the baptism certificate at `certificate`
  /// in the same transaction when one is given. Returns the member and the
  /// certificate path that was replaced.
  fn register_baptism(
    &self,
    member: Uuid,
    on: NaiveDate,
    certificate: Option<String>,
  ) -> impl Future<Output = Result<(ChurchMember, Option<String>), Self::Error>> + Send + '_;

  /// As [`register_baptism`](Self::register_baptism), for confirmation.
  fn register_confirmation(
    &self,
    member: Uuid,
    on: NaiveDate,
    certificate: Option<String>,
  ) -> impl Future<Output = Result<(ChurchMember, Option<String>), Self::Error>> + Send + '_;

  /// Record the marriage and mark both partners married in one
  /// transaction.
  fn register_marriage(
    &self,
    input: NewMarriage,
  ) -> impl Future<Output = Result<Marriage, Self::Error>> + Send + '_;

  fn update_marriage_date(
    &self,
    marriage: Uuid,
    on: NaiveDate,
  ) -> impl Future<Output = Result<Marriage, Self::Error>> + Send + '_;

  fn revoke_baptism(
    &self,
    member: Uuid,
  ) -> impl Future<Output = Result<Revocation, Self::Error>> + Send + '_;

  fn revoke_confirmation(
    &self,
    member: Uuid,
  ) -> impl Future<Output = Result<Revocation, Self::Error>> + Send + '_;

  fn revoke_marriage(
    &self,
    member: Uuid,
  ) -> impl Future<Output = Result<Revocation, Self::Error>> + Send + '_;

  fn get_marriage_for(
    &self,
    member: Uuid,
  ) -> impl Future<Output = Result<Option<MarriageParties>, Self::Error>> + Send + '_;

  fn list_marriages(
    &self,
  ) -> impl Future<Output = Result<Vec<MarriageParties>, Self::Error>> + Send + '_;

  // ── Leaders ───────────────────────────────────────────────────────────

  /// Create the member's leader record, or update it if one exists, and set
  /// the member's leader flag.
  fn upsert_leader(
    &self,
    form: LeaderForm,
  ) -> impl Future<Output = Result<Leader, Self::Error>> + Send + '_;

  fn get_leader(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LeaderView>, Self::Error>> + Send + '_;

  fn list_leaders(
    &self,
    query: LeaderQuery,
  ) -> impl Future<Output = Result<Vec<LeaderView>, Self::Error>> + Send + '_;

  fn save_time_in_service(
    &self,
    id: Uuid,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the leader record and clear the member's leader flag.
  fn delete_leader(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assets ────────────────────────────────────────────────────────────

  fn create_asset(
    &self,
    form: AssetForm,
  ) -> impl Future<Output = Result<ChurchAsset, Self::Error>> + Send + '_;

  fn update_asset(
    &self,
    id: Uuid,
    form: AssetForm,
  ) -> impl Future<Output = Result<ChurchAsset, Self::Error>> + Send + '_;

  fn get_asset(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ChurchAsset>, Self::Error>> + Send + '_;

  fn list_assets(
    &self,
    query: AssetQuery,
  ) -> impl Future<Output = Result<Vec<ChurchAsset>, Self::Error>> + Send + '_;

  /// Removes the asset, its media records and its facility rentings.
  fn delete_asset(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_asset_media(
    &self,
    asset: Uuid,
    image: String,
  ) -> impl Future<Output = Result<AssetMedia, Self::Error>> + Send + '_;

  fn get_asset_media(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AssetMedia>, Self::Error>> + Send + '_;

  fn list_asset_media(
    &self,
    asset: Uuid,
  ) -> impl Future<Output = Result<Vec<AssetMedia>, Self::Error>> + Send + '_;

  fn delete_asset_media(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Finance: offerings ────────────────────────────────────────────────

  fn create_offering_category(
    &self,
    form: CategoryForm,
  ) -> impl Future<Output = Result<OfferingCategory, Self::Error>> + Send + '_;

  fn update_offering_category(
    &self,
    id: Uuid,
    form: CategoryForm,
  ) -> impl Future<Output = Result<OfferingCategory, Self::Error>> + Send + '_;

  fn list_offering_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<OfferingCategory>, Self::Error>> + Send + '_;

  /// Cascades to the category's offerings.
  fn delete_offering_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn create_offering(
    &self,
    form: OfferingForm,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  fn update_offering(
    &self,
    id: Uuid,
    form: OfferingForm,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  fn list_offerings(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<Offering>, Self::Error>> + Send + '_;

  fn delete_offering(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Finance: facility rentings ────────────────────────────────────────

  /// Generates the receipt ID.
  fn create_facility_renting(
    &self,
    form: FacilityRentingForm,
  ) -> impl Future<Output = Result<FacilityRenting, Self::Error>> + Send + '_;

  fn update_facility_renting(
    &self,
    id: Uuid,
    form: FacilityRentingForm,
  ) -> impl Future<Output = Result<FacilityRenting, Self::Error>> + Send + '_;

  fn list_facility_rentings(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<FacilityRenting>, Self::Error>> + Send + '_;

  fn delete_facility_renting(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Finance: special contributions ────────────────────────────────────

  fn create_special_contribution(
    &self,
    form: SpecialContributionForm,
  ) -> impl Future<Output = Result<SpecialContribution, Self::Error>> + Send + '_;

  fn update_special_contribution(
    &self,
    id: Uuid,
    form: SpecialContributionForm,
  ) -> impl Future<Output = Result<SpecialContribution, Self::Error>> + Send + '_;

  fn list_special_contributions(
    &self,
  ) -> impl Future<Output = Result<Vec<SpecialContribution>, Self::Error>> + Send + '_;

  /// Cascades to the contribution's donation item funds.
  fn delete_special_contribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn create_donation_item_fund(
    &self,
    contribution: Uuid,
    form: DonationItemFundForm,
  ) -> impl Future<Output = Result<DonationItemFund, Self::Error>> + Send + '_;

  fn update_donation_item_fund(
    &self,
    id: Uuid,
    form: DonationItemFundForm,
  ) -> impl Future<Output = Result<DonationItemFund, Self::Error>> + Send + '_;

  fn list_donation_item_funds(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<DonationItemFund>, Self::Error>> + Send + '_;

  fn delete_donation_item_fund(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Finance: pledges ──────────────────────────────────────────────────

  fn create_pledge(
    &self,
    form: PledgeForm,
  ) -> impl Future<Output = Result<Pledge, Self::Error>> + Send + '_;

  fn update_pledge(
    &self,
    id: Uuid,
    form: PledgeForm,
  ) -> impl Future<Output = Result<Pledge, Self::Error>> + Send + '_;

  fn list_pledges(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<Pledge>, Self::Error>> + Send + '_;

  fn delete_pledge(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Finance: expenditures ─────────────────────────────────────────────

  fn create_expense_category(
    &self,
    form: CategoryForm,
  ) -> impl Future<Output = Result<ExpenseCategory, Self::Error>> + Send + '_;

  fn update_expense_category(
    &self,
    id: Uuid,
    form: CategoryForm,
  ) -> impl Future<Output = Result<ExpenseCategory, Self::Error>> + Send + '_;

  fn list_expense_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<ExpenseCategory>, Self::Error>> + Send + '_;

  /// Cascades to the category's expenditures.
  fn delete_expense_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn create_expenditure(
    &self,
    category: Uuid,
    form: ExpenditureForm,
  ) -> impl Future<Output = Result<Expenditure, Self::Error>> + Send + '_;

  fn update_expenditure(
    &self,
    id: Uuid,
    form: ExpenditureForm,
  ) -> impl Future<Output = Result<Expenditure, Self::Error>> + Send + '_;

  fn get_expenditure(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Expenditure>, Self::Error>> + Send + '_;

  fn list_expenditures(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<Expenditure>, Self::Error>> + Send + '_;

  /// Returns the receipt path the expenditure referenced.
  fn delete_expenditure(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Point the receipt at `path` and return the path it replaced.
  fn set_expenditure_receipt(
    &self,
    id: Uuid,
    path: Option<String>,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// One row per recipient; `NotFound` (and nothing written) if any
  /// recipient does not exist.
  fn create_notifications(
    &self,
    title: String,
    message: String,
    recipients: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<NotificationDelivery>, Self::Error>> + Send + '_;

  fn list_notifications(
    &self,
    query: NotificationQuery,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn delete_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns the number of rows removed.
  fn delete_notifications_by_title(
    &self,
    title: String,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn record_sent_sms(
    &self,
    input: NewSentSms,
  ) -> impl Future<Output = Result<SentSms, Self::Error>> + Send + '_;

  fn list_sent_sms(&self) -> impl Future<Output = Result<Vec<SentSms>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn report_inputs(
    &self,
    period: ReportPeriod,
  ) -> impl Future<Output = Result<ReportInputs, Self::Error>> + Send + '_;

  fn parish_summary(
    &self,
  ) -> impl Future<Output = Result<ParishSummary, Self::Error>> + Send + '_;
}
