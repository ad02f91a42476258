//! The `Parish` service: every operation of the parish data model,
//! implemented once over a [`ParishStore`] and a set of [`Collaborators`].
//!
//! The store owns atomicity and the cross-row invariants. This layer adds
//! form validation, defaults that depend on the clock, file uploads and the
//! side effects that must never abort a write (SMS, elevation lookups,
//! removing stale files).

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  asset::{self, AssetForm, AssetMedia, AssetQuery, ChurchAsset},
  collab::{Collaborators, ElevationService, FileStorage, SmsError, SmsGateway, Upload},
  finance::{
    self, CategoryForm, DonationItemFund, DonationItemFundForm, ExpenseCategory,
    Expenditure, ExpenditureForm, FacilityRenting, FacilityRentingForm,
    LedgerQuery, Month, Offering, OfferingCategory, OfferingForm, Pledge,
    PledgeForm, SpecialContribution, SpecialContributionForm,
  },
  humanize,
  leader::{LeaderForm, LeaderQuery, LeaderView},
  member::{
    self, ChurchMember, MemberAttachment, MemberForm, MemberProfile, MemberQuery,
    MemberStatus,
  },
  notification::{
    self, Dispatch, DispatchReport, NewSentSms, Notification, NotificationQuery,
    SentSms, SmsStatus,
  },
  report::{GeneralReport, ParishSummary, ReportPeriod},
  sacrament::{
    self, Marriage, MarriageEntry, MarriageParties, NewMarriage, Revocation, Sacrament,
  },
  settings::{
    self, Cell, CellForm, ChurchLocation, NewChurchLocation, NewYear, OutStation,
    OutStationForm, Year,
  },
  store::ParishStore,
  validate,
};

/// Convert a backend error into [`Error`].
trait ErrInto<T> {
  fn err_into(self) -> Result<T>;
}

impl<T, E: Into<Error>> ErrInto<T> for std::result::Result<T, E> {
  fn err_into(self) -> Result<T> { self.map_err(Into::into) }
}

pub struct Parish<S, C> {
  store:               S,
  collab:              C,
  account_request_url: String,
}

impl<S: ParishStore, C: Collaborators> Parish<S, C> {
  pub fn new(store: S, collab: C) -> Self {
    Self {
      store,
      collab,
      account_request_url: notification::DEFAULT_ACCOUNT_REQUEST_URL.to_owned(),
    }
  }

  /// Address quoted in the approval SMS.
  pub fn with_account_request_url(mut self, url: impl Into<String>) -> Self {
    self.account_request_url = url.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn collaborators(&self) -> &C { &self.collab }

  // ─── Shared helpers ────────────────────────────────────────────────────

  fn today() -> NaiveDate { Utc::now().date_naive() }

  /// Store `upload` under `dir` and return the final path.
  async fn put_file(&self, dir: &str, upload: Upload) -> Result<String> {
    let name = validate::file_name(&upload.file_name)?;
    let path = validate::upload_path(dir, &name);
    Ok(self.collab.files().put(&path, upload.bytes).await?)
  }

  /// Remove a file that is no longer referenced. Failures are logged.
  async fn discard_file(&self, path: &str) {
    if let Err(e) = self.collab.files().delete(path).await {
      warn!(path, error = %e, "could not remove stored file");
    }
  }

  /// Send one SMS and log the outcome. Never fails.
  async fn text(&self, recipient: Option<Uuid>, phone: &str, message: String) -> bool {
    let (status, request_id, sent) = match self.collab.sms().send(phone, &message).await {
      Ok(receipt) => (SmsStatus::from_gateway(&receipt.status), receipt.request_id, true),
      Err(SmsError::NotConfigured) => {
        warn!(phone, "sms gateway not configured; message skipped");
        return false;
      }
      Err(e) => {
        warn!(phone, error = %e, "sms send failed");
        (SmsStatus::Error, String::new(), false)
      }
    };
    let logged = self
      .store
      .record_sent_sms(NewSentSms {
        recipient_id: recipient,
        phone_number: phone.to_owned(),
        message,
        request_id,
        status,
      })
      .await;
    if let Err(e) = logged {
      warn!(phone, error = %e, "could not record sent sms");
    }
    sent
  }

  // ─── Configuration registry ────────────────────────────────────────────

  pub async fn create_year(&self, input: NewYear) -> Result<Year> {
    validate::year_in_range(input.year)?;
    if input.is_current {
      settings::check_current_year(input.year, Self::today().year())?;
    }
    let year = self.store.create_year(input).await.err_into()?;
    info!(year = year.year, current = year.is_current, "year created");
    Ok(year)
  }

  pub async fn list_years(&self) -> Result<Vec<Year>> {
    self.store.list_years().await.err_into()
  }

  pub async fn current_year(&self) -> Result<Year> {
    self
      .store
      .current_year()
      .await
      .err_into()?
      .ok_or(Error::CurrentYearMissing)
  }

  pub async fn set_current_year(&self, year: i32) -> Result<Year> {
    settings::check_current_year(year, Self::today().year())?;
    let year = self.store.set_current_year(year).await.err_into()?;
    info!(year = year.year, "current year changed");
    Ok(year)
  }

  pub async fn delete_year(&self, id: Uuid) -> Result<()> {
    self.store.delete_year(id).await.err_into()
  }

  pub async fn create_outstation(&self, form: OutStationForm) -> Result<OutStation> {
    form.validate()?;
    self.store.create_outstation(form).await.err_into()
  }

  pub async fn update_outstation(&self, id: Uuid, form: OutStationForm) -> Result<OutStation> {
    form.validate()?;
    self.store.update_outstation(id, form).await.err_into()
  }

  pub async fn get_outstation(&self, id: Uuid) -> Result<OutStation> {
    self
      .store
      .get_outstation(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("outstation", id))
  }

  pub async fn list_outstations(&self) -> Result<Vec<OutStation>> {
    self.store.list_outstations().await.err_into()
  }

  pub async fn delete_outstation(&self, id: Uuid) -> Result<()> {
    self.store.delete_outstation(id).await.err_into()
  }

  pub async fn create_cell(&self, form: CellForm) -> Result<Cell> {
    form.validate()?;
    self.store.create_cell(form).await.err_into()
  }

  pub async fn update_cell(&self, id: Uuid, form: CellForm) -> Result<Cell> {
    form.validate()?;
    self.store.update_cell(id, form).await.err_into()
  }

  pub async fn get_cell(&self, id: Uuid) -> Result<Cell> {
    self
      .store
      .get_cell(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("cell", id))
  }

  pub async fn list_cells(&self, outstation_id: Option<Uuid>) -> Result<Vec<Cell>> {
    self.store.list_cells(outstation_id).await.err_into()
  }

  pub async fn delete_cell(&self, id: Uuid) -> Result<()> {
    self.store.delete_cell(id).await.err_into()
  }

  /// Save a new active church location, deactivating the previous one. The
  /// record is saved immediately; when the altitude is missing the caller
  /// resolves it afterwards with [`Self::resolve_altitude`].
  pub async fn set_church_location(&self, input: NewChurchLocation) -> Result<ChurchLocation> {
    input.validate()?;
    let location = self.store.replace_church_location(input).await.err_into()?;
    info!(id = %location.id, "church location set");
    Ok(location)
  }

  pub async fn insert_church_location(&self, input: NewChurchLocation) -> Result<ChurchLocation> {
    input.validate()?;
    self.store.insert_church_location(input).await.err_into()
  }

  /// Look up and store the altitude of `location`. A failed lookup is logged
  /// and leaves the altitude empty.
  pub async fn resolve_altitude(&self, location: &ChurchLocation) -> Result<Option<ChurchLocation>> {
    if location.altitude.is_some() {
      return Ok(None);
    }
    match self
      .collab
      .elevation()
      .lookup(location.latitude, location.longitude)
      .await
    {
      Ok(altitude) => {
        let updated = self
          .store
          .set_church_location_altitude(location.id, altitude)
          .await
          .err_into()?;
        info!(id = %location.id, altitude, "church altitude resolved");
        Ok(Some(updated))
      }
      Err(e) => {
        warn!(id = %location.id, error = %e, "elevation lookup failed; altitude left empty");
        Ok(None)
      }
    }
  }

  pub async fn activate_church_location(&self, id: Uuid) -> Result<ChurchLocation> {
    self.store.activate_church_location(id).await.err_into()
  }

  pub async fn active_church_location(&self) -> Result<Option<ChurchLocation>> {
    self.store.active_church_location().await.err_into()
  }

  pub async fn list_church_locations(&self) -> Result<Vec<ChurchLocation>> {
    self.store.list_church_locations().await.err_into()
  }

  pub async fn delete_church_location(&self, id: Uuid) -> Result<()> {
    self.store.delete_church_location(id).await.err_into()
  }

  // ─── Identity store ────────────────────────────────────────────────────

  /// Register a member in `Pending` status.
  pub async fn create_member(&self, form: MemberForm) -> Result<ChurchMember> {
    form.validate()?;
    let member = self
      .store
      .create_member(form, MemberStatus::Pending)
      .await
      .err_into()?;
    info!(member_id = %member.member_id, "member registered");
    Ok(member)
  }

  pub async fn get_member(&self, id: Uuid) -> Result<ChurchMember> {
    self
      .store
      .get_member(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("member", id))
  }

  pub async fn member_profile(&self, id: Uuid) -> Result<MemberProfile> {
    Ok(MemberProfile::new(self.get_member(id).await?, Utc::now()))
  }

  pub async fn find_member_by_member_id(&self, member_id: &str) -> Result<ChurchMember> {
    self
      .store
      .find_member_by_member_id(member_id.to_owned())
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("member", member_id))
  }

  pub async fn list_members(&self, query: MemberQuery) -> Result<Vec<ChurchMember>> {
    self.store.list_members(query).await.err_into()
  }

  pub async fn update_member(&self, id: Uuid, form: MemberForm) -> Result<ChurchMember> {
    form.validate()?;
    self.store.update_member(id, form).await.err_into()
  }

  /// Activate a member. Leaving `Pending` or `Inactive` sends the welcome
  /// SMS carrying the member ID; approving an active member does nothing.
  pub async fn approve_member(&self, id: Uuid) -> Result<ChurchMember> {
    let (member, previous) = self
      .store
      .set_member_status(id, MemberStatus::Active)
      .await
      .err_into()?;
    if previous != MemberStatus::Active {
      info!(member_id = %member.member_id, from = %previous, "member approved");
      let body = notification::approval_message(
        &member.full_name,
        &member.member_id,
        &self.account_request_url,
      );
      self.text(Some(member.id), &member.phone_number, body).await;
    }
    Ok(member)
  }

  /// Change status without any notification.
  pub async fn set_member_status(&self, id: Uuid, status: MemberStatus) -> Result<ChurchMember> {
    let (member, previous) = self.store.set_member_status(id, status).await.err_into()?;
    if previous != status {
      info!(member_id = %member.member_id, from = %previous, to = %status, "member status changed");
    }
    Ok(member)
  }

  /// Store a passport photograph, replacing (and removing) any previous one.
  pub async fn set_member_passport(&self, id: Uuid, upload: Upload) -> Result<ChurchMember> {
    self.attach(id, MemberAttachment::Passport, member::PASSPORT_DIR, upload).await
  }

  async fn attach(
    &self,
    id: Uuid,
    attachment: MemberAttachment,
    dir: &str,
    upload: Upload,
  ) -> Result<ChurchMember> {
    let path = self.put_file(dir, upload).await?;
    match self
      .store
      .set_member_attachment(id, attachment, Some(path.clone()))
      .await
      .err_into()
    {
      Ok(Some(old)) if old != path => self.discard_file(&old).await,
      Ok(_) => {}
      Err(e) => {
        self.discard_file(&path).await;
        return Err(e);
      }
    }
    self.get_member(id).await
  }

  /// Delete a member and the files it referenced.
  pub async fn delete_member(&self, id: Uuid) -> Result<()> {
    let files = self.store.delete_member(id).await.err_into()?;
    for path in files {
      self.discard_file(&path).await;
    }
    info!(%id, "member deleted");
    Ok(())
  }

  // ─── Sacrament ledger ──────────────────────────────────────────────────

  pub async fn register_baptism(
    &self,
    id: Uuid,
    on: NaiveDate,
    certificate: Option<Upload>,
  ) -> Result<ChurchMember> {
    self.register_with_certificate(Sacrament::Baptism, id, on, certificate).await
  }

  pub async fn register_confirmation(
    &self,
    id: Uuid,
    on: NaiveDate,
    certificate: Option<Upload>,
  ) -> Result<ChurchMember> {
    self.register_with_certificate(Sacrament::Confirmation, id, on, certificate).await
  }

  /// The certificate is stored before the ledger write and removed again if
  /// the write is rejected, so a refused upload never leaves a sacrament
  /// behind.
  async fn register_with_certificate(
    &self,
    sacrament: Sacrament,
    id: Uuid,
    on: NaiveDate,
    certificate: Option<Upload>,
  ) -> Result<ChurchMember> {
    let stored = match certificate {
      Some(upload) => {
        let member = self.get_member(id).await?;
        let path = sacrament::certificate_path(sacrament, &member.full_name, &upload.file_name)?;
        Some(self.collab.files().put(&path, upload.bytes).await?)
      }
      None => None,
    };
    let registered = match sacrament {
      Sacrament::Confirmation => self.store.register_confirmation(id, on, stored.clone()).await,
      _ => self.store.register_baptism(id, on, stored.clone()).await,
    }
    .err_into();
    let (member, replaced) = match registered {
      Ok(done) => done,
      Err(e) => {
        if let Some(path) = &stored {
          self.discard_file(path).await;
        }
        return Err(e);
      }
    };
    info!(member_id = %member.member_id, %sacrament, %on, "sacrament registered");
    if let Some(old) = replaced
      && stored.as_ref() != Some(&old)
    {
      self.discard_file(&old).await;
    }
    Ok(member)
  }

  pub async fn register_marriage(&self, input: NewMarriage) -> Result<Marriage> {
    let marriage = self.store.register_marriage(input).await.err_into()?;
    info!(
      marriage = %marriage.id,
      husband = %marriage.husband_id,
      wife = %marriage.wife_id,
      on = %marriage.married_on,
      "marriage registered"
    );
    Ok(marriage)
  }

  pub async fn update_marriage_date(&self, marriage: Uuid, on: NaiveDate) -> Result<Marriage> {
    self.store.update_marriage_date(marriage, on).await.err_into()
  }

  pub async fn revoke_baptism(&self, member: Uuid) -> Result<ChurchMember> {
    let revocation = self.store.revoke_baptism(member).await.err_into()?;
    self.finish_revocation(Sacrament::Baptism, revocation).await
  }

  pub async fn revoke_confirmation(&self, member: Uuid) -> Result<ChurchMember> {
    let revocation = self.store.revoke_confirmation(member).await.err_into()?;
    self.finish_revocation(Sacrament::Confirmation, revocation).await
  }

  pub async fn revoke_marriage(&self, member: Uuid) -> Result<ChurchMember> {
    let revocation = self.store.revoke_marriage(member).await.err_into()?;
    self.finish_revocation(Sacrament::Marriage, revocation).await
  }

  async fn finish_revocation(
    &self,
    sacrament: Sacrament,
    revocation: Revocation,
  ) -> Result<ChurchMember> {
    info!(
      member_id = %revocation.member.member_id,
      partner = ?revocation.partner,
      %sacrament,
      "sacrament revoked"
    );
    for path in &revocation.removed_files {
      self.discard_file(path).await;
    }
    Ok(revocation.member)
  }

  pub async fn get_marriage_for(&self, member: Uuid) -> Result<Option<MarriageParties>> {
    self.store.get_marriage_for(member).await.err_into()
  }

  /// Marriages with future dates first, then most recent first.
  pub async fn list_marriages(&self) -> Result<Vec<MarriageEntry>> {
    let now = Utc::now();
    let mut marriages = self.store.list_marriages().await.err_into()?;
    marriages.sort_by(|a, b| b.marriage.married_on.cmp(&a.marriage.married_on));
    Ok(
      marriages
        .into_iter()
        .map(|parties| {
          let (since, _) = humanize::relative_date(parties.marriage.married_on, now);
          MarriageEntry { parties, since }
        })
        .collect(),
    )
  }

  // ─── Leader registry ───────────────────────────────────────────────────

  pub async fn create_or_update_leader(&self, form: LeaderForm) -> Result<LeaderView> {
    form.validate()?;
    let leader = self.store.upsert_leader(form).await.err_into()?;
    info!(leader_id = %leader.leader_id, occupation = %leader.occupation, "leader saved");
    self.get_leader(leader.id).await
  }

  pub async fn get_leader(&self, id: Uuid) -> Result<LeaderView> {
    let view = self
      .store
      .get_leader(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("leader", id))?;
    Ok(self.refresh_service(view).await)
  }

  pub async fn list_leaders(&self, query: LeaderQuery) -> Result<Vec<LeaderView>> {
    let views = self.store.list_leaders(query).await.err_into()?;
    let mut out = Vec::with_capacity(views.len());
    for view in views {
      out.push(self.refresh_service(view).await);
    }
    Ok(out)
  }

  /// Recompute `time_in_service` and persist it when it changed.
  async fn refresh_service(&self, mut view: LeaderView) -> LeaderView {
    if view.leader.refresh_time_in_service(Self::today())
      && let Some(value) = view.leader.time_in_service.clone()
      && let Err(e) = self.store.save_time_in_service(view.leader.id, value).await
    {
      warn!(leader = %view.leader.id, error = %e, "could not persist time in service");
    }
    view
  }

  pub async fn delete_leader(&self, id: Uuid) -> Result<()> {
    self.store.delete_leader(id).await.err_into()
  }

  // ─── Asset registry ────────────────────────────────────────────────────

  pub async fn create_asset(&self, form: AssetForm) -> Result<ChurchAsset> {
    form.validate()?;
    self.store.create_asset(form).await.err_into()
  }

  pub async fn update_asset(&self, id: Uuid, form: AssetForm) -> Result<ChurchAsset> {
    form.validate()?;
    self.store.update_asset(id, form).await.err_into()
  }

  pub async fn get_asset(&self, id: Uuid) -> Result<ChurchAsset> {
    self
      .store
      .get_asset(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("asset", id))
  }

  pub async fn list_assets(&self, query: AssetQuery) -> Result<Vec<ChurchAsset>> {
    self.store.list_assets(query).await.err_into()
  }

  /// Remove the asset's media files, then the asset and its records.
  pub async fn delete_asset(&self, id: Uuid) -> Result<()> {
    self.get_asset(id).await?;
    for media in self.store.list_asset_media(id).await.err_into()? {
      self.discard_file(&media.image).await;
    }
    self.store.delete_asset(id).await.err_into()?;
    info!(%id, "asset deleted");
    Ok(())
  }

  pub async fn add_asset_media(&self, asset: Uuid, upload: Upload) -> Result<AssetMedia> {
    self.get_asset(asset).await?;
    let path = self.put_file(asset::MEDIA_DIR, upload).await?;
    match self.store.add_asset_media(asset, path.clone()).await.err_into() {
      Ok(media) => Ok(media),
      Err(e) => {
        self.discard_file(&path).await;
        Err(e)
      }
    }
  }

  pub async fn list_asset_media(&self, asset: Uuid) -> Result<Vec<AssetMedia>> {
    self.store.list_asset_media(asset).await.err_into()
  }

  pub async fn delete_asset_media(&self, id: Uuid) -> Result<()> {
    let media = self
      .store
      .get_asset_media(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("asset media", id))?;
    self.discard_file(&media.image).await;
    self.store.delete_asset_media(id).await.err_into()
  }

  // ─── Finance ledger ────────────────────────────────────────────────────

  pub async fn create_offering_category(&self, form: CategoryForm) -> Result<OfferingCategory> {
    form.validate()?;
    self.store.create_offering_category(form).await.err_into()
  }

  pub async fn update_offering_category(
    &self,
    id: Uuid,
    form: CategoryForm,
  ) -> Result<OfferingCategory> {
    form.validate()?;
    self.store.update_offering_category(id, form).await.err_into()
  }

  pub async fn list_offering_categories(&self) -> Result<Vec<OfferingCategory>> {
    self.store.list_offering_categories().await.err_into()
  }

  pub async fn delete_offering_category(&self, id: Uuid) -> Result<()> {
    self.store.delete_offering_category(id).await.err_into()
  }

  pub async fn create_offering(&self, form: OfferingForm) -> Result<Offering> {
    form.validate()?;
    self.store.create_offering(form).await.err_into()
  }

  pub async fn update_offering(&self, id: Uuid, form: OfferingForm) -> Result<Offering> {
    form.validate()?;
    self.store.update_offering(id, form).await.err_into()
  }

  pub async fn list_offerings(&self, query: LedgerQuery) -> Result<Vec<Offering>> {
    self.store.list_offerings(query).await.err_into()
  }

  pub async fn delete_offering(&self, id: Uuid) -> Result<()> {
    self.store.delete_offering(id).await.err_into()
  }

  pub async fn create_facility_renting(&self, form: FacilityRentingForm) -> Result<FacilityRenting> {
    form.validate()?;
    let renting = self.store.create_facility_renting(form).await.err_into()?;
    info!(receipt_id = %renting.receipt_id, "facility renting recorded");
    Ok(renting)
  }

  pub async fn update_facility_renting(
    &self,
    id: Uuid,
    form: FacilityRentingForm,
  ) -> Result<FacilityRenting> {
    form.validate()?;
    self.store.update_facility_renting(id, form).await.err_into()
  }

  pub async fn list_facility_rentings(&self, query: LedgerQuery) -> Result<Vec<FacilityRenting>> {
    self.store.list_facility_rentings(query).await.err_into()
  }

  pub async fn delete_facility_renting(&self, id: Uuid) -> Result<()> {
    self.store.delete_facility_renting(id).await.err_into()
  }

  pub async fn create_special_contribution(
    &self,
    form: SpecialContributionForm,
  ) -> Result<SpecialContribution> {
    form.validate()?;
    self.store.create_special_contribution(form).await.err_into()
  }

  pub async fn update_special_contribution(
    &self,
    id: Uuid,
    form: SpecialContributionForm,
  ) -> Result<SpecialContribution> {
    form.validate()?;
    self.store.update_special_contribution(id, form).await.err_into()
  }

  pub async fn list_special_contributions(&self) -> Result<Vec<SpecialContribution>> {
    self.store.list_special_contributions().await.err_into()
  }

  pub async fn delete_special_contribution(&self, id: Uuid) -> Result<()> {
    self.store.delete_special_contribution(id).await.err_into()
  }

  pub async fn create_donation_item_fund(
    &self,
    contribution: Uuid,
    form: DonationItemFundForm,
  ) -> Result<DonationItemFund> {
    form.validate()?;
    self.store.create_donation_item_fund(contribution, form).await.err_into()
  }

  pub async fn update_donation_item_fund(
    &self,
    id: Uuid,
    form: DonationItemFundForm,
  ) -> Result<DonationItemFund> {
    form.validate()?;
    self.store.update_donation_item_fund(id, form).await.err_into()
  }

  pub async fn list_donation_item_funds(&self, query: LedgerQuery) -> Result<Vec<DonationItemFund>> {
    self.store.list_donation_item_funds(query).await.err_into()
  }

  pub async fn delete_donation_item_fund(&self, id: Uuid) -> Result<()> {
    self.store.delete_donation_item_fund(id).await.err_into()
  }

  pub async fn create_pledge(&self, form: PledgeForm) -> Result<Pledge> {
    form.validate()?;
    self.store.create_pledge(form).await.err_into()
  }

  pub async fn update_pledge(&self, id: Uuid, form: PledgeForm) -> Result<Pledge> {
    form.validate()?;
    self.store.update_pledge(id, form).await.err_into()
  }

  pub async fn list_pledges(&self, query: LedgerQuery) -> Result<Vec<Pledge>> {
    self.store.list_pledges(query).await.err_into()
  }

  pub async fn delete_pledge(&self, id: Uuid) -> Result<()> {
    self.store.delete_pledge(id).await.err_into()
  }

  pub async fn create_expense_category(&self, form: CategoryForm) -> Result<ExpenseCategory> {
    form.validate()?;
    self.store.create_expense_category(form).await.err_into()
  }

  pub async fn update_expense_category(
    &self,
    id: Uuid,
    form: CategoryForm,
  ) -> Result<ExpenseCategory> {
    form.validate()?;
    self.store.update_expense_category(id, form).await.err_into()
  }

  pub async fn list_expense_categories(&self) -> Result<Vec<ExpenseCategory>> {
    self.store.list_expense_categories().await.err_into()
  }

  pub async fn delete_expense_category(&self, id: Uuid) -> Result<()> {
    self.store.delete_expense_category(id).await.err_into()
  }

  pub async fn create_expenditure(
    &self,
    category: Uuid,
    form: ExpenditureForm,
  ) -> Result<Expenditure> {
    form.validate()?;
    self.store.create_expenditure(category, form).await.err_into()
  }

  pub async fn update_expenditure(&self, id: Uuid, form: ExpenditureForm) -> Result<Expenditure> {
    form.validate()?;
    self.store.update_expenditure(id, form).await.err_into()
  }

  pub async fn list_expenditures(&self, query: LedgerQuery) -> Result<Vec<Expenditure>> {
    self.store.list_expenditures(query).await.err_into()
  }

  pub async fn delete_expenditure(&self, id: Uuid) -> Result<()> {
    if let Some(receipt) = self.store.delete_expenditure(id).await.err_into()? {
      self.discard_file(&receipt).await;
    }
    Ok(())
  }

  pub async fn set_expenditure_receipt(&self, id: Uuid, upload: Upload) -> Result<Expenditure> {
    let path = self.put_file(finance::RECEIPT_DIR, upload).await?;
    match self
      .store
      .set_expenditure_receipt(id, Some(path.clone()))
      .await
      .err_into()
    {
      Ok(Some(old)) if old != path => self.discard_file(&old).await,
      Ok(_) => {}
      Err(e) => {
        self.discard_file(&path).await;
        return Err(e);
      }
    }
    self
      .store
      .get_expenditure(id)
      .await
      .err_into()?
      .ok_or_else(|| Error::not_found("expenditure", id))
  }

  // ─── Notification dispatcher ───────────────────────────────────────────

  /// Create one notification per distinct recipient and text each of them.
  /// SMS failures are counted, never propagated.
  pub async fn dispatch(&self, request: Dispatch) -> Result<DispatchReport> {
    let request = request.normalise()?;
    let deliveries = self
      .store
      .create_notifications(request.title, request.message.clone(), request.recipient_ids)
      .await
      .err_into()?;

    let mut report = DispatchReport {
      notifications: Vec::with_capacity(deliveries.len()),
      sms_sent:      0,
      sms_failed:    0,
    };
    for delivery in deliveries {
      let body = notification::notification_sms(&delivery.full_name, &request.message);
      let recipient = delivery.notification.recipient_id;
      if self.text(Some(recipient), &delivery.phone_number, body).await {
        report.sms_sent += 1;
      } else {
        report.sms_failed += 1;
      }
      report.notifications.push(delivery.notification);
    }
    info!(
      recipients = report.notifications.len(),
      sms_sent = report.sms_sent,
      sms_failed = report.sms_failed,
      "notifications dispatched"
    );
    Ok(report)
  }

  pub async fn list_notifications(&self, query: NotificationQuery) -> Result<Vec<Notification>> {
    self.store.list_notifications(query).await.err_into()
  }

  pub async fn mark_notification_read(&self, id: Uuid) -> Result<Notification> {
    self.store.mark_notification_read(id).await.err_into()
  }

  pub async fn delete_notification(&self, id: Uuid) -> Result<()> {
    self.store.delete_notification(id).await.err_into()
  }

  pub async fn delete_notifications_by_title(&self, title: &str) -> Result<usize> {
    self
      .store
      .delete_notifications_by_title(title.to_owned())
      .await
      .err_into()
  }

  pub async fn list_sent_sms(&self) -> Result<Vec<SentSms>> {
    self.store.list_sent_sms().await.err_into()
  }

  // ─── Reports ───────────────────────────────────────────────────────────

  /// The general report for `month` of `year`. The month defaults to the
  /// current calendar month; the year to the current [`Year`], or the
  /// calendar year when none is set.
  pub async fn general_report(
    &self,
    month: Option<Month>,
    year: Option<i32>,
  ) -> Result<GeneralReport> {
    let now = Utc::now();
    let month = month.unwrap_or_else(|| Month::of(now.date_naive()));
    let year = match year {
      Some(y) => y,
      None => self
        .store
        .current_year()
        .await
        .err_into()?
        .map_or(now.year(), |y| y.year),
    };
    let period = ReportPeriod::new(month, year);
    let inputs = self.store.report_inputs(period).await.err_into()?;
    Ok(GeneralReport::compute(period, inputs, now))
  }

  pub async fn parish_summary(&self) -> Result<ParishSummary> {
    self.store.parish_summary().await.err_into()
  }
}
