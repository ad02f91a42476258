use std::collections::HashSet;

use chrono::{TimeZone as _, Utc};
use mkwawa_core::{
  Error as CoreError, ids,
  asset::{AssetForm, AssetStatus, AssetType, ChurchAsset, QuantityUnit},
  finance::{
    ContributionType, DonationItemFundForm, ExpenditureForm, FacilityRentingForm, LedgerQuery,
    Month, OfferingForm, PledgeForm, ServiceTime, SpecialContributionForm,
  },
  leader::{LeaderForm, Occupation},
  member::Gender,
  settings::NewYear,
  store::ParishStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{category, core, current_year, d, member, outstation, store};
use crate::SqliteStore;

fn offering(category_id: Uuid, outstation_id: Uuid, amount: i64) -> OfferingForm {
  OfferingForm {
    year_id: None,
    date_given: Some(d(2025, 3, 2)),
    service_time: ServiceTime::Morning,
    amount: Decimal::from(amount),
    collected_by: None,
    recorded_by: None,
    mass_name: "Ibada ya kwanza".into(),
    notes: None,
    category_id,
    outstation_id,
  }
}

async fn rentable(s: &SqliteStore, asset_type: AssetType) -> ChurchAsset {
  s.create_asset(AssetForm {
    name: format!("{asset_type}"),
    asset_type,
    description: None,
    acquisition_date: None,
    quantity: 1,
    quantity_name: QuantityUnit::Units,
    status: AssetStatus::Good,
    value: Decimal::from(1_000_000),
  })
  .await
  .unwrap()
}

fn renting(asset_id: Uuid) -> FacilityRentingForm {
  FacilityRentingForm {
    year_id: None,
    asset_id,
    rentor_name: "Kwaya ya Vijana".into(),
    amount: Decimal::from(80_000),
    date_rented: Some(d(2025, 4, 12)),
    end_date: None,
    purpose: Some("Tamasha".into()),
  }
}

// ─── Offerings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn offering_defaults_to_current_year() {
  let s = store().await;
  let year = current_year(&s, 2025).await;
  let cat = s.create_offering_category(category("Sadaka ya Jumapili")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;

  let o = s.create_offering(offering(cat.id, os.id, 45_000)).await.unwrap();
  assert_eq!(o.year_id, year.id);
  assert_eq!(o.year, 2025);
  assert_eq!(o.amount, Decimal::from(45_000));
}

#[tokio::test]
async fn ledger_record_without_current_year_fails() {
  let s = store().await;
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  let err = s.create_offering(offering(cat.id, os.id, 1_000)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CurrentYearMissing));
  assert!(s.list_offerings(LedgerQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn recorder_must_be_a_leader() {
  let s = store().await;
  current_year(&s, 2025).await;
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  let m = member(&s, "Zawadi", Gender::Female, "255714000001").await;

  let mut form = offering(cat.id, os.id, 1_000);
  form.recorded_by = Some(m.id);
  let err = s.create_offering(form.clone()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Validation { field: "recorded_by", .. }));

  s.upsert_leader(LeaderForm {
    church_member_id: m.id,
    occupation:       Occupation::ChurchTreasurer,
    start_date:       d(2024, 1, 1),
    responsibilities: "Counts offerings".into(),
    outstation_id:    None,
  })
  .await
  .unwrap();
  let o = s.create_offering(form).await.unwrap();
  assert_eq!(o.recorded_by, Some(m.id));
}

#[tokio::test]
async fn offering_update_keeps_year_and_date_when_omitted() {
  let s = store().await;
  let y2025 = current_year(&s, 2025).await;
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  let o = s.create_offering(offering(cat.id, os.id, 1_000)).await.unwrap();

  current_year(&s, 2026).await;
  let mut form = offering(cat.id, os.id, 2_500);
  form.date_given = None;
  let o = s.update_offering(o.id, form).await.unwrap();
  assert_eq!(o.year_id, y2025.id);
  assert_eq!(o.date_given, d(2025, 3, 2));
  assert_eq!(o.amount, Decimal::from(2_500));
}

#[tokio::test]
async fn offering_listing_filters() {
  let s = store().await;
  current_year(&s, 2025).await;
  let old = s.create_year(NewYear { year: 2024, is_current: false }).await.unwrap();
  let sunday = s.create_offering_category(category("Sunday")).await.unwrap();
  let thanks = s.create_offering_category(category("Shukrani")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  let collector = member(&s, "Zawadi", Gender::Female, "255714000002").await;

  s.create_offering(offering(sunday.id, os.id, 100)).await.unwrap();
  let mut june = offering(thanks.id, os.id, 200);
  june.date_given = Some(d(2025, 6, 8));
  june.collected_by = Some(collector.id);
  s.create_offering(june).await.unwrap();
  let mut last_year = offering(sunday.id, os.id, 300);
  last_year.year_id = Some(old.id);
  last_year.date_given = Some(d(2024, 6, 9));
  s.create_offering(last_year).await.unwrap();

  let all = s.list_offerings(LedgerQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].date_given, d(2025, 6, 8));

  let this_year = LedgerQuery { year: Some(2025), ..Default::default() };
  assert_eq!(s.list_offerings(this_year).await.unwrap().len(), 2);

  let june = LedgerQuery { month: Some(Month::June), ..Default::default() };
  assert_eq!(s.list_offerings(june).await.unwrap().len(), 2);

  let june_2025 = LedgerQuery { year: Some(2025), month: Some(Month::June), ..Default::default() };
  assert_eq!(s.list_offerings(june_2025).await.unwrap()[0].amount, Decimal::from(200));

  let by_category = LedgerQuery { category_id: Some(sunday.id), ..Default::default() };
  assert_eq!(s.list_offerings(by_category).await.unwrap().len(), 2);

  let by_member = LedgerQuery { member_id: Some(collector.id), ..Default::default() };
  assert_eq!(s.list_offerings(by_member).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_category_cascades_to_offerings() {
  let s = store().await;
  current_year(&s, 2025).await;
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  s.create_offering(offering(cat.id, os.id, 100)).await.unwrap();
  s.delete_offering_category(cat.id).await.unwrap();
  assert!(s.list_offerings(LedgerQuery::default()).await.unwrap().is_empty());
  assert!(s.list_offering_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn category_names_are_unique() {
  let s = store().await;
  s.create_expense_category(category("Umeme")).await.unwrap();
  let err = s.create_expense_category(category("Umeme")).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));
}

// ─── Facility rentings ───────────────────────────────────────────────────────

#[tokio::test]
async fn renting_gets_a_receipt_that_survives_updates() {
  let s = store().await;
  current_year(&s, 2025).await;
  let hall = rentable(&s, AssetType::Building).await;
  let r = s.create_facility_renting(renting(hall.id)).await.unwrap();
  assert!(ids::is_receipt_id(&r.receipt_id));

  let mut form = renting(hall.id);
  form.end_date = Some(d(2025, 4, 14));
  form.amount = Decimal::from(120_000);
  let updated = s.update_facility_renting(r.id, form).await.unwrap();
  assert_eq!(updated.receipt_id, r.receipt_id);
  assert_eq!(updated.end_date, Some(d(2025, 4, 14)));
  assert_eq!(updated.amount, Decimal::from(120_000));

  let mut backwards = renting(hall.id);
  backwards.end_date = Some(d(2025, 4, 1));
  let err = s.update_facility_renting(r.id, backwards).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Validation { field: "end_date", .. }));
}

#[tokio::test]
async fn only_rentable_assets_can_be_rented() {
  let s = store().await;
  current_year(&s, 2025).await;
  let chairs = rentable(&s, AssetType::Furniture).await;
  let err = s.create_facility_renting(renting(chairs.id)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Validation { field: "asset_id", .. }));

  let err = s.create_facility_renting(renting(Uuid::new_v4())).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "asset", .. }));
}

#[tokio::test]
async fn ten_thousand_rentings_get_distinct_receipts() {
  let s = store().await;
  current_year(&s, 2025).await;
  let hall = rentable(&s, AssetType::Building).await;
  let mut receipts = HashSet::new();
  for _ in 0..10_000 {
    let r = s.create_facility_renting(renting(hall.id)).await.unwrap();
    assert!(ids::is_receipt_id(&r.receipt_id));
    assert!(receipts.insert(r.receipt_id));
  }
  let query = LedgerQuery { asset_id: Some(hall.id), ..Default::default() };
  assert_eq!(s.list_facility_rentings(query).await.unwrap().len(), 10_000);
}

// ─── Contributions and funds ─────────────────────────────────────────────────

#[tokio::test]
async fn funds_belong_to_a_contribution() {
  let s = store().await;
  current_year(&s, 2025).await;
  let harambee = s
    .create_special_contribution(SpecialContributionForm {
      contribution_type: ContributionType::Jimbo,
      name:              "Harambee ya Jimbo".into(),
      description:       None,
    })
    .await
    .unwrap();
  let fund = s
    .create_donation_item_fund(harambee.id, DonationItemFundForm {
      year_id:   None,
      period:    "Robo ya kwanza".into(),
      mass_name: "Ibada ya pili".into(),
      amount:    Decimal::new(12_500_50, 2),
      notes:     None,
    })
    .await
    .unwrap();
  assert_eq!(fund.contribution_id, harambee.id);
  assert_eq!(fund.amount, Decimal::new(12_500_50, 2));

  let by_parent = LedgerQuery { category_id: Some(harambee.id), ..Default::default() };
  assert_eq!(s.list_donation_item_funds(by_parent).await.unwrap().len(), 1);

  let err = s
    .create_donation_item_fund(Uuid::new_v4(), DonationItemFundForm {
      year_id:   None,
      period:    "x".into(),
      mass_name: "x".into(),
      amount:    Decimal::ONE,
      notes:     None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));

  s.delete_special_contribution(harambee.id).await.unwrap();
  assert!(s.list_donation_item_funds(LedgerQuery::default()).await.unwrap().is_empty());
}

// ─── Pledges ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pledge_is_filed_under_the_month_recorded() {
  let s = store().await;
  current_year(&s, 2025).await;
  let m = member(&s, "Gabrieli", Gender::Male, "255714000010").await;
  let p = s
    .create_pledge(PledgeForm {
      member_id:               m.id,
      year_id:                 None,
      month:                   None,
      date_given:              Some(d(2025, 9, 21)),
      envelope_number:         "B-104".into(),
      pledge_amount:           Decimal::from(20_000),
      pledge_for_construction: Decimal::ZERO,
    })
    .await
    .unwrap();
  let this_month = Month::of(Utc::now().date_naive());
  assert_eq!(p.month, this_month);
  assert_eq!(p.date_given, d(2025, 9, 21));

  let filed = LedgerQuery { month: Some(this_month), ..Default::default() };
  assert_eq!(s.list_pledges(filed).await.unwrap().len(), 1);
  let by_member = LedgerQuery { member_id: Some(m.id), ..Default::default() };
  assert_eq!(s.list_pledges(by_member).await.unwrap()[0].id, p.id);

  s.delete_member(m.id).await.unwrap();
  assert!(s.list_pledges(LedgerQuery::default()).await.unwrap().is_empty());
}

// ─── Expenditures ────────────────────────────────────────────────────────────

#[tokio::test]
async fn expenditure_month_and_receipt() {
  let s = store().await;
  current_year(&s, 2025).await;
  let power = s.create_expense_category(category("Umeme")).await.unwrap();
  let taken = Utc.with_ymd_and_hms(2025, 7, 4, 10, 30, 0).unwrap();
  let e = s
    .create_expenditure(power.id, ExpenditureForm {
      year_id:             None,
      month:               None,
      date_taken:          Some(taken),
      expenditure_amount:  Decimal::from(60_000),
      expenditure_purpose: Some("LUKU".into()),
      notes:               None,
    })
    .await
    .unwrap();
  let this_month = Month::of(Utc::now().date_naive());
  assert_eq!(e.month, this_month);
  assert_eq!(e.date_taken, taken);
  assert_eq!(e.receipt, None);

  let old = s
    .set_expenditure_receipt(e.id, Some("receipt_uploads/luku.pdf".into()))
    .await
    .unwrap();
  assert_eq!(old, None);
  let old = s
    .set_expenditure_receipt(e.id, Some("receipt_uploads/luku2.pdf".into()))
    .await
    .unwrap();
  assert_eq!(old.as_deref(), Some("receipt_uploads/luku.pdf"));

  let filed = LedgerQuery { month: Some(this_month), ..Default::default() };
  assert_eq!(s.list_expenditures(filed).await.unwrap().len(), 1);

  let removed = s.delete_expenditure(e.id).await.unwrap();
  assert_eq!(removed.as_deref(), Some("receipt_uploads/luku2.pdf"));
  assert!(s.get_expenditure(e.id).await.unwrap().is_none());
}

#[tokio::test]
async fn expenditure_needs_existing_category() {
  let s = store().await;
  current_year(&s, 2025).await;
  let err = s
    .create_expenditure(Uuid::new_v4(), ExpenditureForm {
      year_id:             None,
      month:               None,
      date_taken:          None,
      expenditure_amount:  Decimal::ONE,
      expenditure_purpose: None,
      notes:               None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "expense category", .. }));
}
