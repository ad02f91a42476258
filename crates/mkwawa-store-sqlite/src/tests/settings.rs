use mkwawa_core::{
  Error as CoreError,
  finance::{OfferingForm, ServiceTime},
  ids,
  member::{Gender, MemberQuery},
  settings::{CellForm, NewChurchLocation, NewYear},
  store::ParishStore,
};
use rust_decimal::Decimal;

use super::{category, core, current_year, member, outstation, store};

// ─── Years ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_current_year_replaces_previous() {
  let s = store().await;
  let y2024 = current_year(&s, 2024).await;
  let y2025 = current_year(&s, 2025).await;

  let years = s.list_years().await.unwrap();
  assert_eq!(years.len(), 2);
  assert_eq!(years.iter().filter(|y| y.is_current).count(), 1);
  assert_eq!(s.current_year().await.unwrap().unwrap().id, y2025.id);

  let flipped = s.set_current_year(2024).await.unwrap();
  assert_eq!(flipped.id, y2024.id);
  assert!(flipped.is_current);
  let current = s.current_year().await.unwrap().unwrap();
  assert_eq!(current.year, 2024);
  assert_eq!(s.list_years().await.unwrap().iter().filter(|y| y.is_current).count(), 1);
}

#[tokio::test]
async fn setting_the_same_current_year_twice_changes_nothing() {
  let s = store().await;
  current_year(&s, 2024).await;
  current_year(&s, 2025).await;

  let once = s.set_current_year(2024).await.unwrap();
  let after_once = s.list_years().await.unwrap();
  let twice = s.set_current_year(2024).await.unwrap();
  let after_twice = s.list_years().await.unwrap();

  assert_eq!(once, twice);
  assert_eq!(after_once, after_twice);
  assert_eq!(after_twice.iter().filter(|y| y.is_current).count(), 1);
}

#[tokio::test]
async fn non_current_year_needs_a_current_one() {
  let s = store().await;
  let err = s.create_year(NewYear { year: 2023, is_current: false }).await.unwrap_err();
  assert!(matches!(core(err), CoreError::SingletonViolation(_)));

  current_year(&s, 2025).await;
  let y = s.create_year(NewYear { year: 2023, is_current: false }).await.unwrap();
  assert!(!y.is_current);
  assert_eq!(s.current_year().await.unwrap().unwrap().year, 2025);
}

#[tokio::test]
async fn duplicate_year_conflicts() {
  let s = store().await;
  current_year(&s, 2025).await;
  let err = s.create_year(NewYear { year: 2025, is_current: false }).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));
}

#[tokio::test]
async fn set_current_year_unknown_is_not_found() {
  let s = store().await;
  let err = s.set_current_year(2030).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "year", .. }));
}

#[tokio::test]
async fn current_year_cannot_be_deleted() {
  let s = store().await;
  let y = current_year(&s, 2025).await;
  let err = s.delete_year(y.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CurrentYearLocked(2025)));
  assert!(s.current_year().await.unwrap().is_some());
}

#[tokio::test]
async fn year_with_ledger_rows_is_protected() {
  let s = store().await;
  current_year(&s, 2025).await;
  let old = s.create_year(NewYear { year: 2024, is_current: false }).await.unwrap();
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  let os = outstation(&s, "Mkwawa").await;
  s.create_offering(OfferingForm {
    year_id:       Some(old.id),
    date_given:    Some(super::d(2024, 3, 3)),
    service_time:  ServiceTime::Morning,
    amount:        Decimal::from(1_000),
    collected_by:  None,
    recorded_by:   None,
    mass_name:     "First mass".into(),
    notes:         None,
    category_id:   cat.id,
    outstation_id: os.id,
  })
  .await
  .unwrap();

  let err = s.delete_year(old.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Protected(_)));

  let spare = s.create_year(NewYear { year: 2023, is_current: false }).await.unwrap();
  s.delete_year(spare.id).await.unwrap();
  assert_eq!(s.list_years().await.unwrap().len(), 2);
}

// ─── Outstations and cells ───────────────────────────────────────────────────

#[tokio::test]
async fn outstation_and_cell_numbers_have_fixed_width() {
  let s = store().await;
  let os = outstation(&s, "Mkwawa").await;
  assert_eq!(os.number.to_string().len(), 6);

  let cell = s
    .create_cell(CellForm {
      name:          "Cell A".into(),
      outstation_id: os.id,
      description:   None,
      location:      "Block 4".into(),
    })
    .await
    .unwrap();
  assert_eq!(cell.number.to_string().len(), 7);
  assert_eq!(s.list_cells(Some(os.id)).await.unwrap().len(), 1);
  assert!(ids::is_member_id(&member(&s, "A", Gender::Male, "255700000001").await.member_id));
}

#[tokio::test]
async fn cell_needs_existing_outstation() {
  let s = store().await;
  let err = s
    .create_cell(CellForm {
      name:          "Orphan".into(),
      outstation_id: uuid::Uuid::new_v4(),
      description:   None,
      location:      "Nowhere".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "outstation", .. }));
}

#[tokio::test]
async fn deleting_outstation_cascades_to_cells_and_unassigns_members() {
  let s = store().await;
  let os = outstation(&s, "Mkwawa").await;
  let cell = s
    .create_cell(CellForm {
      name:          "Cell A".into(),
      outstation_id: os.id,
      description:   None,
      location:      "Block 4".into(),
    })
    .await
    .unwrap();
  let mut form = super::member_form("Asha", Gender::Female, "255700000002");
  form.cell_id = Some(cell.id);
  let m = s.create_member(form, mkwawa_core::member::MemberStatus::Active).await.unwrap();
  assert_eq!(m.cell_id, Some(cell.id));

  s.delete_outstation(os.id).await.unwrap();
  assert!(s.get_cell(cell.id).await.unwrap().is_none());
  let m = s.get_member(m.id).await.unwrap().unwrap();
  assert_eq!(m.cell_id, None);
  assert_eq!(s.list_members(MemberQuery::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn outstation_with_offerings_is_protected() {
  let s = store().await;
  current_year(&s, 2025).await;
  let os = outstation(&s, "Mkwawa").await;
  let cat = s.create_offering_category(category("Sunday")).await.unwrap();
  s.create_offering(OfferingForm {
    year_id:       None,
    date_given:    None,
    service_time:  ServiceTime::Evening,
    amount:        Decimal::from(500),
    collected_by:  None,
    recorded_by:   None,
    mass_name:     "Evening".into(),
    notes:         None,
    category_id:   cat.id,
    outstation_id: os.id,
  })
  .await
  .unwrap();
  let err = s.delete_outstation(os.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Protected(_)));
}

#[tokio::test]
async fn outstation_names_are_unique() {
  let s = store().await;
  outstation(&s, "Mkwawa").await;
  let err = s
    .create_outstation(mkwawa_core::settings::OutStationForm {
      name:        "Mkwawa".into(),
      description: None,
      location:    "Elsewhere".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));
}

// ─── Church location ─────────────────────────────────────────────────────────

fn here() -> NewChurchLocation {
  NewChurchLocation { latitude: -7.77, longitude: 35.69, altitude: None }
}

#[tokio::test]
async fn replacing_location_keeps_one_active() {
  let s = store().await;
  let first = s.replace_church_location(here()).await.unwrap();
  let second = s
    .replace_church_location(NewChurchLocation { latitude: -7.8, ..here() })
    .await
    .unwrap();
  assert!(second.is_active);

  let all = s.list_church_locations().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all.iter().filter(|l| l.is_active).count(), 1);
  assert_eq!(s.active_church_location().await.unwrap().unwrap().id, second.id);

  s.activate_church_location(first.id).await.unwrap();
  assert_eq!(s.active_church_location().await.unwrap().unwrap().id, first.id);
}

#[tokio::test]
async fn inserting_second_active_location_is_rejected() {
  let s = store().await;
  s.insert_church_location(here()).await.unwrap();
  let err = s.insert_church_location(here()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::SingletonViolation(_)));
}

#[tokio::test]
async fn altitude_can_be_filled_in_later() {
  let s = store().await;
  let loc = s.replace_church_location(here()).await.unwrap();
  assert_eq!(loc.altitude, None);
  let loc = s.set_church_location_altitude(loc.id, 1_650.0).await.unwrap();
  assert_eq!(loc.altitude, Some(1_650.0));

  s.delete_church_location(loc.id).await.unwrap();
  assert!(s.active_church_location().await.unwrap().is_none());
}
