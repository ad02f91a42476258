use mkwawa_core::{
  Error as CoreError,
  asset::{AssetForm, AssetQuery, AssetStatus, AssetType, QuantityUnit},
  store::ParishStore,
};
use rust_decimal::Decimal;

use super::{core, d, store};

fn asset(name: &str, asset_type: AssetType) -> AssetForm {
  AssetForm {
    name: name.into(),
    asset_type,
    description: None,
    acquisition_date: Some(d(2018, 5, 20)),
    quantity: 1,
    quantity_name: QuantityUnit::Units,
    status: AssetStatus::Good,
    value: Decimal::new(2_500_000_00, 2),
  }
}

#[tokio::test]
async fn create_update_and_filter() {
  let s = store().await;
  let hall = s.create_asset(asset("Parish hall", AssetType::Building)).await.unwrap();
  s.create_asset(asset("Projector", AssetType::Electronics)).await.unwrap();
  assert_eq!(hall.value, Decimal::new(2_500_000_00, 2));

  let mut form = asset("Parish hall", AssetType::Building);
  form.status = AssetStatus::NeedsRepair;
  let hall = s.update_asset(hall.id, form).await.unwrap();
  assert_eq!(hall.status, AssetStatus::NeedsRepair);

  let buildings = AssetQuery { asset_type: Some(AssetType::Building), ..Default::default() };
  assert_eq!(s.list_assets(buildings).await.unwrap().len(), 1);
  let repairs = AssetQuery { status: Some(AssetStatus::NeedsRepair), ..Default::default() };
  assert_eq!(s.list_assets(repairs).await.unwrap()[0].id, hall.id);
  assert_eq!(s.list_assets(AssetQuery::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn media_belongs_to_an_asset() {
  let s = store().await;
  let hall = s.create_asset(asset("Parish hall", AssetType::Building)).await.unwrap();
  let media = s.add_asset_media(hall.id, "asset_media/front.jpg".into()).await.unwrap();
  s.add_asset_media(hall.id, "asset_media/back.jpg".into()).await.unwrap();
  assert_eq!(s.list_asset_media(hall.id).await.unwrap().len(), 2);
  assert_eq!(s.get_asset_media(media.id).await.unwrap().unwrap().image, "asset_media/front.jpg");

  s.delete_asset_media(media.id).await.unwrap();
  assert_eq!(s.list_asset_media(hall.id).await.unwrap().len(), 1);

  let err = s
    .add_asset_media(uuid::Uuid::new_v4(), "asset_media/x.jpg".into())
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { entity: "asset", .. }));
}

#[tokio::test]
async fn deleting_asset_cascades() {
  let s = store().await;
  super::current_year(&s, 2025).await;
  let hall = s.create_asset(asset("Parish hall", AssetType::Building)).await.unwrap();
  let media = s.add_asset_media(hall.id, "asset_media/front.jpg".into()).await.unwrap();
  s.create_facility_renting(mkwawa_core::finance::FacilityRentingForm {
    year_id:     None,
    asset_id:    hall.id,
    rentor_name: "Harusi ya Juma".into(),
    amount:      Decimal::from(150_000),
    date_rented: None,
    end_date:    None,
    purpose:     None,
  })
  .await
  .unwrap();

  s.delete_asset(hall.id).await.unwrap();
  assert!(s.get_asset(hall.id).await.unwrap().is_none());
  assert!(s.get_asset_media(media.id).await.unwrap().is_none());
  let rentings = s
    .list_facility_rentings(mkwawa_core::finance::LedgerQuery::default())
    .await
    .unwrap();
  assert!(rentings.is_empty());
}
