//! Church assets and their photographs.

use rusqlite::{Connection, params};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError,
  asset::{AssetForm, AssetMedia, AssetQuery, ChurchAsset},
};

use super::{Filters, require, touched};
use crate::{
  Result,
  encode::{self, encode_date, encode_decimal, encode_dt, encode_uuid},
};

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<ChurchAsset>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM assets WHERE id = ?1",
    encode::ASSET_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::asset)
}

pub(super) fn create_asset(conn: &mut Connection, form: AssetForm) -> Result<ChurchAsset> {
  let id = Uuid::new_v4();
  conn.execute(
    "INSERT INTO assets (
       id, name, asset_type, description, acquisition_date, quantity,
       quantity_name, status, value, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    params![
      encode_uuid(id),
      form.name.trim(),
      form.asset_type.to_string(),
      form.description,
      form.acquisition_date.map(encode_date),
      form.quantity,
      form.quantity_name.to_string(),
      form.status.to_string(),
      encode_decimal(form.value),
      encode_dt(encode::now()),
    ],
  )?;
  fetch(conn, id)?.ok_or_else(|| CoreError::not_found("asset", id).into())
}

pub(super) fn update_asset(conn: &mut Connection, id: Uuid, form: AssetForm) -> Result<ChurchAsset> {
  let changed = conn.execute(
    "UPDATE assets SET name = ?2, asset_type = ?3, description = ?4,
       acquisition_date = ?5, quantity = ?6, quantity_name = ?7, status = ?8,
       value = ?9
     WHERE id = ?1",
    params![
      encode_uuid(id),
      form.name.trim(),
      form.asset_type.to_string(),
      form.description,
      form.acquisition_date.map(encode_date),
      form.quantity,
      form.quantity_name.to_string(),
      form.status.to_string(),
      encode_decimal(form.value),
    ],
  )?;
  touched(changed, "asset", id)?;
  fetch(conn, id)?.ok_or_else(|| CoreError::not_found("asset", id).into())
}

pub(super) fn get_asset(conn: &mut Connection, id: Uuid) -> Result<Option<ChurchAsset>> {
  fetch(conn, id)
}

pub(super) fn list_assets(conn: &mut Connection, query: AssetQuery) -> Result<Vec<ChurchAsset>> {
  let mut filters = Filters::default();
  filters.label("asset_type", query.asset_type);
  filters.label("status", query.status);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM assets{} ORDER BY name",
    encode::ASSET_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::asset)
}

/// Media records and facility rentings cascade with the asset.
pub(super) fn delete_asset(conn: &mut Connection, id: Uuid) -> Result<()> {
  let changed = conn.execute("DELETE FROM assets WHERE id = ?1", params![encode_uuid(id)])?;
  touched(changed, "asset", id)
}

fn fetch_media(conn: &Connection, id: Uuid) -> Result<Option<AssetMedia>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM asset_media WHERE id = ?1",
    encode::MEDIA_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::asset_media)
}

pub(super) fn add_asset_media(conn: &mut Connection, asset: Uuid, image: String) -> Result<AssetMedia> {
  let tx = conn.transaction()?;
  require(&tx, "assets", "asset", asset)?;
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO asset_media (id, asset_id, image, uploaded_at) VALUES (?1, ?2, ?3, ?4)",
    params![encode_uuid(id), encode_uuid(asset), image, encode_dt(encode::now())],
  )?;
  let media = fetch_media(&tx, id)?.ok_or_else(|| CoreError::not_found("asset media", id))?;
  tx.commit()?;
  Ok(media)
}

pub(super) fn get_asset_media(conn: &mut Connection, id: Uuid) -> Result<Option<AssetMedia>> {
  fetch_media(conn, id)
}

pub(super) fn list_asset_media(conn: &mut Connection, asset: Uuid) -> Result<Vec<AssetMedia>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM asset_media WHERE asset_id = ?1 ORDER BY uploaded_at",
    encode::MEDIA_COLUMNS
  ))?;
  encode::collect(&mut stmt, params![encode_uuid(asset)], encode::asset_media)
}

pub(super) fn delete_asset_media(conn: &mut Connection, id: Uuid) -> Result<()> {
  let changed = conn.execute("DELETE FROM asset_media WHERE id = ?1", params![encode_uuid(id)])?;
  touched(changed, "asset media", id)
}
