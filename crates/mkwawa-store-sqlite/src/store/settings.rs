//! Years, outstations, cells and the church location.

use rusqlite::{Connection, params};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError, ids,
  settings::{
    Cell, CellForm, ChurchLocation, NewChurchLocation, NewYear, OutStation,
    OutStationForm, Year,
  },
};

use super::{Filters, any_with, exists, require, touched};
use crate::{
  Result,
  encode::{self, encode_dt, encode_uuid},
};

// ─── Years ───────────────────────────────────────────────────────────────────

/// Ledger tables whose rows are filed under a year.
const YEAR_LEDGERS: [&str; 5] = [
  "offerings",
  "facility_rentings",
  "donation_item_funds",
  "pledges",
  "expenditures",
];

fn fetch_year(conn: &Connection, id: Uuid) -> Result<Option<Year>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM years WHERE id = ?1",
    encode::YEAR_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::year)
}

pub(super) fn current_year(conn: &Connection) -> Result<Option<Year>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM years WHERE is_current = 1",
    encode::YEAR_COLUMNS
  ))?;
  encode::first(&mut stmt, [], encode::year)
}

/// The year a ledger record is filed under: `explicit` if it exists, else
/// the current year.
pub(super) fn resolve_year(conn: &Connection, explicit: Option<Uuid>) -> Result<Uuid> {
  match explicit {
    Some(id) => {
      require(conn, "years", "year", id)?;
      Ok(id)
    }
    None => current_year(conn)?
      .map(|y| y.id)
      .ok_or_else(|| CoreError::CurrentYearMissing.into()),
  }
}

pub(super) fn create_year(conn: &mut Connection, input: NewYear) -> Result<Year> {
  let tx = conn.transaction()?;
  if input.is_current {
    tx.execute("UPDATE years SET is_current = 0 WHERE is_current = 1", [])?;
  } else if current_year(&tx)?.is_none() {
    return Err(
      CoreError::SingletonViolation(
        "set a current year before adding other years".into(),
      )
      .into(),
    );
  }
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO years (id, year, is_current, date_created) VALUES (?1, ?2, ?3, ?4)",
    params![encode_uuid(id), input.year, input.is_current, encode_dt(encode::now())],
  )?;
  let year = fetch_year(&tx, id)?.ok_or_else(|| CoreError::not_found("year", id))?;
  tx.commit()?;
  Ok(year)
}

pub(super) fn list_years(conn: &mut Connection) -> Result<Vec<Year>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM years ORDER BY year DESC",
    encode::YEAR_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], encode::year)
}

pub(super) fn set_current_year(conn: &mut Connection, year: i32) -> Result<Year> {
  let tx = conn.transaction()?;
  let target = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {} FROM years WHERE year = ?1",
      encode::YEAR_COLUMNS
    ))?;
    encode::first(&mut stmt, params![year], encode::year)?
  }
  .ok_or_else(|| CoreError::not_found("year", year))?;
  tx.execute("UPDATE years SET is_current = 0 WHERE is_current = 1", [])?;
  tx.execute(
    "UPDATE years SET is_current = 1 WHERE id = ?1",
    params![encode_uuid(target.id)],
  )?;
  tx.commit()?;
  Ok(Year { is_current: true, ..target })
}

pub(super) fn delete_year(conn: &mut Connection, id: Uuid) -> Result<()> {
  let tx = conn.transaction()?;
  let year = fetch_year(&tx, id)?.ok_or_else(|| CoreError::not_found("year", id))?;
  if year.is_current {
    return Err(CoreError::CurrentYearLocked(year.year).into());
  }
  let key = encode_uuid(id);
  for table in YEAR_LEDGERS {
    if any_with(&tx, table, "year_id", &key)? {
      return Err(CoreError::Protected(format!("year {}", year.year)).into());
    }
  }
  tx.execute("DELETE FROM years WHERE id = ?1", params![key])?;
  tx.commit()?;
  Ok(())
}

// ─── Outstations ─────────────────────────────────────────────────────────────

fn fetch_outstation(conn: &Connection, id: Uuid) -> Result<Option<OutStation>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM outstations WHERE id = ?1",
    encode::OUTSTATION_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::outstation)
}

pub(super) fn create_outstation(conn: &mut Connection, form: OutStationForm) -> Result<OutStation> {
  let tx = conn.transaction()?;
  let mut rng = rand::thread_rng();
  let number = ids::generate_unique(
    "outstation number",
    || ids::outstation_number(&mut rng),
    |n| any_with(&tx, "outstations", "number", &n.to_string()),
  )?;
  let id = Uuid::new_v4();
  let now = encode_dt(encode::now());
  tx.execute(
    "INSERT INTO outstations (id, number, name, description, location, date_created, date_updated)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    params![encode_uuid(id), number, form.name.trim(), form.description, form.location, now],
  )?;
  let outstation =
    fetch_outstation(&tx, id)?.ok_or_else(|| CoreError::not_found("outstation", id))?;
  tx.commit()?;
  Ok(outstation)
}

pub(super) fn update_outstation(
  conn: &mut Connection,
  id: Uuid,
  form: OutStationForm,
) -> Result<OutStation> {
  let tx = conn.transaction()?;
  let changed = tx.execute(
    "UPDATE outstations SET name = ?2, description = ?3, location = ?4, date_updated = ?5
     WHERE id = ?1",
    params![
      encode_uuid(id),
      form.name.trim(),
      form.description,
      form.location,
      encode_dt(encode::now())
    ],
  )?;
  touched(changed, "outstation", id)?;
  let outstation =
    fetch_outstation(&tx, id)?.ok_or_else(|| CoreError::not_found("outstation", id))?;
  tx.commit()?;
  Ok(outstation)
}

pub(super) fn get_outstation(conn: &mut Connection, id: Uuid) -> Result<Option<OutStation>> {
  fetch_outstation(conn, id)
}

pub(super) fn list_outstations(conn: &mut Connection) -> Result<Vec<OutStation>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM outstations ORDER BY name",
    encode::OUTSTATION_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], encode::outstation)
}

/// Cells go with the outstation; offerings and evangelists hold it in place.
pub(super) fn delete_outstation(conn: &mut Connection, id: Uuid) -> Result<()> {
  let tx = conn.transaction()?;
  let outstation =
    fetch_outstation(&tx, id)?.ok_or_else(|| CoreError::not_found("outstation", id))?;
  let key = encode_uuid(id);
  let evangelists: i64 = tx.query_row(
    "SELECT COUNT(*) FROM leaders WHERE outstation_id = ?1 AND occupation = 'Evangelist'",
    params![key],
    |r| r.get(0),
  )?;
  if evangelists > 0 || any_with(&tx, "offerings", "outstation_id", &key)? {
    return Err(CoreError::Protected(format!("outstation {}", outstation.name)).into());
  }
  tx.execute("DELETE FROM outstations WHERE id = ?1", params![key])?;
  tx.commit()?;
  Ok(())
}

// ─── Cells ───────────────────────────────────────────────────────────────────

fn fetch_cell(conn: &Connection, id: Uuid) -> Result<Option<Cell>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM cells WHERE id = ?1",
    encode::CELL_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::cell)
}

pub(super) fn create_cell(conn: &mut Connection, form: CellForm) -> Result<Cell> {
  let tx = conn.transaction()?;
  require(&tx, "outstations", "outstation", form.outstation_id)?;
  let mut rng = rand::thread_rng();
  let number = ids::generate_unique(
    "cell number",
    || ids::cell_number(&mut rng),
    |n| any_with(&tx, "cells", "number", &n.to_string()),
  )?;
  let id = Uuid::new_v4();
  let now = encode_dt(encode::now());
  tx.execute(
    "INSERT INTO cells (id, number, name, outstation_id, description, location, date_created, date_updated)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    params![
      encode_uuid(id),
      number,
      form.name.trim(),
      encode_uuid(form.outstation_id),
      form.description,
      form.location,
      now
    ],
  )?;
  let cell = fetch_cell(&tx, id)?.ok_or_else(|| CoreError::not_found("cell", id))?;
  tx.commit()?;
  Ok(cell)
}

pub(super) fn update_cell(conn: &mut Connection, id: Uuid, form: CellForm) -> Result<Cell> {
  let tx = conn.transaction()?;
  require(&tx, "outstations", "outstation", form.outstation_id)?;
  let changed = tx.execute(
    "UPDATE cells SET name = ?2, outstation_id = ?3, description = ?4, location = ?5,
       date_updated = ?6
     WHERE id = ?1",
    params![
      encode_uuid(id),
      form.name.trim(),
      encode_uuid(form.outstation_id),
      form.description,
      form.location,
      encode_dt(encode::now())
    ],
  )?;
  touched(changed, "cell", id)?;
  let cell = fetch_cell(&tx, id)?.ok_or_else(|| CoreError::not_found("cell", id))?;
  tx.commit()?;
  Ok(cell)
}

pub(super) fn get_cell(conn: &mut Connection, id: Uuid) -> Result<Option<Cell>> {
  fetch_cell(conn, id)
}

pub(super) fn list_cells(conn: &mut Connection, outstation_id: Option<Uuid>) -> Result<Vec<Cell>> {
  let mut filters = Filters::default();
  filters.uuid("outstation_id", outstation_id);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM cells{} ORDER BY name",
    encode::CELL_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::cell)
}

pub(super) fn delete_cell(conn: &mut Connection, id: Uuid) -> Result<()> {
  let changed = conn.execute("DELETE FROM cells WHERE id = ?1", params![encode_uuid(id)])?;
  touched(changed, "cell", id)
}

// ─── Church location ─────────────────────────────────────────────────────────

fn fetch_location(conn: &Connection, id: Uuid) -> Result<Option<ChurchLocation>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM church_locations WHERE id = ?1",
    encode::LOCATION_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::church_location)
}

fn insert_active(conn: &Connection, input: NewChurchLocation) -> Result<ChurchLocation> {
  let id = Uuid::new_v4();
  conn.execute(
    "INSERT INTO church_locations (id, latitude, longitude, altitude, is_active, date_created)
     VALUES (?1, ?2, ?3, ?4, 1, ?5)",
    params![
      encode_uuid(id),
      input.latitude,
      input.longitude,
      input.altitude,
      encode_dt(encode::now())
    ],
  )?;
  fetch_location(conn, id)?.ok_or_else(|| CoreError::not_found("church location", id).into())
}

pub(super) fn replace_church_location(
  conn: &mut Connection,
  input: NewChurchLocation,
) -> Result<ChurchLocation> {
  let tx = conn.transaction()?;
  tx.execute("UPDATE church_locations SET is_active = 0 WHERE is_active = 1", [])?;
  let location = insert_active(&tx, input)?;
  tx.commit()?;
  Ok(location)
}

pub(super) fn insert_church_location(
  conn: &mut Connection,
  input: NewChurchLocation,
) -> Result<ChurchLocation> {
  let tx = conn.transaction()?;
  if active_church_location(&tx)?.is_some() {
    return Err(
      CoreError::SingletonViolation("an active church location already exists".into()).into(),
    );
  }
  let location = insert_active(&tx, input)?;
  tx.commit()?;
  Ok(location)
}

pub(super) fn set_church_location_altitude(
  conn: &mut Connection,
  id: Uuid,
  altitude: f64,
) -> Result<ChurchLocation> {
  let tx = conn.transaction()?;
  let changed = tx.execute(
    "UPDATE church_locations SET altitude = ?2 WHERE id = ?1",
    params![encode_uuid(id), altitude],
  )?;
  touched(changed, "church location", id)?;
  let location =
    fetch_location(&tx, id)?.ok_or_else(|| CoreError::not_found("church location", id))?;
  tx.commit()?;
  Ok(location)
}

pub(super) fn activate_church_location(conn: &mut Connection, id: Uuid) -> Result<ChurchLocation> {
  let tx = conn.transaction()?;
  require(&tx, "church_locations", "church location", id)?;
  tx.execute("UPDATE church_locations SET is_active = 0 WHERE is_active = 1", [])?;
  tx.execute(
    "UPDATE church_locations SET is_active = 1 WHERE id = ?1",
    params![encode_uuid(id)],
  )?;
  let location =
    fetch_location(&tx, id)?.ok_or_else(|| CoreError::not_found("church location", id))?;
  tx.commit()?;
  Ok(location)
}

pub(super) fn active_church_location(conn: &Connection) -> Result<Option<ChurchLocation>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM church_locations WHERE is_active = 1",
    encode::LOCATION_COLUMNS
  ))?;
  encode::first(&mut stmt, [], encode::church_location)
}

pub(super) fn list_church_locations(conn: &mut Connection) -> Result<Vec<ChurchLocation>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM church_locations ORDER BY date_created DESC",
    encode::LOCATION_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], encode::church_location)
}

pub(super) fn delete_church_location(conn: &mut Connection, id: Uuid) -> Result<()> {
  if !exists(conn, "church_locations", id)? {
    return Err(CoreError::not_found("church location", id).into());
  }
  conn.execute(
    "DELETE FROM church_locations WHERE id = ?1",
    params![encode_uuid(id)],
  )?;
  Ok(())
}
