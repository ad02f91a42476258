//! Leader records.

use rusqlite::{Connection, OptionalExtension as _, params, types::Value};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError, ids,
  leader::{Leader, LeaderForm, LeaderQuery, LeaderView},
};

use super::{Filters, any_with, require, touched};
use crate::{
  Result,
  encode::{self, decode_uuid, encode_date, encode_dt, encode_uuid},
};

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<LeaderView>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM leaders l JOIN members m ON m.id = l.church_member_id WHERE l.id = ?1",
    encode::LEADER_VIEW_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::leader_view)
}

/// One leader record per member: saving again for the same member updates
/// it in place.
pub(super) fn upsert_leader(conn: &mut Connection, form: LeaderForm) -> Result<Leader> {
  form.validate()?;
  let tx = conn.transaction()?;
  require(&tx, "members", "member", form.church_member_id)?;
  if let Some(outstation) = form.outstation_id {
    require(&tx, "outstations", "outstation", outstation)?;
  }
  let member_key = encode_uuid(form.church_member_id);
  let existing: Option<String> = tx
    .query_row(
      "SELECT id FROM leaders WHERE church_member_id = ?1",
      params![member_key],
      |r| r.get(0),
    )
    .optional()?;

  let id = match existing {
    Some(key) => {
      tx.execute(
        "UPDATE leaders SET occupation = ?2, start_date = ?3, responsibilities = ?4,
           outstation_id = ?5, time_in_service = NULL
         WHERE id = ?1",
        params![
          key,
          form.occupation.to_string(),
          encode_date(form.start_date),
          form.responsibilities.trim(),
          form.outstation_id.map(encode_uuid),
        ],
      )?;
      decode_uuid(&key)?
    }
    None => {
      let mut rng = rand::thread_rng();
      let leader_id = ids::generate_unique(
        "leader id",
        || ids::leader_id(&mut rng),
        |candidate| any_with(&tx, "leaders", "leader_id", candidate),
      )?;
      let id = Uuid::new_v4();
      tx.execute(
        "INSERT INTO leaders (
           id, leader_id, church_member_id, occupation, start_date,
           responsibilities, outstation_id, date_created
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
          encode_uuid(id),
          leader_id,
          member_key,
          form.occupation.to_string(),
          encode_date(form.start_date),
          form.responsibilities.trim(),
          form.outstation_id.map(encode_uuid),
          encode_dt(encode::now()),
        ],
      )?;
      id
    }
  };
  tx.execute("UPDATE members SET is_leader = 1 WHERE id = ?1", params![member_key])?;
  let view = fetch(&tx, id)?.ok_or_else(|| CoreError::not_found("leader", id))?;
  tx.commit()?;
  Ok(view.leader)
}

pub(super) fn get_leader(conn: &mut Connection, id: Uuid) -> Result<Option<LeaderView>> {
  fetch(conn, id)
}

pub(super) fn list_leaders(conn: &mut Connection, query: LeaderQuery) -> Result<Vec<LeaderView>> {
  let mut filters = Filters::default();
  filters.push("m.is_leader = 1", std::iter::empty());
  filters.label("m.status", query.member_status);
  filters.label("m.gender", query.gender);
  filters.label("l.occupation", query.occupation);
  filters.uuid("m.cell_id", query.cell_id);
  if let Some(outstation) = query.outstation_id {
    let key = Value::from(encode_uuid(outstation));
    filters.push(
      "(l.outstation_id = ? OR m.cell_id IN (SELECT id FROM cells WHERE outstation_id = ?))",
      [key.clone(), key],
    );
  }
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM leaders l JOIN members m ON m.id = l.church_member_id{}
     ORDER BY m.full_name",
    encode::LEADER_VIEW_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::leader_view)
}

pub(super) fn save_time_in_service(conn: &mut Connection, id: Uuid, value: &str) -> Result<()> {
  let changed = conn.execute(
    "UPDATE leaders SET time_in_service = ?2 WHERE id = ?1",
    params![encode_uuid(id), value],
  )?;
  touched(changed, "leader", id)
}

pub(super) fn delete_leader(conn: &mut Connection, id: Uuid) -> Result<()> {
  let tx = conn.transaction()?;
  let view = fetch(&tx, id)?.ok_or_else(|| CoreError::not_found("leader", id))?;
  tx.execute("DELETE FROM leaders WHERE id = ?1", params![encode_uuid(id)])?;
  tx.execute(
    "UPDATE members SET is_leader = 0 WHERE id = ?1",
    params![encode_uuid(view.leader.church_member_id)],
  )?;
  tx.commit()?;
  Ok(())
}
