//! Church members.

use rusqlite::{Connection, params, types::Value};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError, ids,
  member::{ChurchMember, MemberAttachment, MemberForm, MemberQuery, MemberStatus},
  sacrament::{MaritalStatus, SacramentFields, Sacramental},
};

use super::{Filters, any_with, require};
use crate::{
  Result,
  encode::{self, encode_date, encode_dt, encode_uuid},
};

pub(super) fn fetch(conn: &Connection, id: Uuid) -> Result<Option<ChurchMember>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM members m WHERE m.id = ?1",
    encode::MEMBER_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::member)
}

pub(super) fn load(conn: &Connection, id: Uuid) -> Result<ChurchMember> {
  fetch(conn, id)?.ok_or_else(|| CoreError::not_found("member", id).into())
}

/// Write the sacrament columns of member `id`.
pub(super) fn write_sacraments(conn: &Connection, id: Uuid, fields: &SacramentFields) -> Result<()> {
  conn.execute(
    "UPDATE members SET is_baptised = ?2, date_of_baptism = ?3, is_confirmed = ?4,
       date_confirmed = ?5, marital_status = ?6, date_of_marriage = ?7
     WHERE id = ?1",
    params![
      encode_uuid(id),
      fields.is_baptised,
      fields.date_of_baptism.map(encode_date),
      fields.is_confirmed,
      fields.date_confirmed.map(encode_date),
      fields.marital_status.to_string(),
      fields.date_of_marriage.map(encode_date),
    ],
  )?;
  Ok(())
}

fn check_cell(conn: &Connection, cell: Option<Uuid>) -> Result<()> {
  match cell {
    Some(id) => require(conn, "cells", "cell", id),
    None => Ok(()),
  }
}

pub(super) fn create_member(
  conn: &mut Connection,
  form: MemberForm,
  status: MemberStatus,
) -> Result<ChurchMember> {
  let standing = form.validate()?;
  let fields = standing.to_fields(form.sacraments.marital_status);
  let tx = conn.transaction()?;
  check_cell(&tx, form.cell_id)?;
  let mut rng = rand::thread_rng();
  let member_id = ids::generate_unique(
    "member id",
    || ids::member_id(&mut rng),
    |candidate| any_with(&tx, "members", "member_id", candidate),
  )?;
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO members (
       id, member_id, status, full_name, date_of_birth, gender, phone_number,
       email, address, cell_id, is_leader, emergency_contact_name,
       emergency_contact_phone, date_created
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    params![
      encode_uuid(id),
      member_id,
      status.to_string(),
      form.full_name.trim(),
      encode_date(form.date_of_birth),
      form.gender.to_string(),
      form.phone_number,
      form.email,
      form.address,
      form.cell_id.map(encode_uuid),
      form.is_leader,
      form.emergency_contact_name,
      form.emergency_contact_phone,
      encode_dt(encode::now()),
    ],
  )?;
  write_sacraments(&tx, id, &fields)?;
  let member = load(&tx, id)?;
  tx.commit()?;
  Ok(member)
}

pub(super) fn get_member(conn: &mut Connection, id: Uuid) -> Result<Option<ChurchMember>> {
  fetch(conn, id)
}

pub(super) fn find_member_by_member_id(
  conn: &mut Connection,
  member_id: &str,
) -> Result<Option<ChurchMember>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM members m WHERE m.member_id = ?1",
    encode::MEMBER_COLUMNS
  ))?;
  encode::first(&mut stmt, params![member_id], encode::member)
}

pub(super) fn list_members(conn: &mut Connection, query: MemberQuery) -> Result<Vec<ChurchMember>> {
  let mut filters = Filters::default();
  filters.label("m.status", query.status);
  filters.label("m.gender", query.gender);
  filters.uuid("m.cell_id", query.cell_id);
  if let Some(outstation) = query.outstation_id {
    filters.push(
      "m.cell_id IN (SELECT id FROM cells WHERE outstation_id = ?)",
      [Value::from(encode_uuid(outstation))],
    );
  }
  filters.eq("m.is_leader", query.is_leader);
  filters.eq("m.is_baptised", query.is_baptised);
  filters.eq("m.is_confirmed", query.is_confirmed);
  filters.eq("(m.marital_status = 'Married')", query.is_married);
  if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    let pattern = Value::from(format!("%{text}%"));
    filters.push(
      "(m.full_name LIKE ? OR m.member_id LIKE ? OR m.phone_number LIKE ?)",
      [pattern.clone(), pattern.clone(), pattern],
    );
  }
  let limit = query.limit.map_or(-1, |n| n as i64);
  let offset = query.offset.unwrap_or(0) as i64;
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM members m{} ORDER BY m.full_name, m.member_id LIMIT {limit} OFFSET {offset}",
    encode::MEMBER_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::member)
}

/// A member married to a registered partner keeps that marriage: the form
/// may not change its state or date.
pub(super) fn update_member(
  conn: &mut Connection,
  id: Uuid,
  form: MemberForm,
) -> Result<ChurchMember> {
  let mut standing = form.validate()?;
  let tx = conn.transaction()?;
  let current = load(&tx, id)?;
  check_cell(&tx, form.cell_id)?;

  if let Some(partner) = current.sacraments.partner() {
    if standing.married_on() != current.sacraments.married_on() {
      return Err(
        CoreError::sacrament(
          "a recorded marriage is changed through the marriage ledger, not the member form",
        )
        .into(),
      );
    }
    if let Sacramental::Married { partner: p, .. } = &mut standing {
      *p = Some(partner);
    }
  }
  let fields = standing.to_fields(form.sacraments.marital_status);

  tx.execute(
    "UPDATE members SET full_name = ?2, date_of_birth = ?3, gender = ?4, phone_number = ?5,
       email = ?6, address = ?7, cell_id = ?8,
       is_leader = (?9 OR EXISTS (SELECT 1 FROM leaders WHERE church_member_id = ?1)),
       emergency_contact_name = ?10, emergency_contact_phone = ?11
     WHERE id = ?1",
    params![
      encode_uuid(id),
      form.full_name.trim(),
      encode_date(form.date_of_birth),
      form.gender.to_string(),
      form.phone_number,
      form.email,
      form.address,
      form.cell_id.map(encode_uuid),
      form.is_leader,
      form.emergency_contact_name,
      form.emergency_contact_phone,
    ],
  )?;
  write_sacraments(&tx, id, &fields)?;
  let member = load(&tx, id)?;
  tx.commit()?;
  Ok(member)
}

pub(super) fn set_member_status(
  conn: &mut Connection,
  id: Uuid,
  status: MemberStatus,
) -> Result<(ChurchMember, MemberStatus)> {
  let tx = conn.transaction()?;
  let previous = load(&tx, id)?.status;
  tx.execute(
    "UPDATE members SET status = ?2 WHERE id = ?1",
    params![encode_uuid(id), status.to_string()],
  )?;
  let member = load(&tx, id)?;
  tx.commit()?;
  Ok((member, previous))
}

pub(super) fn attachment_column(attachment: MemberAttachment) -> &'static str {
  match attachment {
    MemberAttachment::Passport => "passport",
    MemberAttachment::BaptismCertificate => "baptism_certificate",
    MemberAttachment::ConfirmationCertificate => "confirmation_certificate",
  }
}

pub(super) fn set_member_attachment(
  conn: &mut Connection,
  id: Uuid,
  attachment: MemberAttachment,
  path: Option<String>,
) -> Result<Option<String>> {
  let tx = conn.transaction()?;
  let member = load(&tx, id)?;
  if path.is_some() {
    match attachment {
      MemberAttachment::BaptismCertificate if !member.sacraments.is_baptised() => {
        return Err(CoreError::sacrament("a baptism certificate needs a recorded baptism").into());
      }
      MemberAttachment::ConfirmationCertificate if !member.sacraments.is_confirmed() => {
        return Err(
          CoreError::sacrament("a confirmation certificate needs a recorded confirmation").into(),
        );
      }
      _ => {}
    }
  }
  let previous = attachment.current(&member).map(str::to_owned);
  tx.execute(
    &format!("UPDATE members SET {} = ?2 WHERE id = ?1", attachment_column(attachment)),
    params![encode_uuid(id), path],
  )?;
  tx.commit()?;
  Ok(previous)
}

/// A recorded partner falls back to `Single` before the marriage row goes
/// with the member.
pub(super) fn delete_member(conn: &mut Connection, id: Uuid) -> Result<Vec<String>> {
  let tx = conn.transaction()?;
  let member = load(&tx, id)?;
  if let Some(partner_id) = member.sacraments.partner() {
    let partner = load(&tx, partner_id)?;
    let standing = partner.sacraments.revoke_marriage()?;
    write_sacraments(&tx, partner_id, &standing.to_fields(MaritalStatus::Single))?;
  }
  tx.execute("DELETE FROM members WHERE id = ?1", params![encode_uuid(id)])?;
  tx.commit()?;
  Ok(
    [member.passport, member.baptism_certificate, member.confirmation_certificate]
      .into_iter()
      .flatten()
      .collect(),
  )
}
