//! Baptism, confirmation and marriage.
//!
//! A marriage touches two member rows and the `marriages` table; all three
//! change in one transaction so both partners always agree.

use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError,
  member::{ChurchMember, MemberAttachment, MemberStatus},
  sacrament::{
    self, Marriage, MarriageParties, NewMarriage, Revocation, Sacramental,
  },
};

use super::members::{attachment_column, load, write_sacraments};
use crate::{
  Result,
  encode::{self, encode_date, encode_dt, encode_uuid},
};

const PARTIES_QUERY: &str = "
  SELECT mr.id, mr.husband_id, mr.wife_id, mr.married_on, mr.date_created,
         h.full_name, w.full_name
    FROM marriages mr
    JOIN members h ON h.id = mr.husband_id
    JOIN members w ON w.id = mr.wife_id";

fn parties(row: &Row<'_>) -> Result<MarriageParties> {
  Ok(MarriageParties {
    marriage:     encode::marriage(row)?,
    husband_name: row.get(5)?,
    wife_name:    row.get(6)?,
  })
}

fn fetch_marriage(conn: &Connection, id: Uuid) -> Result<Option<Marriage>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM marriages WHERE id = ?1",
    encode::MARRIAGE_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::marriage)
}

/// Apply `next` to an active member and, when given, point the matching
/// certificate at `certificate`. Returns the member and the certificate path
/// that was replaced.
fn register(
  conn: &mut Connection,
  id: Uuid,
  attachment: MemberAttachment,
  certificate: Option<String>,
  next: impl FnOnce(Sacramental) -> mkwawa_core::Result<Sacramental>,
) -> Result<(ChurchMember, Option<String>)> {
  let tx = conn.transaction()?;
  let member = load(&tx, id)?;
  if member.status != MemberStatus::Active {
    return Err(
      CoreError::sacrament(format!("{} is not an active member", member.full_name)).into(),
    );
  }
  let standing = next(member.sacraments)?;
  write_sacraments(&tx, id, &standing.to_fields(member.marital_status))?;
  let mut replaced = None;
  if let Some(path) = certificate {
    replaced = attachment.current(&member).map(str::to_owned);
    tx.execute(
      &format!("UPDATE members SET {} = ?2 WHERE id = ?1", attachment_column(attachment)),
      params![encode_uuid(id), path],
    )?;
  }
  let member = load(&tx, id)?;
  tx.commit()?;
  Ok((member, replaced))
}

pub(super) fn register_baptism(
  conn: &mut Connection,
  id: Uuid,
  on: NaiveDate,
  certificate: Option<String>,
) -> Result<(ChurchMember, Option<String>)> {
  register(conn, id, MemberAttachment::BaptismCertificate, certificate, |s| s.baptise(on))
}

pub(super) fn register_confirmation(
  conn: &mut Connection,
  id: Uuid,
  on: NaiveDate,
  certificate: Option<String>,
) -> Result<(ChurchMember, Option<String>)> {
  register(conn, id, MemberAttachment::ConfirmationCertificate, certificate, |s| s.confirm(on))
}

pub(super) fn register_marriage(conn: &mut Connection, input: NewMarriage) -> Result<Marriage> {
  let tx = conn.transaction()?;
  let husband = load(&tx, input.husband_id)?;
  let wife = load(&tx, input.wife_id)?;
  sacrament::check_marriage_parties(&husband, &wife)?;

  let husband_next = husband.sacraments.marry(input.married_on, Some(wife.id))?;
  let wife_next = wife.sacraments.marry(input.married_on, Some(husband.id))?;
  write_sacraments(&tx, husband.id, &husband_next.to_fields(husband.marital_status))?;
  write_sacraments(&tx, wife.id, &wife_next.to_fields(wife.marital_status))?;

  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO marriages (id, husband_id, wife_id, married_on, date_created)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      encode_uuid(id),
      encode_uuid(husband.id),
      encode_uuid(wife.id),
      encode_date(input.married_on),
      encode_dt(encode::now()),
    ],
  )?;
  let marriage = fetch_marriage(&tx, id)?.ok_or_else(|| CoreError::not_found("marriage", id))?;
  tx.commit()?;
  Ok(marriage)
}

pub(super) fn update_marriage_date(
  conn: &mut Connection,
  id: Uuid,
  on: NaiveDate,
) -> Result<Marriage> {
  let tx = conn.transaction()?;
  let marriage = fetch_marriage(&tx, id)?.ok_or_else(|| CoreError::not_found("marriage", id))?;
  for party in [marriage.husband_id, marriage.wife_id] {
    let member = load(&tx, party)?;
    let next = member.sacraments.redate_marriage(on)?;
    write_sacraments(&tx, party, &next.to_fields(member.marital_status))?;
  }
  tx.execute(
    "UPDATE marriages SET married_on = ?2 WHERE id = ?1",
    params![encode_uuid(id), encode_date(on)],
  )?;
  tx.commit()?;
  Ok(Marriage { married_on: on, ..marriage })
}

/// Apply a revocation to member `id`. Certificates for sacraments the member
/// no longer holds are cleared, and a dissolved marriage returns the partner
/// to `Single` as well.
fn revoke(
  conn: &mut Connection,
  id: Uuid,
  next: fn(Sacramental) -> mkwawa_core::Result<Sacramental>,
) -> Result<Revocation> {
  let tx = conn.transaction()?;
  let member = load(&tx, id)?;
  let standing = next(member.sacraments)?;

  let mut removed_files = Vec::new();
  if !standing.is_baptised()
    && let Some(path) = &member.baptism_certificate
  {
    removed_files.push(path.clone());
    tx.execute(
      "UPDATE members SET baptism_certificate = NULL WHERE id = ?1",
      params![encode_uuid(id)],
    )?;
  }
  if !standing.is_confirmed()
    && let Some(path) = &member.confirmation_certificate
  {
    removed_files.push(path.clone());
    tx.execute(
      "UPDATE members SET confirmation_certificate = NULL WHERE id = ?1",
      params![encode_uuid(id)],
    )?;
  }

  let dissolved = member.sacraments.is_married() && !standing.is_married();
  let partner = if dissolved { member.sacraments.partner() } else { None };
  if let Some(partner_id) = partner {
    let other = load(&tx, partner_id)?;
    let other_next = other.sacraments.revoke_marriage()?;
    write_sacraments(&tx, partner_id, &other_next.to_fields(other.marital_status))?;
  }
  if dissolved {
    tx.execute(
      "DELETE FROM marriages WHERE husband_id = ?1 OR wife_id = ?1",
      params![encode_uuid(id)],
    )?;
  }
  write_sacraments(&tx, id, &standing.to_fields(member.marital_status))?;

  let member = load(&tx, id)?;
  tx.commit()?;
  Ok(Revocation { member, partner, removed_files })
}

pub(super) fn revoke_baptism(conn: &mut Connection, id: Uuid) -> Result<Revocation> {
  revoke(conn, id, Sacramental::revoke_baptism)
}

pub(super) fn revoke_confirmation(conn: &mut Connection, id: Uuid) -> Result<Revocation> {
  revoke(conn, id, Sacramental::revoke_confirmation)
}

pub(super) fn revoke_marriage(conn: &mut Connection, id: Uuid) -> Result<Revocation> {
  revoke(conn, id, Sacramental::revoke_marriage)
}

pub(super) fn get_marriage_for(
  conn: &mut Connection,
  member: Uuid,
) -> Result<Option<MarriageParties>> {
  let mut stmt = conn.prepare(&format!(
    "{PARTIES_QUERY} WHERE mr.husband_id = ?1 OR mr.wife_id = ?1"
  ))?;
  encode::first(&mut stmt, params![encode_uuid(member)], parties)
}

pub(super) fn list_marriages(conn: &mut Connection) -> Result<Vec<MarriageParties>> {
  let mut stmt = conn.prepare(&format!("{PARTIES_QUERY} ORDER BY mr.married_on DESC"))?;
  encode::collect(&mut stmt, [], parties)
}
