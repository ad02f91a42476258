//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns, plus row decoders for each
//! table.
//!
//! Row decoders take the columns in the order of the matching `*_COLUMNS`
//! constant, so every `SELECT` names its columns through those constants.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use mkwawa_core::{
  asset::{AssetMedia, ChurchAsset},
  finance::{
    DonationItemFund, ExpenseCategory, Expenditure, FacilityRenting, Offering,
    OfferingCategory, Pledge, SpecialContribution,
  },
  leader::{Leader, LeaderView},
  member::ChurchMember,
  notification::{Notification, SentSms},
  sacrament::{Marriage, SacramentFields, Sacramental},
  settings::{Cell, ChurchLocation, OutStation, Year},
};
use rusqlite::Row;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

/// Fixed-width UTC so stored timestamps order lexically.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

/// Parse a label written with the enum's `Display`/`AsRef<str>`.
pub fn decode_label<T: FromStr>(what: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownLabel { what, value: s.to_owned() })
}

fn label<T: FromStr>(row: &Row<'_>, idx: usize, what: &'static str) -> Result<T> {
  let s: String = row.get(idx)?;
  decode_label(what, &s)
}

fn uuid(row: &Row<'_>, idx: usize) -> Result<Uuid> {
  let s: String = row.get(idx)?;
  decode_uuid(&s)
}

fn opt_uuid(row: &Row<'_>, idx: usize) -> Result<Option<Uuid>> {
  decode_opt_uuid(row.get(idx)?)
}

fn dt(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>> {
  let s: String = row.get(idx)?;
  decode_dt(&s)
}

fn date(row: &Row<'_>, idx: usize) -> Result<NaiveDate> {
  let s: String = row.get(idx)?;
  decode_date(&s)
}

fn opt_date(row: &Row<'_>, idx: usize) -> Result<Option<NaiveDate>> {
  decode_opt_date(row.get(idx)?)
}

fn decimal(row: &Row<'_>, idx: usize) -> Result<Decimal> {
  let s: String = row.get(idx)?;
  decode_decimal(&s)
}

/// Run `stmt` and decode every row with `decode`.
pub fn collect<T>(
  stmt: &mut rusqlite::Statement<'_>,
  params: impl rusqlite::Params,
  decode: fn(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
  let mut rows = stmt.query(params)?;
  let mut out = Vec::new();
  while let Some(row) = rows.next()? {
    out.push(decode(row)?);
  }
  Ok(out)
}

/// Decode the first row, if any.
pub fn first<T>(
  stmt: &mut rusqlite::Statement<'_>,
  params: impl rusqlite::Params,
  decode: fn(&Row<'_>) -> Result<T>,
) -> Result<Option<T>> {
  let mut rows = stmt.query(params)?;
  rows.next()?.map(decode).transpose()
}

// ─── Configuration registry ──────────────────────────────────────────────────

pub const YEAR_COLUMNS: &str = "id, year, is_current, date_created";

pub fn year(row: &Row<'_>) -> Result<Year> {
  Ok(Year {
    id:           uuid(row, 0)?,
    year:         row.get(1)?,
    is_current:   row.get(2)?,
    date_created: dt(row, 3)?,
  })
}

pub const OUTSTATION_COLUMNS: &str =
  "id, number, name, description, location, date_created, date_updated";

pub fn outstation(row: &Row<'_>) -> Result<OutStation> {
  Ok(OutStation {
    id:           uuid(row, 0)?,
    number:       row.get(1)?,
    name:         row.get(2)?,
    description:  row.get(3)?,
    location:     row.get(4)?,
    date_created: dt(row, 5)?,
    date_updated: dt(row, 6)?,
  })
}

pub const CELL_COLUMNS: &str =
  "id, number, name, outstation_id, description, location, date_created, date_updated";

pub fn cell(row: &Row<'_>) -> Result<Cell> {
  Ok(Cell {
    id:            uuid(row, 0)?,
    number:        row.get(1)?,
    name:          row.get(2)?,
    outstation_id: uuid(row, 3)?,
    description:   row.get(4)?,
    location:      row.get(5)?,
    date_created:  dt(row, 6)?,
    date_updated:  dt(row, 7)?,
  })
}

pub const LOCATION_COLUMNS: &str =
  "id, latitude, longitude, altitude, is_active, date_created";

pub fn church_location(row: &Row<'_>) -> Result<ChurchLocation> {
  Ok(ChurchLocation {
    id:           uuid(row, 0)?,
    latitude:     row.get(1)?,
    longitude:    row.get(2)?,
    altitude:     row.get(3)?,
    is_active:    row.get(4)?,
    date_created: dt(row, 5)?,
  })
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// Member columns, qualified with the `m` alias, followed by the partner
/// from the member's marriage (if any).
pub const MEMBER_COLUMNS: &str = "
  m.id, m.member_id, m.status, m.full_name, m.date_of_birth, m.gender,
  m.phone_number, m.email, m.address, m.cell_id,
  m.is_baptised, m.date_of_baptism, m.is_confirmed, m.date_confirmed,
  m.marital_status, m.date_of_marriage,
  m.baptism_certificate, m.confirmation_certificate, m.is_leader,
  m.emergency_contact_name, m.emergency_contact_phone, m.passport,
  m.date_created,
  (SELECT CASE WHEN mr.husband_id = m.id THEN mr.wife_id ELSE mr.husband_id END
     FROM marriages mr WHERE mr.husband_id = m.id OR mr.wife_id = m.id)";

pub fn member(row: &Row<'_>) -> Result<ChurchMember> {
  let fields = SacramentFields {
    is_baptised:      row.get(10)?,
    date_of_baptism:  opt_date(row, 11)?,
    is_confirmed:     row.get(12)?,
    date_confirmed:   opt_date(row, 13)?,
    marital_status:   label(row, 14, "marital status")?,
    date_of_marriage: opt_date(row, 15)?,
  };
  let partner = opt_uuid(row, 23)?;
  let mut sacraments = fields.validate()?;
  if let Sacramental::Married { partner: p, .. } = &mut sacraments {
    *p = partner;
  }
  Ok(ChurchMember {
    id: uuid(row, 0)?,
    member_id: row.get(1)?,
    status: label(row, 2, "member status")?,
    full_name: row.get(3)?,
    date_of_birth: date(row, 4)?,
    gender: label(row, 5, "gender")?,
    phone_number: row.get(6)?,
    email: row.get(7)?,
    address: row.get(8)?,
    cell_id: opt_uuid(row, 9)?,
    sacraments,
    marital_status: fields.marital_status,
    baptism_certificate: row.get(16)?,
    confirmation_certificate: row.get(17)?,
    is_leader: row.get(18)?,
    emergency_contact_name: row.get(19)?,
    emergency_contact_phone: row.get(20)?,
    passport: row.get(21)?,
    date_created: dt(row, 22)?,
  })
}

pub const MARRIAGE_COLUMNS: &str = "id, husband_id, wife_id, married_on, date_created";

pub fn marriage(row: &Row<'_>) -> Result<Marriage> {
  Ok(Marriage {
    id:           uuid(row, 0)?,
    husband_id:   uuid(row, 1)?,
    wife_id:      uuid(row, 2)?,
    married_on:   date(row, 3)?,
    date_created: dt(row, 4)?,
  })
}

// ─── Leaders ─────────────────────────────────────────────────────────────────

/// Leader columns (`l` alias) joined with the member (`m` alias).
pub const LEADER_VIEW_COLUMNS: &str = "
  l.id, l.leader_id, l.church_member_id, l.occupation, l.start_date,
  l.responsibilities, l.time_in_service, l.outstation_id, l.date_created,
  m.full_name, m.gender, m.status, m.cell_id";

pub fn leader(row: &Row<'_>) -> Result<Leader> {
  Ok(Leader {
    id:               uuid(row, 0)?,
    leader_id:        row.get(1)?,
    church_member_id: uuid(row, 2)?,
    occupation:       label(row, 3, "occupation")?,
    start_date:       date(row, 4)?,
    responsibilities: row.get(5)?,
    time_in_service:  row.get(6)?,
    outstation_id:    opt_uuid(row, 7)?,
    date_created:     dt(row, 8)?,
  })
}

pub fn leader_view(row: &Row<'_>) -> Result<LeaderView> {
  Ok(LeaderView {
    leader:        leader(row)?,
    full_name:     row.get(9)?,
    gender:        label(row, 10, "gender")?,
    member_status: label(row, 11, "member status")?,
    cell_id:       opt_uuid(row, 12)?,
  })
}

// ─── Assets ──────────────────────────────────────────────────────────────────

pub const ASSET_COLUMNS: &str = "id, name, asset_type, description, acquisition_date, \
                                 quantity, quantity_name, status, value, created_at";

pub fn asset(row: &Row<'_>) -> Result<ChurchAsset> {
  Ok(ChurchAsset {
    id:               uuid(row, 0)?,
    name:             row.get(1)?,
    asset_type:       label(row, 2, "asset type")?,
    description:      row.get(3)?,
    acquisition_date: opt_date(row, 4)?,
    quantity:         row.get(5)?,
    quantity_name:    label(row, 6, "quantity unit")?,
    status:           label(row, 7, "asset status")?,
    value:            decimal(row, 8)?,
    created_at:       dt(row, 9)?,
  })
}

pub const MEDIA_COLUMNS: &str = "id, asset_id, image, uploaded_at";

pub fn asset_media(row: &Row<'_>) -> Result<AssetMedia> {
  Ok(AssetMedia {
    id:          uuid(row, 0)?,
    asset_id:    uuid(row, 1)?,
    image:       row.get(2)?,
    uploaded_at: dt(row, 3)?,
  })
}

// ─── Finance ─────────────────────────────────────────────────────────────────

pub const CATEGORY_COLUMNS: &str = "id, name, description, date_created, date_updated";

pub fn offering_category(row: &Row<'_>) -> Result<OfferingCategory> {
  Ok(OfferingCategory {
    id:           uuid(row, 0)?,
    name:         row.get(1)?,
    description:  row.get(2)?,
    date_created: dt(row, 3)?,
    date_updated: dt(row, 4)?,
  })
}

pub fn expense_category(row: &Row<'_>) -> Result<ExpenseCategory> {
  Ok(ExpenseCategory {
    id:           uuid(row, 0)?,
    name:         row.get(1)?,
    description:  row.get(2)?,
    date_created: dt(row, 3)?,
    date_updated: dt(row, 4)?,
  })
}

/// Offering columns (`o` alias) plus the year value (`y` alias).
pub const OFFERING_COLUMNS: &str = "
  o.id, o.year_id, y.year, o.date_given, o.service_time, o.amount,
  o.collected_by, o.recorded_by, o.mass_name, o.notes, o.category_id,
  o.outstation_id, o.date_created, o.date_updated";

pub fn offering(row: &Row<'_>) -> Result<Offering> {
  Ok(Offering {
    id:            uuid(row, 0)?,
    year_id:       uuid(row, 1)?,
    year:          row.get(2)?,
    date_given:    date(row, 3)?,
    service_time:  label(row, 4, "service time")?,
    amount:        decimal(row, 5)?,
    collected_by:  opt_uuid(row, 6)?,
    recorded_by:   opt_uuid(row, 7)?,
    mass_name:     row.get(8)?,
    notes:         row.get(9)?,
    category_id:   uuid(row, 10)?,
    outstation_id: uuid(row, 11)?,
    date_created:  dt(row, 12)?,
    date_updated:  dt(row, 13)?,
  })
}

/// Facility renting columns (`r` alias) plus the year value.
pub const RENTING_COLUMNS: &str = "
  r.id, r.year_id, y.year, r.asset_id, r.rentor_name, r.amount, r.date_rented,
  r.end_date, r.purpose, r.receipt_id, r.date_created, r.date_updated";

pub fn facility_renting(row: &Row<'_>) -> Result<FacilityRenting> {
  Ok(FacilityRenting {
    id:           uuid(row, 0)?,
    year_id:      uuid(row, 1)?,
    year:         row.get(2)?,
    asset_id:     uuid(row, 3)?,
    rentor_name:  row.get(4)?,
    amount:       decimal(row, 5)?,
    date_rented:  date(row, 6)?,
    end_date:     opt_date(row, 7)?,
    purpose:      row.get(8)?,
    receipt_id:   row.get(9)?,
    date_created: dt(row, 10)?,
    date_updated: dt(row, 11)?,
  })
}

pub const CONTRIBUTION_COLUMNS: &str =
  "id, contribution_type, name, description, date_created, date_updated";

pub fn special_contribution(row: &Row<'_>) -> Result<SpecialContribution> {
  Ok(SpecialContribution {
    id:                uuid(row, 0)?,
    contribution_type: label(row, 1, "contribution type")?,
    name:              row.get(2)?,
    description:       row.get(3)?,
    date_created:      dt(row, 4)?,
    date_updated:      dt(row, 5)?,
  })
}

/// Donation item fund columns (`d` alias) plus the year value.
pub const FUND_COLUMNS: &str = "
  d.id, d.contribution_id, d.year_id, y.year, d.period, d.mass_name, d.amount,
  d.notes, d.date_created, d.date_updated";

pub fn donation_item_fund(row: &Row<'_>) -> Result<DonationItemFund> {
  Ok(DonationItemFund {
    id:              uuid(row, 0)?,
    contribution_id: uuid(row, 1)?,
    year_id:         uuid(row, 2)?,
    year:            row.get(3)?,
    period:          row.get(4)?,
    mass_name:       row.get(5)?,
    amount:          decimal(row, 6)?,
    notes:           row.get(7)?,
    date_created:    dt(row, 8)?,
    date_updated:    dt(row, 9)?,
  })
}

/// Pledge columns (`p` alias) plus the year value.
pub const PLEDGE_COLUMNS: &str = "
  p.id, p.member_id, p.year_id, y.year, p.month, p.date_given,
  p.envelope_number, p.pledge_amount, p.pledge_for_construction,
  p.date_created, p.date_updated";

pub fn pledge(row: &Row<'_>) -> Result<Pledge> {
  Ok(Pledge {
    id:                      uuid(row, 0)?,
    member_id:               uuid(row, 1)?,
    year_id:                 uuid(row, 2)?,
    year:                    row.get(3)?,
    month:                   label(row, 4, "month")?,
    date_given:              date(row, 5)?,
    envelope_number:         row.get(6)?,
    pledge_amount:           decimal(row, 7)?,
    pledge_for_construction: decimal(row, 8)?,
    date_created:            dt(row, 9)?,
    date_updated:            dt(row, 10)?,
  })
}

/// Expenditure columns (`e` alias) plus the year value.
pub const EXPENDITURE_COLUMNS: &str = "
  e.id, e.category_id, e.year_id, y.year, e.month, e.date_taken,
  e.expenditure_amount, e.expenditure_purpose, e.notes, e.receipt,
  e.date_created, e.date_updated";

pub fn expenditure(row: &Row<'_>) -> Result<Expenditure> {
  Ok(Expenditure {
    id:                  uuid(row, 0)?,
    category_id:         uuid(row, 1)?,
    year_id:             uuid(row, 2)?,
    year:                row.get(3)?,
    month:               label(row, 4, "month")?,
    date_taken:          dt(row, 5)?,
    expenditure_amount:  decimal(row, 6)?,
    expenditure_purpose: row.get(7)?,
    notes:               row.get(8)?,
    receipt:             row.get(9)?,
    date_created:        dt(row, 10)?,
    date_updated:        dt(row, 11)?,
  })
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub const NOTIFICATION_COLUMNS: &str =
  "id, title, message, recipient_id, is_read, created_at";

pub fn notification(row: &Row<'_>) -> Result<Notification> {
  Ok(Notification {
    id:           uuid(row, 0)?,
    title:        row.get(1)?,
    message:      row.get(2)?,
    recipient_id: uuid(row, 3)?,
    is_read:      row.get(4)?,
    created_at:   dt(row, 5)?,
  })
}

pub const SMS_COLUMNS: &str =
  "id, recipient_id, phone_number, message, request_id, status, sent_at";

pub fn sent_sms(row: &Row<'_>) -> Result<SentSms> {
  Ok(SentSms {
    id:           uuid(row, 0)?,
    recipient_id: opt_uuid(row, 1)?,
    phone_number: row.get(2)?,
    message:      row.get(3)?,
    request_id:   row.get(4)?,
    status:       label(row, 5, "sms status")?,
    sent_at:      dt(row, 6)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = encode_dt(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
    let b = encode_dt(DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap());
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert!(a.ends_with('Z'));
    assert_eq!(decode_dt(&b).unwrap().timestamp_subsec_micros(), 123_456);
  }

  #[test]
  fn dates_and_decimals() {
    let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    assert_eq!(encode_date(d), "2024-06-15");
    assert_eq!(decode_date("2024-06-15").unwrap(), d);
    let m = decode_decimal("1500.50").unwrap();
    assert_eq!(encode_decimal(m), "1500.50");
  }

  #[test]
  fn unknown_labels_are_reported() {
    let err = decode_label::<mkwawa_core::member::Gender>("gender", "Other").unwrap_err();
    assert!(matches!(err, Error::UnknownLabel { what: "gender", .. }));
  }
}
