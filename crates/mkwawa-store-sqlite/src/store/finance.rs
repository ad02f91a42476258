//! The finance ledger: offerings, facility rentings, special contributions
//! with their donation item funds, pledges and expenditures.
//!
//! Records without an explicit year are filed under the current year, and
//! creating one while no year is current fails with `CurrentYearMissing`.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Row, params, types::Value};
use uuid::Uuid;

use mkwawa_core::{
  Error as CoreError, ids,
  finance::{
    CategoryForm, DonationItemFund, DonationItemFundForm, ExpenseCategory,
    Expenditure, ExpenditureForm, FacilityRenting, FacilityRentingForm,
    LedgerQuery, Month, Offering, OfferingCategory, OfferingForm, Pledge, PledgeForm,
    SpecialContribution, SpecialContributionForm,
  },
};

use super::{Filters, any_with, require, settings::resolve_year, touched};
use crate::{
  Result,
  encode::{self, encode_date, encode_decimal, encode_dt, encode_uuid},
};

type Decode<T> = fn(&Row<'_>) -> Result<T>;

/// Filter `column`, a date or timestamp, to one calendar month.
fn month_of(filters: &mut Filters, column: &str, month: Option<Month>) {
  if let Some(m) = month {
    filters.push(
      format!("substr({column}, 6, 2) = ?"),
      [Value::from(format!("{:02}", m.number()))],
    );
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

fn fetch_category<T>(conn: &Connection, table: &str, id: Uuid, decode: Decode<T>) -> Result<Option<T>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM {table} WHERE id = ?1",
    encode::CATEGORY_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], decode)
}

fn create_category<T>(
  conn: &mut Connection,
  table: &str,
  form: CategoryForm,
  decode: Decode<T>,
) -> Result<T> {
  let id = Uuid::new_v4();
  conn.execute(
    &format!(
      "INSERT INTO {table} (id, name, description, date_created, date_updated)
       VALUES (?1, ?2, ?3, ?4, ?4)"
    ),
    params![encode_uuid(id), form.name.trim(), form.description, encode_dt(encode::now())],
  )?;
  fetch_category(conn, table, id, decode)?
    .ok_or_else(|| CoreError::not_found("category", id).into())
}

fn update_category<T>(
  conn: &mut Connection,
  table: &str,
  id: Uuid,
  form: CategoryForm,
  decode: Decode<T>,
) -> Result<T> {
  let changed = conn.execute(
    &format!("UPDATE {table} SET name = ?2, description = ?3, date_updated = ?4 WHERE id = ?1"),
    params![encode_uuid(id), form.name.trim(), form.description, encode_dt(encode::now())],
  )?;
  touched(changed, "category", id)?;
  fetch_category(conn, table, id, decode)?
    .ok_or_else(|| CoreError::not_found("category", id).into())
}

fn list_categories<T>(conn: &mut Connection, table: &str, decode: Decode<T>) -> Result<Vec<T>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM {table} ORDER BY name",
    encode::CATEGORY_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], decode)
}

fn delete_by_id(conn: &mut Connection, table: &str, entity: &'static str, id: Uuid) -> Result<()> {
  let changed = conn.execute(
    &format!("DELETE FROM {table} WHERE id = ?1"),
    params![encode_uuid(id)],
  )?;
  touched(changed, entity, id)
}

pub(super) fn create_offering_category(
  conn: &mut Connection,
  form: CategoryForm,
) -> Result<OfferingCategory> {
  create_category(conn, "offering_categories", form, encode::offering_category)
}

pub(super) fn update_offering_category(
  conn: &mut Connection,
  id: Uuid,
  form: CategoryForm,
) -> Result<OfferingCategory> {
  update_category(conn, "offering_categories", id, form, encode::offering_category)
}

pub(super) fn list_offering_categories(conn: &mut Connection) -> Result<Vec<OfferingCategory>> {
  list_categories(conn, "offering_categories", encode::offering_category)
}

/// Cascades to the category's offerings.
pub(super) fn delete_offering_category(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "offering_categories", "offering category", id)
}

pub(super) fn create_expense_category(
  conn: &mut Connection,
  form: CategoryForm,
) -> Result<ExpenseCategory> {
  create_category(conn, "expense_categories", form, encode::expense_category)
}

pub(super) fn update_expense_category(
  conn: &mut Connection,
  id: Uuid,
  form: CategoryForm,
) -> Result<ExpenseCategory> {
  update_category(conn, "expense_categories", id, form, encode::expense_category)
}

pub(super) fn list_expense_categories(conn: &mut Connection) -> Result<Vec<ExpenseCategory>> {
  list_categories(conn, "expense_categories", encode::expense_category)
}

pub(super) fn delete_expense_category(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "expense_categories", "expense category", id)
}

// ─── Offerings ───────────────────────────────────────────────────────────────

fn fetch_offering(conn: &Connection, id: Uuid) -> Result<Option<Offering>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM offerings o JOIN years y ON y.id = o.year_id WHERE o.id = ?1",
    encode::OFFERING_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::offering)
}

/// References an offering names must resolve. Only a church leader may be
/// recorded as the one who entered it.
fn check_offering_refs(conn: &Connection, form: &OfferingForm) -> Result<()> {
  require(conn, "offering_categories", "offering category", form.category_id)?;
  require(conn, "outstations", "outstation", form.outstation_id)?;
  if let Some(collector) = form.collected_by {
    require(conn, "members", "member", collector)?;
  }
  if let Some(recorder) = form.recorded_by {
    let is_leader: Option<bool> = conn
      .query_row(
        "SELECT is_leader FROM members WHERE id = ?1",
        params![encode_uuid(recorder)],
        |r| r.get(0),
      )
      .optional()?;
    match is_leader {
      None => return Err(CoreError::not_found("member", recorder).into()),
      Some(false) => {
        return Err(CoreError::validation("recorded_by", "must be a church leader").into());
      }
      Some(true) => {}
    }
  }
  Ok(())
}

pub(super) fn create_offering(conn: &mut Connection, form: OfferingForm) -> Result<Offering> {
  let tx = conn.transaction()?;
  let year_id = resolve_year(&tx, form.year_id)?;
  check_offering_refs(&tx, &form)?;
  let id = Uuid::new_v4();
  let now = encode_dt(encode::now());
  let date_given = form.date_given.unwrap_or_else(|| Utc::now().date_naive());
  tx.execute(
    "INSERT INTO offerings (
       id, year_id, date_given, service_time, amount, collected_by, recorded_by,
       mass_name, notes, category_id, outstation_id, date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      encode_date(date_given),
      form.service_time.to_string(),
      encode_decimal(form.amount),
      form.collected_by.map(encode_uuid),
      form.recorded_by.map(encode_uuid),
      form.mass_name.trim(),
      form.notes,
      encode_uuid(form.category_id),
      encode_uuid(form.outstation_id),
      now,
    ],
  )?;
  let offering = fetch_offering(&tx, id)?.ok_or_else(|| CoreError::not_found("offering", id))?;
  tx.commit()?;
  Ok(offering)
}

/// A missing year or date keeps the stored one.
pub(super) fn update_offering(conn: &mut Connection, id: Uuid, form: OfferingForm) -> Result<Offering> {
  let tx = conn.transaction()?;
  let current = fetch_offering(&tx, id)?.ok_or_else(|| CoreError::not_found("offering", id))?;
  let year_id = match form.year_id {
    Some(_) => resolve_year(&tx, form.year_id)?,
    None => current.year_id,
  };
  check_offering_refs(&tx, &form)?;
  tx.execute(
    "UPDATE offerings SET year_id = ?2, date_given = ?3, service_time = ?4, amount = ?5,
       collected_by = ?6, recorded_by = ?7, mass_name = ?8, notes = ?9,
       category_id = ?10, outstation_id = ?11, date_updated = ?12
     WHERE id = ?1",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      encode_date(form.date_given.unwrap_or(current.date_given)),
      form.service_time.to_string(),
      encode_decimal(form.amount),
      form.collected_by.map(encode_uuid),
      form.recorded_by.map(encode_uuid),
      form.mass_name.trim(),
      form.notes,
      encode_uuid(form.category_id),
      encode_uuid(form.outstation_id),
      encode_dt(encode::now()),
    ],
  )?;
  let offering = fetch_offering(&tx, id)?.ok_or_else(|| CoreError::not_found("offering", id))?;
  tx.commit()?;
  Ok(offering)
}

pub(super) fn list_offerings(conn: &mut Connection, query: LedgerQuery) -> Result<Vec<Offering>> {
  let mut filters = Filters::default();
  filters.eq("y.year", query.year);
  month_of(&mut filters, "o.date_given", query.month);
  filters.uuid("o.category_id", query.category_id);
  filters.uuid("o.outstation_id", query.outstation_id);
  if let Some(member) = query.member_id {
    let key = Value::from(encode_uuid(member));
    filters.push("(o.collected_by = ? OR o.recorded_by = ?)", [key.clone(), key]);
  }
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM offerings o JOIN years y ON y.id = o.year_id{}
     ORDER BY o.date_given DESC, o.date_created DESC",
    encode::OFFERING_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::offering)
}

pub(super) fn delete_offering(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "offerings", "offering", id)
}

// ─── Facility rentings ───────────────────────────────────────────────────────

fn fetch_renting(conn: &Connection, id: Uuid) -> Result<Option<FacilityRenting>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM facility_rentings r JOIN years y ON y.id = r.year_id WHERE r.id = ?1",
    encode::RENTING_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::facility_renting)
}

/// The rented asset must exist and be of a rentable type.
fn check_rentable(conn: &Connection, asset: Uuid) -> Result<()> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM assets WHERE id = ?1",
    encode::ASSET_COLUMNS
  ))?;
  let asset = encode::first(&mut stmt, params![encode_uuid(asset)], encode::asset)?
    .ok_or_else(|| CoreError::not_found("asset", asset))?;
  if !asset.asset_type.is_rentable() {
    return Err(
      CoreError::validation(
        "asset_id",
        format!("{} assets cannot be rented", asset.asset_type),
      )
      .into(),
    );
  }
  Ok(())
}

pub(super) fn create_facility_renting(
  conn: &mut Connection,
  form: FacilityRentingForm,
) -> Result<FacilityRenting> {
  let tx = conn.transaction()?;
  let year_id = resolve_year(&tx, form.year_id)?;
  check_rentable(&tx, form.asset_id)?;
  let mut rng = rand::thread_rng();
  let receipt_id = ids::generate_unique(
    "receipt id",
    || ids::receipt_id(&mut rng),
    |candidate| any_with(&tx, "facility_rentings", "receipt_id", candidate),
  )?;
  let id = Uuid::new_v4();
  let date_rented = form.date_rented.unwrap_or_else(|| Utc::now().date_naive());
  tx.execute(
    "INSERT INTO facility_rentings (
       id, year_id, asset_id, rentor_name, amount, date_rented, end_date,
       purpose, receipt_id, date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      encode_uuid(form.asset_id),
      form.rentor_name.trim(),
      encode_decimal(form.amount),
      encode_date(date_rented),
      form.end_date.map(encode_date),
      form.purpose,
      receipt_id,
      encode_dt(encode::now()),
    ],
  )?;
  let renting =
    fetch_renting(&tx, id)?.ok_or_else(|| CoreError::not_found("facility renting", id))?;
  tx.commit()?;
  Ok(renting)
}

/// The receipt ID never changes.
pub(super) fn update_facility_renting(
  conn: &mut Connection,
  id: Uuid,
  form: FacilityRentingForm,
) -> Result<FacilityRenting> {
  let tx = conn.transaction()?;
  let current =
    fetch_renting(&tx, id)?.ok_or_else(|| CoreError::not_found("facility renting", id))?;
  let year_id = match form.year_id {
    Some(_) => resolve_year(&tx, form.year_id)?,
    None => current.year_id,
  };
  check_rentable(&tx, form.asset_id)?;
  let date_rented = form.date_rented.unwrap_or(current.date_rented);
  if let Some(end) = form.end_date
    && end < date_rented
  {
    return Err(CoreError::validation("end_date", "end date precedes the rental date").into());
  }
  tx.execute(
    "UPDATE facility_rentings SET year_id = ?2, asset_id = ?3, rentor_name = ?4,
       amount = ?5, date_rented = ?6, end_date = ?7, purpose = ?8, date_updated = ?9
     WHERE id = ?1",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      encode_uuid(form.asset_id),
      form.rentor_name.trim(),
      encode_decimal(form.amount),
      encode_date(date_rented),
      form.end_date.map(encode_date),
      form.purpose,
      encode_dt(encode::now()),
    ],
  )?;
  let renting =
    fetch_renting(&tx, id)?.ok_or_else(|| CoreError::not_found("facility renting", id))?;
  tx.commit()?;
  Ok(renting)
}

pub(super) fn list_facility_rentings(
  conn: &mut Connection,
  query: LedgerQuery,
) -> Result<Vec<FacilityRenting>> {
  let mut filters = Filters::default();
  filters.eq("y.year", query.year);
  month_of(&mut filters, "r.date_rented", query.month);
  filters.uuid("r.asset_id", query.asset_id);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM facility_rentings r JOIN years y ON y.id = r.year_id{}
     ORDER BY r.date_rented DESC, r.date_created DESC",
    encode::RENTING_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::facility_renting)
}

pub(super) fn delete_facility_renting(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "facility_rentings", "facility renting", id)
}

// ─── Special contributions ───────────────────────────────────────────────────

fn fetch_contribution(conn: &Connection, id: Uuid) -> Result<Option<SpecialContribution>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM special_contributions WHERE id = ?1",
    encode::CONTRIBUTION_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::special_contribution)
}

pub(super) fn create_special_contribution(
  conn: &mut Connection,
  form: SpecialContributionForm,
) -> Result<SpecialContribution> {
  let id = Uuid::new_v4();
  conn.execute(
    "INSERT INTO special_contributions (
       id, contribution_type, name, description, date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    params![
      encode_uuid(id),
      form.contribution_type.to_string(),
      form.name.trim(),
      form.description,
      encode_dt(encode::now()),
    ],
  )?;
  fetch_contribution(conn, id)?
    .ok_or_else(|| CoreError::not_found("special contribution", id).into())
}

pub(super) fn update_special_contribution(
  conn: &mut Connection,
  id: Uuid,
  form: SpecialContributionForm,
) -> Result<SpecialContribution> {
  let changed = conn.execute(
    "UPDATE special_contributions SET contribution_type = ?2, name = ?3, description = ?4,
       date_updated = ?5
     WHERE id = ?1",
    params![
      encode_uuid(id),
      form.contribution_type.to_string(),
      form.name.trim(),
      form.description,
      encode_dt(encode::now()),
    ],
  )?;
  touched(changed, "special contribution", id)?;
  fetch_contribution(conn, id)?
    .ok_or_else(|| CoreError::not_found("special contribution", id).into())
}

pub(super) fn list_special_contributions(conn: &mut Connection) -> Result<Vec<SpecialContribution>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM special_contributions ORDER BY contribution_type, name",
    encode::CONTRIBUTION_COLUMNS
  ))?;
  encode::collect(&mut stmt, [], encode::special_contribution)
}

/// Cascades to the contribution's donation item funds.
pub(super) fn delete_special_contribution(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "special_contributions", "special contribution", id)
}

// ─── Donation item funds ─────────────────────────────────────────────────────

fn fetch_fund(conn: &Connection, id: Uuid) -> Result<Option<DonationItemFund>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM donation_item_funds d JOIN years y ON y.id = d.year_id WHERE d.id = ?1",
    encode::FUND_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::donation_item_fund)
}

pub(super) fn create_donation_item_fund(
  conn: &mut Connection,
  contribution: Uuid,
  form: DonationItemFundForm,
) -> Result<DonationItemFund> {
  let tx = conn.transaction()?;
  require(&tx, "special_contributions", "special contribution", contribution)?;
  let year_id = resolve_year(&tx, form.year_id)?;
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO donation_item_funds (
       id, contribution_id, year_id, period, mass_name, amount, notes,
       date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    params![
      encode_uuid(id),
      encode_uuid(contribution),
      encode_uuid(year_id),
      form.period.trim(),
      form.mass_name.trim(),
      encode_decimal(form.amount),
      form.notes,
      encode_dt(encode::now()),
    ],
  )?;
  let fund = fetch_fund(&tx, id)?.ok_or_else(|| CoreError::not_found("donation item fund", id))?;
  tx.commit()?;
  Ok(fund)
}

pub(super) fn update_donation_item_fund(
  conn: &mut Connection,
  id: Uuid,
  form: DonationItemFundForm,
) -> Result<DonationItemFund> {
  let tx = conn.transaction()?;
  let current =
    fetch_fund(&tx, id)?.ok_or_else(|| CoreError::not_found("donation item fund", id))?;
  let year_id = match form.year_id {
    Some(_) => resolve_year(&tx, form.year_id)?,
    None => current.year_id,
  };
  tx.execute(
    "UPDATE donation_item_funds SET year_id = ?2, period = ?3, mass_name = ?4, amount = ?5,
       notes = ?6, date_updated = ?7
     WHERE id = ?1",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      form.period.trim(),
      form.mass_name.trim(),
      encode_decimal(form.amount),
      form.notes,
      encode_dt(encode::now()),
    ],
  )?;
  let fund = fetch_fund(&tx, id)?.ok_or_else(|| CoreError::not_found("donation item fund", id))?;
  tx.commit()?;
  Ok(fund)
}

/// `category_id` selects the parent special contribution.
pub(super) fn list_donation_item_funds(
  conn: &mut Connection,
  query: LedgerQuery,
) -> Result<Vec<DonationItemFund>> {
  let mut filters = Filters::default();
  filters.eq("y.year", query.year);
  month_of(&mut filters, "d.date_created", query.month);
  filters.uuid("d.contribution_id", query.category_id);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM donation_item_funds d JOIN years y ON y.id = d.year_id{}
     ORDER BY d.date_created DESC",
    encode::FUND_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::donation_item_fund)
}

pub(super) fn delete_donation_item_fund(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "donation_item_funds", "donation item fund", id)
}

/// Pledges and expenditures are filed under the month they are recorded in
/// unless the form names one.
fn this_month() -> Month { Month::of(Utc::now().date_naive()) }

// ─── Pledges ─────────────────────────────────────────────────────────────────

fn fetch_pledge(conn: &Connection, id: Uuid) -> Result<Option<Pledge>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM pledges p JOIN years y ON y.id = p.year_id WHERE p.id = ?1",
    encode::PLEDGE_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::pledge)
}

pub(super) fn create_pledge(conn: &mut Connection, form: PledgeForm) -> Result<Pledge> {
  let tx = conn.transaction()?;
  require(&tx, "members", "member", form.member_id)?;
  let year_id = resolve_year(&tx, form.year_id)?;
  let date_given = form.date_given.unwrap_or_else(|| Utc::now().date_naive());
  let month = form.month.unwrap_or_else(this_month);
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO pledges (
       id, member_id, year_id, month, date_given, envelope_number, pledge_amount,
       pledge_for_construction, date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    params![
      encode_uuid(id),
      encode_uuid(form.member_id),
      encode_uuid(year_id),
      month.to_string(),
      encode_date(date_given),
      form.envelope_number.trim(),
      encode_decimal(form.pledge_amount),
      encode_decimal(form.pledge_for_construction),
      encode_dt(encode::now()),
    ],
  )?;
  let pledge = fetch_pledge(&tx, id)?.ok_or_else(|| CoreError::not_found("pledge", id))?;
  tx.commit()?;
  Ok(pledge)
}

pub(super) fn update_pledge(conn: &mut Connection, id: Uuid, form: PledgeForm) -> Result<Pledge> {
  let tx = conn.transaction()?;
  let current = fetch_pledge(&tx, id)?.ok_or_else(|| CoreError::not_found("pledge", id))?;
  require(&tx, "members", "member", form.member_id)?;
  let year_id = match form.year_id {
    Some(_) => resolve_year(&tx, form.year_id)?,
    None => current.year_id,
  };
  tx.execute(
    "UPDATE pledges SET member_id = ?2, year_id = ?3, month = ?4, date_given = ?5,
       envelope_number = ?6, pledge_amount = ?7, pledge_for_construction = ?8,
       date_updated = ?9
     WHERE id = ?1",
    params![
      encode_uuid(id),
      encode_uuid(form.member_id),
      encode_uuid(year_id),
      form.month.unwrap_or(current.month).to_string(),
      encode_date(form.date_given.unwrap_or(current.date_given)),
      form.envelope_number.trim(),
      encode_decimal(form.pledge_amount),
      encode_decimal(form.pledge_for_construction),
      encode_dt(encode::now()),
    ],
  )?;
  let pledge = fetch_pledge(&tx, id)?.ok_or_else(|| CoreError::not_found("pledge", id))?;
  tx.commit()?;
  Ok(pledge)
}

pub(super) fn list_pledges(conn: &mut Connection, query: LedgerQuery) -> Result<Vec<Pledge>> {
  let mut filters = Filters::default();
  filters.eq("y.year", query.year);
  filters.label("p.month", query.month);
  filters.uuid("p.member_id", query.member_id);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM pledges p JOIN years y ON y.id = p.year_id{}
     ORDER BY p.date_given DESC, p.date_created DESC",
    encode::PLEDGE_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::pledge)
}

pub(super) fn delete_pledge(conn: &mut Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, "pledges", "pledge", id)
}

// ─── Expenditures ────────────────────────────────────────────────────────────

fn fetch_expenditure(conn: &Connection, id: Uuid) -> Result<Option<Expenditure>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM expenditures e JOIN years y ON y.id = e.year_id WHERE e.id = ?1",
    encode::EXPENDITURE_COLUMNS
  ))?;
  encode::first(&mut stmt, params![encode_uuid(id)], encode::expenditure)
}

pub(super) fn create_expenditure(
  conn: &mut Connection,
  category: Uuid,
  form: ExpenditureForm,
) -> Result<Expenditure> {
  let tx = conn.transaction()?;
  require(&tx, "expense_categories", "expense category", category)?;
  let year_id = resolve_year(&tx, form.year_id)?;
  let date_taken = form.date_taken.unwrap_or_else(encode::now);
  let month = form.month.unwrap_or_else(this_month);
  let id = Uuid::new_v4();
  tx.execute(
    "INSERT INTO expenditures (
       id, category_id, year_id, month, date_taken, expenditure_amount,
       expenditure_purpose, notes, date_created, date_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    params![
      encode_uuid(id),
      encode_uuid(category),
      encode_uuid(year_id),
      month.to_string(),
      encode_dt(date_taken),
      encode_decimal(form.expenditure_amount),
      form.expenditure_purpose,
      form.notes,
      encode_dt(encode::now()),
    ],
  )?;
  let expenditure =
    fetch_expenditure(&tx, id)?.ok_or_else(|| CoreError::not_found("expenditure", id))?;
  tx.commit()?;
  Ok(expenditure)
}

/// The category and receipt are kept; missing year, month and date keep the
/// stored values.
pub(super) fn update_expenditure(
  conn: &mut Connection,
  id: Uuid,
  form: ExpenditureForm,
) -> Result<Expenditure> {
  let tx = conn.transaction()?;
  let current =
    fetch_expenditure(&tx, id)?.ok_or_else(|| CoreError::not_found("expenditure", id))?;
  let year_id = match form.year_id {
    Some(_) => resolve_year(&tx, form.year_id)?,
    None => current.year_id,
  };
  tx.execute(
    "UPDATE expenditures SET year_id = ?2, month = ?3, date_taken = ?4,
       expenditure_amount = ?5, expenditure_purpose = ?6, notes = ?7, date_updated = ?8
     WHERE id = ?1",
    params![
      encode_uuid(id),
      encode_uuid(year_id),
      form.month.unwrap_or(current.month).to_string(),
      encode_dt(form.date_taken.unwrap_or(current.date_taken)),
      encode_decimal(form.expenditure_amount),
      form.expenditure_purpose,
      form.notes,
      encode_dt(encode::now()),
    ],
  )?;
  let expenditure =
    fetch_expenditure(&tx, id)?.ok_or_else(|| CoreError::not_found("expenditure", id))?;
  tx.commit()?;
  Ok(expenditure)
}

pub(super) fn get_expenditure(conn: &mut Connection, id: Uuid) -> Result<Option<Expenditure>> {
  fetch_expenditure(conn, id)
}

pub(super) fn list_expenditures(conn: &mut Connection, query: LedgerQuery) -> Result<Vec<Expenditure>> {
  let mut filters = Filters::default();
  filters.eq("y.year", query.year);
  filters.label("e.month", query.month);
  filters.uuid("e.category_id", query.category_id);
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM expenditures e JOIN years y ON y.id = e.year_id{}
     ORDER BY e.date_taken DESC",
    encode::EXPENDITURE_COLUMNS,
    filters.where_sql()
  ))?;
  encode::collect(&mut stmt, filters.args(), encode::expenditure)
}

pub(super) fn delete_expenditure(conn: &mut Connection, id: Uuid) -> Result<Option<String>> {
  let tx = conn.transaction()?;
  let expenditure =
    fetch_expenditure(&tx, id)?.ok_or_else(|| CoreError::not_found("expenditure", id))?;
  tx.execute("DELETE FROM expenditures WHERE id = ?1", params![encode_uuid(id)])?;
  tx.commit()?;
  Ok(expenditure.receipt)
}

pub(super) fn set_expenditure_receipt(
  conn: &mut Connection,
  id: Uuid,
  path: Option<String>,
) -> Result<Option<String>> {
  let tx = conn.transaction()?;
  let expenditure =
    fetch_expenditure(&tx, id)?.ok_or_else(|| CoreError::not_found("expenditure", id))?;
  tx.execute(
    "UPDATE expenditures SET receipt = ?2, date_updated = ?3 WHERE id = ?1",
    params![encode_uuid(id), path, encode_dt(encode::now())],
  )?;
  tx.commit()?;
  Ok(expenditure.receipt)
}
