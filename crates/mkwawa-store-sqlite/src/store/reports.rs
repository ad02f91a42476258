//! Sums behind the general report and the dashboard counts.
//!
//! Money is stored as decimal text, so totals are added up here rather than
//! with SQL `SUM`.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use mkwawa_core::{
  finance::ContributionType,
  report::{CategoryTotal, ContributionTotal, ParishSummary, ReportInputs, ReportPeriod},
};

use crate::{
  Result,
  encode::{decode_decimal, decode_label, encode_date},
};

/// Add up `(key, amount)` rows that arrive grouped by key. Keys whose
/// joined amount is NULL contribute zero.
fn fold_groups<K: PartialEq>(rows: Vec<(K, Option<String>)>) -> Result<Vec<(K, Decimal)>> {
  let mut out: Vec<(K, Decimal)> = Vec::new();
  for (key, amount) in rows {
    let amount = amount.as_deref().map(decode_decimal).transpose()?.unwrap_or_default();
    match out.last_mut() {
      Some((last, total)) if *last == key => *total += amount,
      _ => out.push((key, amount)),
    }
  }
  Ok(out)
}

/// Per-category totals for `sql`, which selects `(id, name, amount)`
/// ordered by category and takes the period bounds as `?1` and `?2`.
fn category_totals(conn: &Connection, sql: &str, start: &str, end: &str) -> Result<Vec<CategoryTotal>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params![start, end], |r: &Row<'_>| {
      Ok(((r.get::<_, String>(0)?, r.get::<_, String>(1)?), r.get::<_, Option<String>>(2)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(
    fold_groups(rows)?
      .into_iter()
      .map(|((_, name), total)| CategoryTotal { name, total })
      .collect(),
  )
}

fn sum_column(conn: &Connection, table: &str, column: &str) -> Result<Decimal> {
  let mut stmt = conn.prepare(&format!("SELECT {column} FROM {table}"))?;
  let mut rows = stmt.query([])?;
  let mut total = Decimal::ZERO;
  while let Some(row) = rows.next()? {
    let amount: String = row.get(0)?;
    total += decode_decimal(&amount)?;
  }
  Ok(total)
}

fn count(conn: &Connection, sql: &str) -> Result<u64> {
  let n: i64 = conn.query_row(sql, [], |r| r.get(0))?;
  Ok(n.max(0) as u64)
}

/// Period sums filter on the calendar date of each record: `date_given` for
/// offerings, `date_created` for donation item funds and `date_taken` for
/// expenditures.
pub(super) fn report_inputs(conn: &mut Connection, period: ReportPeriod) -> Result<ReportInputs> {
  let (start, end) = period.bounds()?;
  let (start, end) = (encode_date(start), encode_date(end));

  let offerings_by_category = category_totals(
    conn,
    "SELECT c.id, c.name, o.amount
       FROM offering_categories c
       LEFT JOIN offerings o
         ON o.category_id = c.id AND o.date_given >= ?1 AND o.date_given < ?2
      ORDER BY c.name, c.id",
    &start,
    &end,
  )?;

  let expenditures_by_category = category_totals(
    conn,
    "SELECT c.id, c.name, e.expenditure_amount
       FROM expense_categories c
       LEFT JOIN expenditures e
         ON e.category_id = c.id AND e.date_taken >= ?1 AND e.date_taken < ?2
      ORDER BY c.name, c.id",
    &start,
    &end,
  )?;

  let contributions = {
    let mut stmt = conn.prepare(
      "SELECT s.id, s.name, s.contribution_type, d.amount
         FROM special_contributions s
         LEFT JOIN donation_item_funds d
           ON d.contribution_id = s.id AND d.date_created >= ?1 AND d.date_created < ?2
        ORDER BY s.name, s.id",
    )?;
    let rows = stmt
      .query_map(params![start, end], |r| {
        Ok((
          (r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?),
          r.get::<_, Option<String>>(3)?,
        ))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    fold_groups(rows)?
      .into_iter()
      .map(|((_, name, kind), total)| {
        Ok(ContributionTotal {
          name,
          contribution_type: decode_label::<ContributionType>("contribution type", &kind)?,
          total,
        })
      })
      .collect::<Result<Vec<_>>>()?
  };

  Ok(ReportInputs {
    offerings_by_category,
    contributions,
    expenditures_by_category,
    active_members: count(conn, "SELECT COUNT(*) FROM members WHERE status = 'Active'")?,
    all_offerings_total: sum_column(conn, "offerings", "amount")?,
    all_donation_funds_total: sum_column(conn, "donation_item_funds", "amount")?,
    all_expenditures_total: sum_column(conn, "expenditures", "expenditure_amount")?,
  })
}

pub(super) fn parish_summary(conn: &mut Connection) -> Result<ParishSummary> {
  Ok(ParishSummary {
    active_members:    count(conn, "SELECT COUNT(*) FROM members WHERE status = 'Active'")?,
    inactive_members:  count(conn, "SELECT COUNT(*) FROM members WHERE status = 'Inactive'")?,
    pending_members:   count(conn, "SELECT COUNT(*) FROM members WHERE status = 'Pending'")?,
    male_members:      count(conn, "SELECT COUNT(*) FROM members WHERE gender = 'Male'")?,
    female_members:    count(conn, "SELECT COUNT(*) FROM members WHERE gender = 'Female'")?,
    leaders:           count(conn, "SELECT COUNT(*) FROM leaders")?,
    baptised_members:  count(conn, "SELECT COUNT(*) FROM members WHERE is_baptised = 1")?,
    confirmed_members: count(conn, "SELECT COUNT(*) FROM members WHERE is_confirmed = 1")?,
    married_members:   count(conn, "SELECT COUNT(*) FROM members WHERE marital_status = 'Married'")?,
    assets:            count(conn, "SELECT COUNT(*) FROM assets")?,
    total_asset_value: sum_column(conn, "assets", "value")?,
    years:             count(conn, "SELECT COUNT(*) FROM years")?,
    outstations:       count(conn, "SELECT COUNT(*) FROM outstations")?,
    cells:             count(conn, "SELECT COUNT(*) FROM cells")?,
  })
}
