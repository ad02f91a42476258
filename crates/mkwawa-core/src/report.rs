//! Report engine: the monthly parish general report and the dashboard
//! summary.
//!
//! The store gathers the per-category sums for a [`ReportPeriod`] into
//! [`ReportInputs`]; [`GeneralReport::compute`] then derives every subtotal
//! and balance without touching storage.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  finance::{ContributionType, Month},
};

/// A calendar month of a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
  pub month: Month,
  pub year:  i32,
}

impl ReportPeriod {
  pub fn new(month: Month, year: i32) -> Self { Self { month, year } }

  /// First day of the month and first day of the following month.
  pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::InvalidYear {
      year:   self.year,
      reason: "not a representable calendar year".into(),
    };
    let start = NaiveDate::from_ymd_opt(self.year, self.month.number(), 1)
      .ok_or_else(invalid)?;
    let end = match self.month {
      Month::December => NaiveDate::from_ymd_opt(self.year + 1, 1, 1),
      m => NaiveDate::from_ymd_opt(self.year, m.number() + 1, 1),
    }
    .ok_or_else(invalid)?;
    Ok((start, end))
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date.year() == self.year && date.month() == self.month.number()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
  pub name:  String,
  pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionTotal {
  pub name:              String,
  pub contribution_type: ContributionType,
  pub total:             Decimal,
}

/// Sums gathered by the store for one period. Every category appears, with a
/// zero total when it has no records in the period.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
  pub offerings_by_category:    Vec<CategoryTotal>,
  pub contributions:            Vec<ContributionTotal>,
  pub expenditures_by_category: Vec<CategoryTotal>,
  pub active_members:           u64,
  pub all_offerings_total:      Decimal,
  pub all_donation_funds_total: Decimal,
  pub all_expenditures_total:   Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralReport {
  pub period: ReportPeriod,

  // A: offerings per category
  pub table_a:       Vec<CategoryTotal>,
  pub table_a_total: Decimal,

  // B, C, D: special contributions per scope
  pub table_b:           Vec<CategoryTotal>,
  pub diocesan_total:    Decimal,
  pub sum_table_a_b:     Decimal,
  pub table_c:           Vec<CategoryTotal>,
  pub jimbo_total:       Decimal,
  pub sum_table_a_b_c:   Decimal,
  pub table_d:           Vec<CategoryTotal>,
  pub fellowship_total:  Decimal,
  pub sum_table_a_b_c_d: Decimal,

  // E
  pub total_church_members:        u64,
  pub average_offering_per_member: Decimal,

  // H: expenditures per category
  pub table_h:       Vec<CategoryTotal>,
  pub table_h_total: Decimal,

  // I: balances
  pub all_offerings_total:                      Decimal,
  pub all_donation_funds_total:                 Decimal,
  pub all_expenditures_total:                   Decimal,
  pub previous_balance:                         Decimal,
  pub total_of_prev_balance_and_monthly_income: Decimal,
  pub total_remained_this_month:                Decimal,
  pub overall_total_remained:                   Decimal,

  // J
  pub generated_at: DateTime<Utc>,
}

fn total(rows: &[CategoryTotal]) -> Decimal { rows.iter().map(|r| r.total).sum() }

fn scope(rows: &[ContributionTotal], kind: ContributionType) -> Vec<CategoryTotal> {
  rows
    .iter()
    .filter(|r| r.contribution_type == kind)
    .map(|r| CategoryTotal { name: r.name.clone(), total: r.total })
    .collect()
}

impl GeneralReport {
  pub fn compute(period: ReportPeriod, inputs: ReportInputs, now: DateTime<Utc>) -> Self {
    let table_a = inputs.offerings_by_category;
    let table_a_total = total(&table_a);

    let table_b = scope(&inputs.contributions, ContributionType::Diocesan);
    let diocesan_total = total(&table_b);
    let sum_table_a_b = table_a_total + diocesan_total;

    let table_c = scope(&inputs.contributions, ContributionType::Jimbo);
    let jimbo_total = total(&table_c);
    let sum_table_a_b_c = sum_table_a_b + jimbo_total;

    let table_d = scope(&inputs.contributions, ContributionType::Fellowship);
    let fellowship_total = total(&table_d);
    let sum_table_a_b_c_d = sum_table_a_b_c + fellowship_total;

    let average_offering_per_member = if inputs.active_members == 0 {
      Decimal::ZERO
    } else {
      (sum_table_a_b_c_d / Decimal::from(inputs.active_members)).round_dp(2)
    };

    let table_h = inputs.expenditures_by_category;
    let table_h_total = total(&table_h);

    let previous_balance = inputs.all_offerings_total + inputs.all_donation_funds_total
      - inputs.all_expenditures_total;
    let total_remained_this_month = sum_table_a_b_c_d - table_h_total;

    Self {
      period,
      table_a,
      table_a_total,
      table_b,
      diocesan_total,
      sum_table_a_b,
      table_c,
      jimbo_total,
      sum_table_a_b_c,
      table_d,
      fellowship_total,
      sum_table_a_b_c_d,
      total_church_members: inputs.active_members,
      average_offering_per_member,
      table_h,
      table_h_total,
      all_offerings_total: inputs.all_offerings_total,
      all_donation_funds_total: inputs.all_donation_funds_total,
      all_expenditures_total: inputs.all_expenditures_total,
      previous_balance,
      total_of_prev_balance_and_monthly_income: previous_balance + sum_table_a_b_c_d,
      total_remained_this_month,
      overall_total_remained: previous_balance + total_remained_this_month,
      generated_at: now,
    }
  }
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParishSummary {
  pub active_members:    u64,
  pub inactive_members:  u64,
  pub pending_members:   u64,
  pub male_members:      u64,
  pub female_members:    u64,
  pub leaders:           u64,
  pub baptised_members:  u64,
  pub confirmed_members: u64,
  pub married_members:   u64,
  pub assets:            u64,
  pub total_asset_value: Decimal,
  pub years:             u64,
  pub outstations:       u64,
  pub cells:             u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cat(name: &str, total: i64) -> CategoryTotal {
    CategoryTotal { name: name.into(), total: Decimal::from(total) }
  }

  #[test]
  fn monthly_arithmetic() {
    let inputs = ReportInputs {
      offerings_by_category:    vec![cat("Sunday", 100_000)],
      contributions:            vec![
        ContributionTotal {
          name:              "Dayosisi".into(),
          contribution_type: ContributionType::Diocesan,
          total:             Decimal::from(20_000),
        },
        ContributionTotal {
          name:              "Jimbo la Kusini".into(),
          contribution_type: ContributionType::Jimbo,
          total:             Decimal::ZERO,
        },
      ],
      expenditures_by_category: vec![cat("Maintenance", 30_000)],
      active_members:           0,
      all_offerings_total:      Decimal::from(500_000),
      all_donation_funds_total: Decimal::from(50_000),
      all_expenditures_total:   Decimal::from(200_000),
    };
    let period = ReportPeriod::new(Month::June, 2025);
    let r = GeneralReport::compute(period, inputs, Utc::now());

    assert_eq!(r.table_a_total, Decimal::from(100_000));
    assert_eq!(r.sum_table_a_b, Decimal::from(120_000));
    assert_eq!(r.sum_table_a_b_c_d, Decimal::from(120_000));
    assert_eq!(r.table_c.len(), 1);
    assert!(r.table_d.is_empty());
    assert_eq!(r.previous_balance, Decimal::from(350_000));
    assert_eq!(r.total_of_prev_balance_and_monthly_income, Decimal::from(470_000));
    assert_eq!(r.total_remained_this_month, Decimal::from(90_000));
    assert_eq!(r.overall_total_remained, Decimal::from(440_000));
    assert_eq!(r.average_offering_per_member, Decimal::ZERO);
  }

  #[test]
  fn average_is_rounded_to_cents() {
    let inputs = ReportInputs {
      offerings_by_category: vec![cat("Sunday", 100)],
      active_members: 3,
      ..Default::default()
    };
    let r = GeneralReport::compute(ReportPeriod::new(Month::May, 2025), inputs, Utc::now());
    assert_eq!(r.average_offering_per_member.to_string(), "33.33");
  }

  #[test]
  fn period_bounds_roll_over_december() {
    let (start, end) = ReportPeriod::new(Month::December, 2024).bounds().unwrap();
    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert!(ReportPeriod::new(Month::February, 2024)
      .contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
  }
}
