//! Finance ledger: categorised inflows (offerings, rentals, contributions,
//! pledges) and outflows (expenditures).
//!
//! Every record is filed under a [`Year`](crate::settings::Year). Forms leave
//! the year optional; the store assigns the current year when it is absent
//! and fails with [`Error::CurrentYearMissing`] when none is set.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, humanize, validate};

// ─── Shared pieces ───────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum Month {
  January,
  February,
  March,
  April,
  May,
  June,
  July,
  August,
  September,
  October,
  November,
  December,
}

impl Month {
  /// `1..=12`; anything else is rejected.
  pub fn from_number(n: u32) -> Result<Self> {
    use Month::*;
    const ALL: [Month; 12] = [
      January, February, March, April, May, June, July, August, September,
      October, November, December,
    ];
    n.checked_sub(1)
      .and_then(|i| ALL.get(i as usize).copied())
      .ok_or_else(|| Error::validation("month", format!("{n} is not a month")))
  }

  pub fn of(date: NaiveDate) -> Self {
    // `Datelike::month` is always 1..=12.
    Self::from_number(date.month()).unwrap_or(Self::January)
  }

  pub fn number(self) -> u32 { self as u32 + 1 }
}

/// Name and description; used for offering and expense categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

impl CategoryForm {
  pub fn validate(&self) -> Result<()> { validate::required("name", &self.name) }
}

/// Listing filters shared by the ledgers. Fields that do not apply to a
/// ledger are ignored by it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerQuery {
  /// Value of the year the record is filed under.
  pub year:          Option<i32>,
  pub month:         Option<Month>,
  /// Offering category, special contribution or expense category.
  pub category_id:   Option<Uuid>,
  pub outstation_id: Option<Uuid>,
  pub member_id:     Option<Uuid>,
  pub asset_id:      Option<Uuid>,
}

// ─── Offerings ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingCategory {
  pub id:           Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub date_created: DateTime<Utc>,
  pub date_updated: DateTime<Utc>,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum ServiceTime {
  Morning,
  Afternoon,
  Evening,
  Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
  pub id:            Uuid,
  pub year_id:       Uuid,
  pub year:          i32,
  pub date_given:    NaiveDate,
  pub service_time:  ServiceTime,
  pub amount:        Decimal,
  pub collected_by:  Option<Uuid>,
  pub recorded_by:   Option<Uuid>,
  pub mass_name:     String,
  pub notes:         Option<String>,
  pub category_id:   Uuid,
  pub outstation_id: Uuid,
  pub date_created:  DateTime<Utc>,
  pub date_updated:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingForm {
  #[serde(default)]
  pub year_id:       Option<Uuid>,
  #[serde(default)]
  pub date_given:    Option<NaiveDate>,
  pub service_time:  ServiceTime,
  pub amount:        Decimal,
  #[serde(default)]
  pub collected_by:  Option<Uuid>,
  /// Must be a member flagged as a leader.
  #[serde(default)]
  pub recorded_by:   Option<Uuid>,
  pub mass_name:     String,
  #[serde(default)]
  pub notes:         Option<String>,
  pub category_id:   Uuid,
  pub outstation_id: Uuid,
}

impl OfferingForm {
  pub fn validate(&self) -> Result<()> {
    validate::money("amount", self.amount)?;
    validate::required("mass_name", &self.mass_name)
  }
}

// ─── Facility rentings ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRenting {
  pub id:           Uuid,
  pub year_id:      Uuid,
  pub year:         i32,
  pub asset_id:     Uuid,
  pub rentor_name:  String,
  pub amount:       Decimal,
  pub date_rented:  NaiveDate,
  pub end_date:     Option<NaiveDate>,
  pub purpose:      Option<String>,
  /// Five digits (1-9) and five uppercase letters, shuffled.
  pub receipt_id:   String,
  pub date_created: DateTime<Utc>,
  pub date_updated: DateTime<Utc>,
}

impl FacilityRenting {
  pub fn rental_duration(&self) -> Option<String> {
    humanize::rental_duration(self.date_rented, self.end_date?)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRentingForm {
  #[serde(default)]
  pub year_id:     Option<Uuid>,
  pub asset_id:    Uuid,
  pub rentor_name: String,
  pub amount:      Decimal,
  #[serde(default)]
  pub date_rented: Option<NaiveDate>,
  #[serde(default)]
  pub end_date:    Option<NaiveDate>,
  #[serde(default)]
  pub purpose:     Option<String>,
}

impl FacilityRentingForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("rentor_name", &self.rentor_name)?;
    validate::money("amount", self.amount)?;
    if let (Some(start), Some(end)) = (self.date_rented, self.end_date)
      && end < start
    {
      return Err(Error::validation("end_date", "end date precedes the rental date"));
    }
    Ok(())
  }
}

// ─── Special contributions ───────────────────────────────────────────────────

/// Scope of a special contribution, as grouped by the monthly report.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ContributionType {
  Diocesan,
  Jimbo,
  Fellowship,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialContribution {
  pub id:                Uuid,
  pub contribution_type: ContributionType,
  pub name:              String,
  pub description:       Option<String>,
  pub date_created:      DateTime<Utc>,
  pub date_updated:      DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialContributionForm {
  pub contribution_type: ContributionType,
  pub name:              String,
  #[serde(default)]
  pub description:       Option<String>,
}

impl SpecialContributionForm {
  pub fn validate(&self) -> Result<()> { validate::required("name", &self.name) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationItemFund {
  pub id:              Uuid,
  pub contribution_id: Uuid,
  pub year_id:         Uuid,
  pub year:            i32,
  /// Free text, e.g. "Q1 2024".
  pub period:          String,
  pub mass_name:       String,
  pub amount:          Decimal,
  pub notes:           Option<String>,
  pub date_created:    DateTime<Utc>,
  pub date_updated:    DateTime<Utc>,
}

/// The contribution is taken from the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationItemFundForm {
  #[serde(default)]
  pub year_id:   Option<Uuid>,
  pub period:    String,
  pub mass_name: String,
  pub amount:    Decimal,
  #[serde(default)]
  pub notes:     Option<String>,
}

impl DonationItemFundForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("period", &self.period)?;
    validate::required("mass_name", &self.mass_name)?;
    validate::money("amount", self.amount)
  }
}

// ─── Pledges ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pledge {
  pub id:                      Uuid,
  pub member_id:               Uuid,
  pub year_id:                 Uuid,
  pub year:                    i32,
  pub month:                   Month,
  pub date_given:              NaiveDate,
  pub envelope_number:         String,
  pub pledge_amount:           Decimal,
  pub pledge_for_construction: Decimal,
  pub date_created:            DateTime<Utc>,
  pub date_updated:            DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PledgeForm {
  pub member_id:               Uuid,
  #[serde(default)]
  pub year_id:                 Option<Uuid>,
  #[serde(default)]
  pub month:                   Option<Month>,
  #[serde(default)]
  pub date_given:              Option<NaiveDate>,
  pub envelope_number:         String,
  pub pledge_amount:           Decimal,
  #[serde(default)]
  pub pledge_for_construction: Decimal,
}

impl PledgeForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("envelope_number", &self.envelope_number)?;
    validate::money("pledge_amount", self.pledge_amount)?;
    validate::money_or_zero("pledge_for_construction", self.pledge_for_construction)
  }
}

// ─── Expenditures ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
  pub id:           Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub date_created: DateTime<Utc>,
  pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expenditure {
  pub id:                  Uuid,
  pub category_id:         Uuid,
  pub year_id:             Uuid,
  pub year:                i32,
  pub month:               Month,
  pub date_taken:          DateTime<Utc>,
  pub expenditure_amount:  Decimal,
  pub expenditure_purpose: Option<String>,
  pub notes:               Option<String>,
  /// Stored path of the attached receipt.
  pub receipt:             Option<String>,
  pub date_created:        DateTime<Utc>,
  pub date_updated:        DateTime<Utc>,
}

/// The category is taken from the request path, never from the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenditureForm {
  #[serde(default)]
  pub year_id:             Option<Uuid>,
  #[serde(default)]
  pub month:               Option<Month>,
  #[serde(default)]
  pub date_taken:          Option<DateTime<Utc>>,
  pub expenditure_amount:  Decimal,
  #[serde(default)]
  pub expenditure_purpose: Option<String>,
  #[serde(default)]
  pub notes:               Option<String>,
}

impl ExpenditureForm {
  pub fn validate(&self) -> Result<()> {
    validate::money("expenditure_amount", self.expenditure_amount)
  }
}

/// Directory expenditure receipts are stored under.
pub const RECEIPT_DIR: &str = "receipt_uploads";

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn months_number_from_one() {
    for (i, month) in Month::iter().enumerate() {
      assert_eq!(month.number() as usize, i + 1);
      assert_eq!(Month::from_number(month.number()).unwrap(), month);
    }
    assert!(Month::from_number(0).is_err());
    assert!(Month::from_number(13).is_err());
    assert_eq!(Month::of(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()), Month::June);
  }

  #[test]
  fn contribution_types_are_uppercase() {
    assert_eq!(ContributionType::Jimbo.to_string(), "JIMBO");
    let t: ContributionType = serde_json::from_str("\"DIOCESAN\"").unwrap();
    assert_eq!(t, ContributionType::Diocesan);
  }

  #[test]
  fn renting_end_must_follow_start() {
    let form = FacilityRentingForm {
      year_id:     None,
      asset_id:    Uuid::new_v4(),
      rentor_name: "Wedding party".into(),
      amount:      Decimal::from(50_000),
      date_rented: NaiveDate::from_ymd_opt(2025, 3, 10),
      end_date:    NaiveDate::from_ymd_opt(2025, 3, 9),
      purpose:     None,
    };
    assert!(form.validate().is_err());
  }

  #[test]
  fn pledge_construction_may_be_zero() {
    let form = PledgeForm {
      member_id:               Uuid::new_v4(),
      year_id:                 None,
      month:                   None,
      date_given:              None,
      envelope_number:         "E-12".into(),
      pledge_amount:           Decimal::from(10_000),
      pledge_for_construction: Decimal::ZERO,
    };
    assert!(form.validate().is_ok());
  }

  #[test]
  fn offering_amount_must_be_positive() {
    let form = OfferingForm {
      year_id:       None,
      date_given:    None,
      service_time:  ServiceTime::Morning,
      amount:        Decimal::ZERO,
      collected_by:  None,
      recorded_by:   None,
      mass_name:     "Ibada ya kwanza".into(),
      notes:         None,
      category_id:   Uuid::new_v4(),
      outstation_id: Uuid::new_v4(),
    };
    assert!(form.validate().is_err());
  }
}
