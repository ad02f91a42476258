//! Configuration registry: years, the outstation/cell hierarchy and the
//! church geolocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, validate};

// ─── Year ────────────────────────────────────────────────────────────────────

/// A calendar year that ledger records are filed under. Exactly one year is
/// current at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Year {
  pub id:           Uuid,
  pub year:         i32,
  pub is_current:   bool,
  pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewYear {
  pub year:       i32,
  #[serde(default)]
  pub is_current: bool,
}

/// A year may only be flagged current if it is in range and not in the future
/// relative to `calendar_year`.
pub fn check_current_year(year: i32, calendar_year: i32) -> Result<()> {
  validate::year_in_range(year)?;
  if year > calendar_year {
    return Err(Error::InvalidYear {
      year,
      reason: format!(
        "cannot be set as current; the actual current year is {calendar_year}"
      ),
    });
  }
  Ok(())
}

// ─── Outstations and cells ───────────────────────────────────────────────────

/// A satellite congregation grouping several cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutStation {
  pub id:            Uuid,
  /// Randomly drawn six-digit public number.
  pub number:        u32,
  pub name:          String,
  pub description:   Option<String>,
  pub location:      String,
  pub date_created:  DateTime<Utc>,
  pub date_updated:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutStationForm {
  pub name:        String,
  pub description: Option<String>,
  pub location:    String,
}

impl OutStationForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name)?;
    validate::required("location", &self.location)
  }
}

/// The smallest church subdivision (jumuiya).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
  pub id:            Uuid,
  /// Randomly drawn seven-digit public number.
  pub number:        u32,
  pub name:          String,
  pub outstation_id: Uuid,
  pub description:   Option<String>,
  pub location:      String,
  pub date_created:  DateTime<Utc>,
  pub date_updated:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellForm {
  pub name:          String,
  pub outstation_id: Uuid,
  pub description:   Option<String>,
  pub location:      String,
}

impl CellForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name)?;
    validate::required("location", &self.location)
  }
}

// ─── Church location ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchLocation {
  pub id:           Uuid,
  pub latitude:     f64,
  pub longitude:    f64,
  /// Metres; resolved from the elevation service when not supplied.
  pub altitude:     Option<f64>,
  pub is_active:    bool,
  pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewChurchLocation {
  pub latitude:  f64,
  pub longitude: f64,
  pub altitude:  Option<f64>,
}

impl NewChurchLocation {
  pub fn validate(&self) -> Result<()> {
    if !(-90.0..=90.0).contains(&self.latitude) {
      return Err(Error::validation("latitude", "must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&self.longitude) {
      return Err(Error::validation("longitude", "must be between -180 and 180"));
    }
    Ok(())
  }
}
