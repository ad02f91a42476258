//! Asset registry: church property and its photographs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Result, humanize, validate};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum AssetType {
  Building,
  Furniture,
  Electronics,
  Vehicle,
  Stationery,
  Equipment,
  Consumables,
}

impl AssetType {
  /// Whether assets of this type may be rented out to external parties.
  pub fn is_rentable(self) -> bool {
    matches!(
      self,
      Self::Building | Self::Electronics | Self::Equipment | Self::Vehicle
    )
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum QuantityUnit {
  Pieces,
  Boxes,
  Packets,
  Bundles,
  Sets,
  Rolls,
  Pads,
  Reams,
  Dozens,
  Liters,
  Units,
  Pairs,
  #[serde(rename = "Square meters")]
  #[strum(serialize = "Square meters")]
  SquareMeters,
  Shelves,
  #[serde(rename = "Cubic meters")]
  #[strum(serialize = "Cubic meters")]
  CubicMeters,
  Kits,
  Batteries,
  Packs,
  Fleets,
  Plots,
  Blocks,
  Complexes,
  Towers,
  Halls,
  Rooms,
  Floors,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum AssetStatus {
  Good,
  #[serde(rename = "Needs Repair")]
  #[strum(serialize = "Needs Repair")]
  NeedsRepair,
  Damaged,
  Sold,
  Donated,
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchAsset {
  pub id:               Uuid,
  pub name:             String,
  pub asset_type:       AssetType,
  pub description:      Option<String>,
  pub acquisition_date: Option<NaiveDate>,
  pub quantity:         u32,
  pub quantity_name:    QuantityUnit,
  pub status:           AssetStatus,
  pub value:            Decimal,
  pub created_at:       DateTime<Utc>,
}

impl ChurchAsset {
  /// "N units ago" since acquisition, when the date is known.
  pub fn time_since_acquired(&self, now: DateTime<Utc>) -> Option<String> {
    self
      .acquisition_date
      .map(|date| humanize::relative_date(date, now).0)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetForm {
  pub name:             String,
  pub asset_type:       AssetType,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub acquisition_date: Option<NaiveDate>,
  #[serde(default = "one")]
  pub quantity:         u32,
  pub quantity_name:    QuantityUnit,
  pub status:           AssetStatus,
  pub value:            Decimal,
}

fn one() -> u32 { 1 }

impl AssetForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("name", &self.name)?;
    validate::money_or_zero("value", self.value)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetQuery {
  pub asset_type: Option<AssetType>,
  pub status:     Option<AssetStatus>,
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMedia {
  pub id:          Uuid,
  pub asset_id:    Uuid,
  /// Path returned by file storage.
  pub image:       String,
  pub uploaded_at: DateTime<Utc>,
}

/// Directory asset photographs are stored under.
pub const MEDIA_DIR: &str = "church_assets";
