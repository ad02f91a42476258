//! Identity store: church members and their registration lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Result, humanize,
  sacrament::{MaritalStatus, SacramentFields, Sacramental},
  validate,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
pub enum MemberStatus {
  Active,
  Inactive,
  #[default]
  Pending,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
pub enum Gender {
  Male,
  Female,
}

// ─── Member ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchMember {
  pub id:                       Uuid,
  /// Twenty-character public identifier: ten uppercase letters and ten
  /// digits, shuffled.
  pub member_id:                String,
  pub status:                   MemberStatus,
  pub full_name:                String,
  pub date_of_birth:            NaiveDate,
  pub gender:                   Gender,
  pub phone_number:             String,
  pub email:                    Option<String>,
  pub address:                  Option<String>,
  pub cell_id:                  Option<Uuid>,
  pub sacraments:               Sacramental,
  pub marital_status:           MaritalStatus,
  pub baptism_certificate:      Option<String>,
  pub confirmation_certificate: Option<String>,
  pub is_leader:                bool,
  pub emergency_contact_name:   Option<String>,
  pub emergency_contact_phone:  Option<String>,
  pub passport:                 Option<String>,
  pub date_created:             DateTime<Utc>,
}

impl ChurchMember {
  pub fn age(&self, today: NaiveDate) -> i32 {
    humanize::age(self.date_of_birth, today)
  }

  pub fn sacrament_fields(&self) -> SacramentFields {
    self.sacraments.to_fields(self.marital_status)
  }
}

/// Files attached to a member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemberAttachment {
  Passport,
  BaptismCertificate,
  ConfirmationCertificate,
}

impl MemberAttachment {
  pub fn current<'a>(&self, member: &'a ChurchMember) -> Option<&'a str> {
    match self {
      Self::Passport => member.passport.as_deref(),
      Self::BaptismCertificate => member.baptism_certificate.as_deref(),
      Self::ConfirmationCertificate => member.confirmation_certificate.as_deref(),
    }
  }
}

/// Directory passport photographs are stored under.
pub const PASSPORT_DIR: &str = "passports";

/// A member together with values derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
  #[serde(flatten)]
  pub member:           ChurchMember,
  pub age:              i32,
  pub registered_since: String,
}

impl MemberProfile {
  pub fn new(member: ChurchMember, now: DateTime<Utc>) -> Self {
    let age = member.age(now.date_naive());
    let registered_since = humanize::time_since(member.date_created, now);
    Self { member, age, registered_since }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Fields accepted when registering or editing a member. Status, public ID,
/// attachments and creation time are managed by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberForm {
  pub full_name:               String,
  pub date_of_birth:           NaiveDate,
  pub gender:                  Gender,
  pub phone_number:            String,
  #[serde(default)]
  pub email:                   Option<String>,
  #[serde(default)]
  pub address:                 Option<String>,
  #[serde(default)]
  pub cell_id:                 Option<Uuid>,
  #[serde(flatten)]
  pub sacraments:              SacramentFields,
  #[serde(default)]
  pub is_leader:               bool,
  #[serde(default)]
  pub emergency_contact_name:  Option<String>,
  #[serde(default)]
  pub emergency_contact_phone: Option<String>,
}

impl MemberForm {
  /// Field checks plus the sacrament ledger rules.
  pub fn validate(&self) -> Result<Sacramental> {
    validate::required("full_name", &self.full_name)?;
    validate::phone("phone_number", &self.phone_number)?;
    validate::gmail("email", self.email.as_deref())?;
    if let Some(phone) = &self.emergency_contact_phone {
      validate::phone("emergency_contact_phone", phone)?;
    }
    self.sacraments.validate()
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
  pub status:        Option<MemberStatus>,
  pub gender:        Option<Gender>,
  pub cell_id:       Option<Uuid>,
  /// Matches members whose cell belongs to this outstation.
  pub outstation_id: Option<Uuid>,
  pub is_leader:     Option<bool>,
  pub is_baptised:   Option<bool>,
  pub is_confirmed:  Option<bool>,
  pub is_married:    Option<bool>,
  /// Case-insensitive substring of the full name, member ID or phone.
  pub text:          Option<String>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form() -> MemberForm {
    MemberForm {
      full_name:               "John Doe".into(),
      date_of_birth:           NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
      gender:                  Gender::Male,
      phone_number:            "255712345678".into(),
      email:                   None,
      address:                 None,
      cell_id:                 None,
      sacraments:              SacramentFields::default(),
      is_leader:               false,
      emergency_contact_name:  None,
      emergency_contact_phone: None,
    }
  }

  #[test]
  fn minimal_form_is_valid() {
    assert_eq!(form().validate().unwrap(), Sacramental::None);
  }

  #[test]
  fn bad_contact_details_are_rejected() {
    let mut f = form();
    f.phone_number = "0712345678".into();
    assert!(f.validate().is_err());

    let mut f = form();
    f.email = Some("john@example.com".into());
    assert!(f.validate().is_err());

    let mut f = form();
    f.emergency_contact_phone = Some("12345".into());
    assert!(f.validate().is_err());
  }

  #[test]
  fn form_deserialises_flat_sacrament_fields() {
    let json = serde_json::json!({
      "full_name": "Jane",
      "date_of_birth": "1992-03-04",
      "gender": "Female",
      "phone_number": "255700000001",
      "is_baptised": true,
      "date_of_baptism": "1992-06-01",
    });
    let f: MemberForm = serde_json::from_value(json).unwrap();
    assert!(f.sacraments.is_baptised);
    assert!(f.validate().unwrap().is_baptised());
  }

  #[test]
  fn member_status_defaults_to_pending() {
    assert_eq!(MemberStatus::default(), MemberStatus::Pending);
    assert_eq!("Inactive".parse::<MemberStatus>().unwrap(), MemberStatus::Inactive);
  }
}
