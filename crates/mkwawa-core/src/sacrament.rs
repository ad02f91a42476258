//! Sacrament ledger.
//!
//! A member's sacramental standing is an ordered progression: baptism, then
//! confirmation, then marriage. [`Sacramental`] encodes that progression so
//! that a confirmed-but-unbaptised member cannot be constructed; the flat
//! [`SacramentFields`] submitted by forms and stored in the database are
//! checked and lifted into it on every write.
//!
//! Marriages between two members are first-class [`Marriage`] records; both
//! partners' standings point at each other and share the marriage date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  member::{ChurchMember, Gender, MemberStatus},
  validate,
};

// ─── Marital status ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
pub enum MaritalStatus {
  #[default]
  Single,
  Married,
  Divorced,
  Widowed,
}

// ─── Sacraments and certificates ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sacrament {
  Baptism,
  Confirmation,
  Marriage,
}

impl Sacrament {
  pub fn certificate_dir(self) -> &'static str {
    match self {
      Self::Baptism => "baptism_certificates",
      Self::Confirmation => "confirmation_certificates",
      Self::Marriage => "marriage_certificates",
    }
  }
}

/// Storage path for an uploaded certificate:
/// `<sacrament>_certificates/<slug of the first 10 chars of the name>_<file>`.
pub fn certificate_path(
  sacrament: Sacrament,
  full_name: &str,
  original_name: &str,
) -> Result<String> {
  let file = validate::file_name(original_name)?;
  let short: String = full_name.chars().take(10).collect();
  let slug = validate::slugify(&short);
  Ok(validate::upload_path(
    sacrament.certificate_dir(),
    &format!("{slug}_{file}"),
  ))
}

// ─── Flat representation ─────────────────────────────────────────────────────

/// Sacramental columns as submitted by forms and persisted in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SacramentFields {
  pub is_baptised:      bool,
  pub date_of_baptism:  Option<NaiveDate>,
  pub is_confirmed:     bool,
  pub date_confirmed:   Option<NaiveDate>,
  pub marital_status:   MaritalStatus,
  pub date_of_marriage: Option<NaiveDate>,
}

impl SacramentFields {
  /// Check the ledger invariants and lift the fields into a [`Sacramental`].
  /// The partner reference is always unset; storage fills it from the
  /// marriage record.
  pub fn validate(&self) -> Result<Sacramental> {
    let baptised_on = flagged_date(
      self.is_baptised,
      self.date_of_baptism,
      "date_of_baptism is required for a baptised member",
      "date_of_baptism given for a member who is not baptised",
    )?;
    let confirmed_on = flagged_date(
      self.is_confirmed,
      self.date_confirmed,
      "date_confirmed is required for a confirmed member",
      "date_confirmed given for a member who is not confirmed",
    )?;
    let married_on = flagged_date(
      self.marital_status == MaritalStatus::Married,
      self.date_of_marriage,
      "date_of_marriage is required for a married member",
      "date_of_marriage given for a member who is not married",
    )?;

    let standing = match (baptised_on, confirmed_on, married_on) {
      (None, None, None) => Sacramental::None,
      (Some(baptised_on), None, None) => Sacramental::Baptized { baptised_on },
      (Some(baptised_on), Some(confirmed_on), None) => {
        Sacramental::Confirmed { baptised_on, confirmed_on }
      }
      (Some(baptised_on), Some(confirmed_on), Some(married_on)) => {
        Sacramental::Married { baptised_on, confirmed_on, married_on, partner: None }
      }
      (None, Some(_), _) => {
        return Err(Error::sacrament("cannot be confirmed without baptism"));
      }
      (_, None, Some(_)) | (None, _, Some(_)) => {
        return Err(Error::sacrament(
          "cannot be married without baptism and confirmation",
        ));
      }
    };
    standing.check_order()?;
    Ok(standing)
  }
}

fn flagged_date(
  flag: bool,
  date: Option<NaiveDate>,
  missing: &str,
  stray: &str,
) -> Result<Option<NaiveDate>> {
  match (flag, date) {
    (true, Some(d)) => Ok(Some(d)),
    (false, None) => Ok(None),
    (true, None) => Err(Error::sacrament(missing)),
    (false, Some(_)) => Err(Error::sacrament(stray)),
  }
}

// ─── State machine ───────────────────────────────────────────────────────────

/// The validated sacramental standing of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Sacramental {
  #[default]
  None,
  Baptized {
    baptised_on: NaiveDate,
  },
  Confirmed {
    baptised_on:  NaiveDate,
    confirmed_on: NaiveDate,
  },
  Married {
    baptised_on:  NaiveDate,
    confirmed_on: NaiveDate,
    married_on:   NaiveDate,
    /// The other member of the marriage, when both are registered members.
    partner:      Option<Uuid>,
  },
}

impl Sacramental {
  pub fn baptised_on(&self) -> Option<NaiveDate> {
    match *self {
      Self::None => None,
      Self::Baptized { baptised_on }
      | Self::Confirmed { baptised_on, .. }
      | Self::Married { baptised_on, .. } => Some(baptised_on),
    }
  }

  pub fn confirmed_on(&self) -> Option<NaiveDate> {
    match *self {
      Self::Confirmed { confirmed_on, .. } | Self::Married { confirmed_on, .. } => {
        Some(confirmed_on)
      }
      _ => None,
    }
  }

  pub fn married_on(&self) -> Option<NaiveDate> {
    match *self {
      Self::Married { married_on, .. } => Some(married_on),
      _ => None,
    }
  }

  pub fn partner(&self) -> Option<Uuid> {
    match *self {
      Self::Married { partner, .. } => partner,
      _ => None,
    }
  }

  pub fn is_baptised(&self) -> bool { self.baptised_on().is_some() }

  pub fn is_confirmed(&self) -> bool { self.confirmed_on().is_some() }

  pub fn is_married(&self) -> bool { self.married_on().is_some() }

  fn check_order(&self) -> Result<()> {
    if let (Some(b), Some(c)) = (self.baptised_on(), self.confirmed_on())
      && c < b
    {
      return Err(Error::sacrament(format!(
        "confirmation date {c} precedes baptism date {b}"
      )));
    }
    if let (Some(c), Some(m)) = (self.confirmed_on(), self.married_on())
      && m < c
    {
      return Err(Error::sacrament(format!(
        "marriage date {m} precedes confirmation date {c}"
      )));
    }
    Ok(())
  }

  /// Record (or re-date) a baptism.
  pub fn baptise(self, on: NaiveDate) -> Result<Self> {
    let next = match self {
      Self::None | Self::Baptized { .. } => Self::Baptized { baptised_on: on },
      Self::Confirmed { confirmed_on, .. } => {
        Self::Confirmed { baptised_on: on, confirmed_on }
      }
      Self::Married { confirmed_on, married_on, partner, .. } => {
        Self::Married { baptised_on: on, confirmed_on, married_on, partner }
      }
    };
    next.check_order()?;
    Ok(next)
  }

  /// Record (or re-date) a confirmation; requires baptism.
  pub fn confirm(self, on: NaiveDate) -> Result<Self> {
    let next = match self {
      Self::None => {
        return Err(Error::sacrament("cannot be confirmed without baptism"));
      }
      Self::Baptized { baptised_on } | Self::Confirmed { baptised_on, .. } => {
        Self::Confirmed { baptised_on, confirmed_on: on }
      }
      Self::Married { baptised_on, married_on, partner, .. } => {
        Self::Married { baptised_on, confirmed_on: on, married_on, partner }
      }
    };
    next.check_order()?;
    Ok(next)
  }

  /// Enter a marriage; requires baptism and confirmation and no current
  /// marriage.
  pub fn marry(self, on: NaiveDate, partner: Option<Uuid>) -> Result<Self> {
    let next = match self {
      Self::Confirmed { baptised_on, confirmed_on } => {
        Self::Married { baptised_on, confirmed_on, married_on: on, partner }
      }
      Self::Married { .. } => {
        return Err(Error::sacrament("member is already married"));
      }
      Self::None | Self::Baptized { .. } => {
        return Err(Error::sacrament(
          "cannot be married without baptism and confirmation",
        ));
      }
    };
    next.check_order()?;
    Ok(next)
  }

  /// Change the date of an existing marriage.
  pub fn redate_marriage(self, on: NaiveDate) -> Result<Self> {
    let Self::Married { baptised_on, confirmed_on, partner, .. } = self else {
      return Err(Error::sacrament("member is not married"));
    };
    let next = Self::Married { baptised_on, confirmed_on, married_on: on, partner };
    next.check_order()?;
    Ok(next)
  }

  /// Remove the baptism and everything that depends on it.
  pub fn revoke_baptism(self) -> Result<Self> {
    if !self.is_baptised() {
      return Err(Error::sacrament("member is not baptised"));
    }
    Ok(Self::None)
  }

  /// Remove the confirmation and any marriage that depends on it.
  pub fn revoke_confirmation(self) -> Result<Self> {
    match self {
      Self::Confirmed { baptised_on, .. } | Self::Married { baptised_on, .. } => {
        Ok(Self::Baptized { baptised_on })
      }
      _ => Err(Error::sacrament("member is not confirmed")),
    }
  }

  pub fn revoke_marriage(self) -> Result<Self> {
    match self {
      Self::Married { baptised_on, confirmed_on, .. } => {
        Ok(Self::Confirmed { baptised_on, confirmed_on })
      }
      _ => Err(Error::sacrament("member is not married")),
    }
  }

  /// Flatten back to storage columns. A non-married standing keeps the
  /// given civil status unless it says `Married`, which becomes `Single`.
  pub fn to_fields(&self, marital_status: MaritalStatus) -> SacramentFields {
    let marital_status = match (self.is_married(), marital_status) {
      (true, _) => MaritalStatus::Married,
      (false, MaritalStatus::Married) => MaritalStatus::Single,
      (false, other) => other,
    };
    SacramentFields {
      is_baptised: self.is_baptised(),
      date_of_baptism: self.baptised_on(),
      is_confirmed: self.is_confirmed(),
      date_confirmed: self.confirmed_on(),
      marital_status,
      date_of_marriage: self.married_on(),
    }
  }
}

// ─── Marriage ────────────────────────────────────────────────────────────────

/// A marriage between two registered members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
  pub id:           Uuid,
  pub husband_id:   Uuid,
  pub wife_id:      Uuid,
  pub married_on:   NaiveDate,
  pub date_created: DateTime<Utc>,
}

impl Marriage {
  pub fn partner_of(&self, member: Uuid) -> Option<Uuid> {
    if member == self.husband_id {
      Some(self.wife_id)
    } else if member == self.wife_id {
      Some(self.husband_id)
    } else {
      None
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMarriage {
  pub husband_id: Uuid,
  pub wife_id:    Uuid,
  pub married_on: NaiveDate,
}

/// A marriage with both partners' names, as listed by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarriageParties {
  #[serde(flatten)]
  pub marriage:     Marriage,
  pub husband_name: String,
  pub wife_name:    String,
}

/// A listed marriage with a "time since/until" label.
#[derive(Debug, Clone, Serialize)]
pub struct MarriageEntry {
  #[serde(flatten)]
  pub parties: MarriageParties,
  pub since:   String,
}

/// Result of revoking a sacrament.
#[derive(Debug, Clone)]
pub struct Revocation {
  pub member:        ChurchMember,
  /// The former partner when a marriage was dissolved.
  pub partner:       Option<Uuid>,
  /// Certificate files no longer referenced by the member.
  pub removed_files: Vec<String>,
}

/// Both parties must be active, of the expected gender, baptised, confirmed
/// and not currently married.
pub fn check_marriage_parties(husband: &ChurchMember, wife: &ChurchMember) -> Result<()> {
  if husband.id == wife.id {
    return Err(Error::sacrament("a member cannot marry themselves"));
  }
  if husband.gender != Gender::Male {
    return Err(Error::sacrament(format!("{} is not male", husband.full_name)));
  }
  if wife.gender != Gender::Female {
    return Err(Error::sacrament(format!("{} is not female", wife.full_name)));
  }
  for party in [husband, wife] {
    if party.status != MemberStatus::Active {
      return Err(Error::sacrament(format!("{} is not an active member", party.full_name)));
    }
    if party.sacraments.is_married() || party.marital_status == MaritalStatus::Married {
      return Err(Error::sacrament(format!("{} is already married", party.full_name)));
    }
    if !party.sacraments.is_confirmed() {
      return Err(Error::sacrament(format!(
        "{} must be baptised and confirmed before marriage",
        party.full_name
      )));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn confirmation_requires_baptism() {
    let fields = SacramentFields {
      is_confirmed: true,
      date_confirmed: Some(d(2010, 5, 1)),
      ..Default::default()
    };
    assert!(matches!(fields.validate(), Err(Error::SacramentInvariant(_))));
  }

  #[test]
  fn marriage_requires_confirmation() {
    let fields = SacramentFields {
      is_baptised: true,
      date_of_baptism: Some(d(1990, 2, 1)),
      marital_status: MaritalStatus::Married,
      date_of_marriage: Some(d(2015, 5, 1)),
      ..Default::default()
    };
    assert!(matches!(fields.validate(), Err(Error::SacramentInvariant(_))));
  }

  #[test]
  fn married_requires_a_date() {
    let fields = SacramentFields {
      is_baptised: true,
      date_of_baptism: Some(d(1990, 2, 1)),
      is_confirmed: true,
      date_confirmed: Some(d(2005, 2, 1)),
      marital_status: MaritalStatus::Married,
      date_of_marriage: None,
    };
    assert!(fields.validate().is_err());
  }

  #[test]
  fn dates_must_be_ordered() {
    let fields = SacramentFields {
      is_baptised: true,
      date_of_baptism: Some(d(2005, 2, 1)),
      is_confirmed: true,
      date_confirmed: Some(d(2004, 2, 1)),
      ..Default::default()
    };
    assert!(fields.validate().is_err());
  }

  #[test]
  fn valid_fields_lift_to_married() {
    let fields = SacramentFields {
      is_baptised: true,
      date_of_baptism: Some(d(1990, 2, 1)),
      is_confirmed: true,
      date_confirmed: Some(d(2005, 2, 1)),
      marital_status: MaritalStatus::Married,
      date_of_marriage: Some(d(2015, 2, 1)),
    };
    let standing = fields.validate().unwrap();
    assert!(standing.is_married());
    assert_eq!(standing.to_fields(MaritalStatus::Married), fields);
  }

  #[test]
  fn divorced_without_date_is_accepted() {
    let fields = SacramentFields {
      marital_status: MaritalStatus::Divorced,
      ..Default::default()
    };
    assert_eq!(fields.validate().unwrap(), Sacramental::None);
  }

  #[test]
  fn transitions_move_forward_in_order() {
    let s = Sacramental::None;
    assert!(s.confirm(d(2000, 1, 1)).is_err());
    let s = s.baptise(d(1990, 1, 1)).unwrap();
    assert!(s.marry(d(2010, 1, 1), None).is_err());
    let s = s.confirm(d(2000, 1, 1)).unwrap();
    assert!(s.marry(d(1999, 1, 1), None).is_err());
    let s = s.marry(d(2010, 1, 1), None).unwrap();
    assert!(s.is_married());
    assert!(s.marry(d(2011, 1, 1), None).is_err());
  }

  #[test]
  fn revoking_baptism_equals_revoking_confirmation_then_baptism() {
    let married = Sacramental::Married {
      baptised_on:  d(1990, 1, 1),
      confirmed_on: d(2000, 1, 1),
      married_on:   d(2010, 1, 1),
      partner:      None,
    };
    let direct = married.revoke_baptism().unwrap();
    let stepwise = married
      .revoke_confirmation()
      .and_then(Sacramental::revoke_baptism)
      .unwrap();
    assert_eq!(direct, stepwise);
    assert_eq!(direct, Sacramental::None);
  }

  #[test]
  fn revoking_marriage_restores_confirmed() {
    let confirmed = Sacramental::Confirmed {
      baptised_on:  d(1990, 1, 1),
      confirmed_on: d(2000, 1, 1),
    };
    let married = confirmed.marry(d(2010, 1, 1), Some(Uuid::new_v4())).unwrap();
    assert_eq!(married.revoke_marriage().unwrap(), confirmed);
  }

  #[test]
  fn to_fields_demotes_stray_married_status() {
    let fields = Sacramental::None.to_fields(MaritalStatus::Married);
    assert_eq!(fields.marital_status, MaritalStatus::Single);
    let fields = Sacramental::None.to_fields(MaritalStatus::Widowed);
    assert_eq!(fields.marital_status, MaritalStatus::Widowed);
  }

  #[test]
  fn certificate_paths_are_slugged_and_prefixed() {
    let path = certificate_path(Sacrament::Baptism, "John Doe Mwakalinga", "cert.pdf").unwrap();
    assert_eq!(path, "baptism_certificates/john-doe-m_cert.pdf");
    let path = certificate_path(Sacrament::Confirmation, "Ana", "scan 1.png").unwrap();
    assert_eq!(path, "confirmation_certificates/ana_scan 1.png");
  }
}
