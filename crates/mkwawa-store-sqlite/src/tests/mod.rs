//! Integration tests for `SqliteStore` against an in-memory database, and
//! for the `Parish` service wired to it with in-process collaborators.

mod assets;
mod finance;
mod leaders;
mod notifications;
mod settings;

use chrono::NaiveDate;
use mkwawa_core::{
  finance::CategoryForm,
  member::{ChurchMember, Gender, MemberForm, MemberStatus},
  sacrament::SacramentFields,
  settings::{NewYear, OutStation, OutStationForm, Year},
  store::ParishStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

/// Store errors as the service sees them.
fn core(e: crate::Error) -> mkwawa_core::Error { e.into() }

fn sacrament_violation(e: crate::Error) -> bool {
  matches!(core(e), mkwawa_core::Error::SacramentInvariant(_))
}

fn member_form(name: &str, gender: Gender, phone: &str) -> MemberForm {
  MemberForm {
    full_name:               name.into(),
    date_of_birth:           d(1990, 1, 15),
    gender,
    phone_number:            phone.into(),
    email:                   None,
    address:                 None,
    cell_id:                 None,
    sacraments:              SacramentFields::default(),
    is_leader:               false,
    emergency_contact_name:  None,
    emergency_contact_phone: None,
  }
}

fn baptised_and_confirmed() -> SacramentFields {
  SacramentFields {
    is_baptised: true,
    date_of_baptism: Some(d(1990, 3, 1)),
    is_confirmed: true,
    date_confirmed: Some(d(2005, 6, 1)),
    ..Default::default()
  }
}

async fn member(s: &SqliteStore, name: &str, gender: Gender, phone: &str) -> ChurchMember {
  s.create_member(member_form(name, gender, phone), MemberStatus::Active)
    .await
    .unwrap()
}

/// An active member who is baptised and confirmed.
async fn confirmed_member(s: &SqliteStore, name: &str, gender: Gender, phone: &str) -> ChurchMember {
  let form = MemberForm { sacraments: baptised_and_confirmed(), ..member_form(name, gender, phone) };
  s.create_member(form, MemberStatus::Active).await.unwrap()
}

async fn current_year(s: &SqliteStore, year: i32) -> Year {
  s.create_year(NewYear { year, is_current: true }).await.unwrap()
}

async fn outstation(s: &SqliteStore, name: &str) -> OutStation {
  s.create_outstation(OutStationForm {
    name:        name.into(),
    description: None,
    location:    "Iringa".into(),
  })
  .await
  .unwrap()
}

fn category(name: &str) -> CategoryForm { CategoryForm { name: name.into(), description: None } }
