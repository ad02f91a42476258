//! Leader registry: church offices held by members.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result, humanize,
  member::{Gender, MemberStatus},
  validate,
};

/// Offices a leader may hold.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr, EnumIter,
)]
pub enum Occupation {
  // Pastoral and preaching
  #[serde(rename = "Senior Pastor")]
  #[strum(serialize = "Senior Pastor")]
  SeniorPastor,
  #[serde(rename = "Associate Pastor")]
  #[strum(serialize = "Associate Pastor")]
  AssociatePastor,
  #[serde(rename = "Assistant Pastor")]
  #[strum(serialize = "Assistant Pastor")]
  AssistantPastor,
  #[serde(rename = "Youth Pastor")]
  #[strum(serialize = "Youth Pastor")]
  YouthPastor,
  #[serde(rename = "Children’s Pastor", alias = "Children's Pastor")]
  #[strum(to_string = "Children’s Pastor", serialize = "Children's Pastor")]
  ChildrensPastor,
  Evangelist,
  Missionary,

  // Governance
  Chairperson,
  #[serde(rename = "Vice Chairperson")]
  #[strum(serialize = "Vice Chairperson")]
  ViceChairperson,
  Secretary,
  #[serde(rename = "Assistant Secretary")]
  #[strum(serialize = "Assistant Secretary")]
  AssistantSecretary,
  #[serde(rename = "Board Chair")]
  #[strum(serialize = "Board Chair")]
  BoardChair,
  #[serde(rename = "Board Secretary")]
  #[strum(serialize = "Board Secretary")]
  BoardSecretary,
  Elder,
  #[serde(rename = "Chief Elder")]
  #[strum(serialize = "Chief Elder")]
  ChiefElder,
  Deacon,
  Deaconess,
  Steward,

  // Worship and discipleship
  #[serde(rename = "Worship Leader")]
  #[strum(serialize = "Worship Leader")]
  WorshipLeader,
  #[serde(rename = "Choir Director")]
  #[strum(serialize = "Choir Director")]
  ChoirDirector,
  #[serde(rename = "Praise Team Leader")]
  #[strum(serialize = "Praise Team Leader")]
  PraiseTeamLeader,
  #[serde(rename = "Sunday School Teacher")]
  #[strum(serialize = "Sunday School Teacher")]
  SundaySchoolTeacher,
  #[serde(rename = "Bible Study Leader")]
  #[strum(serialize = "Bible Study Leader")]
  BibleStudyLeader,
  #[serde(rename = "Small Group Leader")]
  #[strum(serialize = "Small Group Leader")]
  SmallGroupLeader,

  // Ministry departments
  #[serde(rename = "Youth Coordinator")]
  #[strum(serialize = "Youth Coordinator")]
  YouthCoordinator,
  #[serde(rename = "Women’s Ministry Leader", alias = "Women's Ministry Leader")]
  #[strum(to_string = "Women’s Ministry Leader", serialize = "Women's Ministry Leader")]
  WomensMinistryLeader,
  #[serde(rename = "Men’s Ministry Leader", alias = "Men's Ministry Leader")]
  #[strum(to_string = "Men’s Ministry Leader", serialize = "Men's Ministry Leader")]
  MensMinistryLeader,
  #[serde(rename = "Prayer Coordinator")]
  #[strum(serialize = "Prayer Coordinator")]
  PrayerCoordinator,
  #[serde(rename = "Intercessory Leader")]
  #[strum(serialize = "Intercessory Leader")]
  IntercessoryLeader,
  #[serde(rename = "Outreach Coordinator")]
  #[strum(serialize = "Outreach Coordinator")]
  OutreachCoordinator,
  #[serde(rename = "Missions Coordinator")]
  #[strum(serialize = "Missions Coordinator")]
  MissionsCoordinator,
  #[serde(rename = "Social Ministry Leader")]
  #[strum(serialize = "Social Ministry Leader")]
  SocialMinistryLeader,
  #[serde(rename = "Hospitality Coordinator")]
  #[strum(serialize = "Hospitality Coordinator")]
  HospitalityCoordinator,
  #[serde(rename = "Ushering Coordinator")]
  #[strum(serialize = "Ushering Coordinator")]
  UsheringCoordinator,
  #[serde(rename = "Security Coordinator")]
  #[strum(serialize = "Security Coordinator")]
  SecurityCoordinator,
  #[serde(rename = "Maintenance Supervisor")]
  #[strum(serialize = "Maintenance Supervisor")]
  MaintenanceSupervisor,
  #[serde(rename = "Welfare Coordinator")]
  #[strum(serialize = "Welfare Coordinator")]
  WelfareCoordinator,
  #[serde(rename = "Media/Tech Team Lead")]
  #[strum(serialize = "Media/Tech Team Lead")]
  MediaTechTeamLead,
  #[serde(rename = "Communications Officer")]
  #[strum(serialize = "Communications Officer")]
  CommunicationsOfficer,

  // Finance and administration
  #[serde(rename = "Church Treasurer")]
  #[strum(serialize = "Church Treasurer")]
  ChurchTreasurer,
  #[serde(rename = "Church Accountant")]
  #[strum(serialize = "Church Accountant")]
  ChurchAccountant,
  Administrator,

  // Advisory
  Patron,
  Matron,
  Advisor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
  pub id:               Uuid,
  /// Ten digits and ten lowercase letters, shuffled.
  pub leader_id:        String,
  pub church_member_id: Uuid,
  pub occupation:       Occupation,
  pub start_date:       NaiveDate,
  pub responsibilities: String,
  /// Last rendered service duration; refreshed on read.
  pub time_in_service:  Option<String>,
  pub outstation_id:    Option<Uuid>,
  pub date_created:     DateTime<Utc>,
}

impl Leader {
  pub fn refresh_time_in_service(&mut self, today: NaiveDate) -> bool {
    let current = humanize::time_in_service(self.start_date, today);
    if self.time_in_service.as_deref() == Some(current.as_str()) {
      return false;
    }
    self.time_in_service = Some(current);
    true
  }
}

/// A leader joined with the member details used for listing and filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderView {
  #[serde(flatten)]
  pub leader:        Leader,
  pub full_name:     String,
  pub gender:        Gender,
  pub member_status: MemberStatus,
  pub cell_id:       Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderForm {
  pub church_member_id: Uuid,
  pub occupation:       Occupation,
  pub start_date:       NaiveDate,
  pub responsibilities: String,
  #[serde(default)]
  pub outstation_id:    Option<Uuid>,
}

impl LeaderForm {
  pub fn validate(&self) -> Result<()> {
    validate::required("responsibilities", &self.responsibilities)?;
    if self.occupation == Occupation::Evangelist && self.outstation_id.is_none() {
      return Err(Error::EvangelistOutstationRequired);
    }
    Ok(())
  }
}

/// Listing filters. Only members with the leader flag set are returned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderQuery {
  pub member_status: Option<MemberStatus>,
  pub gender:        Option<Gender>,
  pub occupation:    Option<Occupation>,
  pub cell_id:       Option<Uuid>,
  /// Matches the leader's own outstation or the outstation of the member's
  /// cell.
  pub outstation_id: Option<Uuid>,
}
