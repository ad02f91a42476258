//! Notification dispatcher types: in-app notifications and the log of
//! outbound SMS.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:           Uuid,
  pub title:        String,
  pub message:      String,
  pub recipient_id: Uuid,
  pub is_read:      bool,
  pub created_at:   DateTime<Utc>,
}

/// A batch notification: one row and one SMS per distinct recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
  pub title:         String,
  pub message:       String,
  pub recipient_ids: Vec<Uuid>,
}

impl Dispatch {
  /// Checks the text fields and removes duplicate recipients, keeping the
  /// first occurrence of each.
  pub fn normalise(mut self) -> Result<Self> {
    validate::required("title", &self.title)?;
    validate::required("message", &self.message)?;
    let mut seen = std::collections::HashSet::new();
    self.recipient_ids.retain(|id| seen.insert(*id));
    if self.recipient_ids.is_empty() {
      return Err(Error::validation("recipient_ids", "at least one recipient is required"));
    }
    Ok(self)
  }
}

/// A stored notification with the recipient details needed to text them.
#[derive(Debug, Clone)]
pub struct NotificationDelivery {
  pub notification: Notification,
  pub full_name:    String,
  pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
  pub notifications: Vec<Notification>,
  pub sms_sent:      usize,
  pub sms_failed:    usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
  pub recipient_id: Option<Uuid>,
  pub title:        Option<String>,
  pub is_read:      Option<bool>,
}

// ─── SMS log ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SmsStatus {
  #[default]
  Pending,
  Sent,
  Delivered,
  Error,
  Unknown,
}

impl SmsStatus {
  /// Map a gateway status name; unrecognised names become `Unknown`.
  pub fn from_gateway(name: &str) -> Self {
    name.trim().parse().unwrap_or(Self::Unknown)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentSms {
  pub id:           Uuid,
  pub recipient_id: Option<Uuid>,
  pub phone_number: String,
  pub message:      String,
  pub request_id:   String,
  pub status:       SmsStatus,
  pub sent_at:      DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSentSms {
  pub recipient_id: Option<Uuid>,
  pub phone_number: String,
  pub message:      String,
  pub request_id:   String,
  pub status:       SmsStatus,
}

// ─── Message templates ───────────────────────────────────────────────────────

/// Default address members use to request an account after approval.
pub const DEFAULT_ACCOUNT_REQUEST_URL: &str =
  "https://www.kkktmkwawa.com/accounts/request-account/";

/// Welcome SMS sent when a member becomes active.
pub fn approval_message(full_name: &str, member_id: &str, account_url: &str) -> String {
  format!(
    "Hongera {full_name}! Umeidhinishwa kuwa mshirika hai wa KKKT Mkwawa. \
     Kitambulisho chako cha uanachama ni {member_id}. Tumia ID hii kuomba \
     akaunti au kubadilisha nenosiri kupitia {account_url}. Karibu sana \
     katika jumuiya yetu!"
  )
}

/// SMS body for a dispatched notification. The title is not included.
pub fn notification_sms(full_name: &str, message: &str) -> String {
  format!("Ndugu {full_name}, {message}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dispatch_deduplicates_recipients() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let d = Dispatch {
      title:         "Mkutano".into(),
      message:       "Karibu".into(),
      recipient_ids: vec![a, b, a, a],
    }
    .normalise()
    .unwrap();
    assert_eq!(d.recipient_ids, vec![a, b]);
  }

  #[test]
  fn dispatch_needs_recipients() {
    let d = Dispatch { title: "t".into(), message: "m".into(), recipient_ids: vec![] };
    assert!(d.normalise().is_err());
  }

  #[test]
  fn templates() {
    let body = approval_message("John Doe", "AB12CD34EF56GH78IJ90", DEFAULT_ACCOUNT_REQUEST_URL);
    assert!(body.contains("AB12CD34EF56GH78IJ90"));
    assert!(body.contains(DEFAULT_ACCOUNT_REQUEST_URL));
    assert!(body.contains("Tumia ID hii kuomba akaunti"));
    assert_eq!(notification_sms("Jane", "Ibada ni saa tatu"), "Ndugu Jane, Ibada ni saa tatu");
  }

  #[test]
  fn gateway_status_names() {
    assert_eq!(SmsStatus::from_gateway("PENDING"), SmsStatus::Pending);
    assert_eq!(SmsStatus::from_gateway("delivered"), SmsStatus::Delivered);
    assert_eq!(SmsStatus::from_gateway("REJECTED"), SmsStatus::Unknown);
  }
}
