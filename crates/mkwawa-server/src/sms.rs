//! NextSMS gateway client.

use std::time::Duration;

use mkwawa_core::collab::{SmsError, SmsGateway, SmsReceipt};
use reqwest::{Client, header};
use serde::Serialize;
use serde_json::Value;

use crate::config::SmsConfig;

/// Reference attached to every message so the gateway's reports can be
/// traced back to the registry.
const REFERENCE: &str = "church-app";

#[derive(Debug, Serialize)]
struct Payload<'a> {
  from:      &'a str,
  to:        &'a str,
  text:      &'a str,
  reference: &'a str,
}

#[derive(Clone)]
pub struct NextSms {
  client: Client,
  config: SmsConfig,
}

impl NextSms {
  pub fn new(config: SmsConfig) -> anyhow::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  pub fn is_configured(&self) -> bool {
    !self.config.username.is_empty() && !self.config.password.is_empty()
  }

  fn url(&self) -> String {
    format!("{}/api/sms/v1/text/single", self.config.base_url.trim_end_matches('/'))
  }
}

impl SmsGateway for NextSms {
  async fn send(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
    if !self.is_configured() {
      return Err(SmsError::NotConfigured);
    }
    let payload = Payload {
      from: &self.config.sender_id,
      to,
      text: message,
      reference: REFERENCE,
    };
    let resp = self
      .client
      .post(self.url())
      .basic_auth(&self.config.username, Some(&self.config.password))
      .header(header::ACCEPT, "application/json")
      .json(&payload)
      .send()
      .await
      .map_err(|e| SmsError::Transport(Box::new(e)))?;

    let status = resp.status();
    let text = resp
      .text()
      .await
      .map_err(|e| SmsError::Transport(Box::new(e)))?;
    if !status.is_success() {
      return Err(SmsError::Rejected(format!("{status}: {text}")));
    }
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(parse_receipt(&body))
  }
}

/// Read the first message of a send response:
/// `{"messages":[{"messageId":"…","status":{"name":"PENDING"}}]}`.
/// Fields the gateway leaves out fall back to an empty ID and `SENT`.
pub fn parse_receipt(body: &Value) -> SmsReceipt {
  let first = &body["messages"][0];
  let request_id = first["messageId"]
    .as_str()
    .or_else(|| first["id"].as_str())
    .map(str::to_owned)
    .or_else(|| first["messageId"].as_i64().map(|n| n.to_string()))
    .unwrap_or_default();
  let status = match &first["status"] {
    Value::Object(status) => status
      .get("name")
      .or_else(|| status.get("groupName"))
      .and_then(Value::as_str),
    Value::String(name) => Some(name.as_str()),
    _ => None,
  }
  .unwrap_or("SENT")
  .to_owned();
  SmsReceipt { status, request_id }
}
