//! Open-Elevation lookup client.

use std::time::Duration;

use mkwawa_core::collab::{ElevationError, ElevationService};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ElevationConfig;

#[derive(Debug, Deserialize)]
struct Lookup {
  #[serde(default)]
  results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
  elevation: Option<f64>,
}

#[derive(Clone)]
pub struct OpenElevation {
  client:   Client,
  base_url: String,
}

impl OpenElevation {
  pub fn new(config: ElevationConfig) -> anyhow::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: config.base_url })
  }

  fn url(&self, latitude: f64, longitude: f64) -> String {
    format!(
      "{}/api/v1/lookup?locations={latitude},{longitude}",
      self.base_url.trim_end_matches('/')
    )
  }
}

impl ElevationService for OpenElevation {
  async fn lookup(&self, latitude: f64, longitude: f64) -> Result<f64, ElevationError> {
    let lookup: Lookup = self
      .client
      .get(self.url(latitude, longitude))
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(|e| ElevationError::Transport(Box::new(e)))?
      .json()
      .await
      .map_err(|e| ElevationError::Transport(Box::new(e)))?;
    first_elevation(lookup)
  }
}

fn first_elevation(lookup: Lookup) -> Result<f64, ElevationError> {
  lookup
    .results
    .into_iter()
    .next()
    .and_then(|r| r.elevation)
    .ok_or(ElevationError::NoResult)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_the_lookup_url() {
    let service = OpenElevation::new(ElevationConfig {
      base_url: "https://api.open-elevation.com/".into(),
    })
    .unwrap();
    assert_eq!(
      service.url(-7.77, 35.69),
      "https://api.open-elevation.com/api/v1/lookup?locations=-7.77,35.69"
    );
  }

  #[test]
  fn reads_the_first_result() {
    let lookup: Lookup = serde_json::from_str(
      r#"{"results":[{"latitude":-7.77,"longitude":35.69,"elevation":1635}]}"#,
    )
    .unwrap();
    assert_eq!(first_elevation(lookup).unwrap(), 1635.0);

    let empty: Lookup = serde_json::from_str(r#"{"results":[]}"#).unwrap();
    assert!(matches!(first_elevation(empty), Err(ElevationError::NoResult)));
  }
}
