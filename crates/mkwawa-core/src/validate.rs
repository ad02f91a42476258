//! Field-level validation shared by every write path.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use unicode_normalization::UnicodeNormalization as _;

use crate::{Error, Result};

static PHONE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^255\d{9}$").expect("static regex"));

static GMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z0-9._%+-]+@gmail\.com$").expect("static regex")
});

/// Years a [`crate::settings::Year`] may take.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2020..=2080;

/// Longest stored path for an uploaded file.
pub const MAX_PATH_LEN: usize = 250;

/// `255` followed by exactly nine digits.
pub fn phone(field: &'static str, value: &str) -> Result<()> {
  if PHONE.is_match(value) {
    Ok(())
  } else {
    Err(Error::validation(
      field,
      "phone number must be in the format 255XXXXXXXXX (9 digits after 255)",
    ))
  }
}

/// Optional address; when present it must be a Gmail address.
pub fn gmail(field: &'static str, value: Option<&str>) -> Result<()> {
  match value {
    None => Ok(()),
    Some(v) if GMAIL.is_match(v) => Ok(()),
    Some(_) => Err(Error::validation(
      field,
      "email must be a valid Gmail address ending with '@gmail.com'",
    )),
  }
}

pub fn required(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    Err(Error::validation(field, "must not be empty"))
  } else {
    Ok(())
  }
}

/// Strictly positive with at most two fractional digits.
pub fn money(field: &'static str, amount: Decimal) -> Result<()> {
  if amount <= Decimal::ZERO {
    return Err(Error::validation(field, "amount must be positive"));
  }
  fractional_digits(field, amount)
}

/// Zero or positive with at most two fractional digits.
pub fn money_or_zero(field: &'static str, amount: Decimal) -> Result<()> {
  if amount < Decimal::ZERO {
    return Err(Error::validation(field, "amount must not be negative"));
  }
  fractional_digits(field, amount)
}

fn fractional_digits(field: &'static str, amount: Decimal) -> Result<()> {
  if amount.normalize().scale() > 2 {
    return Err(Error::validation(field, "at most two decimal places are allowed"));
  }
  Ok(())
}

pub fn year_in_range(year: i32) -> Result<()> {
  if YEAR_RANGE.contains(&year) {
    Ok(())
  } else {
    Err(Error::InvalidYear {
      year,
      reason: format!(
        "must be between {} and {}",
        YEAR_RANGE.start(),
        YEAR_RANGE.end()
      ),
    })
  }
}

/// ASCII slug: accents folded, lowercased, runs of whitespace and hyphens
/// collapsed to one hyphen, leading/trailing `-` and `_` stripped.
pub fn slugify(value: &str) -> String {
  let ascii: String = value.nfkd().filter(char::is_ascii).collect();
  let kept: String = ascii
    .to_lowercase()
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
    .collect();

  let mut slug = String::with_capacity(kept.len());
  let mut pending_dash = false;
  for c in kept.chars() {
    if c == '-' || c.is_whitespace() {
      pending_dash = true;
    } else {
      if pending_dash {
        slug.push('-');
        pending_dash = false;
      }
      slug.push(c);
    }
  }
  if pending_dash {
    slug.push('-');
  }
  slug.trim_matches(|c| c == '-' || c == '_').to_owned()
}

/// Keep the last path component of a client-supplied file name.
pub fn file_name(original: &str) -> Result<String> {
  let name = original
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or_default()
    .trim();
  if name.is_empty() || name == "." || name == ".." {
    return Err(Error::validation("file_name", "a file name is required"));
  }
  Ok(name.to_owned())
}

/// `<dir>/<name>` truncated to [`MAX_PATH_LEN`] characters.
pub fn upload_path(dir: &str, name: &str) -> String {
  format!("{dir}/{name}").chars().take(MAX_PATH_LEN).collect()
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn phone_format() {
    assert!(phone("phone_number", "255712345678").is_ok());
    assert!(phone("phone_number", "0712345678").is_err());
    assert!(phone("phone_number", "2557123456789").is_err());
    assert!(phone("phone_number", "25571234567a").is_err());
  }

  #[test]
  fn gmail_only_when_present() {
    assert!(gmail("email", None).is_ok());
    assert!(gmail("email", Some("john.doe+church@gmail.com")).is_ok());
    assert!(gmail("email", Some("john@yahoo.com")).is_err());
    assert!(gmail("email", Some("john@gmail.com.tz")).is_err());
  }

  #[test]
  fn money_is_positive_with_two_places() {
    assert!(money("amount", Decimal::from_str("100.50").unwrap()).is_ok());
    assert!(money("amount", Decimal::from_str("100.500").unwrap()).is_ok());
    assert!(money("amount", Decimal::from_str("0").unwrap()).is_err());
    assert!(money("amount", Decimal::from_str("-5").unwrap()).is_err());
    assert!(money("amount", Decimal::from_str("1.005").unwrap()).is_err());
    assert!(money_or_zero("amount", Decimal::ZERO).is_ok());
  }

  #[test]
  fn year_bounds() {
    assert!(year_in_range(2020).is_ok());
    assert!(year_in_range(2080).is_ok());
    assert!(year_in_range(2019).is_err());
    assert!(year_in_range(2081).is_err());
  }

  #[test]
  fn slugify_matches_web_slugs() {
    assert_eq!(slugify("John Doe"), "john-doe");
    assert_eq!(slugify("  Héllo, Wörld!  "), "hello-world");
    assert_eq!(slugify("a -- b"), "a-b");
    assert_eq!(slugify("_under_"), "under");
  }

  #[test]
  fn file_name_strips_directories() {
    assert_eq!(file_name("C:\\docs\\cert.pdf").unwrap(), "cert.pdf");
    assert_eq!(file_name("../../etc/passwd").unwrap(), "passwd");
    assert!(file_name("dir/").is_err());
  }

  #[test]
  fn upload_path_is_truncated() {
    let long = "x".repeat(400);
    assert_eq!(upload_path("receipt_uploads", &long).chars().count(), MAX_PATH_LEN);
  }
}
