//! Generated identifiers.
//!
//! Member, leader and receipt IDs are fixed-length strings made of an exact
//! number of letters and digits, shuffled. Outstation and cell IDs are random
//! integers of fixed width. Uniqueness is enforced by rejection sampling
//! against the store, bounded by [`MAX_ID_ATTEMPTS`].

use rand::{Rng, seq::SliceRandom};

use crate::{Error, Result};

/// Candidates drawn before giving up with [`Error::IdExhaustion`].
pub const MAX_ID_ATTEMPTS: usize = 20;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const NONZERO_DIGITS: &[u8] = b"123456789";

fn shuffled_mix<R: Rng + ?Sized>(
  rng: &mut R,
  letters: &[u8],
  n_letters: usize,
  digits: &[u8],
  n_digits: usize,
) -> String {
  let mut chars: Vec<u8> = Vec::with_capacity(n_letters + n_digits);
  chars.extend((0..n_letters).map(|_| letters[rng.gen_range(0..letters.len())]));
  chars.extend((0..n_digits).map(|_| digits[rng.gen_range(0..digits.len())]));
  chars.shuffle(rng);
  chars.into_iter().map(char::from).collect()
}

/// 20 characters: 10 uppercase letters and 10 digits, shuffled.
pub fn member_id<R: Rng + ?Sized>(rng: &mut R) -> String {
  shuffled_mix(rng, UPPER, 10, DIGITS, 10)
}

/// 20 characters: 10 lowercase letters and 10 digits, shuffled.
pub fn leader_id<R: Rng + ?Sized>(rng: &mut R) -> String {
  shuffled_mix(rng, LOWER, 10, DIGITS, 10)
}

/// 10 characters: 5 uppercase letters and 5 digits in `1..=9`, shuffled.
pub fn receipt_id<R: Rng + ?Sized>(rng: &mut R) -> String {
  shuffled_mix(rng, UPPER, 5, NONZERO_DIGITS, 5)
}

/// Six-digit outstation number.
pub fn outstation_number<R: Rng + ?Sized>(rng: &mut R) -> u32 {
  rng.gen_range(100_000..=999_999)
}

/// Seven-digit cell number.
pub fn cell_number<R: Rng + ?Sized>(rng: &mut R) -> u32 {
  rng.gen_range(1_000_000..=9_999_999)
}

fn counts(s: &str, letter: fn(&u8) -> bool, digit: fn(&u8) -> bool) -> Option<(usize, usize)> {
  let mut letters = 0;
  let mut digits = 0;
  for b in s.as_bytes() {
    if letter(b) {
      letters += 1;
    } else if digit(b) {
      digits += 1;
    } else {
      return None;
    }
  }
  Some((letters, digits))
}

pub fn is_member_id(s: &str) -> bool {
  counts(s, u8::is_ascii_uppercase, u8::is_ascii_digit) == Some((10, 10))
}

pub fn is_leader_id(s: &str) -> bool {
  counts(s, u8::is_ascii_lowercase, u8::is_ascii_digit) == Some((10, 10))
}

pub fn is_receipt_id(s: &str) -> bool {
  counts(s, u8::is_ascii_uppercase, |b| (b'1'..=b'9').contains(b)) == Some((5, 5))
}

/// Draw candidates until `taken` reports a free one.
///
/// `taken` is usually a uniqueness probe against the store; its errors
/// propagate unchanged.
pub fn generate_unique<T, E, G, F>(what: &'static str, mut candidate: G, mut taken: F) -> Result<T, E>
where
  G: FnMut() -> T,
  F: FnMut(&T) -> Result<bool, E>,
  E: From<Error>,
{
  for attempt in 1..=MAX_ID_ATTEMPTS {
    let id = candidate();
    if !taken(&id)? {
      return Ok(id);
    }
    tracing::debug!(what, attempt, "generated id already taken; retrying");
  }
  Err(Error::IdExhaustion(what).into())
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn member_ids_have_ten_letters_and_ten_digits() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
      let id = member_id(&mut rng);
      assert_eq!(id.len(), 20);
      assert!(is_member_id(&id), "{id}");
    }
  }

  #[test]
  fn leader_ids_are_lowercase() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
      let id = leader_id(&mut rng);
      assert!(is_leader_id(&id), "{id}");
      assert!(!is_member_id(&id));
    }
  }

  #[test]
  fn receipt_ids_never_contain_zero() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
      let id = receipt_id(&mut rng);
      assert!(is_receipt_id(&id), "{id}");
      assert!(!id.contains('0'));
    }
  }

  #[test]
  fn numeric_ids_have_fixed_width() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
      assert_eq!(outstation_number(&mut rng).to_string().len(), 6);
      assert_eq!(cell_number(&mut rng).to_string().len(), 7);
    }
  }

  #[test]
  fn generate_unique_retries_until_free() {
    let mut seq = vec![3, 2, 1].into_iter();
    let taken: HashSet<i32> = [3, 2].into_iter().collect();
    let got: Result<i32> =
      generate_unique("number", || seq.next().unwrap_or(0), |n| Ok(taken.contains(n)));
    assert_eq!(got.unwrap(), 1);
  }

  #[test]
  fn generate_unique_gives_up_after_bounded_attempts() {
    let mut drawn = 0;
    let got: Result<i32> = generate_unique(
      "number",
      || {
        drawn += 1;
        7
      },
      |_| Ok(true),
    );
    assert!(matches!(got, Err(Error::IdExhaustion("number"))));
    assert_eq!(drawn, MAX_ID_ATTEMPTS);
  }
}
