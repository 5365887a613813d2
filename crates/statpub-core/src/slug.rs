//! URL-safe slugs.
//!
//! Every addressable entity (theme, topic, publication, release) carries a
//! slug. Slugs are never rewritten when a title changes; a superseded slug
//! simply stops resolving.

use crate::{Error, Result};

/// Check that `slug` is non-empty and made only of lowercase ASCII letters,
/// digits and single interior hyphens.
pub fn validate(slug: &str) -> Result<()> {
  let valid = !slug.is_empty()
    && !slug.starts_with('-')
    && !slug.ends_with('-')
    && !slug.contains("--")
    && slug
      .bytes()
      .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');

  if valid {
    Ok(())
  } else {
    Err(Error::InvalidSlug(slug.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_plain_slugs() {
    assert!(validate("pupil-absence-in-schools-in-england").is_ok());
    assert!(validate("2016-17").is_ok());
    assert!(validate("a").is_ok());
  }

  #[test]
  fn rejects_unsafe_slugs() {
    for bad in ["", "-lead", "trail-", "dou--ble", "Upper", "sp ace", "slash/"] {
      assert!(
        matches!(validate(bad), Err(Error::InvalidSlug(_))),
        "accepted {bad:?}"
      );
    }
  }
}
