//! Time-period coverage: the kind of period a release covers.
//!
//! Stored as a short symbolic code (at most [`MAX_CODE_LEN`] characters), never
//! as an ordinal, so reordering the variants below cannot change the meaning
//! of stored rows.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumMessage, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

/// Width of the storage column.
pub const MAX_CODE_LEN: usize = 6;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  EnumMessage,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum TimePeriodCoverage {
  // ── Academic ───────────────────────────────────────────────────────────
  #[strum(serialize = "AY", message = "Academic Year")]
  AcademicYear,
  #[strum(serialize = "AYQ1", message = "Academic Year Q1")]
  AcademicYearQ1,
  #[strum(serialize = "AYQ2", message = "Academic Year Q2")]
  AcademicYearQ2,
  #[strum(serialize = "AYQ3", message = "Academic Year Q3")]
  AcademicYearQ3,
  #[strum(serialize = "AYQ4", message = "Academic Year Q4")]
  AcademicYearQ4,

  // ── Calendar ───────────────────────────────────────────────────────────
  #[strum(serialize = "CY", message = "Calendar Year")]
  CalendarYear,
  #[strum(serialize = "CYQ1", message = "Calendar Year Q1")]
  CalendarYearQ1,
  #[strum(serialize = "CYQ2", message = "Calendar Year Q2")]
  CalendarYearQ2,
  #[strum(serialize = "CYQ3", message = "Calendar Year Q3")]
  CalendarYearQ3,
  #[strum(serialize = "CYQ4", message = "Calendar Year Q4")]
  CalendarYearQ4,

  // ── Financial ──────────────────────────────────────────────────────────
  #[strum(serialize = "FY", message = "Financial Year")]
  FinancialYear,
  #[strum(serialize = "FYQ1", message = "Financial Year Q1")]
  FinancialYearQ1,
  #[strum(serialize = "FYQ2", message = "Financial Year Q2")]
  FinancialYearQ2,
  #[strum(serialize = "FYQ3", message = "Financial Year Q3")]
  FinancialYearQ3,
  #[strum(serialize = "FYQ4", message = "Financial Year Q4")]
  FinancialYearQ4,

  // ── Tax ────────────────────────────────────────────────────────────────
  #[strum(serialize = "TY", message = "Tax Year")]
  TaxYear,
  #[strum(serialize = "TYQ1", message = "Tax Year Q1")]
  TaxYearQ1,
  #[strum(serialize = "TYQ2", message = "Tax Year Q2")]
  TaxYearQ2,
  #[strum(serialize = "TYQ3", message = "Tax Year Q3")]
  TaxYearQ3,
  #[strum(serialize = "TYQ4", message = "Tax Year Q4")]
  TaxYearQ4,

  #[strum(serialize = "RY", message = "Reporting Year")]
  ReportingYear,

  // ── Terms ──────────────────────────────────────────────────────────────
  #[strum(serialize = "T1", message = "Autumn Term")]
  AutumnTerm,
  #[strum(serialize = "T1T2", message = "Autumn and Spring Term")]
  AutumnSpringTerm,
  #[strum(serialize = "T2", message = "Spring Term")]
  SpringTerm,
  #[strum(serialize = "T3", message = "Summer Term")]
  SummerTerm,

  // ── Months ─────────────────────────────────────────────────────────────
  #[strum(serialize = "M1", message = "January")]
  January,
  #[strum(serialize = "M2", message = "February")]
  February,
  #[strum(serialize = "M3", message = "March")]
  March,
  #[strum(serialize = "M4", message = "April")]
  April,
  #[strum(serialize = "M5", message = "May")]
  May,
  #[strum(serialize = "M6", message = "June")]
  June,
  #[strum(serialize = "M7", message = "July")]
  July,
  #[strum(serialize = "M8", message = "August")]
  August,
  #[strum(serialize = "M9", message = "September")]
  September,
  #[strum(serialize = "M10", message = "October")]
  October,
  #[strum(serialize = "M11", message = "November")]
  November,
  #[strum(serialize = "M12", message = "December")]
  December,
}

impl TimePeriodCoverage {
  /// The stable storage code, e.g. `"AY"`.
  pub fn code(self) -> &'static str { self.into() }

  /// Human-readable label, e.g. `"Academic Year"`.
  pub fn label(self) -> &'static str {
    self.get_message().unwrap_or_else(|| self.code())
  }

  /// Parse a storage code. Unknown codes are an error, never a default.
  pub fn from_code(code: &str) -> Result<Self> {
    Self::from_str(code).map_err(|_| Error::UnknownTimePeriod(code.to_owned()))
  }

  /// Resolve a label back to its coverage.
  pub fn from_label(label: &str) -> Option<Self> {
    Self::iter().find(|c| c.label() == label)
  }

  /// The full static reference table, in declaration order.
  pub fn reference_table() -> Vec<TimePeriodEntry> {
    Self::iter()
      .map(|c| TimePeriodEntry { code: c.code(), label: c.label() })
      .collect()
  }
}

/// One row of the code ↔ label reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePeriodEntry {
  pub code:  &'static str,
  pub label: &'static str,
}

impl std::fmt::Display for TimePeriodCoverage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.code())
  }
}

impl From<TimePeriodCoverage> for String {
  fn from(c: TimePeriodCoverage) -> Self { c.code().to_owned() }
}

impl TryFrom<String> for TimePeriodCoverage {
  type Error = Error;

  fn try_from(code: String) -> Result<Self> { Self::from_code(&code) }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn codes_fit_the_storage_column_and_are_unique() {
    let mut seen = HashSet::new();
    for c in TimePeriodCoverage::iter() {
      assert!(c.code().len() <= MAX_CODE_LEN, "{} too long", c.code());
      assert!(seen.insert(c.code()), "duplicate code {}", c.code());
    }
  }

  #[test]
  fn mapping_is_bidirectional() {
    for c in TimePeriodCoverage::iter() {
      assert_eq!(TimePeriodCoverage::from_code(c.code()).unwrap(), c);
      assert_eq!(TimePeriodCoverage::from_label(c.label()), Some(c));
    }
  }

  #[test]
  fn academic_year_is_ay() {
    assert_eq!(TimePeriodCoverage::AcademicYear.code(), "AY");
    assert_eq!(TimePeriodCoverage::AcademicYear.label(), "Academic Year");
    assert_eq!(
      serde_json::to_string(&TimePeriodCoverage::AutumnSpringTerm).unwrap(),
      "\"T1T2\""
    );
  }

  #[test]
  fn unknown_code_is_rejected() {
    assert!(matches!(
      TimePeriodCoverage::from_code("0"),
      Err(Error::UnknownTimePeriod(_))
    ));
    assert!(serde_json::from_str::<TimePeriodCoverage>("\"XX\"").is_err());
    assert!(serde_json::from_str::<TimePeriodCoverage>("0").is_err());
  }
}
