//! `GET /time-periods`: the static code ↔ label reference table.

use axum::Json;
use statpub_core::period::{TimePeriodCoverage, TimePeriodEntry};

pub async fn list() -> Json<Vec<TimePeriodEntry>> {
  Json(TimePeriodCoverage::reference_table())
}
