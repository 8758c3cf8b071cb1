//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Record factories
//! - Markdown document fixtures

use chrono::NaiveDate;

use crate::models::{Sport, WorkoutRecord};

/// ---------------------------------------------------------------------------
/// Record Factories
/// ---------------------------------------------------------------------------

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn record(
  date: NaiveDate,
  planned: Sport,
  actual: Option<Sport>,
  planned_minutes: u32,
  actual_minutes: u32,
  completed: bool,
) -> WorkoutRecord {
  WorkoutRecord {
    date,
    planned_type: planned,
    actual_type: actual,
    planned_duration_minutes: planned_minutes,
    actual_duration_minutes: actual_minutes,
    completed,
  }
}

/// Session done exactly as planned
pub fn completed(date: NaiveDate, sport: Sport, minutes: u32) -> WorkoutRecord {
  record(date, sport, Some(sport), minutes, minutes, true)
}

/// Planned session with nothing logged
pub fn missed(date: NaiveDate, sport: Sport, minutes: u32) -> WorkoutRecord {
  record(date, sport, None, minutes, 0, false)
}

/// ---------------------------------------------------------------------------
/// Markdown Fixtures
/// ---------------------------------------------------------------------------

const HISTORY_HEADER: &str = "| Date | Status | Planned Workout | Planned Duration | Actual Workout | Actual Duration |\n\
|------|--------|-----------------|------------------|----------------|-----------------|\n";

/// A document holding only the history log with the given rows
pub fn history_doc(rows: &[&str]) -> String {
  let mut doc = String::from("## Appendix C: Training History Log\n\n");
  doc.push_str(HISTORY_HEADER);
  for row in rows {
    doc.push_str(row);
    doc.push('\n');
  }
  doc
}

/// A full plan document exercising every section the parsers know about
pub fn sample_plan() -> &'static str {
  r#"# Summer Triathlon Plan

## Training Parameters

**Run Cap:** [8%]
**Bike Cap:** 25%

| Zone | Heart Rate | Power |
|------|------------|-------|
| Z1 | < 130 | < 150 W |
| Z2 | 130-145 | 150-200 W |

## Weekly Schedule

| Day | Workout | Duration |
|-----|---------|----------|
| Monday | Rest | - |
| Tuesday | Run intervals | 45 |
| Wednesday | Swim technique | 40 min |
| Thursday | Bike tempo | 1h |
| Friday | Strength | 30 |
| Saturday | Long ride | 2.5h |
| Sunday | Long run | 1h 15m |

## Event Schedule

| Date | Event | Priority | Swim Goal | Bike Goal | Run Goal |
|------|-------|----------|-----------|-----------|----------|
| 2025-07-12 | Lake Sprint Tri | B | 20 | 1h | 30 |
| 2025-09-07 | Harbor 70.3 | **A** | 45 | 3h | 2h |

## Periodization Phases

| Phase | Dates | Focus |
|-------|-------|-------|
| Base | 2025-05-01 to 2025-05-31 | Aerobic volume |
| Build | 2025-06-01 – 2025-07-10 | Race-specific intensity |

## Appendix C: Training History Log

| Date | Status | Planned Workout | Planned Duration | Actual Workout | Actual Duration |
|------|--------|-----------------|------------------|----------------|-----------------|
| YYYY-MM-DD | | Example | 0 | | |
| 2025-06-15 | Done | Long run | 1h 15m | Long run | 1h 20m |
| 2025-06-16 | Rest | Rest | - | - | - |
| 2025-06-17 | Completed | Run intervals | 45 | Run intervals | 45 |
| 2025-06-18 | Missed | Swim technique | 40 | - | - |
"#
}
