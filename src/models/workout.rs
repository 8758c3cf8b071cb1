use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates;

/// Sport category inferred from free-text workout cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
  Bike,
  Run,
  Swim,
  Strength,
  Rest,
  Other,
}

/// Keyword table, checked in order. "Brick" style cells that mention both a
/// ride and a run classify as Bike.
const SPORT_KEYWORDS: &[(&[&str], Sport)] = &[
  (&["bike", "cycle", "ride"], Sport::Bike),
  (&["run"], Sport::Run),
  (&["swim"], Sport::Swim),
  (&["strength", "lift"], Sport::Strength),
  (&["rest"], Sport::Rest),
];

impl Sport {
  /// Classify a workout description by keyword
  pub fn infer(text: &str) -> Self {
    let lower = text.to_lowercase();
    SPORT_KEYWORDS
      .iter()
      .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
      .map(|(_, sport)| *sport)
      .unwrap_or(Sport::Other)
  }
}

/// Which sessions a statistic looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "sport")]
pub enum SportFilter {
  #[default]
  All,
  Only(Sport),
}

impl SportFilter {
  pub fn matches(&self, sport: Sport) -> bool {
    match self {
      SportFilter::All => true,
      SportFilter::Only(s) => *s == sport,
    }
  }
}

impl std::str::FromStr for SportFilter {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "all" | "" => Ok(Self::All),
      "bike" => Ok(Self::Only(Sport::Bike)),
      "run" => Ok(Self::Only(Sport::Run)),
      "swim" => Ok(Self::Only(Sport::Swim)),
      "strength" => Ok(Self::Only(Sport::Strength)),
      other => Err(format!("Unknown sport filter: {}", other)),
    }
  }
}

/// One row of the training history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
  /// Calendar day of the session (timezone-free)
  pub date: NaiveDate,
  pub planned_type: Sport,
  /// None when the actual-workout cell was left empty
  pub actual_type: Option<Sport>,
  pub planned_duration_minutes: u32,
  pub actual_duration_minutes: u32,
  pub completed: bool,
}

impl WorkoutRecord {
  /// The record's date at 12:00, for consumers that need a time of day
  pub fn timestamp(&self) -> NaiveDateTime {
    dates::noon(self.date)
  }

  /// Sport that was actually done, falling back to the plan
  pub fn executed_type(&self) -> Sport {
    self.actual_type.unwrap_or(self.planned_type)
  }

  /// A row counts as planned unless it is a rest day or an empty cell
  pub fn has_plan(&self) -> bool {
    match self.planned_type {
      Sport::Rest => false,
      Sport::Other => self.planned_duration_minutes > 0,
      _ => true,
    }
  }
}
