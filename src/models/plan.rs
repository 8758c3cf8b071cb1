use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::Sport;

/// One line of the recurring weekly schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
  pub weekday: Weekday,
  pub workout: String,
  pub sport: Sport,
  pub duration_minutes: u32,
}

/// A block of the periodization plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
  pub name: String,
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub focus: Option<String>,
}

impl Phase {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

/// Week-over-week growth caps, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthCaps {
  pub run: f64,
  pub bike: f64,
  pub swim: f64,
  pub all: f64,
}

impl Default for GrowthCaps {
  fn default() -> Self {
    Self {
      run: 10.0,
      bike: 20.0,
      swim: 20.0,
      all: 15.0,
    }
  }
}

/// A titled list from the gear guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearSection {
  pub title: String,
  pub items: Vec<String>,
}
