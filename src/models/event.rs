use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Sport;

/// A race or target event from the plan's event schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
  pub date: NaiveDate,
  pub name: String,
  /// Free-text tier label ("A", "B race", ...)
  pub priority: String,
  pub swim_goal_minutes: u32,
  pub bike_goal_minutes: u32,
  pub run_goal_minutes: u32,
}

impl EventRecord {
  pub fn is_upcoming(&self, today: NaiveDate) -> bool {
    self.date >= today
  }

  pub fn days_until(&self, today: NaiveDate) -> i64 {
    (self.date - today).num_days()
  }

  /// Goal duration for the three disciplines the readiness score covers
  pub fn goal_for(&self, sport: Sport) -> u32 {
    match sport {
      Sport::Swim => self.swim_goal_minutes,
      Sport::Bike => self.bike_goal_minutes,
      Sport::Run => self.run_goal_minutes,
      _ => 0,
    }
  }
}
