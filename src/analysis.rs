//! Deterministic aggregation layer for the training history log
//!
//! Everything here is a pure function of the parsed records and a reference
//! "today". The view layer only formats what these functions return.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{format_minutes, short_label, week_ending_saturday};
use crate::models::{EventRecord, Sport, SportFilter, WorkoutRecord};

/// Percentages are capped so a sparse plan can't blow up the chart scale
pub const MAX_ADHERENCE_PCT: u32 = 300;

/// Trailing windows (days) computed at every rolling anchor
pub const ROLLING_WINDOWS: [i64; 3] = [7, 30, 60];

/// Number of Sunday-Saturday weeks in the volume chart
pub const VOLUME_WEEKS: usize = 12;

/// Lookback for the "longest session" readiness input
pub const READINESS_LOOKBACK_DAYS: i64 = 30;

/// Duration labels switch to hours once the target reaches this many minutes
const HOURS_LABEL_THRESHOLD: f64 = 120.0;

/// ---------------------------------------------------------------------------
/// Selection Types
/// ---------------------------------------------------------------------------

/// What adherence is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceMode {
  /// Completed days vs days with a plan
  #[default]
  Count,
  /// Actual minutes vs planned minutes
  Duration,
}

impl std::str::FromStr for AdherenceMode {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "count" => Ok(Self::Count),
      "duration" => Ok(Self::Duration),
      other => Err(format!("Unknown adherence mode: {}", other)),
    }
  }
}

/// Chart range; decides how many weekly anchors are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRange {
  Month,
  #[default]
  Quarter,
  HalfYear,
  Year,
}

impl DisplayRange {
  pub fn anchors(&self) -> usize {
    match self {
      DisplayRange::Month => 4,
      DisplayRange::Quarter => 13,
      DisplayRange::HalfYear => 26,
      DisplayRange::Year => 52,
    }
  }
}

impl std::str::FromStr for DisplayRange {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "30d" | "month" => Ok(Self::Month),
      "90d" | "quarter" => Ok(Self::Quarter),
      "6m" | "180d" | "half_year" => Ok(Self::HalfYear),
      "1y" | "365d" | "year" => Ok(Self::Year),
      other => Err(format!("Unknown display range: {}", other)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Window Totals
/// ---------------------------------------------------------------------------

/// Planned vs actual over one window, in the unit of the adherence mode
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct WindowTotals {
  planned: f64,
  actual: f64,
}

/// `round(actual / planned * 100)`, capped; 0 without a planned denominator
pub fn adherence_pct(actual: f64, planned: f64) -> u32 {
  if planned <= 0.0 {
    return 0;
  }
  let pct = (actual / planned * 100.0).round().max(0.0) as u32;
  pct.min(MAX_ADHERENCE_PCT)
}

fn in_window(date: NaiveDate, end: NaiveDate, days: i64) -> bool {
  let start = end - Duration::days(days - 1);
  start <= date && date <= end
}

fn window_totals(
  records: &[WorkoutRecord],
  end: NaiveDate,
  days: i64,
  filter: SportFilter,
  mode: AdherenceMode,
) -> WindowTotals {
  let window = records.iter().filter(|r| in_window(r.date, end, days));

  match mode {
    AdherenceMode::Duration => window.fold(WindowTotals::default(), |mut acc, r| {
      if filter.matches(r.planned_type) {
        acc.planned += r.planned_duration_minutes as f64;
      }
      if filter.matches(r.executed_type()) {
        acc.actual += r.actual_duration_minutes as f64;
      }
      acc
    }),
    AdherenceMode::Count => {
      let mut planned_days = HashSet::new();
      let mut completed_days = HashSet::new();
      for r in window {
        if r.has_plan() && filter.matches(r.planned_type) {
          planned_days.insert(r.date);
        }
        // A done rest day is not adherence to anything
        if r.completed && r.has_plan() && filter.matches(r.executed_type()) {
          completed_days.insert(r.date);
        }
      }
      WindowTotals {
        planned: planned_days.len() as f64,
        actual: completed_days.len() as f64,
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Rolling Adherence
/// ---------------------------------------------------------------------------

/// Adherence at one weekly anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
  pub label: String,
  pub anchor: NaiveDate,
  pub pct_7d: u32,
  pub pct_30d: u32,
  pub pct_60d: u32,
  /// Human-readable totals behind the 7-day value
  #[serde(skip_serializing_if = "Option::is_none")]
  pub breakdown: Option<String>,
}

/// One point per week going back from `today`, oldest first
pub fn rolling_points(
  records: &[WorkoutRecord],
  today: NaiveDate,
  filter: SportFilter,
  mode: AdherenceMode,
  range: DisplayRange,
) -> Vec<RollingPoint> {
  (0..range.anchors())
    .rev()
    .map(|weeks_back| {
      let anchor = today - Duration::weeks(weeks_back as i64);
      let [week, month, two_month] =
        ROLLING_WINDOWS.map(|days| window_totals(records, anchor, days, filter, mode));

      RollingPoint {
        label: short_label(anchor),
        anchor,
        pct_7d: adherence_pct(week.actual, week.planned),
        pct_30d: adherence_pct(month.actual, month.planned),
        pct_60d: adherence_pct(two_month.actual, two_month.planned),
        breakdown: describe_totals(week, mode),
      }
    })
    .collect()
}

fn describe_totals(totals: WindowTotals, mode: AdherenceMode) -> Option<String> {
  if totals.planned <= 0.0 && totals.actual <= 0.0 {
    return None;
  }
  Some(match mode {
    AdherenceMode::Count => format!("{} of {} days", totals.actual, totals.planned),
    AdherenceMode::Duration => format!(
      "{} of {}",
      format_minutes(totals.actual as u32),
      format_minutes(totals.planned as u32)
    ),
  })
}

/// ---------------------------------------------------------------------------
/// Weekly Volume
/// ---------------------------------------------------------------------------

/// Planned and actual minutes for one Sunday-Saturday week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBucket {
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub planned_minutes: u32,
  pub actual_minutes: u32,
}

/// Trailing twelve weeks ending on the upcoming Saturday, oldest first.
///
/// Planned minutes follow the planned sport and actual minutes the executed
/// sport, so a swapped session shows as planned-but-missed in one sport and
/// unplanned volume in the other.
pub fn volume_buckets(
  records: &[WorkoutRecord],
  today: NaiveDate,
  filter: SportFilter,
) -> Vec<VolumeBucket> {
  let last_end = week_ending_saturday(today);
  let first_start = last_end - Duration::days(VOLUME_WEEKS as i64 * 7 - 1);

  let mut buckets: Vec<VolumeBucket> = (0..VOLUME_WEEKS)
    .map(|i| {
      let start_date = first_start + Duration::weeks(i as i64);
      VolumeBucket {
        start_date,
        end_date: start_date + Duration::days(6),
        planned_minutes: 0,
        actual_minutes: 0,
      }
    })
    .collect();

  for r in records {
    if r.date < first_start || r.date > last_end {
      continue;
    }
    let idx = ((r.date - first_start).num_days() / 7) as usize;
    let bucket = &mut buckets[idx];
    if filter.matches(r.planned_type) {
      bucket.planned_minutes += r.planned_duration_minutes;
    }
    if filter.matches(r.executed_type()) {
      bucket.actual_minutes += r.actual_duration_minutes;
    }
  }

  buckets
}

/// ---------------------------------------------------------------------------
/// Growth vs Cap
/// ---------------------------------------------------------------------------

/// Band a week-over-week change falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthRisk {
  /// Above the cap
  Risk,
  /// Within 5 points of the cap
  Caution,
  /// Dropped more than 20%
  Deload,
  Normal,
}

impl GrowthRisk {
  pub fn classify(change_pct: f64, cap_pct: f64) -> Self {
    if change_pct > cap_pct {
      GrowthRisk::Risk
    } else if change_pct >= cap_pct - 5.0 {
      GrowthRisk::Caution
    } else if change_pct < -20.0 {
      GrowthRisk::Deload
    } else {
      GrowthRisk::Normal
    }
  }
}

/// A volume bucket with its change against the previous week's actual volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekGrowth {
  pub bucket: VolumeBucket,
  pub planned_change_pct: Option<f64>,
  pub actual_change_pct: Option<f64>,
  pub planned_risk: Option<GrowthRisk>,
  pub actual_risk: Option<GrowthRisk>,
}

pub fn growth_report(buckets: &[VolumeBucket], cap_pct: f64) -> Vec<WeekGrowth> {
  buckets
    .iter()
    .enumerate()
    .map(|(i, bucket)| {
      let prior = i
        .checked_sub(1)
        .map(|p| buckets[p].actual_minutes as f64)
        .filter(|p| *p > 0.0);
      let change = |value: u32| prior.map(|p| (value as f64 - p) / p * 100.0);

      let planned_change_pct = change(bucket.planned_minutes);
      let actual_change_pct = change(bucket.actual_minutes);

      WeekGrowth {
        bucket: bucket.clone(),
        planned_change_pct: planned_change_pct.map(round_tenth),
        actual_change_pct: actual_change_pct.map(round_tenth),
        planned_risk: planned_change_pct.map(|c| GrowthRisk::classify(c, cap_pct)),
        actual_risk: actual_change_pct.map(|c| GrowthRisk::classify(c, cap_pct)),
      }
    })
    .collect()
}

fn round_tenth(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// ---------------------------------------------------------------------------
/// Window Stats
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
  pub days: i64,
  pub mode: AdherenceMode,
  pub pct: u32,
  pub actual: f64,
  pub target: f64,
  /// "3/4", "45/60m" or "2.5/3.0h"
  pub label: String,
}

pub fn window_stats(
  records: &[WorkoutRecord],
  today: NaiveDate,
  filter: SportFilter,
  days: i64,
  mode: AdherenceMode,
) -> WindowStats {
  let totals = window_totals(records, today, days, filter, mode);

  let label = match mode {
    AdherenceMode::Count => format!("{}/{}", totals.actual, totals.planned),
    AdherenceMode::Duration if totals.planned >= HOURS_LABEL_THRESHOLD => format!(
      "{:.1}/{:.1}h",
      totals.actual / 60.0,
      totals.planned / 60.0
    ),
    AdherenceMode::Duration => format!("{}/{}m", totals.actual, totals.planned),
  };

  WindowStats {
    days,
    mode,
    pct: adherence_pct(totals.actual, totals.planned),
    actual: totals.actual,
    target: totals.planned,
    label,
  }
}

/// ---------------------------------------------------------------------------
/// Linear Trend
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
  /// Position in the (filtered) series, not elapsed days
  pub index: usize,
  pub value: f64,
}

/// Number the values of a series by position
pub fn trend_points(values: &[f64]) -> Vec<TrendPoint> {
  values
    .iter()
    .enumerate()
    .map(|(index, &value)| TrendPoint { index, value })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
  Improving,
  Flat,
  Declining,
}

impl TrendDirection {
  /// Sign of the slope; `lower_is_better` flips it for metrics like pace
  pub fn from_slope(slope: f64, lower_is_better: bool) -> Self {
    let signed = if lower_is_better { -slope } else { slope };
    if signed > 0.0 {
      TrendDirection::Improving
    } else if signed < 0.0 {
      TrendDirection::Declining
    } else {
      TrendDirection::Flat
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
  pub slope: f64,
  pub intercept: f64,
  /// Fitted value at the first point
  pub start_value: f64,
  /// Fitted value at the last point
  pub end_value: f64,
}

/// Ordinary least squares over the point index. Needs at least 3 points.
pub fn linear_trend(points: &[TrendPoint]) -> Option<Trend> {
  if points.len() < 3 {
    return None;
  }

  let n = points.len() as f64;
  let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, p| {
    let (sx, sy, sxy, sxx) = acc;
    let x = p.index as f64;
    (sx + x, sy + p.value, sxy + x * p.value, sxx + x * x)
  });

  let denominator = n * sum_xx - sum_x * sum_x;
  if denominator == 0.0 {
    return None;
  }

  let slope = (n * sum_xy - sum_x * sum_y) / denominator;
  let intercept = (sum_y - slope * sum_x) / n;
  let first_x = points.first()?.index as f64;
  let last_x = points.last()?.index as f64;

  Some(Trend {
    slope,
    intercept,
    start_value: intercept + slope * first_x,
    end_value: intercept + slope * last_x,
  })
}

/// ---------------------------------------------------------------------------
/// Event Readiness
/// ---------------------------------------------------------------------------

/// Longest single session per discipline, in minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LongestSessions {
  pub swim: u32,
  pub bike: u32,
  pub run: u32,
}

impl LongestSessions {
  pub fn get(&self, sport: Sport) -> u32 {
    match sport {
      Sport::Swim => self.swim,
      Sport::Bike => self.bike,
      Sport::Run => self.run,
      _ => 0,
    }
  }
}

/// Longest executed session per sport over the trailing 30 days
pub fn longest_sessions(records: &[WorkoutRecord], today: NaiveDate) -> LongestSessions {
  records
    .iter()
    .filter(|r| in_window(r.date, today, READINESS_LOOKBACK_DAYS))
    .fold(LongestSessions::default(), |mut longest, r| {
      let minutes = r.actual_duration_minutes;
      match r.executed_type() {
        Sport::Swim => longest.swim = longest.swim.max(minutes),
        Sport::Bike => longest.bike = longest.bike.max(minutes),
        Sport::Run => longest.run = longest.run.max(minutes),
        _ => {}
      }
      longest
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
  /// Below 60%
  Warning,
  /// 60-84%
  Developing,
  /// 85% and up
  RaceReady,
}

impl ReadinessStatus {
  pub fn from_score(score: u32) -> Self {
    match score {
      s if s < 60 => ReadinessStatus::Warning,
      s if s < 85 => ReadinessStatus::Developing,
      _ => ReadinessStatus::RaceReady,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportReadiness {
  pub sport: Sport,
  pub longest_minutes: u32,
  pub goal_minutes: u32,
  pub pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
  pub event_name: String,
  pub event_date: NaiveDate,
  pub days_until: i64,
  pub sports: Vec<SportReadiness>,
  /// Weakest discipline, not the average
  pub score: u32,
  pub status: ReadinessStatus,
}

const READINESS_SPORTS: [Sport; 3] = [Sport::Swim, Sport::Bike, Sport::Run];

pub fn readiness(event: &EventRecord, longest: &LongestSessions, today: NaiveDate) -> Readiness {
  let sports: Vec<SportReadiness> = READINESS_SPORTS
    .iter()
    .filter(|s| event.goal_for(**s) > 0)
    .map(|&sport| {
      let goal = event.goal_for(sport);
      let done = longest.get(sport);
      let pct = ((done as f64 / goal as f64) * 100.0).round().min(100.0) as u32;
      SportReadiness {
        sport,
        longest_minutes: done,
        goal_minutes: goal,
        pct,
      }
    })
    .collect();

  let score = sports.iter().map(|s| s.pct).min().unwrap_or(0);

  Readiness {
    event_name: event.name.clone(),
    event_date: event.date,
    days_until: event.days_until(today),
    sports,
    score,
    status: ReadinessStatus::from_score(score),
  }
}

/// ---------------------------------------------------------------------------
/// Consistency Heatmap
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatStatus {
  Completed,
  Missed,
  Upcoming,
  Rest,
  Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
  pub date: NaiveDate,
  pub planned_minutes: u32,
  pub actual_minutes: u32,
  pub status: HeatStatus,
}

/// One cell per day for `weeks` Sunday-Saturday weeks ending on the upcoming Saturday
pub fn heatmap(records: &[WorkoutRecord], today: NaiveDate, weeks: usize) -> Vec<HeatmapCell> {
  let last = week_ending_saturday(today);
  let days = weeks as i64 * 7;

  (0..days)
    .map(|offset| {
      let date = last - Duration::days(days - 1 - offset);
      let day: Vec<&WorkoutRecord> = records.iter().filter(|r| r.date == date).collect();

      let status = if day.is_empty() {
        HeatStatus::Empty
      } else if day.iter().any(|r| r.completed) {
        HeatStatus::Completed
      } else if day.iter().any(|r| r.has_plan()) {
        if date < today {
          HeatStatus::Missed
        } else {
          HeatStatus::Upcoming
        }
      } else {
        HeatStatus::Rest
      };

      HeatmapCell {
        date,
        planned_minutes: day.iter().map(|r| r.planned_duration_minutes).sum(),
        actual_minutes: day.iter().map(|r| r.actual_duration_minutes).sum(),
        status,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
