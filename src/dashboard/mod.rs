//! Dashboard state and view-model
//!
//! `DashboardState` holds the parsed plan plus the current selections. It is
//! a plain value: changing a selection returns a new state, and `render`
//! computes a fresh `Dashboard` from it every time.

pub mod load;

pub use load::{load_sources, Sources};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::{
  growth_report, heatmap, linear_trend, longest_sessions, readiness, rolling_points,
  trend_points, volume_buckets, window_stats, AdherenceMode, DisplayRange, HeatmapCell,
  Readiness, RollingPoint, Trend, TrendDirection, WeekGrowth, WindowStats,
};
use crate::curves::{CurveKind, CurveSummary};
use crate::log_parser::{merge_history, parse_history};
use crate::markdown::MarkdownTable;
use crate::models::{
  EventRecord, GearSection, GrowthCaps, Phase, ScheduleDay, SportFilter, WorkoutRecord,
};
use crate::plan::{
  current_phase, parse_events, parse_gear, parse_growth_caps, parse_phases,
  parse_weekly_schedule, parse_zones, schedule_for, upcoming_events,
};
use crate::weather::WeatherSummary;

const HEATMAP_WEEKS: usize = 12;

/// ---------------------------------------------------------------------------
/// State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
  pub records: Vec<WorkoutRecord>,
  pub events: Vec<EventRecord>,
  pub schedule: Vec<ScheduleDay>,
  pub phases: Vec<Phase>,
  pub caps: GrowthCaps,
  pub zones: Option<MarkdownTable>,
  pub gear: Vec<GearSection>,
  pub weather: Option<WeatherSummary>,
  pub power_curve: Option<CurveSummary>,
  pub pace_curve: Option<CurveSummary>,
  pub filter: SportFilter,
  pub mode: AdherenceMode,
  pub range: DisplayRange,
}

impl DashboardState {
  /// Parse every loaded source; selections start at their defaults
  pub fn from_sources(sources: Sources) -> Self {
    let archive = sources
      .archive
      .as_deref()
      .map(parse_history)
      .unwrap_or_default();
    let records = merge_history(parse_history(&sources.plan), archive);

    Self {
      records,
      events: parse_events(&sources.plan),
      schedule: parse_weekly_schedule(&sources.plan),
      phases: parse_phases(&sources.plan),
      caps: parse_growth_caps(&sources.plan),
      zones: parse_zones(&sources.plan),
      gear: sources.gear.as_deref().map(parse_gear).unwrap_or_default(),
      weather: sources.weather,
      power_curve: sources
        .power_curve
        .map(|points| CurveSummary::from_points(CurveKind::Power, points)),
      pace_curve: sources
        .pace_curve
        .map(|points| CurveSummary::from_points(CurveKind::Pace, points)),
      filter: SportFilter::default(),
      mode: AdherenceMode::default(),
      range: DisplayRange::default(),
    }
  }

  pub fn with_filter(self, filter: SportFilter) -> Self {
    Self { filter, ..self }
  }

  pub fn with_mode(self, mode: AdherenceMode) -> Self {
    Self { mode, ..self }
  }

  pub fn with_range(self, range: DisplayRange) -> Self {
    Self { range, ..self }
  }
}

/// ---------------------------------------------------------------------------
/// View-Model
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCards {
  pub count_7d: WindowStats,
  pub count_30d: WindowStats,
  pub duration_7d: WindowStats,
  pub duration_30d: WindowStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTrend {
  #[serde(flatten)]
  pub trend: Trend,
  pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeView {
  /// Week-over-week growth cap for the selected sport, in percent
  pub cap_pct: f64,
  pub weeks: Vec<WeekGrowth>,
  pub trend: Option<VolumeTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
  pub today: NaiveDate,
  pub filter: SportFilter,
  pub mode: AdherenceMode,
  pub range: DisplayRange,
  pub adherence: Vec<RollingPoint>,
  pub stats: StatCards,
  pub volume: VolumeView,
  pub readiness: Option<Readiness>,
  pub upcoming_events: Vec<EventRecord>,
  pub today_workout: Option<ScheduleDay>,
  pub phase: Option<Phase>,
  pub zones: Option<MarkdownTable>,
  pub gear: Vec<GearSection>,
  pub heatmap: Vec<HeatmapCell>,
  pub weather: Option<WeatherSummary>,
  pub power_curve: Option<CurveSummary>,
  pub pace_curve: Option<CurveSummary>,
}

/// ---------------------------------------------------------------------------
/// Builder
/// ---------------------------------------------------------------------------

pub struct DashboardBuilder<'a> {
  state: &'a DashboardState,
  today: NaiveDate,
}

impl<'a> DashboardBuilder<'a> {
  pub fn new(state: &'a DashboardState, today: NaiveDate) -> Self {
    Self { state, today }
  }

  pub fn adherence(&self) -> Vec<RollingPoint> {
    let s = self.state;
    rolling_points(&s.records, self.today, s.filter, s.mode, s.range)
  }

  pub fn stat_cards(&self) -> StatCards {
    let stats = |days, mode| {
      window_stats(&self.state.records, self.today, self.state.filter, days, mode)
    };
    StatCards {
      count_7d: stats(7, AdherenceMode::Count),
      count_30d: stats(30, AdherenceMode::Count),
      duration_7d: stats(7, AdherenceMode::Duration),
      duration_30d: stats(30, AdherenceMode::Duration),
    }
  }

  pub fn volume(&self) -> VolumeView {
    let cap_pct = self.state.caps.cap_for(self.state.filter);
    let buckets = volume_buckets(&self.state.records, self.today, self.state.filter);

    let actual: Vec<f64> = buckets.iter().map(|b| b.actual_minutes as f64).collect();
    let trend = linear_trend(&trend_points(&actual)).map(|trend| VolumeTrend {
      trend,
      direction: TrendDirection::from_slope(trend.slope, false),
    });

    VolumeView {
      cap_pct,
      weeks: growth_report(&buckets, cap_pct),
      trend,
    }
  }

  /// Readiness for the soonest upcoming event
  pub fn readiness(&self) -> Option<Readiness> {
    let next = upcoming_events(&self.state.events, self.today)
      .into_iter()
      .next()?;
    let longest = longest_sessions(&self.state.records, self.today);
    Some(readiness(&next, &longest, self.today))
  }

  pub fn build(&self) -> Dashboard {
    let s = self.state;

    Dashboard {
      today: self.today,
      filter: s.filter,
      mode: s.mode,
      range: s.range,
      adherence: self.adherence(),
      stats: self.stat_cards(),
      volume: self.volume(),
      readiness: self.readiness(),
      upcoming_events: upcoming_events(&s.events, self.today),
      today_workout: schedule_for(&s.schedule, self.today.weekday()).cloned(),
      phase: current_phase(&s.phases, self.today).cloned(),
      zones: s.zones.clone(),
      gear: s.gear.clone(),
      heatmap: heatmap(&s.records, self.today, HEATMAP_WEEKS),
      weather: s.weather.clone(),
      power_curve: s.power_curve.clone(),
      pace_curve: s.pace_curve.clone(),
    }
  }
}

pub fn render(state: &DashboardState, today: NaiveDate) -> Dashboard {
  DashboardBuilder::new(state, today).build()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analysis::{HeatStatus, ReadinessStatus};
  use crate::curves::CurvePoint;
  use crate::models::Sport;
  use crate::test_utils::{history_doc, sample_plan, ymd};

  fn sample_state() -> DashboardState {
    DashboardState::from_sources(Sources {
      plan: sample_plan().to_string(),
      gear: Some("## Bike\n- Helmet\n- **Bottles**\n\n## Run\n* Shoes\n".to_string()),
      power_curve: Some(vec![CurvePoint {
        duration_s: 60,
        value: 410.0,
      }]),
      ..Sources::default()
    })
  }

  #[test]
  fn test_state_from_sources() {
    // Act
    let state = sample_state();

    // Assert
    assert_eq!(state.records.len(), 4);
    assert_eq!(state.events.len(), 2);
    assert_eq!(state.schedule.len(), 7);
    assert_eq!(state.caps.run, 8.0);
    assert_eq!(state.gear.len(), 2);
    assert_eq!(state.gear[0].items, vec!["Helmet", "Bottles"]);
    assert!(state.power_curve.is_some());
    assert!(state.pace_curve.is_none());
    assert_eq!(state.filter, SportFilter::All);
  }

  #[test]
  fn test_archive_rows_before_plan_are_merged() {
    let archive = history_doc(&[
      "| 2025-06-01 | Done | Easy run | 30 | Easy run | 30 |",
      "| 2025-06-17 | Missed | Run intervals | 45 | - | - |",
    ]);

    let state = DashboardState::from_sources(Sources {
      plan: sample_plan().to_string(),
      archive: Some(archive),
      ..Sources::default()
    });

    assert_eq!(state.records.len(), 5);
    assert_eq!(state.records[0].date, ymd(2025, 6, 1));
    // Plan wins on overlapping dates
    let overlap: Vec<_> = state
      .records
      .iter()
      .filter(|r| r.date == ymd(2025, 6, 17))
      .collect();
    assert_eq!(overlap.len(), 1);
    assert!(overlap[0].completed);
  }

  #[test]
  fn test_render_sample_plan() {
    // Arrange
    let state = sample_state();
    let today = ymd(2025, 6, 18);

    // Act
    let dashboard = render(&state, today);

    // Assert
    assert_eq!(dashboard.adherence.len(), 13);
    assert_eq!(dashboard.adherence.last().map(|p| p.anchor), Some(today));
    assert_eq!(dashboard.stats.count_7d.label, "2/3");
    assert_eq!(dashboard.stats.count_7d.pct, 67);
    assert_eq!(dashboard.volume.weeks.len(), 12);
    assert_eq!(dashboard.volume.cap_pct, 15.0);
    assert_eq!(dashboard.upcoming_events.len(), 2);
    assert_eq!(
      dashboard.today_workout.as_ref().map(|d| d.sport),
      Some(Sport::Swim)
    );
    assert_eq!(dashboard.phase.as_ref().map(|p| p.name.as_str()), Some("Build"));
    assert!(dashboard.zones.is_some());
    assert_eq!(dashboard.heatmap.len(), 84);
    assert_eq!(dashboard.power_curve.map(|c| c.highlights.len()), Some(5));
  }

  #[test]
  fn test_readiness_targets_next_event() {
    let dashboard = render(&sample_state(), ymd(2025, 6, 18));

    let readiness = dashboard.readiness.unwrap();
    assert_eq!(readiness.event_name, "Lake Sprint Tri");
    assert_eq!(readiness.days_until, 24);
    // No swim or bike sessions yet
    assert_eq!(readiness.score, 0);
    assert_eq!(readiness.status, ReadinessStatus::Warning);
  }

  #[test]
  fn test_heatmap_marks_today_as_upcoming() {
    let dashboard = render(&sample_state(), ymd(2025, 6, 18));

    let status_on = |date| {
      dashboard
        .heatmap
        .iter()
        .find(|c| c.date == date)
        .map(|c| c.status)
    };
    assert_eq!(status_on(ymd(2025, 6, 17)), Some(HeatStatus::Completed));
    assert_eq!(status_on(ymd(2025, 6, 18)), Some(HeatStatus::Upcoming));
    assert_eq!(status_on(ymd(2025, 6, 16)), Some(HeatStatus::Rest));
  }

  #[test]
  fn test_selections_rerender() {
    // Arrange
    let state = sample_state();
    let today = ymd(2025, 6, 18);

    // Act
    let run_only = state
      .clone()
      .with_filter(SportFilter::Only(Sport::Run))
      .with_mode(AdherenceMode::Duration)
      .with_range(DisplayRange::Month);
    let dashboard = render(&run_only, today);

    // Assert
    assert_eq!(dashboard.adherence.len(), 4);
    assert_eq!(dashboard.stats.count_7d.pct, 100);
    assert_eq!(dashboard.volume.cap_pct, 8.0);
    assert_eq!(dashboard.mode, AdherenceMode::Duration);
    // Input state is untouched
    assert_eq!(render(&state, today).filter, SportFilter::All);
  }

  #[test]
  fn test_empty_plan_renders() {
    let state = DashboardState::from_sources(Sources {
      plan: "# Nothing here\n".to_string(),
      ..Sources::default()
    });

    let dashboard = render(&state, ymd(2025, 6, 18));

    assert!(dashboard.readiness.is_none());
    assert!(dashboard.today_workout.is_none());
    assert_eq!(dashboard.stats.duration_30d.pct, 0);
    assert_eq!(dashboard.volume.weeks.len(), 12);
    assert!(serde_json::to_string(&dashboard).is_ok());
  }
}
