//! Plan document sections other than the history log
//!
//! Event schedule, weekly schedule, periodization phases, growth caps,
//! training zones, and the gear guide. Each parser returns an empty value
//! when its section is absent.

use chrono::{NaiveDate, Weekday};
use tracing::debug;

use crate::dates::{find_iso_dates, parse_date, parse_duration_minutes};
use crate::markdown::{clean_cell, find_section, heading_level, parse_table, MarkdownTable};
use crate::models::{
  EventRecord, GearSection, GrowthCaps, Phase, ScheduleDay, Sport, SportFilter,
};

const EVENT_HEADINGS: &[&str] = &["Event Schedule"];
const SCHEDULE_HEADINGS: &[&str] = &["Weekly Schedule"];
const PHASE_HEADINGS: &[&str] = &["Periodization Phases"];
const ZONE_HEADINGS: &[&str] = &["Training Parameters", "Zones"];

/// ---------------------------------------------------------------------------
/// Event Schedule
/// ---------------------------------------------------------------------------

pub fn parse_events(doc: &str) -> Vec<EventRecord> {
  let Some(table) = find_section(doc, EVENT_HEADINGS).and_then(parse_table) else {
    debug!("No event schedule table found");
    return Vec::new();
  };

  let Some(date_col) = table.column(&["date"]) else {
    return Vec::new();
  };
  let name_col = table.column(&["event", "name", "race"]);
  let priority_col = table.column(&["priority", "tier"]);
  let swim_col = table.column(&["swim"]);
  let bike_col = table.column(&["bike"]);
  let run_col = table.column(&["run"]);

  let cell = |row: &Vec<String>, col: Option<usize>| -> String {
    col.and_then(|i| row.get(i)).cloned().unwrap_or_default()
  };

  table
    .rows
    .iter()
    .filter_map(|row| {
      let date = parse_date(&cell(row, Some(date_col)))?;
      Some(EventRecord {
        date,
        name: cell(row, name_col),
        priority: cell(row, priority_col),
        swim_goal_minutes: parse_duration_minutes(&cell(row, swim_col)),
        bike_goal_minutes: parse_duration_minutes(&cell(row, bike_col)),
        run_goal_minutes: parse_duration_minutes(&cell(row, run_col)),
      })
    })
    .collect()
}

/// Events on or after `today`, soonest first
pub fn upcoming_events(events: &[EventRecord], today: NaiveDate) -> Vec<EventRecord> {
  let mut upcoming: Vec<EventRecord> = events
    .iter()
    .filter(|e| e.is_upcoming(today))
    .cloned()
    .collect();
  upcoming.sort_by_key(|e| e.date);
  upcoming
}

/// ---------------------------------------------------------------------------
/// Weekly Schedule
/// ---------------------------------------------------------------------------

pub fn parse_weekly_schedule(doc: &str) -> Vec<ScheduleDay> {
  let Some(table) = find_section(doc, SCHEDULE_HEADINGS).and_then(parse_table) else {
    debug!("No weekly schedule table found");
    return Vec::new();
  };

  let Some(day_col) = table.column(&["day"]) else {
    return Vec::new();
  };
  let workout_col = table.column(&["workout", "session"]);
  let duration_col = table.column(&["duration", "time"]);

  table
    .rows
    .iter()
    .filter_map(|row| {
      let weekday = parse_weekday(row.get(day_col)?)?;
      let workout = workout_col
        .and_then(|i| row.get(i))
        .cloned()
        .unwrap_or_default();
      let duration_minutes = duration_col
        .and_then(|i| row.get(i))
        .map(|c| parse_duration_minutes(c))
        .unwrap_or(0);
      Some(ScheduleDay {
        weekday,
        sport: Sport::infer(&workout),
        workout,
        duration_minutes,
      })
    })
    .collect()
}

fn parse_weekday(cell: &str) -> Option<Weekday> {
  let lower = cell.trim().to_lowercase();
  let prefix = lower.get(..3)?;
  match prefix {
    "mon" => Some(Weekday::Mon),
    "tue" => Some(Weekday::Tue),
    "wed" => Some(Weekday::Wed),
    "thu" => Some(Weekday::Thu),
    "fri" => Some(Weekday::Fri),
    "sat" => Some(Weekday::Sat),
    "sun" => Some(Weekday::Sun),
    _ => None,
  }
}

pub fn schedule_for(schedule: &[ScheduleDay], weekday: Weekday) -> Option<&ScheduleDay> {
  schedule.iter().find(|d| d.weekday == weekday)
}

/// ---------------------------------------------------------------------------
/// Periodization Phases
/// ---------------------------------------------------------------------------

pub fn parse_phases(doc: &str) -> Vec<Phase> {
  let Some(table) = find_section(doc, PHASE_HEADINGS).and_then(parse_table) else {
    debug!("No periodization table found");
    return Vec::new();
  };

  let name_col = table.column(&["phase", "block", "name"]).unwrap_or(0);
  let start_col = table.column(&["start"]);
  let end_col = table.column(&["end"]);
  let dates_col = table.column(&["date", "week"]);
  let focus_col = table.column(&["focus", "goal", "notes"]);

  table
    .rows
    .iter()
    .filter_map(|row| {
      let get = |col: Option<usize>| col.and_then(|i| row.get(i)).map(String::as_str);

      let (start, end) = match (get(start_col), get(end_col)) {
        (Some(s), Some(e)) => (parse_date(s)?, parse_date(e)?),
        _ => {
          let found = find_iso_dates(get(dates_col)?);
          (*found.first()?, *found.get(1)?)
        }
      };

      Some(Phase {
        name: get(Some(name_col)).unwrap_or_default().to_string(),
        start,
        end,
        focus: get(focus_col).filter(|f| !f.is_empty()).map(String::from),
      })
    })
    .collect()
}

pub fn current_phase(phases: &[Phase], today: NaiveDate) -> Option<&Phase> {
  phases.iter().find(|p| p.contains(today))
}

/// ---------------------------------------------------------------------------
/// Growth Caps
/// ---------------------------------------------------------------------------

/// Read `**Run Cap:** 10%` style lines; sports without a line keep the default
pub fn parse_growth_caps(doc: &str) -> GrowthCaps {
  let mut caps = GrowthCaps::default();

  for line in doc.lines() {
    let plain = line.replace("**", "").to_lowercase();
    let Some(cap_at) = plain.find("cap:") else {
      continue;
    };
    let label = plain[..cap_at].trim();
    let Some(value) = leading_percent(&plain[cap_at + 4..]) else {
      continue;
    };

    match label.rsplit(|c: char| !c.is_alphabetic()).next().unwrap_or("") {
      "run" => caps.run = value,
      "bike" => caps.bike = value,
      "swim" => caps.swim = value,
      "all" | "total" => caps.all = value,
      _ => {}
    }
  }

  caps
}

/// `[15%]`, ` 15 %`, `12.5%` -> the number
fn leading_percent(text: &str) -> Option<f64> {
  let trimmed = text.trim_start().trim_start_matches('[').trim_start();
  let number: String = trimmed
    .chars()
    .take_while(|c| c.is_ascii_digit() || *c == '.')
    .collect();
  let rest = trimmed[number.len()..].trim_start();
  if number.is_empty() || !rest.starts_with('%') {
    return None;
  }
  number.parse().ok()
}

impl GrowthCaps {
  pub fn cap_for(&self, filter: SportFilter) -> f64 {
    match filter {
      SportFilter::Only(Sport::Run) => self.run,
      SportFilter::Only(Sport::Bike) => self.bike,
      SportFilter::Only(Sport::Swim) => self.swim,
      _ => self.all,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Zones & Gear
/// ---------------------------------------------------------------------------

pub fn parse_zones(doc: &str) -> Option<MarkdownTable> {
  find_section(doc, ZONE_HEADINGS)
    .and_then(parse_table)
    .filter(|t| !t.is_empty())
}

/// Gear guide: each `##`/`###` heading with the bullet items under it
pub fn parse_gear(doc: &str) -> Vec<GearSection> {
  let mut sections: Vec<GearSection> = Vec::new();

  for line in doc.lines() {
    if let Some(level) = heading_level(line) {
      if level >= 2 {
        sections.push(GearSection {
          title: clean_cell(&line.trim_start()[level..]),
          items: Vec::new(),
        });
      }
      continue;
    }

    let trimmed = line.trim_start();
    let item = trimmed
      .strip_prefix("- ")
      .or_else(|| trimmed.strip_prefix("* "));
    if let (Some(item), Some(section)) = (item, sections.last_mut()) {
      let item = clean_cell(item);
      if !item.is_empty() {
        section.items.push(item);
      }
    }
  }

  sections.retain(|s| !s.items.is_empty());
  sections
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{sample_plan, ymd};

  #[test]
  fn test_parse_events() {
    // Act
    let events = parse_events(sample_plan());

    // Assert
    assert_eq!(events.len(), 2);
    let half = &events[0];
    assert_eq!(half.name, "Lake Sprint Tri");
    assert_eq!(half.priority, "B");
    assert_eq!(half.date, ymd(2025, 7, 12));
    assert_eq!(half.swim_goal_minutes, 20);
    assert_eq!(half.bike_goal_minutes, 60);
    assert_eq!(half.run_goal_minutes, 30);
    assert_eq!(events[1].bike_goal_minutes, 180);
  }

  #[test]
  fn test_upcoming_events_sorted_and_filtered() {
    let events = parse_events(sample_plan());

    let upcoming = upcoming_events(&events, ymd(2025, 7, 13));
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].name, "Harbor 70.3");

    // Event day itself still counts as upcoming
    let upcoming = upcoming_events(&events, ymd(2025, 7, 12));
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].name, "Lake Sprint Tri");
  }

  #[test]
  fn test_weekly_schedule() {
    let schedule = parse_weekly_schedule(sample_plan());

    assert_eq!(schedule.len(), 7);
    let tuesday = schedule_for(&schedule, Weekday::Tue).unwrap();
    assert_eq!(tuesday.sport, Sport::Run);
    assert_eq!(tuesday.duration_minutes, 45);
    let monday = schedule_for(&schedule, Weekday::Mon).unwrap();
    assert_eq!(monday.sport, Sport::Rest);
  }

  #[test]
  fn test_phases_and_current_phase() {
    let phases = parse_phases(sample_plan());

    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0].name, "Base");
    assert_eq!(phases[0].focus.as_deref(), Some("Aerobic volume"));

    let current = current_phase(&phases, ymd(2025, 6, 20)).unwrap();
    assert_eq!(current.name, "Build");
    assert!(current_phase(&phases, ymd(2026, 1, 1)).is_none());
  }

  #[test]
  fn test_phases_with_start_end_columns() {
    let doc = "## Periodization Phases\n| Phase | Start | End |\n|---|---|---|\n| Peak | 2025-08-01 | 2025-08-21 |\n";
    let phases = parse_phases(doc);
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].end, ymd(2025, 8, 21));
    assert_eq!(phases[0].focus, None);
  }

  #[test]
  fn test_growth_caps_from_plan() {
    let caps = parse_growth_caps(sample_plan());
    assert_eq!(caps.run, 8.0);
    assert_eq!(caps.bike, 25.0);
    // Not present in the plan, keep defaults
    assert_eq!(caps.swim, 20.0);
    assert_eq!(caps.all, 15.0);
  }

  #[test]
  fn test_growth_caps_defaults_and_lookup() {
    let caps = parse_growth_caps("no caps here");
    assert_eq!(caps, GrowthCaps::default());
    assert_eq!(caps.cap_for(SportFilter::Only(Sport::Run)), 10.0);
    assert_eq!(caps.cap_for(SportFilter::Only(Sport::Strength)), 15.0);
    assert_eq!(caps.cap_for(SportFilter::All), 15.0);
  }

  #[test]
  fn test_zones_table() {
    let zones = parse_zones(sample_plan()).unwrap();
    assert_eq!(zones.headers[0], "Zone");
    assert_eq!(zones.rows.len(), 2);
  }

  #[test]
  fn test_parse_gear() {
    let doc = "# Gear Guide\n\n## Bike\n- Helmet\n- **Bottles** x2\n\n## Empty\n\n### Run\n* [Shoes](https://shop)\n";
    let gear = parse_gear(doc);
    assert_eq!(gear.len(), 2);
    assert_eq!(gear[0].title, "Bike");
    assert_eq!(gear[0].items, vec!["Helmet", "Bottles x2"]);
    assert_eq!(gear[1].items, vec!["Shoes"]);
  }
}
