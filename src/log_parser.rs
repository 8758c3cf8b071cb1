//! Training history log parser
//!
//! Turns the history table of a plan document into `WorkoutRecord`s. The
//! table is located by heading, its columns by header keywords, so column
//! order and extra columns (notes, RPE, ...) don't matter.
//!
//! Malformed rows are dropped, never reported: plan documents routinely
//! carry template and example rows.

use tracing::{debug, trace};

use crate::dates::{parse_date, parse_duration_minutes};
use crate::markdown::{clean_cell, find_section, is_separator, split_row};
use crate::models::{Sport, WorkoutRecord};

/// Headings tried in order when locating the history table
pub const HISTORY_HEADINGS: &[&str] = &["Appendix C: Training History Log", "Training History"];

/// Minimum raw `|`-split parts for a line to count as a data row
const MIN_ROW_PARTS: usize = 5;

const COMPLETION_KEYWORDS: &[&str] = &["completed", "done", "yes", "x"];

/// Column positions resolved from the header row
#[derive(Debug, Default, Clone, PartialEq)]
struct ColumnMap {
  date: Option<usize>,
  status: Option<usize>,
  planned_type: Option<usize>,
  planned_duration: Option<usize>,
  actual_type: Option<usize>,
  actual_duration: Option<usize>,
}

impl ColumnMap {
  fn from_header(line: &str) -> Self {
    let mut map = ColumnMap::default();

    for (idx, raw) in split_row(line).iter().enumerate() {
      let cell = raw.trim().to_lowercase().replace("**", "");
      if cell.contains("date") && map.date.is_none() {
        map.date = Some(idx);
      }
      if cell.contains("status") {
        map.status = Some(idx);
      }
      if cell.contains("planned workout") {
        map.planned_type = Some(idx);
      }
      if cell.contains("planned duration") {
        map.planned_duration = Some(idx);
      }
      if cell.contains("actual workout") {
        map.actual_type = Some(idx);
      }
      if cell.contains("actual duration") {
        map.actual_duration = Some(idx);
      }
    }

    map
  }

  fn is_usable(&self) -> bool {
    self.date.is_some() && self.planned_type.is_some()
  }
}

fn is_history_header(line: &str) -> bool {
  if !line.contains('|') {
    return false;
  }
  let lower = line.to_lowercase();
  lower.contains("date") && lower.contains("planned") && lower.contains("actual")
}

/// Parse the history log of a document using the default headings
pub fn parse_history(doc: &str) -> Vec<WorkoutRecord> {
  parse_history_under(doc, HISTORY_HEADINGS)
}

/// Parse the history table found under the first matching heading
pub fn parse_history_under(doc: &str, headings: &[&str]) -> Vec<WorkoutRecord> {
  let Some(section) = find_section(doc, headings) else {
    debug!("No history section found (tried {:?})", headings);
    return Vec::new();
  };

  let mut lines = section.lines();
  let Some(header) = lines.by_ref().find(|l| is_history_header(l)) else {
    debug!("History section has no date/planned/actual header row");
    return Vec::new();
  };

  let columns = ColumnMap::from_header(header);
  if !columns.is_usable() {
    debug!("History header is missing the date or planned workout column");
    return Vec::new();
  }

  let records: Vec<WorkoutRecord> = lines
    .filter(|l| l.contains('|') && !is_separator(l))
    .filter_map(|l| parse_row(l, &columns))
    .collect();

  debug!("Parsed {} history records", records.len());
  records
}

fn parse_row(line: &str, columns: &ColumnMap) -> Option<WorkoutRecord> {
  let cells = split_row(line);
  if cells.len() < MIN_ROW_PARTS {
    return None;
  }

  let cell = |idx: Option<usize>| -> String {
    idx
      .and_then(|i| cells.get(i))
      .map(|c| clean_cell(c))
      .unwrap_or_default()
  };

  let date_text = cell(columns.date);
  let Some(date) = parse_date(&date_text) else {
    trace!("Skipping history row with unparseable date {:?}", date_text);
    return None;
  };

  let actual_text = cell(columns.actual_type);
  let actual_type = if actual_text.is_empty() || actual_text == "-" {
    None
  } else {
    Some(Sport::infer(&actual_text))
  };

  Some(WorkoutRecord {
    date,
    planned_type: Sport::infer(&cell(columns.planned_type)),
    actual_type,
    planned_duration_minutes: parse_duration_minutes(&cell(columns.planned_duration)),
    actual_duration_minutes: parse_duration_minutes(&cell(columns.actual_duration)),
    completed: is_completed(&cell(columns.status)),
  })
}

/// Status cell matches one of the completion keywords as a whole word
pub fn is_completed(status: &str) -> bool {
  status
    .to_lowercase()
    .split(|c: char| !c.is_alphanumeric())
    .any(|word| COMPLETION_KEYWORDS.contains(&word))
}

/// Combine the plan's log with an older archive.
///
/// Archive rows dated before the first plan row are kept; the plan wins
/// wherever the two overlap. Output is sorted by date.
pub fn merge_history(
  primary: Vec<WorkoutRecord>,
  archive: Vec<WorkoutRecord>,
) -> Vec<WorkoutRecord> {
  let cutoff = primary.iter().map(|r| r.date).min();

  let mut merged: Vec<WorkoutRecord> = archive
    .into_iter()
    .filter(|r| cutoff.map_or(true, |c| r.date < c))
    .chain(primary)
    .collect();

  merged.sort_by_key(|r| r.date);
  merged
}
