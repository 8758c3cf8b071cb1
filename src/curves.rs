//! Power and pace curves
//!
//! The curves are computed elsewhere from Strava data and published as JSON
//! arrays of `{ duration, value }` points. We only pick out the headline
//! durations for the dashboard cards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
  /// Best average watts for a duration
  Power,
  /// Best pace (seconds per km) for a duration
  Pace,
}

impl CurveKind {
  /// Headline durations, in seconds
  fn highlight_durations(&self) -> &'static [u32] {
    match self {
      CurveKind::Power => &[5, 60, 300, 1200, 3600],
      CurveKind::Pace => &[60, 300, 1200, 3600],
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
  #[serde(alias = "duration", alias = "secs", alias = "seconds")]
  pub duration_s: u32,
  #[serde(alias = "watts", alias = "pace", alias = "best")]
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveHighlight {
  pub label: String,
  pub duration_s: u32,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSummary {
  pub kind: CurveKind,
  pub points: Vec<CurvePoint>,
  pub highlights: Vec<CurveHighlight>,
}

impl CurveSummary {
  pub fn from_points(kind: CurveKind, mut points: Vec<CurvePoint>) -> Self {
    points.retain(|p| p.duration_s > 0 && p.value.is_finite());
    points.sort_by_key(|p| p.duration_s);

    let highlights = kind
      .highlight_durations()
      .iter()
      .filter_map(|&target| {
        let nearest = points
          .iter()
          .min_by_key(|p| p.duration_s.abs_diff(target))?;
        Some(CurveHighlight {
          label: duration_label(target),
          duration_s: nearest.duration_s,
          value: nearest.value,
        })
      })
      .collect();

    Self {
      kind,
      points,
      highlights,
    }
  }
}

/// "5s", "1m", "20m", "1h"
fn duration_label(seconds: u32) -> String {
  match seconds {
    s if s < 60 => format!("{}s", s),
    s if s < 3600 => format!("{}m", s / 60),
    s => format!("{}h", s / 3600),
  }
}
