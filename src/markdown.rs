//! Markdown scanning shared by the history log and plan parsers
//!
//! Only the subset the plan documents use: ATX headings and GitHub-style
//! pipe tables. Nothing here fails loudly; a missing section is `None`.

use serde::{Deserialize, Serialize};

/// A pipe table with cleaned header and body cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownTable {
  pub headers: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

impl MarkdownTable {
  /// Index of the first header containing any of the keywords (case-insensitive)
  pub fn column(&self, keywords: &[&str]) -> Option<usize> {
    self.headers.iter().position(|h| {
      let lower = h.to_lowercase();
      keywords.iter().any(|k| lower.contains(k))
    })
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// ATX heading level (1-6) or None for non-heading lines
pub fn heading_level(line: &str) -> Option<usize> {
  let trimmed = line.trim_start();
  let level = trimmed.chars().take_while(|c| *c == '#').count();
  if level == 0 || level > 6 {
    return None;
  }
  match trimmed[level..].chars().next() {
    Some(c) if c.is_whitespace() => Some(level),
    _ => None,
  }
}

fn heading_text(line: &str, level: usize) -> String {
  strip_emphasis(line.trim_start()[level..].trim()).to_lowercase()
}

/// Body of the first section whose heading contains one of `titles`.
///
/// Titles are tried in priority order. The section runs to the next heading
/// of the same or a higher level, or to the end of the document.
pub fn find_section<'a>(doc: &'a str, titles: &[&str]) -> Option<&'a str> {
  titles.iter().find_map(|title| section_for(doc, title))
}

fn section_for<'a>(doc: &'a str, title: &str) -> Option<&'a str> {
  let wanted = title.to_lowercase();
  let mut offset = 0;
  let mut start: Option<(usize, usize)> = None;

  for line in doc.split_inclusive('\n') {
    let line_start = offset;
    offset += line.len();

    let Some(level) = heading_level(line) else {
      continue;
    };

    match start {
      None => {
        if heading_text(line, level).contains(&wanted) {
          start = Some((offset, level));
        }
      }
      Some((body_start, found_level)) => {
        if level <= found_level {
          return Some(&doc[body_start..line_start]);
        }
      }
    }
  }

  start.map(|(body_start, _)| &doc[body_start..])
}

/// Raw `|` split. Edge cells are kept so header and row indexes line up.
pub fn split_row(line: &str) -> Vec<&str> {
  line.split('|').collect()
}

/// Table separator row (`|---|:---:|`)
pub fn is_separator(line: &str) -> bool {
  line.contains("---")
}

/// Trim, drop bold/underline markers and collapse `[text](url)` links
pub fn clean_cell(cell: &str) -> String {
  collapse_links(&strip_emphasis(cell)).trim().to_string()
}

fn strip_emphasis(text: &str) -> String {
  text.replace("**", "").replace("__", "")
}

fn collapse_links(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(open) = rest.find('[') {
    let after_open = &rest[open + 1..];
    let link = after_open.find("](").and_then(|close| {
      let after_close = &after_open[close + 2..];
      after_close
        .find(')')
        .map(|end| (&after_open[..close], close + 2 + end + 1))
    });

    match link {
      Some((label, consumed)) => {
        out.push_str(&rest[..open]);
        out.push_str(label);
        rest = &after_open[consumed..];
      }
      None => {
        out.push_str(&rest[..=open]);
        rest = after_open;
      }
    }
  }

  out.push_str(rest);
  out
}

/// Parse the first pipe table in a section: header, separator, body rows.
pub fn parse_table(section: &str) -> Option<MarkdownTable> {
  let mut lines = section
    .lines()
    .map(str::trim)
    .skip_while(|l| !l.contains('|'))
    .take_while(|l| l.contains('|'));

  let headers = table_cells(lines.next()?);
  let rows = lines
    .filter(|l| !is_separator(l))
    .map(table_cells)
    .filter(|cells| cells.iter().any(|c| !c.is_empty()))
    .collect();

  Some(MarkdownTable { headers, rows })
}

/// Cleaned cells with the empty leading/trailing edges removed
fn table_cells(line: &str) -> Vec<String> {
  let trimmed = line.trim();
  let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
  let inner = inner.strip_suffix('|').unwrap_or(inner);
  inner.split('|').map(clean_cell).collect()
}
