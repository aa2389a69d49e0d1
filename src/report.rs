//! Console report: per-relationship flow file listing and counts.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::session::Session;
use crate::types::{FlowFile, Relationship};

pub const DASHED_LINE: &str = "---------------------------------------------------------";

/// What to print for each transferred flow file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
  pub attributes: bool,
  pub content: bool,
}

impl ReportOptions {
  /// Both attributes and content.
  pub fn all() -> Self {
    Self {
      attributes: true,
      content: true,
    }
  }
}

fn format_date(date: DateTime<Utc>) -> String {
  date.format("%a %b %d %H:%M:%S %Z %Y").to_string()
}

fn write_entry(out: &mut dyn Write, key: &str, value: &str) -> io::Result<()> {
  write!(out, "\nKey: '{}'\n\tValue: '{}'", key, value)
}

/// Writes the labeled attribute block for one flow file.
pub fn write_attributes(out: &mut dyn Write, flow_file: &FlowFile) -> io::Result<()> {
  write!(out, "Flow file {}\n{}\nFlowFile Attributes", flow_file, DASHED_LINE)?;
  write_entry(out, "entryDate", &format_date(flow_file.entry_date()))?;
  write_entry(
    out,
    "lineageStartDate",
    &format_date(flow_file.lineage_start_date()),
  )?;
  write_entry(out, "fileSize", &flow_file.size().to_string())?;
  write!(out, "\nFlowFile Attribute Map Content")?;
  for (k, v) in flow_file.attributes() {
    write_entry(out, k, v)?;
  }
  writeln!(out, "\n{}", DASHED_LINE)
}

/// Writes every flow file routed to `relationship`, then its count line.
pub fn write_relationship(
  out: &mut dyn Write,
  session: &Session,
  relationship: &Relationship,
  options: ReportOptions,
) -> io::Result<usize> {
  let files = session.outputs_for(relationship);
  for flow_file in files {
    if options.attributes {
      write_attributes(out, flow_file)?;
    }
    if options.content {
      writeln!(out, "{}", String::from_utf8_lossy(flow_file.content()))?;
    }
    writeln!(out)?;
  }
  writeln!(
    out,
    "Flow Files transferred to {}: {}\n",
    relationship.name(),
    files.len()
  )?;
  Ok(files.len())
}

/// Writes the report for every declared relationship, in declaration order.
#[instrument(level = "trace", skip(out, session))]
pub fn write_report(
  out: &mut dyn Write,
  session: &Session,
  options: ReportOptions,
) -> io::Result<()> {
  for relationship in session.relationships() {
    write_relationship(out, session, relationship, options)?;
  }
  out.flush()
}
