//! A single unit of data: content bytes, an attribute map and timestamp metadata.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribute map carried by every flow file. Keys are unique; last write wins.
pub type Attributes = BTreeMap<String, String>;

/// Core attribute holding the flow file's name.
pub const FILENAME_ATTRIBUTE: &str = "filename";
/// Core attribute holding the flow file's logical path.
pub const PATH_ATTRIBUTE: &str = "path";
/// Core attribute holding the flow file's unique id string.
pub const UUID_ATTRIBUTE: &str = "uuid";

/// Opaque handle, unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowFileId(pub u64);

impl fmt::Display for FlowFileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// One unit of data moving through the harness.
///
/// Content is immutable at any instant. [FlowFile::with_content] and
/// [FlowFile::with_attribute] consume the record and hand back a new binding
/// that keeps the same [FlowFileId], so observers never see a half-updated file.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFile {
  id: FlowFileId,
  content: Bytes,
  attributes: Attributes,
  entry_date: DateTime<Utc>,
  lineage_start_date: DateTime<Utc>,
}

impl FlowFile {
  /// Builds a record. Used by [crate::FlowFileStore]; processors derive new
  /// bindings from the flow files they dequeue instead.
  pub(crate) fn new(
    id: FlowFileId,
    content: Bytes,
    attributes: Attributes,
    entry_date: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      content,
      attributes,
      entry_date,
      lineage_start_date: entry_date,
    }
  }

  pub fn id(&self) -> FlowFileId {
    self.id
  }

  pub fn content(&self) -> &Bytes {
    &self.content
  }

  pub fn attributes(&self) -> &Attributes {
    &self.attributes
  }

  pub fn attribute(&self, key: &str) -> Option<&str> {
    self.attributes.get(key).map(String::as_str)
  }

  pub fn entry_date(&self) -> DateTime<Utc> {
    self.entry_date
  }

  pub fn lineage_start_date(&self) -> DateTime<Utc> {
    self.lineage_start_date
  }

  /// Byte length of the current content.
  pub fn size(&self) -> usize {
    self.content.len()
  }

  /// Replaces the content as a whole. Timestamps and identity are kept.
  pub fn with_content(self, content: impl Into<Bytes>) -> Self {
    Self {
      content: content.into(),
      ..self
    }
  }

  /// Sets one attribute, overwriting any previous value for `key`.
  pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }

  /// Merges `attributes` over the current map.
  pub fn with_attributes(mut self, attributes: &Attributes) -> Self {
    for (k, v) in attributes {
      self.attributes.insert(k.clone(), v.clone());
    }
    self
  }
}

impl fmt::Display for FlowFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "FlowFile[{},{},{}B]",
      self.id,
      self.attribute(FILENAME_ATTRIBUTE).unwrap_or(""),
      self.size()
    )
  }
}
