//! Allocates flow files for one run.

use bytes::Bytes;
use chrono::Utc;
use tracing::instrument;

use crate::types::{
  Attributes, FILENAME_ATTRIBUTE, FlowFile, FlowFileId, PATH_ATTRIBUTE, UUID_ATTRIBUTE,
};

/// Default value of the `path` core attribute.
pub const DEFAULT_PATH: &str = "./";

/// Hands out flow files with run-unique ids. There is no removal; records
/// live until the run ends.
#[derive(Debug, Default)]
pub struct FlowFileStore {
  next_id: u64,
}

impl FlowFileStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a flow file stamped with the current time.
  ///
  /// Core attributes (`uuid`, `filename`, `path`) are set first and
  /// `attributes` is merged over them.
  #[instrument(level = "trace", skip(self, content, attributes))]
  pub fn create(&mut self, content: impl Into<Bytes>, attributes: &Attributes) -> FlowFile {
    let id = FlowFileId(self.next_id);
    self.next_id += 1;

    let uuid = uuid::Uuid::new_v4().to_string();
    let mut attrs = Attributes::new();
    attrs.insert(FILENAME_ATTRIBUTE.to_string(), uuid.clone());
    attrs.insert(PATH_ATTRIBUTE.to_string(), DEFAULT_PATH.to_string());
    attrs.insert(UUID_ATTRIBUTE.to_string(), uuid);

    FlowFile::new(id, content.into(), attrs, Utc::now()).with_attributes(attributes)
  }

  /// Number of flow files created so far.
  pub fn created(&self) -> u64 {
    self.next_id
  }
}
