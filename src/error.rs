//! Run-level error type and its mapping to process exit statuses.

use std::path::PathBuf;

use crate::attribute_file::AttributeFileError;
use crate::input::InputError;
use crate::processor::ProcessError;
use crate::registry::RegistryError;
use crate::session::SessionError;

/// Exit status for a run that completed and reported.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for bad flags or a missing processor name.
pub const EXIT_USAGE: i32 = 1;

/// Anything that aborts a run. Every variant maps to a distinct exit status.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum HarnessError {
  #[error(transparent)]
  Registry(#[from] RegistryError),
  #[error(transparent)]
  AttributeFile(#[from] AttributeFileError),
  #[error(transparent)]
  Input(#[from] InputError),
  /// The processor broke the session contract (lost, duplicated or misrouted a flow file).
  #[error("Processor {processor} violated the session contract: {source}")]
  ContractViolation {
    processor: String,
    #[source]
    source: SessionError,
  },
  /// The processor's trigger returned an error.
  #[error("Processor {processor} failed: {source}")]
  ProcessorFailed {
    processor: String,
    #[source]
    source: ProcessError,
  },
  /// The processor's trigger panicked.
  #[error("Processor {processor} panicked: {message}")]
  ProcessorPanicked { processor: String, message: String },
  #[error("Could not write report: {source}")]
  Output {
    #[source]
    source: std::io::Error,
  },
  #[error("Could not write run log {}: {source}", path.display())]
  RunLog {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl HarnessError {
  /// Wraps an error returned from a trigger. Session errors that the processor
  /// propagated are contract violations, not processor failures.
  pub(crate) fn from_trigger(processor: &str, err: ProcessError) -> Self {
    match err {
      ProcessError::Session(source) => HarnessError::ContractViolation {
        processor: processor.to_string(),
        source,
      },
      source => HarnessError::ProcessorFailed {
        processor: processor.to_string(),
        source,
      },
    }
  }

  /// Process exit status for this error.
  pub fn exit_code(&self) -> i32 {
    match self {
      HarnessError::AttributeFile(AttributeFileError::NotFound { .. }) => 3,
      HarnessError::AttributeFile(_) => 5,
      HarnessError::Input(InputError::NotADirectory { .. }) => 4,
      HarnessError::Input(InputError::DirectoryNotFound { .. }) => 6,
      HarnessError::Input(_) => 7,
      HarnessError::Registry(RegistryError::NotFound { .. }) => 11,
      HarnessError::Registry(RegistryError::Instantiation { .. }) => 20,
      HarnessError::ContractViolation { .. } => 30,
      HarnessError::ProcessorFailed { .. } | HarnessError::ProcessorPanicked { .. } => 31,
      HarnessError::RunLog { .. } => 32,
      HarnessError::Output { .. } => 33,
    }
  }
}
