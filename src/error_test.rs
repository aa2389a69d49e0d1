//! Tests for `HarnessError` exit codes.

use std::path::PathBuf;

use crate::attribute_file::AttributeFileError;
use crate::error::HarnessError;
use crate::input::InputError;
use crate::processor::ProcessError;
use crate::registry::RegistryError;
use crate::session::SessionError;
use crate::types::FlowFileId;

fn io_err() -> std::io::Error {
  std::io::Error::other("boom")
}

#[test]
fn attribute_file_codes() {
  let missing = HarnessError::from(AttributeFileError::NotFound {
    path: PathBuf::from("a"),
  });
  assert_eq!(missing.exit_code(), 3);
  let unreadable = HarnessError::from(AttributeFileError::Read {
    path: PathBuf::from("a"),
    source: io_err(),
  });
  assert_eq!(unreadable.exit_code(), 5);
  let malformed = HarnessError::from(AttributeFileError::Parse {
    path: PathBuf::from("a"),
    line: 1,
    message: "bad".to_string(),
  });
  assert_eq!(malformed.exit_code(), 5);
}

#[test]
fn input_codes() {
  let not_dir = HarnessError::from(InputError::NotADirectory {
    path: PathBuf::from("f"),
  });
  let missing = HarnessError::from(InputError::DirectoryNotFound {
    path: PathBuf::from("d"),
  });
  let stdin = HarnessError::from(InputError::Stdin { source: io_err() });
  assert_eq!(not_dir.exit_code(), 4);
  assert_eq!(missing.exit_code(), 6);
  assert_eq!(stdin.exit_code(), 7);
}

#[test]
fn registry_codes() {
  let not_found = HarnessError::from(RegistryError::NotFound {
    name: "X".to_string(),
  });
  let inst = HarnessError::from(RegistryError::Instantiation {
    name: "X".to_string(),
    reason: "r".to_string(),
  });
  assert_eq!(not_found.exit_code(), 11);
  assert_eq!(inst.exit_code(), 20);
}

#[test]
fn session_errors_from_trigger_are_contract_violations() {
  let err = HarnessError::from_trigger(
    "P",
    ProcessError::Session(SessionError::DoubleTransfer { id: FlowFileId(1) }),
  );
  assert!(matches!(err, HarnessError::ContractViolation { .. }));
  assert_eq!(err.exit_code(), 30);
  assert!(err.to_string().contains("Processor P"));
}

#[test]
fn other_trigger_errors_are_processor_failures() {
  let err = HarnessError::from_trigger("P", ProcessError::Other("nope".to_string()));
  assert!(matches!(err, HarnessError::ProcessorFailed { .. }));
  assert_eq!(err.exit_code(), 31);
  let panicked = HarnessError::ProcessorPanicked {
    processor: "P".to_string(),
    message: "oops".to_string(),
  };
  assert_eq!(panicked.exit_code(), 31);
}

#[test]
fn output_codes_are_distinct() {
  let log = HarnessError::RunLog {
    path: PathBuf::from("l"),
    source: io_err(),
  };
  let out = HarnessError::Output { source: io_err() };
  assert_eq!(log.exit_code(), 32);
  assert_eq!(out.exit_code(), 33);
}
