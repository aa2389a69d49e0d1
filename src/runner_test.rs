//! Tests for `runner`.

use std::fs;

use crate::error::HarnessError;
use crate::processor::{InitContext, ProcessContext, ProcessError, Processor, ProcessorInstance};
use crate::registry::ExtensionRegistry;
use crate::report::ReportOptions;
use crate::run_log::load_run_log;
use crate::runner::{RunOptions, run_named, run_processor};
use crate::session::{Session, SessionError};
use crate::types::{FILENAME_ATTRIBUTE, PropertyDescriptor, Relationship};

/// What a misbehaving test processor does with the flow file it takes.
#[derive(Clone, Copy)]
enum Misbehavior {
  Drop,
  TransferTwice,
  Undeclared,
  TakeTwo,
  Panic,
  NeverDequeue,
}

struct Misbehaving(Misbehavior);

impl Processor for Misbehaving {
  fn init(&mut self, _: &InitContext) {}

  fn relationships(&self) -> Vec<Relationship> {
    vec![Relationship::new("success", "")]
  }

  fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
    Vec::new()
  }

  fn trigger(&mut self, _: &ProcessContext, session: &mut Session) -> Result<(), ProcessError> {
    if let Misbehavior::NeverDequeue = self.0 {
      return Ok(());
    }
    let Some(ff) = session.get() else {
      return Ok(());
    };
    let success = Relationship::new("success", "");
    match self.0 {
      Misbehavior::Drop => Ok(()),
      Misbehavior::TransferTwice => {
        session.transfer(ff.clone(), &success)?;
        session.transfer(ff, &success)?;
        Ok(())
      }
      Misbehavior::Undeclared => {
        session.transfer(ff, &Relationship::new("elsewhere", ""))?;
        Ok(())
      }
      Misbehavior::TakeTwo => {
        session.transfer(ff, &success)?;
        if let Some(second) = session.get() {
          session.transfer(second, &success)?;
        }
        Ok(())
      }
      Misbehavior::Panic => panic!("processor blew up"),
      Misbehavior::NeverDequeue => Ok(()),
    }
  }
}

fn run_misbehaving(m: Misbehavior, input: &[u8]) -> Result<crate::RunOutcome, HarnessError> {
  let instance = ProcessorInstance::new("Misbehaving", Box::new(Misbehaving(m)));
  let mut stdin: &[u8] = input;
  let mut out = Vec::new();
  run_processor(instance, &RunOptions::default(), Some(&mut stdin), &mut out)
}

fn input_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  for (name, content) in files {
    fs::write(dir.path().join(name), content).unwrap();
  }
  dir
}

#[test]
fn parity_scenario_routes_two_success_one_failure() {
  let dir = input_dir(&[("1.txt", "one"), ("2.txt", "two"), ("3.txt", "three")]);
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    ..RunOptions::default()
  };
  let mut out = Vec::new();
  let outcome = run_named(
    &ExtensionRegistry::with_builtins(),
    "RouteOnParity",
    &options,
    None,
    &mut out,
  )
  .unwrap();
  assert_eq!(outcome.seeded, 3);
  assert_eq!(outcome.triggers, 3);
  assert_eq!(outcome.count("success"), 2);
  assert_eq!(outcome.count("failure"), 1);
  let report = String::from_utf8(out).unwrap();
  assert!(report.contains("Flow Files transferred to success: 2"));
  assert!(report.contains("Flow Files transferred to failure: 1"));
}

#[test]
fn empty_stdin_triggers_once_without_transfer() {
  let mut stdin: &[u8] = b"";
  let mut out = Vec::new();
  let outcome = run_named(
    &ExtensionRegistry::with_builtins(),
    "RouteOnParity",
    &RunOptions::default(),
    Some(&mut stdin),
    &mut out,
  )
  .unwrap();
  assert_eq!(outcome.seeded, 0);
  assert_eq!(outcome.triggers, 1);
  assert_eq!(outcome.run_log.triggers.len(), 1);
  assert!(outcome.run_log.triggers[0].flow_file.is_none());
  assert_eq!(outcome.count("success"), 0);
  assert_eq!(outcome.count("failure"), 0);
}

#[test]
fn stdin_content_becomes_one_flow_file() {
  let mut stdin: &[u8] = b"hello from stdin";
  let mut out = Vec::new();
  let options = RunOptions {
    report: ReportOptions::all(),
    ..RunOptions::default()
  };
  let outcome = run_named(
    &ExtensionRegistry::with_builtins(),
    "UpdateAttribute",
    &options,
    Some(&mut stdin),
    &mut out,
  )
  .unwrap();
  assert_eq!(outcome.seeded, 1);
  assert_eq!(outcome.count("success"), 1);
  assert!(String::from_utf8(out).unwrap().contains("hello from stdin"));
}

#[test]
fn missing_attribute_file_aborts_before_seeding() {
  let dir = input_dir(&[("a.txt", "a")]);
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    attribute_file: Some(dir.path().join("missing.properties")),
    ..RunOptions::default()
  };
  let mut out = Vec::new();
  let err = run_named(
    &ExtensionRegistry::with_builtins(),
    "RouteOnParity",
    &options,
    None,
    &mut out,
  )
  .err()
  .expect("run should fail");
  assert_eq!(err.exit_code(), 3);
  assert!(out.is_empty());
}

#[test]
fn directory_filename_overrides_attribute_file() {
  let dir = input_dir(&[("data.csv", "x,y")]);
  let attrs_dir = tempfile::tempdir().unwrap();
  let attr_file = attrs_dir.path().join("incoming.properties");
  fs::write(&attr_file, "filename=wrong.txt\nowner=ops\n").unwrap();
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    attribute_file: Some(attr_file),
    ..RunOptions::default()
  };
  let mut out = Vec::new();
  let outcome = run_named(
    &ExtensionRegistry::with_builtins(),
    "UpdateAttribute",
    &options,
    None,
    &mut out,
  )
  .unwrap();
  let ff = &outcome.session.outputs_for_name("success")[0];
  assert_eq!(ff.attribute(FILENAME_ATTRIBUTE), Some("data.csv"));
  assert_eq!(ff.attribute("owner"), Some("ops"));
}

#[test]
fn unknown_processor_is_registry_error() {
  let mut out = Vec::new();
  let err = run_named(
    &ExtensionRegistry::with_builtins(),
    "Nope",
    &RunOptions::default(),
    None,
    &mut out,
  )
  .err()
  .expect("unknown name should fail");
  assert_eq!(err.exit_code(), 11);
}

#[test]
fn properties_reach_the_processor() {
  let dir = input_dir(&[("a.txt", "a"), ("b.txt", "b")]);
  let mut options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    ..RunOptions::default()
  };
  options
    .properties
    .insert("Route-To-Failure-On".to_string(), "even".to_string());
  let mut out = Vec::new();
  let outcome = run_named(
    &ExtensionRegistry::with_builtins(),
    "RouteOnParity",
    &options,
    None,
    &mut out,
  )
  .unwrap();
  assert_eq!(outcome.count("failure"), 1);
  assert_eq!(outcome.count("success"), 1);
  assert_eq!(outcome.run_log.triggers[0].relationship.as_deref(), Some("failure"));
  assert_eq!(outcome.run_log.triggers[0].filename.as_deref(), Some("a.txt"));
  let steps: Vec<usize> = outcome.run_log.triggers.iter().map(|t| t.step).collect();
  assert_eq!(steps, vec![1, 2]);
}

#[test]
fn run_log_is_written_when_configured() {
  let dir = input_dir(&[("a.txt", "a")]);
  let log_dir = tempfile::tempdir().unwrap();
  let log_path = log_dir.path().join("run.log.json");
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    run_log: Some(log_path.clone()),
    ..RunOptions::default()
  };
  let mut out = Vec::new();
  run_named(
    &ExtensionRegistry::with_builtins(),
    "RouteOnParity",
    &options,
    None,
    &mut out,
  )
  .unwrap();
  let log = load_run_log(&log_path).unwrap();
  assert_eq!(log.processor, "RouteOnParity");
  assert_eq!(log.seeded, 1);
  assert!(log.finished_at.is_some());
  assert_eq!(log.counts.get("success"), Some(&1));
}

#[test]
fn dropped_flow_file_is_contract_violation() {
  let err = run_misbehaving(Misbehavior::Drop, b"data").err().unwrap();
  assert!(matches!(
    err,
    HarnessError::ContractViolation {
      source: SessionError::Untransferred { .. },
      ..
    }
  ));
  assert_eq!(err.exit_code(), 30);
}

#[test]
fn double_transfer_is_contract_violation() {
  let err = run_misbehaving(Misbehavior::TransferTwice, b"data")
    .err()
    .unwrap();
  assert!(matches!(
    err,
    HarnessError::ContractViolation {
      source: SessionError::DoubleTransfer { .. },
      ..
    }
  ));
}

#[test]
fn undeclared_relationship_is_contract_violation() {
  let err = run_misbehaving(Misbehavior::Undeclared, b"data")
    .err()
    .unwrap();
  assert!(matches!(
    err,
    HarnessError::ContractViolation {
      source: SessionError::InvalidRelationship { .. },
      ..
    }
  ));
}

#[test]
fn batched_dequeue_is_contract_violation() {
  let dir = input_dir(&[("a.txt", "a"), ("b.txt", "b")]);
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    ..RunOptions::default()
  };
  let instance = ProcessorInstance::new("Misbehaving", Box::new(Misbehaving(Misbehavior::TakeTwo)));
  let mut out = Vec::new();
  let err = run_processor(instance, &options, None, &mut out)
    .err()
    .unwrap();
  assert!(matches!(
    err,
    HarnessError::ContractViolation {
      source: SessionError::BatchedDequeue { count: 2 },
      ..
    }
  ));
}

#[test]
fn flow_files_never_dequeued_are_contract_violation() {
  let dir = input_dir(&[("a.txt", "a"), ("b.txt", "b")]);
  let options = RunOptions {
    input_dir: Some(dir.path().to_path_buf()),
    ..RunOptions::default()
  };
  let instance = ProcessorInstance::new(
    "Misbehaving",
    Box::new(Misbehaving(Misbehavior::NeverDequeue)),
  );
  let mut out = Vec::new();
  let err = run_processor(instance, &options, None, &mut out)
    .err()
    .unwrap();
  assert!(matches!(
    err,
    HarnessError::ContractViolation {
      source: SessionError::Unconsumed { count: 2 },
      ..
    }
  ));
  assert_eq!(err.exit_code(), 30);
  assert!(out.is_empty());
}

#[test]
fn panic_in_trigger_is_reported() {
  let err = run_misbehaving(Misbehavior::Panic, b"data").err().unwrap();
  match err {
    HarnessError::ProcessorPanicked { processor, message } => {
      assert_eq!(processor, "Misbehaving");
      assert_eq!(message, "processor blew up");
    }
    other => panic!("expected ProcessorPanicked, got {}", other),
  }
}

#[test]
fn panic_on_empty_queue_is_not_reached() {
  let outcome = run_misbehaving(Misbehavior::Panic, b"").unwrap();
  assert_eq!(outcome.triggers, 1);
  assert_eq!(outcome.seeded, 0);
}
