//! Drives one end-to-end execution: seed input, trigger, check accounting, report.
//!
//! - [run_named]: resolve a processor by name from an [ExtensionRegistry], then run it.
//! - [run_processor]: run an already constructed processor instance.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::attribute_file::load_attribute_file;
use crate::error::HarnessError;
use crate::flow_file_store::FlowFileStore;
use crate::input::{seed_from_directory, seed_from_reader};
use crate::processor::{ProcessContext, ProcessorInstance};
use crate::registry::ExtensionRegistry;
use crate::report::{ReportOptions, write_report};
use crate::run_log::{RunLog, TriggerEntry, save_run_log};
use crate::session::{Session, SessionError};
use crate::types::{Attributes, FILENAME_ATTRIBUTE};

/// Options for [run_named] and [run_processor].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// What to print per transferred flow file.
  pub report: ReportOptions,
  /// If set, every regular file under this directory becomes one flow file
  /// and standard input is ignored.
  pub input_dir: Option<PathBuf>,
  /// If set, key/value attributes merged into every seeded flow file.
  pub attribute_file: Option<PathBuf>,
  /// Registry search path. The registry is compiled in, so this is only logged.
  pub registry_path: Option<PathBuf>,
  /// Processor property overrides; names matching no descriptor are dynamic properties.
  pub properties: BTreeMap<String, String>,
  /// If set, the JSON run log is written here after reporting.
  pub run_log: Option<PathBuf>,
}

/// Everything a completed run produced.
pub struct RunOutcome {
  /// The session, holding every relationship's outputs.
  pub session: Session,
  /// Flow files seeded into the input queue.
  pub seeded: usize,
  /// Trigger calls made.
  pub triggers: usize,
  /// Per-trigger record of the run.
  pub run_log: RunLog,
}

impl RunOutcome {
  /// Number of flow files routed to the relationship called `name`.
  pub fn count(&self, name: &str) -> usize {
    self.run_log.counts.get(name).copied().unwrap_or(0)
  }
}

/// Resolves `name` in `registry`, instantiates it and runs it.
#[instrument(level = "trace", skip(registry, options, stdin, out))]
pub fn run_named(
  registry: &ExtensionRegistry,
  name: &str,
  options: &RunOptions,
  stdin: Option<&mut dyn Read>,
  out: &mut dyn Write,
) -> Result<RunOutcome, HarnessError> {
  if let Some(path) = &options.registry_path {
    info!(path = %path.display(), "registry search path given; processors are compiled in");
  }
  let processor_type = registry.resolve(name)?;
  let processor = processor_type.instantiate()?;
  run_processor(ProcessorInstance::new(name, processor), options, stdin, out)
}

/// Runs one processor instance end to end.
///
/// Seeds from `options.input_dir` when set, otherwise from `stdin` (read to
/// end-of-stream; `None` seeds nothing). Triggers once per seeded flow file,
/// or once when there are none, then writes the report to `out`.
#[instrument(level = "trace", skip_all, fields(processor = %instance.name()))]
pub fn run_processor(
  mut instance: ProcessorInstance,
  options: &RunOptions,
  stdin: Option<&mut dyn Read>,
  out: &mut dyn Write,
) -> Result<RunOutcome, HarnessError> {
  let name = instance.name().to_string();
  instance.init();

  let attributes = match &options.attribute_file {
    Some(path) => load_attribute_file(path)?,
    None => Attributes::new(),
  };

  let mut run_log = RunLog::new(name.clone(), Utc::now().to_rfc3339());
  let mut session = Session::new(instance.relationships());
  let mut store = FlowFileStore::new();

  let seeded = match (&options.input_dir, stdin) {
    (Some(dir), _) => seed_from_directory(&mut store, &mut session, dir, &attributes)?,
    (None, Some(reader)) => seed_from_reader(&mut store, &mut session, reader, &attributes)?,
    (None, None) => 0,
  };
  run_log.seeded = seeded;
  info!(seeded, created = store.created(), "input seeded");

  let context = ProcessContext::new(&instance.property_descriptors(), &options.properties);
  let triggers = seeded.max(1);
  for step in 1..=triggers {
    let entry = trigger_once(&mut instance, &context, &mut session, step)?;
    run_log.triggers.push(entry);
  }
  run_log.finished_at = Some(Utc::now().to_rfc3339());

  session.verify_accounting().map_err(|source| {
    error!(error = %source, "accounting check failed");
    HarnessError::ContractViolation {
      processor: name.clone(),
      source,
    }
  })?;

  for r in session.relationships() {
    let count = session.outputs_for(r).len();
    info!(relationship = %r, count, "flow files transferred");
    run_log.counts.insert(r.name().to_string(), count);
  }
  info!(transferred = run_log.transferred(), triggers, "run accounted");

  write_report(out, &session, options.report).map_err(|source| HarnessError::Output { source })?;

  if let Some(path) = &options.run_log {
    save_run_log(path, &run_log).map_err(|source| HarnessError::RunLog {
      path: path.clone(),
      source,
    })?;
  }

  Ok(RunOutcome {
    session,
    seeded,
    triggers,
    run_log,
  })
}

/// Triggers once and checks that the trigger took at most one flow file and
/// routed everything it took.
fn trigger_once(
  instance: &mut ProcessorInstance,
  context: &ProcessContext,
  session: &mut Session,
  step: usize,
) -> Result<TriggerEntry, HarnessError> {
  let name = instance.name().to_string();
  let dequeued_before = session.dequeued();
  let logged_before = session.transfer_log().len();

  let result = catch_unwind(AssertUnwindSafe(|| instance.trigger(context, session)));
  match result {
    Ok(Ok(())) => {}
    Ok(Err(e)) => {
      error!(step, error = %e, "trigger failed");
      return Err(HarnessError::from_trigger(&name, e));
    }
    Err(payload) => {
      let message = panic_message(payload.as_ref());
      error!(step, message = %message, "trigger panicked");
      return Err(HarnessError::ProcessorPanicked {
        processor: name,
        message,
      });
    }
  }

  let taken = session.dequeued() - dequeued_before;
  if taken > 1 {
    warn!(step, taken, "trigger dequeued more than one flow file");
    return Err(HarnessError::ContractViolation {
      processor: name,
      source: SessionError::BatchedDequeue { count: taken },
    });
  }
  let pending = session.pending();
  if !pending.is_empty() {
    warn!(step, ?pending, "trigger returned without transferring");
    return Err(HarnessError::ContractViolation {
      processor: name,
      source: SessionError::Untransferred { ids: pending },
    });
  }

  let routed = session.transfer_log()[logged_before..].first();
  let flow_file = routed.and_then(|t| {
    session
      .outputs_for_name(&t.relationship)
      .iter()
      .find(|f| f.id() == t.flow_file)
  });
  Ok(TriggerEntry {
    step,
    flow_file: routed.map(|t| t.flow_file),
    filename: flow_file.and_then(|f| f.attribute(FILENAME_ATTRIBUTE).map(String::from)),
    relationship: routed.map(|t| t.relationship.clone()),
  })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
