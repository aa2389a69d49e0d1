//! The processor contract: the unit under test.
//!
//! A processor declares its relationships and property descriptors at
//! [Processor::init] and performs one transformation step per
//! [Processor::trigger]. Internal state (counters and the like) lives on the
//! instance and persists across triggers within one run.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::session::{Session, SessionError};
use crate::types::{PropertyDescriptor, Relationship};

/// Errors a processor may return from a trigger.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ProcessError {
  /// A session call failed; the runner reports this as a contract violation.
  #[error(transparent)]
  Session(#[from] SessionError),
  #[error("Required property '{0}' has no value")]
  MissingProperty(String),
  #[error("Property '{name}' has unsupported value '{value}'")]
  InvalidProperty { name: String, value: String },
  #[error("Processor used before init")]
  NotInitialized,
  #[error("{0}")]
  Other(String),
}

/// Handed to [Processor::init].
#[derive(Debug, Clone)]
pub struct InitContext {
  identifier: String,
}

impl InitContext {
  pub fn new(identifier: impl Into<String>) -> Self {
    Self {
      identifier: identifier.into(),
    }
  }

  /// Name the processor was resolved under.
  pub fn identifier(&self) -> &str {
    &self.identifier
  }
}

/// Resolved configuration handed to every [Processor::trigger].
///
/// Declared properties resolve to override-or-default. Overrides whose name
/// matches no descriptor are kept as dynamic properties.
#[derive(Debug, Clone, Default)]
pub struct ProcessContext {
  values: BTreeMap<String, String>,
  dynamic: BTreeMap<String, String>,
}

impl ProcessContext {
  pub fn new(descriptors: &[PropertyDescriptor], overrides: &BTreeMap<String, String>) -> Self {
    let mut values = BTreeMap::new();
    for d in descriptors {
      let value = overrides
        .get(&d.name)
        .cloned()
        .or_else(|| d.default_value.clone());
      if let Some(v) = value {
        values.insert(d.name.clone(), v);
      }
    }
    let dynamic = overrides
      .iter()
      .filter(|(k, _)| !descriptors.iter().any(|d| &d.name == *k))
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect();
    Self { values, dynamic }
  }

  /// Value of a declared property, if it has one.
  pub fn property(&self, descriptor: &PropertyDescriptor) -> Option<&str> {
    self.values.get(&descriptor.name).map(String::as_str)
  }

  /// Value of a declared property; [ProcessError::MissingProperty] when absent.
  pub fn required_property(&self, descriptor: &PropertyDescriptor) -> Result<&str, ProcessError> {
    self
      .property(descriptor)
      .ok_or_else(|| ProcessError::MissingProperty(descriptor.name.clone()))
  }

  /// Overrides that match no declared descriptor.
  pub fn dynamic_properties(&self) -> &BTreeMap<String, String> {
    &self.dynamic
  }
}

/// A pluggable transformation unit.
pub trait Processor: Send {
  /// Called exactly once, before any trigger. Establishes relationships and
  /// property descriptors.
  fn init(&mut self, context: &InitContext);

  /// Declared relationships, fixed after `init`.
  fn relationships(&self) -> Vec<Relationship>;

  /// Declared configuration schema, in display order.
  fn property_descriptors(&self) -> Vec<PropertyDescriptor>;

  /// One unit of work. Takes at most one flow file from `session`; any flow
  /// file taken must be transferred exactly once before returning.
  fn trigger(&mut self, context: &ProcessContext, session: &mut Session)
  -> Result<(), ProcessError>;
}

/// Where a processor instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  Uninitialized,
  Initialized,
  /// Triggered at least once. Re-entrant.
  Triggered,
}

/// A processor instance plus the lifecycle bookkeeping around it.
pub struct ProcessorInstance {
  name: String,
  processor: Box<dyn Processor>,
  state: LifecycleState,
  triggers: usize,
}

impl ProcessorInstance {
  pub fn new(name: impl Into<String>, processor: Box<dyn Processor>) -> Self {
    Self {
      name: name.into(),
      processor,
      state: LifecycleState::Uninitialized,
      triggers: 0,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn state(&self) -> LifecycleState {
    self.state
  }

  /// Number of completed trigger calls.
  pub fn triggers(&self) -> usize {
    self.triggers
  }

  /// Runs `init` once. Later calls do nothing.
  #[instrument(level = "trace", skip(self), fields(processor = %self.name))]
  pub fn init(&mut self) {
    if self.state != LifecycleState::Uninitialized {
      return;
    }
    self.processor.init(&InitContext::new(self.name.clone()));
    self.state = LifecycleState::Initialized;
  }

  pub fn relationships(&self) -> Vec<Relationship> {
    self.processor.relationships()
  }

  pub fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
    self.processor.property_descriptors()
  }

  /// Triggers the processor once. Fails with [ProcessError::NotInitialized]
  /// before `init`.
  #[instrument(level = "trace", skip(self, context, session), fields(processor = %self.name))]
  pub fn trigger(
    &mut self,
    context: &ProcessContext,
    session: &mut Session,
  ) -> Result<(), ProcessError> {
    if self.state == LifecycleState::Uninitialized {
      return Err(ProcessError::NotInitialized);
    }
    self.processor.trigger(context, session)?;
    self.triggers += 1;
    self.state = LifecycleState::Triggered;
    Ok(())
  }
}
