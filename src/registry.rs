//! Compiled-in extension registry: resolves processor types by simple name.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::processor::Processor;
use crate::processors::{ReplaceText, RouteOnParity, UpdateAttribute};

/// Resolution and construction failures.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum RegistryError {
  #[error("Could not find processor type '{name}'")]
  NotFound { name: String },
  #[error("Could not instantiate processor '{name}': {reason}")]
  Instantiation { name: String, reason: String },
}

type Factory = Box<dyn Fn() -> Result<Box<dyn Processor>, String> + Send + Sync>;

/// A constructible processor type.
pub struct ProcessorType {
  name: String,
  factory: Factory,
}

impl ProcessorType {
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Builds a fresh, uninitialized instance.
  pub fn instantiate(&self) -> Result<Box<dyn Processor>, RegistryError> {
    (self.factory)().map_err(|reason| RegistryError::Instantiation {
      name: self.name.clone(),
      reason,
    })
  }
}

/// Maps simple type names to processor factories.
#[derive(Default)]
pub struct ExtensionRegistry {
  types: BTreeMap<String, ProcessorType>,
}

impl ExtensionRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the built-in processors.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    registry.register("RouteOnParity", || Ok(Box::new(RouteOnParity::new())));
    registry.register("UpdateAttribute", || Ok(Box::new(UpdateAttribute::new())));
    registry.register("ReplaceText", || Ok(Box::new(ReplaceText::new())));
    registry
  }

  /// Registers `factory` under `name`, replacing any previous entry.
  pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
  where
    F: Fn() -> Result<Box<dyn Processor>, String> + Send + Sync + 'static,
  {
    let name = name.into();
    debug!(name = %name, "registering processor type");
    self.types.insert(
      name.clone(),
      ProcessorType {
        name,
        factory: Box::new(factory),
      },
    );
  }

  /// Looks up a processor type by its simple name.
  #[instrument(level = "trace", skip(self))]
  pub fn resolve(&self, name: &str) -> Result<&ProcessorType, RegistryError> {
    self.types.get(name).ok_or_else(|| RegistryError::NotFound {
      name: name.to_string(),
    })
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&str> {
    self.types.keys().map(String::as_str).collect()
  }
}
