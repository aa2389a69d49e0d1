//! Configuration schema entry declared by a processor.

/// One configurable property of a processor.
///
/// Validation against `required` and `allowable_values` belongs to whoever
/// supplies the processor; the harness only uses the descriptor to resolve
/// values (override, then default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
  pub name: String,
  pub description: String,
  pub required: bool,
  pub default_value: Option<String>,
  /// Closed set of accepted values; `None` means any value.
  pub allowable_values: Option<Vec<String>>,
}

impl PropertyDescriptor {
  /// Starts a descriptor with the given name; everything else is optional.
  pub fn builder(name: impl Into<String>) -> PropertyDescriptorBuilder {
    PropertyDescriptorBuilder {
      inner: PropertyDescriptor {
        name: name.into(),
        description: String::new(),
        required: false,
        default_value: None,
        allowable_values: None,
      },
    }
  }

  /// True when `value` is in the allowable set, or when there is no set.
  pub fn allows(&self, value: &str) -> bool {
    self
      .allowable_values
      .as_ref()
      .is_none_or(|values| values.iter().any(|v| v == value))
  }
}

/// Builder for [PropertyDescriptor].
#[derive(Debug, Clone)]
pub struct PropertyDescriptorBuilder {
  inner: PropertyDescriptor,
}

impl PropertyDescriptorBuilder {
  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.inner.description = description.into();
    self
  }

  pub fn required(mut self, required: bool) -> Self {
    self.inner.required = required;
    self
  }

  pub fn default_value(mut self, value: impl Into<String>) -> Self {
    self.inner.default_value = Some(value.into());
    self
  }

  pub fn allowable_values<I, S>(mut self, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.inner.allowable_values = Some(values.into_iter().map(Into::into).collect());
    self
  }

  pub fn build(self) -> PropertyDescriptor {
    self.inner
  }
}
