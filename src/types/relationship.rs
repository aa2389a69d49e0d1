//! A named output route declared by a processor.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A named output route. Equality and hashing use the name only.
#[derive(Debug, Clone, Eq)]
pub struct Relationship {
  name: String,
  description: String,
}

impl Relationship {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> &str {
    &self.description
  }
}

impl PartialEq for Relationship {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Hash for Relationship {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

impl fmt::Display for Relationship {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)
  }
}
