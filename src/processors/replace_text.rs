//! Rewrites flow file content with a regular expression.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{instrument, warn};

use crate::processor::{InitContext, ProcessContext, ProcessError, Processor};
use crate::session::Session;
use crate::types::{PropertyDescriptor, Relationship};

pub static REL_SUCCESS: Lazy<Relationship> = Lazy::new(|| {
  Relationship::new(
    "success",
    "FlowFiles whose content was replaced successfully",
  )
});

pub static REL_FAILURE: Lazy<Relationship> = Lazy::new(|| {
  Relationship::new(
    "failure",
    "FlowFiles that could not be updated (non-UTF-8 content or invalid expression)",
  )
});

pub static SEARCH_VALUE: Lazy<PropertyDescriptor> = Lazy::new(|| {
  PropertyDescriptor::builder("Search Value")
    .description("Regular expression matched against the whole content")
    .required(true)
    .default_value("(?s)(^.*$)")
    .build()
});

pub static REPLACEMENT_VALUE: Lazy<PropertyDescriptor> = Lazy::new(|| {
  PropertyDescriptor::builder("Replacement Value")
    .description("Replacement for each match; `$1` style group references are expanded")
    .required(true)
    .default_value("$1")
    .build()
});

/// Replaces every match of `Search Value` in the content with
/// `Replacement Value`. The new content is a fresh binding; the old bytes are
/// left untouched.
#[derive(Debug, Default)]
pub struct ReplaceText {
  relationships: Vec<Relationship>,
  descriptors: Vec<PropertyDescriptor>,
  /// Last compiled pattern, reused while the search value is unchanged.
  compiled: Option<(String, Regex)>,
}

impl ReplaceText {
  pub fn new() -> Self {
    Self::default()
  }

  fn regex(&mut self, pattern: &str) -> Result<Regex, regex::Error> {
    let cached = match &self.compiled {
      Some((p, re)) if p == pattern => Some(re.clone()),
      _ => None,
    };
    if let Some(re) = cached {
      return Ok(re);
    }
    let re = Regex::new(pattern)?;
    self.compiled = Some((pattern.to_string(), re.clone()));
    Ok(re)
  }
}

impl Processor for ReplaceText {
  fn init(&mut self, _context: &InitContext) {
    self.descriptors = vec![SEARCH_VALUE.clone(), REPLACEMENT_VALUE.clone()];
    self.relationships = vec![REL_SUCCESS.clone(), REL_FAILURE.clone()];
  }

  fn relationships(&self) -> Vec<Relationship> {
    self.relationships.clone()
  }

  fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
    self.descriptors.clone()
  }

  #[instrument(level = "trace", skip(self, context, session))]
  fn trigger(
    &mut self,
    context: &ProcessContext,
    session: &mut Session,
  ) -> Result<(), ProcessError> {
    let Some(flow_file) = session.get() else {
      return Ok(());
    };
    let search = context.required_property(&SEARCH_VALUE)?;
    let replacement = context.required_property(&REPLACEMENT_VALUE)?;

    let Ok(text) = std::str::from_utf8(flow_file.content()) else {
      warn!(id = %flow_file.id(), "content is not UTF-8");
      session.transfer(flow_file, &REL_FAILURE)?;
      return Ok(());
    };

    let replaced = match self.regex(search) {
      Ok(re) => re.replace_all(text, replacement).into_owned(),
      Err(e) => {
        warn!(pattern = search, error = %e, "invalid search value");
        session.transfer(flow_file, &REL_FAILURE)?;
        return Ok(());
      }
    };

    session.transfer(flow_file.with_content(replaced), &REL_SUCCESS)?;
    Ok(())
  }
}
