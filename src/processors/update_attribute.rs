//! Writes every dynamic property onto the flow file as an attribute.

use once_cell::sync::Lazy;
use tracing::instrument;

use crate::processor::{InitContext, ProcessContext, ProcessError, Processor};
use crate::session::Session;
use crate::types::{PropertyDescriptor, Relationship};

/// All flow files are routed here after their attributes are updated.
pub static REL_SUCCESS: Lazy<Relationship> =
  Lazy::new(|| Relationship::new("success", "All FlowFiles are routed to this relationship"));

/// Sets attributes from dynamic properties: a property `team=data` sets the
/// attribute `team` to `data`. Declares no fixed properties.
#[derive(Debug, Default)]
pub struct UpdateAttribute {
  relationships: Vec<Relationship>,
}

impl UpdateAttribute {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Processor for UpdateAttribute {
  fn init(&mut self, _context: &InitContext) {
    self.relationships = vec![REL_SUCCESS.clone()];
  }

  fn relationships(&self) -> Vec<Relationship> {
    self.relationships.clone()
  }

  fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
    Vec::new()
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
    let updated = flow_file.with_attributes(context.dynamic_properties());
    session.transfer(updated, &REL_SUCCESS)?;
    Ok(())
  }
}
