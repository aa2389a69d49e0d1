//! Routes flow files to `success` or `failure` by alternating on the invocation count.

use once_cell::sync::Lazy;
use tracing::{debug, instrument};

use crate::processor::{InitContext, ProcessContext, ProcessError, Processor};
use crate::session::Session;
use crate::types::{PropertyDescriptor, Relationship};

/// Flow files that were processed successfully.
pub static REL_SUCCESS: Lazy<Relationship> =
  Lazy::new(|| Relationship::new("success", "FlowFiles that were successfully processed"));

/// Flow files that failed to be processed.
pub static REL_FAILURE: Lazy<Relationship> =
  Lazy::new(|| Relationship::new("failure", "FlowFiles that failed to be processed"));

/// Which invocation parity routes to failure.
pub static ROUTE_TO_FAILURE_ON: Lazy<PropertyDescriptor> = Lazy::new(|| {
  PropertyDescriptor::builder("Route-To-Failure-On")
    .description(
      "Flow files received on an invocation with this parity (0-based) are routed to failure; \
       all others are routed to success.",
    )
    .required(true)
    .allowable_values(["odd", "even"])
    .default_value("odd")
    .build()
});

/// Alternates between `success` and `failure` across triggers.
///
/// With the default `odd`, invocation 0 goes to success, 1 to failure, 2 to
/// success and so on. The counter advances only when a flow file is routed.
#[derive(Debug, Default)]
pub struct RouteOnParity {
  relationships: Vec<Relationship>,
  descriptors: Vec<PropertyDescriptor>,
  routed: u64,
}

impl RouteOnParity {
  pub fn new() -> Self {
    Self::default()
  }

  /// Relationship for the given 0-based invocation index.
  pub(crate) fn route_for(index: u64, failure_on_odd: bool) -> &'static Relationship {
    let is_odd = index % 2 == 1;
    if failure_on_odd == is_odd {
      &*REL_FAILURE
    } else {
      &*REL_SUCCESS
    }
  }
}

impl Processor for RouteOnParity {
  fn init(&mut self, _context: &InitContext) {
    self.descriptors = vec![ROUTE_TO_FAILURE_ON.clone()];
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

    let value = context.required_property(&ROUTE_TO_FAILURE_ON)?;
    if !ROUTE_TO_FAILURE_ON.allows(value) {
      // Routed first so the flow file stays accounted for.
      session.transfer(flow_file, &REL_FAILURE)?;
      return Err(ProcessError::InvalidProperty {
        name: ROUTE_TO_FAILURE_ON.name.clone(),
        value: value.to_string(),
      });
    }
    let failure_on_odd = value == "odd";

    let rel = Self::route_for(self.routed, failure_on_odd);
    debug!(index = self.routed, id = %flow_file.id(), relationship = %rel, "routing");
    session.transfer(flow_file, rel)?;
    self.routed += 1;
    Ok(())
  }
}
