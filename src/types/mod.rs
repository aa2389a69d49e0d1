//! Data types that flow between the runner, the session and processors.

mod flow_file;
mod property_descriptor;
mod relationship;

pub use flow_file::{
  Attributes, FILENAME_ATTRIBUTE, FlowFile, FlowFileId, PATH_ATTRIBUTE, UUID_ATTRIBUTE,
};
pub use property_descriptor::{PropertyDescriptor, PropertyDescriptorBuilder};
pub use relationship::Relationship;
