//! # flowfile-harness
//!
//! Runs a single flow-file processor outside its host runtime: seeds one or
//! more flow files, triggers the processor, and reports where each flow file
//! was routed and what it now contains.
//!
//! ## Architecture
//!
//! - [types]: flow files, relationships and property descriptors.
//! - [FlowFileStore]: allocates flow files for one run.
//! - [Session]: FIFO input queue and per-relationship outputs; detects lost,
//!   duplicated and misrouted flow files.
//! - [Processor]: the contract a unit under test implements; built-ins live
//!   in [processors].
//! - [ExtensionRegistry]: resolves processors by simple name.
//! - [runner]: seeds input, triggers, checks accounting, writes the report.

pub mod attribute_file;
pub mod error;
#[cfg(test)]
mod error_test;
pub mod flow_file_store;
pub mod input;
pub mod processor;
pub mod processors;
pub mod registry;
pub mod report;
#[cfg(test)]
mod report_test;
pub mod run_log;
pub mod runner;
#[cfg(test)]
mod runner_test;
pub mod session;
pub mod types;

pub use error::HarnessError;
pub use flow_file_store::FlowFileStore;
pub use processor::{ProcessContext, ProcessError, Processor, ProcessorInstance};
pub use registry::ExtensionRegistry;
pub use report::ReportOptions;
pub use runner::{RunOptions, RunOutcome, run_named, run_processor};
pub use session::{Session, SessionError};
pub use types::{FlowFile, FlowFileId, PropertyDescriptor, Relationship};
