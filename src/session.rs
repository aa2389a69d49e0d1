//! Per-run mediator between the runner and a processor.
//!
//! The session owns the FIFO input queue and one ordered output list per
//! declared relationship. It tracks every flow file handed out by
//! [Session::get] until it is routed with [Session::transfer], so a processor
//! that drops, duplicates or misroutes a flow file is caught.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::{instrument, trace, warn};

use crate::types::{FlowFile, FlowFileId, Relationship};

/// Contract violations detected by the session.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
  #[error("Relationship '{relationship}' is not declared by the processor")]
  InvalidRelationship { relationship: String },
  #[error("Flow file {id} was already transferred")]
  DoubleTransfer { id: FlowFileId },
  #[error("Flow file {id} was not obtained from this session")]
  UnknownFlowFile { id: FlowFileId },
  #[error("Flow files dequeued but never transferred: {ids:?}")]
  Untransferred { ids: Vec<FlowFileId> },
  #[error("A single trigger dequeued {count} flow files")]
  BatchedDequeue { count: usize },
  #[error("{count} flow files were never dequeued")]
  Unconsumed { count: usize },
  #[error("{dequeued} flow files dequeued but {transferred} transferred")]
  AccountingMismatch { dequeued: usize, transferred: usize },
}

/// One routing decision, in transfer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
  pub flow_file: FlowFileId,
  pub relationship: String,
}

/// Input queue plus per-relationship outputs for one run.
#[derive(Debug)]
pub struct Session {
  relationships: Vec<Relationship>,
  queue: VecDeque<FlowFile>,
  outputs: HashMap<String, Vec<FlowFile>>,
  /// Dequeued and not yet transferred.
  in_flight: BTreeSet<FlowFileId>,
  transferred: HashSet<FlowFileId>,
  transfer_log: Vec<TransferRecord>,
  dequeued: usize,
}

impl Session {
  /// Creates a session that accepts transfers only to `relationships`.
  pub fn new(relationships: impl IntoIterator<Item = Relationship>) -> Self {
    let mut declared: Vec<Relationship> = Vec::new();
    for r in relationships {
      if !declared.contains(&r) {
        declared.push(r);
      }
    }
    let outputs = declared
      .iter()
      .map(|r| (r.name().to_string(), Vec::new()))
      .collect();
    Self {
      relationships: declared,
      queue: VecDeque::new(),
      outputs,
      in_flight: BTreeSet::new(),
      transferred: HashSet::new(),
      transfer_log: Vec::new(),
      dequeued: 0,
    }
  }

  /// Declared relationships, in declaration order.
  pub fn relationships(&self) -> &[Relationship] {
    &self.relationships
  }

  /// Appends a flow file to the input queue.
  pub fn enqueue(&mut self, flow_file: FlowFile) {
    self.queue.push_back(flow_file);
  }

  /// Dequeues the head of the input queue; `None` once the queue is drained.
  #[instrument(level = "trace", skip(self))]
  pub fn get(&mut self) -> Option<FlowFile> {
    let flow_file = self.queue.pop_front()?;
    self.in_flight.insert(flow_file.id());
    self.dequeued += 1;
    trace!(id = %flow_file.id(), "dequeued flow file");
    Some(flow_file)
  }

  /// Routes `flow_file` to `relationship`. Each dequeued flow file may be
  /// transferred exactly once.
  #[instrument(level = "trace", skip(self, flow_file), fields(id = %flow_file.id()))]
  pub fn transfer(
    &mut self,
    flow_file: FlowFile,
    relationship: &Relationship,
  ) -> Result<(), SessionError> {
    let id = flow_file.id();
    let Some(list) = self.outputs.get_mut(relationship.name()) else {
      warn!(relationship = %relationship, "transfer to undeclared relationship");
      return Err(SessionError::InvalidRelationship {
        relationship: relationship.name().to_string(),
      });
    };
    if self.transferred.contains(&id) {
      warn!(id = %id, "flow file transferred twice");
      return Err(SessionError::DoubleTransfer { id });
    }
    if !self.in_flight.remove(&id) {
      warn!(id = %id, "transfer of a flow file not obtained from this session");
      return Err(SessionError::UnknownFlowFile { id });
    }
    list.push(flow_file);
    self.transferred.insert(id);
    self.transfer_log.push(TransferRecord {
      flow_file: id,
      relationship: relationship.name().to_string(),
    });
    Ok(())
  }

  /// Flow files routed to `relationship`, in transfer order. Empty for an
  /// undeclared relationship. Re-reading returns the same list.
  pub fn outputs_for(&self, relationship: &Relationship) -> &[FlowFile] {
    self.outputs_for_name(relationship.name())
  }

  /// Like [Session::outputs_for], keyed by relationship name.
  pub fn outputs_for_name(&self, name: &str) -> &[FlowFile] {
    self.outputs.get(name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Flow files dequeued but not yet transferred, in id order.
  pub fn pending(&self) -> Vec<FlowFileId> {
    self.in_flight.iter().copied().collect()
  }

  /// Every routing decision so far, in transfer order.
  pub fn transfer_log(&self) -> &[TransferRecord] {
    &self.transfer_log
  }

  /// Number of flow files still waiting in the input queue.
  pub fn queued(&self) -> usize {
    self.queue.len()
  }

  /// Number of flow files handed out by [Session::get].
  pub fn dequeued(&self) -> usize {
    self.dequeued
  }

  /// Number of flow files routed to any relationship.
  pub fn transferred(&self) -> usize {
    self.outputs.values().map(Vec::len).sum()
  }

  /// Checks that every enqueued flow file was dequeued and ended in exactly
  /// one output list.
  pub fn verify_accounting(&self) -> Result<(), SessionError> {
    if !self.in_flight.is_empty() {
      return Err(SessionError::Untransferred {
        ids: self.pending(),
      });
    }
    if !self.queue.is_empty() {
      return Err(SessionError::Unconsumed {
        count: self.queued(),
      });
    }
    let transferred = self.transferred();
    if transferred != self.dequeued {
      return Err(SessionError::AccountingMismatch {
        dequeued: self.dequeued,
        transferred,
      });
    }
    Ok(())
  }
}
