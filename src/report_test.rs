//! Tests for `report`.

use crate::flow_file_store::FlowFileStore;
use crate::report::{DASHED_LINE, ReportOptions, write_attributes, write_report};
use crate::session::Session;
use crate::types::{Attributes, FILENAME_ATTRIBUTE, Relationship};

fn routed_session() -> Session {
  let mut store = FlowFileStore::new();
  let mut s = Session::new([
    Relationship::new("success", ""),
    Relationship::new("failure", ""),
  ]);
  let mut attrs = Attributes::new();
  attrs.insert(FILENAME_ATTRIBUTE.to_string(), "a.txt".to_string());
  s.enqueue(store.create("alpha", &attrs));
  s.enqueue(store.create("beta", &attrs));
  let a = s.get().unwrap();
  let b = s.get().unwrap();
  s.transfer(a, &Relationship::new("success", "")).unwrap();
  s.transfer(b, &Relationship::new("success", "")).unwrap();
  s
}

fn render(session: &Session, options: ReportOptions) -> String {
  let mut buf = Vec::new();
  write_report(&mut buf, session, options).unwrap();
  String::from_utf8(buf).unwrap()
}

#[test]
fn counts_only_by_default() {
  let out = render(&routed_session(), ReportOptions::default());
  assert!(out.contains("Flow Files transferred to success: 2\n"));
  assert!(out.contains("Flow Files transferred to failure: 0\n"));
  assert!(!out.contains("alpha"));
  assert!(!out.contains("FlowFile Attributes"));
}

#[test]
fn relationships_are_reported_in_declaration_order() {
  let out = render(&routed_session(), ReportOptions::default());
  let success = out.find("transferred to success").unwrap();
  let failure = out.find("transferred to failure").unwrap();
  assert!(success < failure);
}

#[test]
fn content_is_printed_in_transfer_order() {
  let out = render(
    &routed_session(),
    ReportOptions {
      attributes: false,
      content: true,
    },
  );
  let alpha = out.find("alpha").unwrap();
  let beta = out.find("beta").unwrap();
  assert!(alpha < beta);
}

#[test]
fn attribute_block_lists_metadata_and_map() {
  let mut store = FlowFileStore::new();
  let mut attrs = Attributes::new();
  attrs.insert("team".to_string(), "data".to_string());
  let ff = store.create("12345", &attrs);
  let mut buf = Vec::new();
  write_attributes(&mut buf, &ff).unwrap();
  let out = String::from_utf8(buf).unwrap();
  assert!(out.starts_with(&format!("Flow file {}\n{}", ff, DASHED_LINE)));
  assert!(out.contains("Key: 'entryDate'\n\tValue: '"));
  assert!(out.contains("Key: 'lineageStartDate'\n\tValue: '"));
  assert!(out.contains("Key: 'fileSize'\n\tValue: '5'"));
  assert!(out.contains("FlowFile Attribute Map Content"));
  assert!(out.contains("Key: 'team'\n\tValue: 'data'"));
  assert!(out.ends_with(&format!("{}\n", DASHED_LINE)));
}

#[test]
fn report_is_repeatable() {
  let s = routed_session();
  let first = render(&s, ReportOptions::all());
  let second = render(&s, ReportOptions::all());
  assert_eq!(first, second);
}
