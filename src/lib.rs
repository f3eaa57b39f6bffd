// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! Weft - a collaborative rich-text engine built on a causal-tree CRDT.
//!
//! Replicas insert, delete, and restyle characters concurrently and
//! converge without coordination. Deleted characters leave tombstones
//! bucketed at their old position, so concurrent edits can still anchor
//! on them. A bridge converts both ways between replicated ops and the
//! OT-style retain/insert/delete deltas existing editors speak.
//!
//! # Quick Start
//!
//! ```
//! use weft::crdt::doc::Doc;
//! use weft::crdt::query::CharRef;
//!
//! let mut alice = Doc::new("alice");
//! let mut bob = Doc::new("bob");
//!
//! // Alice types; the applied op goes out to her peers.
//! let (spec, op) = alice.insert_chars_at(CharRef::Eof, "Hello!", None).unwrap();
//!
//! // Bob applies the same op and sees the same text.
//! bob.apply(&spec, &op).unwrap();
//! assert_eq!(bob.text(), alice.text());
//! ```

pub mod crdt;
