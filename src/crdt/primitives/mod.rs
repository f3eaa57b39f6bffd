// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-14"
// driver = "Isaac Clayton"

//! Shared primitives for the weave CRDT.
//!
//! - `id`: atom identifiers and the ordered base-64 digit encoding
//! - `clock`: the `ClockSource` trait and the default `LamportClock`
//! - `attrs`: rich-text attribute maps and falsy-dropping normalization

pub mod attrs;
pub mod clock;
pub mod id;
