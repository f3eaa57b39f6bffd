// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! A causal-tree text CRDT with tombstone buckets and an OT delta bridge.
//!
//! The pieces, bottom up:
//!
//! - `primitives`: atom ids, the clock source, attribute maps
//! - `weave`: the ordered atom sequence with per-position deletion buckets
//! - `query`: id-addressed navigation over the weave
//! - `op`: the three replicated operations and their specs
//! - `doc`: the engine applying ops, local and remote
//! - `delta`: the bridge to OT retain/insert/delete edit scripts

pub mod delta;
pub mod doc;
pub mod op;
pub mod primitives;
pub mod query;
pub mod weave;

use op::Op;
use op::OpSpec;
use primitives::clock::ClockSource;
use weave::WeaveError;

/// Delivery of replicated ops into a replica.
///
/// A transport hands each remote op to `deliver`; ops enter the same
/// engine paths as local edits. Delivery must be serialized (one op at a
/// time) and causal: every id an op references must already be present,
/// live or tombstoned.
pub trait Replication {
    /// Apply one remote op.
    fn deliver(&mut self, spec: &OpSpec, op: &Op) -> Result<(), WeaveError>;
}

impl<C: ClockSource> Replication for doc::Doc<C> {
    fn deliver(&mut self, spec: &OpSpec, op: &Op) -> Result<(), WeaveError> {
        return self.apply(spec, op);
    }
}
