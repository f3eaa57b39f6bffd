// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! Replicated operations and their op specs.
//!
//! Each op is addressed entirely by id, never by position:
//!
//! - Insert: "these characters go after atom X" (X may be tombstoned)
//! - Remove: "these atoms are deleted"
//! - SetAttributes: "these atoms now carry exactly these attributes"
//!
//! Ids survive concurrent edits where positional indices would shift, so
//! ops commute as long as the ids they reference have already arrived.
//! The op spec carries the originating atom id split into its timestamp
//! body and source, which is enough to reconstruct every id the op mints.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::primitives::attrs::AttrMap;
use super::primitives::id;
use super::primitives::id::AtomId;

/// The structured identifier of an op: the timestamp body and source of
/// its originating atom id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSpec {
    /// Timestamp body, `TTTTT` or `TTTTTss`.
    pub body: String,
    /// Originating replica.
    pub ext: String,
}

impl OpSpec {
    /// Build a spec from a timestamp body and a source name.
    pub fn new(body: impl Into<String>, ext: impl Into<String>) -> OpSpec {
        return OpSpec { body: body.into(), ext: ext.into() };
    }

    /// The full originating id, `body+ext`.
    pub fn id(&self) -> AtomId {
        return AtomId::new(&self.body, &self.ext);
    }

    /// The bare 5-digit timestamp portion of the body.
    pub fn ts(&self) -> &str {
        return self.body.get(..id::TS_DIGITS).unwrap_or(&self.body);
    }

    /// The decoded sub-sequence suffix, 0 when absent.
    pub fn seq(&self) -> u64 {
        return self
            .body
            .get(id::TS_DIGITS..)
            .filter(|suffix| !suffix.is_empty())
            .and_then(id::decode)
            .unwrap_or(0);
    }
}

/// One run of characters to insert after a reference atom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsertRun {
    /// The characters, in order.
    pub value: String,
    /// Attributes applied to every character of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttrMap>,
}

impl InsertRun {
    /// A plain run without attributes.
    pub fn plain(value: impl Into<String>) -> InsertRun {
        return InsertRun { value: value.into(), attributes: None };
    }

    /// A styled run.
    pub fn styled(value: impl Into<String>, attributes: AttrMap) -> InsertRun {
        return InsertRun { value: value.into(), attributes: Some(attributes) };
    }
}

/// A replicated operation.
///
/// Reference maps are `BTreeMap`/`BTreeSet` so every replica walks them in
/// the same (id) order; application order inside one op affects placement
/// of runs that share an anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Runs of fresh characters, keyed by the id they anchor after.
    Insert(BTreeMap<AtomId, InsertRun>),
    /// Ids to delete.
    Remove(BTreeSet<AtomId>),
    /// Wholesale attribute replacement, keyed by target id.
    SetAttributes(BTreeMap<AtomId, AttrMap>),
}

/// One applied insert run: its anchor and the ids minted for it, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedRun {
    /// The reference id the run anchored on.
    pub anchor: AtomId,
    /// The minted ids, one per character.
    pub ids: Vec<AtomId>,
}

/// What an insert op actually did: which runs landed, which references
/// never resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Applied runs, in application order.
    pub runs: Vec<AppliedRun>,
    /// Reference ids that matched nothing (advisory, see the engine).
    pub unmatched: Vec<AtomId>,
}

impl InsertOutcome {
    /// The largest minted id, used to advance the clock.
    ///
    /// Minted ids grow within each run and across runs of one op, so this
    /// is the last id of the last non-empty run.
    pub fn max_id(&self) -> Option<&AtomId> {
        return self.runs.iter().rev().find_map(|run| run.ids.last());
    }

    /// Total number of characters spliced in.
    pub fn minted(&self) -> usize {
        return self.runs.iter().map(|run| run.ids.len()).sum();
    }

    /// The last minted id for a given reference key.
    pub fn tail_of(&self, anchor: &AtomId) -> Option<&AtomId> {
        return self
            .runs
            .iter()
            .find(|run| run.anchor == *anchor)
            .and_then(|run| run.ids.last());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_splits_ts_and_seq() {
        let bare = OpSpec::new("10000", "A");
        assert_eq!(bare.ts(), "10000");
        assert_eq!(bare.seq(), 0);
        assert_eq!(bare.id().as_str(), "10000+A");

        let suffixed = OpSpec::new("1000003", "A");
        assert_eq!(suffixed.ts(), "10000");
        assert_eq!(suffixed.seq(), 3);
        assert_eq!(suffixed.id().as_str(), "1000003+A");
    }

    #[test]
    fn insert_op_wire_shape() {
        let mut refs = BTreeMap::new();
        refs.insert(AtomId::base(), InsertRun::plain("Hi"));
        let op = Op::Insert(refs);

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json, json!({ "insert": { "00000+swarm": { "value": "Hi" } } }));

        let back: Op = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn styled_run_serializes_attributes() {
        let attrs: AttrMap = [("bold".to_string(), json!(true))].into_iter().collect();
        let run = InsertRun::styled("x", attrs);
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json, json!({ "value": "x", "attributes": { "bold": true } }));
    }

    #[test]
    fn remove_op_round_trips() {
        let ids: BTreeSet<AtomId> =
            [AtomId::new("10000", "A"), AtomId::new("10001", "A")].into_iter().collect();
        let op = Op::Remove(ids);
        let json = serde_json::to_string(&op).unwrap();
        let back: Op = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn outcome_reports_max_and_tail() {
        let anchor = AtomId::base();
        let ids = vec![AtomId::new("10000", "A"), AtomId::new("1000001", "A")];
        let outcome = InsertOutcome {
            runs: vec![AppliedRun { anchor: anchor.clone(), ids: ids.clone() }],
            unmatched: Vec::new(),
        };

        assert_eq!(outcome.max_id(), Some(&ids[1]));
        assert_eq!(outcome.tail_of(&anchor), Some(&ids[1]));
        assert_eq!(outcome.minted(), 2);
    }
}
