// model = "claude-opus-4-5"
// created = "2026-02-15"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! The OT bridge: converting between deltas and replicated ops.
//!
//! A delta is the classic rich-text edit script: an ordered list of
//! retain / insert / delete records walked by a cursor over visible
//! positions. OT front-ends speak deltas; the weave speaks id-addressed
//! ops. This module translates both ways without losing information:
//!
//! - `apply_delta` turns an incoming delta into remove + insert ops.
//!   Removes are applied first so the insert anchors collected during the
//!   walk still resolve: freshly deleted anchors are reachable through
//!   their tombstones.
//! - `delta_from_insert` / `delta_from_remove` derive, from an op that was
//!   just applied, the delta a downstream editor must apply to mirror it.
//!
//! The cursor is 1-based: the base atom is invisible to editors.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::doc::Doc;
use super::op::InsertRun;
use super::op::Op;
use super::op::OpSpec;
use super::primitives::attrs::AttrMap;
use super::primitives::clock::ClockSource;
use super::primitives::id::AtomId;
use super::weave::WeaveError;

/// One record of a delta. Serializes untagged, so the JSON form is
/// exactly `{"retain": n}`, `{"insert": s, "attributes": {..}}`, or
/// `{"delete": n}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaRecord {
    /// Skip `retain` visible characters.
    Retain { retain: usize },
    /// Insert `insert` at the cursor, optionally styled.
    Insert {
        insert: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<AttrMap>,
    },
    /// Delete `delete` visible characters at the cursor.
    Delete { delete: usize },
}

impl DeltaRecord {
    /// A retain record.
    pub fn retain(n: usize) -> DeltaRecord {
        return DeltaRecord::Retain { retain: n };
    }

    /// A plain insert record.
    pub fn insert(s: impl Into<String>) -> DeltaRecord {
        return DeltaRecord::Insert { insert: s.into(), attributes: None };
    }

    /// A styled insert record.
    pub fn insert_attrs(s: impl Into<String>, attrs: AttrMap) -> DeltaRecord {
        return DeltaRecord::Insert { insert: s.into(), attributes: Some(attrs) };
    }

    /// A delete record.
    pub fn delete(n: usize) -> DeltaRecord {
        return DeltaRecord::Delete { delete: n };
    }
}

/// An edit script over visible positions.
pub type Delta = Vec<DeltaRecord>;

impl<C: ClockSource> Doc<C> {
    /// Apply a delta as local edits, returning the ops to broadcast.
    ///
    /// The walk collects ids against the untouched weave, then applies the
    /// remove op followed by the insert ops. Insert records that share an
    /// anchor (the cursor does not advance over inserts) cannot share one
    /// reference map, so they are split into follow-up ops anchored on the
    /// tail of the previously applied run; text order and per-run
    /// attributes both survive.
    pub fn apply_delta(&mut self, delta: &[DeltaRecord]) -> Result<Vec<(OpSpec, Op)>, WeaveError> {
        let mut cursor = 1usize;
        let mut rm: BTreeSet<AtomId> = BTreeSet::new();
        let mut recs: Vec<(AtomId, String, Option<AttrMap>)> = Vec::new();

        for record in delta {
            match record {
                DeltaRecord::Retain { retain } => {
                    cursor += retain;
                }
                DeltaRecord::Insert { insert, attributes } => {
                    let anchor = self.weave.get_char(cursor - 1)?.id().clone();
                    recs.push((anchor, insert.clone(), attributes.clone()));
                }
                DeltaRecord::Delete { delete } => {
                    for offset in 0..*delete {
                        rm.insert(self.weave.get_char(cursor + offset)?.id().clone());
                    }
                    cursor += delete;
                }
            }
        }

        let mut ops = Vec::new();
        if !rm.is_empty() {
            let spec = self.fresh_spec();
            self.remove(&spec, &rm)?;
            ops.push((spec, Op::Remove(rm)));
        }

        // Anchor of each record: the original anchor the first time, the
        // tail of the previously landed run for every record after it.
        let mut tails: BTreeMap<AtomId, AtomId> = BTreeMap::new();
        let mut origins: BTreeMap<AtomId, AtomId> = BTreeMap::new();
        let mut batch: BTreeMap<AtomId, InsertRun> = BTreeMap::new();
        for (origin, value, attributes) in recs {
            let mut anchor = tails.get(&origin).cloned().unwrap_or_else(|| origin.clone());
            if batch.contains_key(&anchor) {
                self.flush_inserts(&mut batch, &mut origins, &mut tails, &mut ops)?;
                anchor = tails.get(&origin).cloned().unwrap_or_else(|| origin.clone());
            }
            origins.insert(anchor.clone(), origin);
            batch.insert(anchor, InsertRun { value, attributes });
        }
        self.flush_inserts(&mut batch, &mut origins, &mut tails, &mut ops)?;

        return Ok(ops);
    }

    /// Apply the pending insert batch as one op and record run tails.
    fn flush_inserts(
        &mut self,
        batch: &mut BTreeMap<AtomId, InsertRun>,
        origins: &mut BTreeMap<AtomId, AtomId>,
        tails: &mut BTreeMap<AtomId, AtomId>,
        ops: &mut Vec<(OpSpec, Op)>,
    ) -> Result<(), WeaveError> {
        if batch.is_empty() {
            return Ok(());
        }
        let refs = std::mem::take(batch);
        let spec = self.fresh_spec();
        let outcome = self.insert(&spec, &refs)?;
        for run in &outcome.runs {
            if let (Some(origin), Some(tail)) = (origins.get(&run.anchor), run.ids.last()) {
                tails.insert(origin.clone(), tail.clone());
            }
        }
        origins.clear();
        ops.push((spec, Op::Insert(refs)));
        return Ok(());
    }

    /// The delta mirroring an insert op that was just applied.
    ///
    /// Scans for the runs the op minted (identified by its timestamp and
    /// source) and emits retain/insert pairs, splitting a run wherever
    /// attributes change. Stops once every minted character is accounted
    /// for.
    pub fn delta_from_insert(
        &self,
        spec: &OpSpec,
        refs: &BTreeMap<AtomId, InsertRun>,
    ) -> Delta {
        let ts = spec.ts();
        let total: usize = refs.values().map(|run| run.value.chars().count()).sum();

        let mut delta = Vec::new();
        let mut gap = 0usize;
        let mut seen = 0usize;
        let mut i = 1;
        while seen < total {
            let atom = match self.weave.atom(i) {
                Some(atom) => atom,
                None => break,
            };
            if !atom.id().minted_by(ts, &spec.ext) {
                gap += 1;
                i += 1;
                continue;
            }

            let attrs = atom.attrs().cloned();
            let mut value = String::new();
            while let Some(atom) = self.weave.atom(i) {
                if !atom.id().minted_by(ts, &spec.ext) || atom.attrs() != attrs.as_ref() {
                    break;
                }
                if let Some(ch) = atom.ch() {
                    value.push(ch);
                }
                seen += 1;
                i += 1;
            }

            if gap > 0 {
                delta.push(DeltaRecord::retain(gap));
                gap = 0;
            }
            delta.push(match attrs {
                Some(attrs) => DeltaRecord::insert_attrs(value, attrs),
                None => DeltaRecord::insert(value),
            });
        }
        return delta;
    }

    /// The delta mirroring a remove op that was just applied.
    ///
    /// The removed ids now live in tombstone buckets; each bucket hit
    /// becomes a delete record at the position right after its holder.
    /// Stops once every removed id is accounted for.
    pub fn delta_from_remove(&self, ids: &BTreeSet<AtomId>) -> Delta {
        let total = ids.len();
        let mut delta = Vec::new();
        let mut gap = 0usize;
        let mut seen = 0usize;

        let mut i = 0;
        while i < self.weave.len() && seen < total {
            if i > 0 {
                gap += 1;
            }
            let count = self.weave.match_count(i, ids, true);
            if count > 0 {
                if gap > 0 {
                    delta.push(DeltaRecord::retain(gap));
                    gap = 0;
                }
                delta.push(DeltaRecord::delete(count));
                seen += count;
            }
            i += 1;
        }
        return delta;
    }
}
