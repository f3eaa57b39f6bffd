// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! The operation engine: a single replica applying replicated ops.
//!
//! A `Doc` bundles a weave, a clock source, and the replica's source name.
//! Remote ops and local edits flow through the same three entry points
//! (`insert`, `remove`, `set_attributes`), which keeps both sides on the
//! identical code path; the only difference is who minted the op spec.
//!
//! Placement of concurrent inserts is the interesting part. An insert
//! anchors on a reference id (live or tombstoned); among siblings that
//! share an anchor, the atom with the lexicographically greater id sits
//! closer to the anchor. Sibling comparison uses the op's *full*
//! originating id: comparing against the bare timestamp body would rank
//! same-tick siblings differently on different replicas.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::cmp::Ordering;

use super::op::AppliedRun;
use super::op::InsertOutcome;
use super::op::InsertRun;
use super::op::Op;
use super::op::OpSpec;
use super::primitives::attrs::AttrMap;
use super::primitives::clock::ClockSource;
use super::primitives::clock::LamportClock;
use super::primitives::id;
use super::primitives::id::AtomId;
use super::query::CharRef;
use super::query::Wrap;
use super::weave::Atom;
use super::weave::Weave;
use super::weave::WeaveError;

/// A collaborative text replica.
pub struct Doc<C: ClockSource = LamportClock> {
    pub(crate) weave: Weave,
    clock: C,
    source: String,
}

impl Doc<LamportClock> {
    /// Create a replica named `source` with a fresh Lamport clock.
    pub fn new(source: impl Into<String>) -> Doc<LamportClock> {
        return Doc::with_clock(LamportClock::new(), source);
    }
}

impl<C: ClockSource> Doc<C> {
    /// Create a replica around a caller-supplied clock source.
    pub fn with_clock(clock: C, source: impl Into<String>) -> Doc<C> {
        return Doc {
            weave: Weave::new(),
            clock,
            source: source.into(),
        };
    }

    /// This replica's source name.
    pub fn source(&self) -> &str {
        return &self.source;
    }

    /// Read-only view of the weave.
    pub fn weave(&self) -> &Weave {
        return &self.weave;
    }

    /// The visible text.
    pub fn text(&self) -> String {
        return self.weave.text();
    }

    /// Number of live atoms, counting the base atom.
    pub fn len(&self) -> usize {
        return self.weave.len();
    }

    /// The atom at `pos`; out of bounds fails.
    pub fn get_char_at(&self, pos: usize) -> Result<&Atom, WeaveError> {
        return self.weave.get_char(pos);
    }

    /// First position answering to `cr`; `None` if absent.
    pub fn index_of(&self, cr: &CharRef, include_deleted: bool) -> Option<usize> {
        return self.weave.index_of(cr, include_deleted);
    }

    /// See [`Weave::get_char_relative_to`].
    pub fn get_char_relative_to(
        &self,
        origin: &CharRef,
        relative: i64,
        wrap: Wrap,
    ) -> Result<CharRef, WeaveError> {
        return self.weave.get_char_relative_to(origin, relative, wrap);
    }

    /// See [`Weave::get_text_range`].
    pub fn get_text_range(
        &self,
        from: &CharRef,
        to: Option<&CharRef>,
    ) -> Result<&[Atom], WeaveError> {
        return self.weave.get_text_range(from, to);
    }

    /// See [`Weave::compare_char_pos`].
    pub fn compare_char_pos(&self, a: &CharRef, b: &CharRef) -> Result<Ordering, WeaveError> {
        return self.weave.compare_char_pos(a, b);
    }

    // -------------------------------------------------------------------
    // Replicated operations
    // -------------------------------------------------------------------

    /// Apply any op, local or remote.
    pub fn apply(&mut self, spec: &OpSpec, op: &Op) -> Result<(), WeaveError> {
        match op {
            Op::Insert(refs) => {
                self.insert(spec, refs)?;
            }
            Op::Remove(ids) => {
                self.remove(spec, ids)?;
            }
            Op::SetAttributes(entries) => {
                self.set_attributes(spec, entries)?;
            }
        }
        return Ok(());
    }

    /// Apply an insert op: splice each run after its reference atom.
    ///
    /// References resolve against live primary ids and tombstone buckets
    /// alike. A reference that matches nothing is skipped with a warning
    /// (the op may precede the referent here); matched runs still commit.
    pub fn insert(
        &mut self,
        spec: &OpSpec,
        refs: &BTreeMap<AtomId, InsertRun>,
    ) -> Result<InsertOutcome, WeaveError> {
        let op_id = spec.id();
        let ts = spec.ts().to_string();
        let mut seq = spec.seq();
        let mut pending: BTreeSet<AtomId> = refs.keys().cloned().collect();
        let mut outcome = InsertOutcome::default();

        let mut i = 0;
        while i < self.weave.len() && !pending.is_empty() {
            // Splice every pending run that anchors at this position, in
            // id order, so all replicas lay them out identically.
            loop {
                let key = match pending.iter().find(|k| self.weave.matches_one(i, k, true)) {
                    Some(key) => key.clone(),
                    None => break,
                };
                pending.remove(&key);
                let run = &refs[&key];

                // Sibling tie-break: greater ids sit closer to the anchor.
                let mut j = i + 1;
                while j < self.weave.len() && self.weave.get_char(j)?.id() > &op_id {
                    j += 1;
                }

                let mut ids = Vec::new();
                for (offset, ch) in run.value.chars().enumerate() {
                    let minted = mint(&ts, &mut seq, &spec.ext);
                    self.weave.insert_char(j + offset, ch, minted.clone(), run.attributes.as_ref())?;
                    ids.push(minted);
                }
                outcome.runs.push(AppliedRun { anchor: key, ids });
            }
            i += 1;
        }

        for key in pending {
            tracing::warn!("insert {op_id}: reference {key} not found, skipping its run");
            outcome.unmatched.push(key);
        }
        if let Some(max) = outcome.max_id() {
            self.clock.check_timestamp(max.body());
        }
        return Ok(outcome);
    }

    /// Apply a remove op: delete every listed id that is still live.
    ///
    /// Only primary ids count; an id already buried in a bucket stays
    /// where it is, which makes re-delivery a no-op. Returns the number of
    /// atoms deleted.
    pub fn remove(&mut self, _spec: &OpSpec, ids: &BTreeSet<AtomId>) -> Result<usize, WeaveError> {
        let mut removed = 0;
        let mut i = 1;
        while i < self.weave.len() {
            if self.weave.matches_any(i, ids, false) {
                self.weave.delete_char(i)?;
                removed += 1;
                // The next atom shifted into position i: recheck it.
            } else {
                i += 1;
            }
        }
        return Ok(removed);
    }

    /// Apply a set-attributes op: wholesale attribute replacement on every
    /// listed id that is still live. Tombstoned ids are ignored. Returns
    /// the number of atoms restyled.
    pub fn set_attributes(
        &mut self,
        _spec: &OpSpec,
        entries: &BTreeMap<AtomId, AttrMap>,
    ) -> Result<usize, WeaveError> {
        let mut updated = 0;
        for i in 1..self.weave.len() {
            let key = self.weave.get_char(i)?.id().clone();
            if let Some(attrs) = entries.get(&key) {
                self.weave.set_char_attr(i, attrs)?;
                updated += 1;
            }
        }
        return Ok(updated);
    }

    // -------------------------------------------------------------------
    // Local editing
    // -------------------------------------------------------------------

    /// Mint an op spec for a local op: fresh tick, this replica's name.
    pub fn fresh_spec(&mut self) -> OpSpec {
        return OpSpec::new(self.clock.new_timestamp(), self.source.clone());
    }

    /// Insert `value` after the referenced character (`Eof` appends after
    /// the last live atom). Returns the applied op for broadcasting.
    pub fn insert_chars_at(
        &mut self,
        anchor: CharRef,
        value: &str,
        attributes: Option<AttrMap>,
    ) -> Result<(OpSpec, Op), WeaveError> {
        let anchor_id = match anchor {
            CharRef::Eof => self.weave.get_char(self.weave.len() - 1)?.id().clone(),
            CharRef::Id(id) => {
                if !self.weave.contains_id(&id) {
                    return Err(WeaveError::UnknownId(id));
                }
                id
            }
        };
        let spec = self.fresh_spec();
        let mut refs = BTreeMap::new();
        refs.insert(anchor_id, InsertRun { value: value.to_string(), attributes });
        self.insert(&spec, &refs)?;
        return Ok((spec, Op::Insert(refs)));
    }

    /// Delete the referenced characters. Returns the applied op.
    ///
    /// `Eof` references nothing and is skipped; an id absent from the
    /// weave fails.
    pub fn rm_chars(&mut self, chars: &[CharRef]) -> Result<(OpSpec, Op), WeaveError> {
        let mut ids = BTreeSet::new();
        for cr in chars {
            match cr {
                CharRef::Eof => continue,
                CharRef::Id(id) => {
                    if !self.weave.contains_id(id) {
                        return Err(WeaveError::UnknownId(id.clone()));
                    }
                    ids.insert(id.clone());
                }
            }
        }
        let spec = self.fresh_spec();
        self.remove(&spec, &ids)?;
        return Ok((spec, Op::Remove(ids)));
    }

    /// Replace the whole document: remove every live character, then
    /// insert `text` anchored on the base atom. Returns the applied ops.
    pub fn set(
        &mut self,
        text: &str,
        attributes: Option<AttrMap>,
    ) -> Result<Vec<(OpSpec, Op)>, WeaveError> {
        let mut ops = Vec::new();

        let ids: BTreeSet<AtomId> = self.weave.ids().skip(1).cloned().collect();
        if !ids.is_empty() {
            let spec = self.fresh_spec();
            self.remove(&spec, &ids)?;
            ops.push((spec, Op::Remove(ids)));
        }
        if !text.is_empty() {
            let spec = self.fresh_spec();
            let mut refs = BTreeMap::new();
            refs.insert(AtomId::base(), InsertRun { value: text.to_string(), attributes });
            self.insert(&spec, &refs)?;
            ops.push((spec, Op::Insert(refs)));
        }
        return Ok(ops);
    }
}

/// Mint the next id of an op: the bare tick first, then suffixed ids.
///
/// The suffix counter is shared across every run of one op, so ids never
/// collide within the op and grow monotonically in mint order.
fn mint(ts: &str, seq: &mut u64, ext: &str) -> AtomId {
    if *seq == 0 {
        *seq = 1;
        return AtomId::new(ts, ext);
    }
    let body = format!("{}{}", ts, id::encode(*seq, id::SEQ_DIGITS));
    *seq += 1;
    return AtomId::new(&body, ext);
}
