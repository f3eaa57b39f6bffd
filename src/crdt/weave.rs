// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! The weave: an ordered sequence of atoms with tombstone buckets.
//!
//! Key design decisions:
//!
//! 1. **Live atoms only**: The sequence holds only live atoms. Deleting an
//!    atom removes it from the sequence and folds its id (plus its own
//!    bucket) into the bucket of its predecessor. A deleted id therefore
//!    remains addressable at the position where it used to live, which is
//!    what makes co-tombstone anchoring work.
//!
//! 2. **Fixed base atom**: Position 0 always holds the base atom
//!    (`00000+swarm`, empty payload). It is never deleted or restyled, and
//!    its bucket absorbs deletions of the first visible character.
//!
//! 3. **Owned atoms, read-only views**: The weave owns every atom. Queries
//!    hand out `&Atom` with private fields, so callers can observe but
//!    never mutate attributes or buckets behind the weave's back.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde::Serialize;

use super::primitives::attrs;
use super::primitives::attrs::AttrMap;
use super::primitives::id::AtomId;

/// Errors surfaced by weave mutations and queries.
///
/// Every constructor checks its invariants before touching state, so a
/// returned error implies the weave is unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WeaveError {
    /// Position outside the operation's valid range (position 0 counts as
    /// out of bounds for insert and delete).
    OutOfBounds { pos: usize, len: usize },
    /// Attempt to restyle the base atom.
    BaseAtom,
    /// A range query whose end precedes its start.
    RangeOrder { from: usize, to: usize },
    /// An id that is neither a live primary id nor a tombstone.
    UnknownId(AtomId),
    /// A relative navigation that landed outside the weave in `Wrap::Error`
    /// mode.
    OutOfRange { pos: i64, len: usize },
}

impl fmt::Display for WeaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            WeaveError::OutOfBounds { pos, len } => {
                write!(f, "position {} out of bounds (len {})", pos, len)
            }
            WeaveError::BaseAtom => write!(f, "the base atom cannot be altered"),
            WeaveError::RangeOrder { from, to } => {
                write!(f, "range end {} precedes range start {}", to, from)
            }
            WeaveError::UnknownId(id) => write!(f, "unknown atom id {}", id),
            WeaveError::OutOfRange { pos, len } => {
                write!(f, "relative position {} outside weave (len {})", pos, len)
            }
        };
    }
}

impl std::error::Error for WeaveError {}

/// One character of the document plus its identity and edit history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The primary id.
    id: AtomId,
    /// The payload. `None` only for the base atom.
    ch: Option<char>,
    /// The tombstone bucket: ids of characters deleted at this position.
    deleted: FxHashSet<AtomId>,
    /// Rich-text attributes. Normalized: no falsy values, never empty.
    attrs: Option<AttrMap>,
}

impl Atom {
    fn new(id: AtomId, ch: char, attrs: Option<AttrMap>) -> Atom {
        return Atom {
            id,
            ch: Some(ch),
            deleted: FxHashSet::default(),
            attrs,
        };
    }

    fn base() -> Atom {
        return Atom {
            id: AtomId::base(),
            ch: None,
            deleted: FxHashSet::default(),
            attrs: None,
        };
    }

    /// The primary id.
    pub fn id(&self) -> &AtomId {
        return &self.id;
    }

    /// The character payload. `None` only for the base atom.
    pub fn ch(&self) -> Option<char> {
        return self.ch;
    }

    /// The attributes, if any.
    pub fn attrs(&self) -> Option<&AttrMap> {
        return self.attrs.as_ref();
    }

    /// Iterate over the tombstone bucket.
    pub fn deleted_ids(&self) -> impl Iterator<Item = &AtomId> {
        return self.deleted.iter();
    }

    /// Whether `id` is buried in this atom's bucket.
    pub fn holds_tombstone(&self, id: &AtomId) -> bool {
        return self.deleted.contains(id);
    }
}

/// The ordered sequence of live atoms held by a replica.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weave {
    atoms: Vec<Atom>,
}

impl Weave {
    /// Create a weave holding only the base atom.
    pub fn new() -> Weave {
        return Weave { atoms: vec![Atom::base()] };
    }

    /// Number of live atoms, counting the base atom. Always at least 1.
    pub fn len(&self) -> usize {
        return self.atoms.len();
    }

    /// The atom at `pos`, or `None` out of bounds.
    pub fn atom(&self, pos: usize) -> Option<&Atom> {
        return self.atoms.get(pos);
    }

    /// The atom at `pos`; out of bounds fails.
    pub fn get_char(&self, pos: usize) -> Result<&Atom, WeaveError> {
        return self.atoms.get(pos).ok_or(WeaveError::OutOfBounds {
            pos,
            len: self.atoms.len(),
        });
    }

    /// All live atoms in weave order.
    pub fn atoms(&self) -> &[Atom] {
        return &self.atoms;
    }

    /// Iterate over the live primary ids in weave order.
    pub fn ids(&self) -> impl Iterator<Item = &AtomId> {
        return self.atoms.iter().map(Atom::id);
    }

    /// The visible text: payloads of all live atoms in order.
    pub fn text(&self) -> String {
        return self.atoms.iter().filter_map(Atom::ch).collect();
    }

    /// Splice a fresh atom in at `pos` (`1 ≤ pos ≤ len`).
    ///
    /// The id must not already appear anywhere in the weave, live or
    /// tombstoned; the engine mints fresh ids so this is checked in debug
    /// builds only. Attributes are normalized on the way in.
    pub fn insert_char(
        &mut self,
        pos: usize,
        ch: char,
        id: AtomId,
        attrs: Option<&AttrMap>,
    ) -> Result<(), WeaveError> {
        if pos == 0 || pos > self.atoms.len() {
            return Err(WeaveError::OutOfBounds { pos, len: self.atoms.len() });
        }
        debug_assert!(!self.contains_id(&id), "duplicate atom id {}", id);
        let atom = Atom::new(id, ch, attrs::normalize_opt(attrs));
        self.atoms.insert(pos, atom);
        return Ok(());
    }

    /// Remove the atom at `pos` (`1 ≤ pos < len`), folding its id and its
    /// bucket into the bucket of the atom at `pos - 1`.
    pub fn delete_char(&mut self, pos: usize) -> Result<(), WeaveError> {
        if pos == 0 || pos >= self.atoms.len() {
            return Err(WeaveError::OutOfBounds { pos, len: self.atoms.len() });
        }
        let atom = self.atoms.remove(pos);
        let previous = &mut self.atoms[pos - 1];
        previous.deleted.insert(atom.id);
        previous.deleted.extend(atom.deleted);
        return Ok(());
    }

    /// Replace the attributes of the atom at `pos` (`1 ≤ pos < len`) with a
    /// normalized copy of `attrs`.
    pub fn set_char_attr(&mut self, pos: usize, attrs: &AttrMap) -> Result<(), WeaveError> {
        if pos == 0 {
            return Err(WeaveError::BaseAtom);
        }
        if pos >= self.atoms.len() {
            return Err(WeaveError::OutOfBounds { pos, len: self.atoms.len() });
        }
        self.atoms[pos].attrs = attrs::normalize(attrs);
        return Ok(());
    }

    /// Whether the atom at `pos` answers to `id`: primary id match, or
    /// (when `include_deleted`) a tombstone in its bucket.
    ///
    /// Out-of-bounds positions match nothing.
    pub fn matches_one(&self, pos: usize, id: &AtomId, include_deleted: bool) -> bool {
        return match self.atoms.get(pos) {
            Some(atom) => atom.id == *id || (include_deleted && atom.deleted.contains(id)),
            None => false,
        };
    }

    /// Whether the atom at `pos` answers to any id in `ids`.
    pub fn matches_any(&self, pos: usize, ids: &BTreeSet<AtomId>, include_deleted: bool) -> bool {
        return match self.atoms.get(pos) {
            Some(atom) => {
                ids.contains(&atom.id)
                    || (include_deleted && atom.deleted.iter().any(|d| ids.contains(d)))
            }
            None => false,
        };
    }

    /// How many ids from `ids` the atom at `pos` answers to: 0 or 1 for the
    /// primary id, plus (when `include_deleted`) the bucket intersection.
    pub fn match_count(&self, pos: usize, ids: &BTreeSet<AtomId>, include_deleted: bool) -> usize {
        let atom = match self.atoms.get(pos) {
            Some(atom) => atom,
            None => return 0,
        };
        let primary = ids.contains(&atom.id) as usize;
        if !include_deleted {
            return primary;
        }
        let buried = atom.deleted.iter().filter(|d| ids.contains(*d)).count();
        return primary + buried;
    }

    /// First position whose atom answers to `id`, searching primaries and
    /// (when `include_deleted`) buckets.
    pub fn find(&self, id: &AtomId, include_deleted: bool) -> Option<usize> {
        return self
            .atoms
            .iter()
            .position(|atom| atom.id == *id || (include_deleted && atom.deleted.contains(id)));
    }

    /// Whether `id` appears anywhere in the weave, live or tombstoned.
    pub fn contains_id(&self, id: &AtomId) -> bool {
        return self.find(id, true).is_some();
    }
}

impl Default for Weave {
    fn default() -> Self {
        return Self::new();
    }
}
