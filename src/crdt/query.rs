// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-15"
// driver = "Isaac Clayton"

//! Navigation queries over the weave.
//!
//! Positions shift under concurrent editing, so callers address characters
//! by id (`CharRef::Id`) or by the end-of-file sentinel (`CharRef::Eof`).
//! Tombstoned ids resolve to the position of the atom holding their
//! tombstone, which keeps references valid across deletions.

use std::cmp::Ordering;

use super::primitives::id::AtomId;
use super::weave::Atom;
use super::weave::Weave;
use super::weave::WeaveError;

/// A reference to a character: a concrete id, or the end-of-file sentinel.
///
/// `Eof` compares greater than every real atom and equal to itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CharRef {
    /// A live or tombstoned atom id.
    Id(AtomId),
    /// Past the last live atom.
    Eof,
}

impl From<AtomId> for CharRef {
    fn from(id: AtomId) -> CharRef {
        return CharRef::Id(id);
    }
}

impl From<&Atom> for CharRef {
    fn from(atom: &Atom) -> CharRef {
        return CharRef::Id(atom.id().clone());
    }
}

/// How to reconcile a relative position that leaves the weave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    /// Reduce modulo the weave length.
    Wrap,
    /// Clamp to the first/last live atom.
    Limit,
    /// Clamp low to the base atom; report `CharRef::Eof` past the end.
    Eof,
    /// Fail on any out-of-range position.
    Error,
}

impl Weave {
    /// First position whose atom answers to `cr`; `None` if absent.
    ///
    /// `CharRef::Eof` is not a real position and never resolves.
    pub fn index_of(&self, cr: &CharRef, include_deleted: bool) -> Option<usize> {
        return match cr {
            CharRef::Id(id) => self.find(id, include_deleted),
            CharRef::Eof => None,
        };
    }

    /// Resolve `origin`, step `relative` positions, and reconcile the
    /// result according to `wrap`.
    ///
    /// An `Eof` origin counts from one past the last live atom, so
    /// `relative <= 0` walks back from the end and `relative > 0` is
    /// already past the end.
    pub fn get_char_relative_to(
        &self,
        origin: &CharRef,
        relative: i64,
        wrap: Wrap,
    ) -> Result<CharRef, WeaveError> {
        let len = self.len() as i64;
        let start = match origin {
            CharRef::Eof => len,
            CharRef::Id(id) => {
                self.find(id, true).ok_or_else(|| WeaveError::UnknownId(id.clone()))? as i64
            }
        };
        let pos = start + relative;

        let landed = match wrap {
            Wrap::Wrap => pos.rem_euclid(len),
            Wrap::Limit => pos.clamp(0, len - 1),
            Wrap::Eof => {
                if pos >= len {
                    return Ok(CharRef::Eof);
                }
                pos.max(0)
            }
            Wrap::Error => {
                if pos < 0 || pos >= len {
                    return Err(WeaveError::OutOfRange { pos, len: self.len() });
                }
                pos
            }
        };
        let atom = self.get_char(landed as usize)?;
        return Ok(CharRef::from(atom));
    }

    /// The atoms strictly after `from`, up to and including `to`.
    ///
    /// With `to` omitted the range runs to the last live atom. A `to` that
    /// precedes `from` fails; `from == to` yields an empty range.
    pub fn get_text_range(
        &self,
        from: &CharRef,
        to: Option<&CharRef>,
    ) -> Result<&[Atom], WeaveError> {
        let len = self.len();
        let rank = |cr: &CharRef| -> Result<usize, WeaveError> {
            return match cr {
                CharRef::Eof => Ok(len),
                CharRef::Id(id) => {
                    self.find(id, true).ok_or_else(|| WeaveError::UnknownId(id.clone()))
                }
            };
        };

        let from_pos = rank(from)?;
        let to_pos = match to {
            Some(cr) => rank(cr)?,
            None => len,
        };
        if to_pos < from_pos {
            return Err(WeaveError::RangeOrder { from: from_pos, to: to_pos });
        }
        let start = (from_pos + 1).min(len);
        let end = (to_pos + 1).min(len);
        return Ok(&self.atoms()[start..end]);
    }

    /// Order two references by weave position.
    ///
    /// `Eof` is greater than every real atom and equal to itself. Unknown
    /// ids fail.
    pub fn compare_char_pos(&self, a: &CharRef, b: &CharRef) -> Result<Ordering, WeaveError> {
        let rank = |cr: &CharRef| -> Result<usize, WeaveError> {
            return match cr {
                CharRef::Eof => Ok(self.len()),
                CharRef::Id(id) => {
                    self.find(id, true).ok_or_else(|| WeaveError::UnknownId(id.clone()))
                }
            };
        };
        return Ok(rank(a)?.cmp(&rank(b)?));
    }
}
