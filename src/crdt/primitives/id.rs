// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-14"
// driver = "Isaac Clayton"

//! Atom identifiers and their ordered base-64 encoding.
//!
//! An atom id is a string of the form `TTTTT+SRC` (or `TTTTTss+SRC` when a
//! 2-digit sub-sequence suffix is present):
//!
//! - `TTTTT` is a 5-digit Lamport-style timestamp,
//! - `ss` is an optional sub-sequence suffix disambiguating ids minted
//!   within a single clock tick,
//! - `SRC` is the originating replica.
//!
//! Ids are compared lexicographically *as strings* everywhere. This works
//! because the digit alphabet is chosen so that its ASCII order equals its
//! numeric order: `0-9 < A-Z < _ < a-z < ~`. A suffixed body with the same
//! 5-digit prefix sorts after the bare body (`+` precedes every digit in
//! ASCII), so suffixed ids from one tick stay above the tick itself and
//! below the next tick.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// The 64 timestamp digits, in ascending ASCII (and numeric) order.
pub const DIGITS: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz~";

/// Width of a timestamp body, in digits.
pub const TS_DIGITS: usize = 5;

/// Width of a sub-sequence suffix, in digits.
pub const SEQ_DIGITS: usize = 2;

/// The replica name reserved for the base atom.
pub const BASE_SOURCE: &str = "swarm";

/// Encode `n` as a fixed-width big-endian string of timestamp digits.
pub fn encode(n: u64, width: usize) -> String {
    assert!(n < 64u64.pow(width as u32), "value {} exceeds {} digits", n, width);
    let mut out = vec![b'0'; width];
    let mut rest = n;
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[(rest % 64) as usize];
        rest /= 64;
    }
    return String::from_utf8(out).unwrap_or_default();
}

/// Decode a string of timestamp digits. Returns `None` on foreign characters.
pub fn decode(digits: &str) -> Option<u64> {
    let mut n: u64 = 0;
    for byte in digits.bytes() {
        let value = DIGITS.iter().position(|d| *d == byte)?;
        n = n.checked_mul(64)?.checked_add(value as u64)?;
    }
    return Some(n);
}

/// A globally unique atom identifier, stored in its wire form.
///
/// The string form is the source of truth: equality, ordering, and hashing
/// all go through it, so a serialized id round-trips bit-exactly.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtomId(String);

impl AtomId {
    /// Build an id from a timestamp body and a source name.
    pub fn new(body: &str, ext: &str) -> AtomId {
        return AtomId(format!("{}+{}", body, ext));
    }

    /// Wrap an already-formatted `body+ext` string.
    pub fn from_string(id: String) -> AtomId {
        return AtomId(id);
    }

    /// The id of the base atom, `00000+swarm`.
    ///
    /// Constructed fresh so every weave owns its own instance.
    pub fn base() -> AtomId {
        return AtomId::new(&encode(0, TS_DIGITS), BASE_SOURCE);
    }

    /// The full string form.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// The timestamp body: everything before the first `+`.
    pub fn body(&self) -> &str {
        return self.0.split('+').next().unwrap_or(&self.0);
    }

    /// The source: everything after the first `+`.
    pub fn ext(&self) -> &str {
        return self.0.split_once('+').map(|(_, ext)| ext).unwrap_or("");
    }

    /// Whether this id was minted by the op with timestamp `ts` at `ext`.
    ///
    /// True when the body is `ts` itself or `ts` plus a sub-sequence
    /// suffix, and the source matches.
    pub fn minted_by(&self, ts: &str, ext: &str) -> bool {
        let body = self.body();
        let suffixed = body.len() == TS_DIGITS + SEQ_DIGITS;
        return self.ext() == ext
            && (body.len() == TS_DIGITS || suffixed)
            && body.starts_with(ts);
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

impl fmt::Debug for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "AtomId({})", self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_order_is_ascii_order() {
        for pair in DIGITS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        for n in [0u64, 1, 63, 64, 4095] {
            assert_eq!(decode(&encode(n, TS_DIGITS)), Some(n));
        }
        let max = 64u64.pow(TS_DIGITS as u32) - 1;
        assert_eq!(decode(&encode(max, TS_DIGITS)), Some(max));
    }

    #[test]
    fn encode_is_order_preserving() {
        assert!(encode(1, TS_DIGITS) < encode(2, TS_DIGITS));
        assert!(encode(63, TS_DIGITS) < encode(64, TS_DIGITS));
        assert!(encode(999, TS_DIGITS) < encode(1000, TS_DIGITS));
        assert!(encode(9, SEQ_DIGITS) < encode(10, SEQ_DIGITS));
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        assert_eq!(decode("000+0"), None);
        assert_eq!(decode("!!!!!"), None);
    }

    #[test]
    fn base_id() {
        let base = AtomId::base();
        assert_eq!(base.as_str(), "00000+swarm");
        assert_eq!(base.body(), "00000");
        assert_eq!(base.ext(), "swarm");
    }

    #[test]
    fn body_and_ext_split() {
        let id = AtomId::new("1000001", "alice");
        assert_eq!(id.body(), "1000001");
        assert_eq!(id.ext(), "alice");
        assert_eq!(id.as_str(), "1000001+alice");
    }

    #[test]
    fn suffixed_id_sorts_between_ticks() {
        let bare = AtomId::new("10000", "A");
        let suffixed = AtomId::new(&format!("10000{}", encode(1, SEQ_DIGITS)), "A");
        let next_tick = AtomId::new("10001", "A");
        assert!(bare < suffixed);
        assert!(suffixed < next_tick);
    }

    #[test]
    fn sibling_order_is_by_source() {
        let a = AtomId::new("10000", "A");
        let b = AtomId::new("10000", "B");
        assert!(b > a);
    }

    #[test]
    fn minted_by_matches_bare_and_suffixed() {
        let bare = AtomId::new("10000", "A");
        let suffixed = AtomId::new("1000001", "A");
        let other_source = AtomId::new("10000", "B");
        let other_tick = AtomId::new("10001", "A");

        assert!(bare.minted_by("10000", "A"));
        assert!(suffixed.minted_by("10000", "A"));
        assert!(!other_source.minted_by("10000", "A"));
        assert!(!other_tick.minted_by("10000", "A"));
    }

    #[test]
    fn serde_is_transparent() {
        let id = AtomId::new("10000", "alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"10000+alice\"");
        let back: AtomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
