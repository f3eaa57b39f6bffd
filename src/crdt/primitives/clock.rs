// model = "claude-opus-4-5"
// created = "2026-02-14"
// modified = "2026-02-14"
// driver = "Isaac Clayton"

//! Clock source for minting and validating timestamp bodies.
//!
//! # Lamport Clock
//!
//! A monotonic counter rendered in the ordered base-64 alphabet. Minting
//! increments the counter; observing a remote timestamp advances the
//! high-water mark so the next minted timestamp is strictly greater than
//! anything seen.
//!
//! Complexity:
//! - new_timestamp: O(1)
//! - check_timestamp: O(1)

use super::id;

/// A source of Lamport-style timestamps, encoded as digit strings.
///
/// The engine mints one timestamp per local op and reports the largest
/// generated id of every applied op back through `check_timestamp`, which
/// keeps replicas' clocks ahead of everything they have witnessed.
pub trait ClockSource {
    /// Mint a fresh timestamp body, strictly greater than any timestamp
    /// this source has issued or observed.
    fn new_timestamp(&mut self) -> String;

    /// Advance the high-water mark to at least `body`.
    ///
    /// `body` may carry a sub-sequence suffix; only the leading timestamp
    /// digits count. Unparseable input is ignored.
    fn check_timestamp(&mut self, body: &str);
}

/// The default clock: a plain Lamport counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LamportClock {
    time: u64,
}

impl LamportClock {
    /// Create a new clock starting at 0.
    pub fn new() -> LamportClock {
        return LamportClock { time: 0 };
    }

    /// Create a clock with a specific starting time.
    pub fn with_time(time: u64) -> LamportClock {
        return LamportClock { time };
    }

    /// Get the current time.
    #[inline]
    pub fn time(&self) -> u64 {
        return self.time;
    }
}

impl ClockSource for LamportClock {
    fn new_timestamp(&mut self) -> String {
        self.time += 1;
        return id::encode(self.time, id::TS_DIGITS);
    }

    fn check_timestamp(&mut self, body: &str) {
        let ts = body.get(..id::TS_DIGITS).unwrap_or(body);
        if let Some(time) = id::decode(ts) {
            self.time = self.time.max(time);
        }
    }
}
