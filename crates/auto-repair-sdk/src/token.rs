use serde::{Deserialize, Serialize};

/// A point in the cluster's token (hash) space.
///
/// Modeled as a signed 64-bit value, the same range a Murmur3-style
/// partitioner produces; the coordinator never hashes keys itself, it only
/// slices and compares tokens handed to it by the replication topology.
pub type Token = i64;

/// A half-open token interval `[start, end)` that may wrap the ring
/// (`start >= end`, meaning the range runs off the top of the space and
/// back around through the minimum token).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TokenRange {
    pub start: Token,
    pub end: Token,
}

impl TokenRange {
    pub fn new(start: Token, end: Token) -> Self {
        Self { start, end }
    }

    pub fn wraps(&self) -> bool {
        self.start >= self.end
    }

    /// Splits a wrapping range into the (at most two) non-wrapping pieces
    /// that make it up. A non-wrapping range unwraps to itself.
    ///
    /// Ranges must be unwrapped before use; this mirrors the unwrap step
    /// every Cassandra-family partitioner applies before handing ranges to
    /// a splitter.
    pub fn unwrap_ring(&self, min_token: Token, max_token: Token) -> Vec<TokenRange> {
        if !self.wraps() {
            return vec![*self];
        }
        if self.start == self.end {
            // The full ring, expressed as a single degenerate range.
            return vec![TokenRange::new(min_token, max_token)];
        }
        vec![
            TokenRange::new(self.start, max_token),
            TokenRange::new(min_token, self.end),
        ]
    }

    /// Splits this (already-unwrapped) range into `n` contiguous, equally
    /// sized subranges. `n == 0` is treated as `1`. The partitioner-aware
    /// splitter lives in the replication topology collaborator; this is the
    /// naive fallback used when that is unavailable.
    pub fn split_evenly(&self, n: usize) -> Vec<TokenRange> {
        let n = n.max(1);
        if self.wraps() {
            // Callers are expected to unwrap first; defensively treat a
            // wrapping range as unsplittable rather than produce nonsense.
            return vec![*self];
        }
        if n == 1 {
            return vec![*self];
        }
        let span = (self.end as i128) - (self.start as i128);
        if span <= 0 {
            return vec![*self];
        }
        let step = span / n as i128;
        if step == 0 {
            return vec![*self];
        }
        let mut out = Vec::with_capacity(n);
        let mut cursor = self.start as i128;
        for i in 0..n {
            let next = if i == n - 1 {
                self.end as i128
            } else {
                cursor + step
            };
            out.push(TokenRange::new(cursor as Token, next as Token));
            cursor = next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_wrapping_range_unwraps_to_itself() {
        let r = TokenRange::new(10, 20);
        assert_eq!(r.unwrap_ring(i64::MIN, i64::MAX), vec![r]);
    }

    #[test]
    fn wrapping_range_splits_into_two_pieces() {
        let r = TokenRange::new(90, 10);
        let pieces = r.unwrap_ring(0, 100);
        assert_eq!(pieces, vec![TokenRange::new(90, 100), TokenRange::new(0, 10)]);
    }

    #[test]
    fn full_ring_range_unwraps_to_full_span() {
        let r = TokenRange::new(5, 5);
        let pieces = r.unwrap_ring(0, 100);
        assert_eq!(pieces, vec![TokenRange::new(0, 100)]);
    }

    #[test]
    fn split_evenly_covers_the_whole_range_without_gaps() {
        let r = TokenRange::new(0, 100);
        let pieces = r.split_evenly(4);
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces[0].start, 0);
        assert_eq!(pieces.last().unwrap().end, 100);
        for w in pieces.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn split_evenly_of_one_is_identity() {
        let r = TokenRange::new(0, 100);
        assert_eq!(r.split_evenly(1), vec![r]);
    }
}
