//! Fixed-capacity circular sample store with an absolute write cursor.
//!
//! [`DelayBuffer`] backs named delay lines and other history-keeping
//! resources. Writers [`append`](DelayBuffer::append) blocks of samples;
//! readers address samples by *absolute position* in the stream written so
//! far, not by offset from the write head. The buffer keeps the most recent
//! `capacity` samples: only the window `[cursor - capacity, cursor)` is valid
//! history.
//!
//! Whether an out-of-window read is an error or gets clamped is a policy of
//! the consuming object, not of the buffer: [`read_at`](DelayBuffer::read_at)
//! reports range errors for strict consumers, while
//! [`read_clamped`](DelayBuffer::read_clamped) folds the position into the
//! valid window for defensive ones. Positions before the start of the stream
//! always read as silence.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Error from a strict out-of-window read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// The read would extend past the data written so far.
    Ahead {
        /// First absolute position past the written stream.
        cursor: i64,
        /// Last absolute position the read needed (exclusive).
        end: i64,
    },
    /// The read starts before the oldest retained sample.
    Evicted {
        /// Oldest retained absolute position.
        oldest: i64,
        /// Absolute position the read started at.
        position: i64,
    },
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RangeError::Ahead { cursor, end } => {
                write!(f, "read through {end} is ahead of write cursor {cursor}")
            }
            RangeError::Evicted { oldest, position } => {
                write!(f, "read at {position} is behind oldest retained sample {oldest}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RangeError {}

/// Circular sample store addressed by absolute stream position.
///
/// The write cursor counts every sample ever appended; storage wraps modulo
/// the capacity, overwriting the oldest region. No reallocation happens after
/// construction.
#[derive(Debug, Clone)]
pub struct DelayBuffer {
    data: Vec<f32>,
    cursor: i64,
}

impl DelayBuffer {
    /// Creates a zeroed buffer retaining `capacity` samples of history.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "delay buffer capacity must be > 0");
        Self {
            data: vec![0.0; capacity],
            cursor: 0,
        }
    }

    /// Number of samples of history retained.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Absolute position one past the newest written sample.
    ///
    /// Monotonically increasing; starts at 0.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Oldest absolute position still retained (clamped to the stream start).
    pub fn oldest(&self) -> i64 {
        (self.cursor - self.data.len() as i64).max(0)
    }

    /// Appends samples, advancing the cursor and overwriting the oldest
    /// region.
    ///
    /// Appending more than the capacity in one call keeps only the tail.
    pub fn append(&mut self, samples: &[f32]) {
        let cap = self.data.len();
        // Only the last `cap` samples of an oversized append can survive.
        let keep = &samples[samples.len().saturating_sub(cap)..];
        let skipped = (samples.len() - keep.len()) as i64;
        let mut pos = ((self.cursor + skipped) % cap as i64) as usize;
        for &s in keep {
            self.data[pos] = s;
            pos = (pos + 1) % cap;
        }
        self.cursor += samples.len() as i64;
    }

    /// Reads `out.len()` samples starting at absolute `position`.
    ///
    /// Positions before the stream start zero-fill the out-of-range prefix.
    /// Reading past the write cursor or into evicted history is an error and
    /// leaves `out` untouched.
    pub fn read_at(&self, out: &mut [f32], position: i64) -> Result<(), RangeError> {
        let end = position + out.len() as i64;
        if end > self.cursor {
            return Err(RangeError::Ahead {
                cursor: self.cursor,
                end,
            });
        }
        // The pre-start region is implicit silence, so only positions at or
        // after 0 can hit eviction.
        let first_stored = position.max(0);
        if first_stored < end && first_stored < self.cursor - self.data.len() as i64 {
            return Err(RangeError::Evicted {
                oldest: self.oldest(),
                position: first_stored,
            });
        }
        self.copy_window(out, position);
        Ok(())
    }

    /// Reads `out.len()` samples, folding `position` into the valid window.
    ///
    /// A read starting behind the oldest retained sample is shifted forward
    /// to start there; a read extending past the cursor is shifted back so
    /// it ends at the cursor. Pre-start positions still zero-fill.
    pub fn read_clamped(&self, out: &mut [f32], position: i64) {
        let len = out.len() as i64;
        let lo = self.cursor - self.data.len() as i64;
        let hi = self.cursor - len;
        // A read longer than the whole window can at best start at its edge.
        let clamped = if hi < lo { lo } else { position.clamp(lo, hi) };
        self.copy_window(out, clamped);
    }

    fn copy_window(&self, out: &mut [f32], position: i64) {
        let cap = self.data.len() as i64;
        for (i, slot) in out.iter_mut().enumerate() {
            let p = position + i as i64;
            *slot = if p < 0 || p >= self.cursor {
                0.0
            } else {
                self.data[(p.rem_euclid(cap)) as usize]
            };
        }
    }

    /// Zeroes the stored history without moving the cursor.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}
